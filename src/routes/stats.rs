//! # 통계 API 라우트 핸들러
//!
//! 세션의 누적 통계를 플레이어별로 묶어 돌려줍니다.
//! 통계는 게임을 멈춰도 남고, 봇에서 나가면 사라집니다.

use crate::{error::AppError, routes::AppState};
use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

/// `GET /api/v1/chats/{chat_id}/stats` → `{ "players": [{ "player_name", "drinks": [...] }] }`
pub async fn get_stats(
    State(state): State<AppState>,
    Path(chat_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let players = state.engine.statistics(chat_id).await?;
    Ok(Json(json!({ "players": players })))
}
