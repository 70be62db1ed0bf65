//! # 참가자 API 라우트 핸들러
//!
//! 채팅에서 "+"를 보내면 참가, "-"를 보내면 이탈입니다.
//! 게임이 돌고 있는 동안에는 둘 다 409 + `not_joinable`.

use crate::{error::AppError, models::*, routes::AppState};
use axum::{
    extract::{Path, State}, // Path: URL 경로 파라미터, State: 공유 상태(엔진)
    http::StatusCode,
    Json,
};

/// `POST /api/v1/chats/{chat_id}/players`
/// + `{ "user_id": 42, "first_name": "Ann", "last_name": null, "username": "ann" }`
///
/// 표시 이름은 서버에서 만듭니다 (`display_name` 참고).
///
/// ## 처리 흐름
/// 1. 요청 본문에서 이름, 성, 사용자명으로 표시 이름 결정
/// 2. 엔진이 참가 창과 중복 참가를 확인하고 명단에 추가
/// 3. 201 Created + 추가된 참가자
pub async fn join_game(
    State(state): State<AppState>,
    Path(chat_id): Path<i64>,
    Json(req): Json<JoinRequest>,
) -> Result<(StatusCode, Json<Player>), AppError> {
    let player = state
        .engine
        .join(chat_id, req.user_id, &req.display_name())
        .await?;
    Ok((StatusCode::CREATED, Json(player)))
}

/// `DELETE /api/v1/chats/{chat_id}/players/{user_id}` → 빠진 참가자
pub async fn leave_game(
    State(state): State<AppState>,
    Path((chat_id, user_id)): Path<(i64, i64)>,
) -> Result<Json<Player>, AppError> {
    Ok(Json(state.engine.leave(chat_id, user_id).await?))
}
