//! # 게임 설정 API 라우트 핸들러
//!
//! 음료 이름과 타이머 값은 "입력 열기" 요청 뒤에 오는 자유 텍스트 한 건으로 받습니다.
//!
//! | 메서드 | 경로 | 핸들러 |
//! |--------|------|--------|
//! | POST | /api/v1/chats/{chat_id}/drink-entry | `open_drink_entry` |
//! | POST | /api/v1/chats/{chat_id}/timer-entry | `open_timer_entry` |
//! | POST | /api/v1/chats/{chat_id}/messages | `submit_message` |
//! | DELETE | /api/v1/chats/{chat_id}/drinks | `clear_drinks` |

use crate::{error::AppError, game::TextOutcome, routes::AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize; // 요청 본문(JSON) → MessageRequest
use serde_json::{json, Value};

/// 채팅방에 들어온 자유 텍스트 메시지
#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub text: String,
}

pub async fn open_drink_entry(
    State(state): State<AppState>,
    Path(chat_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.engine.open_drink_entry(chat_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn open_timer_entry(
    State(state): State<AppState>,
    Path(chat_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.engine.open_timer_entry(chat_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// 자유 텍스트를 처리합니다.
///
/// `POST /api/v1/chats/{chat_id}/messages` + `{ "text": "Beer" }`
/// → `{ "kind": "drink_added", "drink": {...} }` 또는 `{ "kind": "timer_set", "minutes": 5 }`
///
/// 입력 대기 중이 아니면 409 + `not_awaiting_input`. 어댑터는 이 경우 보통 아무 답도 하지 않습니다.
pub async fn submit_message(
    State(state): State<AppState>,
    Path(chat_id): Path<i64>,
    Json(req): Json<MessageRequest>,
) -> Result<Json<TextOutcome>, AppError> {
    Ok(Json(state.engine.submit_text(chat_id, &req.text).await?))
}

/// `DELETE /api/v1/chats/{chat_id}/drinks` → `{ "removed": 3 }`
pub async fn clear_drinks(
    State(state): State<AppState>,
    Path(chat_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let removed = state.engine.clear_drinks(chat_id).await?;
    Ok(Json(json!({ "removed": removed })))
}
