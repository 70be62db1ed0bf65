//! # 게임 세션 API 라우트 핸들러
//!
//! 세션의 생성, 조회, 시작, 정지, 삭제를 위한 HTTP 핸들러 함수들입니다.
//!
//! ## 엔드포인트 목록
//! | 메서드 | 경로 | 핸들러 | 설명 |
//! |--------|------|--------|------|
//! | POST | /api/v1/chats/{chat_id} | `init_session` | 첫 연락 (없으면 생성) |
//! | GET | /api/v1/chats/{chat_id} | `get_snapshot` | 타이머, 명단, 음료 목록 |
//! | DELETE | /api/v1/chats/{chat_id} | `exit_session` | 봇에서 나가기 |
//! | POST | /api/v1/chats/{chat_id}/start | `start_game` | 게임 시작 |
//! | POST | /api/v1/chats/{chat_id}/stop | `stop_game` | 게임 정지 |
//!
//! ## 사용 흐름
//! ```text
//! 1. /start 명령 → POST /chats/{id} (세션 생성)
//! 2. 참가, 음료 추가, 타이머 설정...
//! 3. "시작" 버튼 → POST /chats/{id}/start
//! 4. "정지" 버튼 → POST /chats/{id}/stop
//! 5. "나가기" 버튼 → DELETE /chats/{id}
//! ```

use crate::{error::AppError, game::StartedGame, models::*, routes::AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value}; // `{ "removed": true }` 같은 작은 응답용

/// 채팅방의 첫 연락을 처리합니다.
///
/// `POST /api/v1/chats/{chat_id}`
///
/// 새로 만들었으면 201 Created, 이미 있으면 200 OK.
/// 어댑터는 `session.started`를 보고 어떤 키보드를 보여줄지 정합니다.
pub async fn init_session(
    State(state): State<AppState>,
    Path(chat_id): Path<i64>,
) -> Result<(StatusCode, Json<InitOutcome>), AppError> {
    let outcome = state.engine.init_if_absent(chat_id).await?;
    let status = if outcome.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(outcome)))
}

/// `GET /api/v1/chats/{chat_id}` → 설정/정보 화면용 스냅샷
pub async fn get_snapshot(
    State(state): State<AppState>,
    Path(chat_id): Path<i64>,
) -> Result<Json<GameSnapshot>, AppError> {
    Ok(Json(state.engine.snapshot(chat_id).await?))
}

/// `DELETE /api/v1/chats/{chat_id}` → `{ "removed": true }`
///
/// 세션이 없어도 에러가 아닙니다 (`removed: false`).
pub async fn exit_session(
    State(state): State<AppState>,
    Path(chat_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let removed = state.engine.exit(chat_id).await?;
    Ok(Json(json!({ "removed": removed })))
}

/// `POST /api/v1/chats/{chat_id}/start`
///
/// 명단이나 음료가 비어 있으면 409 + `precondition_not_met`.
pub async fn start_game(
    State(state): State<AppState>,
    Path(chat_id): Path<i64>,
) -> Result<Json<StartedGame>, AppError> {
    Ok(Json(state.engine.start(chat_id).await?))
}

/// `POST /api/v1/chats/{chat_id}/stop` → `{ "was_started": true }`
pub async fn stop_game(
    State(state): State<AppState>,
    Path(chat_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let was_started = state.engine.stop(chat_id).await?;
    Ok(Json(json!({ "was_started": was_started })))
}
