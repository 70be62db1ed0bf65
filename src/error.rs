//! # 에러 처리 모듈
//!
//! 게임 엔진의 모든 연산이 돌려줄 수 있는 실패 종류를 정의합니다.
//! 빈 명단, 중복 음료, 잘못된 타이머 값 같은 것들은 "예외"가 아니라
//! 채팅에서 흔히 일어나는 정상 분기이므로, 엔진은 패닉 없이 `Result<T, AppError>`로 보고합니다.
//!
//! 이 모듈의 핵심:
//! - `AppError` 열거형(enum): 모든 실패 종류를 하나의 타입으로 통합
//! - `IntoResponse` 구현: 에러를 HTTP 응답으로 자동 변환

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use std::fmt;
use thiserror::Error;

/// 게임 시작을 막은 빈 목록이 어느 쪽인지
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyList {
    /// 참가자가 한 명도 없음
    Roster,
    /// 음료가 하나도 없음
    Catalog,
}

impl fmt::Display for EmptyList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmptyList::Roster => f.write_str("roster"),
            EmptyList::Catalog => f.write_str("catalog"),
        }
    }
}

/// 게임 엔진이 보고하는 모든 실패 종류
///
/// 채팅 어댑터는 variant마다 다른 안내 문구를 고릅니다.
/// 문구 자체는 엔진의 관심사가 아니므로 여기의 메시지는 로그/디버깅용입니다.
#[derive(Debug, Error)]
pub enum AppError {
    /// 이 채팅방에는 아직 세션이 없음
    #[error("No game session for this chat")]
    SessionNotFound,

    /// 명단 또는 음료 목록이 비어 있어 시작할 수 없음
    #[error("Cannot start: {0} is empty")]
    PreconditionNotMet(EmptyList),

    /// 이미 진행 중인 게임을 다시 시작하려 함
    #[error("Game already started")]
    AlreadyStarted,

    /// 게임 진행 중에는 설정(음료/타이머 입력, 음료 목록 비우기)을 바꿀 수 없음
    #[error("Game in progress")]
    GameInProgress,

    /// 지금은 참가/이탈이 불가능함 (세션 없음 또는 게임 진행 중)
    #[error("Joining or leaving is not possible right now")]
    NotJoinable,

    /// 이미 참가한 사용자
    #[error("Player already joined")]
    AlreadyJoined,

    /// 참가하지 않은 사용자가 나가려 함
    #[error("Player is not in the game")]
    NotAJoinedPlayer,

    /// 같은 이름(대소문자 구분)의 음료가 이미 있음
    #[error("Drink already exists: {0}")]
    DuplicateDrink(String),

    /// 타이머 입력이 숫자가 아니거나 범위를 벗어남
    #[error("Invalid timer value: {0}")]
    InvalidTimerValue(String),

    /// 입력 대기 상태가 아닌데 자유 텍스트가 들어옴
    #[error("Not awaiting input")]
    NotAwaitingInput,

    /// 저장소 호출 실패
    /// #[from]: sqlx 함수에서 `?`를 쓰면 자동으로 이 variant로 변환됩니다.
    #[error("Collaborator unavailable: {0}")]
    CollaboratorUnavailable(#[from] sqlx::Error),
}

impl AppError {
    /// JSON 응답의 `code` 필드 값
    pub fn code(&self) -> &'static str {
        match self {
            AppError::SessionNotFound => "session_not_found",
            AppError::PreconditionNotMet(_) => "precondition_not_met",
            AppError::AlreadyStarted => "already_started",
            AppError::GameInProgress => "game_in_progress",
            AppError::NotJoinable => "not_joinable",
            AppError::AlreadyJoined => "already_joined",
            AppError::NotAJoinedPlayer => "not_a_joined_player",
            AppError::DuplicateDrink(_) => "duplicate_drink",
            AppError::InvalidTimerValue(_) => "invalid_timer_value",
            AppError::NotAwaitingInput => "not_awaiting_input",
            AppError::CollaboratorUnavailable(_) => "collaborator_unavailable",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::SessionNotFound => StatusCode::NOT_FOUND,
            AppError::InvalidTimerValue(_) => StatusCode::BAD_REQUEST,
            AppError::CollaboratorUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            // 나머지는 모두 "현재 상태와 충돌"하는 요청입니다.
            _ => StatusCode::CONFLICT,
        }
    }
}

impl IntoResponse for AppError {
    /// AppError를 HTTP 응답으로 변환합니다.
    ///
    /// 저장소 에러는 실제 내용을 로그에만 기록하고,
    /// 클라이언트에는 일반적인 메시지만 반환합니다.
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let message = match self {
            AppError::CollaboratorUnavailable(ref e) => {
                tracing::error!("Database error: {}", e);
                "The game store is unavailable".to_string()
            }
            ref other => other.to_string(),
        };

        // 어느 목록이 비었는지는 어댑터가 문구를 고를 때 필요하므로 따로 내려줍니다.
        let body = match self {
            AppError::PreconditionNotMet(list) => json!({
                "error": { "code": code, "message": message, "empty": list }
            }),
            _ => json!({
                "error": { "code": code, "message": message }
            }),
        };

        (status, Json(body)).into_response()
    }
}
