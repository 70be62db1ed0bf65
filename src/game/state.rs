//! # 세션 상태 기계 (Session State Machine)
//!
//! "이 채팅방의 다음 메시지가 무슨 뜻인가"를 판정하는 순수 로직입니다.
//! DB나 타이머는 건드리지 않고, 현재 상태를 받아 허용 여부와 다음 상태만 계산합니다.
//! 실제 저장과 타이머 조작은 `engine`이 이 판정 결과를 보고 수행합니다.
//!
//! ## 상태 전이
//! ```text
//! Uninitialized ──첫 연락──▶ NotStarted ──start──▶ Started
//!       ▲                      ▲  │                  │
//!       └──────── exit ────────┘  └────── stop ◀─────┘
//! ```
//!
//! 수명주기 상태와 별개로 입력 대기 모드(`AwaitingInput`)가 있고,
//! 참가/이탈은 또 다른 조건("참가 창이 열려 있음")으로 막습니다.
//! 두 조건을 섞지 않습니다.

use crate::error::{AppError, EmptyList};
use crate::models::{AwaitingInput, LifecycleState, Session};

/// 자유 텍스트 한 건을 현재 입력 대기 모드로 해석한 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextCommand {
    /// 새 음료 이름 (원문 그대로, 대소문자 유지)
    AddDrink(String),
    /// 새 타이머 값 (분)
    SetTimer(i64),
}

/// `start` 전이가 가능한지 확인합니다.
///
/// 명단을 먼저 보고, 그다음 음료 목록을 봅니다.
pub fn check_start(
    state: LifecycleState,
    player_count: usize,
    drink_count: usize,
) -> Result<(), AppError> {
    match state {
        LifecycleState::Uninitialized => return Err(AppError::SessionNotFound),
        LifecycleState::Started => return Err(AppError::AlreadyStarted),
        LifecycleState::NotStarted => {}
    }

    if player_count == 0 {
        return Err(AppError::PreconditionNotMet(EmptyList::Roster));
    }
    if drink_count == 0 {
        return Err(AppError::PreconditionNotMet(EmptyList::Catalog));
    }

    Ok(())
}

/// 설정 변경(음료/타이머 입력 열기, 음료 목록 비우기)이 가능한지 확인합니다.
///
/// 게임이 도는 동안에는 추첨이 시작 시점의 스냅샷을 쓰므로 설정을 바꿀 수 없습니다.
pub fn check_configurable(session: Option<&Session>) -> Result<&Session, AppError> {
    match session {
        None => Err(AppError::SessionNotFound),
        Some(s) if s.started => Err(AppError::GameInProgress),
        Some(s) => Ok(s),
    }
}

/// 참가 창이 열려 있는지 확인합니다.
///
/// 세션이 있고 멈춰 있을 때만 열려 있습니다. 그 밖의 경우는 조용히 무시하지 않고
/// `NotJoinable`로 알립니다.
pub fn check_join_window(session: Option<&Session>) -> Result<&Session, AppError> {
    match session {
        Some(s) if !s.started => Ok(s),
        _ => Err(AppError::NotJoinable),
    }
}

/// 자유 텍스트를 현재 모드로 해석합니다.
///
/// 이 함수가 `Ok`든 `Err`든, 호출한 쪽은 모드를 `Idle`로 되돌려야 합니다
/// (`NotAwaitingInput`인 경우는 이미 `Idle`).
pub fn route_text(
    awaiting: AwaitingInput,
    text: &str,
    max_timer_minutes: i64,
) -> Result<TextCommand, AppError> {
    match awaiting {
        AwaitingInput::Idle => Err(AppError::NotAwaitingInput),
        AwaitingInput::DrinkName => Ok(TextCommand::AddDrink(text.to_string())),
        AwaitingInput::TimerValue => {
            parse_timer_minutes(text, max_timer_minutes).map(TextCommand::SetTimer)
        }
    }
}

/// 타이머 입력을 파싱합니다. 앞뒤 공백을 뺀 10진 정수 `1..=max`만 받습니다.
pub fn parse_timer_minutes(text: &str, max: i64) -> Result<i64, AppError> {
    let trimmed = text.trim();

    match trimmed.parse::<i64>() {
        Ok(minutes) if (1..=max).contains(&minutes) => Ok(minutes),
        _ => Err(AppError::InvalidTimerValue(trimmed.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(started: bool) -> Session {
        Session {
            id: "s".to_string(),
            chat_id: 1,
            started,
            awaiting: AwaitingInput::Idle,
            timer_minutes: 10,
            created_at: String::new(),
        }
    }

    #[test]
    fn test_start_requires_players_then_drinks() {
        let state = LifecycleState::NotStarted;

        assert!(matches!(
            check_start(state, 0, 0),
            Err(AppError::PreconditionNotMet(EmptyList::Roster))
        ));
        assert!(matches!(
            check_start(state, 2, 0),
            Err(AppError::PreconditionNotMet(EmptyList::Catalog))
        ));
        assert!(check_start(state, 1, 1).is_ok());
    }

    #[test]
    fn test_start_rejects_other_states() {
        assert!(matches!(
            check_start(LifecycleState::Started, 1, 1),
            Err(AppError::AlreadyStarted)
        ));
        assert!(matches!(
            check_start(LifecycleState::Uninitialized, 1, 1),
            Err(AppError::SessionNotFound)
        ));
    }

    #[test]
    fn test_join_window() {
        assert!(check_join_window(Some(&session(false))).is_ok());
        assert!(matches!(
            check_join_window(Some(&session(true))),
            Err(AppError::NotJoinable)
        ));
        assert!(matches!(check_join_window(None), Err(AppError::NotJoinable)));
    }

    #[test]
    fn test_configurable_only_when_stopped() {
        assert!(check_configurable(Some(&session(false))).is_ok());
        assert!(matches!(
            check_configurable(Some(&session(true))),
            Err(AppError::GameInProgress)
        ));
        assert!(matches!(check_configurable(None), Err(AppError::SessionNotFound)));
    }

    #[test]
    fn test_route_text_by_mode() {
        assert!(matches!(
            route_text(AwaitingInput::Idle, "Beer", 60),
            Err(AppError::NotAwaitingInput)
        ));
        assert_eq!(
            route_text(AwaitingInput::DrinkName, " Beer ", 60).unwrap(),
            TextCommand::AddDrink(" Beer ".to_string())
        );
        assert_eq!(
            route_text(AwaitingInput::TimerValue, "5", 60).unwrap(),
            TextCommand::SetTimer(5)
        );
    }

    #[test]
    fn test_parse_timer_minutes() {
        assert_eq!(parse_timer_minutes(" 15\n", 60).unwrap(), 15);
        assert_eq!(parse_timer_minutes("60", 60).unwrap(), 60);

        for bad in ["0", "-3", "61", "ten", "", "1.5", "99999999999999999999"] {
            assert!(
                matches!(parse_timer_minutes(bad, 60), Err(AppError::InvalidTimerValue(_))),
                "{bad:?} should be rejected"
            );
        }
    }
}
