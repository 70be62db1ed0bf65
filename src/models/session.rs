//! # 게임 세션 모델 정의
//!
//! 채팅방 하나에 묶인 게임 세션과, 다음 자유 텍스트를 어떻게 해석할지 정하는
//! 입력 대기 모드를 정의합니다.
//!
//! ## 세션 흐름
//! 1. 채팅방에서 처음 연락이 오면 세션 생성 (`NotStarted`)
//! 2. 명단과 음료가 준비되면 시작 (`Started`) → 타이머가 돌면서 추첨
//! 3. 정지하면 다시 `NotStarted`, 봇에서 나가면 세션 삭제

use serde::{Deserialize, Serialize};

/// 다음 자유 텍스트 한 건의 해석 방식
///
/// 불리언 플래그 여러 개 대신 하나의 열거형을 쓰므로
/// "음료 입력 대기"와 "타이머 입력 대기"가 동시에 켜질 수 없습니다.
/// DB에는 `'idle'`, `'drink_name'`, `'timer_value'` 문자열로 저장됩니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum AwaitingInput {
    /// 대기 중인 입력 없음
    #[default]
    Idle,
    /// 다음 텍스트는 새 음료 이름
    DrinkName,
    /// 다음 텍스트는 타이머 값(분)
    TimerValue,
}

/// 게임 세션 엔티티: DB의 `game_sessions` 테이블 한 행에 대응합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Session {
    /// 세션 고유 식별자 (UUIDv7). 나갔다가 다시 들어오면 새 ID가 발급됩니다.
    pub id: String,
    /// 채팅 플랫폼의 채팅방 ID
    pub chat_id: i64,
    /// 시작~정지 사이에만 true
    pub started: bool,
    /// 다음 자유 텍스트의 해석 방식
    pub awaiting: AwaitingInput,
    /// 추첨 간격(분). 게임이 멈춰 있을 때만 바꿀 수 있습니다.
    pub timer_minutes: i64,
    /// 세션 생성 시각 (ISO 8601)
    pub created_at: String,
}

/// 세션 수명주기 상태
///
/// DB 행이 없으면 `Uninitialized`, 있으면 `started` 플래그로 나뉩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    Uninitialized,
    NotStarted,
    Started,
}

impl LifecycleState {
    pub fn of(session: Option<&Session>) -> Self {
        match session {
            None => LifecycleState::Uninitialized,
            Some(s) if s.started => LifecycleState::Started,
            Some(_) => LifecycleState::NotStarted,
        }
    }
}

/// 세션 필드 부분 업데이트
///
/// `None`인 필드는 건드리지 않습니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionUpdate {
    pub started: Option<bool>,
    pub awaiting: Option<AwaitingInput>,
    pub timer_minutes: Option<i64>,
}

/// `initIfAbsent`의 결과
#[derive(Debug, Clone, Serialize)]
pub struct InitOutcome {
    pub session: Session,
    /// 이번 호출에서 새로 만들어졌는지
    pub created: bool,
}
