//! # 게임 코어
//!
//! - `state`: 세션 상태 기계: 무엇이 허용되는지 판정
//! - `scheduler`: 음료 추첨 스케줄러: 스냅샷, 난수, 반복 타이머
//! - `engine`: 세션 엔진: 위 둘을 묶고 채팅방별로 요청을 직렬화

pub mod engine;
pub mod scheduler;
pub mod state;

pub use engine::{GameEngine, StartedGame, TextOutcome};
