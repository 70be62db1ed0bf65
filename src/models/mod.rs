//! # 데이터 모델 모듈
//!
//! 애플리케이션에서 사용하는 데이터 구조체들을 정의합니다.
//! - `session`: 게임 세션과 입력 대기 모드
//! - `player`: 참가자와 참가 요청
//! - `drink`: 음료
//! - `stats`: 통계, 추첨 알림, 상태 스냅샷
//!
//! `pub use X::*;`로 재공개하여 `crate::models::Session`처럼 짧게 쓸 수 있습니다.

pub mod drink;
pub mod player;
pub mod session;
pub mod stats;

pub use drink::*;
pub use player::*;
pub use session::*;
pub use stats::*;
