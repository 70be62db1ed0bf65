//! # 서비스 모듈
//!
//! - `draw_relay`: 타이머 추첨 알림을 채팅 쪽으로 넘기는 백그라운드 태스크

pub mod draw_relay;
