//! # 라우트 핸들러 모듈
//!
//! 채팅 플랫폼 어댑터가 호출하는 얇은 HTTP/JSON 계층입니다.
//! 핸들러는 엔진 연산을 호출하고 결과를 구조화된 JSON으로 돌려줄 뿐,
//! 사용자에게 보일 문구나 버튼은 만들지 않습니다.
//!
//! 각 하위 모듈:
//! - `health`: 서버 상태 확인
//! - `sessions`: 세션 생성/조회/삭제, 게임 시작/정지
//! - `settings`: 음료·타이머 입력, 자유 텍스트, 음료 목록 비우기
//! - `players`: 참가/이탈
//! - `stats`: 통계 조회

pub mod health;
pub mod players;
pub mod sessions;
pub mod settings;
pub mod stats;

use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::game::GameEngine;

/// 애플리케이션 공유 상태
///
/// 모든 핸들러가 `State(state): State<AppState>`로 접근합니다.
/// 엔진은 `Arc`로 감싸져 있어서 clone해도 같은 엔진을 가리킵니다.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<GameEngine>,
}

/// 전체 라우터를 만듭니다. 모든 API는 `/api/v1` 아래에 있습니다.
///
/// axum 0.8부터 경로 파라미터는 `{name}` 문법을 씁니다.
pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health::health_check))
        .route(
            "/chats/{chat_id}",
            post(sessions::init_session)
                .get(sessions::get_snapshot)
                .delete(sessions::exit_session),
        )
        .route("/chats/{chat_id}/start", post(sessions::start_game))
        .route("/chats/{chat_id}/stop", post(sessions::stop_game))
        .route("/chats/{chat_id}/drink-entry", post(settings::open_drink_entry))
        .route("/chats/{chat_id}/timer-entry", post(settings::open_timer_entry))
        .route("/chats/{chat_id}/messages", post(settings::submit_message))
        .route("/chats/{chat_id}/drinks", delete(settings::clear_drinks))
        .route("/chats/{chat_id}/players", post(players::join_game))
        .route("/chats/{chat_id}/players/{user_id}", delete(players::leave_game))
        .route("/chats/{chat_id}/stats", get(stats::get_stats))
        .with_state(state);

    // 어댑터가 다른 출처에서 호출할 수 있도록 CORS는 모두 허용합니다.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
