//! # party-bot 서버 진입점
//!
//! 채팅방마다 하나씩 도는 술자리 게임 엔진을 띄우는 시작점입니다.
//!
//! 이 파일이 수행하는 작업:
//! 1. 환경변수(.env) 로딩
//! 2. 로깅(tracing) 초기화
//! 3. SQLite 연결 풀 생성과 마이그레이션
//! 4. 게임 엔진과 추첨 알림 중계 태스크 생성
//! 5. 어댑터용 API 라우터 설정
//! 6. HTTP 서버 시작, Ctrl+C에 모든 타이머 정리

mod config;
mod db;
mod error;
mod game;
mod models;
mod routes;
mod services;

use anyhow::Result;
use config::Config;
use game::GameEngine;
use routes::AppState;
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1단계: 환경변수 로딩 ──
    // .env 파일이 없어도 에러 없이 넘어갑니다.
    dotenvy::dotenv().ok();

    // ── 2단계: 로깅(tracing) 초기화 ──
    // RUST_LOG가 없으면 party_bot, tower_http, axum 모듈을 debug 레벨로 설정
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "party_bot=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // ── 3단계: 설정 로딩 ──
    let config = Config::from_env()?;
    tracing::info!("Starting party-bot on {}:{}", config.host, config.port);
    tracing::debug!(
        default_timer_minutes = config.game.default_timer_minutes,
        max_timer_minutes = config.game.max_timer_minutes,
        "Game settings"
    );

    // ── 4단계: SQLite 연결 풀 생성과 마이그레이션 ──
    let pool = db::connect(&config.database_url, 5).await?;

    tracing::info!("Running database migrations...");
    db::migrate(&pool).await?;

    // ── 5단계: 게임 엔진 ──
    // 엔진이 보내는 추첨 알림은 채널 반대편의 중계 태스크가 받습니다.
    let (notice_tx, notice_rx) = mpsc::unbounded_channel();
    let engine = GameEngine::new(pool.clone(), config.game, notice_tx);
    let relay = tokio::spawn(services::draw_relay::relay_draws(notice_rx));

    // ── 6단계: API 라우터 ──
    let app = routes::router(AppState {
        engine: engine.clone(),
    });

    // ── 7단계: 서버 시작 ──
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
            tracing::info!("Shutting down (ctrl-c)...");
        })
        .await?;

    // 타이머는 프로세스 수명에만 묶여 있으므로 여기서 모두 끕니다.
    // 엔진을 놓으면 알림 채널이 닫히고 중계 태스크도 끝납니다.
    engine.shutdown().await;
    drop(engine);
    let relayed = relay.await?;
    tracing::info!(relayed, "Draw relay finished");

    pool.close().await;
    Ok(())
}
