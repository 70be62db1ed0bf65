//! # 데이터베이스 접근 계층 (Data Access Layer)
//!
//! 게임 엔진이 의존하는 저장소들을 SQLite 위에 구현한 모듈입니다.
//! 엔진(game/)은 이 모듈의 함수만 호출하고 SQL을 직접 다루지 않습니다.
//!
//! 각 하위 모듈:
//! - `sessions`: 세션 저장소 (get / create / update / delete)
//! - `players`: 참가자 명단 (list / add / remove)
//! - `drinks`: 음료 목록 (list / add / clear)
//! - `stats`: 통계 장부 (increment / read)

pub mod drinks;
pub mod players;
pub mod sessions;
pub mod stats;

pub use drinks::*;
pub use players::*;
pub use sessions::*;
pub use stats::*;

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

/// SQLite 연결 풀을 만듭니다.
///
/// `sqlite::memory:`를 쓸 때는 연결마다 DB가 따로 생기므로
/// `max_connections`를 1로 줘야 합니다 (테스트용).
pub async fn connect(database_url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// 아직 실행되지 않은 마이그레이션을 순서대로 실행합니다.
pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    let pool = connect("sqlite::memory:", 1).await.unwrap();
    migrate(&pool).await.unwrap();
    pool
}
