//! # 음료 목록 쿼리 모듈
//!
//! 음료는 추가하거나 목록 전체를 비울 수만 있습니다.
//! `drinks` 테이블의 `UNIQUE (session_id, name)`은 SQLite 기본 BINARY 비교를 쓰므로
//! "Beer"와 "beer"는 서로 다른 음료입니다.

use crate::error::AppError;
use crate::models::Drink;
use sqlx::SqlitePool; // 연결 풀: 여러 요청이 커넥션을 나눠 씀

/// 세션의 음료를 추가된 순서대로 조회합니다.
pub async fn list_drinks(pool: &SqlitePool, session_id: &str) -> Result<Vec<Drink>, AppError> {
    let drinks = sqlx::query_as::<_, Drink>(
        r#"
        SELECT id, session_id, name, created_at
        FROM drinks
        WHERE session_id = ?
        ORDER BY rowid
        "#,
    )
    .bind(session_id)
    .fetch_all(pool)
    .await?;

    Ok(drinks)
}

/// ID로 음료 하나를 조회합니다.
///
/// `fetch_optional`: 0행이면 `None`, 1행이면 `Some(Drink)`.
pub async fn get_drink(pool: &SqlitePool, id: &str) -> Result<Option<Drink>, AppError> {
    let drink = sqlx::query_as::<_, Drink>(
        "SELECT id, session_id, name, created_at FROM drinks WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(drink)
}

/// 새 음료를 추가하고 생성된 음료를 반환합니다.
///
/// ## 처리 흐름
/// 1. UUIDv7으로 ID 생성 (시간순 정렬 가능)
/// 2. INSERT로 저장. 이름은 받은 그대로 씁니다 (trim 없음)
/// 3. 방금 만든 음료를 다시 조회하여 반환
///
/// 이름 중복 검사는 엔진이 먼저 하고(`DuplicateDrink`),
/// UNIQUE 제약은 마지막 방어선입니다.
pub async fn add_drink(pool: &SqlitePool, session_id: &str, name: &str) -> Result<Drink, AppError> {
    // UUIDv7: 시간 기반 UUID로, 생성 순서대로 정렬됩니다
    let id = uuid::Uuid::now_v7().to_string();

    sqlx::query("INSERT INTO drinks (id, session_id, name) VALUES (?, ?, ?)")
        .bind(&id)
        .bind(session_id)
        .bind(name)
        .execute(pool)
        .await?;

    get_drink(pool, &id)
        .await?
        .ok_or(AppError::CollaboratorUnavailable(sqlx::Error::RowNotFound))
}

/// 세션의 음료 목록을 통째로 비웁니다. 지워진 개수를 반환합니다.
///
/// 통계 장부는 음료 이름을 따로 보관하므로 여기서 지워도 통계는 남습니다.
pub async fn clear_drinks(pool: &SqlitePool, session_id: &str) -> Result<u64, AppError> {
    let result = sqlx::query("DELETE FROM drinks WHERE session_id = ?")
        .bind(session_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
