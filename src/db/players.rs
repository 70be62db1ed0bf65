//! # 참가자 명단 쿼리 모듈
//!
//! 세션별 참가자 명단을 다루는 SQL 쿼리 함수들입니다.
//! 참가자는 채팅 플랫폼의 사용자 ID로 구분하고, 표시 이름은 참가 시점 값을 저장합니다.
//!
//! ## 테이블 구조
//! - `players`: (session_id, user_id) 기본키, 세션이 지워지면 함께 지워짐

use crate::error::AppError;
use crate::models::Player;
use sqlx::SqlitePool; // 연결 풀: 여러 요청이 커넥션을 나눠 씀

/// 세션의 참가자를 들어온 순서대로 조회합니다.
pub async fn list_players(pool: &SqlitePool, session_id: &str) -> Result<Vec<Player>, AppError> {
    let players = sqlx::query_as::<_, Player>(
        r#"
        SELECT session_id, user_id, name, joined_at
        FROM players
        WHERE session_id = ?
        ORDER BY rowid
        "#,
    )
    .bind(session_id)
    .fetch_all(pool)
    .await?;

    Ok(players)
}

/// 세션의 참가자 한 명을 사용자 ID로 조회합니다.
///
/// 참가하지 않은 사용자면 `None`. 엔진은 이 결과로
/// `AlreadyJoined`(참가 시)와 `NotAJoinedPlayer`(이탈 시)를 판정합니다.
pub async fn get_player(
    pool: &SqlitePool,
    session_id: &str,
    user_id: i64,
) -> Result<Option<Player>, AppError> {
    let player = sqlx::query_as::<_, Player>(
        r#"
        SELECT session_id, user_id, name, joined_at
        FROM players
        WHERE session_id = ? AND user_id = ?
        "#,
    )
    .bind(session_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(player)
}

/// 참가자를 추가합니다.
///
/// ## 처리 흐름
/// 1. INSERT로 명단에 추가 (`joined_at`은 DB 기본값)
/// 2. 방금 추가한 행을 다시 조회하여 반환
///
/// (session_id, user_id)가 기본키이므로 중복 추가는 제약 위반으로 실패합니다.
/// 엔진은 먼저 `get_player`로 확인해서 `AlreadyJoined`를 보고합니다.
pub async fn add_player(
    pool: &SqlitePool,
    session_id: &str,
    user_id: i64,
    name: &str,
) -> Result<Player, AppError> {
    sqlx::query("INSERT INTO players (session_id, user_id, name) VALUES (?, ?, ?)")
        .bind(session_id)
        .bind(user_id)
        .bind(name)
        .execute(pool)
        .await?;

    get_player(pool, session_id, user_id)
        .await?
        .ok_or(AppError::CollaboratorUnavailable(sqlx::Error::RowNotFound))
}

/// 참가자를 명단에서 뺍니다. 빠진 행이 있으면 `true`.
pub async fn remove_player(pool: &SqlitePool, session_id: &str, user_id: i64) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM players WHERE session_id = ? AND user_id = ?")
        .bind(session_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
