//! # 게임 세션 데이터베이스 쿼리 모듈
//!
//! 채팅방별 세션 레코드의 생성, 조회, 부분 업데이트, 삭제를 담당합니다.
//!
//! ## 세션 라이프사이클
//! ```text
//! [첫 연락] create_session() → started = 0 ⇄ started = 1 → delete_session() → [삭제]
//! ```
//!
//! 세션을 지우면 `ON DELETE CASCADE`로 명단, 음료, 통계도 함께 지워집니다.

use crate::error::AppError;
use crate::models::{AwaitingInput, Session, SessionUpdate};
use sqlx::SqlitePool;

/// 채팅방 ID로 세션을 조회합니다.
///
/// 세션이 존재하면 `Some(Session)`, 없으면 `None`을 반환합니다.
pub async fn get_session(pool: &SqlitePool, chat_id: i64) -> Result<Option<Session>, AppError> {
    let session = sqlx::query_as::<_, Session>(
        r#"
        SELECT id, chat_id, started, awaiting, timer_minutes, created_at
        FROM game_sessions
        WHERE chat_id = ?
        "#,
    )
    .bind(chat_id)
    .fetch_optional(pool)
    .await?;

    Ok(session)
}

/// 새 세션을 만듭니다. 멈춘 상태, 입력 대기 없음, 타이머는 기본값으로 시작합니다.
///
/// 같은 채팅방에 세션이 이미 있으면 UNIQUE 제약으로 실패하므로
/// 호출하는 쪽(엔진)에서 먼저 `get_session`으로 확인합니다.
pub async fn create_session(
    pool: &SqlitePool,
    chat_id: i64,
    timer_minutes: i64,
) -> Result<Session, AppError> {
    // UUIDv7: 시간 기반 UUID로, 생성 순서대로 정렬됩니다
    let id = uuid::Uuid::now_v7().to_string();

    sqlx::query(
        r#"
        INSERT INTO game_sessions (id, chat_id, started, awaiting, timer_minutes)
        VALUES (?, ?, 0, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(chat_id)
    .bind(AwaitingInput::Idle)
    .bind(timer_minutes)
    .execute(pool)
    .await?;

    // 생성 직후 조회하여 DB가 채운 기본값(created_at)까지 포함된 객체를 반환
    get_session(pool, chat_id)
        .await?
        .ok_or(AppError::CollaboratorUnavailable(sqlx::Error::RowNotFound))
}

/// 세션 필드를 부분 업데이트합니다.
///
/// 모든 필드를 한 번의 UPDATE로 씁니다. `COALESCE(?, column)`은
/// 바인딩 값이 NULL(None)이면 기존 값을 그대로 둡니다.
/// 한 문장이므로 실패하면 아무 필드도 바뀌지 않습니다.
///
/// ## 반환값
/// - `true`: 업데이트된 행이 있음
/// - `false`: 해당 채팅방의 세션이 없음
pub async fn update_session(
    pool: &SqlitePool,
    chat_id: i64,
    update: SessionUpdate,
) -> Result<bool, AppError> {
    let result = sqlx::query(
        r#"
        UPDATE game_sessions
        SET started = COALESCE(?, started),
            awaiting = COALESCE(?, awaiting),
            timer_minutes = COALESCE(?, timer_minutes)
        WHERE chat_id = ?
        "#,
    )
    .bind(update.started)
    .bind(update.awaiting)
    .bind(update.timer_minutes)
    .bind(chat_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// 세션을 삭제합니다. 명단, 음료, 통계도 함께 사라집니다.
///
/// ## 반환값
/// - `true`: 삭제 성공
/// - `false`: 해당 채팅방의 세션이 없음
pub async fn delete_session(pool: &SqlitePool, chat_id: i64) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM game_sessions WHERE chat_id = ?")
        .bind(chat_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    #[tokio::test]
    async fn test_create_and_get_session() {
        let pool = test_pool().await;
        let session = create_session(&pool, 42, 10).await.unwrap();

        assert_eq!(session.chat_id, 42);
        assert!(!session.started);
        assert_eq!(session.awaiting, AwaitingInput::Idle);
        assert_eq!(session.timer_minutes, 10);

        let loaded = get_session(&pool, 42).await.unwrap().unwrap();
        assert_eq!(loaded, session);
    }

    #[tokio::test]
    async fn test_get_session_not_found() {
        let pool = test_pool().await;
        assert!(get_session(&pool, 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_partial_update_keeps_other_fields() {
        let pool = test_pool().await;
        create_session(&pool, 1, 10).await.unwrap();

        let updated = update_session(
            &pool,
            1,
            SessionUpdate {
                awaiting: Some(AwaitingInput::TimerValue),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(updated);

        let session = get_session(&pool, 1).await.unwrap().unwrap();
        assert_eq!(session.awaiting, AwaitingInput::TimerValue);
        assert_eq!(session.timer_minutes, 10);
        assert!(!session.started);
    }

    #[tokio::test]
    async fn test_update_missing_session() {
        let pool = test_pool().await;
        let updated = update_session(
            &pool,
            5,
            SessionUpdate {
                started: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(!updated);
    }

    #[tokio::test]
    async fn test_delete_session_cascades() {
        let pool = test_pool().await;
        let session = create_session(&pool, 1, 10).await.unwrap();
        crate::db::add_player(&pool, &session.id, 100, "Ann").await.unwrap();
        crate::db::add_drink(&pool, &session.id, "Beer").await.unwrap();

        assert!(delete_session(&pool, 1).await.unwrap());
        assert!(!delete_session(&pool, 1).await.unwrap());
        assert!(crate::db::list_players(&pool, &session.id).await.unwrap().is_empty());
        assert!(crate::db::list_drinks(&pool, &session.id).await.unwrap().is_empty());
    }
}
