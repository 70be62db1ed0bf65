//! # 통계 장부 쿼리 모듈
//!
//! (세션, 플레이어, 음료) 조합마다 누적 횟수를 하나씩 가집니다.
//! 첫 추첨 전에는 행이 없고, 추첨마다 정확히 1씩 늘어납니다.

use crate::error::AppError;
use crate::models::{Drink, Player, StatEntry};
use sqlx::SqlitePool;

/// 추첨 한 번을 기록합니다.
///
/// `INSERT ... ON CONFLICT DO UPDATE`(UPSERT): 행이 없으면 count = 1로 만들고,
/// 있으면 count를 1 늘립니다. 한 문장이라 읽고-쓰기 사이에 끼어들 틈이 없습니다.
pub async fn increment_stat(
    pool: &SqlitePool,
    session_id: &str,
    player: &Player,
    drink: &Drink,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO drink_stats (session_id, player_id, drink_id, player_name, drink_name, count)
        VALUES (?, ?, ?, ?, ?, 1)
        ON CONFLICT (session_id, player_id, drink_id)
        DO UPDATE SET count = count + 1
        "#,
    )
    .bind(session_id)
    .bind(player.user_id)
    .bind(&drink.id)
    .bind(&player.name)
    .bind(&drink.name)
    .execute(pool)
    .await?;

    Ok(())
}

/// 세션의 통계를 처음 기록된 순서대로 읽습니다.
pub async fn read_stats(pool: &SqlitePool, session_id: &str) -> Result<Vec<StatEntry>, AppError> {
    let stats = sqlx::query_as::<_, StatEntry>(
        r#"
        SELECT player_id, drink_id, player_name, drink_name, count
        FROM drink_stats
        WHERE session_id = ?
        ORDER BY rowid
        "#,
    )
    .bind(session_id)
    .fetch_all(pool)
    .await?;

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{add_drink, add_player, clear_drinks, create_session, test_pool};

    #[tokio::test]
    async fn test_no_entry_before_first_draw() {
        let pool = test_pool().await;
        let session = create_session(&pool, 1, 10).await.unwrap();
        assert!(read_stats(&pool, &session.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_increment_upserts() {
        let pool = test_pool().await;
        let session = create_session(&pool, 1, 10).await.unwrap();
        let ann = add_player(&pool, &session.id, 1, "Ann").await.unwrap();
        let beer = add_drink(&pool, &session.id, "Beer").await.unwrap();
        let wine = add_drink(&pool, &session.id, "Wine").await.unwrap();

        increment_stat(&pool, &session.id, &ann, &beer).await.unwrap();
        increment_stat(&pool, &session.id, &ann, &beer).await.unwrap();
        increment_stat(&pool, &session.id, &ann, &wine).await.unwrap();

        let stats = read_stats(&pool, &session.id).await.unwrap();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].drink_id, beer.id);
        assert_eq!(stats[0].count, 2);
        assert_eq!(stats[1].drink_name, "Wine");
        assert_eq!(stats[1].count, 1);
    }

    #[tokio::test]
    async fn test_stats_survive_catalog_clear() {
        let pool = test_pool().await;
        let session = create_session(&pool, 1, 10).await.unwrap();
        let ann = add_player(&pool, &session.id, 1, "Ann").await.unwrap();
        let beer = add_drink(&pool, &session.id, "Beer").await.unwrap();

        increment_stat(&pool, &session.id, &ann, &beer).await.unwrap();
        clear_drinks(&pool, &session.id).await.unwrap();

        let stats = read_stats(&pool, &session.id).await.unwrap();
        assert_eq!(stats[0].drink_name, "Beer");
        assert_eq!(stats[0].player_name, "Ann");
    }
}
