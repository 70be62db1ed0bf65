//! # 추첨 알림 중계 서비스
//!
//! 엔진이 보낸 `DrawNotice`를 받아서 채팅 쪽으로 넘기는 자리입니다.
//! 채팅 플랫폼 전송은 이 프로젝트 밖의 일이므로 지금은 구조화된 로그로 남깁니다.
//! 엔진이 사라져 채널이 닫히면 루프가 끝납니다.

use tokio::sync::mpsc;

use crate::models::DrawNotice;

/// 채널이 닫힐 때까지 알림을 중계합니다. 중계한 알림 수를 반환합니다.
pub async fn relay_draws(mut notices: mpsc::UnboundedReceiver<DrawNotice>) -> usize {
    let mut relayed = 0;

    while let Some(notice) = notices.recv().await {
        tracing::info!(
            chat_id = notice.chat_id,
            player = %notice.player_name,
            drink = %notice.drink_name,
            drawn_at = %notice.drawn_at,
            "Player drinks"
        );
        relayed += 1;
    }

    tracing::debug!(relayed, "Draw relay stopped");
    relayed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notice(chat_id: i64) -> DrawNotice {
        DrawNotice {
            chat_id,
            session_id: "s".to_string(),
            player_id: 1,
            player_name: "Ann".to_string(),
            drink_id: "d".to_string(),
            drink_name: "Beer".to_string(),
            drawn_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_relay_drains_until_closed() {
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(notice(1)).unwrap();
        tx.send(notice(2)).unwrap();
        drop(tx);

        assert_eq!(relay_draws(rx).await, 2);
    }
}
