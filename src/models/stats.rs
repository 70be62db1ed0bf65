//! # 통계 및 추첨 모델 정의
//!
//! - `StatEntry`: (세션, 플레이어, 음료) 하나에 대한 누적 횟수: DB 한 행
//! - `PlayerStats`: 화면 표시용으로 플레이어별로 묶은 통계
//! - `DrawNotice`: 타이머가 한 번 돌 때마다 채팅 어댑터로 보내는 알림
//! - `GameSnapshot`: 설정/정보 화면용 현재 상태

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Drink, Player, Session};

/// 누적 통계 한 행: DB의 `drink_stats` 테이블에 대응합니다.
///
/// 이름은 추첨 당시 값을 복사해 두므로, 이후 음료 목록을 비우거나
/// 플레이어가 나가도 통계는 그대로 읽을 수 있습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct StatEntry {
    pub player_id: i64,
    pub drink_id: String,
    pub player_name: String,
    pub drink_name: String,
    pub count: i64,
}

/// 플레이어 한 명이 마신 음료별 횟수
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerStats {
    pub player_id: i64,
    pub player_name: String,
    pub drinks: Vec<DrinkCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrinkCount {
    pub drink_id: String,
    pub drink_name: String,
    pub count: i64,
}

impl PlayerStats {
    /// DB 행 목록을 플레이어별로 묶습니다. 처음 기록된 순서를 유지합니다.
    pub fn group(entries: Vec<StatEntry>) -> Vec<PlayerStats> {
        let mut grouped: Vec<PlayerStats> = Vec::new();

        for entry in entries {
            let drink = DrinkCount {
                drink_id: entry.drink_id,
                drink_name: entry.drink_name,
                count: entry.count,
            };

            match grouped.iter_mut().find(|p| p.player_id == entry.player_id) {
                Some(player) => player.drinks.push(drink),
                None => grouped.push(PlayerStats {
                    player_id: entry.player_id,
                    player_name: entry.player_name,
                    drinks: vec![drink],
                }),
            }
        }

        grouped
    }
}

/// 한 번의 추첨 결과 알림
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrawNotice {
    pub chat_id: i64,
    pub session_id: String,
    pub player_id: i64,
    pub player_name: String,
    pub drink_id: String,
    pub drink_name: String,
    pub drawn_at: DateTime<Utc>,
}

/// 설정/정보 화면에 보여줄 세션 상태
#[derive(Debug, Clone, Serialize)]
pub struct GameSnapshot {
    pub session: Session,
    pub players: Vec<Player>,
    pub drinks: Vec<Drink>,
}
