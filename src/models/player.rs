//! # 플레이어 모델 정의

use serde::{Deserialize, Serialize};

/// 참가자: DB의 `players` 테이블 한 행에 대응합니다.
///
/// 같은 세션 안에서 `user_id`(채팅 플랫폼 사용자 ID)는 유일합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Player {
    pub session_id: String,
    pub user_id: i64,
    /// 화면에 보여줄 이름
    pub name: String,
    pub joined_at: String,
}

/// 참가 요청: `POST /api/v1/chats/{chat_id}/players`의 요청 본문
///
/// 채팅 플랫폼이 넘겨주는 사용자 정보를 그대로 받고, 이름은 서버에서 만듭니다.
#[derive(Debug, Deserialize)]
pub struct JoinRequest {
    pub user_id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

impl JoinRequest {
    pub fn display_name(&self) -> String {
        display_name(
            self.user_id,
            self.first_name.as_deref(),
            self.last_name.as_deref(),
            self.username.as_deref(),
        )
    }
}

/// 채팅 플랫폼 사용자 정보로 표시 이름을 만듭니다.
///
/// 이름이나 성 중 하나라도 있으면 "이름 성", 둘 다 없으면 username,
/// 그마저 없으면 `player <id>`를 씁니다.
pub fn display_name(
    user_id: i64,
    first_name: Option<&str>,
    last_name: Option<&str>,
    username: Option<&str>,
) -> String {
    let first = first_name.unwrap_or("").trim();
    let last = last_name.unwrap_or("").trim();

    if !first.is_empty() || !last.is_empty() {
        return format!("{first} {last}").trim().to_string();
    }

    match username.map(str::trim) {
        Some(u) if !u.is_empty() => u.to_string(),
        _ => format!("player {user_id}"),
    }
}
