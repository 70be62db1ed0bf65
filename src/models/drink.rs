//! # 음료 모델 정의

use serde::{Deserialize, Serialize};

/// 음료: DB의 `drinks` 테이블 한 행에 대응합니다.
///
/// 이름은 세션 안에서 대소문자까지 정확히 일치하면 중복으로 봅니다.
/// 하나씩 지우는 기능은 없고, 목록 전체를 비울 수만 있습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Drink {
    /// 음료 고유 식별자 (UUIDv7)
    pub id: String,
    pub session_id: String,
    pub name: String,
    pub created_at: String,
}
