//! # 애플리케이션 설정(Configuration) 모듈
//!
//! 환경변수에서 봇 설정값을 읽어오는 모듈입니다.
//! `.env` 파일이나 시스템 환경변수에서 값을 가져옵니다.
//!
//! 설정 항목:
//! - `DATABASE_URL`: SQLite 데이터베이스 경로
//! - `HOST`: 서버 바인딩 주소
//! - `PORT`: 서버 포트 번호
//! - `DEFAULT_TIMER_MINUTES`: 새 세션의 기본 타이머(분)
//! - `MAX_TIMER_MINUTES`: 타이머로 입력할 수 있는 최대값(분)

use std::env;

/// 새 세션이 만들어질 때의 타이머 기본값 (분)
pub const DEFAULT_TIMER_MINUTES: i64 = 10;

/// 타이머 입력 상한 (하루)
pub const MAX_TIMER_MINUTES: i64 = 24 * 60;

/// `MAX_TIMER_MINUTES` 환경변수로 올릴 수 있는 한계 (1년)
///
/// 이보다 큰 주기는 틱 간격 계산(`분 × 60`)이나 `Instant` 덧셈이 넘칠 수 있습니다.
pub const TIMER_MINUTES_CEILING: i64 = 365 * 24 * 60;

/// 애플리케이션 전체 설정을 담는 구조체
///
/// 시작 시 환경변수에서 한 번 읽어온 후 엔진과 라우터가 공유합니다.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite 데이터베이스 파일 경로 (예: "sqlite:data/party.db?mode=rwc")
    pub database_url: String,
    /// 서버가 바인딩할 호스트 주소 (기본값: "0.0.0.0")
    pub host: String,
    /// 서버 포트 번호 (기본값: 3000)
    pub port: u16,
    /// 게임 설정값
    pub game: GameConfig,
}

/// 게임 엔진이 사용하는 설정값
///
/// 엔진은 HTTP 설정을 알 필요가 없으므로 따로 분리해 둡니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig {
    /// 세션 생성 시 `timer_minutes` 초기값
    pub default_timer_minutes: i64,
    /// 타이머 입력 허용 범위의 상한 (`1..=max_timer_minutes`)
    pub max_timer_minutes: i64,
}

impl GameConfig {
    /// 범위를 맞춘 게임 설정을 만듭니다.
    ///
    /// - 상한은 `1..=TIMER_MINUTES_CEILING`으로 자릅니다
    /// - 기본 타이머가 상한을 넘으면 입력으로는 만들 수 없는 값이 되므로 상한으로 자릅니다
    pub fn new(default_timer_minutes: i64, max_timer_minutes: i64) -> Self {
        let max_timer_minutes = max_timer_minutes.clamp(1, TIMER_MINUTES_CEILING);

        Self {
            default_timer_minutes: default_timer_minutes.clamp(1, max_timer_minutes),
            max_timer_minutes,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TIMER_MINUTES, MAX_TIMER_MINUTES)
    }
}

impl Config {
    /// 환경변수에서 설정값을 읽어 Config 인스턴스를 생성합니다.
    ///
    /// # 에러
    /// `DATABASE_URL`은 필수이며, 없으면 에러가 발생합니다.
    /// 나머지 설정은 기본값이 있어 환경변수가 없어도 동작합니다.
    pub fn from_env() -> Result<Self, env::VarError> {
        let max_timer_minutes = env::var("MAX_TIMER_MINUTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|v: &i64| *v > 0)
            .unwrap_or(MAX_TIMER_MINUTES);

        let default_timer_minutes = env::var("DEFAULT_TIMER_MINUTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|v: &i64| *v > 0)
            .unwrap_or(DEFAULT_TIMER_MINUTES);

        Ok(Self {
            database_url: env::var("DATABASE_URL")?, // 필수: 없으면 에러
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
            game: GameConfig::new(default_timer_minutes, max_timer_minutes),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_game_config() {
        let config = GameConfig::default();
        assert_eq!(config.default_timer_minutes, 10);
        assert_eq!(config.max_timer_minutes, 1440);
    }

    #[test]
    fn test_game_config_clamps_to_ceiling() {
        let config = GameConfig::new(i64::MAX, i64::MAX);
        assert_eq!(config.max_timer_minutes, TIMER_MINUTES_CEILING);
        assert_eq!(config.default_timer_minutes, TIMER_MINUTES_CEILING);

        let config = GameConfig::new(30, 5);
        assert_eq!(config.default_timer_minutes, 5);
    }
}
