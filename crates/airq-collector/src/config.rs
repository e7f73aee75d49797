//! 환경변수 기반 설정 모듈.

use crate::error::CollectorError;
use crate::Result;
use std::path::Path;
use std::time::Duration;

/// Collector 전체 설정
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// SQLite 데이터베이스 경로
    pub database_path: String,
    /// 현재 데이터 수집 설정
    pub current_collect: CurrentCollectConfig,
    /// 백필 설정
    pub backfill: BackfillConfig,
    /// 데몬 모드 설정
    pub daemon: DaemonConfig,
}

/// 현재 데이터 수집 설정
#[derive(Debug, Clone)]
pub struct CurrentCollectConfig {
    /// API 요청 간 딜레이 (밀리초)
    pub request_delay_ms: u64,
}

impl CurrentCollectConfig {
    /// 요청 간 딜레이
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

/// 백필 설정
#[derive(Debug, Clone)]
pub struct BackfillConfig {
    /// 조회 일수 (OpenWeather 최대 5일)
    pub days: i64,
    /// 조회 구간 추가 버퍼 (초)
    pub buffer_secs: i64,
    /// API 요청 간 딜레이 (밀리초)
    pub request_delay_ms: u64,
}

impl BackfillConfig {
    /// 요청 간 딜레이
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

/// 데몬 모드 설정
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// 일일 수집 실행 주기 (분 단위, 기본 24시간)
    pub interval_minutes: u64,
}

impl DaemonConfig {
    /// 실행 주기
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes * 60)
    }
}

impl CollectorConfig {
    /// 환경변수에서 설정 로드
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database_path: std::env::var("AIRQ_DB_PATH")
                .unwrap_or_else(|_| "data/air_quality.db".to_string()),
            current_collect: CurrentCollectConfig {
                request_delay_ms: env_var_parse("CURRENT_REQUEST_DELAY_MS", 2000),
            },
            backfill: BackfillConfig {
                days: env_var_parse("BACKFILL_DAYS", 5),
                buffer_secs: env_var_parse("BACKFILL_BUFFER_SECS", 3600),
                request_delay_ms: env_var_parse("BACKFILL_REQUEST_DELAY_MS", 1000),
            },
            daemon: DaemonConfig {
                interval_minutes: env_var_parse("DAEMON_INTERVAL_MINUTES", 1440),
            },
        })
    }
}

/// 환경변수 파싱 (실패 시 기본값)
fn env_var_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// API 키 로드.
///
/// `OPENWEATHER_API_KEY` 환경변수를 먼저 확인하고, 없으면 작업 디렉터리의
/// `config.json`에서 `openweather_api_key` 키를 읽습니다.
pub fn load_api_key() -> Result<Option<String>> {
    resolve_api_key(
        std::env::var("OPENWEATHER_API_KEY").ok(),
        Path::new("config.json"),
    )
}

/// 환경변수 값과 설정 파일 경로를 받아 API 키를 결정합니다.
///
/// - 환경변수 값이 비어 있지 않으면 그대로 사용
/// - 설정 파일이 없으면 에러가 아니라 "키 없음"
/// - 설정 파일 JSON이 깨져 있으면 에러 (상위에서 치명적 오류로 처리)
pub fn resolve_api_key(env_value: Option<String>, config_path: &Path) -> Result<Option<String>> {
    if let Some(key) = env_value {
        if !key.trim().is_empty() {
            return Ok(Some(key));
        }
    }

    let contents = match std::fs::read_to_string(config_path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(CollectorError::Config(format!(
                "config.json 읽기 실패: {}",
                e
            )))
        }
    };

    let value: serde_json::Value = serde_json::from_str(&contents)
        .map_err(|e| CollectorError::Config(format!("config.json 파싱 실패: {}", e)))?;

    Ok(value
        .get("openweather_api_key")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .filter(|s| !s.trim().is_empty()))
}

/// API 키 게이트.
///
/// 키가 없으면 에러 로그 후 `Ok(false)`를 반환합니다. 이후 단계(저장소 연결,
/// 수집기 생성)는 `then`에 담겨 있으므로 키가 없으면 아예 실행되지 않습니다.
pub async fn with_api_key<F, Fut>(resolved: Option<String>, then: F) -> Result<bool>
where
    F: FnOnce(String) -> Fut,
    Fut: std::future::Future<Output = Result<bool>>,
{
    let Some(key) = resolved else {
        tracing::error!("OPENWEATHER_API_KEY가 설정되지 않았습니다");
        tracing::error!("환경변수를 설정하거나 config.json을 생성하세요");
        return Ok(false);
    };
    then(key).await
}
