//! 대기질 측정값 SQLite 저장소.
//!
//! # 동작 방식
//!
//! 1. 연결 시 DB 파일이 없으면 생성 (WAL 모드)
//! 2. `init()`으로 테이블/인덱스 생성 (idempotent)
//! 3. `(location_id, timestamp)` 고유 제약으로 중복 저장 방지
//!    - 재수집이나 백필 구간이 겹쳐도 같은 관측값은 한 번만 저장됩니다
//!
//! # 사용 예제
//!
//! ```rust,ignore
//! use airq_data::storage::ReadingStore;
//!
//! let store = ReadingStore::connect("data/air_quality.db").await?;
//! store.init().await?;
//! let written = store.insert_reading(&reading).await?;
//! ```

use crate::error::Result;
use airq_core::AirQualityReading;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{FromRow, Row};
use std::path::Path;
use std::str::FromStr;

/// 측정값 데이터베이스 레코드.
#[derive(Debug, Clone, FromRow)]
pub struct ReadingRecord {
    pub location_id: String,
    pub location_name: String,
    pub lat: f64,
    pub lon: f64,
    /// RFC 3339 (UTC, 초 단위)
    pub timestamp: String,
    pub pm2_5: Option<f64>,
    pub pm10: Option<f64>,
    pub o3: Option<f64>,
    pub no2: Option<f64>,
    pub aqi: Option<i32>,
    pub temp: Option<f64>,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
    pub wind_speed: Option<f64>,
}

/// 측정값 저장소.
pub struct ReadingStore {
    pool: SqlitePool,
}

impl ReadingStore {
    /// 파일 기반 SQLite 저장소에 연결합니다.
    pub async fn connect(path: &str) -> Result<Self> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| crate::DataError::ConnectionError(e.to_string()))?;
            }
        }
        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", path))
            .map_err(|e| crate::DataError::ConnectionError(e.to_string()))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .busy_timeout(std::time::Duration::from_secs(5))
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);
        let pool = SqlitePoolOptions::new().connect_with(opts).await?;
        Ok(Self { pool })
    }

    /// 인메모리 저장소에 연결합니다 (테스트용).
    pub async fn connect_in_memory() -> Result<Self> {
        let opts = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| crate::DataError::ConnectionError(e.to_string()))?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(opts)
            .await?;
        Ok(Self { pool })
    }

    /// 테이블과 인덱스를 생성합니다.
    pub async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS air_quality (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                location_id TEXT NOT NULL,
                location_name TEXT NOT NULL,
                lat REAL NOT NULL,
                lon REAL NOT NULL,
                timestamp TEXT NOT NULL,
                pm2_5 REAL,
                pm10 REAL,
                o3 REAL,
                no2 REAL,
                aqi INTEGER,
                temp REAL,
                humidity REAL,
                pressure REAL,
                wind_speed REAL,
                UNIQUE(location_id, timestamp)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_air_quality_timestamp ON air_quality(timestamp)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// 측정값 한 건을 저장합니다.
    ///
    /// 같은 지점/시각의 측정값이 이미 있으면 건너뛰고 `false`를 반환합니다.
    pub async fn insert_reading(&self, reading: &AirQualityReading) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO air_quality
            (location_id, location_name, lat, lon, timestamp,
             pm2_5, pm10, o3, no2, aqi, temp, humidity, pressure, wind_speed)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(&reading.location_id)
        .bind(&reading.location_name)
        .bind(reading.lat)
        .bind(reading.lon)
        .bind(format_timestamp(&reading.timestamp))
        .bind(reading.pm2_5)
        .bind(reading.pm10)
        .bind(reading.o3)
        .bind(reading.no2)
        .bind(reading.aqi)
        .bind(reading.temp)
        .bind(reading.humidity)
        .bind(reading.pressure)
        .bind(reading.wind_speed)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// 저장된 전체 측정값 수.
    pub async fn count_readings(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM air_quality")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// 특정 지점의 측정값 수.
    pub async fn count_readings_for(&self, location_id: &str) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM air_quality WHERE location_id = $1",
        )
        .bind(location_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// 특정 지점의 최신 관측 시각 (RFC 3339).
    pub async fn latest_timestamp(&self, location_id: &str) -> Result<Option<String>> {
        let row = sqlx::query(
            "SELECT MAX(timestamp) AS ts FROM air_quality WHERE location_id = $1",
        )
        .bind(location_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.try_get::<Option<String>, _>("ts")?)
    }

    /// 특정 지점의 측정값을 시각 역순으로 조회합니다.
    pub async fn recent_readings_for(
        &self,
        location_id: &str,
        limit: i64,
    ) -> Result<Vec<ReadingRecord>> {
        let records = sqlx::query_as::<_, ReadingRecord>(
            r#"
            SELECT location_id, location_name, lat, lon, timestamp,
                   pm2_5, pm10, o3, no2, aqi, temp, humidity, pressure, wind_speed
            FROM air_quality
            WHERE location_id = $1
            ORDER BY timestamp DESC
            LIMIT $2
            "#,
        )
        .bind(location_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }
}

/// 관측 시각을 초 단위 RFC 3339(UTC) 문자열로 변환합니다.
///
/// 고유 제약의 키이므로 초 단위로 고정합니다.
fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_reading(location_id: &str, unix_ts: i64) -> AirQualityReading {
        AirQualityReading {
            location_id: location_id.to_string(),
            location_name: "Parque Central".to_string(),
            lat: 8.310675833008426,
            lon: -73.62363665855918,
            timestamp: Utc.timestamp_opt(unix_ts, 0).single().unwrap(),
            pm2_5: Some(14.2),
            pm10: Some(22.8),
            o3: Some(35.0),
            no2: Some(4.1),
            aqi: Some(2),
            temp: Some(29.1),
            humidity: Some(65.0),
            pressure: Some(1011.0),
            wind_speed: Some(2.4),
        }
    }

    #[tokio::test]
    async fn test_insert_and_count() {
        let store = ReadingStore::connect_in_memory().await.unwrap();
        store.init().await.unwrap();

        let written = store
            .insert_reading(&sample_reading("parque_central", 1_717_200_000))
            .await
            .unwrap();
        assert!(written);
        assert_eq!(store.count_readings().await.unwrap(), 1);
        assert_eq!(
            store.count_readings_for("parque_central").await.unwrap(),
            1
        );
        assert_eq!(store.count_readings_for("estadio").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_insert_is_skipped() {
        let store = ReadingStore::connect_in_memory().await.unwrap();
        store.init().await.unwrap();

        let reading = sample_reading("parque_central", 1_717_200_000);
        assert!(store.insert_reading(&reading).await.unwrap());
        // 같은 지점/시각 재삽입은 무시
        assert!(!store.insert_reading(&reading).await.unwrap());
        assert_eq!(store.count_readings().await.unwrap(), 1);

        // 다른 시각은 새 행
        assert!(store
            .insert_reading(&sample_reading("parque_central", 1_717_203_600))
            .await
            .unwrap());
        assert_eq!(store.count_readings().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_latest_timestamp_and_recent() {
        let store = ReadingStore::connect_in_memory().await.unwrap();
        store.init().await.unwrap();

        store
            .insert_reading(&sample_reading("estadio", 1_717_200_000))
            .await
            .unwrap();
        store
            .insert_reading(&sample_reading("estadio", 1_717_203_600))
            .await
            .unwrap();

        let latest = store.latest_timestamp("estadio").await.unwrap();
        assert_eq!(latest.as_deref(), Some("2024-06-01T01:00:00Z"));
        assert_eq!(store.latest_timestamp("bosque").await.unwrap(), None);

        let recent = store.recent_readings_for("estadio", 10).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].timestamp, "2024-06-01T01:00:00Z");
        assert_eq!(recent[0].aqi, Some(2));
    }

    #[test]
    fn test_format_timestamp_second_precision() {
        let ts = Utc.timestamp_opt(1_717_200_000, 123_456_789).single().unwrap();
        assert_eq!(format_timestamp(&ts), "2024-06-01T00:00:00Z");
    }
}
