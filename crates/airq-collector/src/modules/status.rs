//! 저장소 조회 기반 수집 현황.
//!
//! API를 호출하지 않고 저장소만 읽어 지점별 측정값 수, 최신 관측 시각,
//! 최근 측정값 목록을 보고합니다. API 키 없이도 동작합니다.

use airq_core::Location;
use airq_data::{ReadingRecord, ReadingStore};

/// 지점 한 곳의 저장 현황.
#[derive(Debug)]
pub struct LocationStatus {
    pub location_id: String,
    pub name: String,
    /// 저장된 측정값 수
    pub reading_count: i64,
    /// 최신 관측 시각 (RFC 3339), 데이터가 없으면 `None`
    pub latest_timestamp: Option<String>,
    /// 최근 측정값 (시각 역순, 최대 `recent_limit`건)
    pub recent: Vec<ReadingRecord>,
}

/// 지점별 저장 현황을 설정 순서대로 조회합니다.
pub async fn collect_status(
    store: &ReadingStore,
    locations: &[Location],
    recent_limit: i64,
) -> airq_data::Result<Vec<LocationStatus>> {
    let mut statuses = Vec::with_capacity(locations.len());

    for location in locations {
        statuses.push(LocationStatus {
            location_id: location.id.clone(),
            name: location.name.clone(),
            reading_count: store.count_readings_for(&location.id).await?,
            latest_timestamp: store.latest_timestamp(&location.id).await?,
            recent: store
                .recent_readings_for(&location.id, recent_limit)
                .await?,
        });
    }

    Ok(statuses)
}

/// 지점별 현황을 로그로 출력합니다.
pub fn log_status(statuses: &[LocationStatus]) {
    tracing::info!("=== 수집 현황 ===");
    for status in statuses {
        match &status.latest_timestamp {
            Some(latest) => tracing::info!(
                location = %status.name,
                readings = status.reading_count,
                latest = %latest,
                "지점 현황"
            ),
            None => tracing::info!(location = %status.name, "지점 현황: 데이터 없음"),
        }
        for record in &status.recent {
            tracing::debug!(
                timestamp = %record.timestamp,
                pm2_5 = ?record.pm2_5,
                aqi = ?record.aqi,
                temp = ?record.temp,
                "최근 측정값"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use airq_core::AirQualityReading;
    use chrono::{TimeZone, Utc};

    fn sample_reading(location: &Location, unix_ts: i64) -> AirQualityReading {
        AirQualityReading {
            location_id: location.id.clone(),
            location_name: location.name.clone(),
            lat: location.lat,
            lon: location.lon,
            timestamp: Utc.timestamp_opt(unix_ts, 0).single().unwrap(),
            pm2_5: Some(12.0),
            pm10: Some(20.0),
            o3: Some(33.0),
            no2: Some(4.0),
            aqi: Some(2),
            temp: Some(28.5),
            humidity: Some(68.0),
            pressure: Some(1010.0),
            wind_speed: Some(2.2),
        }
    }

    fn test_locations() -> Vec<Location> {
        vec![
            Location::new("parque_central", "Parque Central", 8.3107, -73.6236),
            Location::new("estadio", "Estadio", 8.3016, -73.6228),
        ]
    }

    #[tokio::test]
    async fn test_collect_status_reports_per_location() {
        let store = ReadingStore::connect_in_memory().await.unwrap();
        store.init().await.unwrap();

        let locations = test_locations();
        store
            .insert_reading(&sample_reading(&locations[0], 1_717_200_000))
            .await
            .unwrap();
        store
            .insert_reading(&sample_reading(&locations[0], 1_717_203_600))
            .await
            .unwrap();

        let statuses = collect_status(&store, &locations, 10).await.unwrap();
        assert_eq!(statuses.len(), 2);

        assert_eq!(statuses[0].location_id, "parque_central");
        assert_eq!(statuses[0].reading_count, 2);
        assert_eq!(
            statuses[0].latest_timestamp.as_deref(),
            Some("2024-06-01T01:00:00Z")
        );
        assert_eq!(statuses[0].recent.len(), 2);
        assert_eq!(statuses[0].recent[0].timestamp, "2024-06-01T01:00:00Z");

        // 데이터 없는 지점도 현황에 포함
        assert_eq!(statuses[1].location_id, "estadio");
        assert_eq!(statuses[1].reading_count, 0);
        assert_eq!(statuses[1].latest_timestamp, None);
        assert!(statuses[1].recent.is_empty());
    }

    #[tokio::test]
    async fn test_collect_status_respects_recent_limit() {
        let store = ReadingStore::connect_in_memory().await.unwrap();
        store.init().await.unwrap();

        let locations = test_locations();
        for hour in 0..4 {
            store
                .insert_reading(&sample_reading(&locations[0], 1_717_200_000 + hour * 3600))
                .await
                .unwrap();
        }

        let statuses = collect_status(&store, &locations[..1], 2).await.unwrap();
        assert_eq!(statuses[0].reading_count, 4);
        assert_eq!(statuses[0].recent.len(), 2);
        assert_eq!(statuses[0].recent[0].timestamp, "2024-06-01T03:00:00Z");
    }
}
