//! 대기질 수집기.
//!
//! OpenWeather Provider와 측정값 저장소를 묶어 두 가지 수집 작업을 제공합니다:
//! - 현재 데이터 수집: 전체 지점의 최신 관측값 한 건씩
//! - 과거 데이터 백필: 지점별 최근 5일치 관측값
//!
//! 백필 시 과거 기상값은 (위도, 경도, 날짜) 단위로 캐시하여
//! timemachine 호출 횟수를 줄입니다.

use crate::error::{DataError, Result};
use crate::provider::openweather::{nearest_sample, WeatherSample};
use crate::provider::{CurrentObservation, OpenWeatherClient};
use crate::storage::ReadingStore;
use airq_core::{default_locations, AirQualityReading, Location};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::Duration;

/// 지점 한 곳의 백필 결과.
#[derive(Debug, Clone, PartialEq)]
pub enum BackfillOutcome {
    /// 조회 성공. `saved`는 실제로 저장된 행 수, `fetched`는 API가 반환한 행 수.
    Completed { saved: u64, fetched: u64 },
    /// 조회 실패. 해당 지점은 아무 행도 기여하지 않습니다.
    Failed { error: String },
}

impl BackfillOutcome {
    /// 성공 여부.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    /// 저장된 행 수 (실패 시 0).
    pub fn saved(&self) -> u64 {
        match self {
            Self::Completed { saved, .. } => *saved,
            Self::Failed { .. } => 0,
        }
    }
}

/// 일일 수집 작업의 외부 계약.
///
/// 오케스트레이터는 이 trait만 사용하므로 테스트에서 mock으로 대체할 수 있습니다.
#[async_trait]
pub trait DailyCollection {
    /// 설정된 측정 지점 수.
    fn location_count(&self) -> usize;

    /// 전체 지점의 현재 데이터를 수집합니다. `(성공 수, 실패 수)` 반환.
    async fn collect_all_locations(&mut self) -> Result<(usize, usize)>;

    /// 전체 지점의 최근 5일치를 백필합니다. 지점별 `(id, 결과)` 쌍을
    /// 설정 순서대로 반환합니다.
    async fn collect_last5days_all_locations(&mut self)
        -> Result<Vec<(String, BackfillOutcome)>>;
}

/// 대기질 수집기.
pub struct AirQualityCollector {
    client: OpenWeatherClient,
    store: ReadingStore,
    locations: Vec<Location>,
    current_delay: Duration,
    backfill_delay: Duration,
    backfill_days: i64,
    backfill_buffer_secs: i64,
    /// (위도, 경도, 날짜) → 시각별 기상 샘플
    wx_cache: HashMap<String, HashMap<i64, WeatherSample>>,
}

impl AirQualityCollector {
    /// 기본 지점 목록으로 수집기를 생성합니다.
    pub fn new(client: OpenWeatherClient, store: ReadingStore) -> Self {
        Self {
            client,
            store,
            locations: default_locations(),
            current_delay: Duration::from_millis(2000),
            backfill_delay: Duration::from_millis(1000),
            backfill_days: 5,
            backfill_buffer_secs: 3600,
            wx_cache: HashMap::new(),
        }
    }

    /// 지점 목록을 교체합니다.
    pub fn with_locations(mut self, locations: Vec<Location>) -> Self {
        self.locations = locations;
        self
    }

    /// API 요청 간 딜레이를 지정합니다.
    pub fn with_request_delays(mut self, current: Duration, backfill: Duration) -> Self {
        self.current_delay = current;
        self.backfill_delay = backfill;
        self
    }

    /// 백필 조회 구간을 지정합니다.
    pub fn with_backfill_window(mut self, days: i64, buffer_secs: i64) -> Self {
        self.backfill_days = days;
        self.backfill_buffer_secs = buffer_secs;
        self
    }

    /// 설정된 측정 지점.
    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    /// 측정값 저장소.
    pub fn store(&self) -> &ReadingStore {
        &self.store
    }

    /// 전체 지점의 현재 대기질 데이터를 수집하고 저장합니다.
    pub async fn collect_all_locations(&mut self) -> Result<(usize, usize)> {
        let locations = self.locations.clone();
        let mut successful = 0usize;
        let mut failed = 0usize;

        for location in &locations {
            tracing::info!(location = %location.name, "현재 데이터 수집 중");

            match self.collect_current_for(location).await {
                Ok(_) => {
                    successful += 1;
                    tracing::info!(location = %location.name, "저장 완료");
                }
                Err(e) => {
                    failed += 1;
                    tracing::error!(location = %location.name, error = %e, "수집 실패");
                }
            }

            // Rate limiting
            tokio::time::sleep(self.current_delay).await;
        }

        tracing::info!(successful, failed, "현재 데이터 수집 완료");
        Ok((successful, failed))
    }

    /// 특정 지점 한 곳의 현재 데이터를 수집합니다.
    ///
    /// 알 수 없는 지점 id는 `NotFound` 에러입니다.
    pub async fn collect_single_location(&mut self, location_id: &str) -> Result<bool> {
        let location = self
            .locations
            .iter()
            .find(|l| l.id == location_id)
            .cloned()
            .ok_or_else(|| DataError::NotFound(format!("location: {}", location_id)))?;

        tracing::info!(location = %location.name, "현재 데이터 수집 중");
        self.collect_current_for(&location).await
    }

    async fn collect_current_for(&mut self, location: &Location) -> Result<bool> {
        let observation = self.client.fetch_current(location.lat, location.lon).await?;
        let reading = build_current_reading(location, &observation);
        self.store.insert_reading(&reading).await
    }

    /// 지점 한 곳의 최근 `backfill_days`일치를 조회하고 저장합니다.
    ///
    /// 반환값은 `(저장된 행 수, 조회된 행 수)`. 관측 시각이 없는 행은
    /// 건너뛰며, 기상값은 가능할 때만 채웁니다.
    pub async fn collect_history_window(&mut self, location: &Location) -> Result<(u64, u64)> {
        let end = Utc::now().timestamp();
        let start = end - self.backfill_days * 24 * 3600 - self.backfill_buffer_secs;

        let items = self
            .client
            .fetch_history(location.lat, location.lon, start, end)
            .await?;

        let fetched = items.len() as u64;
        let mut saved = 0u64;

        for item in &items {
            let Some(dt) = item.dt else {
                continue;
            };
            let Some(timestamp) = DateTime::<Utc>::from_timestamp(dt, 0) else {
                continue;
            };

            let wx = self.weather_at(location.lat, location.lon, dt).await;
            let reading = AirQualityReading {
                location_id: location.id.clone(),
                location_name: location.name.clone(),
                lat: location.lat,
                lon: location.lon,
                timestamp,
                pm2_5: item.components.pm2_5,
                pm10: item.components.pm10,
                o3: item.components.o3,
                no2: item.components.no2,
                aqi: item.main.as_ref().and_then(|m| m.aqi),
                temp: wx.and_then(|w| w.temp),
                humidity: wx.and_then(|w| w.humidity),
                pressure: wx.and_then(|w| w.pressure),
                wind_speed: wx.and_then(|w| w.wind_speed),
            };

            if self.store.insert_reading(&reading).await? {
                saved += 1;
            }
        }

        tracing::info!(
            location = %location.name,
            saved,
            fetched,
            "과거 데이터 저장 완료"
        );
        Ok((saved, fetched))
    }

    /// 전체 지점의 최근 5일치를 백필합니다.
    ///
    /// 지점 한 곳의 실패는 결과 쌍의 `Failed`로 기록될 뿐 전체 순회를
    /// 중단하지 않습니다.
    pub async fn collect_last5days_all_locations(
        &mut self,
    ) -> Result<Vec<(String, BackfillOutcome)>> {
        let locations = self.locations.clone();
        let mut results = Vec::with_capacity(locations.len());

        for (i, location) in locations.iter().enumerate() {
            tracing::info!(
                location = %location.name,
                progress = format!("{}/{}", i + 1, locations.len()),
                "과거 5일 백필"
            );

            let outcome = match self.collect_history_window(location).await {
                Ok((saved, fetched)) => BackfillOutcome::Completed { saved, fetched },
                Err(e) => {
                    tracing::error!(location = %location.name, error = %e, "백필 실패");
                    BackfillOutcome::Failed {
                        error: e.to_string(),
                    }
                }
            };
            results.push((location.id.clone(), outcome));

            // Rate limiting
            tokio::time::sleep(self.backfill_delay).await;
        }

        Ok(results)
    }

    /// `unix_ts`에 가장 가까운 (±1시간) 과거 기상 샘플.
    ///
    /// 해당 날짜의 샘플을 아직 받지 않았다면 timemachine에서 가져와 캐시합니다.
    async fn weather_at(&mut self, lat: f64, lon: f64, unix_ts: i64) -> Option<WeatherSample> {
        let day = DateTime::<Utc>::from_timestamp(unix_ts, 0)?
            .date_naive()
            .to_string();
        let key = format!("{:.6}:{:.6}:{}", lat, lon, day);

        if !self.wx_cache.contains_key(&key) {
            let map = self.client.fetch_day_weather(lat, lon, unix_ts).await;
            self.wx_cache.insert(key.clone(), map);
        }

        let day_map = self.wx_cache.get(&key)?;
        nearest_sample(day_map, unix_ts).copied()
    }
}

#[async_trait]
impl DailyCollection for AirQualityCollector {
    fn location_count(&self) -> usize {
        self.locations.len()
    }

    async fn collect_all_locations(&mut self) -> Result<(usize, usize)> {
        AirQualityCollector::collect_all_locations(self).await
    }

    async fn collect_last5days_all_locations(
        &mut self,
    ) -> Result<Vec<(String, BackfillOutcome)>> {
        AirQualityCollector::collect_last5days_all_locations(self).await
    }
}

/// 현재 관측 응답을 측정값으로 변환합니다.
///
/// 관측 시각은 API의 `dt`를 쓰고, 없으면 현재 시각(초 단위)으로 대체합니다.
fn build_current_reading(
    location: &Location,
    observation: &CurrentObservation,
) -> AirQualityReading {
    let entry = observation.air.list.first();
    let timestamp = entry
        .and_then(|e| e.dt)
        .and_then(|dt| DateTime::<Utc>::from_timestamp(dt, 0))
        .unwrap_or_else(|| {
            DateTime::<Utc>::from_timestamp(Utc::now().timestamp(), 0)
                .unwrap_or_else(Utc::now)
        });

    let weather_main = observation.weather.main.as_ref();

    AirQualityReading {
        location_id: location.id.clone(),
        location_name: location.name.clone(),
        lat: location.lat,
        lon: location.lon,
        timestamp,
        pm2_5: entry.and_then(|e| e.components.pm2_5),
        pm10: entry.and_then(|e| e.components.pm10),
        o3: entry.and_then(|e| e.components.o3),
        no2: entry.and_then(|e| e.components.no2),
        aqi: entry.and_then(|e| e.main.as_ref()).and_then(|m| m.aqi),
        temp: weather_main.and_then(|m| m.temp),
        humidity: weather_main.and_then(|m| m.humidity),
        pressure: weather_main.and_then(|m| m.pressure),
        wind_speed: observation
            .weather
            .wind
            .as_ref()
            .and_then(|w| w.speed),
    }
}
