//! OpenWeather API 클라이언트.
//!
//! OpenWeather API를 통해 대기질 및 기상 데이터를 수집합니다.
//!
//! # 지원 데이터
//!
//! - 현재 대기질 (`/data/2.5/air_pollution`) + 현재 기상 (`/data/2.5/weather`)
//! - 과거 대기질 (`/data/2.5/air_pollution/history`, 최대 5일 전까지)
//! - 과거 기상 (`onecall/timemachine`, API 플랜에 따라 v3.0 먼저 시도 후 v2.5)
//!
//! # 사용 예제
//!
//! ```rust,ignore
//! use airq_data::provider::OpenWeatherClient;
//!
//! let client = OpenWeatherClient::new("YOUR_API_KEY");
//! let obs = client.fetch_current(8.312, -73.626).await?;
//! ```

use crate::error::{DataError, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

const CURRENT_TIMEOUT: Duration = Duration::from_secs(10);
const TIMEMACHINE_TIMEOUT: Duration = Duration::from_secs(15);
const HISTORY_TIMEOUT: Duration = Duration::from_secs(30);

/// OpenWeather API 클라이언트.
#[derive(Clone)]
pub struct OpenWeatherClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

/// 대기질 응답 (`/air_pollution`, `/air_pollution/history`).
#[derive(Debug, Clone, Deserialize)]
pub struct AirPollutionResponse {
    /// 관측값 목록 (현재 조회 시 1건)
    #[serde(default)]
    pub list: Vec<AirPollutionEntry>,
}

/// 대기질 관측값 한 건.
#[derive(Debug, Clone, Deserialize)]
pub struct AirPollutionEntry {
    /// 관측 시각 (unix 초)
    pub dt: Option<i64>,
    /// AQI 지수
    pub main: Option<AqiMain>,
    /// 오염 물질 농도
    #[serde(default)]
    pub components: Components,
}

/// AQI 지수 래퍼.
#[derive(Debug, Clone, Deserialize)]
pub struct AqiMain {
    pub aqi: Option<i32>,
}

/// 오염 물질 농도 (μg/m³).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Components {
    pub pm2_5: Option<f64>,
    pub pm10: Option<f64>,
    pub o3: Option<f64>,
    pub no2: Option<f64>,
}

/// 현재 기상 응답 (`/weather`).
#[derive(Debug, Clone, Deserialize)]
pub struct WeatherResponse {
    pub main: Option<WeatherMain>,
    pub wind: Option<Wind>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeatherMain {
    pub temp: Option<f64>,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Wind {
    pub speed: Option<f64>,
}

/// 현재 대기질 + 기상 관측값 묶음.
#[derive(Debug, Clone)]
pub struct CurrentObservation {
    pub air: AirPollutionResponse,
    pub weather: WeatherResponse,
}

/// 과거 기상 샘플 한 건.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WeatherSample {
    pub temp: Option<f64>,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
    pub wind_speed: Option<f64>,
}

/// timemachine 응답. 플랜/버전에 따라 `hourly`, `current`, `data` 중
/// 어느 필드로든 샘플이 올 수 있습니다.
#[derive(Debug, Clone, Deserialize)]
struct TimemachineResponse {
    #[serde(default)]
    hourly: Vec<TimemachineEntry>,
    current: Option<TimemachineEntry>,
    #[serde(default)]
    data: Vec<TimemachineEntry>,
}

#[derive(Debug, Clone, Deserialize)]
struct TimemachineEntry {
    dt: Option<i64>,
    temp: Option<f64>,
    humidity: Option<f64>,
    pressure: Option<f64>,
    wind_speed: Option<f64>,
    wind: Option<Wind>,
    main: Option<WeatherMain>,
}

impl TimemachineEntry {
    /// 필드 위치가 다른 응답 변형들을 공통 샘플로 정규화합니다.
    fn normalize(&self) -> WeatherSample {
        let main = self.main.as_ref();
        WeatherSample {
            temp: self.temp.or(main.and_then(|m| m.temp)),
            humidity: self.humidity.or(main.and_then(|m| m.humidity)),
            pressure: self.pressure.or(main.and_then(|m| m.pressure)),
            wind_speed: self
                .wind_speed
                .or(self.wind.as_ref().and_then(|w| w.speed)),
        }
    }
}

impl OpenWeatherClient {
    /// 새 클라이언트를 생성합니다.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// 베이스 URL을 지정하여 클라이언트를 생성합니다 (테스트용).
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }

    /// 현재 대기질 + 기상 데이터를 가져옵니다.
    ///
    /// 두 요청 모두 성공해야 관측값을 반환합니다.
    pub async fn fetch_current(&self, lat: f64, lon: f64) -> Result<CurrentObservation> {
        let air_url = format!("{}/data/2.5/air_pollution", self.base_url);
        let air_resp = self
            .client
            .get(&air_url)
            .query(&[
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("appid", self.api_key.clone()),
            ])
            .timeout(CURRENT_TIMEOUT)
            .send()
            .await?;

        let weather_url = format!("{}/data/2.5/weather", self.base_url);
        let weather_resp = self
            .client
            .get(&weather_url)
            .query(&[
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("appid", self.api_key.clone()),
                ("units", "metric".to_string()),
            ])
            .timeout(CURRENT_TIMEOUT)
            .send()
            .await?;

        if !air_resp.status().is_success() || !weather_resp.status().is_success() {
            return Err(DataError::FetchError(format!(
                "API request failed: air={}, weather={}",
                air_resp.status(),
                weather_resp.status()
            )));
        }

        let air = air_resp.json::<AirPollutionResponse>().await?;
        let weather = weather_resp.json::<WeatherResponse>().await?;
        Ok(CurrentObservation { air, weather })
    }

    /// `[start, end]` 구간의 과거 대기질 관측값을 가져옵니다 (unix 초).
    ///
    /// OpenWeather는 최대 5일 전까지의 이력을 제공합니다.
    pub async fn fetch_history(
        &self,
        lat: f64,
        lon: f64,
        start: i64,
        end: i64,
    ) -> Result<Vec<AirPollutionEntry>> {
        let url = format!("{}/data/2.5/air_pollution/history", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(&[
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("start", start.to_string()),
                ("end", end.to_string()),
                ("appid", self.api_key.clone()),
            ])
            .timeout(HISTORY_TIMEOUT)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(DataError::FetchError(format!(
                "history request failed: {}",
                resp.status()
            )));
        }

        Ok(resp.json::<AirPollutionResponse>().await?.list)
    }

    /// `unix_ts`가 속한 UTC 날짜의 과거 기상 샘플을 시각별로 가져옵니다.
    ///
    /// 정오 시각으로 timemachine을 조회하며, v3.0 엔드포인트 먼저 시도 후
    /// v2.5로 fallback합니다. 모두 실패하면 빈 맵을 반환합니다 (기상값 없이
    /// 대기질만 저장하는 것이 조회 중단보다 낫습니다).
    pub async fn fetch_day_weather(
        &self,
        lat: f64,
        lon: f64,
        unix_ts: i64,
    ) -> HashMap<i64, WeatherSample> {
        let Some(noon) = noon_of_day(unix_ts) else {
            return HashMap::new();
        };

        let bases = [
            format!("{}/data/3.0/onecall/timemachine", self.base_url),
            format!("{}/data/2.5/onecall/timemachine", self.base_url),
        ];

        for base in &bases {
            let resp = self
                .client
                .get(base)
                .query(&[
                    ("lat", lat.to_string()),
                    ("lon", lon.to_string()),
                    ("dt", noon.to_string()),
                    ("appid", self.api_key.clone()),
                    ("units", "metric".to_string()),
                ])
                .timeout(TIMEMACHINE_TIMEOUT)
                .send()
                .await;

            let resp = match resp {
                Ok(r) if r.status().is_success() => r,
                Ok(r) => {
                    tracing::debug!(url = %base, status = %r.status(), "timemachine 응답 실패, 다음 엔드포인트 시도");
                    continue;
                }
                Err(e) => {
                    tracing::debug!(url = %base, error = %e, "timemachine 요청 실패, 다음 엔드포인트 시도");
                    continue;
                }
            };

            let payload = match resp.json::<TimemachineResponse>().await {
                Ok(p) => p,
                Err(e) => {
                    tracing::debug!(url = %base, error = %e, "timemachine 파싱 실패");
                    continue;
                }
            };

            let mut map = HashMap::new();
            for entry in payload
                .hourly
                .iter()
                .chain(payload.current.iter())
                .chain(payload.data.iter())
            {
                if let Some(dt) = entry.dt {
                    map.insert(dt, entry.normalize());
                }
            }
            return map;
        }

        HashMap::new()
    }
}

/// `unix_ts`가 속한 UTC 날짜의 12:00 시각 (unix 초).
fn noon_of_day(unix_ts: i64) -> Option<i64> {
    let day = DateTime::<Utc>::from_timestamp(unix_ts, 0)?.date_naive();
    Some(day.and_hms_opt(12, 0, 0)?.and_utc().timestamp())
}

/// `ts`에 가장 가까운 기상 샘플을 찾습니다. ±1시간을 벗어나면 None.
pub fn nearest_sample(map: &HashMap<i64, WeatherSample>, ts: i64) -> Option<&WeatherSample> {
    let (nearest, sample) = map.iter().min_by_key(|(k, _)| (**k - ts).abs())?;
    if (nearest - ts).abs() > 3600 {
        return None;
    }
    Some(sample)
}
