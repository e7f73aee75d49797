//! 대기질 측정값 구조체.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 단일 지점/시각의 대기질 및 기상 측정값.
///
/// 오염 물질 농도는 μg/m³, 온도는 섭씨, 기압은 hPa 단위입니다.
/// 과거 데이터 백필 시 기상값이 없을 수 있으므로 모두 Option입니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirQualityReading {
    /// 지점 식별자
    pub location_id: String,
    /// 지점 이름
    pub location_name: String,
    /// 위도
    pub lat: f64,
    /// 경도
    pub lon: f64,
    /// 관측 시각 (UTC)
    pub timestamp: DateTime<Utc>,
    /// PM2.5 농도
    pub pm2_5: Option<f64>,
    /// PM10 농도
    pub pm10: Option<f64>,
    /// 오존(O3) 농도
    pub o3: Option<f64>,
    /// 이산화질소(NO2) 농도
    pub no2: Option<f64>,
    /// OpenWeather AQI 지수 (1~5)
    pub aqi: Option<i32>,
    /// 기온 (°C)
    pub temp: Option<f64>,
    /// 습도 (%)
    pub humidity: Option<f64>,
    /// 기압 (hPa)
    pub pressure: Option<f64>,
    /// 풍속 (m/s)
    pub wind_speed: Option<f64>,
}

impl AirQualityReading {
    /// AQI 지수를 등급으로 변환합니다.
    pub fn aqi_level(&self) -> Option<AqiLevel> {
        self.aqi.map(AqiLevel::from_index)
    }
}

/// OpenWeather AQI 등급 (1: 좋음 ~ 5: 매우 나쁨).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AqiLevel {
    /// 좋음 (1)
    Good,
    /// 보통 (2)
    Fair,
    /// 나쁨 (3)
    Moderate,
    /// 매우 나쁨 (4)
    Poor,
    /// 위험 (5)
    VeryPoor,
    /// 범위 밖 지수
    Unknown,
}

impl AqiLevel {
    /// OpenWeather AQI 지수(1~5)에서 등급을 구합니다.
    pub fn from_index(index: i32) -> Self {
        match index {
            1 => Self::Good,
            2 => Self::Fair,
            3 => Self::Moderate,
            4 => Self::Poor,
            5 => Self::VeryPoor,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for AqiLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Good => write!(f, "Good"),
            Self::Fair => write!(f, "Fair"),
            Self::Moderate => write!(f, "Moderate"),
            Self::Poor => write!(f, "Poor"),
            Self::VeryPoor => write!(f, "Very Poor"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}
