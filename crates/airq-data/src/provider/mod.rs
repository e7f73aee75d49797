//! 데이터 Provider 모듈.
//!
//! 외부 소스에서 대기질/기상 데이터를 가져오는 Provider를 정의합니다.
//!
//! ## OpenWeather API
//! - `OpenWeatherClient`: OpenWeather API 클라이언트 (API 키 필요)
//! - 현재 대기질 + 기상 데이터 (`/air_pollution`, `/weather`)
//! - 과거 대기질 데이터 (`/air_pollution/history`, 최대 5일)
//! - 과거 기상 데이터 (`onecall/timemachine`, v3.0 → v2.5 fallback)

pub mod openweather;

pub use openweather::{
    nearest_sample, AirPollutionEntry, CurrentObservation, OpenWeatherClient, WeatherSample,
};
