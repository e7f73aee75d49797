//! 대기질 데이터 수집 및 저장.
//!
//! 이 crate는 다음을 제공합니다:
//! - OpenWeather API Provider (현재/과거 대기질, 과거 기상)
//! - SQLite 측정값 저장소 (중복 저장 방지)
//! - 두 수집 작업을 묶은 `AirQualityCollector`
//! - 오케스트레이터가 사용하는 `DailyCollection` trait

pub mod collector;
pub mod error;
pub mod provider;
pub mod storage;

pub use error::{DataError, Result};

pub use collector::{AirQualityCollector, BackfillOutcome, DailyCollection};
pub use provider::{CurrentObservation, OpenWeatherClient};
pub use storage::{ReadingRecord, ReadingStore};
