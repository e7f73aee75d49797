//! # Airq Core
//!
//! 대기질 모니터링 시스템의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 시스템 전반에서 사용되는 기본 타입을 제공합니다:
//! - 측정 지점(Location) 정의 및 기본 지점 목록
//! - 대기질 측정값(AirQualityReading) 구조체
//! - AQI 등급 타입

pub mod location;
pub mod reading;

pub use location::{default_locations, Location};
pub use reading::{AirQualityReading, AqiLevel};
