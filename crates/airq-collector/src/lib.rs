//! 아과치카 대기질 일일 수집기.
//!
//! 이 crate는 API 키만으로 독립 실행되는 수집 바이너리를 제공합니다:
//! - 현재 데이터 수집 (전체 지점 최신 관측값)
//! - 과거 데이터 백필 (지점별 최근 5일치)
//! - 일일 통합 수집 (현재 + 백필, 종료 코드로 결과 보고)
//! - 수집 현황 조회 (저장소 읽기 전용, API 키 불필요)

pub mod config;
pub mod error;
pub mod modules;
pub mod stats;

pub use config::CollectorConfig;
pub use error::{CollectorError, Result};
pub use stats::DailySummary;
