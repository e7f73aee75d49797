//! 일일 통합 수집 워크플로우.
//!
//! 두 단계를 순서대로 실행합니다:
//! 1. 현재 데이터 수집 (전체 지점)
//! 2. 과거 데이터 백필 (최근 5일)
//!
//! 한 단계의 실패는 해당 단계의 강등된 결과로 기록될 뿐 다음 단계를
//! 막지 않으며, 요약은 항상 출력됩니다.

use crate::modules::{backfill, current};
use crate::stats::DailySummary;
use airq_data::DailyCollection;
use chrono::Utc;
use std::time::Instant;

/// 일일 통합 수집을 실행하고 요약을 반환합니다.
pub async fn run_daily<C: DailyCollection + Send>(collector: &mut C) -> DailySummary {
    let start = Instant::now();
    let started_at = Utc::now();

    tracing::info!("일일 통합 수집 시작");
    tracing::info!(
        started_at = %started_at.format("%Y-%m-%d %H:%M:%S"),
        locations = collector.location_count(),
        "수집 시작 (UTC)"
    );

    // Step 1/2: 현재 데이터
    tracing::info!("Step 1/2: 현재 데이터 수집");
    let (current_successful, current_failed) = current::run_current_phase(collector).await;

    // Step 2/2: 과거 데이터 백필
    tracing::info!("Step 2/2: 과거 데이터 백필");
    let totals = backfill::run_backfill_phase(collector).await;

    let finished_at = Utc::now();
    let summary = DailySummary {
        started_at,
        finished_at,
        current_successful,
        current_failed,
        historical_saved: totals.saved,
        historical_locations_reported: totals.locations_reported,
        elapsed: start.elapsed(),
    };

    summary.log_summary();
    summary
}
