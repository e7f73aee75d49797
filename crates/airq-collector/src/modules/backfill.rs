//! 과거 데이터 백필 단계.

use airq_data::{BackfillOutcome, DailyCollection};

/// 백필 단계 집계 결과.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackfillTotals {
    /// 저장된 총 행 수
    pub saved: u64,
    /// 성공한 지점 수
    pub successful_locations: usize,
    /// 결과가 보고된 지점 수 (부분 결과 시 설정 지점 수와 다를 수 있음)
    pub locations_reported: usize,
}

/// 지점별 백필 결과를 집계합니다.
pub fn aggregate_outcomes(results: &[(String, BackfillOutcome)]) -> BackfillTotals {
    BackfillTotals {
        saved: results.iter().map(|(_, outcome)| outcome.saved()).sum(),
        successful_locations: results
            .iter()
            .filter(|(_, outcome)| outcome.is_success())
            .count(),
        locations_reported: results.len(),
    }
}

/// 전체 지점의 최근 5일치를 백필하고 결과를 집계합니다.
///
/// 위임된 수집 작업이 실패하면 `(0, 0, 0)`으로 강등합니다. 지점 한 곳의
/// 실패는 수집기 내부에서 `Failed` 결과로 담겨 오므로 여기 도달하는 에러는
/// 전체 순회 자체의 실패입니다.
pub async fn run_backfill_phase<C: DailyCollection + Send>(collector: &mut C) -> BackfillTotals {
    tracing::info!("============================================================");
    tracing::info!("과거 데이터 백필 시작 (5일)");
    tracing::info!("============================================================");

    match collector.collect_last5days_all_locations().await {
        Ok(results) => {
            let totals = aggregate_outcomes(&results);
            tracing::info!(
                successful = totals.successful_locations,
                reported = totals.locations_reported,
                saved = totals.saved,
                "과거 데이터 백필 완료"
            );
            totals
        }
        Err(e) => {
            tracing::error!(error = %e, "과거 데이터 백필 실패");
            BackfillTotals::default()
        }
    }
}
