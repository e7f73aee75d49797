//! 현재 데이터 수집 단계.

use airq_data::DailyCollection;

/// 전체 지점의 현재 데이터를 수집합니다. `(성공 수, 실패 수)` 반환.
///
/// 위임된 수집 작업이 실패하면 전체 지점이 실패한 것으로 간주하고
/// `(0, 지점 수)`로 강등합니다. 실행은 다음 단계로 계속됩니다.
pub async fn run_current_phase<C: DailyCollection + Send>(collector: &mut C) -> (usize, usize) {
    tracing::info!("============================================================");
    tracing::info!("현재 데이터 수집 시작");
    tracing::info!("============================================================");

    match collector.collect_all_locations().await {
        Ok((successful, failed)) => {
            tracing::info!(successful, failed, "현재 데이터 수집 완료");
            (successful, failed)
        }
        Err(e) => {
            tracing::error!(error = %e, "현재 데이터 수집 실패");
            (0, collector.location_count())
        }
    }
}
