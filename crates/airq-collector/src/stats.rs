//! 일일 수집 결과 요약 구조체.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// 일일 통합 수집의 단계별 결과 요약.
#[derive(Debug, Clone)]
pub struct DailySummary {
    /// 수집 시작 시각 (UTC)
    pub started_at: DateTime<Utc>,
    /// 수집 종료 시각 (UTC)
    pub finished_at: DateTime<Utc>,
    /// 현재 데이터 수집 성공 지점 수
    pub current_successful: usize,
    /// 현재 데이터 수집 실패 지점 수
    pub current_failed: usize,
    /// 백필로 저장된 총 행 수
    pub historical_saved: u64,
    /// 백필 결과가 보고된 지점 수.
    ///
    /// 수집기가 부분 결과만 반환하면 설정된 지점 수와 다를 수 있으므로
    /// "처리된 지점 수"가 아니라 보고된 결과 쌍의 수입니다.
    pub historical_locations_reported: usize,
    /// 총 소요 시간
    pub elapsed: Duration,
}

impl DailySummary {
    /// 전체 성공 여부.
    ///
    /// 두 단계 중 하나라도 결과를 냈으면 성공입니다. 종료 코드 0/1로
    /// 변환되어 스케줄러에 보고됩니다.
    pub fn overall_success(&self) -> bool {
        self.current_successful > 0 || self.historical_saved > 0
    }

    /// 소요 시간 (초).
    pub fn duration_secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    /// 요약 로그 출력
    pub fn log_summary(&self) {
        tracing::info!("============================================================");
        tracing::info!("일일 수집 최종 요약");
        tracing::info!("============================================================");
        tracing::info!(
            started_at = %self.started_at.format("%Y-%m-%d %H:%M:%S"),
            elapsed = format!("{:.2}s", self.duration_secs()),
            "총 소요 시간"
        );
        tracing::info!(
            successful = self.current_successful,
            failed = self.current_failed,
            "현재 데이터"
        );
        tracing::info!(
            saved = self.historical_saved,
            locations_reported = self.historical_locations_reported,
            "과거 데이터"
        );
        tracing::info!(
            finished_at = %self.finished_at.format("%Y-%m-%d %H:%M:%S"),
            overall_success = self.overall_success(),
            "수집 종료 (UTC)"
        );
        tracing::info!("============================================================");
    }
}
