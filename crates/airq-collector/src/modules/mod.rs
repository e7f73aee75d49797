//! 수집 워크플로우 모듈.

pub mod backfill;
pub mod current;
pub mod daily;
pub mod status;

pub use backfill::{aggregate_outcomes, run_backfill_phase, BackfillTotals};
pub use current::run_current_phase;
pub use daily::run_daily;
pub use status::{collect_status, log_status, LocationStatus};
