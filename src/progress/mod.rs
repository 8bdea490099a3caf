// src/progress/mod.rs

//! Per-user quiz progress: module attempts, legacy mirrors, statistics and
//! recommendations. Everything here is synchronous and free of I/O.

pub mod catalog;
pub mod error;
pub mod model;
pub mod recommend;
pub mod reconcile;
pub mod stats;
pub mod tracker;

pub use catalog::{ModuleCatalog, ModuleDefinition};
pub use error::ProgressError;
pub use model::{CompletedModule, ModuleProgress, ModuleStatus, ProgressState, QuestionResult};
pub use recommend::{Recommendation, recommend};
pub use reconcile::reconcile;
pub use stats::{DashboardSummary, ProgressStats, compute, summarize};
pub use tracker::{Answer, AnswerOutcome, ModuleTracker, StartOutcome};

/// `numerator / denominator` as a whole percentage, rounded half up.
/// A zero denominator yields 0.
pub(crate) fn percent(numerator: u64, denominator: u64) -> u32 {
    let value = rounded_ratio(u128::from(numerator) * 100, u128::from(denominator));
    u32::try_from(value).unwrap_or(u32::MAX)
}

/// `numerator / denominator` rounded half up. A zero denominator yields 0.
pub(crate) fn rounded_div(numerator: u64, denominator: u64) -> u64 {
    let value = rounded_ratio(u128::from(numerator), u128::from(denominator));
    u64::try_from(value).unwrap_or(u64::MAX)
}

// Widened so `2 * numerator` cannot overflow for any u64 input.
fn rounded_ratio(numerator: u128, denominator: u128) -> u128 {
    if denominator == 0 {
        return 0;
    }
    (2 * numerator + denominator) / (2 * denominator)
}
