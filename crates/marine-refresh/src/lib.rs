//! Refresh pipeline for the marine forecast cache.
//!
//! - `merger`: aligns per-source series onto the hourly grid
//! - `scheduler`: runs fetch, merge and commit cycles on an interval

pub mod merger;
pub mod scheduler;

pub use merger::{
    daily_max, fill_gaps, resample, round_half_away, MergeDecision, SeriesMerger, SourceFailure,
    SourceResult,
};
pub use scheduler::{
    CycleOutcome, CycleState, RefreshScheduler, RefreshStats, SchedulerConfig, StartupAction,
};
