/// Error types for trend-dataset construction
use thiserror::Error;

/// Errors raised while selecting stations or building the trend dataset.
///
/// Empty intermediate results are errors here rather than warnings:
/// passing an empty dataset into the regression layer would fail far
/// less legibly inside the fitting code.
#[derive(Error, Debug)]
pub enum TrendDataError {
    /// No station satisfied the selection thresholds
    #[error(
        "No station satisfied the trend-station thresholds \
         ({candidates} candidate stations examined); relax the selection policy"
    )]
    NoTrendStations { candidates: usize },

    /// Every row was removed during cleaning
    #[error("Trend dataset is empty after cleaning; check the TN cutoff and inputs")]
    EmptyTrendData,

    /// No row fell inside the core sampling months
    #[error("No trend data within the core months (May through October)")]
    EmptyCoreMonths,
}
