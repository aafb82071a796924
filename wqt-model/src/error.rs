/// Error types for model fitting
use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised while building or fitting a regression model.
///
/// A failed fit is fatal for that model only; the analysis driver
/// reports it and moves on to models that do not depend on it.
#[derive(Error, Debug)]
pub enum ModelError {
    /// The design matrix does not have full column rank, typically
    /// because a station/month combination has no observations.
    #[error("Design matrix is rank deficient near column '{column}' in model '{model}'")]
    RankDeficient { model: String, column: String },

    /// More parameters than observations.
    #[error("Too few observations for model '{model}': {n} rows, {p} parameters")]
    TooFewObservations { model: String, n: usize, p: usize },

    /// The response is log-transformed; a non-positive TN value cannot
    /// come out of the cleaning stages and indicates a defective input.
    #[error("TN must be positive to take logs: {value} at station {station} on {date}")]
    NonPositiveResponse {
        station: String,
        date: NaiveDate,
        value: f64,
    },

    /// A reference distribution could not be constructed (degenerate
    /// degrees of freedom).
    #[error("Reference distribution unavailable: {0}")]
    Distribution(String),

    /// The two fits passed to a nested comparison are not comparable.
    #[error("Models are not comparable: {0}")]
    InvalidComparison(String),
}

/// Type alias for Results using ModelError
pub type Result<T> = std::result::Result<T, ModelError>;
