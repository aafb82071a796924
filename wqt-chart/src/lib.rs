//! Chart rendering for the trend analysis: residual diagnostic panels
//! and per-station trend panels, drawn with plotters to PNG files.

pub mod diagnostics;
pub mod palette;
pub mod trend;

use thiserror::Error;

/// Errors from chart rendering. Fatal for the chart being drawn, not
/// for the run.
#[derive(Error, Debug)]
pub enum ChartError {
    /// Backend or layout failure while drawing
    #[error("Failed to draw chart: {0}")]
    Draw(String),

    /// Nothing to draw
    #[error("No data points for chart '{0}'")]
    NoData(String),
}

/// Type alias for Results using ChartError
pub type Result<T> = std::result::Result<T, ChartError>;

/// Pad a data range so plotters never sees an empty axis.
pub(crate) fn padded_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values {
        if v < min {
            min = v;
        }
        if v > max {
            max = v;
        }
    }
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    let pad = ((max - min) * 0.05).max(1e-6);
    (min - pad, max + pad)
}
