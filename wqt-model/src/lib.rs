//! OLS trend models on log(TN).
//!
//! The model layer works from a term algebra over the three analysis
//! variables (year, station, month): a [`term::ModelSpec`] lists terms
//! in the order they enter the model, [`design`] turns a spec plus a
//! trend dataset into a design matrix with per-term column spans, and
//! [`ols`] fits by least squares. On top of that sit the sequential
//! ANOVA decomposition ([`anova`]), deterministic backward-AIC model
//! reduction ([`stepwise`]), and nested-model comparison ([`compare`]).

pub mod anova;
pub mod compare;
pub mod design;
pub mod error;
pub mod ols;
pub mod stepwise;
pub mod summary;
pub mod term;

#[cfg(test)]
pub(crate) mod testdata;

pub use anova::{sequential_anova, AnovaTable};
pub use compare::{nested_f_test, NestedFTest};
pub use error::ModelError;
pub use ols::{fit, Coefficient, OlsFit};
pub use stepwise::{backward_aic, StepwiseResult};
pub use summary::{station_slopes, StationSlope};
pub use term::{ModelSpec, Term, Var};
