use crate::design::{build_design, Design};
use crate::error::{ModelError, Result};
use crate::term::{ModelSpec, Term};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};
use std::ops::Range;
use wqt_data::TrendDataset;
use wqt_sample::month::Month;

/// One estimated coefficient with its inference columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coefficient {
    pub name: String,
    pub estimate: f64,
    pub std_error: f64,
    pub t_value: f64,
    pub p_value: f64,
}

/// An ordinary-least-squares fit of one model specification on
/// log(TN). Recomputed every run; nothing here is persisted.
#[derive(Debug, Clone)]
pub struct OlsFit {
    pub spec: ModelSpec,
    pub coefficients: Vec<Coefficient>,
    pub n: usize,
    pub df_residual: usize,
    /// Residual sum of squares.
    pub rss: f64,
    /// Corrected total sum of squares of log(TN).
    pub tss: f64,
    /// Residual variance estimate, RSS / df.
    pub sigma2: f64,
    pub fitted: Vec<f64>,
    pub residuals: Vec<f64>,
    /// Hat-matrix diagonal, for the diagnostic plots.
    pub leverage: Vec<f64>,
    pub term_spans: Vec<(Term, Range<usize>)>,
    pub station_levels: Vec<String>,
    pub month_levels: Vec<Month>,
}

impl OlsFit {
    /// Number of estimated coefficients (including the intercept).
    pub fn n_params(&self) -> usize {
        self.coefficients.len()
    }

    /// Akaike information criterion, `n ln(RSS/n) + 2p`. Only
    /// differences matter, so the constant terms are omitted.
    pub fn aic(&self) -> f64 {
        let n = self.n as f64;
        n * (self.rss / n).ln() + 2.0 * self.n_params() as f64
    }

    pub fn r_squared(&self) -> f64 {
        1.0 - self.rss / self.tss
    }

    pub fn adj_r_squared(&self) -> f64 {
        let n = self.n as f64;
        let p = self.n_params() as f64;
        1.0 - (self.rss / (n - p)) / (self.tss / (n - 1.0))
    }

    /// Internally studentized residuals, `e_i / (s sqrt(1 - h_i))`.
    pub fn standardized_residuals(&self) -> Vec<f64> {
        let sigma = self.sigma2.sqrt();
        self.residuals
            .iter()
            .zip(&self.leverage)
            .map(|(e, h)| e / (sigma * (1.0 - h).max(f64::EPSILON).sqrt()))
            .collect()
    }
}

/// Fit `spec` to the dataset by ordinary least squares on log(TN).
///
/// The solve goes through a thin QR factorization; a near-zero
/// diagonal entry of R means some station/month cell is empty or two
/// columns are collinear, which surfaces as [`ModelError::RankDeficient`]
/// rather than a garbage fit.
pub fn fit(data: &TrendDataset, spec: &ModelSpec) -> Result<OlsFit> {
    let design = build_design(data, spec)?;
    fit_design(design, spec)
}

fn fit_design(design: Design, spec: &ModelSpec) -> Result<OlsFit> {
    let n = design.n();
    let p = design.p();
    if n <= p {
        return Err(ModelError::TooFewObservations {
            model: spec.name.clone(),
            n,
            p,
        });
    }

    let qr = design.x.clone().qr();
    let q = qr.q();
    let r = qr.r();

    let max_diag = (0..p).map(|j| r[(j, j)].abs()).fold(0.0f64, f64::max);
    let tol = f64::EPSILON * (n.max(p) as f64) * max_diag;
    for j in 0..p {
        if r[(j, j)].abs() <= tol {
            return Err(ModelError::RankDeficient {
                model: spec.name.clone(),
                column: design.column_names[j].clone(),
            });
        }
    }

    let qty = q.transpose() * &design.y;
    let beta = r
        .solve_upper_triangular(&qty)
        .ok_or_else(|| ModelError::RankDeficient {
            model: spec.name.clone(),
            column: design.column_names[p - 1].clone(),
        })?;

    let fitted_vec = &design.x * &beta;
    let residuals_vec = &design.y - &fitted_vec;
    let rss = residuals_vec.norm_squared();
    let df_residual = n - p;
    let sigma2 = rss / df_residual as f64;

    let y_mean = design.y.mean();
    let tss = design.y.iter().map(|v| (v - y_mean).powi(2)).sum::<f64>();

    // (X'X)^-1 = R^-1 R^-T
    let r_inv = r
        .solve_upper_triangular(&DMatrix::identity(p, p))
        .ok_or_else(|| ModelError::RankDeficient {
            model: spec.name.clone(),
            column: design.column_names[p - 1].clone(),
        })?;
    let xtx_inv = &r_inv * r_inv.transpose();

    let t_dist = StudentsT::new(0.0, 1.0, df_residual as f64)
        .map_err(|e| ModelError::Distribution(e.to_string()))?;

    let coefficients = design
        .column_names
        .iter()
        .enumerate()
        .map(|(j, name)| {
            let estimate = beta[j];
            let std_error = (sigma2 * xtx_inv[(j, j)]).sqrt();
            let t_value = estimate / std_error;
            let p_value = 2.0 * t_dist.sf(t_value.abs());
            Coefficient {
                name: name.clone(),
                estimate,
                std_error,
                t_value,
                p_value,
            }
        })
        .collect();

    // hat diagonal from the thin Q
    let leverage = (0..n)
        .map(|i| (0..p).map(|j| q[(i, j)].powi(2)).sum())
        .collect();

    Ok(OlsFit {
        spec: spec.clone(),
        coefficients,
        n,
        df_residual,
        rss,
        tss,
        sigma2,
        fitted: fitted_vec.iter().copied().collect(),
        residuals: residuals_vec.iter().copied().collect(),
        leverage,
        term_spans: design.term_spans,
        station_levels: design.station_levels,
        month_levels: design.month_levels,
    })
}
