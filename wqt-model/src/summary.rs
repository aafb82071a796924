use crate::anova::AnovaTable;
use crate::ols::OlsFit;
use crate::term::Term;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Write as _;
use wqt_utils::fmt::{format_p, signif_stars};

/// A station's estimated year slope from the per-station trend model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationSlope {
    pub station_id: String,
    /// Change in log(TN) per year.
    pub slope_per_year: f64,
    pub std_error: f64,
    pub t_value: f64,
    pub p_value: f64,
}

impl StationSlope {
    /// Conventional two-sided threshold.
    pub fn is_significant(&self) -> bool {
        self.p_value < 0.05
    }

    /// Multiplicative TN change per decade implied by the slope.
    pub fn percent_change_per_decade(&self) -> f64 {
        ((self.slope_per_year * 10.0).exp() - 1.0) * 100.0
    }
}

/// Extract the per-station slopes from a fit of the per-station trend
/// model. Returns an empty vector when the fit carries no
/// slope-per-level term.
pub fn station_slopes(fit: &OlsFit) -> Vec<StationSlope> {
    let span = fit.term_spans.iter().find_map(|(term, span)| match term {
        Term::SlopePerLevel { .. } => Some(span.clone()),
        _ => None,
    });
    let Some(span) = span else {
        return Vec::new();
    };
    fit.station_levels
        .iter()
        .zip(span)
        .map(|(station, col)| {
            let c = &fit.coefficients[col];
            StationSlope {
                station_id: station.clone(),
                slope_per_year: c.estimate,
                std_error: c.std_error,
                t_value: c.t_value,
                p_value: c.p_value,
            }
        })
        .collect()
}

impl fmt::Display for AnovaTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .rows
            .iter()
            .map(|r| r.term.len())
            .chain(["Residuals".len()].into_iter())
            .max()
            .unwrap_or(12);

        writeln!(f, "Analysis of Variance Table")?;
        writeln!(f)?;
        writeln!(f, "Response: {}", self.formula)?;
        writeln!(
            f,
            "{:<width$} {:>5} {:>10} {:>10} {:>9} {:>10}",
            "", "Df", "Sum Sq", "Mean Sq", "F value", "Pr(>F)"
        )?;
        for row in &self.rows {
            match (row.f_value, row.p_value) {
                (Some(f_value), Some(p_value)) => writeln!(
                    f,
                    "{:<width$} {:>5} {:>10.4} {:>10.4} {:>9.3} {:>10} {}",
                    row.term,
                    row.df,
                    row.sum_sq,
                    row.mean_sq,
                    f_value,
                    format_p(p_value),
                    signif_stars(p_value)
                )?,
                _ => writeln!(
                    f,
                    "{:<width$} {:>5} {:>10.4}",
                    row.term, row.df, row.sum_sq
                )?,
            }
        }
        writeln!(
            f,
            "{:<width$} {:>5} {:>10.4} {:>10.4}",
            "Residuals", self.residual_df, self.residual_sum_sq, self.residual_mean_sq
        )
    }
}

/// Render the coefficient table of a fit, regression-summary style.
pub fn coefficient_table(fit: &OlsFit) -> String {
    let width = fit
        .coefficients
        .iter()
        .map(|c| c.name.len())
        .max()
        .unwrap_or(12);

    let mut out = String::new();
    let _ = writeln!(out, "Model: {}", fit.spec.formula());
    let _ = writeln!(out, "Coefficients:");
    let _ = writeln!(
        out,
        "{:<width$} {:>12} {:>12} {:>9} {:>10}",
        "", "Estimate", "Std. Error", "t value", "Pr(>|t|)"
    );
    for c in &fit.coefficients {
        let _ = writeln!(
            out,
            "{:<width$} {:>12.6} {:>12.6} {:>9.3} {:>10} {}",
            c.name,
            c.estimate,
            c.std_error,
            c.t_value,
            format_p(c.p_value),
            signif_stars(c.p_value)
        );
    }
    let _ = writeln!(
        out,
        "\nResidual std. error: {:.5} on {} degrees of freedom",
        fit.sigma2.sqrt(),
        fit.df_residual
    );
    let _ = writeln!(
        out,
        "Multiple R-squared: {:.4},  Adjusted R-squared: {:.4}",
        fit.r_squared(),
        fit.adj_r_squared()
    );
    out
}

/// Render the per-station slope table, the analysis deliverable.
pub fn slope_table(slopes: &[StationSlope], labels: &dyn Fn(&str) -> String) -> String {
    let rows: Vec<(String, &StationSlope)> = slopes
        .iter()
        .map(|s| (labels(&s.station_id), s))
        .collect();
    let width = rows.iter().map(|(l, _)| l.len()).max().unwrap_or(12);

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<width$} {:>12} {:>12} {:>9} {:>10} {:>10}",
        "Station", "Slope/yr", "Std. Error", "t value", "Pr(>|t|)", "%/decade"
    );
    for (label, s) in rows {
        let _ = writeln!(
            out,
            "{:<width$} {:>12.6} {:>12.6} {:>9.3} {:>10} {:>9.1}% {}",
            label,
            s.slope_per_year,
            s.std_error,
            s.t_value,
            format_p(s.p_value),
            s.percent_change_per_decade(),
            signif_stars(s.p_value)
        );
    }
    out
}
