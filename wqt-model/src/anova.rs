use crate::error::Result;
use crate::ols::{fit, OlsFit};
use crate::term::ModelSpec;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, FisherSnedecor};
use wqt_data::TrendDataset;

/// One term's row of a sequential ANOVA table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnovaRow {
    pub term: String,
    pub df: usize,
    pub sum_sq: f64,
    pub mean_sq: f64,
    pub f_value: Option<f64>,
    pub p_value: Option<f64>,
}

/// Sequential (Type I) ANOVA decomposition of one fit.
///
/// Terms are charged sum-of-squares in the order they appear in the
/// model specification; reordering the terms reallocates variance, so
/// the table is only meaningful together with the formula it prints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnovaTable {
    pub formula: String,
    pub rows: Vec<AnovaRow>,
    pub residual_df: usize,
    pub residual_sum_sq: f64,
    pub residual_mean_sq: f64,
}

impl AnovaTable {
    /// Sum of all term SS plus the residual SS. Equals the corrected
    /// total sum of squares of log(TN) by the OLS decomposition.
    pub fn total_sum_sq(&self) -> f64 {
        self.rows.iter().map(|r| r.sum_sq).sum::<f64>() + self.residual_sum_sq
    }
}

/// Build the sequential ANOVA table for `ols` by refitting the chain
/// of term-prefix models: the SS of term k is the drop in residual SS
/// when it joins the model, tested against the full model's residual
/// mean square.
pub fn sequential_anova(data: &TrendDataset, ols: &OlsFit) -> Result<AnovaTable> {
    let residual_df = ols.df_residual;
    let residual_mean_sq = ols.sigma2;

    let mut rows = Vec::with_capacity(ols.spec.terms.len());
    // intercept-only model: RSS is the corrected total SS
    let mut prev_rss = ols.tss;
    let mut prev_params = 1usize;

    for k in 1..=ols.spec.terms.len() {
        let prefix = ModelSpec::new(&ols.spec.name, ols.spec.terms[..k].to_vec());
        let prefix_fit = fit(data, &prefix)?;

        let term = &ols.spec.terms[k - 1];
        let df = prefix_fit.n_params() - prev_params;
        let sum_sq = (prev_rss - prefix_fit.rss).max(0.0);
        prev_rss = prefix_fit.rss;
        prev_params = prefix_fit.n_params();

        if df == 0 {
            // a term can contribute no columns, e.g. a single-level factor
            rows.push(AnovaRow {
                term: term.label(),
                df,
                sum_sq,
                mean_sq: 0.0,
                f_value: None,
                p_value: None,
            });
            continue;
        }

        let mean_sq = sum_sq / df as f64;
        let f_value = mean_sq / residual_mean_sq;
        let f_dist = FisherSnedecor::new(df as f64, residual_df as f64)
            .map_err(|e| crate::error::ModelError::Distribution(e.to_string()))?;
        rows.push(AnovaRow {
            term: term.label(),
            df,
            sum_sq,
            mean_sq,
            f_value: Some(f_value),
            p_value: Some(f_dist.sf(f_value)),
        });
    }

    Ok(AnovaTable {
        formula: ols.spec.formula(),
        rows,
        residual_df,
        residual_sum_sq: ols.rss,
        residual_mean_sq,
    })
}

#[cfg(test)]
mod tests {
    use super::sequential_anova;
    use crate::ols::fit;
    use crate::term::ModelSpec;
    use crate::testdata;

    #[test]
    fn test_sum_of_squares_identity() {
        // term SS plus residual SS must reproduce the corrected total
        let data = testdata::synthetic();
        let spec = ModelSpec::saturated_two_way();
        let ols = fit(&data, &spec).unwrap();
        let table = sequential_anova(&data, &ols).unwrap();

        assert!((table.total_sum_sq() - ols.tss).abs() < 1e-8 * ols.tss.max(1.0));
        assert_eq!(table.rows.len(), 6);
        assert_eq!(table.residual_df, ols.df_residual);
    }

    #[test]
    fn test_term_order_changes_attribution() {
        let data = testdata::synthetic();
        let forward = ModelSpec::saturated_two_way();
        let mut reversed = forward.clone();
        reversed.terms.reverse();

        let f_fit = fit(&data, &forward).unwrap();
        let r_fit = fit(&data, &reversed).unwrap();
        let f_table = sequential_anova(&data, &f_fit).unwrap();
        let r_table = sequential_anova(&data, &r_fit).unwrap();

        // same residual, same total...
        assert!((f_table.residual_sum_sq - r_table.residual_sum_sq).abs() < 1e-8);
        assert!((f_table.total_sum_sq() - r_table.total_sum_sq()).abs() < 1e-8);
        // ...but year's share depends on where it enters
        let f_year = f_table.rows.iter().find(|r| r.term == "year").unwrap();
        let r_year = r_table.rows.iter().find(|r| r.term == "year").unwrap();
        assert!((f_year.sum_sq - r_year.sum_sq).abs() > 1e-10);
    }

    #[test]
    fn test_station_term_is_detected() {
        // station levels differ strongly in the synthetic data, so the
        // station term must carry a small p-value
        let data = testdata::synthetic();
        let spec = ModelSpec::saturated_two_way();
        let ols = fit(&data, &spec).unwrap();
        let table = sequential_anova(&data, &ols).unwrap();
        let station = table.rows.iter().find(|r| r.term == "station").unwrap();
        assert_eq!(station.df, 2);
        assert!(station.p_value.unwrap() < 0.001);
    }
}
