use crate::error::{ModelError, Result};
use crate::ols::OlsFit;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, FisherSnedecor};

/// Result of an F-test between two fits of the same response, the
/// smaller model against the larger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NestedFTest {
    pub reduced_formula: String,
    pub full_formula: String,
    pub df_num: usize,
    pub df_den: usize,
    pub rss_reduced: f64,
    pub rss_full: f64,
    pub f_value: f64,
    pub p_value: f64,
}

/// F-test of `reduced` against `full`.
///
/// Both fits must come from the same dataset; the model with the
/// larger residual df is treated as the reduced one. Degenerate
/// comparisons (equal df) are an error rather than a divide-by-zero.
pub fn nested_f_test(reduced: &OlsFit, full: &OlsFit) -> Result<NestedFTest> {
    if reduced.n != full.n {
        return Err(ModelError::InvalidComparison(format!(
            "fits use different row counts ({} vs {})",
            reduced.n, full.n
        )));
    }
    let (reduced, full) = if reduced.df_residual >= full.df_residual {
        (reduced, full)
    } else {
        (full, reduced)
    };
    let df_num = reduced.df_residual - full.df_residual;
    if df_num == 0 {
        return Err(ModelError::InvalidComparison(
            "models have the same number of parameters".to_string(),
        ));
    }
    let df_den = full.df_residual;

    // a genuinely nested pair cannot raise RSS when terms are added;
    // tiny negative differences are factorization noise
    let ss_diff = (reduced.rss - full.rss).max(0.0);
    let f_value = (ss_diff / df_num as f64) / (full.rss / df_den as f64);
    let f_dist = FisherSnedecor::new(df_num as f64, df_den as f64)
        .map_err(|e| ModelError::Distribution(e.to_string()))?;

    Ok(NestedFTest {
        reduced_formula: reduced.spec.formula(),
        full_formula: full.spec.formula(),
        df_num,
        df_den,
        rss_reduced: reduced.rss,
        rss_full: full.rss,
        f_value,
        p_value: f_dist.sf(f_value),
    })
}
