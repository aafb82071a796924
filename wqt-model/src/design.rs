use crate::error::{ModelError, Result};
use crate::term::{ModelSpec, Term, Var};
use nalgebra::{DMatrix, DVector};
use std::collections::BTreeSet;
use std::ops::Range;
use wqt_data::TrendDataset;
use wqt_sample::month::Month;

/// A design matrix for one model specification, with the response and
/// the per-term column spans the sequential ANOVA needs.
///
/// Station levels follow the dataset's median-TN ordering and month
/// levels calendar order; the first level of each is the treatment
/// reference.
#[derive(Debug, Clone)]
pub struct Design {
    pub x: DMatrix<f64>,
    pub y: DVector<f64>,
    /// Column names; column 0 is always `(Intercept)`.
    pub column_names: Vec<String>,
    /// Half-open column ranges per term, in spec order.
    pub term_spans: Vec<(Term, Range<usize>)>,
    pub station_levels: Vec<String>,
    pub month_levels: Vec<Month>,
}

impl Design {
    pub fn n(&self) -> usize {
        self.x.nrows()
    }

    pub fn p(&self) -> usize {
        self.x.ncols()
    }
}

/// Build the design matrix for `spec` over the core-months dataset.
pub fn build_design(data: &TrendDataset, spec: &ModelSpec) -> Result<Design> {
    let n = data.rows.len();

    let mut y = Vec::with_capacity(n);
    for row in &data.rows {
        if row.tn <= 0.0 {
            return Err(ModelError::NonPositiveResponse {
                station: row.station_id.clone(),
                date: row.date,
                value: row.tn,
            });
        }
        y.push(row.tn.ln());
    }

    let station_levels = data.station_order.clone();
    let month_levels: Vec<Month> = data
        .rows
        .iter()
        .map(|r| r.month)
        .collect::<BTreeSet<Month>>()
        .into_iter()
        .collect();

    // squared year is centered before squaring; same column span as a
    // raw quadratic, but the Gram matrix stays well conditioned
    let year_mean = data.rows.iter().map(|r| r.year as f64).sum::<f64>() / n as f64;

    let encode = |var: Var, full_dummies: bool| -> Vec<(String, Vec<f64>)> {
        match var {
            Var::Year => vec![(
                "year".to_string(),
                data.rows.iter().map(|r| r.year as f64).collect(),
            )],
            Var::YearSquared => vec![(
                "year^2".to_string(),
                data.rows
                    .iter()
                    .map(|r| {
                        let centered = r.year as f64 - year_mean;
                        centered * centered
                    })
                    .collect(),
            )],
            Var::Station => {
                let skip = usize::from(!full_dummies);
                station_levels
                    .iter()
                    .skip(skip)
                    .map(|level| {
                        (
                            format!("station[{level}]"),
                            data.rows
                                .iter()
                                .map(|r| if r.station_id == *level { 1.0 } else { 0.0 })
                                .collect(),
                        )
                    })
                    .collect()
            }
            Var::Month => {
                let skip = usize::from(!full_dummies);
                month_levels
                    .iter()
                    .skip(skip)
                    .map(|level| {
                        (
                            format!("month[{}]", level.label()),
                            data.rows
                                .iter()
                                .map(|r| if r.month == *level { 1.0 } else { 0.0 })
                                .collect(),
                        )
                    })
                    .collect()
            }
        }
    };

    let mut column_names = vec!["(Intercept)".to_string()];
    let mut columns: Vec<Vec<f64>> = vec![vec![1.0; n]];
    let mut term_spans = Vec::with_capacity(spec.terms.len());

    for term in &spec.terms {
        let start = columns.len();
        match term {
            Term::Main(var) => {
                for (name, column) in encode(*var, false) {
                    column_names.push(name);
                    columns.push(column);
                }
            }
            Term::Interaction(a, b) => {
                for (a_name, a_column) in encode(*a, false) {
                    for (b_name, b_column) in encode(*b, false) {
                        column_names.push(format!("{a_name}:{b_name}"));
                        columns.push(
                            a_column
                                .iter()
                                .zip(&b_column)
                                .map(|(x, z)| x * z)
                                .collect(),
                        );
                    }
                }
            }
            Term::SlopePerLevel { cat, num } => {
                let num_columns = encode(*num, false);
                let (num_name, num_values) = &num_columns[0];
                for (cat_name, cat_column) in encode(*cat, true) {
                    column_names.push(format!("{cat_name}:{num_name}"));
                    columns.push(
                        cat_column
                            .iter()
                            .zip(num_values)
                            .map(|(d, x)| d * x)
                            .collect(),
                    );
                }
            }
        }
        term_spans.push((*term, start..columns.len()));
    }

    let p = columns.len();
    let x = DMatrix::from_fn(n, p, |i, j| columns[j][i]);

    Ok(Design {
        x,
        y: DVector::from_vec(y),
        column_names,
        term_spans,
        station_levels,
        month_levels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::{ModelSpec, Term, Var};
    use chrono::NaiveDate;
    use std::collections::BTreeMap;
    use wqt_data::TrendRow;

    fn dataset() -> TrendDataset {
        let mut rows = Vec::new();
        for (station, year, month, tn) in [
            ("S1", 2015, 5, 0.4),
            ("S1", 2016, 6, 0.5),
            ("S2", 2015, 5, 0.6),
            ("S2", 2016, 7, 0.7),
        ] {
            rows.push(TrendRow {
                station_id: station.to_string(),
                display_name: None,
                date: NaiveDate::from_ymd_opt(year, month, 10).unwrap(),
                year,
                month: Month::from_number(month).unwrap(),
                tn,
                extras: BTreeMap::new(),
            });
        }
        TrendDataset {
            rows,
            station_order: vec!["S1".to_string(), "S2".to_string()],
        }
    }

    #[test]
    fn test_main_effect_columns() {
        let spec = ModelSpec::new(
            "m",
            vec![
                Term::Main(Var::Year),
                Term::Main(Var::Station),
                Term::Main(Var::Month),
            ],
        );
        let design = build_design(&dataset(), &spec).unwrap();
        // intercept + year + 1 station dummy + 2 month dummies
        assert_eq!(design.p(), 5);
        assert_eq!(
            design.column_names,
            vec![
                "(Intercept)",
                "year",
                "station[S2]",
                "month[Jun]",
                "month[Jul]"
            ]
        );
        assert_eq!(design.term_spans[0].1, 1..2);
        assert_eq!(design.term_spans[1].1, 2..3);
        assert_eq!(design.term_spans[2].1, 3..5);
        // S2 dummy marks rows 2 and 3
        assert_eq!(design.x[(0, 2)], 0.0);
        assert_eq!(design.x[(2, 2)], 1.0);
        assert_eq!(design.x[(3, 2)], 1.0);
    }

    #[test]
    fn test_slope_per_level_uses_all_levels() {
        let spec = ModelSpec::per_station_trend();
        let design = build_design(&dataset(), &spec).unwrap();
        let names: Vec<&str> = design.column_names.iter().map(String::as_str).collect();
        assert!(names.contains(&"station[S1]:year"));
        assert!(names.contains(&"station[S2]:year"));
        // the S1 slope column carries the year where station is S1
        let s1_col = names.iter().position(|n| *n == "station[S1]:year").unwrap();
        assert_eq!(design.x[(0, s1_col)], 2015.0);
        assert_eq!(design.x[(2, s1_col)], 0.0);
    }

    #[test]
    fn test_interaction_columns() {
        let spec = ModelSpec::new(
            "m",
            vec![
                Term::Main(Var::Year),
                Term::Main(Var::Station),
                Term::Interaction(Var::Year, Var::Station),
            ],
        );
        let design = build_design(&dataset(), &spec).unwrap();
        let last = design.column_names.last().unwrap();
        assert_eq!(last, "year:station[S2]");
        // product column: year where station is S2, else 0
        let col = design.p() - 1;
        assert_eq!(design.x[(0, col)], 0.0);
        assert_eq!(design.x[(3, col)], 2016.0);
    }

    #[test]
    fn test_log_response() {
        let spec = ModelSpec::new("m", vec![Term::Main(Var::Year)]);
        let design = build_design(&dataset(), &spec).unwrap();
        assert!((design.y[0] - 0.4f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn test_non_positive_tn_rejected() {
        let mut data = dataset();
        data.rows[1].tn = 0.0;
        let spec = ModelSpec::new("m", vec![Term::Main(Var::Year)]);
        let err = build_design(&data, &spec).unwrap_err();
        assert!(matches!(err, ModelError::NonPositiveResponse { .. }));
    }
}
