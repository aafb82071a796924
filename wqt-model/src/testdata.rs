//! Deterministic synthetic trend datasets for the model-layer tests.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use wqt_data::{TrendDataset, TrendRow};
use wqt_sample::month::Month;

fn row(station: &str, year: i32, month: Month, tn: f64) -> TrendRow {
    TrendRow {
        station_id: station.to_string(),
        display_name: None,
        date: NaiveDate::from_ymd_opt(year, month.number(), 15).unwrap(),
        year,
        month,
        tn,
        extras: BTreeMap::new(),
    }
}

/// 3 stations x 10 years x 6 core months with station levels, slopes,
/// month effects, and a bounded deterministic wiggle. 180 rows.
pub fn synthetic() -> TrendDataset {
    let stations = ["S1", "S2", "S3"];
    let bases = [-0.9, -0.7, -0.5];
    let slopes = [0.0, 0.02, -0.015];
    let months = [
        Month::May,
        Month::Jun,
        Month::Jul,
        Month::Aug,
        Month::Sep,
        Month::Oct,
    ];
    let month_effects = [0.0, 0.05, 0.10, 0.08, 0.03, -0.02];

    let mut rows = Vec::new();
    let mut i: u64 = 0;
    for (s_idx, station) in stations.iter().enumerate() {
        for year in 2008..=2017 {
            for (m_idx, month) in months.iter().enumerate() {
                // fixed congruential wiggle in (-0.05, 0.05)
                let wiggle = ((i * 37 + 11) % 89) as f64 / 89.0 * 0.1 - 0.05;
                let log_tn = bases[s_idx]
                    + slopes[s_idx] * (year - 2008) as f64
                    + month_effects[m_idx]
                    + wiggle;
                rows.push(row(station, year, *month, log_tn.exp()));
                i += 1;
            }
        }
    }
    TrendDataset {
        rows,
        station_order: stations.iter().map(|s| s.to_string()).collect(),
    }
}

/// One station, twenty years, noise-free: log(TN) = intercept + slope * year.
pub fn exact_linear(intercept: f64, slope: f64) -> TrendDataset {
    let rows = (2000..=2019)
        .map(|year| {
            let log_tn = intercept + slope * year as f64;
            row("S1", year, Month::Jun, log_tn.exp())
        })
        .collect();
    TrendDataset {
        rows,
        station_order: vec!["S1".to_string()],
    }
}
