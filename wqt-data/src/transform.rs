use crate::error::TrendDataError;
use chrono::NaiveDate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use wqt_sample::{month::Month, sample::SampleRecord, station::StationNames};

/// Cleaning thresholds for the trend dataset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformPolicy {
    /// TN values at or above this concentration (mg/L) are treated as
    /// missing and dropped. The default suppresses the one extreme
    /// outlier in the source data.
    pub tn_cutoff: f64,
}

impl Default for TransformPolicy {
    fn default() -> Self {
        TransformPolicy { tn_cutoff: 1.5 }
    }
}

/// Column-name prefixes for nitrogen-species measurements that are not
/// used downstream.
pub const NITROGEN_SPECIES_PREFIXES: &[&str] = &["no2", "no3", "no23", "nh3", "nh4", "din", "tkn"];

/// The dissolved organic nitrogen column, also unused downstream.
pub const ORGANIC_NITROGEN_COLUMN: &str = "don";

/// True if an extras column is removed from the trend dataset.
pub fn column_is_dropped(name: &str) -> bool {
    let lower = name.trim().to_ascii_lowercase();
    lower == ORGANIC_NITROGEN_COLUMN
        || lower.contains("depth")
        || NITROGEN_SPECIES_PREFIXES
            .iter()
            .any(|prefix| lower.starts_with(prefix))
}

/// A cleaned trend-dataset row. TN is always present and below the
/// cutoff by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendRow {
    pub station_id: String,
    pub display_name: Option<String>,
    pub date: NaiveDate,
    pub year: i32,
    pub month: Month,
    pub tn: f64,
    pub extras: BTreeMap<String, Option<f64>>,
}

impl TrendRow {
    /// Display name if mapped, station id otherwise.
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.station_id)
    }
}

/// The cleaned dataset used for coverage reporting and, restricted to
/// core months, for model fitting.
///
/// `station_order` lists the stations by ascending median TN; every
/// report and chart iterates stations in this order, and the model
/// layer uses it as the categorical level order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendDataset {
    pub rows: Vec<TrendRow>,
    pub station_order: Vec<String>,
}

impl TrendDataset {
    /// Build the trend dataset from raw records. Stages, in order:
    /// restrict to trend stations, censor TN at the cutoff, drop
    /// missing TN, attach display names, order stations by median TN,
    /// drop the unused nitrogen-species and depth columns.
    pub fn build(
        records: &[SampleRecord],
        trend_set: &BTreeSet<String>,
        names: &StationNames,
        policy: &TransformPolicy,
    ) -> Result<TrendDataset, TrendDataError> {
        let mut rows = Vec::new();
        for record in records {
            if !trend_set.contains(&record.station_id) {
                continue;
            }
            // censor at the cutoff, then drop missing
            let tn = match record.tn {
                Some(v) if v < policy.tn_cutoff => v,
                _ => continue,
            };
            let extras = record
                .extras
                .iter()
                .filter(|(name, _)| !column_is_dropped(name))
                .map(|(name, value)| (name.clone(), *value))
                .collect();
            rows.push(TrendRow {
                station_id: record.station_id.clone(),
                display_name: names.get(&record.station_id).map(str::to_string),
                date: record.date,
                year: record.year,
                month: record.month,
                tn,
                extras,
            });
        }

        if rows.is_empty() {
            return Err(TrendDataError::EmptyTrendData);
        }
        let station_order = order_by_median_tn(&rows);
        log::info!(
            "Trend dataset: {} rows across {} stations",
            rows.len(),
            station_order.len()
        );
        Ok(TrendDataset {
            rows,
            station_order,
        })
    }

    /// Median TN per station, in station-id order.
    pub fn median_tn_by_station(&self) -> BTreeMap<String, f64> {
        group_tn(&self.rows)
            .into_iter()
            .map(|(station, mut values)| (station, median(&mut values)))
            .collect()
    }
}

/// Restrict a trend dataset to the core sampling months (May through
/// October). Kept separate from `TrendDataset::build` because the
/// unrestricted dataset feeds the seasonal-coverage report.
pub fn core_months(dataset: &TrendDataset) -> Result<TrendDataset, TrendDataError> {
    let rows: Vec<TrendRow> = dataset
        .rows
        .iter()
        .filter(|row| row.month.is_core())
        .cloned()
        .collect();
    if rows.is_empty() {
        return Err(TrendDataError::EmptyCoreMonths);
    }
    // keep the median ordering, minus stations with no surviving rows
    let present: BTreeSet<&str> = rows.iter().map(|r| r.station_id.as_str()).collect();
    let station_order = dataset
        .station_order
        .iter()
        .filter(|s| present.contains(s.as_str()))
        .cloned()
        .collect();
    Ok(TrendDataset {
        rows,
        station_order,
    })
}

/// Stations ordered by ascending median TN. The sort is stable, so
/// stations with equal medians keep their first-appearance order.
fn order_by_median_tn(rows: &[TrendRow]) -> Vec<String> {
    let grouped = group_tn(rows);
    // first-appearance order, so ties resolve deterministically
    let mut stations: Vec<String> = rows
        .iter()
        .map(|row| row.station_id.clone())
        .unique()
        .collect();
    let medians: BTreeMap<String, f64> = grouped
        .into_iter()
        .map(|(station, mut values)| (station, median(&mut values)))
        .collect();
    stations.sort_by(|a, b| {
        medians[a]
            .partial_cmp(&medians[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    stations
}

fn group_tn(rows: &[TrendRow]) -> BTreeMap<String, Vec<f64>> {
    let mut grouped: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for row in rows {
        grouped
            .entry(row.station_id.clone())
            .or_default()
            .push(row.tn);
    }
    grouped
}

fn median(values: &mut [f64]) -> f64 {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = values.len();
    if n % 2 == 1 {
        values[n / 2]
    } else {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    }
}
