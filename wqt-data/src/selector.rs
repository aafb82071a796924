use crate::error::TrendDataError;
use std::collections::{BTreeMap, BTreeSet};
use wqt_sample::sample::SampleRecord;

/// Thresholds a station must meet to qualify for trend analysis.
///
/// The defaults reproduce the fixed policy of the source analysis:
/// at least ten sampled years overall, at least two of them after 2014.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionPolicy {
    /// Minimum count of distinct years with at least one TN measurement.
    pub min_total_years: usize,
    /// Minimum count of such years with year > `recent_after`.
    pub min_recent_years: usize,
    /// Year boundary for the recency requirement (exclusive).
    pub recent_after: i32,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        SelectionPolicy {
            min_total_years: 10,
            min_recent_years: 2,
            recent_after: 2014,
        }
    }
}

/// Select the stations with long, recent TN records.
///
/// A (station, year) pair counts as sampled when at least one record
/// that year carries a TN value. The returned set is ordered by
/// station id, so downstream output is deterministic.
pub fn trend_stations(
    records: &[SampleRecord],
    policy: &SelectionPolicy,
) -> Result<BTreeSet<String>, TrendDataError> {
    // station -> distinct years with at least one measured TN value
    let mut sampled_years: BTreeMap<&str, BTreeSet<i32>> = BTreeMap::new();
    for record in records {
        if record.tn.is_some() {
            sampled_years
                .entry(record.station_id.as_str())
                .or_default()
                .insert(record.year);
        }
    }

    let candidates = sampled_years.len();
    let selected: BTreeSet<String> = sampled_years
        .into_iter()
        .filter(|(_, years)| {
            let total = years.len();
            let recent = years.iter().filter(|y| **y > policy.recent_after).count();
            total >= policy.min_total_years && recent >= policy.min_recent_years
        })
        .map(|(station, _)| station.to_string())
        .collect();

    if selected.is_empty() {
        return Err(TrendDataError::NoTrendStations { candidates });
    }
    log::info!(
        "{} of {} stations qualify for trend analysis",
        selected.len(),
        candidates
    );
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::{trend_stations, SelectionPolicy};
    use crate::error::TrendDataError;
    use chrono::NaiveDate;
    use std::collections::BTreeMap;
    use wqt_sample::{month::Month, sample::SampleRecord};

    /// One TN sample for `station` in June of `year`.
    fn sample(station: &str, year: i32, tn: Option<f64>) -> SampleRecord {
        let date = NaiveDate::from_ymd_opt(year, 6, 15).unwrap();
        SampleRecord {
            station_id: station.to_string(),
            date,
            year,
            month: Month::Jun,
            tn,
            extras: BTreeMap::new(),
        }
    }

    /// TN samples for `station` across each year in `years`.
    fn sampled_years(station: &str, years: impl IntoIterator<Item = i32>) -> Vec<SampleRecord> {
        years
            .into_iter()
            .map(|y| sample(station, y, Some(0.5)))
            .collect()
    }

    #[test]
    fn test_boundary_exactly_meets_thresholds() {
        // 10 total years, 2 after 2014: included
        let records = sampled_years("A", (2007..=2014).chain([2015, 2016]));
        let set = trend_stations(&records, &SelectionPolicy::default()).unwrap();
        assert!(set.contains("A"));
    }

    #[test]
    fn test_nine_total_years_excluded() {
        let mut records = sampled_years("A", (2008..=2014).chain([2015, 2016]));
        // B qualifies so the selector has a non-empty result
        records.extend(sampled_years("B", 2005..=2020));
        let set = trend_stations(&records, &SelectionPolicy::default()).unwrap();
        assert!(!set.contains("A"));
        assert!(set.contains("B"));
    }

    #[test]
    fn test_one_recent_year_excluded() {
        let mut records = sampled_years("A", 2000..=2014);
        records.extend(sampled_years("A", [2015]));
        records.extend(sampled_years("B", 2005..=2020));
        let set = trend_stations(&records, &SelectionPolicy::default()).unwrap();
        // 16 total years but only one after 2014
        assert!(!set.contains("A"));
    }

    #[test]
    fn test_missing_tn_years_do_not_count() {
        // sampled for other nutrients every year, TN only in 4 of them
        let mut records: Vec<SampleRecord> =
            (2005..=2020).map(|y| sample("A", y, None)).collect();
        records.extend(sampled_years("A", [2017, 2018, 2019, 2020]));
        records.extend(sampled_years("B", 2005..=2020));
        let set = trend_stations(&records, &SelectionPolicy::default()).unwrap();
        assert!(!set.contains("A"));
    }

    #[test]
    fn test_long_station_in_short_station_out() {
        let mut records = sampled_years("A", 2000..=2020);
        records.extend(sampled_years("B", 2018..=2020));
        let set = trend_stations(&records, &SelectionPolicy::default()).unwrap();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["A"]);
    }

    #[test]
    fn test_empty_result_is_an_error() {
        let records = sampled_years("B", 2018..=2020);
        let err = trend_stations(&records, &SelectionPolicy::default()).unwrap_err();
        assert!(matches!(
            err,
            TrendDataError::NoTrendStations { candidates: 1 }
        ));
    }
}
