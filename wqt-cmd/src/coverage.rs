//! Seasonal coverage report: how many samples each trend station has
//! in each calendar month, over the unrestricted trend dataset.

use crate::PolicyArgs;
use log::info;
use std::collections::BTreeMap;
use std::path::Path;
use wqt_data::{trend_stations, TrendDataset};
use wqt_sample::{month::Month, sample::SampleRecord, station::StationNames};

/// Print the station-by-month sample-count table. Uses the full trend
/// dataset, not the core-months restriction, so sparse shoulder-season
/// coverage is visible.
pub fn run_coverage(
    samples_csv: &str,
    stations_xlsx: &str,
    policy: &PolicyArgs,
) -> anyhow::Result<()> {
    let records = SampleRecord::load_csv(Path::new(samples_csv))?;
    info!("Loaded {} sample records from {}", records.len(), samples_csv);
    let names = StationNames::load_xlsx(Path::new(stations_xlsx))?;

    let trend_set = trend_stations(&records, &policy.selection())?;
    let dataset = TrendDataset::build(&records, &trend_set, &names, &policy.transform())?;

    // (station, month) -> sample count
    let mut counts: BTreeMap<(&str, Month), usize> = BTreeMap::new();
    for row in &dataset.rows {
        *counts.entry((row.station_id.as_str(), row.month)).or_default() += 1;
    }
    let label_for = |id: &str| {
        dataset
            .rows
            .iter()
            .find(|r| r.station_id == id)
            .map(|r| r.label().to_string())
            .unwrap_or_else(|| id.to_string())
    };
    let width = dataset
        .station_order
        .iter()
        .map(|s| label_for(s).len())
        .max()
        .unwrap_or(10);

    println!("Seasonal sample coverage (TN samples per station and month):");
    print!("{:<width$}", "");
    for month in Month::ALL {
        print!(" {:>5}", month.label());
    }
    println!(" {:>6}", "Total");
    for station in &dataset.station_order {
        print!("{:<width$}", label_for(station));
        let mut total = 0;
        for month in Month::ALL {
            let count = counts
                .get(&(station.as_str(), month))
                .copied()
                .unwrap_or(0);
            total += count;
            print!(" {count:>5}");
        }
        println!(" {total:>6}");
    }
    Ok(())
}
