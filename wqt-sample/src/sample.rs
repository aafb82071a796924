use crate::{
    error::{LoadError, Result},
    month::Month,
};
use chrono::{Datelike, NaiveDate};
use csv::{ReaderBuilder, StringRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

/// Accepted header names for the station-identifier column.
pub const STATION_COLUMNS: &[&str] = &["station", "station_id", "site", "site_id"];

/// Accepted header names for the sample-date column.
pub const DATE_COLUMNS: &[&str] = &["date", "sample_date", "sampled"];

/// Accepted header names for the total-nitrogen column.
pub const TN_COLUMNS: &[&str] = &["tn", "total_nitrogen"];

/// A single nutrient sample from a monitoring station.
///
/// One record per station per sampling date. `tn` is `None` when total
/// nitrogen was not measured on that date. Every other numeric column
/// of the input lands in `extras` under its original header name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleRecord {
    pub station_id: String,
    pub date: NaiveDate,
    pub year: i32,
    pub month: Month,
    /// Total nitrogen in mg/L, if measured.
    pub tn: Option<f64>,
    /// Remaining numeric columns (other nitrogen species, depth, ...).
    pub extras: BTreeMap<String, Option<f64>>,
}

impl SampleRecord {
    /// Load sample records from a CSV file on disk.
    pub fn load_csv(path: &Path) -> Result<Vec<SampleRecord>> {
        if !path.exists() {
            return Err(LoadError::FileNotFound(path.display().to_string()));
        }
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(file)
    }

    /// Parse sample records from CSV text.
    pub fn parse_csv(csv_object: &str) -> Result<Vec<SampleRecord>> {
        Self::from_csv_reader(csv_object.as_bytes())
    }

    fn from_csv_reader<R: Read>(reader: R) -> Result<Vec<SampleRecord>> {
        let mut rdr = ReaderBuilder::new()
            .delimiter(b',')
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let station_idx = find_column(&headers, STATION_COLUMNS)
            .ok_or(LoadError::MissingColumn("station"))?;
        let date_idx =
            find_column(&headers, DATE_COLUMNS).ok_or(LoadError::MissingColumn("date"))?;
        let tn_idx = find_column(&headers, TN_COLUMNS).ok_or(LoadError::MissingColumn("tn"))?;

        let mut records = Vec::new();
        for (i, row) in rdr.records().enumerate() {
            let record = row?;
            // header is line 1; data rows start at line 2
            let line = i + 2;
            records.push(Self::from_string_record(
                &record,
                &headers,
                station_idx,
                date_idx,
                tn_idx,
                line,
            )?);
        }
        Ok(records)
    }

    fn from_string_record(
        record: &StringRecord,
        headers: &StringRecord,
        station_idx: usize,
        date_idx: usize,
        tn_idx: usize,
        line: usize,
    ) -> Result<SampleRecord> {
        let station_id = record.get(station_idx).unwrap_or("").to_string();
        let date_value = record.get(date_idx).unwrap_or("");
        let date =
            wqt_utils::dates::parse_date(date_value).map_err(|_| LoadError::DateParse {
                row: line,
                value: date_value.to_string(),
            })?;

        let mut extras = BTreeMap::new();
        for (idx, cell) in record.iter().enumerate() {
            if idx == station_idx || idx == date_idx || idx == tn_idx {
                continue;
            }
            if let Some(name) = headers.get(idx) {
                extras.insert(name.to_string(), parse_measurement(cell));
            }
        }

        Ok(SampleRecord {
            station_id,
            year: date.year(),
            month: Month::from_date(&date),
            date,
            tn: record.get(tn_idx).and_then(parse_measurement),
            extras,
        })
    }
}

/// Locate a column by any of its accepted names, case-insensitively.
fn find_column(headers: &StringRecord, names: &[&str]) -> Option<usize> {
    headers.iter().position(|h| {
        let h = h.trim().to_ascii_lowercase();
        names.iter().any(|n| h == *n)
    })
}

/// Parse a measurement cell: blank or non-numeric means not measured.
fn parse_measurement(cell: &str) -> Option<f64> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::SampleRecord;
    use crate::error::LoadError;
    use crate::month::Month;
    use chrono::NaiveDate;

    const CSV: &str = "\
station,date,tn,no23,nh4,depth_m,temp_c
EST01,2015-06-10,0.52,0.11,0.02,1.5,21.0
EST01,2015-07-08,,0.09,,1.5,23.5
EST02,2015-06-11,0.80,0.21,0.04,2.0,20.1
";

    #[test]
    fn test_parse_sample_csv() {
        let records = SampleRecord::parse_csv(CSV).unwrap();
        assert_eq!(records.len(), 3);

        let first = &records[0];
        assert_eq!(first.station_id, "EST01");
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2015, 6, 10).unwrap());
        assert_eq!(first.year, 2015);
        assert_eq!(first.month, Month::Jun);
        assert_eq!(first.tn, Some(0.52));
        assert_eq!(first.extras.get("no23"), Some(&Some(0.11)));
        assert_eq!(first.extras.get("temp_c"), Some(&Some(21.0)));

        // blank TN cell means not measured that date
        assert_eq!(records[1].tn, None);
        assert_eq!(records[1].extras.get("nh4"), Some(&None));
    }

    #[test]
    fn test_header_aliases() {
        let csv = "site_id,sample_date,total_nitrogen\nEST01,2015-06-10,0.52\n";
        let records = SampleRecord::parse_csv(csv).unwrap();
        assert_eq!(records[0].station_id, "EST01");
        assert_eq!(records[0].tn, Some(0.52));
        assert!(records[0].extras.is_empty());
    }

    #[test]
    fn test_missing_tn_column() {
        let csv = "station,date,no23\nEST01,2015-06-10,0.11\n";
        let err = SampleRecord::parse_csv(csv).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn("tn")));
    }

    #[test]
    fn test_bad_date_reports_row() {
        let csv = "station,date,tn\nEST01,2015-06-10,0.52\nEST01,junk,0.60\n";
        let err = SampleRecord::parse_csv(csv).unwrap_err();
        match err {
            LoadError::DateParse { row, value } => {
                assert_eq!(row, 3);
                assert_eq!(value, "junk");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
