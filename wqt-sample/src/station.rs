use crate::error::{LoadError, Result};
use calamine::{open_workbook, Data, Reader, Xlsx};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Mapping from station identifier to a short display name.
///
/// Loaded from the first worksheet of the station workbook: column 1 is
/// the station identifier, column 2 the display name, header row
/// skipped. Stations missing from the workbook simply have no display
/// name; lookups return `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StationNames {
    names: BTreeMap<String, String>,
}

impl StationNames {
    /// Load the station-name table from an .xlsx workbook.
    pub fn load_xlsx(path: &Path) -> Result<StationNames> {
        if !path.exists() {
            return Err(LoadError::FileNotFound(path.display().to_string()));
        }
        let mut workbook: Xlsx<_> =
            open_workbook(path).map_err(|e: calamine::XlsxError| LoadError::Workbook(e.to_string()))?;
        let sheet = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or(LoadError::EmptyWorkbook)?;
        let range = workbook
            .worksheet_range(&sheet)
            .map_err(|e| LoadError::Workbook(e.to_string()))?;

        let mut names = BTreeMap::new();
        for row in range.rows().skip(1) {
            let id = cell_text(row.first());
            let name = cell_text(row.get(1));
            if let (Some(id), Some(name)) = (id, name) {
                names.insert(id, name);
            }
        }
        Ok(StationNames { names })
    }

    /// Build a table directly from (station_id, display_name) pairs.
    pub fn from_pairs<I, S>(pairs: I) -> StationNames
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        StationNames {
            names: pairs
                .into_iter()
                .map(|(id, name)| (id.into(), name.into()))
                .collect(),
        }
    }

    /// Display name for a station, if one is mapped.
    pub fn get(&self, station_id: &str) -> Option<&str> {
        self.names.get(station_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Text content of a worksheet cell, if it holds usable text or a
/// number (some exports store station codes as numbers).
fn cell_text(cell: Option<&Data>) -> Option<String> {
    match cell? {
        Data::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Data::Float(f) => Some(format!("{f}")),
        Data::Int(i) => Some(i.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::StationNames;
    use crate::error::LoadError;
    use std::path::Path;

    #[test]
    fn test_lookup() {
        let names = StationNames::from_pairs([("EST01", "Upper Bay"), ("EST02", "Mid Bay")]);
        assert_eq!(names.get("EST01"), Some("Upper Bay"));
        assert_eq!(names.get("EST99"), None);
        assert_eq!(names.len(), 2);
    }

    #[test]
    fn test_missing_workbook() {
        let err = StationNames::load_xlsx(Path::new("no_such_file.xlsx")).unwrap_err();
        assert!(matches!(err, LoadError::FileNotFound(_)));
    }
}
