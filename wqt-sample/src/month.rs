use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Calendar month as an ordered categorical.
///
/// Declaration order is calendar order, so the derived `Ord` sorts
/// January before December rather than alphabetically. Grouped reports
/// and charts rely on this.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Month {
    Jan,
    Feb,
    Mar,
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sep,
    Oct,
    Nov,
    Dec,
}

impl Month {
    /// All months in calendar order.
    pub const ALL: [Month; 12] = [
        Month::Jan,
        Month::Feb,
        Month::Mar,
        Month::Apr,
        Month::May,
        Month::Jun,
        Month::Jul,
        Month::Aug,
        Month::Sep,
        Month::Oct,
        Month::Nov,
        Month::Dec,
    ];

    /// Month from its calendar number (1 = January).
    pub fn from_number(n: u32) -> Option<Month> {
        match n {
            1..=12 => Some(Month::ALL[(n - 1) as usize]),
            _ => None,
        }
    }

    /// Month of a calendar date.
    pub fn from_date(date: &NaiveDate) -> Month {
        // NaiveDate::month() is always 1..=12
        Month::from_number(date.month()).unwrap()
    }

    /// Calendar number, 1 = January.
    pub fn number(&self) -> u32 {
        *self as u32 + 1
    }

    /// Three-letter label for report output.
    pub fn label(&self) -> &'static str {
        match self {
            Month::Jan => "Jan",
            Month::Feb => "Feb",
            Month::Mar => "Mar",
            Month::Apr => "Apr",
            Month::May => "May",
            Month::Jun => "Jun",
            Month::Jul => "Jul",
            Month::Aug => "Aug",
            Month::Sep => "Sep",
            Month::Oct => "Oct",
            Month::Nov => "Nov",
            Month::Dec => "Dec",
        }
    }

    /// True for the May through October sampling window, the period
    /// with consistent historical coverage.
    pub fn is_core(&self) -> bool {
        matches!(
            self,
            Month::May | Month::Jun | Month::Jul | Month::Aug | Month::Sep | Month::Oct
        )
    }
}

#[cfg(test)]
mod tests {
    use super::Month;
    use chrono::NaiveDate;

    #[test]
    fn test_calendar_order() {
        assert!(Month::Jan < Month::Feb);
        assert!(Month::Apr < Month::May);
        assert!(Month::Nov < Month::Dec);
        let mut months = vec![Month::Oct, Month::Jan, Month::May];
        months.sort();
        assert_eq!(months, vec![Month::Jan, Month::May, Month::Oct]);
    }

    #[test]
    fn test_number_round_trip() {
        for n in 1..=12u32 {
            assert_eq!(Month::from_number(n).unwrap().number(), n);
        }
        assert_eq!(Month::from_number(0), None);
        assert_eq!(Month::from_number(13), None);
    }

    #[test]
    fn test_core_window() {
        let core: Vec<Month> = Month::ALL.iter().copied().filter(Month::is_core).collect();
        assert_eq!(
            core,
            vec![
                Month::May,
                Month::Jun,
                Month::Jul,
                Month::Aug,
                Month::Sep,
                Month::Oct
            ]
        );
    }

    #[test]
    fn test_from_date() {
        let date = NaiveDate::from_ymd_opt(2018, 7, 4).unwrap();
        assert_eq!(Month::from_date(&date), Month::Jul);
    }
}
