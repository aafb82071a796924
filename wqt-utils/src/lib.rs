//! Shared utility functions for WQT crates.

/// Date utility functions
pub mod dates {
    use chrono::NaiveDate;

    /// Format a NaiveDate as "YYYY-MM-DD"
    pub fn format_date(date: &NaiveDate) -> String {
        date.format("%Y-%m-%d").to_string()
    }

    /// Parse a sample date string.
    ///
    /// Monitoring exports use "YYYY-MM-DD"; older extracts use
    /// "MM/DD/YYYY". Both are accepted.
    pub fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
        let trimmed = s.trim();
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
            return Ok(date);
        }
        Ok(NaiveDate::parse_from_str(trimmed, "%m/%d/%Y")?)
    }

}

/// Formatting helpers for report tables
pub mod fmt {
    /// Significance stars in the conventional bands.
    pub fn signif_stars(p: f64) -> &'static str {
        if p < 0.001 {
            "***"
        } else if p < 0.01 {
            "**"
        } else if p < 0.05 {
            "*"
        } else if p < 0.1 {
            "."
        } else {
            ""
        }
    }

    /// Format a p-value the way regression summaries print them:
    /// tiny values as "<1e-16", otherwise 4 significant digits.
    pub fn format_p(p: f64) -> String {
        if p < 1e-16 {
            "<1e-16".to_string()
        } else {
            format!("{:.4}", p)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_signif_stars_bands() {
            assert_eq!(signif_stars(0.0001), "***");
            assert_eq!(signif_stars(0.005), "**");
            assert_eq!(signif_stars(0.04), "*");
            assert_eq!(signif_stars(0.07), ".");
            assert_eq!(signif_stars(0.5), "");
        }

        #[test]
        fn test_format_p_tiny() {
            assert_eq!(format_p(1e-20), "<1e-16");
            assert_eq!(format_p(0.0421), "0.0421");
        }
    }
}
