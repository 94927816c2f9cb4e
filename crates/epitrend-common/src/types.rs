//! Common type definitions shared by the config, data and graph crates.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// On-disk format of the source dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// Pick the format from the file extension.
    #[default]
    Auto,
    /// Comma-separated values with a header row.
    Csv,
    /// A JSON array of records.
    Json,
}

impl SourceFormat {
    /// Resolves `Auto` against a path; explicit formats are returned unchanged.
    pub fn resolve(self, path: &Path) -> Self {
        match self {
            Self::Auto => match path.extension().and_then(|ext| ext.to_str()) {
                Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
                _ => Self::Csv,
            },
            other => other,
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Auto => "auto",
            Self::Csv => "csv",
            Self::Json => "json",
        };
        f.write_str(name)
    }
}

/// A calendar month, ordered chronologically and displayed as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    /// Calendar year.
    pub year: i32,
    /// Month number, 1 through 12.
    pub month: u32,
}

impl YearMonth {
    /// Creates a month, returning `None` when `month` is outside 1..=12.
    pub const fn new(year: i32, month: u32) -> Option<Self> {
        if month >= 1 && month <= 12 {
            Some(Self { year, month })
        } else {
            None
        }
    }
}

impl From<NaiveDate> for YearMonth {
    fn from(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_format_resolution() {
        assert_eq!(SourceFormat::Auto.resolve(Path::new("a/b.json")), SourceFormat::Json);
        assert_eq!(SourceFormat::Auto.resolve(Path::new("a/b.JSON")), SourceFormat::Json);
        assert_eq!(SourceFormat::Auto.resolve(Path::new("a/b.csv")), SourceFormat::Csv);
        assert_eq!(SourceFormat::Auto.resolve(Path::new("a/b")), SourceFormat::Csv);
        assert_eq!(SourceFormat::Csv.resolve(Path::new("a/b.json")), SourceFormat::Csv);
    }

    #[test]
    fn test_year_month_display_and_order() {
        let jan = YearMonth::new(2021, 1).unwrap();
        let dec = YearMonth::new(2020, 12).unwrap();
        assert_eq!(jan.to_string(), "2021-01");
        assert!(dec < jan);
        assert!(YearMonth::new(2021, 13).is_none());
    }

    #[test]
    fn test_year_month_from_date() {
        let date = NaiveDate::from_ymd_opt(2020, 3, 17).unwrap();
        let month = YearMonth::from(date);
        assert_eq!(month.to_string(), "2020-03");
    }
}
