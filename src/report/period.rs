use chrono::{DateTime, Datelike, NaiveDate, Utc};

use crate::error::{LedgerError, Result};

/// Calendar window a report can be restricted to, compared in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Period {
    Month { year: i32, month: u32 },
    Year(i32),
}

impl Period {
    /// Accepts `YYYY-MM` or `YYYY`.
    pub(crate) fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let invalid = || LedgerError::Validation(format!("period must be YYYY-MM or YYYY, got '{s}'"));

        let is_year = |y: &str| y.len() == 4 && y.bytes().all(|b| b.is_ascii_digit());
        match s.split_once('-') {
            Some((year, month)) if is_year(year) && month.len() == 2 => {
                let date = NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d")
                    .map_err(|_| invalid())?;
                Ok(Self::Month {
                    year: date.year(),
                    month: date.month(),
                })
            }
            None if is_year(s) => s.parse().map(Self::Year).map_err(|_| invalid()),
            _ => Err(invalid()),
        }
    }

    pub(crate) fn contains(&self, ts: &DateTime<Utc>) -> bool {
        match *self {
            Self::Month { year, month } => ts.year() == year && ts.month() == month,
            Self::Year(year) => ts.year() == year,
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Month { year, month } => write!(f, "{year:04}-{month:02}"),
            Self::Year(year) => write!(f, "{year:04}"),
        }
    }
}
