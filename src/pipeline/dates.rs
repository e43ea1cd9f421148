//! Date normalization: `"28 Juli 2025 s.d 01 Agustus 2025"` → ISO dates.
//!
//! The model is asked to copy the execution period verbatim, which in these
//! letters is always an Indonesian range joined by `s.d` ("sampai dengan",
//! until). Anything that does not parse into two real calendar dates yields
//! empty strings; a bad date never fails the request.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Start and end of the assignment, `YYYY-MM-DD` or `""`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start_date: String,
    pub end_date: String,
}

impl DateRange {
    /// Both dates undeterminable.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.start_date.is_empty() && self.end_date.is_empty()
    }
}

static RE_DATE_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(\d{1,2})\s+([A-Za-z]+)\s+(\d{4})\s+s\.d\s+(\d{1,2})\s+([A-Za-z]+)\s+(\d{4})",
    )
    .unwrap()
});

/// Indonesian month names, January first.
const BULAN: [&str; 12] = [
    "januari", "februari", "maret", "april", "mei", "juni", "juli", "agustus", "september",
    "oktober", "november", "desember",
];

/// English month names, accepted when the model translates the period.
const MONTHS: [&str; 12] = [
    "january", "february", "march", "april", "may", "june", "july", "august", "september",
    "october", "november", "december",
];

/// Calendar month number (1–12) for an Indonesian or English month name.
pub fn month_number(name: &str) -> Option<u32> {
    let name = name.to_lowercase();
    BULAN
        .iter()
        .position(|m| *m == name)
        .or_else(|| MONTHS.iter().position(|m| *m == name))
        .map(|idx| idx as u32 + 1)
}

/// Parse a `DD MonthName YYYY s.d DD MonthName YYYY` range.
///
/// Returns [`DateRange::empty`] when the text does not match or either date
/// is not a real calendar date.
pub fn normalize_date_range(text: &str) -> DateRange {
    parse_range(text).unwrap_or_else(DateRange::empty)
}

fn parse_range(text: &str) -> Option<DateRange> {
    let caps = RE_DATE_RANGE.captures(text)?;
    let start = parse_date(&caps[1], &caps[2], &caps[3])?;
    let end = parse_date(&caps[4], &caps[5], &caps[6])?;
    Some(DateRange {
        start_date: start.format("%Y-%m-%d").to_string(),
        end_date: end.format("%Y-%m-%d").to_string(),
    })
}

fn parse_date(day: &str, month: &str, year: &str) -> Option<NaiveDate> {
    let day: u32 = day.parse().ok()?;
    let month = month_number(month)?;
    let year: i32 = year.parse().ok()?;
    if year < 1 {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}
