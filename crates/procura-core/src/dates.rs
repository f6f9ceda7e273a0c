//! # Dates Module
//!
//! Date formatting and calendar rules used by contracts and documents.
//!
//! ## What Lives Here
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Formatting                                                             │
//! │    format_long(2025-01-05)         → "January 5, 2025"                  │
//! │    format_long_padded(2025-01-05)  → "January 05, 2025"                 │
//! │    ordinal_day(2025-01-22)         → "22nd"                             │
//! │                                                                         │
//! │  Parsing (import cells and CLI arguments)                               │
//! │    "2025-01-05" | "01/05/2025" | "January 5, 2025" | 45662              │
//! │                                                                         │
//! │  Calendar                                                               │
//! │    working_day_check(date) → Working | Weekend | Holiday(name)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Spreadsheet Serial Dates
//! Spreadsheets store dates as day counts. The conversion used here is
//! `1900-01-01 + (serial - 2) days`, which absorbs both the 1-based count and
//! the phantom 1900-02-29 of the spreadsheet epoch for any modern date.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::error::{CoreError, CoreResult, ValidationError, ValidationResult};

// =============================================================================
// Formatting
// =============================================================================

/// Formats as `"January 5, 2025"`.
pub fn format_long(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// Formats as `"January 05, 2025"` (certificate style).
pub fn format_long_padded(date: NaiveDate) -> String {
    date.format("%B %d, %Y").to_string()
}

/// English ordinal suffix for a day of the month.
///
/// 1, 21 and 31 take "st"; 2 and 22 take "nd"; 3 and 23 take "rd";
/// everything else (including 11 to 13) takes "th".
pub fn ordinal_suffix(day: u32) -> &'static str {
    match day {
        1 | 21 | 31 => "st",
        2 | 22 => "nd",
        3 | 23 => "rd",
        _ => "th",
    }
}

/// Day of month with its ordinal suffix, e.g. `"22nd"`.
pub fn ordinal_day(date: NaiveDate) -> String {
    format!("{}{}", date.day(), ordinal_suffix(date.day()))
}

// =============================================================================
// Parsing
// =============================================================================

/// Converts a spreadsheet serial day number to a date.
///
/// Returns `None` for serials below 2 or past chrono's range.
pub fn from_spreadsheet_serial(serial: i64) -> Option<NaiveDate> {
    if serial < 2 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1900, 1, 1)?;
    epoch.checked_add_signed(Duration::try_days(serial - 2)?)
}

/// Accepted textual date layouts, tried in order.
const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%m/%d/%Y", "%B %d, %Y", "%b %d, %Y", "%Y/%m/%d"];

/// Parses a date from any of the layouts that show up in forms and imports.
///
/// ## Accepted
/// - ISO `2025-01-05` (a trailing time such as `T00:00:00` is ignored)
/// - US `01/05/2025`
/// - Long `January 5, 2025` / `Jan 5, 2025`
/// - Spreadsheet serials `45662` or `45662.0`
pub fn parse_flexible(input: &str) -> ValidationResult<NaiveDate> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::required("date"));
    }

    // "2025-01-05T08:00:00.000Z" → "2025-01-05"
    let candidate = match trimmed.split_once('T') {
        Some((day, _)) if day.len() == 10 => day,
        _ => trimmed,
    };

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(candidate, format) {
            return Ok(date);
        }
    }

    if let Some(date) = parse_serial(trimmed) {
        return Ok(date);
    }

    Err(ValidationError::invalid_format(
        "date",
        format!("'{}' is not a recognised date", trimmed),
    ))
}

/// Parses `"45662"` or `"45662.0"` as a spreadsheet serial.
fn parse_serial(input: &str) -> Option<NaiveDate> {
    let whole = match input.split_once('.') {
        Some((whole, fraction)) if fraction.chars().all(|c| c == '0') => whole,
        Some(_) => return None,
        None => input,
    };
    let serial: i64 = whole.parse().ok()?;
    from_spreadsheet_serial(serial)
}

// =============================================================================
// Working-Day Calendar
// =============================================================================

/// Outcome of a working-day check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayKind {
    /// Monday to Friday and not a holiday.
    Working,
    /// Saturday or Sunday.
    Weekend,
    /// A non-working holiday, with its name.
    Holiday(&'static str),
}

impl DayKind {
    /// True for [`DayKind::Working`].
    pub fn is_working(&self) -> bool {
        matches!(self, DayKind::Working)
    }
}

/// Fixed-date regular and special non-working holidays: (month, day, name).
const FIXED_HOLIDAYS: [(u32, u32, &str); 14] = [
    (1, 1, "New Year's Day"),
    (2, 25, "EDSA People Power Revolution Anniversary"),
    (4, 9, "Araw ng Kagitingan"),
    (5, 1, "Labor Day"),
    (6, 12, "Independence Day"),
    (8, 21, "Ninoy Aquino Day"),
    (11, 1, "All Saints' Day"),
    (11, 2, "All Souls' Day"),
    (11, 30, "Bonifacio Day"),
    (12, 8, "Feast of the Immaculate Conception"),
    (12, 24, "Christmas Eve"),
    (12, 25, "Christmas Day"),
    (12, 30, "Rizal Day"),
    (12, 31, "Last Day of the Year"),
];

/// Classifies a date as a working day, weekend or holiday.
///
/// Movable holidays tied to the lunar or church calendar are not modelled;
/// National Heroes Day (last Monday of August) is.
pub fn working_day_check(date: NaiveDate) -> DayKind {
    if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
        return DayKind::Weekend;
    }

    if let Some((_, _, name)) = FIXED_HOLIDAYS
        .iter()
        .find(|(month, day, _)| date.month() == *month && date.day() == *day)
    {
        return DayKind::Holiday(name);
    }

    if is_national_heroes_day(date) {
        return DayKind::Holiday("National Heroes Day");
    }

    DayKind::Working
}

/// Last Monday of August.
fn is_national_heroes_day(date: NaiveDate) -> bool {
    date.month() == 8 && date.weekday() == Weekday::Mon && date.day() + 7 > 31
}

/// Fails with [`CoreError::NotAWorkingDay`] unless `date` is a working day.
pub fn ensure_working_day(field: &str, date: NaiveDate) -> CoreResult<()> {
    let reason = match working_day_check(date) {
        DayKind::Working => return Ok(()),
        DayKind::Weekend => "Monday to Friday only".to_string(),
        DayKind::Holiday(name) => name.to_string(),
    };
    Err(CoreError::NotAWorkingDay {
        field: field.to_string(),
        date: date.to_string(),
        reason,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
