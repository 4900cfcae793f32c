use crate::table::CellValue;
use chrono::{Local, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// The closed set of per-cell checks a column can declare.
///
/// The coercion checks (`IsInt`/`IsFloat`/`IsDatetime`) test parseability of
/// user-entered values rather than their stored type, because cells in a
/// human-edited spreadsheet routinely hold text-formatted numbers and dates.
/// The remaining checks skip values of the wrong type: reporting those is the
/// coercion checks' job, and one bad cell should not be reported twice.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub enum Check {
    /// Value must be coercible to a whole number.
    IsInt,
    /// Value must be coercible to a number.
    IsFloat,
    /// Value must be coercible to a date.
    IsDatetime,
    /// Value must be one of the allowed options, i.e. picked from a dropdown.
    IsIn(Vec<String>),
    /// Date must not be after today.
    NotInFuture,
    /// Free text must not exceed the word count.
    MaxWordCount(usize),
    GreaterThan(f64),
    GreaterThanOrEqualTo(f64),
    LessThan(f64),
    /// Text must match the regular expression.
    MatchesRegex(String),
}

impl Check {
    /// Runs the check against a single cell value. Empty cells always pass;
    /// the column's `nullable` setting is what reports those.
    pub(crate) fn passes(&self, value: &CellValue) -> bool {
        if value.is_empty() {
            return true;
        }
        match self {
            Check::IsInt => as_number(value).is_some_and(|n| n.fract() == 0.0),
            Check::IsFloat => as_number(value).is_some(),
            Check::IsDatetime => as_datetime(value).is_some(),
            Check::IsIn(allowed) => allowed.iter().any(|option| *option == value.to_string()),
            Check::NotInFuture => {
                as_datetime(value).is_none_or(|dt| dt.date() <= Local::now().date_naive())
            }
            Check::MaxWordCount(max_words) => value
                .as_str()
                .is_none_or(|s| s.split_whitespace().count() <= *max_words),
            Check::GreaterThan(bound) => as_number(value).is_none_or(|n| n > *bound),
            Check::GreaterThanOrEqualTo(bound) => as_number(value).is_none_or(|n| n >= *bound),
            Check::LessThan(bound) => as_number(value).is_none_or(|n| n < *bound),
            Check::MatchesRegex(pattern) => match value.as_str() {
                Some(s) => Regex::new(pattern).map(|re| re.is_match(s)).unwrap_or(false),
                None => true,
            },
        }
    }

    /// The guidance shown to the template author when the check fails.
    pub(crate) fn message(&self) -> String {
        match self {
            Check::IsInt => "Value must be a whole number.".to_string(),
            Check::IsFloat => {
                "You entered text instead of a number. Remove any names of measurements and only use numbers, for example, '9'."
                    .to_string()
            }
            Check::IsDatetime => {
                "You entered text instead of a date. Date must be in numbers.".to_string()
            }
            Check::IsIn(_) => {
                "You've entered your own content instead of selecting from the dropdown list provided. Select an option from the dropdown list."
                    .to_string()
            }
            Check::NotInFuture => "You must not enter a date in the future.".to_string(),
            Check::MaxWordCount(max_words) => format!("Enter no more than {max_words} words."),
            Check::GreaterThan(bound) => format!("Amount must be greater than {bound}."),
            Check::GreaterThanOrEqualTo(bound) => {
                format!("Amount must be greater than or equal to {bound}.")
            }
            Check::LessThan(bound) => format!("Amount must be less than {bound}."),
            Check::MatchesRegex(_) => "Enter text in the correct format.".to_string(),
        }
    }
}

/// Numeric reading of a cell, including text-formatted numbers.
pub(crate) fn as_number(value: &CellValue) -> Option<f64> {
    match value {
        CellValue::Int(i) => Some(*i as f64),
        CellValue::Float(f) => Some(*f),
        CellValue::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Datetime reading of a cell, including text-formatted dates.
pub(crate) fn as_datetime(value: &CellValue) -> Option<NaiveDateTime> {
    match value {
        CellValue::DateTime(dt) => Some(*dt),
        CellValue::String(s) => parse_datetime(s.trim()),
        _ => None,
    }
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%d %B %Y",
    "%d %b %Y",
];

fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }
    None
}
