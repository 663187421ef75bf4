use chrono::NaiveDate;
use serde::Serialize;

use crate::error::CaseMapError;

pub type CalendarDate = NaiveDate;

pub const RESOURCE_DATE_FORMAT: &str = "%m-%d-%Y";

pub fn resource_date(date: CalendarDate) -> String {
    date.format(RESOURCE_DATE_FORMAT).to_string()
}

pub fn parse_calendar_date(value: &str) -> Result<CalendarDate, CaseMapError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| CaseMapError::InvalidDate(value.to_string()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPayload(String);

impl RawPayload {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseRecord {
    pub latitude: f64,
    pub longitude: f64,
    pub confirmed: u64,
    pub deaths: u64,
    pub recovered: Option<u64>,
    pub region: String,
    pub country: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapPoint {
    pub position: Position,
    pub label: String,
    pub description: String,
    pub badge: String,
    pub display_size: u32,
}

pub fn days_between(as_of: CalendarDate, today: CalendarDate) -> i64 {
    today.signed_duration_since(as_of).num_days()
}

pub fn as_of_caption(as_of: CalendarDate, today: CalendarDate) -> String {
    match days_between(as_of, today) {
        days if days <= 0 => "as of today".to_string(),
        1 => "as of 1 day ago".to_string(),
        days => format!("as of {days} days ago"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> CalendarDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn resource_date_is_zero_padded_month_first() {
        assert_eq!(resource_date(date(2020, 3, 7)), "03-07-2020");
        assert_eq!(resource_date(date(2024, 12, 31)), "12-31-2024");
    }

    #[test]
    fn caption_counts_days_behind() {
        let today = date(2024, 3, 1);
        assert_eq!(as_of_caption(today, today), "as of today");
        assert_eq!(as_of_caption(date(2024, 2, 29), today), "as of 1 day ago");
        assert_eq!(as_of_caption(date(2024, 2, 27), today), "as of 3 days ago");
    }

    #[test]
    fn parse_calendar_date_rejects_us_order() {
        assert!(parse_calendar_date("2024-03-01").is_ok());
        assert!(parse_calendar_date("03-01-2024").is_err());
    }
}
