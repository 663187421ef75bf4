#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::NaiveDate;

use casemap::domain::{CalendarDate, RawPayload};
use casemap::fetch::{DatedResourceFetcher, FetchOutcome};

pub fn date(y: i32, m: u32, d: u32) -> CalendarDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub const REPORT_HEADER: &str =
    "Province/State,Country/Region,Last Update,Confirmed,Deaths,Recovered,Latitude,Longitude";

pub fn report(rows: &[&str]) -> RawPayload {
    let mut text = String::from(REPORT_HEADER);
    for row in rows {
        text.push('\n');
        text.push_str(row);
    }
    text.push('\n');
    RawPayload::new(text)
}

/// Answers from a fixed table and records every requested date.
#[derive(Default)]
pub struct ScriptedFetcher {
    outcomes: HashMap<CalendarDate, FetchOutcome>,
    calls: Mutex<Vec<CalendarDate>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, date: CalendarDate, outcome: FetchOutcome) -> Self {
        self.outcomes.insert(date, outcome);
        self
    }

    pub fn calls(&self) -> Vec<CalendarDate> {
        self.calls.lock().unwrap().clone()
    }
}

impl DatedResourceFetcher for ScriptedFetcher {
    fn fetch(&self, date: CalendarDate) -> FetchOutcome {
        self.calls.lock().unwrap().push(date);
        self.outcomes
            .get(&date)
            .cloned()
            .unwrap_or(FetchOutcome::NotFound)
    }
}
