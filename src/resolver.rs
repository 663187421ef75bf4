use chrono::Days;
use tracing::{debug, info, warn};

use crate::domain::{CalendarDate, RawPayload};
use crate::error::PipelineError;
use crate::fetch::{DatedResourceFetcher, FetchOutcome};

pub fn resolve<F: DatedResourceFetcher + ?Sized>(
    fetcher: &F,
    start: CalendarDate,
    max_lookback: u32,
) -> Result<(RawPayload, CalendarDate), PipelineError> {
    let mut date = start;
    for attempt in 0..max_lookback {
        match fetcher.fetch(date) {
            FetchOutcome::Found(payload) => {
                info!(%date, attempt, bytes = payload.len(), "report.found");
                return Ok((payload, date));
            }
            FetchOutcome::NotFound => {
                debug!(%date, attempt, "report.missing");
            }
            // An unreachable server says nothing about whether the report exists.
            FetchOutcome::TransientError(detail) => {
                warn!(%date, %detail, "report.transient_error");
                return Err(PipelineError::Transient { date, detail });
            }
        }
        match date.checked_sub_days(Days::new(1)) {
            Some(previous) => date = previous,
            None => break,
        }
    }
    warn!(%start, max_lookback, "report.exhausted");
    Err(PipelineError::NoDataAvailable {
        start,
        attempts: max_lookback,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use assert_matches::assert_matches;
    use chrono::NaiveDate;

    use super::*;

    struct Scripted {
        found_on: Option<CalendarDate>,
        calls: Mutex<Vec<CalendarDate>>,
    }

    impl DatedResourceFetcher for Scripted {
        fn fetch(&self, date: CalendarDate) -> FetchOutcome {
            self.calls.lock().unwrap().push(date);
            if Some(date) == self.found_on {
                FetchOutcome::Found(RawPayload::new("a,b\n1,2\n"))
            } else {
                FetchOutcome::NotFound
            }
        }
    }

    #[test]
    fn falls_back_across_month_boundary() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let leap_day = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let fetcher = Scripted {
            found_on: Some(leap_day),
            calls: Mutex::new(Vec::new()),
        };
        let (_, used) = resolve(&fetcher, start, 2).unwrap();
        assert_eq!(used, leap_day);
        assert_eq!(*fetcher.calls.lock().unwrap(), vec![start, leap_day]);
    }

    #[test]
    fn zero_lookback_requests_nothing() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let fetcher = Scripted {
            found_on: Some(start),
            calls: Mutex::new(Vec::new()),
        };
        let err = resolve(&fetcher, start, 0).unwrap_err();
        assert_matches!(err, PipelineError::NoDataAvailable { attempts: 0, .. });
        assert!(fetcher.calls.lock().unwrap().is_empty());
    }
}
