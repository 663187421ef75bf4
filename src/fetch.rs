use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::debug;

use crate::config::DATE_PLACEHOLDER;
use crate::domain::{CalendarDate, RawPayload, resource_date};
use crate::error::CaseMapError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Found(RawPayload),
    NotFound,
    TransientError(String),
}

pub trait DatedResourceFetcher: Send + Sync {
    fn fetch(&self, date: CalendarDate) -> FetchOutcome;
}

#[derive(Clone)]
pub struct DailyReportHttpClient {
    client: Client,
    url_template: String,
}

impl DailyReportHttpClient {
    pub fn new(url_template: impl Into<String>) -> Result<Self, CaseMapError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("casemap/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| CaseMapError::ReportHttp(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|err| CaseMapError::ReportHttp(err.to_string()))?;
        Ok(Self {
            client,
            url_template: url_template.into(),
        })
    }

    pub fn resource_url(&self, date: CalendarDate) -> String {
        resource_url(&self.url_template, date)
    }
}

impl DatedResourceFetcher for DailyReportHttpClient {
    fn fetch(&self, date: CalendarDate) -> FetchOutcome {
        let url = self.resource_url(date);
        debug!(%url, "report.request");
        let response = match self.client.get(&url).send() {
            Ok(response) => response,
            Err(err) => return FetchOutcome::TransientError(err.to_string()),
        };
        let status = response.status();
        if !status.is_success() {
            return classify_status(status);
        }
        match response.text() {
            Ok(text) => FetchOutcome::Found(RawPayload::new(text)),
            Err(err) => FetchOutcome::TransientError(err.to_string()),
        }
    }
}

pub fn resource_url(template: &str, date: CalendarDate) -> String {
    template.replace(DATE_PLACEHOLDER, &resource_date(date))
}

fn classify_status(status: StatusCode) -> FetchOutcome {
    match status {
        StatusCode::NOT_FOUND | StatusCode::GONE => FetchOutcome::NotFound,
        other => FetchOutcome::TransientError(other.as_u16().to_string()),
    }
}
