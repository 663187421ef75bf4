use std::path::PathBuf;

use chrono::NaiveDate;
use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum CaseMapError {
    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("invalid date: {0} (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("daily report request failed: {0}")]
    ReportHttp(String),

    #[error("places request failed: {0}")]
    PlacesHttp(String),

    #[error("places returned status {status}: {message}")]
    PlacesStatus { status: u16, message: String },

    #[error("places lookup rejected: {0}")]
    PlacesRejected(String),

    #[error("missing places API key (set places_api_key or CASEMAP_PLACES_API_KEY)")]
    MissingPlacesKey,

    #[error("unable to get coordinates for place {0}")]
    PlaceWithoutCoordinates(String),

    #[error("{0}")]
    Pipeline(#[from] PipelineError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PipelineError {
    #[error("no data available from {start} back over {attempts} day(s)")]
    NoDataAvailable { start: NaiveDate, attempts: u32 },

    #[error("payload for {date} produced no rows")]
    MalformedPayload { date: NaiveDate },

    #[error("transient failure fetching {date}: {detail}")]
    Transient { date: NaiveDate, detail: String },
}
