use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::Position;
use crate::error::CaseMapError;

pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacePrediction {
    pub id: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaceMatch {
    pub id: String,
    pub description: String,
    pub coordinates: Position,
}

pub trait GeocodingClient: Send + Sync {
    fn autocomplete(&self, query: &str) -> Result<Vec<PlacePrediction>, CaseMapError>;
    fn coordinates(&self, place_id: &str) -> Result<Position, CaseMapError>;
}

pub fn lookup<G: GeocodingClient + ?Sized>(
    client: &G,
    query: &str,
) -> Result<Vec<PlaceMatch>, CaseMapError> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(Vec::new());
    }
    let mut places = Vec::new();
    for prediction in client.autocomplete(query)? {
        let coordinates = match client.coordinates(&prediction.id) {
            Ok(coordinates) => coordinates,
            Err(CaseMapError::PlaceWithoutCoordinates(id)) => {
                warn!(place_id = %id, "geocode.place_skipped");
                continue;
            }
            Err(err) => return Err(err),
        };
        places.push(PlaceMatch {
            id: prediction.id,
            description: prediction.description,
            coordinates,
        });
    }
    Ok(places)
}

#[derive(Clone)]
pub struct PlacesHttpClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl PlacesHttpClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, CaseMapError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("casemap/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| CaseMapError::PlacesHttp(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|err| CaseMapError::PlacesHttp(err.to_string()))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: "https://maps.googleapis.com/maps/api/place".to_string(),
        })
    }

    fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<T, CaseMapError> {
        let url = format!("{}/{endpoint}/json", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("key", self.api_key.as_str())])
            .query(params)
            .send()
            .map_err(|err| CaseMapError::PlacesHttp(err.to_string()))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .unwrap_or_else(|_| "places request failed".to_string());
            return Err(CaseMapError::PlacesStatus { status, message });
        }
        response
            .json()
            .map_err(|err| CaseMapError::PlacesHttp(err.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct AutocompleteResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    predictions: Vec<PredictionEntry>,
}

#[derive(Debug, Deserialize)]
struct PredictionEntry {
    place_id: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    result: Option<DetailsResult>,
}

#[derive(Debug, Deserialize)]
struct DetailsResult {
    #[serde(default)]
    geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: Option<LatLng>,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

fn check_status(status: &str, error_message: Option<String>) -> Result<(), CaseMapError> {
    match status {
        "OK" | "ZERO_RESULTS" => Ok(()),
        other => Err(CaseMapError::PlacesRejected(match error_message {
            Some(message) => format!("{other}: {message}"),
            None => other.to_string(),
        })),
    }
}

impl GeocodingClient for PlacesHttpClient {
    fn autocomplete(&self, query: &str) -> Result<Vec<PlacePrediction>, CaseMapError> {
        debug!(%query, "places.autocomplete");
        let response: AutocompleteResponse =
            self.get_json("autocomplete", &[("input", query), ("types", "(cities)")])?;
        check_status(&response.status, response.error_message)?;
        Ok(response
            .predictions
            .into_iter()
            .map(|entry| PlacePrediction {
                id: entry.place_id,
                description: entry.description,
            })
            .collect())
    }

    fn coordinates(&self, place_id: &str) -> Result<Position, CaseMapError> {
        let response: DetailsResponse = self.get_json("details", &[("place_id", place_id)])?;
        check_status(&response.status, response.error_message)?;
        location_of(response.result)
            .ok_or_else(|| CaseMapError::PlaceWithoutCoordinates(place_id.to_string()))
    }
}

fn location_of(result: Option<DetailsResult>) -> Option<Position> {
    let location = result?.geometry?.location?;
    Some(Position {
        latitude: location.lat,
        longitude: location.lng,
    })
}

#[derive(Debug)]
pub struct QueryGate {
    generation: AtomicU64,
    quiet_period: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryTicket(u64);

impl Default for QueryGate {
    fn default() -> Self {
        Self::new(DEFAULT_QUIET_PERIOD)
    }
}

impl QueryGate {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            generation: AtomicU64::new(0),
            quiet_period,
        }
    }

    pub fn begin(&self) -> QueryTicket {
        QueryTicket(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: QueryTicket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.0
    }

    pub fn debounce(&self, ticket: QueryTicket) -> bool {
        thread::sleep(self.quiet_period);
        self.is_current(ticket)
    }

    pub fn settle<T>(&self, ticket: QueryTicket, value: T) -> Option<T> {
        self.is_current(ticket).then_some(value)
    }
}
