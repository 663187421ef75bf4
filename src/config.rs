use std::fs;
use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::aggregate::MarkerScale;
use crate::domain::Position;
use crate::error::CaseMapError;

pub const CONFIG_FILE_NAME: &str = "casemap.json";
pub const PLACES_KEY_ENV: &str = "CASEMAP_PLACES_API_KEY";
pub const DATE_PLACEHOLDER: &str = "{date}";
pub const DEFAULT_SOURCE_URL_TEMPLATE: &str = "https://raw.githubusercontent.com/CSSEGISandData/COVID-19/master/csse_covid_19_data/csse_covid_19_daily_reports/{date}.csv";
pub const DEFAULT_MAX_LOOKBACK: u32 = 2;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub schema_version: Option<u32>,
    #[serde(default)]
    pub source_url_template: Option<String>,
    #[serde(default)]
    pub max_lookback: Option<u32>,
    #[serde(default)]
    pub marker: Option<MarkerEntry>,
    #[serde(default)]
    pub default_center: Option<CenterEntry>,
    #[serde(default)]
    pub places_api_key: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct MarkerEntry {
    #[serde(default)]
    pub base_size: Option<u32>,
    #[serde(default)]
    pub size_per_digit: Option<u32>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CenterEntry {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub schema_version: u32,
    pub source_url_template: String,
    pub max_lookback: u32,
    pub marker: MarkerScale,
    pub default_center: Position,
    pub places_api_key: Option<String>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            schema_version: 1,
            source_url_template: DEFAULT_SOURCE_URL_TEMPLATE.to_string(),
            max_lookback: DEFAULT_MAX_LOOKBACK,
            marker: MarkerScale::default(),
            default_center: default_center(),
            places_api_key: None,
        }
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, CaseMapError> {
        let config_path = match path {
            Some(path) => Some(PathBuf::from(path)),
            None => Self::discover(),
        };

        let config = match config_path {
            Some(config_path) => {
                let content = fs::read_to_string(&config_path)
                    .map_err(|_| CaseMapError::ConfigRead(config_path.clone()))?;
                serde_json::from_str(&content)
                    .map_err(|err| CaseMapError::ConfigParse(err.to_string()))?
            }
            None => Config::default(),
        };

        let mut resolved = Self::resolve_config(config)?;
        if let Ok(key) = std::env::var(PLACES_KEY_ENV) {
            if !key.trim().is_empty() {
                resolved.places_api_key = Some(key.trim().to_string());
            }
        }
        Ok(resolved)
    }

    pub fn resolve_config(config: Config) -> Result<ResolvedConfig, CaseMapError> {
        let defaults = ResolvedConfig::default();

        let source_url_template = config
            .source_url_template
            .unwrap_or(defaults.source_url_template);
        if !source_url_template.contains(DATE_PLACEHOLDER) {
            return Err(CaseMapError::InvalidConfig(format!(
                "source_url_template must contain {DATE_PLACEHOLDER}"
            )));
        }

        let max_lookback = config.max_lookback.unwrap_or(defaults.max_lookback);
        if max_lookback == 0 {
            return Err(CaseMapError::InvalidConfig(
                "max_lookback must be at least 1".to_string(),
            ));
        }

        let marker = match config.marker {
            Some(entry) => MarkerScale {
                base_size: entry.base_size.unwrap_or(defaults.marker.base_size),
                size_per_digit: entry
                    .size_per_digit
                    .unwrap_or(defaults.marker.size_per_digit),
            },
            None => defaults.marker,
        };

        let default_center = match config.default_center {
            Some(center) => {
                if !(-90.0..=90.0).contains(&center.latitude)
                    || !(-180.0..=180.0).contains(&center.longitude)
                {
                    return Err(CaseMapError::InvalidConfig(format!(
                        "default_center out of range: {}, {}",
                        center.latitude, center.longitude
                    )));
                }
                Position {
                    latitude: center.latitude,
                    longitude: center.longitude,
                }
            }
            None => defaults.default_center,
        };

        let places_api_key = config
            .places_api_key
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        Ok(ResolvedConfig {
            schema_version: config.schema_version.unwrap_or(defaults.schema_version),
            source_url_template,
            max_lookback,
            marker,
            default_center,
            places_api_key,
        })
    }

    fn discover() -> Option<PathBuf> {
        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.exists() {
            return Some(local);
        }
        let user = ProjectDirs::from("", "", "casemap")?
            .config_dir()
            .join(CONFIG_FILE_NAME);
        user.exists().then_some(user)
    }
}

pub fn default_center() -> Position {
    Position {
        latitude: 25.0,
        longitude: 10.0,
    }
}
