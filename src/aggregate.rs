use num_format::{Locale, ToFormattedString};
use serde::{Deserialize, Serialize};

use crate::domain::{CaseRecord, MapPoint, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerScale {
    pub base_size: u32,
    pub size_per_digit: u32,
}

impl Default for MarkerScale {
    fn default() -> Self {
        Self {
            base_size: 10,
            size_per_digit: 10,
        }
    }
}

impl MarkerScale {
    pub fn size_for(&self, confirmed: u64) -> u32 {
        self.base_size
            .saturating_add(self.size_per_digit.saturating_mul(digit_count(confirmed)))
    }
}

pub fn aggregate<I>(records: I, scale: &MarkerScale) -> Vec<MapPoint>
where
    I: IntoIterator<Item = CaseRecord>,
{
    records
        .into_iter()
        .map(|record| to_point(record, scale))
        .collect()
}

pub fn to_point(record: CaseRecord, scale: &MarkerScale) -> MapPoint {
    let badge = with_separators(record.confirmed);
    let description = format!(
        "{badge} cases and {} deaths in {}.",
        with_separators(record.deaths),
        place_name(&record.region, &record.country)
    );
    MapPoint {
        position: Position {
            latitude: record.latitude,
            longitude: record.longitude,
        },
        display_size: scale.size_for(record.confirmed),
        label: record.region,
        description,
        badge,
    }
}

pub fn with_separators(value: u64) -> String {
    value.to_formatted_string(&Locale::en)
}

pub fn digit_count(value: u64) -> u32 {
    value.checked_ilog10().map_or(1, |log| log + 1)
}

fn place_name(region: &str, country: &str) -> String {
    match (region.is_empty(), country.is_empty()) {
        (false, false) => format!("{region}, {country}"),
        (false, true) => region.to_string(),
        (true, false) => country.to_string(),
        (true, true) => "an unnamed location".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(confirmed: u64, region: &str, country: &str) -> CaseRecord {
        CaseRecord {
            latitude: 30.97,
            longitude: 112.27,
            confirmed,
            deaths: 2,
            recovered: None,
            region: region.to_string(),
            country: country.to_string(),
        }
    }

    #[test]
    fn digit_count_handles_zero_and_powers_of_ten() {
        assert_eq!(digit_count(0), 1);
        assert_eq!(digit_count(9), 1);
        assert_eq!(digit_count(10), 2);
        assert_eq!(digit_count(999_999), 6);
        assert_eq!(digit_count(u64::MAX), 20);
    }

    #[test]
    fn description_names_region_and_country() {
        let point = to_point(record(1500, "Hubei", "China"), &MarkerScale::default());
        assert_eq!(point.label, "Hubei");
        assert_eq!(point.description, "1,500 cases and 2 deaths in Hubei, China.");
        assert_eq!(point.badge, "1,500");
    }

    #[test]
    fn description_skips_missing_region() {
        let point = to_point(record(3, "", "Italy"), &MarkerScale::default());
        assert_eq!(point.label, "");
        assert_eq!(point.description, "3 cases and 2 deaths in Italy.");
    }

    #[test]
    fn custom_scale_is_applied() {
        let scale = MarkerScale {
            base_size: 4,
            size_per_digit: 6,
        };
        assert_eq!(scale.size_for(12_345), 34);
    }
}
