use crate::domain::CaseRecord;
use crate::parser::{RawRow, Scalar};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Latitude,
    Longitude,
    Confirmed,
    Deaths,
    Recovered,
    Region,
    Country,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::Latitude,
        Field::Longitude,
        Field::Confirmed,
        Field::Deaths,
        Field::Recovered,
        Field::Region,
        Field::Country,
    ];

    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Field::Latitude => &["Latitude", "Lat"],
            Field::Longitude => &["Longitude", "Long_"],
            Field::Confirmed => &["Confirmed"],
            Field::Deaths => &["Deaths"],
            Field::Recovered => &["Recovered"],
            Field::Region => &["Province/State", "Province_State"],
            Field::Country => &["Country/Region", "Country_Region"],
        }
    }

    pub fn lookup(self, row: &RawRow) -> Option<&Scalar> {
        self.aliases().iter().find_map(|name| row.get(name))
    }
}

pub fn to_record(row: &RawRow) -> Option<CaseRecord> {
    let latitude = coordinate(row, Field::Latitude)?;
    let longitude = coordinate(row, Field::Longitude)?;

    let confirmed = count(row, Field::Confirmed);
    let deaths = count(row, Field::Deaths);
    if confirmed.unwrap_or(0) == 0 && deaths.unwrap_or(0) == 0 {
        return None;
    }

    Some(CaseRecord {
        latitude,
        longitude,
        confirmed: confirmed.unwrap_or(0),
        deaths: deaths.unwrap_or(0),
        recovered: count(row, Field::Recovered),
        region: text(row, Field::Region),
        country: text(row, Field::Country),
    })
}

// Zero stands for "unassigned" in the upstream data.
fn coordinate(row: &RawRow, field: Field) -> Option<f64> {
    field
        .lookup(row)
        .and_then(Scalar::as_f64)
        .filter(|value| *value != 0.0)
}

fn count(row: &RawRow, field: Field) -> Option<u64> {
    field
        .lookup(row)
        .and_then(Scalar::as_f64)
        .filter(|value| *value >= 0.0)
        .map(|value| value.trunc() as u64)
}

fn text(row: &RawRow, field: Field) -> String {
    field
        .lookup(row)
        .map(|value| value.to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[(&str, Scalar)]) -> RawRow {
        cells.iter().cloned().collect()
    }

    fn num(value: f64) -> Scalar {
        Scalar::Number(value)
    }

    #[test]
    fn alias_order_prefers_first_name() {
        let row = row(&[("Latitude", num(1.0)), ("Lat", num(2.0))]);
        assert_eq!(Field::Latitude.lookup(&row), Some(&num(1.0)));
    }

    #[test]
    fn every_field_has_aliases() {
        for field in Field::ALL {
            assert!(!field.aliases().is_empty());
        }
    }

    #[test]
    fn text_coordinates_are_rejected() {
        let row = row(&[
            ("Lat", Scalar::Text("north".to_string())),
            ("Long_", num(10.0)),
            ("Confirmed", num(3.0)),
        ]);
        assert!(to_record(&row).is_none());
    }

    #[test]
    fn negative_counts_are_treated_as_absent() {
        let row = row(&[
            ("Lat", num(1.0)),
            ("Long_", num(2.0)),
            ("Confirmed", num(-4.0)),
            ("Deaths", num(1.0)),
        ]);
        let record = to_record(&row).unwrap();
        assert_eq!(record.confirmed, 0);
        assert_eq!(record.deaths, 1);
    }

    #[test]
    fn numeric_region_is_kept_as_text() {
        let row = row(&[
            ("Lat", num(1.0)),
            ("Long_", num(2.0)),
            ("Confirmed", num(4.0)),
            ("Province_State", num(12.0)),
        ]);
        let record = to_record(&row).unwrap();
        assert_eq!(record.region, "12");
        assert_eq!(record.country, "");
    }
}
