use casemap::parser::{RawRow, Scalar};
use casemap::validate::{Field, to_record};

fn num(value: f64) -> Scalar {
    Scalar::Number(value)
}

fn text(value: &str) -> Scalar {
    Scalar::Text(value.to_string())
}

#[test]
fn missing_coordinates_reject_regardless_of_metrics() {
    let row: RawRow = [("Confirmed", num(100.0)), ("Deaths", num(5.0))]
        .into_iter()
        .collect();
    assert!(to_record(&row).is_none());
}

#[test]
fn one_missing_coordinate_rejects() {
    let row: RawRow = [("Lat", num(10.0)), ("Confirmed", num(100.0))]
        .into_iter()
        .collect();
    assert!(to_record(&row).is_none());
}

#[test]
fn recovered_alone_is_not_admissible() {
    let row: RawRow = [
        ("Latitude", num(10.0)),
        ("Longitude", num(20.0)),
        ("Confirmed", num(0.0)),
        ("Deaths", num(0.0)),
        ("Recovered", num(50.0)),
    ]
    .into_iter()
    .collect();
    assert!(to_record(&row).is_none());
}

#[test]
fn deaths_without_confirmed_are_admissible() {
    let row: RawRow = [("Lat", num(10.0)), ("Long_", num(20.0)), ("Deaths", num(3.0))]
        .into_iter()
        .collect();
    let record = to_record(&row).unwrap();
    assert_eq!(record.confirmed, 0);
    assert_eq!(record.deaths, 3);
    assert_eq!(record.recovered, None);
}

#[test]
fn older_and_newer_column_names_give_the_same_record() {
    let old: RawRow = [
        ("Province/State", text("Hubei")),
        ("Country/Region", text("China")),
        ("Latitude", num(30.9756)),
        ("Longitude", num(112.2707)),
        ("Confirmed", num(67794.0)),
        ("Deaths", num(3085.0)),
        ("Recovered", num(54288.0)),
    ]
    .into_iter()
    .collect();
    let new: RawRow = [
        ("Province_State", text("Hubei")),
        ("Country_Region", text("China")),
        ("Lat", num(30.9756)),
        ("Long_", num(112.2707)),
        ("Confirmed", num(67794.0)),
        ("Deaths", num(3085.0)),
        ("Recovered", num(54288.0)),
    ]
    .into_iter()
    .collect();

    let record = to_record(&old).unwrap();
    assert_eq!(Some(record.clone()), to_record(&new));
    assert_eq!(record.region, "Hubei");
    assert_eq!(record.country, "China");
    assert_eq!(record.recovered, Some(54288));
}

#[test]
fn absent_names_default_to_empty() {
    let row: RawRow = [("Lat", num(1.5)), ("Long_", num(2.5)), ("Confirmed", num(1.0))]
        .into_iter()
        .collect();
    let record = to_record(&row).unwrap();
    assert_eq!(record.region, "");
    assert_eq!(record.country, "");
}

#[test]
fn alias_table_is_declarative() {
    assert_eq!(Field::Longitude.aliases(), &["Longitude", "Long_"]);
    assert_eq!(Field::Region.aliases(), &["Province/State", "Province_State"]);
    assert_eq!(Field::Country.aliases(), &["Country/Region", "Country_Region"]);
}
