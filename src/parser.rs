use std::collections::HashMap;
use std::fmt;
use std::str::Lines;

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::debug;

use crate::domain::RawPayload;

#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Number(f64),
    Text(String),
}

impl Scalar {
    pub fn coerce(raw: &str) -> Option<Self> {
        let value = raw.trim();
        if value.is_empty() {
            return None;
        }
        if looks_numeric(value) {
            if let Ok(number) = value.parse::<f64>() {
                if number.is_finite() {
                    return Some(Scalar::Number(number));
                }
            }
        }
        Some(Scalar::Text(value.to_string()))
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Number(value) => Some(*value),
            Scalar::Text(_) => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Number(value) if value.fract() == 0.0 && value.abs() < 1e15 => {
                write!(f, "{}", *value as i64)
            }
            Scalar::Number(value) => write!(f, "{value}"),
            Scalar::Text(value) => write!(f, "{value}"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    fields: HashMap<String, Scalar>,
}

impl RawRow {
    pub fn get(&self, column: &str) -> Option<&Scalar> {
        self.fields.get(column)
    }

    pub fn insert(&mut self, column: impl Into<String>, value: Scalar) {
        self.fields.insert(column.into(), value);
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Scalar)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (K, Scalar)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(column, value)| (column.into(), value))
                .collect(),
        }
    }
}

pub struct RawRows<'a> {
    headers: Vec<String>,
    lines: Lines<'a>,
    malformed: usize,
}

impl RawRows<'_> {
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn malformed(&self) -> usize {
        self.malformed
    }

    fn map_record(&self, record: &StringRecord) -> RawRow {
        let mut row = RawRow::default();
        for (column, cell) in self.headers.iter().zip(record.iter()) {
            if column.is_empty() {
                continue;
            }
            if let Some(value) = Scalar::coerce(cell) {
                row.insert(column.clone(), value);
            }
        }
        row
    }
}

impl Iterator for RawRows<'_> {
    type Item = RawRow;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = self.lines.next()?;
            match read_line(line) {
                Ok(Some(record)) => return Some(self.map_record(&record)),
                Ok(None) => continue,
                Err(err) => {
                    self.malformed += 1;
                    debug!(error = %err, "parse.malformed_line");
                    return Some(RawRow::default());
                }
            }
        }
    }
}

pub fn parse(payload: &RawPayload) -> RawRows<'_> {
    let mut lines = payload.as_str().lines();
    let mut headers = Vec::new();
    for line in lines.by_ref() {
        match read_line(line) {
            Ok(Some(record)) => {
                headers = record
                    .iter()
                    .enumerate()
                    .map(|(idx, name)| {
                        let name = if idx == 0 {
                            name.trim_start_matches('\u{feff}')
                        } else {
                            name
                        };
                        name.trim().to_string()
                    })
                    .collect();
                break;
            }
            Ok(None) => continue,
            Err(err) => {
                debug!(error = %err, "parse.header_unreadable");
                break;
            }
        }
    }
    RawRows {
        headers,
        lines,
        malformed: 0,
    }
}

// Lines are read one at a time so an unbalanced quote cannot run into the next row.
fn read_line(line: &str) -> Result<Option<StringRecord>, String> {
    if line.trim().is_empty() {
        return Ok(None);
    }
    if line.matches('"').count() % 2 != 0 {
        return Err(format!("unbalanced quote in {line:?}"));
    }
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(line.as_bytes());
    reader
        .records()
        .next()
        .transpose()
        .map_err(|err| err.to_string())
}

fn looks_numeric(value: &str) -> bool {
    let body = value.strip_prefix('-').unwrap_or(value);
    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(idx) => (&body[..idx], Some(&body[idx + 1..])),
        None => (body, None),
    };
    let mut parts = mantissa.splitn(2, '.');
    let whole = parts.next().unwrap_or("");
    let fraction = parts.next();
    let mantissa_ok = whole.chars().all(|ch| ch.is_ascii_digit())
        && fraction.is_none_or(|f| f.chars().all(|ch| ch.is_ascii_digit()))
        && (!whole.is_empty() || fraction.is_some_and(|f| !f.is_empty()));
    let exponent_ok = exponent.is_none_or(|exp| {
        let digits = exp.strip_prefix(['+', '-']).unwrap_or(exp);
        !digits.is_empty() && digits.chars().all(|ch| ch.is_ascii_digit())
    });
    mantissa_ok && exponent_ok
}
