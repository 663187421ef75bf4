use serde::Serialize;

use crate::domain::Position;

const WORLD_SPAN: Span = Span {
    latitude_delta: 92.2,
    longitude_delta: 42.1,
};
const CITY_SPAN: Span = Span {
    latitude_delta: 0.922,
    longitude_delta: 0.421,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Span {
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub center_lat: f64,
    pub center_lon: f64,
    pub zoomed_out: bool,
}

impl Viewport {
    pub fn world(center: Position) -> Self {
        Self {
            center_lat: center.latitude,
            center_lon: center.longitude,
            zoomed_out: true,
        }
    }

    pub fn focus(target: Position, fallback: Position) -> Self {
        let center_lat = if target.latitude != 0.0 {
            target.latitude
        } else {
            fallback.latitude
        };
        let center_lon = if target.longitude != 0.0 {
            target.longitude
        } else {
            fallback.longitude
        };
        Self {
            center_lat,
            center_lon,
            zoomed_out: false,
        }
    }

    pub fn span(&self) -> Span {
        if self.zoomed_out { WORLD_SPAN } else { CITY_SPAN }
    }

    pub fn contains(&self, position: &Position) -> bool {
        let span = self.span();
        let lat_ok = (position.latitude - self.center_lat).abs() <= span.latitude_delta / 2.0;
        let mut lon_offset = (position.longitude - self.center_lon).abs() % 360.0;
        if lon_offset > 180.0 {
            lon_offset = 360.0 - lon_offset;
        }
        lat_ok && lon_offset <= span.longitude_delta / 2.0
    }
}
