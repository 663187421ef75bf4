use std::io::{self, Write};

use serde::Serialize;

use crate::domain::CalendarDate;
use crate::geocode::PlaceMatch;
use crate::pipeline::PipelineResult;
use crate::viewport::Viewport;

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Human,
    Json,
}

#[derive(Debug, Serialize)]
pub struct MapFeed<'a> {
    pub as_of_caption: Option<String>,
    pub viewport: Viewport,
    pub in_view: usize,
    #[serde(flatten)]
    pub result: &'a PipelineResult,
}

impl<'a> MapFeed<'a> {
    pub fn new(result: &'a PipelineResult, viewport: Viewport, today: CalendarDate) -> Self {
        Self {
            as_of_caption: result.as_of_caption(today),
            viewport,
            in_view: in_view(result, &viewport),
            result,
        }
    }
}

pub fn in_view(result: &PipelineResult, viewport: &Viewport) -> usize {
    result
        .points
        .iter()
        .filter(|point| viewport.contains(&point.position))
        .count()
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_feed(feed: &MapFeed<'_>) -> io::Result<()> {
        Self::print_json(feed)
    }

    pub fn print_places(places: &[PlaceMatch]) -> io::Result<()> {
        Self::print_json(&places)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const RED: &str = "\x1b[31m";
const RESET: &str = "\x1b[0m";

pub struct HumanOutput;

impl HumanOutput {
    pub fn print_feed(
        result: &PipelineResult,
        viewport: &Viewport,
        today: CalendarDate,
        top: usize,
    ) {
        println!("{CYAN}casemap run #{}{RESET}", result.run_id);
        if let Some(error) = &result.error {
            println!("{RED}error: {error}{RESET}");
            return;
        }
        let caption = result
            .as_of_caption(today)
            .unwrap_or_else(|| "as of unknown date".to_string());
        println!(
            "{GREEN}{} markers ({} in view), confirmed cases {caption}{RESET}",
            result.points.len(),
            in_view(result, viewport)
        );

        let mut ranked: Vec<_> = result.points.iter().collect();
        ranked.sort_by(|a, b| b.display_size.cmp(&a.display_size));
        for point in ranked.into_iter().take(top) {
            println!(
                "{YELLOW}  [{:>3}] {:>12}{RESET}  {}",
                point.display_size, point.badge, point.description
            );
        }
    }

    pub fn print_places(places: &[PlaceMatch]) {
        if places.is_empty() {
            println!("{YELLOW}no matching places{RESET}");
            return;
        }
        for place in places {
            println!(
                "{CYAN}{}{RESET}  ({:.4}, {:.4})",
                place.description, place.coordinates.latitude, place.coordinates.longitude
            );
        }
    }
}
