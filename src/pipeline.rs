use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Local;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::aggregate::{MarkerScale, aggregate};
use crate::config::ResolvedConfig;
use crate::domain::{CalendarDate, MapPoint, RawPayload, as_of_caption};
use crate::error::PipelineError;
use crate::fetch::DatedResourceFetcher;
use crate::parser::parse;
use crate::resolver::resolve;
use crate::trigger::RefreshTrigger;
use crate::validate::to_record;

pub trait Clock: Send + Sync {
    fn today(&self) -> CalendarDate;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> CalendarDate {
        Local::now().date_naive()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub CalendarDate);

impl Clock for FixedClock {
    fn today(&self) -> CalendarDate {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineSettings {
    pub max_lookback: u32,
    pub marker: MarkerScale,
}

impl From<&ResolvedConfig> for PipelineSettings {
    fn from(config: &ResolvedConfig) -> Self {
        Self {
            max_lookback: config.max_lookback,
            marker: config.marker,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineResult {
    pub run_id: u64,
    pub points: Vec<MapPoint>,
    pub as_of: Option<CalendarDate>,
    pub error: Option<PipelineError>,
}

impl PipelineResult {
    fn failed(run_id: u64, error: PipelineError) -> Self {
        Self {
            run_id,
            points: Vec::new(),
            as_of: None,
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn as_of_caption(&self, today: CalendarDate) -> Option<String> {
        self.as_of.map(|as_of| as_of_caption(as_of, today))
    }
}

pub struct Pipeline<F, C = SystemClock> {
    fetcher: F,
    clock: C,
    settings: PipelineSettings,
    next_run: AtomicU64,
    latest: Mutex<Option<Arc<PipelineResult>>>,
}

impl<F: DatedResourceFetcher, C: Clock> Pipeline<F, C> {
    pub fn new(fetcher: F, clock: C, settings: PipelineSettings) -> Self {
        Self {
            fetcher,
            clock,
            settings,
            next_run: AtomicU64::new(0),
            latest: Mutex::new(None),
        }
    }

    pub fn settings(&self) -> PipelineSettings {
        self.settings
    }

    pub fn today(&self) -> CalendarDate {
        self.clock.today()
    }

    pub fn run(&self) -> Arc<PipelineResult> {
        self.run_from(self.clock.today())
    }

    pub fn run_from(&self, start: CalendarDate) -> Arc<PipelineResult> {
        let run_id = self.next_run.fetch_add(1, Ordering::SeqCst) + 1;
        info!(run_id, %start, "pipeline.start");
        let result = Arc::new(self.execute(run_id, start));
        self.publish(Arc::clone(&result));
        result
    }

    pub fn latest(&self) -> Option<Arc<PipelineResult>> {
        match self.latest.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn execute(&self, run_id: u64, start: CalendarDate) -> PipelineResult {
        let (payload, as_of) = match resolve(&self.fetcher, start, self.settings.max_lookback) {
            Ok(found) => found,
            Err(error) => return PipelineResult::failed(run_id, error),
        };
        match build_points(&payload, &self.settings.marker) {
            Some(points) => PipelineResult {
                run_id,
                points,
                as_of: Some(as_of),
                error: None,
            },
            None => {
                warn!(run_id, date = %as_of, "pipeline.malformed_payload");
                PipelineResult::failed(run_id, PipelineError::MalformedPayload { date: as_of })
            }
        }
    }

    // Runs started later replace earlier ones; a slow earlier run finishing
    // last is dropped.
    fn publish(&self, result: Arc<PipelineResult>) -> bool {
        let mut latest = match self.latest.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(current) = latest.as_ref() {
            if current.run_id > result.run_id {
                debug!(
                    run_id = result.run_id,
                    current = current.run_id,
                    "pipeline.discard_superseded"
                );
                return false;
            }
        }
        info!(
            run_id = result.run_id,
            points = result.points.len(),
            ok = result.is_ok(),
            "pipeline.publish"
        );
        *latest = Some(result);
        true
    }
}

impl<F, C> Pipeline<F, C>
where
    F: DatedResourceFetcher + 'static,
    C: Clock + 'static,
{
    pub fn subscribe<T, R>(self: &Arc<Self>, trigger: &T, on_result: R)
    where
        T: RefreshTrigger + ?Sized,
        R: Fn(Arc<PipelineResult>) + Send + Sync + 'static,
    {
        let pipeline = Arc::clone(self);
        trigger.register(Box::new(move || {
            let result = pipeline.run();
            on_result(result);
        }));
    }
}

pub fn build_points(payload: &RawPayload, scale: &MarkerScale) -> Option<Vec<MapPoint>> {
    let mut rows = parse(payload);
    let mut seen = 0usize;
    let points = aggregate(
        rows.by_ref()
            .inspect(|_| seen += 1)
            .filter_map(|row| to_record(&row)),
        scale,
    );
    debug!(
        rows = seen,
        malformed = rows.malformed(),
        admitted = points.len(),
        rejected = seen - points.len(),
        "pipeline.rows"
    );
    (seen > 0).then_some(points)
}
