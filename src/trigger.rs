use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, warn};

pub type RefreshCallback = Box<dyn Fn() + Send + Sync>;

pub trait RefreshTrigger {
    fn register(&self, callback: RefreshCallback);
}

#[derive(Default)]
pub struct ManualTrigger {
    callbacks: Mutex<Vec<Arc<dyn Fn() + Send + Sync>>>,
}

impl ManualTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fire(&self) -> usize {
        let callbacks = match self.callbacks.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        for callback in &callbacks {
            callback();
        }
        callbacks.len()
    }
}

impl RefreshTrigger for ManualTrigger {
    fn register(&self, callback: RefreshCallback) {
        let mut callbacks = match self.callbacks.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        callbacks.push(Arc::from(callback));
    }
}

#[derive(Default)]
struct StopSignal {
    stopped: Mutex<bool>,
    wake: Condvar,
}

pub struct IntervalTrigger {
    interval: Duration,
    signal: Arc<StopSignal>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl IntervalTrigger {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            signal: Arc::new(StopSignal::default()),
            workers: Mutex::new(Vec::new()),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn stop(&self) -> usize {
        if let Ok(mut stopped) = self.signal.stopped.lock() {
            *stopped = true;
        }
        self.signal.wake.notify_all();
        let workers = match self.workers.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        };
        let mut panicked = 0;
        for worker in workers {
            if let Err(payload) = worker.join() {
                panicked += 1;
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|text| text.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_default();
                warn!(%message, "trigger.worker_panicked");
            }
        }
        panicked
    }
}

impl RefreshTrigger for IntervalTrigger {
    fn register(&self, callback: RefreshCallback) {
        let signal = Arc::clone(&self.signal);
        let interval = self.interval;
        let worker = thread::spawn(move || {
            loop {
                let Ok(guard) = signal.stopped.lock() else {
                    break;
                };
                let Ok((guard, _)) = signal
                    .wake
                    .wait_timeout_while(guard, interval, |stopped| !*stopped)
                else {
                    break;
                };
                if *guard {
                    break;
                }
                drop(guard);
                debug!(interval_ms = interval.as_millis() as u64, "trigger.interval_fired");
                callback();
            }
        });
        if let Ok(mut workers) = self.workers.lock() {
            workers.push(worker);
        }
    }
}

impl Drop for IntervalTrigger {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}
