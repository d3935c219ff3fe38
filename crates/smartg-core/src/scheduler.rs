//! Fixed-period sampling driver.
//!
//! One background thread owns the timer. Each period it locks the shared
//! monitor and runs a tick if sampling is allowed, so ticks never overlap and
//! are serialized with user actions taking the same lock. Stopping only takes
//! effect between ticks: an in-flight tick always completes. Completed ticks
//! are forwarded on a bounded channel; when nobody drains it, reports are dropped.

use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use log::{debug, info, warn};

use crate::monitor::Monitor;
use crate::state::TickReport;
use crate::store::RecordStore;

pub type SharedMonitor<S> = Arc<Mutex<Monitor<S>>>;

const REPORT_BACKLOG: usize = 16;

pub fn shared<S: RecordStore>(monitor: Monitor<S>) -> SharedMonitor<S> {
    Arc::new(Mutex::new(monitor))
}

/// Lock the monitor, recovering from a poisoned lock.
pub fn lock_monitor<S: RecordStore>(monitor: &SharedMonitor<S>) -> MutexGuard<'_, Monitor<S>> {
    monitor.lock().unwrap_or_else(|poisoned| {
        warn!("monitor lock poisoned; continuing with inner state");
        poisoned.into_inner()
    })
}

struct Runner {
    stop_tx: Sender<()>,
    handle: JoinHandle<()>,
}

pub struct SamplingScheduler<S: RecordStore + 'static> {
    monitor: SharedMonitor<S>,
    period: Duration,
    runner: Option<Runner>,
    reports_tx: Sender<TickReport>,
    reports_rx: Receiver<TickReport>,
}

impl<S: RecordStore + 'static> SamplingScheduler<S> {
    pub fn new(monitor: SharedMonitor<S>, period: Duration) -> Self {
        let (reports_tx, reports_rx) = bounded(REPORT_BACKLOG);
        Self { monitor, period, runner: None, reports_tx, reports_rx }
    }

    pub fn monitor(&self) -> &SharedMonitor<S> {
        &self.monitor
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Completed tick reports, oldest first.
    pub fn reports(&self) -> Receiver<TickReport> {
        self.reports_rx.clone()
    }

    pub fn is_running(&self) -> bool {
        self.runner.is_some()
    }

    /// Start the timer thread. No-op if already running.
    pub fn start(&mut self) {
        if self.runner.is_some() {
            return;
        }
        let (stop_tx, stop_rx) = bounded::<()>(1);
        let monitor = Arc::clone(&self.monitor);
        let reports_tx = self.reports_tx.clone();
        let period = self.period;

        let handle = thread::spawn(move || loop {
            match stop_rx.recv_timeout(period) {
                Err(RecvTimeoutError::Timeout) => {
                    let report = lock_monitor(&monitor).tick_if_enabled();
                    let Some(report) = report else {
                        continue;
                    };
                    match reports_tx.try_send(report) {
                        Ok(()) => {}
                        Err(TrySendError::Full(_)) => debug!("tick report backlog full; dropping report"),
                        Err(TrySendError::Disconnected(_)) => {}
                    }
                }
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        });

        info!("sampling scheduler started, period {:?}", self.period);
        self.runner = Some(Runner { stop_tx, handle });
    }

    /// Stop the timer thread and wait for it to exit.
    pub fn stop(&mut self) {
        let Some(runner) = self.runner.take() else {
            return;
        };
        // the thread may already be gone; join below either way
        let _ = runner.stop_tx.send(());
        if runner.handle.join().is_err() {
            warn!("sampling thread panicked");
        }
        info!("sampling scheduler stopped");
    }

    /// Flip the simulation flag and start or stop the timer to match.
    pub fn set_enabled(&mut self, enabled: bool) {
        lock_monitor(&self.monitor).set_simulation_enabled(enabled);
        if enabled {
            self.start();
        } else {
            self.stop();
        }
    }
}

impl<S: RecordStore + 'static> Drop for SamplingScheduler<S> {
    fn drop(&mut self) {
        self.stop();
    }
}
