//! Host scheduler binding and the std-thread fallback driver.
//!
//! The engine needs two recurring tasks: the privileged-thread terrain
//! service and the dispatcher tick.  A host with its own loop (a game
//! server's task scheduler) implements [`HostScheduler`] and lets [`bind`]
//! register both; everything else uses [`TickDriver`], a plain thread that
//! plays both roles itself.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use trek_core::TaskId;
use trek_terrain::TerrainOracle;

use crate::dispatcher::Dispatcher;

// ── HostScheduler ─────────────────────────────────────────────────────────────

/// The host's task scheduler, as the engine needs to see it.
///
/// Implementations decide which thread runs a task; the engine's contract
/// is only that tasks registered through [`bind`]'s `service` slot run on
/// the privileged thread (the one allowed to read raw terrain), while tick
/// tasks may run anywhere.
pub trait HostScheduler: Send + Sync {
    /// Run `task` every `period` until canceled.
    fn schedule_repeating(&self, period: Duration, task: Box<dyn FnMut() + Send>) -> TaskId;

    /// Run `task` once after `delay`.
    fn schedule_once(&self, delay: Duration, task: Box<dyn FnOnce() + Send>) -> TaskId;

    /// Cancel a scheduled task.  `false` if the id is unknown or already
    /// finished.
    fn cancel(&self, task: TaskId) -> bool;
}

/// The two recurring engine tasks registered by [`bind`].
#[derive(Copy, Clone, Debug)]
pub struct EngineTasks {
    /// The terrain service.  Runs on the privileged thread.
    pub service: TaskId,
    /// The dispatcher tick.
    pub tick: TaskId,
}

impl EngineTasks {
    /// Cancel both tasks, shutting the engine's scheduling down.
    pub fn cancel(self, host: &dyn HostScheduler) {
        host.cancel(self.service);
        host.cancel(self.tick);
    }
}

/// Register the engine's recurring tasks with the host's scheduler.
///
/// The oracle moves into the service task, which the host must schedule on
/// its privileged thread — ownership is the enforcement: after `bind`,
/// nothing but that task can reach raw terrain.  The tick task locks the
/// dispatcher only for the duration of one tick.
pub fn bind(
    host: &dyn HostScheduler,
    dispatcher: Arc<Mutex<Dispatcher>>,
    oracle: Box<dyn TerrainOracle + Send>,
    period: Duration,
    chunks_per_service: usize,
) -> EngineTasks {
    let store = Arc::clone(dispatcher.lock().unwrap().context().store());

    let service = host.schedule_repeating(
        period,
        Box::new(move || {
            store.service(oracle.as_ref(), chunks_per_service);
        }),
    );
    let tick = host.schedule_repeating(
        period,
        Box::new(move || {
            dispatcher.lock().unwrap().tick();
        }),
    );
    EngineTasks { service, tick }
}

// ── TickDriver ────────────────────────────────────────────────────────────────

/// A self-contained driver thread for hosts without their own loop.
///
/// The driver's thread is both execution contexts at once: it services
/// terrain production (it is the only holder of the oracle, so it *is* the
/// privileged thread) and runs the dispatcher tick, then parks out the
/// rest of the period.  Dropping the driver signals the thread and joins
/// it.
pub struct TickDriver {
    stop: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl TickDriver {
    pub fn spawn(
        dispatcher: Arc<Mutex<Dispatcher>>,
        oracle: Box<dyn TerrainOracle + Send>,
        period: Duration,
        chunks_per_service: usize,
    ) -> std::io::Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);

        let worker = thread::Builder::new()
            .name("trek-tick-driver".into())
            .spawn(move || {
                let store = Arc::clone(dispatcher.lock().unwrap().context().store());
                while !flag.load(Ordering::Acquire) {
                    let started = Instant::now();
                    store.service(oracle.as_ref(), chunks_per_service);
                    dispatcher.lock().unwrap().tick();
                    if let Some(rest) = period.checked_sub(started.elapsed()) {
                        thread::park_timeout(rest);
                    }
                }
            })?;

        Ok(Self {
            stop,
            worker: Some(worker),
        })
    }

    /// Signal the driver thread and join it.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(worker) = self.worker.take() {
            worker.thread().unpark();
            let _ = worker.join();
        }
    }
}

impl Drop for TickDriver {
    fn drop(&mut self) {
        self.shutdown();
    }
}
