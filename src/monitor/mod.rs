//! Polling scheduler and session lifecycle.
//!
//! A started monitor owns one worker thread that ticks immediately and then
//! once per poll interval. Ticks run strictly one after another on that
//! thread, so the trigger gate never sees concurrent updates. `stop()` joins
//! the worker: once it returns, no further tick runs and the gate is idle.

mod authorization;
mod pipeline;

pub use authorization::{AuthorizationChange, AuthorizationWatch};
pub use pipeline::Pipeline;

use crate::blocklist::{Blocklist, BlocklistSnapshot, BlocklistUpdate};
use crate::config::MonitorConfig;
use crate::error::AppError;
use crate::events::{BlockTriggered, EventBus, MonitorEvent};
use crate::gate::{GateDecision, GateState, TriggerGate};
use crate::matcher::MatchEngine;
use crate::models::current_timestamp;
use crate::platform::{Authorization, CorrectiveAction, UsageSource};
use crate::resolver::ForegroundResolver;
use crate::validation::decode_blocklist;
use log::{debug, error, info, warn};
use serde_json::Value;
use std::cell::RefCell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// The external collaborators a monitor consults on every tick.
#[derive(Clone)]
pub struct Collaborators {
    pub authorization: Arc<dyn Authorization>,
    pub source: Arc<dyn UsageSource>,
    pub activator: Arc<dyn CorrectiveAction>,
}

/// State shared between the caller-facing [`Monitor`] and its worker thread.
struct Shared {
    poll_interval: Duration,
    pipeline: Pipeline,
    blocklist: Blocklist,
    collaborators: Collaborators,
    events: EventBus,
    gate: Mutex<TriggerGate>,
    running: AtomicBool,
}

/// A started session: its worker thread plus the means to cancel it.
struct MonitorSession {
    active: Arc<AtomicBool>,
    wake: Sender<()>,
    handle: JoinHandle<()>,
}

/// Marks the thread a monitor worker runs on.
struct WorkerMarker {
    owner: Weak<Shared>,
    active: Arc<AtomicBool>,
}

thread_local! {
    static WORKER: RefCell<Option<WorkerMarker>> = const { RefCell::new(None) };
}

/// Lock a mutex, recovering from poisoning if necessary
fn safe_lock<'a, T>(mutex: &'a Mutex<T>, context: &str) -> MutexGuard<'a, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn!("{context} mutex was poisoned, recovering");
            poisoned.into_inner()
        }
    }
}

pub struct Monitor {
    shared: Arc<Shared>,
    session: Mutex<Option<MonitorSession>>,
}

impl Monitor {
    pub fn new(config: &MonitorConfig, collaborators: Collaborators) -> Result<Self, AppError> {
        config.validate()?;

        let pipeline = Pipeline::new(
            ForegroundResolver::new(config.lookback_window()),
            MatchEngine::new(config.self_id()),
        );

        Ok(Self {
            shared: Arc::new(Shared {
                poll_interval: config.poll_interval(),
                pipeline,
                blocklist: Blocklist::new(),
                collaborators,
                events: EventBus::new(),
                gate: Mutex::new(TriggerGate::new()),
                running: AtomicBool::new(false),
            }),
            session: Mutex::new(None),
        })
    }

    /// Replace the blocklist. Takes effect from the next tick; a tick in
    /// flight keeps the snapshot it already took.
    pub fn set_blocklist<I, S>(&self, keywords: I) -> BlocklistUpdate
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.shared.blocklist.replace(keywords)
    }

    /// Decode a JSON blocklist payload and install it.
    ///
    /// A payload of the wrong shape leaves the current blocklist untouched.
    pub fn set_blocklist_json(&self, payload: &Value) -> Result<BlocklistUpdate, AppError> {
        let batch = decode_blocklist(payload)?;
        let mut update = self.shared.blocklist.replace(&batch.keywords);
        update.malformed = batch.malformed;
        Ok(update)
    }

    pub fn blocklist(&self) -> BlocklistSnapshot {
        self.shared.blocklist.snapshot()
    }

    pub fn subscribe(&self) -> Receiver<MonitorEvent> {
        self.shared.events.subscribe()
    }

    pub fn check_authorization(&self) -> bool {
        self.shared.collaborators.authorization.has_usage_authorization()
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }

    pub fn gate_state(&self) -> GateState {
        self.shared.lock_gate().state().clone()
    }

    /// Start monitoring. A no-op if already running.
    pub fn start(&self) -> Result<(), AppError> {
        if let Some(active) = self.worker_session_on_current_thread() {
            // Restarted from inside a tick: the worker keeps going.
            if active.load(Ordering::SeqCst) {
                return Ok(());
            }
            if !self.check_authorization() {
                warn!("Permission missing! Grant usage access.");
                return Err(AppError::PermissionMissing);
            }
            active.store(true, Ordering::SeqCst);
            self.shared.running.store(true, Ordering::SeqCst);
            info!("Blocker restarted from monitor thread");
            return Ok(());
        }

        let mut slot = safe_lock(&self.session, "Monitor session");

        if let Some(session) = slot.as_ref() {
            if session.active.load(Ordering::SeqCst) && !session.handle.is_finished() {
                debug!("Monitor already running");
                return Ok(());
            }
        }
        // A session that stopped itself from inside a tick is reaped here.
        if let Some(stale) = slot.take() {
            stale.shutdown();
        }

        if !self.check_authorization() {
            warn!("Permission missing! Grant usage access.");
            return Err(AppError::PermissionMissing);
        }

        self.shared.lock_gate().reset();

        let active = Arc::new(AtomicBool::new(true));
        let (wake, wakeup) = mpsc::channel();
        let shared = Arc::clone(&self.shared);
        let worker_active = Arc::clone(&active);
        // Set before spawning so a worker that stops itself leaves it false.
        self.shared.running.store(true, Ordering::SeqCst);
        let spawned = thread::Builder::new()
            .name("appwarden-monitor".into())
            .spawn(move || run_worker(&shared, &worker_active, &wakeup));
        let handle = match spawned {
            Ok(handle) => handle,
            Err(e) => {
                self.shared.running.store(false, Ordering::SeqCst);
                error!("Failed to spawn monitor thread: {e}");
                return Err(AppError::Io(e));
            }
        };

        *slot = Some(MonitorSession { active, wake, handle });

        info!(
            "Blocker started (poll every {} ms, lookback {} ms)",
            self.shared.poll_interval.as_millis(),
            self.shared.pipeline.lookback().as_millis()
        );
        Ok(())
    }

    /// Stop monitoring and reset the trigger gate. A no-op if stopped.
    ///
    /// Blocks until an in-flight tick finishes, unless called from the
    /// monitor's own thread (e.g. inside a corrective action), in which case
    /// the current tick is the last one.
    pub fn stop(&self) {
        if let Some(active) = self.worker_session_on_current_thread() {
            active.store(false, Ordering::SeqCst);
            self.shared.running.store(false, Ordering::SeqCst);
            self.shared.lock_gate().reset();
            info!("Blocker stopped from monitor thread");
            return;
        }

        let mut slot = safe_lock(&self.session, "Monitor session");
        let Some(session) = slot.take() else {
            return;
        };
        let was_active = session.active.load(Ordering::SeqCst);
        session.shutdown();

        self.shared.running.store(false, Ordering::SeqCst);
        self.shared.lock_gate().reset();

        if was_active {
            info!("Blocker stopped");
        }
    }

    fn worker_session_on_current_thread(&self) -> Option<Arc<AtomicBool>> {
        let owner = Arc::downgrade(&self.shared);
        WORKER.with(|marker| {
            marker
                .borrow()
                .as_ref()
                .filter(|m| Weak::ptr_eq(&m.owner, &owner))
                .map(|m| Arc::clone(&m.active))
        })
    }
}

impl Drop for Monitor {
    fn drop(&mut self) {
        self.stop();
    }
}

impl MonitorSession {
    /// Cancel and join the worker.
    fn shutdown(self) {
        let MonitorSession { active, wake, handle } = self;
        active.store(false, Ordering::SeqCst);
        // Disconnecting the channel interrupts the worker's wait.
        drop(wake);
        if handle.join().is_err() {
            error!("Monitor worker panicked");
        }
    }
}

impl Shared {
    fn lock_gate(&self) -> MutexGuard<'_, TriggerGate> {
        safe_lock(&self.gate, "Trigger gate")
    }

    fn publish(&self, event: MonitorEvent) {
        self.events.publish(&event);
    }

    fn tick(&self, watch: &mut AuthorizationWatch) {
        let granted = self.collaborators.authorization.has_usage_authorization();
        match watch.update(granted) {
            Some(AuthorizationChange::Revoked) => {
                warn!("Usage authorization revoked; skipping ticks until restored");
                self.publish(MonitorEvent::AuthorizationRevoked);
            }
            Some(AuthorizationChange::Restored) => {
                info!("Usage authorization restored; resuming");
                self.publish(MonitorEvent::AuthorizationRestored);
            }
            None => {}
        }
        if !granted {
            return;
        }

        let samples = self
            .collaborators
            .source
            .query_recent_usage(self.pipeline.lookback());
        let now = current_timestamp();
        let blocklist = self.blocklist.snapshot();

        let decision = {
            let mut gate = self.lock_gate();
            self.pipeline.evaluate(&mut gate, &samples, &blocklist, now)
        };

        match decision {
            GateDecision::Fire { app_id, keyword } => {
                info!("Blocking {app_id} matched keyword {keyword}");
                let trigger = BlockTriggered { app_id, keyword, at: now };
                self.collaborators.activator.activate(&trigger);
                self.publish(MonitorEvent::BlockTriggered(trigger));
            }
            GateDecision::Cleared => debug!("Blocked app left the foreground"),
            GateDecision::Suppressed | GateDecision::Unchanged => {}
        }
    }
}

/// Clears the worker's session state when its loop ends, including by panic.
struct WorkerExit<'a> {
    shared: &'a Shared,
    active: &'a AtomicBool,
}

impl Drop for WorkerExit<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            error!("Monitor worker died; blocker is no longer running");
        }
        self.active.store(false, Ordering::SeqCst);
        self.shared.running.store(false, Ordering::SeqCst);
        WORKER.with(|marker| *marker.borrow_mut() = None);
    }
}

fn run_worker(shared: &Arc<Shared>, active: &Arc<AtomicBool>, wakeup: &Receiver<()>) {
    WORKER.with(|marker| {
        *marker.borrow_mut() = Some(WorkerMarker {
            owner: Arc::downgrade(shared),
            active: Arc::clone(active),
        });
    });
    let _exit = WorkerExit { shared, active };

    let mut watch = AuthorizationWatch::default();
    let mut next_tick = Instant::now();

    loop {
        let wait = next_tick.saturating_duration_since(Instant::now());
        match wakeup.recv_timeout(wait) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
        if !active.load(Ordering::SeqCst) {
            break;
        }

        shared.tick(&mut watch);

        // Fixed rate; a slow tick skips the slots it overran instead of bursting.
        next_tick += shared.poll_interval;
        let now = Instant::now();
        if next_tick < now {
            next_tick = now;
        }
    }

    debug!("Monitor worker exiting");
}
