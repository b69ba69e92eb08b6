//! Shared test fakes for the monitor's collaborators.
//!
//! This module provides scripted stand-ins for the usage source, the
//! authorization query and the corrective action.

#![cfg(test)]

use crate::events::BlockTriggered;
use crate::models::{current_timestamp, UsageSample};
use crate::platform::{Authorization, CorrectiveAction, UsageSource};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

/// Usage source that replays one frame per query.
///
/// `Some(app)` reports `app` as active right now (plus a stale launcher
/// sample); `None` reports nothing. Once the script runs out every query
/// reports nothing.
#[derive(Default)]
pub struct ScriptedSource {
    frames: Mutex<VecDeque<Option<String>>>,
    queries: AtomicUsize,
}

impl ScriptedSource {
    pub fn new(frames: &[Option<&str>]) -> Self {
        Self {
            frames: Mutex::new(frames.iter().map(|f| f.map(str::to_string)).collect()),
            queries: AtomicUsize::new(0),
        }
    }

    pub fn push(&self, frames: &[Option<&str>]) {
        self.frames
            .lock()
            .unwrap()
            .extend(frames.iter().map(|f| f.map(str::to_string)));
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

impl UsageSource for ScriptedSource {
    fn query_recent_usage(&self, _window: Duration) -> Vec<UsageSample> {
        let frame = self.frames.lock().unwrap().pop_front().flatten();
        self.queries.fetch_add(1, Ordering::SeqCst);

        let now = current_timestamp();
        match frame {
            Some(app) => vec![
                UsageSample::new("com.android.launcher", now - 60_000),
                UsageSample::new(app.as_str(), now),
            ],
            None => Vec::new(),
        }
    }
}

/// Authorization that can be flipped mid-test; counts how often it was asked.
pub struct ToggleAuthorization {
    granted: AtomicBool,
    checks: AtomicUsize,
}

impl ToggleAuthorization {
    pub fn new(granted: bool) -> Self {
        Self {
            granted: AtomicBool::new(granted),
            checks: AtomicUsize::new(0),
        }
    }

    pub fn set(&self, granted: bool) {
        self.granted.store(granted, Ordering::SeqCst);
    }

    pub fn checks(&self) -> usize {
        self.checks.load(Ordering::SeqCst)
    }
}

impl Authorization for ToggleAuthorization {
    fn has_usage_authorization(&self) -> bool {
        self.checks.fetch_add(1, Ordering::SeqCst);
        self.granted.load(Ordering::SeqCst)
    }
}

/// Corrective action that records every activation.
#[derive(Default)]
pub struct RecordingActivator {
    activations: Mutex<Vec<BlockTriggered>>,
}

impl RecordingActivator {
    pub fn activations(&self) -> Vec<BlockTriggered> {
        self.activations.lock().unwrap().clone()
    }
}

impl CorrectiveAction for RecordingActivator {
    fn activate(&self, trigger: &BlockTriggered) {
        self.activations.lock().unwrap().push(trigger.clone());
    }
}

/// Poll `condition` until it holds or `timeout` passes.
pub fn wait_until(timeout: Duration, condition: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    condition()
}
