use crate::models::{AppIdentifier, Timestamp, UsageSample};
use std::cmp::Ordering;
use std::time::Duration;

/// Answers "which app is in the foreground now" from a batch of usage samples.
///
/// The usage source returns unsorted, possibly overlapping summaries, so the
/// only signal used is recency: the sample with the latest `last_active_at`
/// inside `[now - lookback, now]` wins.
#[derive(Debug, Clone, Copy)]
pub struct ForegroundResolver {
    lookback: Duration,
}

impl ForegroundResolver {
    pub fn new(lookback: Duration) -> Self {
        Self { lookback }
    }

    pub fn lookback(&self) -> Duration {
        self.lookback
    }

    /// Returns `None` when no sample falls inside the window (screen off,
    /// idle). That is a valid "unknown" outcome, not an error.
    pub fn resolve(&self, samples: &[UsageSample], now: Timestamp) -> Option<AppIdentifier> {
        resolve(samples, now, self.lookback)
    }
}

pub fn resolve(samples: &[UsageSample], now: Timestamp, lookback: Duration) -> Option<AppIdentifier> {
    let lookback_ms = i64::try_from(lookback.as_millis()).unwrap_or(i64::MAX);
    let window = now.saturating_sub(lookback_ms)..=now;

    samples
        .iter()
        .filter(|sample| window.contains(&sample.last_active_at))
        .max_by(|a, b| most_recent_first(a, b))
        .map(|sample| sample.app_id.clone())
}

// Ties on timestamp go to the lexicographically smallest identifier.
fn most_recent_first(a: &UsageSample, b: &UsageSample) -> Ordering {
    a.last_active_at
        .cmp(&b.last_active_at)
        .then_with(|| b.app_id.cmp(&a.app_id))
}
