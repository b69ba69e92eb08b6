use crate::events::BlockTriggered;
use crate::models::UsageSample;
use std::time::Duration;

/// Capability query: may we read which app is in the foreground?
pub trait Authorization: Send + Sync {
    fn has_usage_authorization(&self) -> bool;
}

/// Source of recent usage observations.
///
/// Called once per tick from the monitor's worker thread. Implementations
/// should return promptly; a slow query delays only the current tick.
pub trait UsageSource: Send + Sync {
    fn query_recent_usage(&self, window: Duration) -> Vec<UsageSample>;
}

/// Brings the corrective UI to the foreground. Fire and forget: failures are
/// the implementation's to log.
pub trait CorrectiveAction: Send + Sync {
    fn activate(&self, trigger: &BlockTriggered);
}
