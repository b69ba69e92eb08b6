use super::AppIdentifier;
use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch.
pub type Timestamp = i64;

/// One observation from the usage source: `app_id` was last active at
/// `last_active_at`. Batches carry no ordering guarantee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageSample {
    pub app_id: AppIdentifier,
    pub last_active_at: Timestamp,
}

impl UsageSample {
    pub fn new(app_id: impl Into<AppIdentifier>, last_active_at: Timestamp) -> Self {
        Self {
            app_id: app_id.into(),
            last_active_at,
        }
    }
}

pub fn current_timestamp() -> Timestamp {
    let since_epoch = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    i64::try_from(since_epoch.as_millis()).unwrap_or(i64::MAX)
}
