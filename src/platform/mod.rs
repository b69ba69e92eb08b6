pub mod activator;
pub mod types;

pub use activator::{CommandActivator, LogActivator};
pub use types::{Authorization, CorrectiveAction, UsageSource};

#[cfg(target_os = "linux")]
pub mod linux;

#[cfg(target_os = "linux")]
pub use linux::LinuxTracker as NativeTracker;

#[cfg(not(target_os = "linux"))]
mod unsupported {
    use super::{Authorization, UsageSource};
    use crate::error::AppError;
    use crate::models::UsageSample;
    use std::time::Duration;

    /// Fallback for targets without a foreground-app backend: never
    /// authorized, never reports samples.
    pub struct UnsupportedTracker;

    impl UnsupportedTracker {
        pub fn new() -> Result<Self, AppError> {
            Ok(Self)
        }
    }

    impl Authorization for UnsupportedTracker {
        fn has_usage_authorization(&self) -> bool {
            false
        }
    }

    impl UsageSource for UnsupportedTracker {
        fn query_recent_usage(&self, _window: Duration) -> Vec<UsageSample> {
            Vec::new()
        }
    }
}

#[cfg(not(target_os = "linux"))]
pub use unsupported::UnsupportedTracker as NativeTracker;
