// src/constants.rs

use std::time::Duration;

/// Default scheduler period (one tick per second)
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Default lookback window for foreground resolution (last 2 seconds)
pub const DEFAULT_LOOKBACK_WINDOW: Duration = Duration::from_secs(2);

/// Reserved self-marker; any app containing it is never blocked
pub const DEFAULT_SELF_ID: &str = "appwarden";

/// Maximum blocklist keyword length, in characters
pub const MAX_KEYWORD_LEN: usize = 500;

/// Events buffered per subscriber before new ones are dropped for it
pub const EVENT_QUEUE_CAPACITY: usize = 256;

/// Config file name inside the project config directory
pub const CONFIG_FILE_NAME: &str = "config.json";
