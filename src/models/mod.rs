pub mod app_id;
pub mod usage;

pub use app_id::AppIdentifier;
pub use usage::{current_timestamp, Timestamp, UsageSample};
