//! Foreground app blocker.
//!
//! A [`Monitor`] polls a [`UsageSource`] on a fixed cadence, resolves the
//! foreground app, matches it against a keyword [`Blocklist`], and fires a
//! [`CorrectiveAction`] plus one [`MonitorEvent::BlockTriggered`] per blocked
//! session.

pub mod blocklist;
pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod gate;
pub mod matcher;
pub mod models;
pub mod monitor;
pub mod platform;
pub mod resolver;
#[cfg(test)]
mod test_utils;
pub mod validation;

pub use blocklist::{Blocklist, BlocklistSnapshot, BlocklistUpdate};
pub use config::MonitorConfig;
pub use error::AppError;
pub use events::{BlockTriggered, MonitorEvent};
pub use gate::{GateDecision, GateState, TriggerGate};
pub use matcher::MatchEngine;
pub use models::{AppIdentifier, Timestamp, UsageSample};
pub use monitor::{Collaborators, Monitor};
pub use platform::{Authorization, CorrectiveAction, UsageSource};
pub use resolver::ForegroundResolver;
