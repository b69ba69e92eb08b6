//! `appwarden` daemon.
//!
//! Watches the foreground app and writes one JSON line to stdout per blocked
//! session. Logging goes to stderr (`RUST_LOG` sets the filter).

use appwarden_lib::{
    platform::{CommandActivator, LogActivator, NativeTracker},
    AppError, Authorization, BlockTriggered, Collaborators, CorrectiveAction, Monitor,
    MonitorConfig, MonitorEvent, UsageSource,
};
use log::{error, info, warn};
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

/// Notification line written for each trigger.
#[derive(Serialize)]
struct Notification<'a> {
    event: &'static str,
    #[serde(flatten)]
    trigger: &'a BlockTriggered,
}

fn config_path() -> Result<PathBuf, AppError> {
    match std::env::args_os().nth(1) {
        Some(path) => Ok(PathBuf::from(path)),
        None => MonitorConfig::default_path(),
    }
}

fn build_monitor(config: &MonitorConfig) -> Result<Monitor, AppError> {
    let tracker = Arc::new(NativeTracker::new()?);
    let authorization: Arc<dyn Authorization> = Arc::clone(&tracker) as Arc<dyn Authorization>;
    let source: Arc<dyn UsageSource> = tracker;

    let activator: Arc<dyn CorrectiveAction> = match config
        .corrective_command
        .as_deref()
        .and_then(CommandActivator::from_argv)
    {
        Some(command) => Arc::new(command),
        None => Arc::new(LogActivator),
    };

    Monitor::new(
        config,
        Collaborators {
            authorization,
            source,
            activator,
        },
    )
}

fn notify(out: &mut impl Write, trigger: &BlockTriggered) -> io::Result<()> {
    let notification = Notification {
        event: "blockTriggered",
        trigger,
    };
    serde_json::to_writer(&mut *out, &notification)?;
    out.write_all(b"\n")?;
    out.flush()
}

fn run() -> Result<(), AppError> {
    let path = config_path()?;
    let config = MonitorConfig::load_or_default(&path)?;

    let monitor = build_monitor(&config)?;
    let update = monitor.set_blocklist(&config.blocklist);
    if update.installed == 0 {
        warn!("Blocklist is empty; nothing will be blocked");
    }

    let events = monitor.subscribe();
    monitor.start()?;

    let stdout = io::stdout();
    for event in events {
        match event {
            MonitorEvent::BlockTriggered(trigger) => {
                notify(&mut stdout.lock(), &trigger)?;
            }
            MonitorEvent::AuthorizationRevoked => warn!("Monitoring paused: usage access revoked"),
            MonitorEvent::AuthorizationRestored => info!("Monitoring resumed"),
        }
    }

    monitor.stop();
    Ok(())
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        error!("appwarden failed ({}): {e}", e.code());
        std::process::exit(1);
    }
}
