use super::CorrectiveAction;
use crate::events::BlockTriggered;
use log::{debug, error, info};
use std::process::Command;
use std::thread;

/// Corrective action that only records the block in the log.
#[derive(Debug, Default)]
pub struct LogActivator;

impl CorrectiveAction for LogActivator {
    fn activate(&self, trigger: &BlockTriggered) {
        info!(
            "Corrective UI requested for {} (keyword {})",
            trigger.app_id, trigger.keyword
        );
    }
}

/// Spawns a configured command to bring the corrective UI forward.
///
/// The blocked app and keyword are passed as `APPWARDEN_BLOCKED_APP` and
/// `APPWARDEN_KEYWORD`. The command is not waited on by the tick.
#[derive(Debug, Clone)]
pub struct CommandActivator {
    program: String,
    args: Vec<String>,
}

impl CommandActivator {
    /// Returns `None` for an empty argv.
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl CorrectiveAction for CommandActivator {
    fn activate(&self, trigger: &BlockTriggered) {
        let spawned = Command::new(&self.program)
            .args(&self.args)
            .env("APPWARDEN_BLOCKED_APP", trigger.app_id.as_str())
            .env("APPWARDEN_KEYWORD", trigger.keyword.as_str())
            .spawn();

        match spawned {
            Ok(mut child) => {
                debug!("Spawned corrective command {} (pid {})", self.program, child.id());
                // Reap in the background so the tick never blocks on the UI.
                thread::spawn(move || {
                    if let Err(e) = child.wait() {
                        error!("Failed to wait for corrective command: {e}");
                    }
                });
            }
            Err(e) => error!("Failed to spawn corrective command {}: {e}", self.program),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AppIdentifier;

    #[test]
    fn test_from_argv_splits_program_and_args() {
        let argv = vec!["notify-send".to_string(), "Blocked".to_string()];
        let activator = CommandActivator::from_argv(&argv).unwrap();
        assert_eq!(activator.program(), "notify-send");
        assert_eq!(activator.args, vec!["Blocked"]);
    }

    #[test]
    fn test_from_argv_rejects_empty() {
        assert!(CommandActivator::from_argv(&[]).is_none());
    }

    #[test]
    fn test_missing_program_is_not_fatal() {
        let activator = CommandActivator::from_argv(&["/nonexistent/appwarden-ui".to_string()]).unwrap();
        activator.activate(&BlockTriggered {
            app_id: AppIdentifier::new("com.instagram.android"),
            keyword: AppIdentifier::new("instagram"),
            at: 0,
        });
    }
}
