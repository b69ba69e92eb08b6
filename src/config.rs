use crate::constants::{
    CONFIG_FILE_NAME, DEFAULT_LOOKBACK_WINDOW, DEFAULT_POLL_INTERVAL, DEFAULT_SELF_ID,
};
use crate::error::AppError;
use crate::models::AppIdentifier;
use crate::validation::{validate_cadence, validate_self_id};
use directories::ProjectDirs;
use log::info;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Monitor settings, read from a JSON file. Every field has a default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub poll_interval_ms: u64,
    pub lookback_window_ms: u64,
    pub self_id: String,
    /// Keywords installed on startup.
    pub blocklist: Vec<String>,
    /// argv of the command that brings the corrective UI forward.
    pub corrective_command: Option<Vec<String>>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: duration_ms(DEFAULT_POLL_INTERVAL),
            lookback_window_ms: duration_ms(DEFAULT_LOOKBACK_WINDOW),
            self_id: DEFAULT_SELF_ID.to_string(),
            blocklist: Vec::new(),
            corrective_command: None,
        }
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl MonitorConfig {
    /// `<config_dir>/config.json` for the current user.
    pub fn default_path() -> Result<PathBuf, AppError> {
        let proj_dirs = ProjectDirs::from("com", "appwarden", "AppWarden").ok_or_else(|| {
            AppError::Platform("Could not determine project directories".into())
        })?;
        Ok(proj_dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    pub fn load(path: &Path) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Like [`MonitorConfig::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, AppError> {
        if !path.exists() {
            info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn save(&self, path: &Path) -> Result<(), AppError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), AppError> {
        validate_cadence(self.poll_interval(), self.lookback_window())?;
        validate_self_id(&self.self_id)?;
        if matches!(&self.corrective_command, Some(argv) if argv.is_empty()) {
            return Err(AppError::InvalidInput {
                field: "corrective_command",
                reason: "must name a program".into(),
            });
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn lookback_window(&self) -> Duration {
        Duration::from_millis(self.lookback_window_ms)
    }

    pub fn self_id(&self) -> AppIdentifier {
        AppIdentifier::new(self.self_id.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_match_reference_cadence() {
        let config = MonitorConfig::default();
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
        assert_eq!(config.lookback_window(), Duration::from_secs(2));
        assert_eq!(config.self_id().as_str(), "appwarden");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "blocklist": ["instagram"], "self_id": "AppWarden" }"#).unwrap();

        let config = MonitorConfig::load(&path).unwrap();

        assert_eq!(config.blocklist, vec!["instagram"]);
        assert_eq!(config.self_id().as_str(), "appwarden");
        assert_eq!(config.poll_interval_ms, 1000);
        assert!(config.corrective_command.is_none());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = MonitorConfig::load_or_default(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, MonitorConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = MonitorConfig {
            blocklist: vec!["tiktok".into()],
            corrective_command: Some(vec!["notify-send".into(), "Blocked".into()]),
            ..MonitorConfig::default()
        };

        config.save(&path).unwrap();

        assert_eq!(MonitorConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_cadence_rejected_on_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "poll_interval_ms": 5000, "lookback_window_ms": 1000 }"#).unwrap();

        assert!(matches!(
            MonitorConfig::load(&path),
            Err(AppError::InvalidInput { field: "lookback_window_ms", .. })
        ));
    }

    #[test]
    fn test_malformed_json_is_decode_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(MonitorConfig::load(&path), Err(AppError::Decode(_))));
    }

    #[test]
    fn test_empty_self_id_and_command_rejected() {
        let config = MonitorConfig { self_id: "  ".into(), ..MonitorConfig::default() };
        assert!(config.validate().is_err());

        let config = MonitorConfig { corrective_command: Some(Vec::new()), ..MonitorConfig::default() };
        assert!(config.validate().is_err());
    }
}
