use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::store::DEFAULT_STORAGE_KEY;

const APP_DIR: &str = "workout-planner";
pub const WEBHOOK_URL_ENV: &str = "WORKOUT_PLANNER_WEBHOOK_URL";
pub const DATA_DIR_ENV: &str = "WORKOUT_PLANNER_DATA_DIR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Where persisted state lives. Defaults to the platform data directory.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    #[serde(default)]
    pub notifier: NotifierConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotifierConfig {
    /// Outbound webhook; no events are sent when unset.
    #[serde(default)]
    pub webhook_url: Option<String>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_fail_silently")]
    pub fail_silently: bool,
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

fn default_timeout_ms() -> u64 {
    4000
}

fn default_fail_silently() -> bool {
    true
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            storage_key: default_storage_key(),
            notifier: NotifierConfig::default(),
        }
    }
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            timeout_ms: default_timeout_ms(),
            fail_silently: default_fail_silently(),
        }
    }
}

impl PlannerConfig {
    pub fn config_path() -> Result<PathBuf> {
        Ok(dirs::config_dir()
            .context("Cannot determine config directory")?
            .join(APP_DIR)
            .join("config.toml"))
    }

    /// Load config from disk and apply environment overrides.
    /// Returns default config if the file doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config at {}", path.display()))?;
            Self::from_toml(&raw)
                .with_context(|| format!("Failed to parse config at {}", path.display()))?
        } else {
            Self::default()
        };
        config.apply_overrides(
            std::env::var(WEBHOOK_URL_ENV).ok(),
            std::env::var(DATA_DIR_ENV).ok(),
        );
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Empty override values are ignored.
    pub fn apply_overrides(&mut self, webhook_url: Option<String>, data_dir: Option<String>) {
        if let Some(url) = webhook_url.filter(|url| !url.trim().is_empty()) {
            self.notifier.webhook_url = Some(url);
        }
        if let Some(dir) = data_dir.filter(|dir| !dir.trim().is_empty()) {
            self.data_dir = Some(PathBuf::from(dir));
        }
    }

    pub fn resolved_data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(dirs::data_dir()
                .context("Cannot determine data directory")?
                .join(APP_DIR)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = PlannerConfig::from_toml("").unwrap();
        assert_eq!(config, PlannerConfig::default());
        assert_eq!(config.storage_key, "workoutPlanner_v1");
        assert_eq!(config.notifier.timeout_ms, 4000);
        assert!(config.notifier.fail_silently);
    }

    #[test]
    fn parses_full_file() {
        let config = PlannerConfig::from_toml(
            r#"
data_dir = "/tmp/planner"
storage_key = "plan_v2"

[notifier]
webhook_url = "https://hooks.example.com/catch/1"
timeout_ms = 1500
fail_silently = false
"#,
        )
        .unwrap();
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/planner")));
        assert_eq!(config.storage_key, "plan_v2");
        assert_eq!(
            config.notifier.webhook_url.as_deref(),
            Some("https://hooks.example.com/catch/1")
        );
        assert_eq!(config.notifier.timeout_ms, 1500);
        assert!(!config.notifier.fail_silently);
        assert_eq!(config.resolved_data_dir().unwrap(), PathBuf::from("/tmp/planner"));
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(PlannerConfig::from_toml("storage_key = [").is_err());
    }

    #[test]
    fn overrides_replace_file_values_unless_blank() {
        let mut config = PlannerConfig::default();
        config.apply_overrides(Some("  ".to_string()), None);
        assert_eq!(config.notifier.webhook_url, None);

        config.apply_overrides(
            Some("https://hooks.example.com/x".to_string()),
            Some("/data".to_string()),
        );
        assert_eq!(
            config.notifier.webhook_url.as_deref(),
            Some("https://hooks.example.com/x")
        );
        assert_eq!(config.data_dir, Some(PathBuf::from("/data")));
    }
}
