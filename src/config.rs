//! Engine Settings
//!
//! Loaded from `config.toml` in the data directory. Every field has a default
//! so an absent file or table is valid.

use std::path::Path;
use chrono::format::{Item, StrftimeItems};
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::DefinitionError;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub quests: QuestSettings,
    pub reputation: ReputationSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QuestSettings {
    /// Clear the pin when a quest completes
    pub unpin_on_complete: bool,
    /// Clear the pin when a quest fails
    pub unpin_on_fail: bool,
    /// strftime format for completion dates
    pub date_format: String,
    pub pinned_category: Option<String>,
    pub completed_category: Option<String>,
    pub failed_category: Option<String>,
}

pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

impl QuestSettings {
    /// Replace a date format chrono cannot render with the default
    pub fn sanitize(&mut self) {
        let invalid = StrftimeItems::new(&self.date_format).any(|item| matches!(item, Item::Error));
        if invalid {
            warn!(
                "Invalid date_format '{}', using '{}'",
                self.date_format, DEFAULT_DATE_FORMAT
            );
            self.date_format = DEFAULT_DATE_FORMAT.to_string();
        }
    }
}

impl Default for QuestSettings {
    fn default() -> Self {
        Self {
            unpin_on_complete: true,
            unpin_on_fail: true,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            pinned_category: None,
            completed_category: None,
            failed_category: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReputationSettings {
    /// Name shown for reputations that are not discovered yet
    pub hidden_display_name: String,
    /// Host hook queued on a rank up (e.g. a common event id)
    pub rank_up_hook: Option<u32>,
    /// Host hook queued on a rank down
    pub rank_down_hook: Option<u32>,
    /// Move negative ranks ahead of positive ones at load time
    pub reorder_ranks: bool,
}

impl Default for ReputationSettings {
    fn default() -> Self {
        Self {
            hidden_display_name: "???".to_string(),
            rank_up_hook: None,
            rank_down_hook: None,
            reorder_ranks: true,
        }
    }
}

impl EngineConfig {
    /// Load `config.toml` from the data directory, falling back to defaults
    pub fn load_from_directory(data_dir: &Path) -> Result<Self, DefinitionError> {
        let path = data_dir.join("config.toml");

        if !path.exists() {
            info!("No config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|source| DefinitionError::Io {
            path: path.clone(),
            source,
        })?;

        Self::from_toml(&content, &path.display().to_string())
    }

    pub fn from_toml(content: &str, origin: &str) -> Result<Self, DefinitionError> {
        let mut config: Self = toml::from_str(content).map_err(|source| DefinitionError::Parse {
            origin: origin.to_string(),
            source,
        })?;
        config.quests.sanitize();
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_when_missing() {
        let temp_dir = TempDir::new().unwrap();
        let config = EngineConfig::load_from_directory(temp_dir.path()).unwrap();
        assert!(config.quests.unpin_on_complete);
        assert_eq!(config.quests.date_format, "%Y-%m-%d");
        assert_eq!(config.reputation.hidden_display_name, "???");
        assert!(config.reputation.reorder_ranks);
    }

    #[test]
    fn test_partial_config() {
        let config = EngineConfig::from_toml(
            r#"
[quests]
unpin_on_fail = false
completed_category = "Completed"

[reputation]
rank_up_hook = 12
"#,
            "inline",
        )
        .unwrap();

        assert!(config.quests.unpin_on_complete);
        assert!(!config.quests.unpin_on_fail);
        assert_eq!(config.quests.completed_category.as_deref(), Some("Completed"));
        assert_eq!(config.reputation.rank_up_hook, Some(12));
        assert_eq!(config.reputation.rank_down_hook, None);
    }

    #[test]
    fn test_invalid_date_format_falls_back() {
        let config = EngineConfig::from_toml("[quests]\ndate_format = \"%Q on %Y\"\n", "inline").unwrap();
        assert_eq!(config.quests.date_format, DEFAULT_DATE_FORMAT);

        let config = EngineConfig::from_toml("[quests]\ndate_format = \"%d.%m.%Y\"\n", "inline").unwrap();
        assert_eq!(config.quests.date_format, "%d.%m.%Y");
    }

    #[test]
    fn test_malformed_config_is_error() {
        let result = EngineConfig::from_toml("[quests\nunpin = ", "inline");
        assert!(matches!(result, Err(DefinitionError::Parse { .. })));
    }
}
