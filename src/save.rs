//! Save data
//!
//! The keyed table a host save container stores alongside its own data.

use std::path::Path;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::SaveError;
use crate::quest::{QuestBook, QuestEngine};
use crate::reputation::{ReputationBook, ReputationEngine};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SaveData {
    #[serde(default)]
    pub quests: QuestBook,
    #[serde(default)]
    pub reputations: ReputationBook,
}

impl SaveData {
    pub fn capture(quests: &QuestEngine, reputations: &ReputationEngine) -> Self {
        Self {
            quests: quests.book().clone(),
            reputations: reputations.book().clone(),
        }
    }

    /// Hand the saved books to the engines, which add any newly defined entries
    pub fn restore_into(self, quests: &mut QuestEngine, reputations: &mut ReputationEngine) {
        quests.restore(self.quests);
        reputations.restore(self.reputations);
    }

    pub fn to_json(&self) -> Result<String, SaveError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SaveError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn write_to(&self, path: &Path) -> Result<(), SaveError> {
        std::fs::write(path, self.to_json()?)?;
        info!("Wrote save data to {:?}", path);
        Ok(())
    }

    pub fn read_from(path: &Path) -> Result<Self, SaveError> {
        let json = std::fs::read_to_string(path)?;
        let data = Self::from_json(&json)?;
        info!(
            "Read save data from {:?} ({} quests, {} reputations)",
            path,
            data.quests.len(),
            data.reputations.len()
        );
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{QuestSettings, ReputationSettings};
    use crate::host::MemoryHost;
    use crate::mode::ChangeMode;
    use crate::quest::{QuestRegistry, QuestStatus};
    use crate::reputation::ReputationRegistry;
    use tempfile::TempDir;

    fn engines() -> (QuestEngine, ReputationEngine) {
        let mut quests = QuestRegistry::new();
        quests
            .load_from_str(
                r#"
[[quest]]
name = "Errand"

[[quest.objectives]]
id = "coins"
auto_track = "gold"
amount = 100

[[quest.objectives]]
id = "talk"
"#,
                "test",
            )
            .unwrap();

        let settings = ReputationSettings::default();
        let mut reputations = ReputationRegistry::new();
        reputations
            .load_from_str(
                "[[reputation]]\nname = \"Guards\"\ncategory = \"Town\"\nallow_negative = true\n",
                "test",
                &settings,
            )
            .unwrap();

        (
            QuestEngine::new(quests, QuestSettings::default()),
            ReputationEngine::new(reputations, settings),
        )
    }

    #[test]
    fn test_save_and_restore_through_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("save.json");
        let mut host = MemoryHost::new();

        let (mut quests, mut reputations) = engines();
        quests.start(&mut host, "Errand", true, true);
        quests.set_objective_progress(&mut host, "Errand", "talk", ChangeMode::Set, 1);
        quests.toggle_pin("Errand");
        reputations.change_rep(&host, "Guards", "Town", ChangeMode::Subtract, 15);
        SaveData::capture(&quests, &reputations).write_to(&path).unwrap();

        let (mut quests, mut reputations) = engines();
        SaveData::read_from(&path)
            .unwrap()
            .restore_into(&mut quests, &mut reputations);

        assert_eq!(quests.status("Errand"), Some(QuestStatus::Started));
        assert!(quests.quest("Errand").unwrap().pinned);
        assert!(quests.quest("Errand").unwrap().is_objective_complete("talk"));
        assert_eq!(reputations.rep_amount("guards", "town"), Some(-15));

        // Auto-tracking comes back with the restored book
        quests.gain_gold(&mut host, 100);
        assert_eq!(quests.status("Errand"), Some(QuestStatus::Completed));
    }

    #[test]
    fn test_missing_sections_default() {
        let data = SaveData::from_json("{}").unwrap();
        assert!(data.quests.is_empty());
        assert!(data.reputations.is_empty());
        assert!(matches!(SaveData::from_json("not json"), Err(SaveError::Json(_))));
    }
}
