//! Quest Registry
//!
//! Loads and caches quest definitions and quest categories from TOML files.
//! A file that fails to parse is skipped; so is any single bad entry inside
//! an otherwise valid file.

use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

use super::definition::{QuestCategory, QuestDefinition, RawQuest, RawQuestCategory};
use crate::config::QuestSettings;
use crate::error::DefinitionError;
use crate::loader::{collect_toml_files, entries, parse_document, read_document};

/// Registry for all quest definitions
#[derive(Debug, Clone, Default)]
pub struct QuestRegistry {
    quests: HashMap<String, QuestDefinition>,
    /// Quest names in the order they were loaded
    order: Vec<String>,
    categories: Vec<QuestCategory>,
}

impl QuestRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load all quest files under `data_dir/quests`
    pub fn load_from_directory(&mut self, data_dir: &Path) -> Result<(), DefinitionError> {
        let quests_dir = data_dir.join("quests");
        info!("Loading quests from {:?}", quests_dir);

        if !quests_dir.exists() {
            warn!("Quest directory does not exist: {:?}", quests_dir);
            return Ok(());
        }

        for path in collect_toml_files(&quests_dir)? {
            match read_document(&path) {
                Ok(table) => self.load_table(&table, &path.display().to_string()),
                Err(e) => warn!("Skipping quest file: {}", e),
            }
        }

        info!(
            "Loaded {} quest definitions and {} categories",
            self.quests.len(),
            self.categories.len()
        );
        Ok(())
    }

    /// Load one TOML document containing `[[quest]]` and `[[category]]` arrays.
    /// Returns an error only when the document as a whole is not valid TOML.
    pub fn load_from_str(&mut self, source: &str, origin: &str) -> Result<(), DefinitionError> {
        let table = parse_document(source, origin)?;
        self.load_table(&table, origin);
        Ok(())
    }

    fn load_table(&mut self, table: &toml::Table, origin: &str) {
        for (i, value) in entries(table, "quest").enumerate() {
            let quest = value
                .clone()
                .try_into::<RawQuest>()
                .map_err(|e| DefinitionError::invalid("quest", format!("#{}", i), e.to_string()))
                .and_then(|raw| QuestDefinition::from_raw(&raw));

            match quest {
                Ok(quest) => self.insert(quest, origin),
                Err(e) => warn!("Skipping quest in {}: {}", origin, e),
            }
        }

        for (i, value) in entries(table, "category").enumerate() {
            match value.clone().try_into::<RawQuestCategory>() {
                Ok(raw) => {
                    if self.category(&raw.name).is_some() {
                        warn!("Duplicate quest category '{}' in {}, keeping the first", raw.name, origin);
                        continue;
                    }
                    self.categories.push(QuestCategory::from_raw(&raw));
                }
                Err(e) => warn!("Skipping quest category #{} in {}: {}", i, origin, e),
            }
        }
    }

    fn insert(&mut self, quest: QuestDefinition, origin: &str) {
        if self.quests.contains_key(&quest.name) {
            warn!("Duplicate quest '{}' in {}, keeping the first", quest.name, origin);
            return;
        }
        if quest.objectives.is_empty() {
            warn!("Quest '{}' has no objectives and completes as soon as it advances", quest.name);
        }
        self.order.push(quest.name.clone());
        self.quests.insert(quest.name.clone(), quest);
    }

    /// Register the pinned/completed/failed buckets named in the settings
    pub fn register_internal_categories(&mut self, settings: &QuestSettings) {
        let names = [
            settings.pinned_category.as_deref(),
            settings.completed_category.as_deref(),
            settings.failed_category.as_deref(),
        ];
        for name in names.into_iter().flatten() {
            if self.category(name).is_none() {
                self.categories.push(QuestCategory::internal(name));
            }
        }
    }

    /// Get a quest by name
    pub fn get(&self, name: &str) -> Option<&QuestDefinition> {
        self.quests.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.quests.contains_key(name)
    }

    /// Quest names in definition order
    pub fn names(&self) -> &[String] {
        &self.order
    }

    /// All quests in definition order
    pub fn all(&self) -> impl Iterator<Item = &QuestDefinition> {
        self.order.iter().filter_map(|name| self.quests.get(name))
    }

    pub fn len(&self) -> usize {
        self.quests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quests.is_empty()
    }

    pub fn category(&self, name: &str) -> Option<&QuestCategory> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn categories(&self) -> &[QuestCategory] {
        &self.categories
    }

    /// Categories of one sort, e.g. every "difficulty" category
    pub fn categories_by_kind(&self, kind: &str) -> Vec<&QuestCategory> {
        self.categories
            .iter()
            .filter(|c| c.kind.eq_ignore_ascii_case(kind))
            .collect()
    }

    pub fn by_category(&self, category: &str) -> Vec<&QuestDefinition> {
        self.all().filter(|q| q.category == category).collect()
    }

    pub fn by_difficulty(&self, difficulty: &str) -> Vec<&QuestDefinition> {
        self.all().filter(|q| q.difficulty == difficulty).collect()
    }

    pub fn by_length(&self, length: &str) -> Vec<&QuestDefinition> {
        self.all().filter(|q| q.length == length).collect()
    }

    pub fn by_location(&self, location: &str) -> Vec<&QuestDefinition> {
        self.all().filter(|q| q.location == location).collect()
    }
}
