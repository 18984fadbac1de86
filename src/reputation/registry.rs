//! Reputation Registry
//!
//! Loads ranks, reputations and reputation categories from TOML. Ranks from
//! every file are registered before any reputation resolves its rank list, so
//! a reputation may use ranks declared in another file.

use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

use super::definition::{
    RawRank, RawReputation, RawReputationCategory, RepKey, ReputationCategory,
    ReputationDefinition, ReputationRank,
};
use crate::config::ReputationSettings;
use crate::error::DefinitionError;
use crate::loader::{collect_toml_files, entries, parse_document, read_document};

#[derive(Debug, Clone, Default)]
pub struct ReputationRegistry {
    ranks: HashMap<String, ReputationRank>,
    reputations: HashMap<RepKey, ReputationDefinition>,
    /// Reputation keys in the order they were loaded
    order: Vec<RepKey>,
    categories: Vec<ReputationCategory>,
}

impl ReputationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load all reputation files under `data_dir/reputations`
    pub fn load_from_directory(
        &mut self,
        data_dir: &Path,
        settings: &ReputationSettings,
    ) -> Result<(), DefinitionError> {
        let reputations_dir = data_dir.join("reputations");
        info!("Loading reputations from {:?}", reputations_dir);

        if !reputations_dir.exists() {
            warn!("Reputation directory does not exist: {:?}", reputations_dir);
            return Ok(());
        }

        let mut documents = Vec::new();
        for path in collect_toml_files(&reputations_dir)? {
            match read_document(&path) {
                Ok(table) => documents.push((path.display().to_string(), table)),
                Err(e) => warn!("Skipping reputation file: {}", e),
            }
        }

        self.load_documents(&documents, settings);
        info!(
            "Loaded {} reputation ranks, {} reputations and {} categories",
            self.ranks.len(),
            self.reputations.len(),
            self.categories.len()
        );
        Ok(())
    }

    /// Load a single TOML document with `[[rank]]`, `[[reputation]]` and
    /// `[[category]]` arrays
    pub fn load_from_str(
        &mut self,
        source: &str,
        origin: &str,
        settings: &ReputationSettings,
    ) -> Result<(), DefinitionError> {
        let table = parse_document(source, origin)?;
        self.load_documents(&[(origin.to_string(), table)], settings);
        Ok(())
    }

    fn load_documents(&mut self, documents: &[(String, toml::Table)], settings: &ReputationSettings) {
        for (origin, table) in documents {
            for (i, value) in entries(table, "rank").enumerate() {
                match value.clone().try_into::<RawRank>() {
                    Ok(raw) => self.insert_rank(ReputationRank::from_raw(&raw), origin),
                    Err(e) => warn!("Skipping reputation rank #{} in {}: {}", i, origin, e),
                }
            }
        }

        for (origin, table) in documents {
            for (i, value) in entries(table, "reputation").enumerate() {
                match value.clone().try_into::<RawReputation>() {
                    Ok(raw) => self.insert_reputation(&raw, origin, settings),
                    Err(e) => warn!("Skipping reputation #{} in {}: {}", i, origin, e),
                }
            }
        }

        for (origin, table) in documents {
            for (i, value) in entries(table, "category").enumerate() {
                match value.clone().try_into::<RawReputationCategory>() {
                    Ok(raw) => {
                        let category = ReputationCategory::from_raw(&raw);
                        if self.category(&category.id).is_some() {
                            warn!("Duplicate reputation category '{}' in {}, keeping the first", category.id, origin);
                            continue;
                        }
                        self.categories.push(category);
                    }
                    Err(e) => warn!("Skipping reputation category #{} in {}: {}", i, origin, e),
                }
            }
        }
    }

    fn insert_rank(&mut self, rank: ReputationRank, origin: &str) {
        if self.ranks.contains_key(&rank.id) {
            warn!("Duplicate reputation rank '{}' in {}, keeping the first", rank.id, origin);
            return;
        }
        self.ranks.insert(rank.id.clone(), rank);
    }

    fn insert_reputation(&mut self, raw: &RawReputation, origin: &str, settings: &ReputationSettings) {
        if raw.name.trim().is_empty() {
            warn!("Skipping reputation with an empty name in {}", origin);
            return;
        }

        let mut ranks = Vec::with_capacity(raw.ranks.len());
        for id in &raw.ranks {
            match self.ranks.get(&id.to_lowercase()) {
                Some(rank) => ranks.push(rank.clone()),
                None => warn!(
                    "Reputation '{}' references unknown rank '{}', check the rank ids in {}",
                    raw.name, id, origin
                ),
            }
        }

        let mut reputation = ReputationDefinition::from_raw(raw, ranks);
        if self.reputations.contains_key(&reputation.key) {
            warn!("Duplicate reputation '{}' in {}, keeping the first", reputation.key, origin);
            return;
        }

        if reputation.starting < 0 && !reputation.allow_negative {
            warn!(
                "Reputation '{}' starts at {} but does not allow negative values, starting at 0",
                reputation.key, reputation.starting
            );
            reputation.starting = 0;
        }

        if let Some(index) = reputation.misordered_rank() {
            if settings.reorder_ranks {
                warn!(
                    "Reputation '{}' lists negative rank '{}' after a positive rank, moving negative ranks first",
                    reputation.key, reputation.ranks[index].id
                );
                reputation.reorder_ranks();
            } else {
                warn!(
                    "Reputation '{}' lists negative rank '{}' after a positive rank, rank banding will be off",
                    reputation.key, reputation.ranks[index].id
                );
            }
        }

        self.order.push(reputation.key.clone());
        self.reputations.insert(reputation.key.clone(), reputation);
    }

    pub fn get(&self, name: &str, category: &str) -> Option<&ReputationDefinition> {
        self.reputations.get(&RepKey::new(name, category))
    }

    pub fn get_by_key(&self, key: &RepKey) -> Option<&ReputationDefinition> {
        self.reputations.get(key)
    }

    pub fn rank(&self, id: &str) -> Option<&ReputationRank> {
        self.ranks.get(&id.to_lowercase())
    }

    pub fn category(&self, id: &str) -> Option<&ReputationCategory> {
        let id = id.to_lowercase();
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn categories(&self) -> &[ReputationCategory] {
        &self.categories
    }

    /// All reputations in definition order
    pub fn all(&self) -> impl Iterator<Item = &ReputationDefinition> {
        self.order.iter().filter_map(|key| self.reputations.get(key))
    }

    pub fn len(&self) -> usize {
        self.reputations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reputations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_ranks_resolve_across_files() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("reputations");
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("a_factions.toml"),
            r#"
[[reputation]]
name = "Guards"
category = "Town"
ranks = ["Hostile", "neutral", "FRIENDLY", "missing"]

[[category]]
id = "Town"
display_name = "Town Folk"
"#,
        )
        .unwrap();
        fs::write(
            dir.join("b_ranks.toml"),
            r#"
[[rank]]
id = "hostile"
threshold = -100

[[rank]]
id = "Neutral"
threshold = 100

[[rank]]
id = "friendly"
name = "Friendly"
threshold = 300
"#,
        )
        .unwrap();
        fs::write(dir.join("broken.toml"), "[[rank]\n").unwrap();

        let mut registry = ReputationRegistry::new();
        registry
            .load_from_directory(temp_dir.path(), &ReputationSettings::default())
            .unwrap();

        let guards = registry.get("guards", "TOWN").unwrap();
        let ids: Vec<&str> = guards.ranks.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["hostile", "neutral", "friendly"]);
        assert_eq!(registry.rank("FRIENDLY").unwrap().name, "Friendly");
        assert_eq!(registry.category("town").unwrap().display_name, "Town Folk");
        assert!(registry.get("guards", "port").is_none());
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let mut registry = ReputationRegistry::new();
        registry
            .load_from_directory(temp_dir.path(), &ReputationSettings::default())
            .unwrap();
        assert!(registry.is_empty());
    }

    const MISORDERED: &str = r#"
[[rank]]
id = "neutral"
threshold = 100

[[rank]]
id = "hated"
threshold = -100

[[reputation]]
name = "Thieves"
category = "Guild"
starting = -20
ranks = ["neutral", "hated"]

[[reputation]]
name = "thieves"
category = "guild"
starting = 50

[[reputation]]
category = "no name"
"#;

    #[test]
    fn test_reorders_ranks_and_clamps_start() {
        let mut registry = ReputationRegistry::new();
        registry
            .load_from_str(MISORDERED, "inline", &ReputationSettings::default())
            .unwrap();

        assert_eq!(registry.len(), 1);
        let thieves = registry.get("Thieves", "Guild").unwrap();
        assert_eq!(thieves.starting, 0);
        assert_eq!(thieves.ranks[0].id, "hated");
    }

    #[test]
    fn test_keeps_order_when_reordering_disabled() {
        let settings = ReputationSettings {
            reorder_ranks: false,
            ..ReputationSettings::default()
        };
        let mut registry = ReputationRegistry::new();
        registry.load_from_str(MISORDERED, "inline", &settings).unwrap();

        let thieves = registry.get("Thieves", "Guild").unwrap();
        assert_eq!(thieves.ranks[0].id, "neutral");
        assert_eq!(thieves.misordered_rank(), Some(1));
    }

    #[test]
    fn test_hyphenated_names_do_not_collide() {
        let mut registry = ReputationRegistry::new();
        registry
            .load_from_str(
                r#"
[[reputation]]
name = "Red-Hand"
category = "Guild"
starting = 5

[[reputation]]
name = "Red"
category = "Hand-Guild"
starting = 7
"#,
                "inline",
                &ReputationSettings::default(),
            )
            .unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("Red", "Hand-Guild").unwrap().name, "Red");
        assert_eq!(registry.get("red-hand", "guild").unwrap().starting, 5);
    }
}
