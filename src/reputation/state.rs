//! Reputation state and the persisted reputation book

use std::collections::HashMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::definition::{RepKey, ReputationDefinition};
use super::registry::ReputationRegistry;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReputationState {
    pub discovered: bool,
    pub value: i64,
    pub description: String,
    pub picture: Option<String>,
}

impl ReputationState {
    pub fn from_definition(definition: &ReputationDefinition) -> Self {
        Self {
            discovered: definition.discovered,
            value: definition.starting,
            description: definition.description.clone(),
            picture: definition.picture.clone(),
        }
    }
}

/// Every reputation's state plus the category names seen so far
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReputationBook {
    #[serde(with = "saved_states")]
    states: HashMap<RepKey, ReputationState>,
    /// Category names in first-seen order
    #[serde(default)]
    categories: Vec<String>,
}

impl ReputationBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add states for reputations this book has not seen yet. Existing
    /// states are left alone.
    pub fn ensure(&mut self, registry: &ReputationRegistry) {
        for definition in registry.all() {
            if !self.states.contains_key(&definition.key) {
                self.states
                    .insert(definition.key.clone(), ReputationState::from_definition(definition));
            }
            if !definition.category.is_empty() && !self.categories.contains(&definition.category) {
                self.categories.push(definition.category.clone());
            }
        }
    }

    /// Discard every state and start again from the definitions
    pub fn reinitialize(&mut self, registry: &ReputationRegistry) {
        self.states.clear();
        self.categories.clear();
        self.ensure(registry);
    }

    pub fn get(&self, key: &RepKey) -> Option<&ReputationState> {
        self.states.get(key)
    }

    pub fn get_mut(&mut self, key: &RepKey) -> Option<&mut ReputationState> {
        self.states.get_mut(key)
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

/// Saves the state map as a list of `{ key, state }` entries, since JSON
/// object keys can only be strings
mod saved_states {
    use super::*;

    #[derive(Serialize, Deserialize)]
    struct SavedState {
        key: RepKey,
        #[serde(flatten)]
        state: ReputationState,
    }

    pub fn serialize<S>(
        states: &HashMap<RepKey, ReputationState>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut entries: Vec<SavedState> = states
            .iter()
            .map(|(key, state)| SavedState {
                key: key.clone(),
                state: state.clone(),
            })
            .collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        entries.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<HashMap<RepKey, ReputationState>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let entries: Vec<SavedState> = Deserialize::deserialize(deserializer)?;
        Ok(entries.into_iter().map(|entry| (entry.key, entry.state)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReputationSettings;

    fn registry(source: &str) -> ReputationRegistry {
        let mut registry = ReputationRegistry::new();
        registry
            .load_from_str(source, "inline", &ReputationSettings::default())
            .unwrap();
        registry
    }

    #[test]
    fn test_ensure_keeps_existing_state() {
        let first = registry(
            r#"
[[reputation]]
name = "Guards"
category = "Town"
starting = 10
description = "The watch"

[[reputation]]
name = "Smiths"
category = "Town"
"#,
        );
        let mut book = ReputationBook::new();
        book.ensure(&first);
        book.get_mut(&RepKey::new("guards", "town")).unwrap().value = 99;

        let second = registry(
            r#"
[[reputation]]
name = "Guards"
category = "Town"
starting = 10

[[reputation]]
name = "Pirates"
category = "Sea"
discovered = false
"#,
        );
        book.ensure(&second);

        assert_eq!(book.len(), 3);
        assert_eq!(book.get(&RepKey::new("Guards", "Town")).unwrap().value, 99);
        assert!(!book.get(&RepKey::new("Pirates", "Sea")).unwrap().discovered);
        assert_eq!(book.categories(), &["Town".to_string(), "Sea".to_string()]);

        book.reinitialize(&second);
        assert_eq!(book.len(), 2);
        assert_eq!(book.get(&RepKey::new("Guards", "Town")).unwrap().value, 10);
    }

    #[test]
    fn test_book_round_trips_through_json() {
        let registry = registry(
            r#"
[[reputation]]
name = "Red-Hand"
category = "Guild"

[[reputation]]
name = "Red"
category = "Hand-Guild"
"#,
        );
        let mut book = ReputationBook::new();
        book.ensure(&registry);
        book.get_mut(&RepKey::new("Red", "Hand-Guild")).unwrap().value = -3;

        let json = serde_json::to_string(&book).unwrap();
        let restored: ReputationBook = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.len(), 2);
        assert_eq!(restored.get(&RepKey::new("red", "hand-guild")).unwrap().value, -3);
        assert_eq!(restored.get(&RepKey::new("Red-Hand", "Guild")).unwrap().value, 0);
    }
}
