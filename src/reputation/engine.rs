//! Reputation Engine
//!
//! Applies reputation changes, reports rank crossings and answers the queries
//! a reputation screen needs (rank, gauge, display name, category lists).

use tracing::{debug, warn};

use super::banding::{self, Band};
use super::definition::{RepKey, ReputationCategory, ReputationDefinition, ReputationRank};
use super::events::{RankChange, RankDirection, RankNotice};
use super::registry::ReputationRegistry;
use super::state::{ReputationBook, ReputationState};
use crate::config::ReputationSettings;
use crate::host::{Actors, Variables};
use crate::mode::ChangeMode;

pub struct ReputationEngine {
    registry: ReputationRegistry,
    settings: ReputationSettings,
    book: ReputationBook,
    notices: Vec<RankNotice>,
}

impl ReputationEngine {
    pub fn new(registry: ReputationRegistry, settings: ReputationSettings) -> Self {
        let mut book = ReputationBook::new();
        book.ensure(&registry);

        Self {
            registry,
            settings,
            book,
            notices: Vec::new(),
        }
    }

    /// Reset every reputation to its configured starting state
    pub fn reinitialize(&mut self) {
        self.book.reinitialize(&self.registry);
        self.notices.clear();
    }

    /// Adopt a saved book, adding states for reputations defined since
    pub fn restore(&mut self, book: ReputationBook) {
        self.book = book;
        self.book.ensure(&self.registry);
        debug!("Restored {} reputation states", self.book.len());
    }

    pub fn registry(&self) -> &ReputationRegistry {
        &self.registry
    }

    pub fn book(&self) -> &ReputationBook {
        &self.book
    }

    pub fn into_book(self) -> ReputationBook {
        self.book
    }

    fn entry(&self, op: &str, name: &str, category: &str) -> Option<(&ReputationDefinition, &ReputationState)> {
        let key = RepKey::new(name, category);
        let found = self
            .registry
            .get_by_key(&key)
            .zip(self.book.get(&key));
        if found.is_none() {
            warn!("{}: unknown reputation '{}'", op, key);
        }
        found
    }

    fn state_mut(&mut self, op: &str, name: &str, category: &str) -> Option<&mut ReputationState> {
        let key = RepKey::new(name, category);
        if self.registry.get_by_key(&key).is_none() {
            warn!("{}: unknown reputation '{}'", op, key);
            return None;
        }
        self.book.get_mut(&key)
    }

    pub fn discover(&mut self, name: &str, category: &str, discovered: bool) -> bool {
        match self.state_mut("discover", name, category) {
            Some(state) => {
                state.discovered = discovered;
                true
            }
            None => false,
        }
    }

    /// Apply a change and report a rank crossing, if any. Values are clamped
    /// to zero when the reputation does not allow negatives.
    pub fn change_rep<A: Actors>(
        &mut self,
        actors: &A,
        name: &str,
        category: &str,
        mode: ChangeMode,
        amount: i64,
    ) -> Option<RankChange> {
        let key = RepKey::new(name, category);
        let Some(definition) = self.registry.get_by_key(&key) else {
            warn!("change_rep: unknown reputation '{}'", key);
            return None;
        };
        let state = self.book.get_mut(&key)?;

        let before = banding::rank_index(&definition.ranks, state.value);
        let mut value = mode.apply(state.value, amount);
        if value < 0 && !definition.allow_negative {
            value = 0;
        }
        state.value = value;
        let after = banding::rank_index(&definition.ranks, value);
        debug!("Reputation '{}' {} {} -> {}", key, mode, amount, value);

        if before == after {
            return None;
        }

        let direction = if after > before {
            RankDirection::Up
        } else {
            RankDirection::Down
        };
        let hook = match direction {
            RankDirection::Up => self.settings.rank_up_hook,
            RankDirection::Down => self.settings.rank_down_hook,
        };
        let notice = RankNotice {
            direction,
            key: key.clone(),
            rank_id: definition.ranks.get(after).map(|r| r.id.clone()),
            display_name: display_name_of(definition, state, actors, &self.settings),
            hook,
        };
        debug!("Reputation '{}' ranked {} to {:?}", key, direction.as_str(), notice.rank_id);
        self.notices.push(notice);

        Some(RankChange {
            direction,
            from_index: before,
            to_index: after,
        })
    }

    pub fn rep_amount(&self, name: &str, category: &str) -> Option<i64> {
        self.entry("rep_amount", name, category).map(|(_, state)| state.value)
    }

    /// Write the current amount into a host variable
    pub fn rep_to_variable(
        &self,
        variables: &mut impl Variables,
        name: &str,
        category: &str,
        variable: u32,
    ) -> bool {
        match self.rep_amount(name, category) {
            Some(value) => {
                variables.set_variable(variable, value);
                true
            }
            None => false,
        }
    }

    pub fn rank(&self, name: &str, category: &str) -> Option<&ReputationRank> {
        let (definition, state) = self.entry("rank", name, category)?;
        definition
            .ranks
            .get(banding::rank_index(&definition.ranks, state.value))
    }

    pub fn rank_id(&self, name: &str, category: &str) -> Option<&str> {
        self.rank(name, category).map(|r| r.id.as_str())
    }

    /// Gauge fill as numerator and denominator
    pub fn gauge(&self, name: &str, category: &str) -> Option<(i64, i64)> {
        let (definition, state) = self.entry("gauge", name, category)?;
        let Band {
            numerator,
            denominator,
            ..
        } = banding::band(&definition.ranks, state.value, definition.max_rep);
        Some((numerator, denominator))
    }

    pub fn display_name<A: Actors>(&self, actors: &A, name: &str, category: &str) -> Option<String> {
        let (definition, state) = self.entry("display_name", name, category)?;
        Some(display_name_of(definition, state, actors, &self.settings))
    }

    pub fn set_description(&mut self, name: &str, category: &str, description: &str) -> bool {
        match self.state_mut("set_description", name, category) {
            Some(state) => {
                state.description = description.to_string();
                true
            }
            None => false,
        }
    }

    pub fn set_picture(&mut self, name: &str, category: &str, picture: Option<&str>) -> bool {
        match self.state_mut("set_picture", name, category) {
            Some(state) => {
                state.picture = picture.map(str::to_string);
                true
            }
            None => false,
        }
    }

    /// Category names in first-seen order
    pub fn categories(&self) -> &[String] {
        self.book.categories()
    }

    pub fn category_info(&self, id: &str) -> Option<&ReputationCategory> {
        self.registry.category(id)
    }

    /// Every reputation with its state, in definition order
    pub fn all(&self) -> Vec<(&ReputationDefinition, &ReputationState)> {
        self.registry
            .all()
            .filter_map(|definition| self.book.get(&definition.key).map(|state| (definition, state)))
            .collect()
    }

    /// Reputations whose category matches, ignoring case
    pub fn by_category(&self, category: &str) -> Vec<(&ReputationDefinition, &ReputationState)> {
        let category = category.to_lowercase();
        self.all()
            .into_iter()
            .filter(|(definition, _)| definition.category.to_lowercase() == category)
            .collect()
    }

    pub fn take_notices(&mut self) -> Vec<RankNotice> {
        std::mem::take(&mut self.notices)
    }
}

fn display_name_of<A: Actors>(
    definition: &ReputationDefinition,
    state: &ReputationState,
    actors: &A,
    settings: &ReputationSettings,
) -> String {
    if !state.discovered {
        return settings.hidden_display_name.clone();
    }
    definition
        .actor_id
        .and_then(|id| actors.actor_name(id))
        .unwrap_or_else(|| definition.name.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryHost;
    use proptest::prelude::*;

    const REPUTATIONS: &str = r#"
[[rank]]
id = "hated"
threshold = -200

[[rank]]
id = "disliked"
threshold = -50

[[rank]]
id = "neutral"
threshold = 100

[[rank]]
id = "liked"
threshold = 300

[[reputation]]
name = "Guards"
category = "Town"
ranks = ["hated", "disliked", "neutral", "liked"]
allow_negative = true

[[reputation]]
name = "Smiths"
category = "Town"
ranks = ["neutral", "liked"]

[[reputation]]
name = "Reid"
category = "Party"
actor_id = 1
discovered = false
max_rep = 50

[[category]]
id = "Town"
display_name = "Town Folk"
"#;

    fn engine() -> ReputationEngine {
        let settings = ReputationSettings {
            rank_up_hook: Some(7),
            ..ReputationSettings::default()
        };
        let mut registry = ReputationRegistry::new();
        registry.load_from_str(REPUTATIONS, "test", &settings).unwrap();
        ReputationEngine::new(registry, settings)
    }

    #[test]
    fn test_rank_up_and_down_notices() {
        let mut engine = engine();
        let host = MemoryHost::new();

        assert_eq!(engine.change_rep(&host, "Guards", "Town", ChangeMode::Add, 50), None);
        assert_eq!(engine.rank_id("guards", "town"), Some("neutral"));

        let change = engine
            .change_rep(&host, "Guards", "Town", ChangeMode::Add, 60)
            .unwrap();
        assert_eq!(change.direction, RankDirection::Up);
        assert_eq!((change.from_index, change.to_index), (2, 3));
        assert_eq!(engine.gauge("Guards", "Town"), Some((10, 300)));

        let change = engine
            .change_rep(&host, "Guards", "Town", ChangeMode::Set, -60)
            .unwrap();
        assert_eq!(change.direction, RankDirection::Down);
        assert_eq!(engine.rank_id("Guards", "Town"), Some("hated"));

        let notices = engine.take_notices();
        assert_eq!(notices.len(), 2);
        assert_eq!(notices[0].rank_id.as_deref(), Some("liked"));
        assert_eq!(notices[0].hook, Some(7));
        assert_eq!(notices[0].display_name, "Guards");
        assert_eq!(notices[1].hook, None);
        assert!(engine.take_notices().is_empty());
    }

    #[test]
    fn test_display_name_hidden_then_actor() {
        let mut engine = engine();
        let host = MemoryHost::new().with_member(1, "Reid the Bold");

        assert_eq!(engine.display_name(&host, "Reid", "Party").as_deref(), Some("???"));
        engine.discover("Reid", "Party", true);
        assert_eq!(
            engine.display_name(&host, "Reid", "Party").as_deref(),
            Some("Reid the Bold")
        );
        assert_eq!(
            engine.display_name(&MemoryHost::new(), "Reid", "Party").as_deref(),
            Some("Reid")
        );
    }

    #[test]
    fn test_gauge_without_ranks_uses_max_rep() {
        let mut engine = engine();
        let host = MemoryHost::new();
        engine.change_rep(&host, "Reid", "Party", ChangeMode::Add, 20);
        assert_eq!(engine.gauge("Reid", "Party"), Some((20, 50)));
        assert_eq!(engine.rank_id("Reid", "Party"), None);
    }

    #[test]
    fn test_categories_and_filters() {
        let mut engine = engine();
        assert_eq!(engine.categories(), &["Town".to_string(), "Party".to_string()]);
        assert_eq!(engine.by_category("TOWN").len(), 2);
        assert_eq!(engine.category_info("town").unwrap().display_name, "Town Folk");

        assert!(engine.set_description("Smiths", "Town", "Forge masters"));
        assert!(engine.set_picture("Smiths", "Town", Some("smith.png")));
        let (_, smiths) = engine.by_category("town")[1];
        assert_eq!(smiths.description, "Forge masters");
        assert_eq!(smiths.picture.as_deref(), Some("smith.png"));

        let mut host = MemoryHost::new();
        engine.change_rep(&host, "Smiths", "Town", ChangeMode::Add, 42);
        assert!(engine.rep_to_variable(&mut host, "Smiths", "Town", 3));
        assert_eq!(host.variables.get(&3), Some(&42));

        engine.reinitialize();
        assert_eq!(engine.rep_amount("Smiths", "Town"), Some(0));
        assert_eq!(engine.all()[1].1.description, "");
    }

    #[test]
    fn test_unknown_reputation_is_not_found() {
        let mut engine = engine();
        let host = MemoryHost::new();
        assert_eq!(engine.rep_amount("Nobody", "Town"), None);
        assert_eq!(engine.rank("Guards", "Nowhere"), None);
        assert_eq!(engine.change_rep(&host, "Nobody", "Town", ChangeMode::Add, 5), None);
        assert!(!engine.discover("Nobody", "Town", true));
        assert!(engine.take_notices().is_empty());
    }

    fn mode_strategy() -> impl Strategy<Value = ChangeMode> {
        prop_oneof![
            Just(ChangeMode::Add),
            Just(ChangeMode::Subtract),
            Just(ChangeMode::Set)
        ]
    }

    proptest! {
        #[test]
        fn prop_add_then_subtract_round_trips(start in -1000i64..1000, amount in 0i64..1000) {
            let mut engine = engine();
            let host = MemoryHost::new();
            engine.change_rep(&host, "Guards", "Town", ChangeMode::Set, start);
            engine.change_rep(&host, "Guards", "Town", ChangeMode::Add, amount);
            engine.change_rep(&host, "Guards", "Town", ChangeMode::Subtract, amount);
            prop_assert_eq!(engine.rep_amount("Guards", "Town"), Some(start));
        }

        #[test]
        fn prop_negative_disallowed_stays_non_negative(
            changes in prop::collection::vec((mode_strategy(), -500i64..500), 0..30)
        ) {
            let mut engine = engine();
            let host = MemoryHost::new();
            for (mode, amount) in changes {
                engine.change_rep(&host, "Smiths", "Town", mode, amount);
                prop_assert!(engine.rep_amount("Smiths", "Town").unwrap() >= 0);
            }
        }
    }
}
