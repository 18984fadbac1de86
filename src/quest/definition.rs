//! Quest Definition Structures
//!
//! These structures are deserialized from TOML quest files. Raw entries are
//! resolved one at a time so a single bad objective or reward never takes the
//! rest of its quest down with it.

use std::collections::HashSet;
use serde::Deserialize;
use tracing::warn;

use crate::error::DefinitionError;
use crate::host::{ItemKind, ItemRef, Switches};

/// Raw quest data as it appears in TOML
#[derive(Debug, Clone, Deserialize)]
pub struct RawQuest {
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub difficulty: String,
    #[serde(default)]
    pub length: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub quest_giver: String,
    #[serde(default)]
    pub recommended_level: i32,
    /// One description per stage
    #[serde(default)]
    pub descriptions: Vec<String>,
    #[serde(default)]
    pub unstarted_description: String,
    #[serde(default)]
    pub unstarted_objective: String,
    #[serde(default)]
    pub board_description: String,
    #[serde(default)]
    pub board_switch: u32,
    #[serde(default)]
    pub start_switch: u32,
    /// Kept untyped so each objective can be resolved on its own
    #[serde(default)]
    pub objectives: Vec<toml::Value>,
    #[serde(default)]
    pub rewards: Option<RawReward>,
}

/// Raw objective as it appears in TOML
#[derive(Debug, Clone, Deserialize)]
pub struct RawObjective {
    pub id: String,
    #[serde(default = "default_stage")]
    pub stage: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_max_progress")]
    pub max_progress: i64,
    /// "gold", "variable", "item", "weapon" or "armor"; absent for manual objectives
    pub auto_track: Option<String>,
    pub variable: Option<u32>,
    pub item_id: Option<u32>,
    /// Threshold for automatic objectives, falls back to `max_progress`
    pub amount: Option<i64>,
    #[serde(default)]
    pub complete_switch: u32,
}

fn default_stage() -> i64 {
    1
}

fn default_max_progress() -> i64 {
    1
}

/// Raw reward as it appears in TOML
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawReward {
    #[serde(default)]
    pub exp: i64,
    #[serde(default)]
    pub gold: i64,
    #[serde(default)]
    pub items: Vec<toml::Value>,
    #[serde(default)]
    pub custom: Vec<String>,
}

/// Item reward entry
#[derive(Debug, Clone, Deserialize)]
pub struct RawItemReward {
    #[serde(default = "default_item_kind")]
    pub kind: String,
    pub id: u32,
    #[serde(default = "default_amount")]
    pub amount: i64,
}

fn default_item_kind() -> String {
    "item".to_string()
}

fn default_amount() -> i64 {
    1
}

/// Raw quest category as it appears in TOML
#[derive(Debug, Clone, Deserialize)]
pub struct RawQuestCategory {
    pub name: String,
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: String,
    /// Which sort the category belongs to (category, difficulty, length, location)
    #[serde(default = "default_category_kind", rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub icon: u32,
    #[serde(default)]
    pub text_color: u32,
    #[serde(default)]
    pub start_expanded: bool,
}

fn default_category_kind() -> String {
    "category".to_string()
}

// ============================================================================
// Resolved Quest Structures (after parsing)
// ============================================================================

/// How an objective's progress is driven
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectiveKind {
    /// Progress set explicitly by game logic
    Manual { max_progress: i64 },
    /// Party gold at or above the threshold
    Gold { threshold: i64 },
    /// A game variable at or above the threshold
    Variable { variable: u32, threshold: i64 },
    /// Owned count of an item, weapon or armor at or above the threshold
    Item { item: ItemRef, threshold: i64 },
}

impl ObjectiveKind {
    pub fn max_progress(&self) -> i64 {
        match *self {
            ObjectiveKind::Manual { max_progress } => max_progress,
            ObjectiveKind::Gold { threshold }
            | ObjectiveKind::Variable { threshold, .. }
            | ObjectiveKind::Item { threshold, .. } => threshold,
        }
    }
}

/// A resolved quest objective
#[derive(Debug, Clone)]
pub struct Objective {
    pub id: String,
    /// Stage the objective belongs to, starting at 1
    pub stage: u32,
    pub description: String,
    pub kind: ObjectiveKind,
    /// Switch turned on when the objective completes
    pub complete_switch: Option<u32>,
}

impl Objective {
    pub fn from_raw(raw: &RawObjective) -> Result<Self, String> {
        if raw.id.trim().is_empty() {
            return Err("objective has an empty id".to_string());
        }
        if raw.stage < 1 || raw.stage > u32::MAX as i64 {
            return Err(format!("stage {} is out of range", raw.stage));
        }

        let threshold = raw.amount.unwrap_or(raw.max_progress);

        let kind = match raw.auto_track.as_deref().map(str::to_lowercase) {
            None => ObjectiveKind::Manual {
                max_progress: raw.max_progress,
            },
            Some(track) if track == "gold" => ObjectiveKind::Gold { threshold },
            Some(track) if track == "variable" => {
                let variable = raw
                    .variable
                    .filter(|v| *v > 0)
                    .ok_or_else(|| "variable tracking needs a variable id".to_string())?;
                ObjectiveKind::Variable { variable, threshold }
            }
            Some(track) => {
                let kind = ItemKind::from_str(&track)
                    .ok_or_else(|| format!("unknown tracking type '{}'", track))?;
                let id = raw
                    .item_id
                    .filter(|id| *id > 0)
                    .ok_or_else(|| format!("{} tracking needs an item_id", kind.as_str()))?;
                ObjectiveKind::Item {
                    item: ItemRef::new(kind, id),
                    threshold,
                }
            }
        };

        if kind.max_progress() < 1 {
            return Err(format!(
                "objective needs a positive target, got {}",
                kind.max_progress()
            ));
        }

        Ok(Self {
            id: raw.id.clone(),
            stage: raw.stage as u32,
            description: raw.description.clone(),
            kind,
            complete_switch: (raw.complete_switch > 0).then_some(raw.complete_switch),
        })
    }

    pub fn max_progress(&self) -> i64 {
        self.kind.max_progress()
    }
}

/// Item reward entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemReward {
    pub item: ItemRef,
    pub amount: i64,
}

/// Quest rewards
#[derive(Debug, Clone, Default)]
pub struct Reward {
    pub exp: i64,
    pub gold: i64,
    pub items: Vec<ItemReward>,
    /// Free-form rewards the host acts on itself
    pub custom: Vec<String>,
}

impl Reward {
    pub fn from_raw(quest_name: &str, raw: &RawReward) -> Self {
        let mut items = Vec::new();
        for (i, value) in raw.items.iter().enumerate() {
            let parsed = value
                .clone()
                .try_into::<RawItemReward>()
                .map_err(|e| e.to_string())
                .and_then(|r| {
                    ItemKind::from_str(&r.kind)
                        .map(|kind| ItemReward {
                            item: ItemRef::new(kind, r.id),
                            amount: r.amount,
                        })
                        .ok_or_else(|| format!("unknown item kind '{}'", r.kind))
                });
            match parsed {
                Ok(reward) => items.push(reward),
                Err(e) => warn!(
                    "Skipping item reward {} for quest '{}': {}",
                    i, quest_name, e
                ),
            }
        }

        Self {
            exp: raw.exp,
            gold: raw.gold,
            items,
            custom: raw.custom.clone(),
        }
    }

    pub fn has_rewards(&self) -> bool {
        self.exp != 0 || self.gold != 0 || !self.items.is_empty() || !self.custom.is_empty()
    }
}

/// A quest category used to group quests in a list
#[derive(Debug, Clone)]
pub struct QuestCategory {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub kind: String,
    pub icon: u32,
    pub text_color: u32,
    pub start_expanded: bool,
    /// Pinned/completed/failed buckets created from settings
    pub internal: bool,
}

impl QuestCategory {
    pub fn from_raw(raw: &RawQuestCategory) -> Self {
        Self {
            name: raw.name.clone(),
            display_name: raw.display_name.clone().unwrap_or_else(|| raw.name.clone()),
            description: raw.description.clone(),
            kind: raw.kind.clone(),
            icon: raw.icon,
            text_color: raw.text_color,
            start_expanded: raw.start_expanded,
            internal: false,
        }
    }

    pub fn internal(name: &str) -> Self {
        Self {
            name: name.to_string(),
            display_name: name.to_string(),
            description: String::new(),
            kind: "internal".to_string(),
            icon: 0,
            text_color: 0,
            start_expanded: true,
            internal: true,
        }
    }
}

/// A fully resolved quest definition
#[derive(Debug, Clone)]
pub struct QuestDefinition {
    pub name: String,
    pub category: String,
    pub difficulty: String,
    pub length: String,
    pub location: String,
    pub quest_giver: String,
    pub recommended_level: i32,
    pub descriptions: Vec<String>,
    pub unstarted_description: String,
    pub unstarted_objective: String,
    pub board_description: String,
    /// Switch that must be on for the quest to show on a quest board
    pub board_switch: Option<u32>,
    /// Switch turned on when the quest starts
    pub start_switch: Option<u32>,
    pub objectives: Vec<Objective>,
    pub rewards: Reward,
}

impl QuestDefinition {
    /// Create a quest from raw TOML data. Bad objectives are skipped.
    pub fn from_raw(raw: &RawQuest) -> Result<Self, DefinitionError> {
        if raw.name.trim().is_empty() {
            return Err(DefinitionError::invalid("quest", "", "quest has an empty name"));
        }

        let mut seen = HashSet::new();
        let mut objectives = Vec::new();
        for (i, value) in raw.objectives.iter().enumerate() {
            let parsed = value
                .clone()
                .try_into::<RawObjective>()
                .map_err(|e| e.to_string())
                .and_then(|o| Objective::from_raw(&o));

            match parsed {
                Ok(objective) => {
                    if !seen.insert(objective.id.clone()) {
                        warn!(
                            "Skipping objective '{}' in quest '{}': duplicate id",
                            objective.id, raw.name
                        );
                        continue;
                    }
                    objectives.push(objective);
                }
                Err(e) => warn!(
                    "Skipping objective {} in quest '{}': {}. Check the objective's id, stage and tracking fields",
                    i, raw.name, e
                ),
            }
        }

        Ok(Self {
            name: raw.name.clone(),
            category: raw.category.clone(),
            difficulty: raw.difficulty.clone(),
            length: raw.length.clone(),
            location: raw.location.clone(),
            quest_giver: raw.quest_giver.clone(),
            recommended_level: raw.recommended_level,
            descriptions: raw.descriptions.clone(),
            unstarted_description: raw.unstarted_description.clone(),
            unstarted_objective: raw.unstarted_objective.clone(),
            board_description: raw.board_description.clone(),
            board_switch: (raw.board_switch > 0).then_some(raw.board_switch),
            start_switch: (raw.start_switch > 0).then_some(raw.start_switch),
            objectives,
            rewards: raw
                .rewards
                .as_ref()
                .map(|r| Reward::from_raw(&raw.name, r))
                .unwrap_or_default(),
        })
    }

    /// Get objective by ID
    pub fn objective(&self, id: &str) -> Option<&Objective> {
        self.objectives.iter().find(|o| o.id == id)
    }

    /// Objectives scoped to one stage, in definition order
    pub fn objectives_of_stage(&self, stage: u32) -> Vec<&Objective> {
        self.objectives.iter().filter(|o| o.stage == stage).collect()
    }

    pub fn has_objectives_in_stage(&self, stage: u32) -> bool {
        self.objectives.iter().any(|o| o.stage == stage)
    }

    pub fn max_progress_for(&self, id: &str) -> Option<i64> {
        self.objective(id).map(Objective::max_progress)
    }

    /// Description for a stage; later stages reuse the last description
    pub fn description_for_stage(&self, stage: u32) -> Option<&str> {
        let index = (stage.max(1) - 1) as usize;
        self.descriptions
            .get(index)
            .or_else(|| self.descriptions.last())
            .map(String::as_str)
    }

    pub fn can_display_on_board(&self, switches: &impl Switches) -> bool {
        self.board_switch.map_or(true, |id| switches.switch(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryHost;

    fn parse_quest(source: &str) -> QuestDefinition {
        let raw: RawQuest = toml::from_str(source).unwrap();
        QuestDefinition::from_raw(&raw).unwrap()
    }

    #[test]
    fn test_objective_kinds() {
        let quest = parse_quest(
            r#"
name = "Supplies"
descriptions = ["Gather supplies", "Report back"]

[[objectives]]
id = "talk"
description = "Talk to the smith"

[[objectives]]
id = "coins"
auto_track = "gold"
amount = 500

[[objectives]]
id = "kills"
auto_track = "variable"
variable = 7
max_progress = 10

[[objectives]]
id = "swords"
stage = 2
auto_track = "weapon"
item_id = 4
amount = 3
complete_switch = 11
"#,
        );

        assert_eq!(quest.objectives.len(), 4);
        assert_eq!(
            quest.objective("talk").unwrap().kind,
            ObjectiveKind::Manual { max_progress: 1 }
        );
        assert_eq!(
            quest.objective("coins").unwrap().kind,
            ObjectiveKind::Gold { threshold: 500 }
        );
        assert_eq!(
            quest.objective("kills").unwrap().kind,
            ObjectiveKind::Variable { variable: 7, threshold: 10 }
        );
        let swords = quest.objective("swords").unwrap();
        assert_eq!(swords.stage, 2);
        assert_eq!(swords.complete_switch, Some(11));
        assert_eq!(swords.max_progress(), 3);
        assert_eq!(quest.objectives_of_stage(1).len(), 3);
        assert_eq!(quest.description_for_stage(2), Some("Report back"));
        assert_eq!(quest.description_for_stage(5), Some("Report back"));
    }

    #[test]
    fn test_bad_objectives_are_skipped() {
        let quest = parse_quest(
            r#"
name = "Broken"

[[objectives]]
id = "ok"

[[objectives]]
id = "no_stage"
stage = 0

[[objectives]]
id = "bad_kind"
auto_track = "mana"
amount = 3

[[objectives]]
id = "no_variable"
auto_track = "variable"
amount = 3

[[objectives]]
description = "missing id"

[[objectives]]
id = "ok"
description = "duplicate"
"#,
        );

        assert_eq!(quest.objectives.len(), 1);
        assert_eq!(quest.objectives[0].id, "ok");
    }

    #[test]
    fn test_rewards_skip_bad_items() {
        let quest = parse_quest(
            r#"
name = "Paid"

[rewards]
gold = 100
exp = 25
custom = ["A warm thank you"]

[[rewards.items]]
kind = "armor"
id = 2
amount = 1

[[rewards.items]]
kind = "relic"
id = 9

[[rewards.items]]
id = 5
"#,
        );

        assert!(quest.rewards.has_rewards());
        assert_eq!(quest.rewards.gold, 100);
        assert_eq!(
            quest.rewards.items,
            vec![
                ItemReward { item: ItemRef::armor(2), amount: 1 },
                ItemReward { item: ItemRef::item(5), amount: 1 },
            ]
        );
        assert_eq!(quest.rewards.custom, vec!["A warm thank you".to_string()]);
    }

    #[test]
    fn test_board_switch() {
        let quest = parse_quest("name = \"Posted\"\nboard_switch = 3\n");
        let mut host = MemoryHost::new();
        assert!(!quest.can_display_on_board(&host));
        host.switches.insert(3, true);
        assert!(quest.can_display_on_board(&host));
    }
}
