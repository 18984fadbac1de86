//! Quest State Tracking
//!
//! Per-quest progress and the persisted quest book.

use std::collections::{HashMap, HashSet};
use std::fmt::Write;
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

use super::registry::QuestRegistry;

/// Overall status of a quest, as exported to host variables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestStatus {
    Undiscovered,
    Discovered,
    Started,
    Failed,
    Completed,
}

impl QuestStatus {
    /// Numeric code written into host variables
    pub fn code(&self) -> i64 {
        match self {
            QuestStatus::Undiscovered => 0,
            QuestStatus::Discovered => 1,
            QuestStatus::Started => 2,
            QuestStatus::Failed => 3,
            QuestStatus::Completed => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QuestStatus::Undiscovered => "undiscovered",
            QuestStatus::Discovered => "discovered",
            QuestStatus::Started => "started",
            QuestStatus::Failed => "failed",
            QuestStatus::Completed => "completed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "undiscovered" => Some(QuestStatus::Undiscovered),
            "discovered" => Some(QuestStatus::Discovered),
            "started" => Some(QuestStatus::Started),
            "failed" => Some(QuestStatus::Failed),
            "completed" => Some(QuestStatus::Completed),
            _ => None,
        }
    }
}

/// Progress of a single quest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestState {
    pub discovered: bool,
    pub started: bool,
    pub completed: bool,
    pub failed: bool,
    pub pinned: bool,
    /// Set when something changed since the player last viewed the quest
    pub updated: bool,
    pub completed_at: Option<DateTime<Utc>>,
    /// Current stage, starting at 1
    pub stage: u32,
    /// Raw progress per objective id
    #[serde(default)]
    pub objective_progress: HashMap<String, i64>,
    /// Objectives that reached their target; completion is sticky
    #[serde(default)]
    pub objectives_completed: HashSet<String>,
}

impl Default for QuestState {
    fn default() -> Self {
        Self {
            discovered: false,
            started: false,
            completed: false,
            failed: false,
            pinned: false,
            updated: false,
            completed_at: None,
            stage: 1,
            objective_progress: HashMap::new(),
            objectives_completed: HashSet::new(),
        }
    }
}

impl QuestState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_in_progress(&self) -> bool {
        self.started && !self.completed && !self.failed
    }

    pub fn is_terminal(&self) -> bool {
        self.completed || self.failed
    }

    pub fn status(&self) -> QuestStatus {
        if self.completed {
            QuestStatus::Completed
        } else if self.failed {
            QuestStatus::Failed
        } else if self.started {
            QuestStatus::Started
        } else if self.discovered {
            QuestStatus::Discovered
        } else {
            QuestStatus::Undiscovered
        }
    }

    /// Stored progress without clamping
    pub fn objective_progress(&self, id: &str) -> i64 {
        self.objective_progress.get(id).copied().unwrap_or(0)
    }

    pub fn is_objective_complete(&self, id: &str) -> bool {
        self.objectives_completed.contains(id)
    }

    /// Progress clamped to `[0, max]`; a completed objective always reports `max`
    pub fn get_objective_progress(&self, id: &str, max: i64) -> i64 {
        if self.is_objective_complete(id) {
            return max;
        }
        self.objective_progress(id).clamp(0, max.max(0))
    }

    pub fn set_objective_progress(&mut self, id: &str, value: i64) {
        self.objective_progress.insert(id.to_string(), value);
    }

    /// Returns true if the objective was not complete before
    pub fn mark_objective_complete(&mut self, id: &str) -> bool {
        self.objectives_completed.insert(id.to_string())
    }

    /// Completion date in a strftime format. None when the quest is not
    /// complete or the format cannot be rendered.
    pub fn completion_date(&self, format: &str) -> Option<String> {
        let at = self.completed_at?;
        let mut rendered = String::new();
        write!(rendered, "{}", at.format(format)).ok()?;
        Some(rendered)
    }
}

/// Every quest's state, keyed by quest name. This is what gets saved.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestBook {
    states: HashMap<String, QuestState>,
    /// Definition order, rebuilt by `ensure_quests`
    #[serde(skip)]
    order: Vec<String>,
}

impl QuestBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a fresh state for every registered quest the book does not know yet.
    /// States for quests no longer registered are kept so old saves survive.
    pub fn ensure_quests(&mut self, registry: &QuestRegistry) {
        for name in registry.names() {
            self.states.entry(name.clone()).or_default();
        }

        let mut order: Vec<String> = registry.names().to_vec();
        let mut unknown: Vec<String> = self
            .states
            .keys()
            .filter(|name| !registry.contains(name))
            .cloned()
            .collect();
        unknown.sort();
        order.extend(unknown);
        self.order = order;
    }

    pub fn get(&self, name: &str) -> Option<&QuestState> {
        self.states.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut QuestState> {
        self.states.get_mut(name)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    fn names_where(&self, filter: impl Fn(&QuestState) -> bool) -> Vec<&str> {
        self.order
            .iter()
            .filter(|name| self.states.get(name.as_str()).map_or(false, &filter))
            .map(String::as_str)
            .collect()
    }

    pub fn discovered(&self) -> Vec<&str> {
        self.names_where(|s| s.discovered)
    }

    pub fn started(&self) -> Vec<&str> {
        self.names_where(|s| s.started)
    }

    pub fn completed(&self) -> Vec<&str> {
        self.names_where(|s| s.completed)
    }

    pub fn failed(&self) -> Vec<&str> {
        self.names_where(|s| s.failed)
    }

    pub fn in_progress(&self) -> Vec<&str> {
        self.names_where(QuestState::is_in_progress)
    }

    pub fn pinned(&self) -> Vec<&str> {
        self.names_where(|s| s.pinned)
    }
}
