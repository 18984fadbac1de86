//! Auto-tracking lists
//!
//! Names of in-progress quests whose current stage has objectives driven by
//! party gold, game variables or inventory. Rebuilt from quest state, never saved.

use super::definition::{Objective, ObjectiveKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Gold,
    Variable,
    Item,
}

impl TrackKind {
    pub fn of(kind: &ObjectiveKind) -> Option<Self> {
        match kind {
            ObjectiveKind::Manual { .. } => None,
            ObjectiveKind::Gold { .. } => Some(TrackKind::Gold),
            ObjectiveKind::Variable { .. } => Some(TrackKind::Variable),
            ObjectiveKind::Item { .. } => Some(TrackKind::Item),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AutoTracker {
    gold: Vec<String>,
    variable: Vec<String>,
    item: Vec<String>,
}

impl AutoTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn list(&self, kind: TrackKind) -> &Vec<String> {
        match kind {
            TrackKind::Gold => &self.gold,
            TrackKind::Variable => &self.variable,
            TrackKind::Item => &self.item,
        }
    }

    fn list_mut(&mut self, kind: TrackKind) -> &mut Vec<String> {
        match kind {
            TrackKind::Gold => &mut self.gold,
            TrackKind::Variable => &mut self.variable,
            TrackKind::Item => &mut self.item,
        }
    }

    /// Replace any registration for `name` with one per automatic objective kind
    /// present in the given stage objectives
    pub fn track_stage<'a>(&mut self, name: &str, objectives: impl IntoIterator<Item = &'a Objective>) {
        self.remove(name);
        for objective in objectives {
            let Some(kind) = TrackKind::of(&objective.kind) else {
                continue;
            };
            let list = self.list_mut(kind);
            if !list.iter().any(|n| n == name) {
                list.push(name.to_string());
            }
        }
    }

    pub fn remove(&mut self, name: &str) {
        self.gold.retain(|n| n != name);
        self.variable.retain(|n| n != name);
        self.item.retain(|n| n != name);
    }

    pub fn clear(&mut self) {
        self.gold.clear();
        self.variable.clear();
        self.item.clear();
    }

    pub fn is_tracking(&self, kind: TrackKind, name: &str) -> bool {
        self.list(kind).iter().any(|n| n == name)
    }

    pub fn len(&self, kind: TrackKind) -> usize {
        self.list(kind).len()
    }

    /// Name at `index`, if the list still reaches that far
    pub fn get(&self, kind: TrackKind, index: usize) -> Option<&str> {
        self.list(kind).get(index).map(String::as_str)
    }
}
