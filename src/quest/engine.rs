//! Quest Engine
//!
//! Drives quest lifecycles: discovery, start, stage advancement, completion,
//! failure and reward issuance. Automatic objectives are evaluated against the
//! host whenever it reports a gold, variable or inventory change.
//!
//! Operations re-enter one another (an objective completes, its stage advances,
//! the quest completes, its rewards satisfy another quest), so every helper
//! re-reads state by name instead of holding references across calls.

use chrono::Utc;
use tracing::{debug, warn};

use super::definition::{Objective, ObjectiveKind, QuestDefinition};
use super::events::{QuestEvent, QuestNotice, QuestNoticeKind, RewardNotice};
use super::registry::QuestRegistry;
use super::state::{QuestBook, QuestState, QuestStatus};
use super::tracking::{AutoTracker, TrackKind};
use crate::config::QuestSettings;
use crate::host::{GameHost, ItemRef, Party, Switches, Variables};
use crate::mode::ChangeMode;

pub struct QuestEngine {
    registry: QuestRegistry,
    settings: QuestSettings,
    book: QuestBook,
    tracker: AutoTracker,
    events: Vec<QuestEvent>,
    tracker_dirty: bool,
}

impl QuestEngine {
    pub fn new(mut registry: QuestRegistry, mut settings: QuestSettings) -> Self {
        settings.sanitize();
        registry.register_internal_categories(&settings);
        let mut book = QuestBook::new();
        book.ensure_quests(&registry);

        Self {
            registry,
            settings,
            book,
            tracker: AutoTracker::new(),
            events: Vec::new(),
            tracker_dirty: true,
        }
    }

    /// Reset every quest to its initial state
    pub fn on_new_game(&mut self) {
        self.book = QuestBook::new();
        self.book.ensure_quests(&self.registry);
        self.tracker.clear();
        self.events.clear();
        self.tracker_dirty = true;
    }

    /// Adopt a saved quest book and rebuild auto-tracking for in-progress quests
    pub fn restore(&mut self, book: QuestBook) {
        self.book = book;
        self.book.ensure_quests(&self.registry);
        self.tracker.clear();

        let names = self.registry.names().to_vec();
        for name in &names {
            self.refresh_tracking(name);
        }
        self.tracker_dirty = true;
        debug!("Restored {} quest states", self.book.len());
    }

    pub fn registry(&self) -> &QuestRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &QuestSettings {
        &self.settings
    }

    pub fn book(&self) -> &QuestBook {
        &self.book
    }

    pub fn into_book(self) -> QuestBook {
        self.book
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Set the discovered flag. Returns false for unknown quests.
    pub fn discover(&mut self, name: &str, on: bool) -> bool {
        if !self.lookup("discover", name) {
            return false;
        }
        if let Some(state) = self.book.get_mut(name) {
            state.discovered = on;
        }
        self.mark_updated(name);
        if on {
            debug!("Quest '{}' discovered", name);
            self.notify(name, QuestNoticeKind::Discovered);
        }
        true
    }

    /// Start (or un-start) a quest. Does nothing if the started flag already
    /// matches `on`.
    pub fn start<H: GameHost>(&mut self, host: &mut H, name: &str, on: bool, also_discover: bool) -> bool {
        if !self.lookup("start", name) {
            return false;
        }
        let Some(state) = self.book.get_mut(name) else {
            return false;
        };
        if state.started == on {
            return false;
        }

        state.started = on;
        let discover_now = on && also_discover && !state.discovered;
        if discover_now {
            state.discovered = true;
        }
        self.mark_updated(name);

        if discover_now {
            self.notify(name, QuestNoticeKind::Discovered);
        }
        if on {
            debug!("Quest '{}' started", name);
            self.notify(name, QuestNoticeKind::Started);
            if let Some(switch) = self.registry.get(name).and_then(|q| q.start_switch) {
                host.set_switch(switch, true);
            }
        }

        self.refresh_tracking(name);
        if on {
            // The party may already meet some thresholds
            self.evaluate_quest(host, name, None);
        }
        true
    }

    /// Complete a quest, move its stage past every remaining objective and
    /// hand out rewards
    pub fn complete<H: GameHost>(&mut self, host: &mut H, name: &str) -> bool {
        if !self.lookup("complete", name) {
            return false;
        }
        let unpin = self.settings.unpin_on_complete;
        let Some(state) = self.book.get_mut(name) else {
            return false;
        };
        if state.completed || state.failed {
            debug!("Quest '{}' is already {}", name, state.status().as_str());
            return false;
        }

        state.completed = true;
        state.completed_at = Some(Utc::now());
        if unpin {
            state.pinned = false;
        }
        state.updated = true;
        self.tracker_dirty = true;
        debug!("Quest '{}' completed", name);
        self.notify(name, QuestNoticeKind::Completed);

        loop {
            let Some(stage) = self.book.get(name).map(|s| s.stage) else {
                break;
            };
            let has_objectives = self
                .registry
                .get(name)
                .map_or(false, |q| q.has_objectives_in_stage(stage));
            if !has_objectives {
                break;
            }
            self.snapshot_auto_progress(&*host, name);
            if let Some(state) = self.book.get_mut(name) {
                state.stage += 1;
            }
        }
        self.tracker.remove(name);

        let Some(rewards) = self.registry.get(name).map(|q| q.rewards.clone()) else {
            return true;
        };
        if rewards.gold != 0 {
            self.gain_gold(host, rewards.gold);
        }
        if rewards.exp != 0 {
            host.gain_exp_all(rewards.exp);
        }
        for reward in &rewards.items {
            self.gain_item(host, reward.item, reward.amount);
        }
        if !rewards.custom.is_empty() {
            self.events.push(QuestEvent::Reward(RewardNotice {
                quest: name.to_string(),
                custom: rewards.custom,
            }));
        }
        true
    }

    pub fn fail<H: GameHost>(&mut self, host: &mut H, name: &str) -> bool {
        if !self.lookup("fail", name) {
            return false;
        }
        let unpin = self.settings.unpin_on_fail;
        let Some(state) = self.book.get_mut(name) else {
            return false;
        };
        if state.failed || state.completed {
            debug!("Quest '{}' is already {}", name, state.status().as_str());
            return false;
        }

        state.failed = true;
        if unpin {
            state.pinned = false;
        }
        state.updated = true;
        self.tracker_dirty = true;
        debug!("Quest '{}' failed", name);
        self.notify(name, QuestNoticeKind::Failed);

        self.snapshot_auto_progress(&*host, name);
        self.tracker.remove(name);
        true
    }

    /// Move to the next stage; a stage without objectives completes the quest
    pub fn advance_stage<H: GameHost>(&mut self, host: &mut H, name: &str) -> bool {
        if !self.lookup("advance_stage", name) {
            return false;
        }
        if self.book.get(name).map_or(true, QuestState::is_terminal) {
            debug!("Quest '{}' is finished, not advancing", name);
            return false;
        }

        self.snapshot_auto_progress(&*host, name);
        let Some(state) = self.book.get_mut(name) else {
            return false;
        };
        state.stage += 1;
        let stage = state.stage;
        self.mark_updated(name);
        debug!("Quest '{}' advanced to stage {}", name, stage);

        let has_objectives = self
            .registry
            .get(name)
            .map_or(false, |q| q.has_objectives_in_stage(stage));
        if !has_objectives {
            self.complete(host, name);
            return true;
        }

        self.refresh_tracking(name);
        self.evaluate_quest(host, name, None);
        if self.book.get(name).map_or(false, |s| s.stage == stage) {
            self.check_stage_complete(host, name);
        }
        true
    }

    /// Change an objective's progress. Reaching the target completes the
    /// objective for good and may advance the stage.
    pub fn set_objective_progress<H: GameHost>(
        &mut self,
        host: &mut H,
        name: &str,
        objective_id: &str,
        mode: ChangeMode,
        amount: i64,
    ) -> bool {
        if !self.lookup("set_objective_progress", name) {
            return false;
        }
        let Some(objective) = self
            .registry
            .get(name)
            .and_then(|q| q.objective(objective_id))
            .cloned()
        else {
            warn!("Quest '{}' has no objective '{}'", name, objective_id);
            return false;
        };
        let Some(state) = self.book.get_mut(name) else {
            return false;
        };

        let max = objective.max_progress();
        let value = mode.apply(state.get_objective_progress(objective_id, max), amount);
        state.set_objective_progress(objective_id, value);
        self.mark_updated(name);

        if value >= max {
            self.complete_objective(host, name, &objective);
        }
        true
    }

    /// `set_objective_progress` with the value of a host variable added to `amount`
    pub fn set_objective_progress_with_variable<H: GameHost>(
        &mut self,
        host: &mut H,
        name: &str,
        objective_id: &str,
        mode: ChangeMode,
        amount: i64,
        variable: u32,
    ) -> bool {
        let amount = amount.saturating_add(host.variable(variable));
        self.set_objective_progress(host, name, objective_id, mode, amount)
    }

    /// Flip the pin. Returns the new pinned flag.
    pub fn toggle_pin(&mut self, name: &str) -> Option<bool> {
        let state = self.book.get_mut(name)?;
        state.pinned = !state.pinned;
        self.tracker_dirty = true;
        Some(state.pinned)
    }

    /// Clear the updated flag once the player has looked at the quest
    pub fn mark_viewed(&mut self, name: &str) {
        if let Some(state) = self.book.get_mut(name) {
            state.updated = false;
        }
    }

    // ========================================================================
    // Host hooks
    // ========================================================================

    pub fn on_gold_changed<H: GameHost>(&mut self, host: &mut H) {
        self.scan(host, TrackKind::Gold);
    }

    pub fn on_variable_changed<H: GameHost>(&mut self, host: &mut H) {
        self.scan(host, TrackKind::Variable);
    }

    pub fn on_inventory_changed<H: GameHost>(&mut self, host: &mut H) {
        self.scan(host, TrackKind::Item);
    }

    pub fn gain_gold<H: GameHost>(&mut self, host: &mut H, amount: i64) {
        host.gain_gold(amount);
        self.on_gold_changed(host);
    }

    pub fn gain_item<H: GameHost>(&mut self, host: &mut H, item: ItemRef, amount: i64) {
        host.gain_item(item, amount);
        self.on_inventory_changed(host);
    }

    pub fn set_variable<H: GameHost>(&mut self, host: &mut H, id: u32, value: i64) {
        host.set_variable(id, value);
        self.on_variable_changed(host);
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn definition(&self, name: &str) -> Option<&QuestDefinition> {
        self.registry.get(name)
    }

    pub fn quest(&self, name: &str) -> Option<&QuestState> {
        self.book.get(name)
    }

    pub fn status(&self, name: &str) -> Option<QuestStatus> {
        self.book.get(name).map(QuestState::status)
    }

    pub fn stage(&self, name: &str) -> Option<u32> {
        self.book.get(name).map(|s| s.stage)
    }

    /// Objective progress clamped to `[0, max]`
    pub fn objective_progress(&self, name: &str, objective_id: &str) -> Option<i64> {
        let max = self.registry.get(name)?.max_progress_for(objective_id)?;
        Some(self.book.get(name)?.get_objective_progress(objective_id, max))
    }

    /// Completion date rendered with the configured format
    pub fn completion_date(&self, name: &str) -> Option<String> {
        self.book.get(name)?.completion_date(&self.settings.date_format)
    }

    /// Write the current stage into a host variable
    pub fn stage_to_variable(&self, variables: &mut impl Variables, name: &str, variable: u32) -> bool {
        if !self.lookup("stage_to_variable", name) {
            return false;
        }
        match self.stage(name) {
            Some(stage) => {
                variables.set_variable(variable, i64::from(stage));
                true
            }
            None => false,
        }
    }

    /// Write clamped objective progress into a host variable
    pub fn objective_to_variable(
        &self,
        variables: &mut impl Variables,
        name: &str,
        objective_id: &str,
        variable: u32,
    ) -> bool {
        if !self.lookup("objective_to_variable", name) {
            return false;
        }
        match self.objective_progress(name, objective_id) {
            Some(progress) => {
                variables.set_variable(variable, progress);
                true
            }
            None => {
                warn!("Quest '{}' has no objective '{}'", name, objective_id);
                false
            }
        }
    }

    /// Write the status code (0 undiscovered through 4 completed) into a host variable
    pub fn status_to_variable(&self, variables: &mut impl Variables, name: &str, variable: u32) -> bool {
        if !self.lookup("status_to_variable", name) {
            return false;
        }
        match self.status(name) {
            Some(status) => {
                variables.set_variable(variable, status.code());
                true
            }
            None => false,
        }
    }

    /// Quests a quest board may offer: not started and board switch satisfied
    pub fn board_quests(&self, switches: &impl Switches) -> Vec<&QuestDefinition> {
        self.registry
            .all()
            .filter(|q| q.can_display_on_board(switches))
            .filter(|q| self.book.get(&q.name).map_or(false, |s| !s.started))
            .collect()
    }

    pub fn take_notices(&mut self) -> Vec<QuestEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn tracker_needs_update(&self) -> bool {
        self.tracker_dirty
    }

    pub fn on_tracker_updated(&mut self) {
        self.tracker_dirty = false;
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn lookup(&self, op: &str, name: &str) -> bool {
        let known = self.registry.contains(name) && self.book.get(name).is_some();
        if !known {
            warn!("{}: unknown quest '{}'", op, name);
        }
        known
    }

    fn notify(&mut self, name: &str, kind: QuestNoticeKind) {
        self.events.push(QuestEvent::Notice(QuestNotice::new(name, kind)));
    }

    fn mark_updated(&mut self, name: &str) {
        if let Some(state) = self.book.get_mut(name) {
            state.updated = true;
            if state.pinned {
                self.tracker_dirty = true;
            }
        }
    }

    fn refresh_tracking(&mut self, name: &str) {
        match (self.registry.get(name), self.book.get(name)) {
            (Some(quest), Some(state)) if state.is_in_progress() => {
                self.tracker.track_stage(name, quest.objectives_of_stage(state.stage));
            }
            _ => self.tracker.remove(name),
        }
    }

    /// Store live values for the current stage's unfinished automatic objectives
    fn snapshot_auto_progress<H: GameHost>(&mut self, host: &H, name: &str) {
        let (Some(quest), Some(state)) = (self.registry.get(name), self.book.get_mut(name)) else {
            return;
        };
        for objective in quest.objectives_of_stage(state.stage) {
            if state.is_objective_complete(&objective.id) {
                continue;
            }
            if let Some(live) = live_value(host, &objective.kind) {
                state.set_objective_progress(&objective.id, live);
            }
        }
    }

    /// Walk tracked quests from the back; the list may shrink or grow while
    /// objectives complete, so names are fetched by index each step
    fn scan<H: GameHost>(&mut self, host: &mut H, kind: TrackKind) {
        let mut index = self.tracker.len(kind);
        while index > 0 {
            index -= 1;
            let Some(name) = self.tracker.get(kind, index).map(str::to_string) else {
                continue;
            };
            self.evaluate_quest(host, &name, Some(kind));
        }
    }

    fn evaluate_quest<H: GameHost>(&mut self, host: &mut H, name: &str, only: Option<TrackKind>) {
        let (Some(quest), Some(state)) = (self.registry.get(name), self.book.get(name)) else {
            return;
        };
        if !state.is_in_progress() {
            return;
        }
        let stage = state.stage;
        let objectives: Vec<Objective> = quest
            .objectives_of_stage(stage)
            .into_iter()
            .filter(|o| match TrackKind::of(&o.kind) {
                Some(kind) => only.map_or(true, |wanted| wanted == kind),
                None => false,
            })
            .cloned()
            .collect();

        for objective in objectives {
            let Some(live) = live_value(&*host, &objective.kind) else {
                continue;
            };
            let Some(state) = self.book.get_mut(name) else {
                return;
            };
            if state.is_objective_complete(&objective.id) {
                continue;
            }

            if live >= objective.max_progress() {
                state.set_objective_progress(&objective.id, live);
                self.complete_objective(host, name, &objective);
                let moved_on = self
                    .book
                    .get(name)
                    .map_or(true, |s| s.stage != stage || !s.is_in_progress());
                if moved_on {
                    break;
                }
            } else if state.objective_progress(&objective.id) != live {
                state.set_objective_progress(&objective.id, live);
                if state.pinned {
                    self.tracker_dirty = true;
                }
            }
        }
    }

    fn complete_objective<H: GameHost>(&mut self, host: &mut H, name: &str, objective: &Objective) {
        let Some(state) = self.book.get_mut(name) else {
            return;
        };
        if state.mark_objective_complete(&objective.id) {
            debug!("Quest '{}' objective '{}' completed", name, objective.id);
            self.notify(
                name,
                QuestNoticeKind::ObjectiveCompleted {
                    objective: objective.id.clone(),
                },
            );
        }
        if let Some(switch) = objective.complete_switch {
            host.set_switch(switch, true);
        }
        self.mark_updated(name);
        self.check_stage_complete(host, name);
    }

    fn check_stage_complete<H: GameHost>(&mut self, host: &mut H, name: &str) {
        let (Some(quest), Some(state)) = (self.registry.get(name), self.book.get(name)) else {
            return;
        };
        if state.is_terminal() {
            return;
        }
        let objectives = quest.objectives_of_stage(state.stage);
        let stage_done =
            !objectives.is_empty() && objectives.iter().all(|o| state.is_objective_complete(&o.id));
        if stage_done {
            self.advance_stage(host, name);
        }
    }
}

fn live_value<H: GameHost>(host: &H, kind: &ObjectiveKind) -> Option<i64> {
    match *kind {
        ObjectiveKind::Manual { .. } => None,
        ObjectiveKind::Gold { .. } => Some(host.gold()),
        ObjectiveKind::Variable { variable, .. } => Some(host.variable(variable)),
        ObjectiveKind::Item { item, .. } => Some(host.item_count(item)),
    }
}
