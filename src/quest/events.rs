//! Quest Event Types
//!
//! Notifications queued by the quest engine for the host UI to present.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestNoticeKind {
    Discovered,
    Started,
    Completed,
    Failed,
    ObjectiveCompleted { objective: String },
}

/// A quest lifecycle or objective change worth showing to the player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestNotice {
    pub kind: QuestNoticeKind,
    pub quest: String,
}

impl QuestNotice {
    pub fn new(quest: &str, kind: QuestNoticeKind) -> Self {
        Self {
            kind,
            quest: quest.to_string(),
        }
    }
}

/// Custom rewards the host hands out itself
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardNotice {
    pub quest: String,
    pub custom: Vec<String>,
}

/// Everything the engine queues, in the order it happened
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestEvent {
    Notice(QuestNotice),
    Reward(RewardNotice),
}

impl QuestEvent {
    pub fn quest(&self) -> &str {
        match self {
            QuestEvent::Notice(notice) => &notice.quest,
            QuestEvent::Reward(reward) => &reward.quest,
        }
    }

    /// Get event type as string (for logging)
    pub fn event_type(&self) -> &'static str {
        match self {
            QuestEvent::Notice(notice) => match notice.kind {
                QuestNoticeKind::Discovered => "discovered",
                QuestNoticeKind::Started => "started",
                QuestNoticeKind::Completed => "completed",
                QuestNoticeKind::Failed => "failed",
                QuestNoticeKind::ObjectiveCompleted { .. } => "objective_completed",
            },
            QuestEvent::Reward(_) => "reward",
        }
    }
}
