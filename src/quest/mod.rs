//! Quest System Module
//!
//! TOML quest definitions, per-quest progress, and the engine that moves
//! quests through their stages and reacts to gold, variable and inventory
//! changes on the host.

pub mod definition;
pub mod registry;
pub mod state;
pub mod tracking;
pub mod events;
pub mod engine;

pub use definition::{ItemReward, Objective, ObjectiveKind, QuestCategory, QuestDefinition, Reward};
pub use registry::QuestRegistry;
pub use state::{QuestBook, QuestState, QuestStatus};
pub use tracking::{AutoTracker, TrackKind};
pub use events::{QuestEvent, QuestNotice, QuestNoticeKind, RewardNotice};
pub use engine::QuestEngine;
