//! Questline
//!
//! Quest progress tracking and reputation ranks for a frame-driven RPG host.
//! Definitions are loaded from TOML at startup; runtime state is serializable
//! and owned by the host's save container.

pub mod config;
pub mod error;
pub mod host;
mod loader;
pub mod mode;
pub mod quest;
pub mod reputation;
pub mod save;

pub use config::{EngineConfig, QuestSettings, ReputationSettings};
pub use error::{DefinitionError, SaveError};
pub use host::{Actors, GameHost, ItemKind, ItemRef, MemoryHost, Party, Switches, Variables};
pub use mode::ChangeMode;
pub use quest::{QuestEngine, QuestRegistry, QuestStatus};
pub use reputation::{RepKey, ReputationEngine, ReputationRegistry};
pub use save::SaveData;
