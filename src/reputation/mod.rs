//! Reputation System Module
//!
//! Signed reputation values per (name, category), banded into ranks shared
//! across reputations.

pub mod definition;
pub mod registry;
pub mod banding;
pub mod state;
pub mod events;
pub mod engine;

pub use definition::{RepKey, ReputationCategory, ReputationDefinition, ReputationRank};
pub use registry::ReputationRegistry;
pub use state::{ReputationBook, ReputationState};
pub use events::{RankChange, RankDirection, RankNotice};
pub use engine::ReputationEngine;
