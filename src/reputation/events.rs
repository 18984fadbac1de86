//! Rank change notifications

use serde::{Deserialize, Serialize};

use super::definition::RepKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankDirection {
    Up,
    Down,
}

impl RankDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            RankDirection::Up => "up",
            RankDirection::Down => "down",
        }
    }
}

/// Result of a reputation change that crossed a rank boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankChange {
    pub direction: RankDirection,
    pub from_index: usize,
    pub to_index: usize,
}

/// Queued for the host to show a toast and run the configured hook
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankNotice {
    pub direction: RankDirection,
    pub key: RepKey,
    /// Lower-cased id of the new rank
    pub rank_id: Option<String>,
    pub display_name: String,
    /// Host hook to run, e.g. a common event id
    pub hook: Option<u32>,
}
