//! Reputation Definition Structures
//!
//! Ranks, reputations and categories as they appear in TOML, plus the
//! resolved forms the engine works with.

use std::fmt;
use serde::{Deserialize, Serialize};

/// Case-insensitive composite key of a reputation. Both parts are stored
/// lower-cased; `Display` renders `name-category` for logs only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RepKey {
    name: String,
    category: String,
}

impl RepKey {
    pub fn new(name: &str, category: &str) -> Self {
        Self {
            name: name.to_lowercase(),
            category: category.to_lowercase(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> &str {
        &self.category
    }
}

impl fmt::Display for RepKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.name, self.category)
    }
}

/// Raw rank as it appears in TOML
#[derive(Debug, Clone, Deserialize)]
pub struct RawRank {
    pub id: String,
    pub name: Option<String>,
    /// Points needed to fully traverse the rank; negative for hostile ranks
    #[serde(default = "default_threshold")]
    pub threshold: i64,
    #[serde(default)]
    pub icon: u32,
    #[serde(default)]
    pub color: u32,
    pub gauge_color_1: Option<u32>,
    pub gauge_color_2: Option<u32>,
}

fn default_threshold() -> i64 {
    1
}

/// Raw reputation as it appears in TOML
#[derive(Debug, Clone, Deserialize)]
pub struct RawReputation {
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub starting: i64,
    #[serde(default = "default_discovered")]
    pub discovered: bool,
    #[serde(default)]
    pub allow_negative: bool,
    /// Gauge denominator used only when no ranks are configured
    #[serde(default)]
    pub max_rep: i64,
    /// Rank ids, negative ranks first
    #[serde(default)]
    pub ranks: Vec<String>,
    #[serde(default)]
    pub actor_id: u32,
    #[serde(default)]
    pub icon: u32,
    #[serde(default)]
    pub color: u32,
    #[serde(default)]
    pub description: String,
    pub picture: Option<String>,
}

fn default_discovered() -> bool {
    true
}

/// Raw reputation category as it appears in TOML
#[derive(Debug, Clone, Deserialize)]
pub struct RawReputationCategory {
    pub id: String,
    pub display_name: Option<String>,
    #[serde(default)]
    pub icon: u32,
    pub background: Option<String>,
}

/// Default gauge colors when a rank does not set its own
pub const DEFAULT_GAUGE_COLORS: (u32, u32) = (20, 21);

#[derive(Debug, Clone, PartialEq)]
pub struct ReputationRank {
    /// Lower-cased id
    pub id: String,
    pub name: String,
    pub threshold: i64,
    pub icon: u32,
    pub color: u32,
    pub gauge_colors: (u32, u32),
}

impl ReputationRank {
    pub fn from_raw(raw: &RawRank) -> Self {
        Self {
            id: raw.id.to_lowercase(),
            name: raw.name.clone().unwrap_or_else(|| raw.id.clone()),
            threshold: raw.threshold,
            icon: raw.icon,
            color: raw.color,
            gauge_colors: (
                raw.gauge_color_1.unwrap_or(DEFAULT_GAUGE_COLORS.0),
                raw.gauge_color_2.unwrap_or(DEFAULT_GAUGE_COLORS.1),
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReputationDefinition {
    pub key: RepKey,
    pub name: String,
    pub category: String,
    pub starting: i64,
    pub discovered: bool,
    pub allow_negative: bool,
    pub max_rep: i64,
    /// Resolved ranks in banding order
    pub ranks: Vec<ReputationRank>,
    /// Actor whose name replaces the reputation name once discovered
    pub actor_id: Option<u32>,
    pub icon: u32,
    pub color: u32,
    pub description: String,
    pub picture: Option<String>,
}

impl ReputationDefinition {
    /// Build a definition from raw data and already resolved ranks
    pub fn from_raw(raw: &RawReputation, ranks: Vec<ReputationRank>) -> Self {
        Self {
            key: RepKey::new(&raw.name, &raw.category),
            name: raw.name.clone(),
            category: raw.category.clone(),
            starting: raw.starting,
            discovered: raw.discovered,
            allow_negative: raw.allow_negative,
            max_rep: raw.max_rep,
            ranks,
            actor_id: (raw.actor_id > 0).then_some(raw.actor_id),
            icon: raw.icon,
            color: raw.color,
            description: raw.description.clone(),
            picture: raw.picture.clone().filter(|p| !p.is_empty()),
        }
    }

    /// Index of the first negative rank that follows a non-negative one
    pub fn misordered_rank(&self) -> Option<usize> {
        let first_positive = self.ranks.iter().position(|r| r.threshold >= 0)?;
        self.ranks[first_positive..]
            .iter()
            .position(|r| r.threshold < 0)
            .map(|offset| first_positive + offset)
    }

    /// Stable partition: negative ranks first, relative order kept
    pub fn reorder_ranks(&mut self) {
        let (mut negative, positive): (Vec<_>, Vec<_>) =
            self.ranks.drain(..).partition(|r| r.threshold < 0);
        negative.extend(positive);
        self.ranks = negative;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReputationCategory {
    /// Lower-cased id
    pub id: String,
    pub display_name: String,
    pub icon: u32,
    pub background: Option<String>,
}

impl ReputationCategory {
    pub fn from_raw(raw: &RawReputationCategory) -> Self {
        Self {
            id: raw.id.to_lowercase(),
            display_name: raw.display_name.clone().unwrap_or_else(|| raw.id.clone()),
            icon: raw.icon,
            background: raw.background.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rank(id: &str, threshold: i64) -> ReputationRank {
        ReputationRank::from_raw(&RawRank {
            id: id.to_string(),
            name: None,
            threshold,
            icon: 0,
            color: 0,
            gauge_color_1: None,
            gauge_color_2: Some(7),
        })
    }

    #[test]
    fn test_rep_key_is_case_insensitive() {
        assert_eq!(RepKey::new("Guards", "Town"), RepKey::new("GUARDS", "town"));
        assert_eq!(RepKey::new("Guards", "Town").to_string(), "guards-town");
        assert_ne!(RepKey::new("Guards", "Town"), RepKey::new("Guards", "Port"));
    }

    #[test]
    fn test_rep_key_keeps_parts_apart() {
        let left = RepKey::new("Red-Hand", "Guild");
        let right = RepKey::new("Red", "Hand-Guild");
        assert_ne!(left, right);
        assert_eq!(left.to_string(), right.to_string());
        assert_eq!(right.name(), "red");
        assert_eq!(right.category(), "hand-guild");
    }

    #[test]
    fn test_rank_defaults() {
        let rank = rank("Hated", -100);
        assert_eq!(rank.id, "hated");
        assert_eq!(rank.name, "Hated");
        assert_eq!(rank.gauge_colors, (20, 7));
    }

    #[test]
    fn test_rank_reordering() {
        let raw: RawReputation = toml::from_str("name = \"Guild\"\ncategory = \"Town\"\n").unwrap();
        let mut rep = ReputationDefinition::from_raw(
            &raw,
            vec![rank("neutral", 100), rank("hostile", -50), rank("liked", 200), rank("hated", -100)],
        );
        assert!(rep.discovered);
        assert_eq!(rep.misordered_rank(), Some(1));

        rep.reorder_ranks();
        let ids: Vec<&str> = rep.ranks.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["hostile", "hated", "neutral", "liked"]);
        assert_eq!(rep.misordered_rank(), None);
    }
}
