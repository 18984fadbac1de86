//! Change modes
//!
//! The add, subtract and set operations shared by objective progress and
//! reputation changes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How an amount is applied to a running value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeMode {
    Add,
    Subtract,
    Set,
}

impl ChangeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeMode::Add => "+",
            ChangeMode::Subtract => "-",
            ChangeMode::Set => "=",
        }
    }

    /// Apply `amount` to `current`, saturating at the i64 bounds
    pub fn apply(&self, current: i64, amount: i64) -> i64 {
        match self {
            ChangeMode::Add => current.saturating_add(amount),
            ChangeMode::Subtract => current.saturating_sub(amount),
            ChangeMode::Set => amount,
        }
    }
}

impl fmt::Display for ChangeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChangeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "+" | "add" | "gain" => Ok(ChangeMode::Add),
            "-" | "subtract" | "lose" => Ok(ChangeMode::Subtract),
            "=" | "set" => Ok(ChangeMode::Set),
            other => Err(format!("Unknown change mode '{}'", other)),
        }
    }
}
