//! Host Collaborators
//!
//! The engines never own party inventory, game variables or switches. The
//! host game implements these traits and passes itself into each operation.

use std::collections::HashMap;
use serde::{Deserialize, Serialize};

/// Kinds of inventory entries a quest can track or reward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Item,
    Weapon,
    Armor,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Item => "item",
            ItemKind::Weapon => "weapon",
            ItemKind::Armor => "armor",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "item" | "items" => Some(ItemKind::Item),
            "weapon" | "weapons" => Some(ItemKind::Weapon),
            "armor" | "armors" | "armour" => Some(ItemKind::Armor),
            _ => None,
        }
    }
}

/// Reference to one inventory entry in the host database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemRef {
    pub kind: ItemKind,
    pub id: u32,
}

impl ItemRef {
    pub fn new(kind: ItemKind, id: u32) -> Self {
        Self { kind, id }
    }

    pub fn item(id: u32) -> Self {
        Self::new(ItemKind::Item, id)
    }

    pub fn weapon(id: u32) -> Self {
        Self::new(ItemKind::Weapon, id)
    }

    pub fn armor(id: u32) -> Self {
        Self::new(ItemKind::Armor, id)
    }
}

/// Shared party currency, inventory and experience
pub trait Party {
    fn gold(&self) -> i64;
    fn gain_gold(&mut self, amount: i64);
    fn item_count(&self, item: ItemRef) -> i64;
    fn gain_item(&mut self, item: ItemRef, amount: i64);
    /// Give the same experience to every active party member
    fn gain_exp_all(&mut self, amount: i64);
}

/// Numeric game variables
pub trait Variables {
    fn variable(&self, id: u32) -> i64;
    fn set_variable(&mut self, id: u32, value: i64);
}

/// Boolean game switches
pub trait Switches {
    fn switch(&self, id: u32) -> bool;
    fn set_switch(&mut self, id: u32, on: bool);
}

/// Actor names, used when a reputation is linked to an actor
pub trait Actors {
    fn actor_name(&self, actor_id: u32) -> Option<String>;
}

/// Everything an engine operation may touch on the host
pub trait GameHost: Party + Variables + Switches + Actors {}

impl<T: Party + Variables + Switches + Actors> GameHost for T {}

/// A party member as tracked by [`MemoryHost`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartyMember {
    pub actor_id: u32,
    pub name: String,
    pub exp: i64,
}

/// In-memory host used by the driver binary and tests
#[derive(Debug, Clone, Default)]
pub struct MemoryHost {
    pub gold: i64,
    pub items: HashMap<ItemRef, i64>,
    pub variables: HashMap<u32, i64>,
    pub switches: HashMap<u32, bool>,
    pub members: Vec<PartyMember>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_member(mut self, actor_id: u32, name: &str) -> Self {
        self.members.push(PartyMember {
            actor_id,
            name: name.to_string(),
            exp: 0,
        });
        self
    }

    pub fn member(&self, actor_id: u32) -> Option<&PartyMember> {
        self.members.iter().find(|m| m.actor_id == actor_id)
    }
}

impl Party for MemoryHost {
    fn gold(&self) -> i64 {
        self.gold
    }

    fn gain_gold(&mut self, amount: i64) {
        self.gold = (self.gold + amount).max(0);
    }

    fn item_count(&self, item: ItemRef) -> i64 {
        self.items.get(&item).copied().unwrap_or(0)
    }

    fn gain_item(&mut self, item: ItemRef, amount: i64) {
        let count = self.items.entry(item).or_insert(0);
        *count = (*count + amount).max(0);
    }

    fn gain_exp_all(&mut self, amount: i64) {
        for member in &mut self.members {
            member.exp += amount;
        }
    }
}

impl Variables for MemoryHost {
    fn variable(&self, id: u32) -> i64 {
        self.variables.get(&id).copied().unwrap_or(0)
    }

    fn set_variable(&mut self, id: u32, value: i64) {
        self.variables.insert(id, value);
    }
}

impl Switches for MemoryHost {
    fn switch(&self, id: u32) -> bool {
        self.switches.get(&id).copied().unwrap_or(false)
    }

    fn set_switch(&mut self, id: u32, on: bool) {
        self.switches.insert(id, on);
    }
}

impl Actors for MemoryHost {
    fn actor_name(&self, actor_id: u32) -> Option<String> {
        self.member(actor_id).map(|m| m.name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_kind_parsing() {
        assert_eq!(ItemKind::from_str("Weapon"), Some(ItemKind::Weapon));
        assert_eq!(ItemKind::from_str("armour"), Some(ItemKind::Armor));
        assert_eq!(ItemKind::from_str("gold"), None);
    }

    #[test]
    fn test_memory_host_inventory_floors_at_zero() {
        let mut host = MemoryHost::new();
        host.gain_item(ItemRef::item(3), 2);
        host.gain_item(ItemRef::item(3), -5);
        assert_eq!(host.item_count(ItemRef::item(3)), 0);
        assert_eq!(host.item_count(ItemRef::weapon(3)), 0);

        host.gain_gold(10);
        host.gain_gold(-25);
        assert_eq!(host.gold(), 0);
    }

    #[test]
    fn test_memory_host_exp_to_every_member() {
        let mut host = MemoryHost::new().with_member(1, "Reid").with_member(2, "Priscilla");
        host.gain_exp_all(40);
        assert!(host.members.iter().all(|m| m.exp == 40));
        assert_eq!(host.actor_name(2).as_deref(), Some("Priscilla"));
        assert_eq!(host.actor_name(9), None);
    }
}
