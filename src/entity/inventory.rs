//! Items, inventories and skills

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Item {
    Food,
    Water,
    Wood,
    Iron,
    Stone,
    Herbs,
    Tools,
    Spear,
    Sword,
    Medicine,
}

impl Item {
    pub fn name(&self) -> &'static str {
        match self {
            Item::Food => "food",
            Item::Water => "water",
            Item::Wood => "wood",
            Item::Iron => "iron",
            Item::Stone => "stone",
            Item::Herbs => "herbs",
            Item::Tools => "tools",
            Item::Spear => "spear",
            Item::Sword => "sword",
            Item::Medicine => "medicine",
        }
    }

    /// Price before demand is applied
    pub fn base_price(&self) -> i64 {
        match self {
            Item::Food | Item::Water => 2,
            Item::Wood | Item::Stone | Item::Herbs => 3,
            Item::Iron => 5,
            Item::Medicine => 8,
            Item::Tools | Item::Spear => 12,
            Item::Sword => 25,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inventory {
    items: BTreeMap<Item, u32>,
}

impl Inventory {
    pub fn count(&self, item: Item) -> u32 {
        self.items.get(&item).copied().unwrap_or(0)
    }

    pub fn add(&mut self, item: Item, quantity: u32) {
        if quantity > 0 {
            *self.items.entry(item).or_insert(0) += quantity;
        }
    }

    /// Remove `quantity` of `item`; nothing is removed when short
    pub fn remove(&mut self, item: Item, quantity: u32) -> bool {
        self.remove_all(&[(item, quantity)])
    }

    pub fn has_all(&self, wanted: &[(Item, u32)]) -> bool {
        let mut needed: BTreeMap<Item, u32> = BTreeMap::new();
        for (item, quantity) in wanted {
            *needed.entry(*item).or_insert(0) += quantity;
        }
        needed.iter().all(|(item, quantity)| self.count(*item) >= *quantity)
    }

    /// All-or-nothing removal of every `(item, quantity)` pair
    pub fn remove_all(&mut self, wanted: &[(Item, u32)]) -> bool {
        if !self.has_all(wanted) {
            return false;
        }
        for (item, quantity) in wanted {
            if let Some(held) = self.items.get_mut(item) {
                *held -= quantity;
                if *held == 0 {
                    self.items.remove(item);
                }
            }
        }
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Item, &u32)> {
        self.items.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Item held in the largest quantity, ties to the first in item order
    pub fn most_plentiful(&self) -> Option<Item> {
        self.items
            .iter()
            .filter(|(_, count)| **count > 0)
            .fold(None, |best: Option<(Item, u32)>, (item, count)| match best {
                Some((_, top)) if top >= *count => best,
                _ => Some((*item, *count)),
            })
            .map(|(item, _)| item)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Skill {
    Farming,
    Woodcutting,
    Mining,
    Foraging,
    Crafting,
    Combat,
    Stealth,
    Trading,
    Research,
    Leadership,
}

/// Skill levels; levels only go up
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Skills {
    levels: BTreeMap<Skill, f32>,
}

impl Skills {
    pub fn level(&self, skill: Skill) -> f32 {
        self.levels.get(&skill).copied().unwrap_or(0.0)
    }

    pub fn raise(&mut self, skill: Skill, amount: f32) {
        if amount > 0.0 {
            *self.levels.entry(skill).or_insert(0.0) += amount;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Skill, &f32)> {
        self.levels.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_all_is_atomic() {
        let mut inv = Inventory::default();
        inv.add(Item::Wood, 3);
        inv.add(Item::Iron, 1);

        assert!(!inv.remove_all(&[(Item::Wood, 2), (Item::Iron, 2)]));
        assert_eq!(inv.count(Item::Wood), 3);
        assert_eq!(inv.count(Item::Iron), 1);

        assert!(inv.remove_all(&[(Item::Wood, 2), (Item::Iron, 1)]));
        assert_eq!(inv.count(Item::Wood), 1);
        assert_eq!(inv.count(Item::Iron), 0);
    }

    #[test]
    fn test_duplicate_ingredients_are_summed() {
        let mut inv = Inventory::default();
        inv.add(Item::Wood, 3);
        assert!(!inv.has_all(&[(Item::Wood, 2), (Item::Wood, 2)]));
    }

    #[test]
    fn test_skills_never_decrease() {
        let mut skills = Skills::default();
        skills.raise(Skill::Mining, 0.3);
        skills.raise(Skill::Mining, -1.0);
        assert!((skills.level(Skill::Mining) - 0.3).abs() < 1e-6);
    }
}
