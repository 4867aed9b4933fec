//! Crafting recipes

use serde::{Deserialize, Serialize};

use crate::entity::inventory::Item;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecipeId {
    Tools,
    Spear,
    Sword,
    Medicine,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Recipe {
    pub ingredients: &'static [(Item, u32)],
    pub output: (Item, u32),
    /// Technology the crafter's culture must know
    pub technology: Option<&'static str>,
    /// Minimum crafting skill
    pub min_skill: f32,
}

impl RecipeId {
    pub fn recipe(&self) -> Recipe {
        match self {
            RecipeId::Tools => Recipe {
                ingredients: &[(Item::Wood, 1), (Item::Iron, 1)],
                output: (Item::Tools, 1),
                technology: Some("toolmaking"),
                min_skill: 0.0,
            },
            RecipeId::Spear => Recipe {
                ingredients: &[(Item::Wood, 2), (Item::Stone, 1)],
                output: (Item::Spear, 1),
                technology: None,
                min_skill: 0.0,
            },
            RecipeId::Sword => Recipe {
                ingredients: &[(Item::Iron, 3), (Item::Wood, 1)],
                output: (Item::Sword, 1),
                technology: Some("metallurgy"),
                min_skill: 1.0,
            },
            RecipeId::Medicine => Recipe {
                ingredients: &[(Item::Herbs, 2)],
                output: (Item::Medicine, 1),
                technology: Some("medicine"),
                min_skill: 0.5,
            },
        }
    }
}
