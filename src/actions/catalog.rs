//! Action definitions and catalog

use serde::{Deserialize, Serialize};

use crate::actions::recipes::RecipeId;
use crate::core::types::Direction;
use crate::entity::agent::beliefs;
use crate::entity::inventory::Item;
use crate::society::government::{Government, Offense};

/// Built-in behavior an action runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionEffect {
    Move(Direction),
    Rest,
    Eat,
    Drink,
    TakeMedicine,
    Gather(Item),
    Craft(RecipeId),
    BuildHouse,
    FoundBusiness,
    Work,
    ListItem,
    BuyItem,
    Talk,
    Fight,
    Steal,
    ProposeMarriage,
    Reproduce,
    Vote,
    RunForOffice,
    ProposeLaw,
    Research,
    InventTechnology,
    Pray,
    JoinCulture,
    JoinReligion,
    FoundCulture,
    FoundReligion,
    /// Admin-defined action with no mechanical effect
    Narrative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionCategory {
    Movement,
    Survival,
    Work,
    Economic,
    Social,
    Family,
    Political,
    Faith,
    Narrative,
}

impl ActionEffect {
    pub fn category(&self) -> ActionCategory {
        match self {
            ActionEffect::Move(_) => ActionCategory::Movement,
            ActionEffect::Rest | ActionEffect::Eat | ActionEffect::Drink | ActionEffect::TakeMedicine => {
                ActionCategory::Survival
            }
            ActionEffect::Gather(_) | ActionEffect::Craft(_) | ActionEffect::BuildHouse => ActionCategory::Work,
            ActionEffect::FoundBusiness | ActionEffect::Work | ActionEffect::ListItem | ActionEffect::BuyItem => {
                ActionCategory::Economic
            }
            ActionEffect::Talk | ActionEffect::Fight | ActionEffect::Steal => ActionCategory::Social,
            ActionEffect::ProposeMarriage | ActionEffect::Reproduce => ActionCategory::Family,
            ActionEffect::Vote | ActionEffect::RunForOffice | ActionEffect::ProposeLaw => ActionCategory::Political,
            ActionEffect::Research
            | ActionEffect::InventTechnology
            | ActionEffect::Pray
            | ActionEffect::JoinCulture
            | ActionEffect::JoinReligion
            | ActionEffect::FoundCulture
            | ActionEffect::FoundReligion => ActionCategory::Faith,
            ActionEffect::Narrative => ActionCategory::Narrative,
        }
    }

    /// Offense committed by performing this action, if any
    pub fn offense(&self) -> Option<Offense> {
        match self {
            ActionEffect::Fight => Some(Offense::Fighting),
            ActionEffect::Steal => Some(Offense::Stealing),
            _ => None,
        }
    }
}

pub struct ActionAvailability {
    pub available: bool,
    pub reason: Option<String>,
}

impl ActionAvailability {
    pub fn yes() -> Self {
        Self { available: true, reason: None }
    }

    pub fn no(reason: impl Into<String>) -> Self {
        Self { available: false, reason: Some(reason.into()) }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    pub name: String,
    pub description: String,
    /// Belief that weights this action during selection
    pub belief_key: Option<String>,
    pub effect: ActionEffect,
}

impl Action {
    pub fn new(name: &str, description: &str, belief_key: Option<&str>, effect: ActionEffect) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            belief_key: belief_key.map(str::to_string),
            effect,
        }
    }

    /// Legality is derived from the laws in force, never stored
    pub fn legality(&self, government: &Government) -> ActionAvailability {
        match self.effect.offense().and_then(|o| government.law_against(o)) {
            Some(law) => ActionAvailability::no(format!("forbidden by {}", law.name)),
            None => ActionAvailability::yes(),
        }
    }

    pub fn to_def(&self) -> ActionDef {
        ActionDef {
            name: self.name.clone(),
            description: self.description.clone(),
            belief_key: self.belief_key.clone(),
        }
    }
}

/// Persisted form of an action; behavior is re-bound by name on load
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDef {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub belief_key: Option<String>,
}

impl ActionDef {
    /// Bind to a built-in effect of the same name, or a narrative effect
    pub fn bind(self) -> Action {
        let effect = builtin_actions()
            .into_iter()
            .find(|a| a.name.eq_ignore_ascii_case(&self.name))
            .map(|a| a.effect)
            .unwrap_or(ActionEffect::Narrative);
        Action { name: self.name, description: self.description, belief_key: self.belief_key, effect }
    }
}

fn builtin_actions() -> Vec<Action> {
    use ActionEffect as E;
    vec![
        Action::new("Move North", "Walk one step north", None, E::Move(Direction::North)),
        Action::new("Move South", "Walk one step south", None, E::Move(Direction::South)),
        Action::new("Move East", "Walk one step east", None, E::Move(Direction::East)),
        Action::new("Move West", "Walk one step west", None, E::Move(Direction::West)),
        Action::new("Rest", "Sit down and recover strength", Some(beliefs::SURVIVAL), E::Rest),
        Action::new("Eat Food", "Eat a ration of food from the pack", Some(beliefs::SURVIVAL), E::Eat),
        Action::new("Drink Water", "Drink carried water or from a nearby well", Some(beliefs::SURVIVAL), E::Drink),
        Action::new("Take Medicine", "Swallow a dose of medicine", Some(beliefs::SURVIVAL), E::TakeMedicine),
        Action::new("Gather Food", "Harvest food from a nearby field", Some(beliefs::SURVIVAL), E::Gather(Item::Food)),
        Action::new("Gather Wood", "Chop wood in a nearby forest", Some(beliefs::CRAFT), E::Gather(Item::Wood)),
        Action::new("Mine Iron", "Dig iron ore from a nearby mine", Some(beliefs::WEALTH), E::Gather(Item::Iron)),
        Action::new("Quarry Stone", "Cut stone from a nearby quarry", Some(beliefs::CRAFT), E::Gather(Item::Stone)),
        Action::new("Forage Herbs", "Pick herbs from a nearby meadow", Some(beliefs::KNOWLEDGE), E::Gather(Item::Herbs)),
        Action::new("Craft Tools", "Fashion tools from wood and iron", Some(beliefs::CRAFT), E::Craft(RecipeId::Tools)),
        Action::new("Craft Spear", "Fashion a spear from wood and stone", Some(beliefs::VIOLENCE), E::Craft(RecipeId::Spear)),
        Action::new("Forge Sword", "Forge a sword from iron", Some(beliefs::VIOLENCE), E::Craft(RecipeId::Sword)),
        Action::new("Brew Medicine", "Brew medicine from herbs", Some(beliefs::KNOWLEDGE), E::Craft(RecipeId::Medicine)),
        Action::new("Build House", "Build a house from wood and stone", Some(beliefs::FAMILY), E::BuildHouse),
        Action::new("Found Business", "Buy up a nearby resource site", Some(beliefs::WEALTH), E::FoundBusiness),
        Action::new("Work", "Work someone else's site for a wage", Some(beliefs::WEALTH), E::Work),
        Action::new("Sell Goods", "List goods at a nearby marketplace", Some(beliefs::WEALTH), E::ListItem),
        Action::new("Buy Goods", "Buy goods at a nearby marketplace", Some(beliefs::WEALTH), E::BuyItem),
        Action::new("Talk", "Chat with someone nearby", Some(beliefs::COMMUNITY), E::Talk),
        Action::new("Fight", "Attack someone nearby", Some(beliefs::VIOLENCE), E::Fight),
        Action::new("Steal", "Take something from someone nearby", Some(beliefs::WEALTH), E::Steal),
        Action::new("Propose Marriage", "Ask a close companion to marry", Some(beliefs::FAMILY), E::ProposeMarriage),
        Action::new("Reproduce", "Try for a child with your spouse", Some(beliefs::FAMILY), E::Reproduce),
        Action::new("Vote", "Vote in the current election", Some(beliefs::POWER), E::Vote),
        Action::new("Run for Office", "Stand as a candidate in the current election", Some(beliefs::POWER), E::RunForOffice),
        Action::new("Propose Law", "Put a new law to the community", Some(beliefs::POWER), E::ProposeLaw),
        Action::new("Research", "Study to advance your culture's knowledge", Some(beliefs::KNOWLEDGE), E::Research),
        Action::new("Invent Technology", "Turn research into a new technology", Some(beliefs::KNOWLEDGE), E::InventTechnology),
        Action::new("Pray", "Pray to your gods", Some(beliefs::FAITH), E::Pray),
        Action::new("Join Culture", "Adopt the culture of someone nearby", Some(beliefs::COMMUNITY), E::JoinCulture),
        Action::new("Join Religion", "Convert to the faith of someone nearby", Some(beliefs::FAITH), E::JoinReligion),
        Action::new("Found Culture", "Found a new culture", Some(beliefs::POWER), E::FoundCulture),
        Action::new("Found Religion", "Found a new religion", Some(beliefs::FAITH), E::FoundReligion),
    ]
}

/// Ordered, name-addressed set of actions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<ActionDef>", into = "Vec<ActionDef>")]
pub struct ActionCatalog {
    actions: Vec<Action>,
}

impl Default for ActionCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ActionCatalog {
    pub fn builtin() -> Self {
        Self { actions: builtin_actions() }
    }

    pub fn empty() -> Self {
        Self { actions: Vec::new() }
    }

    /// Case-insensitive exact lookup
    pub fn get(&self, name: &str) -> Option<&Action> {
        let name = name.trim();
        self.actions.iter().find(|a| a.name.eq_ignore_ascii_case(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Action> {
        self.actions.iter()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.actions.iter().map(|a| a.name.as_str()).collect()
    }

    /// Add or replace by name
    pub fn add(&mut self, def: ActionDef) {
        let action = def.bind();
        match self.actions.iter_mut().find(|a| a.name.eq_ignore_ascii_case(&action.name)) {
            Some(existing) => *existing = action,
            None => self.actions.push(action),
        }
    }

    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.actions.len();
        self.actions.retain(|a| !a.name.eq_ignore_ascii_case(name));
        self.actions.len() != before
    }
}

impl From<Vec<ActionDef>> for ActionCatalog {
    fn from(defs: Vec<ActionDef>) -> Self {
        let mut catalog = Self::empty();
        for def in defs {
            catalog.add(def);
        }
        catalog
    }
}

impl From<ActionCatalog> for Vec<ActionDef> {
    fn from(catalog: ActionCatalog) -> Self {
        catalog.actions.iter().map(Action::to_def).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::society::government::Law;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let catalog = ActionCatalog::builtin();
        let action = catalog.get("move west").unwrap();
        assert_eq!(action.effect, ActionEffect::Move(Direction::West));
        assert!(catalog.get("Dance").is_none());
    }

    #[test]
    fn test_builtin_names_unique() {
        let catalog = ActionCatalog::builtin();
        let mut names: Vec<String> = catalog.names().iter().map(|n| n.to_lowercase()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), catalog.len());
    }

    #[test]
    fn test_legality_follows_laws() {
        let catalog = ActionCatalog::builtin();
        let fight = catalog.get("Fight").unwrap();
        let mut government = Government::default();
        assert!(fight.legality(&government).available);

        government.enact(Law::against(Offense::Fighting, 10));
        assert!(!fight.legality(&government).available);
        assert!(catalog.get("Talk").unwrap().legality(&government).available);
    }

    #[test]
    fn test_defs_rebind_to_builtin_effects() {
        let catalog = ActionCatalog::builtin();
        let defs: Vec<ActionDef> = catalog.clone().into();
        let restored = ActionCatalog::from(defs);
        assert_eq!(restored, catalog);
    }

    #[test]
    fn test_unknown_def_is_narrative() {
        let mut catalog = ActionCatalog::empty();
        catalog.add(ActionDef { name: "Dance".into(), description: "Dance wildly".into(), belief_key: None });
        assert_eq!(catalog.get("dance").unwrap().effect, ActionEffect::Narrative);
        assert!(catalog.remove("Dance"));
        assert!(catalog.is_empty());
    }
}
