//! Everything an action procedure may read or write

use crate::core::config::SimConfig;
use crate::core::random::RandomSource;
use crate::core::types::Tick;
use crate::ecs::store::EntityStore;
use crate::ecs::world::Environment;
use crate::society::economy::PriceTable;
use crate::society::government::{Election, Government};
use crate::society::technology::TechTree;

/// Read-only world state visible to actions
#[derive(Clone, Copy)]
pub struct WorldFacts<'a> {
    pub tick: Tick,
    pub environment: &'a Environment,
    pub government: &'a Government,
    pub election: Option<&'a Election>,
    pub tech_tree: &'a TechTree,
    pub prices: &'a PriceTable,
}

/// Actions mutate the store only for the actor and entities they resolve
/// themselves; structural changes go out as side effects.
pub struct ActionContext<'a> {
    pub store: &'a mut EntityStore,
    pub facts: WorldFacts<'a>,
    pub rng: &'a mut dyn RandomSource,
    pub config: &'a SimConfig,
}
