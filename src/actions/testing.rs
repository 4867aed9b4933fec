//! Test fixture for running single actions against a small store

use crate::actions::catalog::ActionEffect;
use crate::actions::context::{ActionContext, WorldFacts};
use crate::actions::outcome::ActionOutcome;
use crate::core::config::SimConfig;
use crate::core::random::ScriptedRandom;
use crate::core::types::{EntityId, GridPos, Tick};
use crate::ecs::store::EntityStore;
use crate::ecs::world::Environment;
use crate::entity::agent::Agent;
use crate::entity::place::Place;
use crate::society::economy::PriceTable;
use crate::society::government::{Election, Government};
use crate::society::technology::TechTree;

pub(crate) struct Fixture {
    pub store: EntityStore,
    pub environment: Environment,
    pub government: Government,
    pub election: Option<Election>,
    pub tech_tree: TechTree,
    pub prices: PriceTable,
    pub rng: ScriptedRandom,
    pub config: SimConfig,
    pub tick: Tick,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            store: EntityStore::new(),
            environment: Environment::new("Test Valley", 10, 10),
            government: Government::default(),
            election: None,
            tech_tree: TechTree::default(),
            prices: PriceTable::default(),
            rng: ScriptedRandom::constant(0.5),
            config: SimConfig::default(),
            tick: 1,
        }
    }

    pub fn agent(&mut self, name: &str, position: GridPos) -> EntityId {
        let id = self.store.allocate_id();
        self.store.put_agent(Agent::new(id, name, position, &self.config))
    }

    pub fn place(&mut self, name: &str, position: GridPos, build: impl FnOnce(Place) -> Place) -> EntityId {
        let id = self.store.allocate_id();
        self.store.put_place(build(Place::new(id, name, position)))
    }

    pub fn script(&mut self, values: impl IntoIterator<Item = f32>) {
        self.rng = ScriptedRandom::new(values);
    }

    pub fn run(&mut self, actor: EntityId, effect: ActionEffect) -> ActionOutcome {
        let mut ctx = ActionContext {
            store: &mut self.store,
            facts: WorldFacts {
                tick: self.tick,
                environment: &self.environment,
                government: &self.government,
                election: self.election.as_ref(),
                tech_tree: &self.tech_tree,
                prices: &self.prices,
            },
            rng: &mut self.rng,
            config: &self.config,
        };
        effect.execute(actor, &mut ctx)
    }
}
