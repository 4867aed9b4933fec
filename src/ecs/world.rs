//! World - the store plus everything that is shared rather than owned by an entity

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::actions::catalog::ActionCatalog;
use crate::actions::context::WorldFacts;
use crate::actions::effects::GUARD_ROLE;
use crate::core::config::SimConfig;
use crate::core::random::RandomSource;
use crate::core::types::{EntityId, GridPos, Tick};
use crate::ecs::store::EntityStore;
use crate::entity::agent::{beliefs, Agent};
use crate::entity::genome::Gene;
use crate::entity::inventory::Item;
use crate::entity::place::{Place, PlaceRole};
use crate::entity::psyche::Personality;
use crate::simulation::conversation::Conversations;
use crate::society::economy::{PriceTable, Transaction};
use crate::society::government::{Election, Government};
use crate::society::technology::TechTree;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub width: i32,
    pub height: i32,
}

impl Environment {
    pub fn new(name: impl Into<String>, width: i32, height: i32) -> Self {
        Self { name: name.into(), description: String::new(), width: width.max(1), height: height.max(1) }
    }

    pub fn contains(&self, pos: GridPos) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }
}

/// The game world containing all entities
#[derive(Debug, Clone)]
pub struct World {
    pub current_tick: Tick,
    pub environment: Environment,
    pub store: EntityStore,
    pub catalog: ActionCatalog,
    pub government: Government,
    pub election: Option<Election>,
    pub tech_tree: TechTree,
    pub transactions: Vec<Transaction>,
    pub conversations: Conversations,
}

impl World {
    pub fn new(environment: Environment) -> Self {
        Self {
            current_tick: 0,
            environment,
            store: EntityStore::new(),
            catalog: ActionCatalog::builtin(),
            government: Government::default(),
            election: None,
            tech_tree: TechTree::default(),
            transactions: Vec::new(),
            conversations: Conversations::default(),
        }
    }

    pub fn spawn_agent(&mut self, name: impl Into<String>, position: GridPos, config: &SimConfig) -> EntityId {
        let id = self.store.allocate_id();
        let position = position.clamped(self.environment.width, self.environment.height);
        self.store.put_agent(Agent::new(id, name, position, config))
    }

    pub fn spawn_place(&mut self, name: impl Into<String>, position: GridPos, build: impl FnOnce(Place) -> Place) -> EntityId {
        let id = self.store.allocate_id();
        let position = position.clamped(self.environment.width, self.environment.height);
        self.store.put_place(build(Place::new(id, name, position)))
    }

    /// Delete an agent along with every shared reference to it
    pub fn remove_agent(&mut self, id: EntityId) -> Option<Agent> {
        let agent = self.store.remove_agent(id)?;
        if let Some(other) = self.conversations.involving(id).map(|c| c.other(id)) {
            self.conversations.end(id, other);
        }
        if let Some(election) = self.election.as_mut() {
            election.withdraw(id);
        }
        if self.government.leader == Some(id) {
            self.government.leader = None;
        }
        Some(agent)
    }

    /// Resize the grid, pulling agents and places back inside it
    pub fn resize(&mut self, width: i32, height: i32) {
        self.environment.width = width.max(1);
        self.environment.height = height.max(1);
        let (w, h) = (self.environment.width, self.environment.height);
        for agent in self.store.agents_mut() {
            agent.position = agent.position.clamped(w, h);
        }
        for place in self.store.places_mut() {
            place.position = place.position.clamped(w, h);
        }
    }

    pub fn agent_count(&self) -> usize {
        self.store.agent_count()
    }

    pub fn price_table(&self, config: &SimConfig) -> PriceTable {
        PriceTable::from_history(&self.transactions, config)
    }

    /// Borrow the store mutably alongside read-only facts about everything else
    pub fn split_for_action<'w>(&'w mut self, prices: &'w PriceTable) -> (&'w mut EntityStore, WorldFacts<'w>) {
        let facts = WorldFacts {
            tick: self.current_tick,
            environment: &self.environment,
            government: &self.government,
            election: self.election.as_ref(),
            tech_tree: &self.tech_tree,
            prices,
        };
        (&mut self.store, facts)
    }

    /// Open an election that resolves `duration` ticks from now
    pub fn start_election(&mut self, duration: u64) -> bool {
        if self.election.as_ref().map_or(false, |e| e.active) {
            return false;
        }
        self.election = Some(Election::open(self.current_tick + duration.max(1)));
        true
    }

    /// A small village with one of each resource site, a market, a jail and `agents` settlers
    pub fn settlement(config: &SimConfig, agents: usize, rng: &mut dyn RandomSource) -> Self {
        let mut world = World::new(Environment::new("Riverbend", 20, 20));
        world.environment.description = "A river valley with fields, woods and hills".to_string();

        world.spawn_place("Well", GridPos::new(10, 10), |p| p.with_resource(Item::Water, 500));
        world.spawn_place("Wheat Field", GridPos::new(6, 12), |p| p.with_resource(Item::Food, 300));
        world.spawn_place("Oak Wood", GridPos::new(3, 4), |p| p.with_resource(Item::Wood, 200));
        world.spawn_place("Iron Mine", GridPos::new(16, 3), |p| p.with_resource(Item::Iron, 120));
        world.spawn_place("Quarry", GridPos::new(17, 15), |p| p.with_resource(Item::Stone, 150));
        world.spawn_place("Meadow", GridPos::new(4, 16), |p| p.with_resource(Item::Herbs, 100));
        world.spawn_place("Market Square", GridPos::new(11, 9), |p| {
            p.with_role(PlaceRole::Marketplace { listings: Vec::new() })
        });
        world.spawn_place("Stockade", GridPos::new(13, 12), |p| p.with_role(PlaceRole::Jail { inmates: Vec::new() }));

        for i in 0..agents {
            let name = SETTLER_NAMES
                .get(i)
                .map(|n| n.to_string())
                .unwrap_or_else(|| format!("Settler {}", i + 1));
            let position = GridPos::new(
                rng.below(world.environment.width as usize) as i32,
                rng.below(world.environment.height as usize) as i32,
            );
            let id = world.spawn_agent(name, position, config);
            if let Some(agent) = world.store.agent_mut(id) {
                agent.personality = Personality::new(
                    rng.next_f32(),
                    rng.next_f32(),
                    rng.next_f32(),
                    rng.next_f32(),
                    rng.next_f32(),
                );
                agent.age = rng.range_f32(16.0, 50.0).round();
                for key in beliefs::ALL {
                    agent.beliefs.insert(key.to_string(), rng.range_f32(0.2, 0.8));
                }
                if rng.chance(0.3) {
                    agent.genome.insert(Gene::ALL[rng.below(Gene::ALL.len())]);
                }
                agent.inventory.add(Item::Food, 2);
                agent.inventory.add(Item::Water, 2);
                if i == 0 {
                    agent.role = Some(GUARD_ROLE.to_string());
                }
            }
        }
        world
    }
}

const SETTLER_NAMES: [&str; 12] = [
    "Aldric", "Brenna", "Cedric", "Daria", "Edmund", "Freya", "Gareth", "Helena", "Ivo", "Jora", "Kestrel", "Linnea",
];

/// Entity counts for status displays
pub fn census(world: &World) -> BTreeMap<&'static str, usize> {
    let mut counts = BTreeMap::new();
    counts.insert("agents", world.store.agent_count());
    counts.insert("living", world.store.living_count());
    counts.insert("places", world.store.places().count());
    counts.insert("cultures", world.store.cultures().count());
    counts.insert("religions", world.store.religions().count());
    counts.insert("conversations", world.conversations.len());
    counts
}
