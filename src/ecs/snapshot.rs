//! Whole-world persistence as a single JSON document

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::actions::catalog::ActionCatalog;
use crate::core::error::{CivError, Result};
use crate::core::types::Tick;
use crate::ecs::store::EntityStore;
use crate::ecs::world::{Environment, World};
use crate::entity::agent::Agent;
use crate::entity::place::Place;
use crate::simulation::conversation::Conversations;
use crate::society::culture::{Culture, Religion};
use crate::society::economy::Transaction;
use crate::society::government::{Election, Government};
use crate::society::technology::TechTree;

/// Top-level keys a snapshot must carry
pub const REQUIRED_KEYS: [&str; 8] = [
    "environment",
    "agents",
    "entities",
    "actions",
    "cultures",
    "religions",
    "government",
    "tech_tree",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdCounters {
    pub next_entity: u64,
    pub next_culture: u32,
    pub next_religion: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub tick: Tick,
    pub environment: Environment,
    pub agents: Vec<Agent>,
    pub entities: Vec<Place>,
    pub actions: ActionCatalog,
    pub cultures: Vec<Culture>,
    pub religions: Vec<Religion>,
    pub government: Government,
    pub tech_tree: TechTree,
    #[serde(default)]
    pub election: Option<Election>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub conversations: Conversations,
    #[serde(default)]
    pub counters: IdCounters,
}

impl Snapshot {
    pub fn capture(world: &World) -> Self {
        let (next_entity, next_culture, next_religion) = world.store.id_counters();
        Self {
            tick: world.current_tick,
            environment: world.environment.clone(),
            agents: world.store.agents().cloned().collect(),
            entities: world.store.places().cloned().collect(),
            actions: world.catalog.clone(),
            cultures: world.store.cultures().cloned().collect(),
            religions: world.store.religions().cloned().collect(),
            government: world.government.clone(),
            tech_tree: world.tech_tree.clone(),
            election: world.election.clone(),
            transactions: world.transactions.clone(),
            conversations: world.conversations.clone(),
            counters: IdCounters { next_entity, next_culture, next_religion },
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse and validate. Missing required keys or bad values are
    /// reported as `MalformedSnapshot`.
    pub fn from_json(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text).map_err(|e| CivError::MalformedSnapshot(e.to_string()))?;
        let object = value
            .as_object()
            .ok_or_else(|| CivError::MalformedSnapshot("top level is not an object".to_string()))?;
        if let Some(missing) = REQUIRED_KEYS.iter().find(|key| !object.contains_key(**key)) {
            return Err(CivError::MalformedSnapshot(format!("missing key `{}`", missing)));
        }
        serde_json::from_value(value).map_err(|e| CivError::MalformedSnapshot(e.to_string()))
    }

    /// Build a fresh world. Fails without side effects on inconsistent data.
    pub fn into_world(self) -> Result<World> {
        let mut store = EntityStore::from_parts(self.agents, self.entities, self.cultures, self.religions)?;
        let counters = self.counters;
        store.restore_counters(counters.next_entity, counters.next_culture, counters.next_religion);
        store.check_integrity()?;

        Ok(World {
            current_tick: self.tick,
            environment: self.environment,
            store,
            catalog: self.actions,
            government: self.government,
            election: self.election,
            tech_tree: self.tech_tree,
            transactions: self.transactions,
            conversations: self.conversations,
        })
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }
}

impl World {
    /// Replace this world with the snapshot's. On error the current state is kept.
    pub fn restore(&mut self, snapshot: Snapshot) -> Result<()> {
        *self = snapshot.into_world()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SimConfig;
    use crate::core::random::SeededRandom;
    use crate::core::types::GridPos;
    use std::collections::BTreeMap;

    fn sample_world() -> World {
        let config = SimConfig::default();
        let mut world = World::settlement(&config, 4, &mut SeededRandom::new(3));
        let culture = world.store.create_culture("Riverfolk", BTreeMap::new());
        let first = world.store.agent_ids()[0];
        world.store.set_culture(first, Some(culture)).unwrap();
        world.current_tick = 12;
        world
    }

    #[test]
    fn test_round_trip_is_lossless() {
        let world = sample_world();
        let json = Snapshot::capture(&world).to_json().unwrap();
        let restored = Snapshot::from_json(&json).unwrap().into_world().unwrap();
        assert_eq!(Snapshot::capture(&restored).to_json().unwrap(), json);
        assert_eq!(restored.current_tick, 12);
    }

    #[test]
    fn test_missing_key_is_malformed() {
        let world = sample_world();
        let mut value = serde_json::to_value(Snapshot::capture(&world)).unwrap();
        value.as_object_mut().unwrap().remove("tech_tree");
        let err = Snapshot::from_json(&value.to_string()).unwrap_err();
        assert!(matches!(err, CivError::MalformedSnapshot(msg) if msg.contains("tech_tree")));
    }

    #[test]
    fn test_failed_restore_keeps_state() {
        let mut world = sample_world();
        let mut snapshot = Snapshot::capture(&world);
        snapshot.cultures.clear();
        assert!(world.restore(snapshot).is_err());
        assert_eq!(world.current_tick, 12);
        assert_eq!(world.store.cultures().count(), 1);
    }

    #[test]
    fn test_counters_survive_restore() {
        let mut world = sample_world();
        let json = Snapshot::capture(&world).to_json().unwrap();
        world.restore(Snapshot::from_json(&json).unwrap()).unwrap();
        let before = world.store.agent_ids().into_iter().max().unwrap();
        let id = world.spawn_agent("Newcomer", GridPos::new(0, 0), &SimConfig::default());
        assert!(id > before);
    }
}
