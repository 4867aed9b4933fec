//! Slow, world-level processes: prison terms, elections and shared culture

use std::collections::BTreeMap;

use crate::core::types::EntityId;
use crate::ecs::world::World;
use crate::simulation::tick::SimulationEvent;

/// Status a winning candidate gains on taking office
const VICTORY_STATUS: f32 = 20.0;

/// Free every prisoner whose term is over. Runs at the start of a tick.
pub fn release_prisoners(world: &mut World, events: &mut Vec<SimulationEvent>) {
    let tick = world.current_tick;
    let mut released: Vec<(EntityId, EntityId)> = Vec::new();

    for agent in world.store.agents_mut() {
        let Some(term) = agent.imprisonment else {
            continue;
        };
        if tick >= term.ends_at {
            agent.imprisonment = None;
            released.push((agent.id, term.jail));
        }
    }

    for (agent, jail) in released {
        if let Some(inmates) = world.store.place_mut(jail).and_then(|p| p.inmates_mut()) {
            inmates.retain(|id| *id != agent);
        }
        tracing::info!(agent = agent.0, tick, "released");
        events.push(SimulationEvent::Released { tick, agent });
    }
}

/// Close the election once its time is up
pub fn resolve_election(world: &mut World, events: &mut Vec<SimulationEvent>) {
    let tick = world.current_tick;
    let Some(election) = world.election.as_mut().filter(|e| e.active && tick >= e.ends_at) else {
        return;
    };
    election.active = false;
    let winner = election.winner();
    let votes = election.total_votes();

    if let Some(winner) = winner {
        world.government.leader = Some(winner);
        if let Some(leader) = world.store.agent_mut(winner) {
            leader.adjust_status(VICTORY_STATUS);
        }
    }
    tracing::info!(tick, winner = ?winner.map(|w| w.0), votes, "election resolved");
    events.push(SimulationEvent::ElectionResolved { tick, winner });
}

/// Each culture's beliefs become the mean of its living members' beliefs
pub fn average_culture_beliefs(world: &mut World) {
    let culture_ids: Vec<_> = world.store.cultures().map(|c| c.id).collect();
    for culture_id in culture_ids {
        let mut sums: BTreeMap<String, (f32, u32)> = BTreeMap::new();
        for member in world.store.for_culture(culture_id) {
            let Some(agent) = world.store.agent(*member).filter(|a| a.is_alive()) else {
                continue;
            };
            for (key, value) in &agent.beliefs {
                let entry = sums.entry(key.clone()).or_insert((0.0, 0));
                entry.0 += value;
                entry.1 += 1;
            }
        }
        if sums.is_empty() {
            continue;
        }
        if let Some(culture) = world.store.culture_mut(culture_id) {
            for (key, (sum, count)) in sums {
                culture.beliefs.insert(key, sum / count as f32);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SimConfig;
    use crate::core::types::GridPos;
    use crate::ecs::world::Environment;
    use crate::entity::agent::Imprisonment;
    use crate::entity::place::PlaceRole;

    fn world() -> World {
        World::new(Environment::new("Vale", 10, 10))
    }

    #[test]
    fn test_release_when_term_ends() {
        let config = SimConfig::default();
        let mut world = world();
        let id = world.spawn_agent("Ada", GridPos::new(1, 1), &config);
        let jail = world.spawn_place("Stockade", GridPos::new(1, 1), |p| p.with_role(PlaceRole::Jail { inmates: Vec::new() }));
        world.store.place_mut(jail).unwrap().inmates_mut().unwrap().push(id);
        world.store.agent_mut(id).unwrap().imprisonment = Some(Imprisonment { jail, starts_at: 0, ends_at: 5 });
        let mut events = Vec::new();

        world.current_tick = 4;
        release_prisoners(&mut world, &mut events);
        assert!(world.store.agent(id).unwrap().is_imprisoned());

        world.current_tick = 5;
        release_prisoners(&mut world, &mut events);
        assert!(!world.store.agent(id).unwrap().is_imprisoned());
        assert!(world.store.place(jail).unwrap().inmates().is_empty());
        assert_eq!(events, vec![SimulationEvent::Released { tick: 5, agent: id }]);
    }

    #[test]
    fn test_election_crowns_winner() {
        let config = SimConfig::default();
        let mut world = world();
        let a = world.spawn_agent("Ada", GridPos::new(1, 1), &config);
        let b = world.spawn_agent("Bo", GridPos::new(2, 1), &config);
        world.start_election(3);
        let election = world.election.as_mut().unwrap();
        election.register(a);
        election.register(b);
        election.cast(a, b);
        let mut events = Vec::new();

        resolve_election(&mut world, &mut events);
        assert!(events.is_empty());

        world.current_tick = 3;
        resolve_election(&mut world, &mut events);
        assert_eq!(world.government.leader, Some(b));
        assert_eq!(world.store.agent(b).unwrap().social_status, 70.0);
        assert!(!world.election.as_ref().unwrap().active);
    }

    #[test]
    fn test_empty_election_keeps_leader() {
        let mut world = world();
        world.government.leader = Some(EntityId(42));
        world.start_election(1);
        world.current_tick = 1;
        let mut events = Vec::new();
        resolve_election(&mut world, &mut events);
        assert_eq!(world.government.leader, Some(EntityId(42)));
        assert_eq!(events, vec![SimulationEvent::ElectionResolved { tick: 1, winner: None }]);
    }

    #[test]
    fn test_culture_takes_member_mean() {
        let config = SimConfig::default();
        let mut world = world();
        let a = world.spawn_agent("Ada", GridPos::new(1, 1), &config);
        let b = world.spawn_agent("Bo", GridPos::new(2, 1), &config);
        let culture = world.store.create_culture("Riverfolk", BTreeMap::new());
        world.store.set_culture(a, Some(culture)).unwrap();
        world.store.set_culture(b, Some(culture)).unwrap();
        world.store.agent_mut(a).unwrap().beliefs.insert("faith".into(), 0.2);
        world.store.agent_mut(b).unwrap().beliefs.insert("faith".into(), 0.6);

        average_culture_beliefs(&mut world);
        let faith = world.store.culture(culture).unwrap().beliefs["faith"];
        assert!((faith - 0.4).abs() < 1e-6);
    }
}
