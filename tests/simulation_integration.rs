//! End-to-end tick tests
//!
//! These drive `Simulation::tick` with stub oracles and scripted randomness:
//! - Proximity relationships from the decay pass
//! - Death is permanent
//! - Conversations and oracle failures
//! - Prompted actions
//! - Snapshot round-trips

mod common;

use civitas::actions::catalog::ActionCatalog;
use civitas::core::config::SimConfig;
use civitas::core::random::SeededRandom;
use civitas::core::types::GridPos;
use civitas::ecs::snapshot::Snapshot;
use civitas::ecs::world::World;
use civitas::entity::relationships::RelationshipType;
use civitas::llm::oracle::NullOracle;
use civitas::simulation::tick::{Simulation, SimulationEvent};

use common::{empty_world, scripted, FailingOracle, ScriptedOracle};

// ============================================================================
// Decay pass
// ============================================================================

#[tokio::test]
async fn test_neighbors_become_strangers() {
    let config = SimConfig::default();
    let mut world = empty_world();
    // Nothing to do, so only the decay pass touches relationships
    world.catalog = ActionCatalog::empty();
    let ada = world.spawn_agent("Ada", GridPos::new(3, 3), &config);
    let bo = world.spawn_agent("Bo", GridPos::new(4, 3), &config);
    let mut sim = scripted(world, config.clone(), 0.9);

    sim.tick(&NullOracle).await;
    for (me, other) in [(ada, bo), (bo, ada)] {
        let relation = sim.world.store.agent(me).unwrap().relationships.get(other).unwrap();
        assert_eq!(relation.kind, RelationshipType::Stranger);
        assert_eq!(relation.score(), config.proximity_increment);
    }

    sim.tick(&NullOracle).await;
    sim.tick(&NullOracle).await;
    let score = sim.world.store.agent(ada).unwrap().relationships.score(bo);
    assert_eq!(score, 3.0 * config.proximity_increment);
}

#[tokio::test]
async fn test_death_is_permanent() {
    let config = SimConfig::default();
    let mut world = empty_world();
    world.catalog = ActionCatalog::empty();
    let ada = world.spawn_agent("Ada", GridPos::new(3, 3), &config);
    {
        let agent = world.store.agent_mut(ada).unwrap();
        agent.needs.thirst = 120.0;
        agent.health = 1.0;
    }
    let mut sim = scripted(world, config, 0.9);

    let events = sim.tick(&NullOracle).await;
    assert!(events
        .iter()
        .any(|e| matches!(e, SimulationEvent::Died { agent, cause, .. } if *agent == ada && cause == "dehydration")));

    let later = sim.run(5, &NullOracle).await;
    assert!(!later.iter().any(|e| matches!(e, SimulationEvent::Died { .. })));
    let agent = sim.world.store.agent(ada).expect("dead agents stay addressable");
    assert!(!agent.is_alive());
    assert_eq!(agent.health, 0.0);
}

// ============================================================================
// Conversations
// ============================================================================

fn chatty_pair() -> (World, SimConfig) {
    let mut config = SimConfig::default();
    config.conversation_start_chance = 1.0;
    let mut world = empty_world();
    world.spawn_agent("Ada", GridPos::new(3, 3), &config);
    world.spawn_agent("Bo", GridPos::new(4, 3), &config);
    (world, config)
}

#[tokio::test]
async fn test_neighbors_talk_through_the_oracle() {
    let (world, config) = chatty_pair();
    let mut sim = scripted(world, config.clone(), 0.5);
    let ada = sim.world.store.find_agent_by_name("Ada").unwrap().id;
    let bo = sim.world.store.find_agent_by_name("Bo").unwrap().id;
    let oracle = ScriptedOracle::new().say("Fine weather for the harvest.", None);

    let events = sim.tick(&oracle).await;
    assert!(events.iter().any(|e| matches!(e, SimulationEvent::ConversationStarted { .. })));
    assert!(events.iter().any(|e| matches!(
        e,
        SimulationEvent::Spoke { speaker, listener, line, .. }
            if *speaker == ada && *listener == bo && line == "Ada: Fine weather for the harvest."
    )));
    // Both were busy talking
    assert!(!events.iter().any(|e| matches!(e, SimulationEvent::ActionTaken { .. })));
    assert!(sim.world.conversations.is_talking(ada));
    assert!(sim.world.store.agent(bo).unwrap().relationships.score(ada) >= config.conversation_increment);
}

#[tokio::test]
async fn test_failing_oracle_does_not_stop_the_tick() {
    let (world, config) = chatty_pair();
    let mut sim = scripted(world, config, 0.5);

    let events = sim.tick(&FailingOracle).await;
    assert!(events.iter().any(|e| matches!(e, SimulationEvent::OracleFailed { .. })));
    assert!(!events.iter().any(|e| matches!(e, SimulationEvent::Spoke { .. })));
    assert_eq!(sim.world.current_tick, 1);
}

// ============================================================================
// Prompts
// ============================================================================

#[tokio::test]
async fn test_prompt_falls_back_to_oracle() {
    let config = SimConfig::default();
    let mut world = empty_world();
    let ada = world.spawn_agent("Ada", GridPos::new(3, 3), &config);
    let mut sim = scripted(world, config, 0.5);

    let oracle = ScriptedOracle::new().choose("rest");
    let executed = sim.prompt_agent(ada, "take a nap", &oracle).await.unwrap().unwrap();
    assert_eq!(executed.action, "Rest");

    let nothing = sim.prompt_agent(ada, "take a nap", &FailingOracle).await.unwrap();
    assert!(nothing.is_none());
}

// ============================================================================
// Snapshots
// ============================================================================

#[tokio::test]
async fn test_snapshot_round_trip_ticks_identically() {
    let config = SimConfig::default();
    let world = World::settlement(&config, 6, &mut SeededRandom::new(3));
    let json = Snapshot::capture(&world).to_json().unwrap();
    let restored = Snapshot::from_json(&json).unwrap().into_world().unwrap();

    let mut original = Simulation::seeded(world, config.clone(), 11);
    let mut copy = Simulation::seeded(restored, config, 11);
    for _ in 0..3 {
        let a = original.tick(&NullOracle).await;
        let b = copy.tick(&NullOracle).await;
        assert_eq!(a, b);
    }
    assert_eq!(
        Snapshot::capture(&original.world).to_json().unwrap(),
        Snapshot::capture(&copy.world).to_json().unwrap()
    );
}

#[test]
fn test_snapshot_missing_key_is_rejected() {
    let config = SimConfig::default();
    let world = World::settlement(&config, 2, &mut SeededRandom::new(3));
    let mut value: serde_json::Value = serde_json::from_str(&Snapshot::capture(&world).to_json().unwrap()).unwrap();
    value.as_object_mut().unwrap().remove("agents");
    assert!(Snapshot::from_json(&value.to_string()).is_err());
}
