//! Property tests: nobody ever leaves the grid

use proptest::prelude::*;

use civitas::core::config::SimConfig;
use civitas::core::random::ScriptedRandom;
use civitas::core::types::GridPos;
use civitas::ecs::world::{Environment, World};
use civitas::entity::genome::Gene;
use civitas::simulation::action_execute::execute_action;

const MOVES: [&str; 4] = ["Move North", "Move South", "Move East", "Move West"];

proptest! {
    #[test]
    fn test_moves_stay_on_grid(
        width in 1i32..12,
        height in 1i32..12,
        x in -5i32..20,
        y in -5i32..20,
        agile in any::<bool>(),
        moves in prop::collection::vec(0usize..4, 0..40),
    ) {
        let config = SimConfig::default();
        let mut world = World::new(Environment::new("Box", width, height));
        let ada = world.spawn_agent("Ada", GridPos::new(x, y), &config);
        if agile {
            world.store.agent_mut(ada).unwrap().genome.insert(Gene::Agile);
        }
        let prices = world.price_table(&config);
        let mut rng = ScriptedRandom::constant(0.5);
        let mut events = Vec::new();

        for index in moves {
            let action = world.catalog.get(MOVES[index]).cloned().unwrap();
            execute_action(&mut world, ada, &action, &prices, &config, &mut rng, &mut events);
            let pos = world.store.agent(ada).unwrap().position;
            prop_assert!(world.environment.contains(pos), "{:?} escaped a {}x{} grid", pos, width, height);
        }
    }

    #[test]
    fn test_clamped_is_idempotent(x in any::<i32>(), y in any::<i32>(), w in 1i32..1000, h in 1i32..1000) {
        let once = GridPos::new(x, y).clamped(w, h);
        prop_assert_eq!(once, once.clamped(w, h));
        prop_assert!(once.x >= 0 && once.x < w && once.y >= 0 && once.y < h);
    }
}
