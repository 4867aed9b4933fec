//! Action selection for autonomous agents
//!
//! Selection follows a fixed priority ladder before falling back to
//! preference:
//! 1. Imprisoned agents can only rest
//! 2. Exhaustion forces rest
//! 3. Thirst forces drinking
//! 4. Hunger forces eating, or gathering food when there is none to eat
//! 5. Sick agents in poor health rest
//! 6. Elders sometimes rest anyway
//!
//! Otherwise the choice is a weighted draw over the whole catalog. Each
//! action's weight is the agent's belief in the action's value plus the
//! action's resonance, a habit bonus that grows with use and fades each tick.

use crate::actions::catalog::{Action, ActionCatalog, ActionEffect};
use crate::core::config::SimConfig;
use crate::core::random::RandomSource;
use crate::entity::agent::Agent;
use crate::entity::inventory::Item;

/// Why an action was picked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionReason {
    Imprisoned,
    Exhausted,
    Thirsty,
    Hungry,
    Sick,
    Elder,
    Preference,
}

fn find(catalog: &ActionCatalog, effect: ActionEffect) -> Option<&Action> {
    catalog.iter().find(|a| a.effect == effect)
}

/// Highest-priority need override, if any applies and the catalog can serve it
fn override_action<'c>(
    agent: &Agent,
    catalog: &'c ActionCatalog,
    config: &SimConfig,
    rng: &mut dyn RandomSource,
) -> Option<(&'c Action, SelectionReason)> {
    let rest = || find(catalog, ActionEffect::Rest);

    if agent.needs.fatigue > config.fatigue_override {
        if let Some(action) = rest() {
            return Some((action, SelectionReason::Exhausted));
        }
    }
    if agent.needs.thirst > config.thirst_override {
        if let Some(action) = find(catalog, ActionEffect::Drink) {
            return Some((action, SelectionReason::Thirsty));
        }
    }
    if agent.needs.hunger > config.hunger_override {
        let wanted = if agent.inventory.count(Item::Food) > 0 {
            ActionEffect::Eat
        } else {
            ActionEffect::Gather(Item::Food)
        };
        if let Some(action) = find(catalog, wanted) {
            return Some((action, SelectionReason::Hungry));
        }
    }
    if agent.sickness.is_some() && agent.health < config.sick_rest_health {
        if let Some(action) = rest() {
            return Some((action, SelectionReason::Sick));
        }
    }
    if agent.is_elder(config) && rng.chance(config.elder_rest_chance) {
        if let Some(action) = rest() {
            return Some((action, SelectionReason::Elder));
        }
    }
    None
}

/// Weight of one action for this agent
pub fn action_weight(agent: &Agent, action: &Action, config: &SimConfig) -> f32 {
    let belief = action
        .belief_key
        .as_deref()
        .and_then(|key| agent.beliefs.get(key).copied())
        .unwrap_or(config.default_belief_weight);
    let resonance = agent.resonance.get(&action.name).copied().unwrap_or(0.0);
    (belief + resonance).max(0.0)
}

fn weighted_choice<'c>(
    agent: &Agent,
    catalog: &'c ActionCatalog,
    config: &SimConfig,
    rng: &mut dyn RandomSource,
) -> Option<&'c Action> {
    if catalog.is_empty() {
        return None;
    }
    let weights: Vec<f32> = catalog.iter().map(|a| action_weight(agent, a, config)).collect();
    let total: f32 = weights.iter().sum();
    if total <= 0.0 {
        return catalog.iter().nth(rng.below(catalog.len()));
    }

    let mut roll = rng.next_f32() * total;
    for (action, weight) in catalog.iter().zip(&weights) {
        if roll < *weight {
            return Some(action);
        }
        roll -= weight;
    }
    // Float rounding can leave the roll just past the last bucket
    catalog.iter().zip(&weights).filter(|(_, w)| **w > 0.0).map(|(a, _)| a).last()
}

/// Choose the next action for an agent, or None if the catalog offers nothing usable
pub fn select_action<'c>(
    agent: &Agent,
    catalog: &'c ActionCatalog,
    config: &SimConfig,
    rng: &mut dyn RandomSource,
) -> Option<(&'c Action, SelectionReason)> {
    if agent.is_imprisoned() {
        return find(catalog, ActionEffect::Rest).map(|a| (a, SelectionReason::Imprisoned));
    }
    if let Some(choice) = override_action(agent, catalog, config, rng) {
        return Some(choice);
    }
    weighted_choice(agent, catalog, config, rng).map(|a| (a, SelectionReason::Preference))
}

/// Fade every resonance and forget the ones that fell under the cutoff
pub fn decay_resonance(agent: &mut Agent, config: &SimConfig) {
    for value in agent.resonance.values_mut() {
        *value *= config.resonance_decay;
    }
    agent.resonance.retain(|_, value| *value >= config.resonance_cutoff);
}
