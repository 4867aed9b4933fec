//! Needs decay - the per-agent bookkeeping pass that runs before anyone acts
//!
//! For each living, non-privileged agent, in this order:
//! 1. Needs grow toward the ceiling
//! 2. Needs past the damage threshold cost health
//! 3. Aging, with decline past the maximum age
//! 4. Emotions, drives and dispositions fade
//! 5. Beliefs drift toward culture and religion
//! 6. Sickness: contract, suffer, maybe recover
//! 7. Nearby agents become (slightly better) acquaintances
//!
//! Death at any step ends the pass for that agent. Nothing here moves agents,
//! touches inventories or consults the oracle.

use std::collections::BTreeMap;

use crate::core::config::SimConfig;
use crate::core::random::RandomSource;
use crate::core::types::{EntityId, Tick};
use crate::ecs::store::EntityStore;
use crate::entity::agent::{Trauma, TraumaKind};
use crate::entity::genome::Gene;
use crate::entity::psyche::Emotion;
use crate::entity::relationships::Relationship;
use crate::entity::social::{SocialEvent, SocialEventKind};

/// Sickness given to agents who fall ill
const SICKNESS: &str = "fever";
const GRIEF: f32 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeathCause {
    Starvation,
    Dehydration,
    OldAge,
    Sickness,
}

impl DeathCause {
    pub fn name(&self) -> &'static str {
        match self {
            DeathCause::Starvation => "starvation",
            DeathCause::Dehydration => "dehydration",
            DeathCause::OldAge => "old age",
            DeathCause::Sickness => "sickness",
        }
    }
}

/// Run the pass for one agent. Returns the cause if the agent died.
pub fn decay_agent(
    store: &mut EntityStore,
    id: EntityId,
    config: &SimConfig,
    rng: &mut dyn RandomSource,
) -> Option<DeathCause> {
    let culture_beliefs = belief_targets(store, id);
    let neighbors: Vec<EntityId> = match store.agent(id) {
        Some(me) => store
            .agents()
            .filter(|other| other.id != id && other.is_alive())
            .filter(|other| other.position.distance(&me.position) <= config.proximity_threshold)
            .map(|other| other.id)
            .collect(),
        None => return None,
    };

    let agent = store.agent_mut(id).filter(|a| a.is_active())?;

    // 1. needs
    agent.needs.grow(config);

    // 2. deprivation
    if agent.needs.hunger > config.need_damage_threshold && agent.apply_health_delta(-config.starvation_damage) {
        return Some(DeathCause::Starvation);
    }
    if agent.needs.thirst > config.need_damage_threshold && agent.apply_health_delta(-config.dehydration_damage) {
        return Some(DeathCause::Dehydration);
    }

    // 3. aging
    agent.age += config.age_increment;
    if agent.age > config.max_age {
        let mut decline = config.old_age_decline;
        if agent.genome.has(Gene::Longevity) {
            decline /= 2.0;
        }
        if agent.apply_health_delta(-decline) {
            return Some(DeathCause::OldAge);
        }
    }

    // 4. fading
    agent.emotions.decay(config.emotion_decay);
    agent.psyche.decay(config.emotion_decay);
    for (_, relationship) in agent.relationships.iter_mut() {
        relationship.disposition.decay(config.disposition_decay);
    }

    // 5. assimilation
    let (culture, religion) = culture_beliefs;
    for (targets, rate) in [
        (culture, config.culture_assimilation_rate),
        (religion, config.religion_assimilation_rate),
    ] {
        for (key, target) in targets.iter().flatten() {
            let belief = agent.beliefs.entry(key.clone()).or_insert(0.5);
            *belief = (*belief + (target - *belief) * rate).clamp(0.0, 1.0);
        }
    }

    // 6. sickness
    if agent.sickness.is_none() && rng.chance(config.sickness_chance) {
        agent.sickness = Some(SICKNESS.to_string());
        tracing::debug!(agent = id.0, "fell sick");
    }
    if agent.sickness.is_some() {
        let mut damage = config.sickness_damage;
        if agent.genome.has(Gene::Resistant) {
            damage /= 2.0;
        }
        if agent.apply_health_delta(-damage) {
            return Some(DeathCause::Sickness);
        }
        if rng.chance(config.sickness_recovery_chance) {
            agent.sickness = None;
        }
    }

    // 7. proximity
    for other in neighbors {
        agent.relationships.ensure(other).add_score(config.proximity_increment);
    }

    None
}

type Beliefs = Option<BTreeMap<String, f32>>;

fn belief_targets(store: &EntityStore, id: EntityId) -> (Beliefs, Beliefs) {
    let Some(agent) = store.agent(id) else {
        return (None, None);
    };
    let culture = agent.culture_id().and_then(|c| store.culture(c)).map(|c| c.beliefs.clone());
    let religion = agent.religion_id().and_then(|r| store.religion(r)).map(|r| r.dogma.clone());
    (culture, religion)
}

/// Grief for everyone who was close to the deceased
pub fn mourn(store: &mut EntityStore, deceased: EntityId, tick: Tick) {
    let mut mourners = 0;
    for agent in store.agents_mut() {
        if agent.id == deceased || !agent.is_alive() {
            continue;
        }
        if agent.relationships.score(deceased) < Relationship::FRIEND_SCORE {
            continue;
        }
        let sadness = agent.emotions.get(Emotion::Sadness).max(GRIEF);
        agent.emotions.set(Emotion::Sadness, sadness);
        agent.traumas.push(Trauma { kind: TraumaKind::Loss, tick, severity: GRIEF, source: Some(deceased) });
        agent.remember(SocialEvent::new(tick, SocialEventKind::Death, deceased, "lost someone close"));
        mourners += 1;
    }
    tracing::debug!(deceased = deceased.0, mourners, "mourning");
}
