//! Action execution - runs a chosen action and applies what it asks of the world
//!
//! The action procedure itself only touches the actor and the entities it
//! resolves. Anything structural (new agents and places, membership changes,
//! elections, laws, imprisonment, deaths) comes back as a `SideEffect` and is
//! applied here, in order, after the procedure returns.

use std::collections::BTreeMap;

use crate::actions::catalog::Action;
use crate::actions::context::ActionContext;
use crate::actions::outcome::{ActionOutcome, PlaceSpec, SideEffect};
use crate::core::config::SimConfig;
use crate::core::random::RandomSource;
use crate::core::types::{EntityId, GridPos};
use crate::ecs::world::World;
use crate::entity::agent::{Agent, Imprisonment, Trauma, TraumaKind};
use crate::entity::genome::Genome;
use crate::entity::place::Place;
use crate::entity::psyche::Personality;
use crate::entity::social::{SocialEvent, SocialEventKind};
use crate::simulation::needs_decay::mourn;
use crate::simulation::tick::SimulationEvent;
use crate::society::economy::PriceTable;

/// Score parents and children start with toward each other
const FAMILY_SCORE: f32 = 80.0;
/// Status gained by founding a culture or religion
const FOUNDER_STATUS: f32 = 10.0;

const CHILD_NAMES: [&str; 10] = ["Ash", "Briar", "Corin", "Dell", "Elin", "Fenn", "Gale", "Hale", "Isla", "Wren"];

/// Execute one action for `actor`. Returns the outcome after all side effects are applied.
pub fn execute_action(
    world: &mut World,
    actor: EntityId,
    action: &Action,
    prices: &PriceTable,
    config: &SimConfig,
    rng: &mut dyn RandomSource,
    events: &mut Vec<SimulationEvent>,
) -> ActionOutcome {
    let outcome = {
        let (store, facts) = world.split_for_action(prices);
        let mut ctx = ActionContext { store, facts, rng: &mut *rng, config };
        action.effect.execute(actor, &mut ctx)
    };

    let tick = world.current_tick;
    let agent_name = world.store.agent(actor).map(|a| a.name.clone()).unwrap_or_default();
    tracing::debug!(
        tick,
        agent = actor.0,
        action = %action.name,
        key = %outcome.log_key,
        reward = outcome.reward,
        "action executed"
    );
    events.push(SimulationEvent::ActionTaken {
        tick,
        agent: actor,
        agent_name,
        action: action.name.clone(),
        status: outcome.status,
        log_key: outcome.log_key.clone(),
        message: outcome.message.clone(),
    });

    for effect in &outcome.side_effects {
        apply_side_effect(world, effect, config, rng, events);
    }

    if let Some(agent) = world.store.agent_mut(actor).filter(|a| a.is_alive()) {
        *agent.resonance.entry(action.name.clone()).or_insert(0.0) += config.resonance_gain;
        agent.last_actions.push(action.name.clone());
    }

    outcome
}

pub(crate) fn apply_side_effect(
    world: &mut World,
    effect: &SideEffect,
    config: &SimConfig,
    rng: &mut dyn RandomSource,
    events: &mut Vec<SimulationEvent>,
) {
    let tick = world.current_tick;
    match effect {
        SideEffect::CreateAgent { parents, position } => birth(world, *parents, *position, config, rng, events),
        SideEffect::CreateEntity(spec) => {
            let (place, name) = build_place(world, spec);
            events.push(SimulationEvent::PlaceBuilt { tick, place, name });
        }
        SideEffect::ChangeCulture { agent, culture } => {
            if let Err(e) = world.store.set_culture(*agent, *culture) {
                tracing::warn!(agent = agent.0, error = %e, "culture change dropped");
            }
        }
        SideEffect::ChangeReligion { agent, religion } => {
            if let Err(e) = world.store.set_religion(*agent, *religion) {
                tracing::warn!(agent = agent.0, error = %e, "religion change dropped");
            }
        }
        SideEffect::CreateCulture { founder, name, beliefs } => {
            let culture = world.store.create_culture(name.clone(), beliefs.clone());
            if world.store.set_culture(*founder, Some(culture)).is_ok() {
                if let Some(agent) = world.store.agent_mut(*founder) {
                    agent.adjust_status(FOUNDER_STATUS);
                }
            }
            tracing::info!(founder = founder.0, culture = culture.0, name = %name, "culture founded");
            events.push(SimulationEvent::CultureFounded { tick, founder: *founder, culture, name: name.clone() });
        }
        SideEffect::CreateReligion { founder, name, dogma } => {
            let religion = world.store.create_religion(name.clone(), dogma.clone());
            if world.store.set_religion(*founder, Some(religion)).is_ok() {
                if let Some(agent) = world.store.agent_mut(*founder) {
                    agent.adjust_status(FOUNDER_STATUS);
                }
            }
            tracing::info!(founder = founder.0, religion = religion.0, name = %name, "religion founded");
            events.push(SimulationEvent::ReligionFounded { tick, founder: *founder, religion, name: name.clone() });
        }
        SideEffect::AddResearch { culture, points } => {
            if let Some(culture) = world.store.culture_mut(*culture) {
                culture.add_research(*points);
            }
        }
        SideEffect::InventTechnology { culture, tech } => {
            let Some(technology) = world.tech_tree.get(tech) else {
                tracing::warn!(tech = %tech, "unknown technology");
                return;
            };
            let Some(target) = world.store.culture_mut(*culture) else {
                return;
            };
            let ready = !target.knows(tech) && technology.requires.iter().all(|r| target.knows(r));
            if ready && target.spend_research(technology.cost) {
                target.learn(tech.clone());
                tracing::info!(culture = culture.0, tech = %tech, "technology invented");
                events.push(SimulationEvent::TechnologyInvented { tick, culture: *culture, tech: tech.clone() });
            }
        }
        SideEffect::RegisterCandidate { candidate } => {
            if let Some(election) = world.election.as_mut().filter(|e| e.active) {
                election.register(*candidate);
            }
        }
        SideEffect::CastVote { voter, candidate } => {
            if let Some(election) = world.election.as_mut() {
                election.cast(*voter, *candidate);
            }
        }
        SideEffect::EnactLaw(law) => {
            if world.government.enact(law.clone()) {
                tracing::info!(law = %law.name, "law enacted");
                events.push(SimulationEvent::LawEnacted { tick, law: law.name.clone() });
            }
        }
        SideEffect::RecordTransaction(transaction) => world.transactions.push(transaction.clone()),
        SideEffect::Imprison { agent, jail, duration } => imprison(world, *agent, *jail, *duration, events),
        SideEffect::RecordDeath { agent, cause } => {
            let name = world.store.agent(*agent).map(|a| a.name.clone()).unwrap_or_default();
            mourn(&mut world.store, *agent, tick);
            tracing::info!(agent = agent.0, cause = %cause, "death");
            events.push(SimulationEvent::Died { tick, agent: *agent, agent_name: name, cause: cause.clone() });
        }
    }
}

fn build_place(world: &mut World, spec: &PlaceSpec) -> (EntityId, String) {
    let id = world.store.allocate_id();
    let position = spec.position.clamped(world.environment.width, world.environment.height);
    let mut place = Place::new(id, spec.name.clone(), position);
    place.description = spec.description.clone();
    if let Some((item, quantity)) = spec.resource {
        place = place.with_resource(item, quantity);
    }
    if let Some(owner) = spec.owner {
        place = place.with_owner(owner);
    }
    if let Some(role) = spec.role.clone() {
        place = place.with_role(role);
    }
    world.store.put_place(place);
    (id, spec.name.clone())
}

fn family_name(name: &str) -> &str {
    name.split_whitespace().last().unwrap_or(name)
}

fn blend(a: &Personality, b: &Personality) -> Personality {
    Personality::new(
        (a.openness + b.openness) / 2.0,
        (a.conscientiousness + b.conscientiousness) / 2.0,
        (a.extraversion + b.extraversion) / 2.0,
        (a.agreeableness + b.agreeableness) / 2.0,
        (a.neuroticism + b.neuroticism) / 2.0,
    )
}

/// A child takes its genes from both parents and its affiliations from the first
fn birth(
    world: &mut World,
    parents: (EntityId, EntityId),
    position: GridPos,
    config: &SimConfig,
    rng: &mut dyn RandomSource,
    events: &mut Vec<SimulationEvent>,
) {
    let (Some(a), Some(b)) = (world.store.agent(parents.0), world.store.agent(parents.1)) else {
        tracing::warn!(a = parents.0 .0, b = parents.1 .0, "birth without both parents");
        return;
    };

    let genome = Genome::inherit(&a.genome, &b.genome, rng, config);
    let personality = blend(&a.personality, &b.personality);
    let beliefs: BTreeMap<String, f32> = a
        .beliefs
        .keys()
        .chain(b.beliefs.keys())
        .map(|key| (key.clone(), (a.belief(key) + b.belief(key)) / 2.0))
        .collect();
    let (culture, religion) = (a.culture_id(), a.religion_id());
    let name = format!("{} {}", CHILD_NAMES[rng.below(CHILD_NAMES.len())], family_name(&a.name));

    let id = world.store.allocate_id();
    let position = position.clamped(world.environment.width, world.environment.height);
    let mut child = Agent::new(id, name.clone(), position, config);
    child.age = 0.0;
    child.genome = genome;
    child.personality = personality;
    child.beliefs = beliefs;
    child.parents = Some(parents);
    child.set_culture_id(culture);
    child.set_religion_id(religion);
    for parent in [parents.0, parents.1] {
        child.relationships.ensure(parent).set_score(FAMILY_SCORE);
    }
    world.store.put_agent(child);

    let tick = world.current_tick;
    for parent in [parents.0, parents.1] {
        if let Some(parent) = world.store.agent_mut(parent) {
            parent.relationships.ensure(id).set_score(FAMILY_SCORE);
            parent.remember(SocialEvent::new(tick, SocialEventKind::Birth, id, format!("{} was born", name)));
        }
    }

    tracing::info!(child = id.0, name = %name, "birth");
    events.push(SimulationEvent::Born { tick, child: id, name, parents });
}

fn imprison(world: &mut World, agent: EntityId, jail: EntityId, duration: u64, events: &mut Vec<SimulationEvent>) {
    let tick = world.current_tick;
    let Some(jail_position) = world.store.place(jail).filter(|p| p.is_jail()).map(|p| p.position) else {
        tracing::warn!(jail = jail.0, "imprisonment without a jail");
        return;
    };
    let ends_at = tick + duration.max(1);

    let Some(prisoner) = world.store.agent_mut(agent) else {
        return;
    };
    prisoner.imprisonment = Some(Imprisonment { jail, starts_at: tick, ends_at });
    prisoner.position = jail_position;
    prisoner.traumas.push(Trauma { kind: TraumaKind::Imprisonment, tick, severity: 0.5, source: None });
    prisoner.remember(SocialEvent::new(tick, SocialEventKind::Arrest, jail, "locked up"));

    if let Some(inmates) = world.store.place_mut(jail).and_then(|p| p.inmates_mut()) {
        if !inmates.contains(&agent) {
            inmates.push(agent);
        }
    }
    tracing::info!(agent = agent.0, until = ends_at, "imprisoned");
    events.push(SimulationEvent::Imprisoned { tick, agent, jail, until: ends_at });
}
