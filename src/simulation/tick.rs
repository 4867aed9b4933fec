//! Tick system - orchestrates simulation updates
//!
//! This is the core loop that ties together:
//! release -> needs decay -> conversations -> action selection -> action execution -> politics
//!
//! Each tick advances the simulation one step, processing all agents
//! sequentially in id order. The only suspend points are oracle calls.

use std::fmt;

use crate::actions::outcome::{ActionOutcome, ActionStatus, SideEffect};
use crate::command::resolver::resolve;
use crate::core::config::SimConfig;
use crate::core::error::{CivError, Result};
use crate::core::random::{RandomSource, SeededRandom};
use crate::core::types::{CultureId, EntityId, ReligionId, Tick};
use crate::ecs::world::World;
use crate::llm::context::{AgentView, WorldView};
use crate::llm::oracle::{consult, ChoiceRequest, DecisionOracle};
use crate::simulation::action_execute::{apply_side_effect, execute_action};
use crate::simulation::action_select::{decay_resonance, select_action};
use crate::simulation::conversation::run_conversations;
use crate::simulation::needs_decay::decay_agent;
use crate::simulation::politics;

/// Events generated during a simulation tick
///
/// Returned by `Simulation::tick` for the CLI log and for tests.
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationEvent {
    ActionTaken {
        tick: Tick,
        agent: EntityId,
        agent_name: String,
        action: String,
        status: ActionStatus,
        log_key: String,
        message: String,
    },
    Died {
        tick: Tick,
        agent: EntityId,
        agent_name: String,
        cause: String,
    },
    Born {
        tick: Tick,
        child: EntityId,
        name: String,
        parents: (EntityId, EntityId),
    },
    PlaceBuilt {
        tick: Tick,
        place: EntityId,
        name: String,
    },
    ConversationStarted {
        tick: Tick,
        participants: (EntityId, EntityId),
    },
    Spoke {
        tick: Tick,
        speaker: EntityId,
        listener: EntityId,
        line: String,
    },
    ConversationEnded {
        tick: Tick,
        participants: (EntityId, EntityId),
    },
    /// The oracle errored or timed out; the turn was skipped
    OracleFailed {
        tick: Tick,
        agent: EntityId,
        reason: String,
    },
    Imprisoned {
        tick: Tick,
        agent: EntityId,
        jail: EntityId,
        until: Tick,
    },
    Released {
        tick: Tick,
        agent: EntityId,
    },
    CultureFounded {
        tick: Tick,
        founder: EntityId,
        culture: CultureId,
        name: String,
    },
    ReligionFounded {
        tick: Tick,
        founder: EntityId,
        religion: ReligionId,
        name: String,
    },
    TechnologyInvented {
        tick: Tick,
        culture: CultureId,
        tech: String,
    },
    LawEnacted {
        tick: Tick,
        law: String,
    },
    ElectionResolved {
        tick: Tick,
        winner: Option<EntityId>,
    },
}

impl fmt::Display for SimulationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationEvent::ActionTaken { tick, agent_name, action, status, message, .. } => {
                write!(f, "[{}] {} - {} ({:?}): {}", tick, agent_name, action, status, message)
            }
            SimulationEvent::Died { tick, agent_name, cause, .. } => {
                write!(f, "[{}] {} died of {}", tick, agent_name, cause)
            }
            SimulationEvent::Born { tick, name, parents, .. } => {
                write!(f, "[{}] {} was born to {} and {}", tick, name, parents.0, parents.1)
            }
            SimulationEvent::PlaceBuilt { tick, place, name } => write!(f, "[{}] {} {} was built", tick, name, place),
            SimulationEvent::ConversationStarted { tick, participants } => {
                write!(f, "[{}] {} and {} start talking", tick, participants.0, participants.1)
            }
            SimulationEvent::Spoke { tick, line, .. } => write!(f, "[{}] {}", tick, line),
            SimulationEvent::ConversationEnded { tick, participants } => {
                write!(f, "[{}] {} and {} stop talking", tick, participants.0, participants.1)
            }
            SimulationEvent::OracleFailed { tick, agent, reason } => {
                write!(f, "[{}] oracle gave {} nothing: {}", tick, agent, reason)
            }
            SimulationEvent::Imprisoned { tick, agent, until, .. } => {
                write!(f, "[{}] {} jailed until tick {}", tick, agent, until)
            }
            SimulationEvent::Released { tick, agent } => write!(f, "[{}] {} released", tick, agent),
            SimulationEvent::CultureFounded { tick, name, .. } => write!(f, "[{}] {} founded", tick, name),
            SimulationEvent::ReligionFounded { tick, name, .. } => write!(f, "[{}] {} founded", tick, name),
            SimulationEvent::TechnologyInvented { tick, culture, tech } => {
                write!(f, "[{}] culture {} invented {}", tick, culture.0, tech)
            }
            SimulationEvent::LawEnacted { tick, law } => write!(f, "[{}] {} enacted", tick, law),
            SimulationEvent::ElectionResolved { tick, winner } => match winner {
                Some(winner) => write!(f, "[{}] {} wins the election", tick, winner),
                None => write!(f, "[{}] election closes with no winner", tick),
            },
        }
    }
}

/// An action run on request, with everything it caused
#[derive(Debug, Clone)]
pub struct Executed {
    pub action: String,
    pub outcome: ActionOutcome,
    pub events: Vec<SimulationEvent>,
}

/// The world plus the configuration and randomness that drive it
pub struct Simulation {
    pub world: World,
    pub config: SimConfig,
    rng: Box<dyn RandomSource>,
}

impl Simulation {
    pub fn new(world: World, config: SimConfig, rng: Box<dyn RandomSource>) -> Self {
        Self { world, config, rng }
    }

    pub fn seeded(world: World, config: SimConfig, seed: u64) -> Self {
        Self::new(world, config, Box::new(SeededRandom::new(seed)))
    }

    pub fn rng_mut(&mut self) -> &mut dyn RandomSource {
        self.rng.as_mut()
    }

    /// Run a single simulation tick
    ///
    /// 1. Release prisoners whose term is over
    /// 2. Price the market from recent transactions
    /// 3. Needs decay for every living agent (deaths are mourned)
    /// 4. Fade action resonance
    /// 5. Conversations (oracle turns, may execute actions)
    /// 6. Select and execute an action for everyone not in a conversation
    /// 7. Advance tick counter
    /// 8. Resolve a due election
    /// 9. Average culture beliefs on the interval
    ///
    /// Returns a list of events that occurred during this tick.
    pub async fn tick<O: DecisionOracle>(&mut self, oracle: &O) -> Vec<SimulationEvent> {
        let Self { world, config, rng } = self;
        let rng: &mut dyn RandomSource = rng.as_mut();
        let tick = world.current_tick;
        let mut events = Vec::new();

        politics::release_prisoners(world, &mut events);
        let prices = world.price_table(config);

        for id in world.store.agent_ids() {
            if let Some(cause) = decay_agent(&mut world.store, id, config, rng) {
                let death = SideEffect::RecordDeath { agent: id, cause: cause.name().to_string() };
                apply_side_effect(world, &death, config, rng, &mut events);
            }
        }
        for agent in world.store.agents_mut() {
            decay_resonance(agent, config);
        }

        let busy = run_conversations(world, &prices, config, rng, oracle, &mut events).await;

        for id in world.store.agent_ids() {
            if busy.contains(&id) {
                continue;
            }
            let choice = match world.store.agent(id) {
                Some(agent) if agent.is_active() => select_action(agent, &world.catalog, config, rng)
                    .map(|(action, reason)| (action.clone(), reason)),
                _ => None,
            };
            let Some((action, reason)) = choice else {
                continue;
            };
            tracing::trace!(agent = id.0, action = %action.name, ?reason, "selected");
            execute_action(world, id, &action, &prices, config, rng, &mut events);
        }

        world.current_tick += 1;
        politics::resolve_election(world, &mut events);
        let interval = config.culture_averaging_interval;
        if interval > 0 && world.current_tick % interval == 0 {
            politics::average_culture_beliefs(world);
        }

        tracing::info!(tick, events = events.len(), living = world.store.living_count(), "tick complete");
        events
    }

    /// Run `n` ticks, collecting every event
    pub async fn run<O: DecisionOracle>(&mut self, n: u64, oracle: &O) -> Vec<SimulationEvent> {
        let mut events = Vec::new();
        for _ in 0..n {
            events.extend(self.tick(oracle).await);
        }
        events
    }

    /// Have one agent act on a free-text instruction
    ///
    /// The text is matched against the catalog first; only when nothing
    /// matches is the oracle asked to choose. Ok(None) means no action was
    /// chosen, including when the oracle failed.
    pub async fn prompt_agent<O: DecisionOracle>(
        &mut self,
        agent: EntityId,
        text: &str,
        oracle: &O,
    ) -> Result<Option<Executed>> {
        let Some(actor) = self.world.store.agent(agent).filter(|a| a.is_alive()) else {
            return Err(CivError::AgentNotFound(agent));
        };

        let action = match resolve(&self.world.catalog, text).into_action() {
            Some(action) => Some(action),
            None => {
                let request = ChoiceRequest {
                    agent: AgentView::from_agent(&self.world, actor, self.config.proximity_threshold),
                    world: WorldView::from_world(&self.world),
                    actions: self.world.catalog.names().into_iter().map(str::to_string).collect(),
                    instruction: Some(text.to_string()),
                };
                match consult(self.config.oracle_timeout_ms, oracle.choose_action(&request)).await {
                    Ok(choice) => choice.and_then(|name| resolve(&self.world.catalog, &name).into_action()),
                    Err(e) => {
                        tracing::warn!(agent = agent.0, error = %e, "oracle failed on prompt");
                        None
                    }
                }
            }
        };
        let Some(action) = action else {
            tracing::info!(agent = agent.0, text, "prompt resolved to no action");
            return Ok(None);
        };

        let Self { world, config, rng } = self;
        let prices = world.price_table(config);
        let mut events = Vec::new();
        let outcome = execute_action(world, agent, &action, &prices, config, rng.as_mut(), &mut events);
        Ok(Some(Executed { action: action.name, outcome, events }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::random::ScriptedRandom;
    use crate::core::types::GridPos;
    use crate::ecs::world::Environment;
    use crate::entity::inventory::Item;
    use crate::llm::oracle::NullOracle;

    fn simulation() -> Simulation {
        let world = World::new(Environment::new("Vale", 10, 10));
        Simulation::new(world, SimConfig::default(), Box::new(ScriptedRandom::constant(0.9)))
    }

    #[tokio::test]
    async fn test_tick_advances_counter() {
        let mut sim = simulation();
        sim.tick(&NullOracle).await;
        assert_eq!(sim.world.current_tick, 1);
    }

    #[tokio::test]
    async fn test_thirsty_agent_drinks() {
        let mut sim = simulation();
        let id = sim.world.spawn_agent("Ada", GridPos::new(1, 1), &sim.config);
        {
            let agent = sim.world.store.agent_mut(id).unwrap();
            agent.needs.thirst = 70.0;
            agent.inventory.add(Item::Water, 1);
        }
        let events = sim.tick(&NullOracle).await;
        assert!(events.iter().any(|e| matches!(e, SimulationEvent::ActionTaken { action, .. } if action == "Drink Water")));
        assert_eq!(sim.world.store.agent(id).unwrap().inventory.count(Item::Water), 0);
    }

    #[tokio::test]
    async fn test_dead_agents_do_not_act() {
        let mut sim = simulation();
        let id = sim.world.spawn_agent("Ada", GridPos::new(1, 1), &sim.config);
        sim.world.store.agent_mut(id).unwrap().die();
        let events = sim.tick(&NullOracle).await;
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn test_prompt_resolves_without_oracle() {
        let mut sim = simulation();
        let id = sim.world.spawn_agent("Ada", GridPos::new(0, 0), &sim.config);
        let executed = sim.prompt_agent(id, "please move west", &NullOracle).await.unwrap().unwrap();
        assert_eq!(executed.action, "Move West");
        assert_eq!(sim.world.store.agent(id).unwrap().position, GridPos::new(0, 0));
    }

    #[tokio::test]
    async fn test_prompt_unknown_agent_errors() {
        let mut sim = simulation();
        let result = sim.prompt_agent(EntityId(99), "rest", &NullOracle).await;
        assert!(matches!(result, Err(CivError::AgentNotFound(_))));
    }

    #[tokio::test]
    async fn test_prompt_with_silent_oracle_is_no_action() {
        let mut sim = simulation();
        let id = sim.world.spawn_agent("Ada", GridPos::new(0, 0), &sim.config);
        assert!(sim.prompt_agent(id, "juggle", &NullOracle).await.unwrap().is_none());
    }
}
