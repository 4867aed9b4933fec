//! Command execution - direct world edits requested by a UI or operator
//!
//! Commands are synchronous store mutations. They never fail loudly: an
//! unknown id yields a `CommandResult` with `ok == false` and a message.

use serde::{Deserialize, Serialize};

use crate::actions::catalog::ActionDef;
use crate::core::config::SimConfig;
use crate::core::types::{CultureId, EntityId, GridPos};
use crate::ecs::world::World;
use crate::entity::place::PlaceRole;
use crate::simulation::needs_decay::mourn;
use crate::society::government::{Law, Offense};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    CreateAgent {
        name: String,
        #[serde(default)]
        position: GridPos,
        #[serde(default)]
        description: Option<String>,
    },
    RemoveAgent {
        agent: EntityId,
    },
    CreateEntity {
        name: String,
        #[serde(default)]
        position: GridPos,
        #[serde(default)]
        role: Option<PlaceRole>,
    },
    RemoveEntity {
        entity: EntityId,
    },
    AddAction {
        action: ActionDef,
    },
    RemoveAction {
        name: String,
    },
    SetHealth {
        agent: EntityId,
        health: f32,
    },
    SetPosition {
        agent: EntityId,
        position: GridPos,
    },
    SetSickness {
        agent: EntityId,
        sickness: Option<String>,
    },
    SetCurrency {
        agent: EntityId,
        currency: i64,
    },
    Resurrect {
        agent: EntityId,
    },
    SetEnvironment {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        width: Option<i32>,
        #[serde(default)]
        height: Option<i32>,
    },
    EnactLaw {
        offense: Offense,
        punishment: u64,
    },
    RepealLaw {
        offense: Offense,
    },
    StartElection {
        duration: u64,
    },
    SetLeader {
        agent: Option<EntityId>,
    },
    UnlockTechnology {
        culture: CultureId,
        tech: String,
    },
}

/// Result of executing a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub ok: bool,
    pub message: String,
}

impl CommandResult {
    fn ok(message: impl Into<String>) -> Self {
        Self { ok: true, message: message.into() }
    }

    fn rejected(message: impl Into<String>) -> Self {
        Self { ok: false, message: message.into() }
    }

    fn no_agent(id: EntityId) -> Self {
        Self::rejected(format!("no agent {}", id))
    }
}

/// Applies commands to a world
pub struct CommandExecutor;

impl CommandExecutor {
    pub fn execute(world: &mut World, command: Command, config: &SimConfig) -> CommandResult {
        let result = match command {
            Command::CreateAgent { name, position, description } => {
                let position = position.clamped(world.environment.width, world.environment.height);
                let id = world.spawn_agent(name.as_str(), position, config);
                if let (Some(description), Some(agent)) = (description, world.store.agent_mut(id)) {
                    agent.description = description;
                }
                CommandResult::ok(format!("created {} as {}", name, id))
            }
            Command::RemoveAgent { agent } => match world.remove_agent(agent) {
                Some(removed) => CommandResult::ok(format!("removed {}", removed.name)),
                None => CommandResult::no_agent(agent),
            },
            Command::CreateEntity { name, position, role } => {
                let position = position.clamped(world.environment.width, world.environment.height);
                let id = world.spawn_place(name.as_str(), position, |place| match role {
                    Some(role) => place.with_role(role),
                    None => place,
                });
                CommandResult::ok(format!("created {} as {}", name, id))
            }
            Command::RemoveEntity { entity } => match world.store.remove_place(entity) {
                Some(place) => CommandResult::ok(format!("removed {}", place.name)),
                None => CommandResult::rejected(format!("no entity {}", entity)),
            },
            Command::AddAction { action } => {
                let name = action.name.clone();
                world.catalog.add(action);
                CommandResult::ok(format!("action {} available", name))
            }
            Command::RemoveAction { name } => {
                if world.catalog.remove(&name) {
                    CommandResult::ok(format!("action {} removed", name))
                } else {
                    CommandResult::rejected(format!("no action named {}", name))
                }
            }
            Command::SetHealth { agent, health } => {
                let Some(a) = world.store.agent_mut(agent) else {
                    return CommandResult::no_agent(agent);
                };
                let died = a.apply_health_delta(health - a.health);
                let result = if died {
                    CommandResult::ok(format!("{} died", a.name))
                } else {
                    CommandResult::ok(format!("{} health {:.0}", a.name, a.health))
                };
                if died {
                    mourn(&mut world.store, agent, world.current_tick);
                    tracing::info!(agent = agent.0, cause = "admin", "death");
                }
                result
            }
            Command::SetPosition { agent, position } => {
                let position = position.clamped(world.environment.width, world.environment.height);
                match world.store.agent_mut(agent) {
                    Some(a) => {
                        a.position = position;
                        CommandResult::ok(format!("{} moved to ({}, {})", a.name, position.x, position.y))
                    }
                    None => CommandResult::no_agent(agent),
                }
            }
            Command::SetSickness { agent, sickness } => match world.store.agent_mut(agent) {
                Some(a) => {
                    a.sickness = sickness;
                    CommandResult::ok(format!("{} sickness {}", a.name, a.sickness.as_deref().unwrap_or("cleared")))
                }
                None => CommandResult::no_agent(agent),
            },
            Command::SetCurrency { agent, currency } => match world.store.agent_mut(agent) {
                Some(a) => {
                    a.currency = currency.max(0);
                    CommandResult::ok(format!("{} has {} coins", a.name, a.currency))
                }
                None => CommandResult::no_agent(agent),
            },
            Command::Resurrect { agent } => match world.store.agent_mut(agent) {
                Some(a) if a.is_alive() => CommandResult::rejected(format!("{} is not dead", a.name)),
                Some(a) => {
                    a.resurrect();
                    CommandResult::ok(format!("{} lives again", a.name))
                }
                None => CommandResult::no_agent(agent),
            },
            Command::SetEnvironment { name, description, width, height } => {
                if let Some(name) = name {
                    world.environment.name = name;
                }
                if let Some(description) = description {
                    world.environment.description = description;
                }
                let w = width.unwrap_or(world.environment.width);
                let h = height.unwrap_or(world.environment.height);
                world.resize(w, h);
                let env = &world.environment;
                CommandResult::ok(format!("environment {} is {}x{}", env.name, env.width, env.height))
            }
            Command::EnactLaw { offense, punishment } => {
                let law = Law::against(offense, punishment);
                let name = law.name.clone();
                if world.government.enact(law) {
                    CommandResult::ok(format!("{} enacted", name))
                } else {
                    CommandResult::rejected(format!("{} already covered", offense.name()))
                }
            }
            Command::RepealLaw { offense } => {
                if world.government.repeal(offense) {
                    CommandResult::ok(format!("{} is legal again", offense.name()))
                } else {
                    CommandResult::rejected(format!("no law against {}", offense.name()))
                }
            }
            Command::StartElection { duration } => {
                if world.start_election(duration) {
                    let ends_at = world.election.as_ref().map_or(world.current_tick, |e| e.ends_at);
                    CommandResult::ok(format!("election open until tick {}", ends_at))
                } else {
                    CommandResult::rejected("an election is already running")
                }
            }
            Command::SetLeader { agent: None } => {
                world.government.leader = None;
                CommandResult::ok("leader cleared")
            }
            Command::SetLeader { agent: Some(agent) } => match world.store.agent(agent) {
                Some(a) => {
                    let message = format!("{} now leads", a.name);
                    world.government.leader = Some(agent);
                    CommandResult::ok(message)
                }
                None => CommandResult::no_agent(agent),
            },
            Command::UnlockTechnology { culture, tech } => {
                if world.tech_tree.get(&tech).is_none() {
                    return CommandResult::rejected(format!("no technology {}", tech));
                }
                match world.store.culture_mut(culture) {
                    Some(c) => {
                        if c.learn(tech.as_str()) {
                            CommandResult::ok(format!("{} knows {}", c.name, tech))
                        } else {
                            CommandResult::rejected(format!("{} already knows {}", c.name, tech))
                        }
                    }
                    None => CommandResult::rejected(format!("no culture {}", culture.0)),
                }
            }
        };

        tracing::debug!(ok = result.ok, message = %result.message, "command");
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::world::Environment;
    use crate::entity::agent::TraumaKind;
    use crate::entity::psyche::Emotion;
    use std::collections::BTreeMap;

    fn setup() -> (World, SimConfig) {
        (World::new(Environment::new("Vale", 10, 10)), SimConfig::default())
    }

    #[test]
    fn test_create_agent_clamps_position() {
        let (mut world, config) = setup();
        let result = CommandExecutor::execute(
            &mut world,
            Command::CreateAgent { name: "Ada".into(), position: GridPos::new(40, -3), description: None },
            &config,
        );
        assert!(result.ok);
        let ada = world.store.find_agent_by_name("Ada").unwrap();
        assert_eq!(ada.position, GridPos::new(9, 0));
    }

    #[test]
    fn test_unknown_agent_is_a_no_op() {
        let (mut world, config) = setup();
        let result = CommandExecutor::execute(&mut world, Command::SetHealth { agent: EntityId(77), health: 5.0 }, &config);
        assert!(!result.ok);
        assert!(result.message.contains("#77"));
    }

    #[test]
    fn test_zero_health_kills_and_resurrect_revives() {
        let (mut world, config) = setup();
        let id = world.spawn_agent("Ada", GridPos::new(1, 1), &config);
        CommandExecutor::execute(&mut world, Command::SetHealth { agent: id, health: -10.0 }, &config);
        assert!(!world.store.agent(id).unwrap().is_alive());

        let result = CommandExecutor::execute(&mut world, Command::Resurrect { agent: id }, &config);
        assert!(result.ok);
        let ada = world.store.agent(id).unwrap();
        assert!(ada.is_alive());
        assert!(ada.health > 0.0);
    }

    #[test]
    fn test_zero_health_is_mourned_by_friends() {
        let (mut world, config) = setup();
        let ada = world.spawn_agent("Ada", GridPos::new(1, 1), &config);
        let bo = world.spawn_agent("Bo", GridPos::new(2, 1), &config);
        world.store.agent_mut(bo).unwrap().relationships.ensure(ada).set_score(90.0);

        let result = CommandExecutor::execute(&mut world, Command::SetHealth { agent: ada, health: 0.0 }, &config);
        assert_eq!(result.message, "Ada died");
        let bo = world.store.agent(bo).unwrap();
        assert_eq!(bo.traumas.len(), 1);
        assert_eq!(bo.traumas[0].kind, TraumaKind::Loss);
        assert_eq!(bo.traumas[0].source, Some(ada));
        assert!(bo.emotions.get(Emotion::Sadness) > 0.0);
    }

    #[test]
    fn test_removing_jailed_candidate_leaves_no_trace() {
        let (mut world, config) = setup();
        let ada = world.spawn_agent("Ada", GridPos::new(1, 1), &config);
        let bo = world.spawn_agent("Bo", GridPos::new(2, 1), &config);
        let jail = world.spawn_place("Stockade", GridPos::new(5, 5), |p| {
            p.with_role(PlaceRole::Jail { inmates: vec![ada] })
        });
        let farm = world.spawn_place("Farm", GridPos::new(3, 3), |p| p.with_owner(ada));
        world.start_election(5);
        let election = world.election.as_mut().unwrap();
        election.register(ada);
        election.cast(bo, ada);

        assert!(CommandExecutor::execute(&mut world, Command::RemoveAgent { agent: ada }, &config).ok);
        assert!(world.store.place(jail).unwrap().inmates().is_empty());
        assert_eq!(world.store.place(farm).unwrap().owner, None);
        let election = world.election.as_ref().unwrap();
        assert!(election.candidates.is_empty());
        assert_eq!(election.total_votes(), 0);
        assert_eq!(election.winner(), None);
    }

    #[test]
    fn test_law_enact_and_repeal() {
        let (mut world, config) = setup();
        let enact = Command::EnactLaw { offense: Offense::Stealing, punishment: 5 };
        assert!(CommandExecutor::execute(&mut world, enact.clone(), &config).ok);
        assert!(!CommandExecutor::execute(&mut world, enact, &config).ok);
        assert!(CommandExecutor::execute(&mut world, Command::RepealLaw { offense: Offense::Stealing }, &config).ok);
        assert!(world.government.laws.is_empty());
    }

    #[test]
    fn test_unlock_technology() {
        let (mut world, config) = setup();
        let culture = world.store.create_culture("Riverfolk", BTreeMap::new());
        let unlock = Command::UnlockTechnology { culture, tech: "writing".into() };
        assert!(CommandExecutor::execute(&mut world, unlock, &config).ok);
        assert!(world.store.culture(culture).unwrap().knows("writing"));

        let bogus = Command::UnlockTechnology { culture, tech: "warp drive".into() };
        assert!(!CommandExecutor::execute(&mut world, bogus, &config).ok);
    }

    #[test]
    fn test_shrinking_environment_pulls_agents_in() {
        let (mut world, config) = setup();
        let id = world.spawn_agent("Ada", GridPos::new(8, 8), &config);
        let shrink = Command::SetEnvironment { name: None, description: None, width: Some(4), height: Some(4) };
        CommandExecutor::execute(&mut world, shrink, &config);
        assert_eq!(world.store.agent(id).unwrap().position, GridPos::new(3, 3));
    }

    #[test]
    fn test_shrinking_environment_pulls_places_in() {
        let (mut world, config) = setup();
        let well = world.spawn_place("Well", GridPos::new(9, 2), |p| p);
        let shrink = Command::SetEnvironment { name: None, description: None, width: Some(4), height: None };
        let result = CommandExecutor::execute(&mut world, shrink, &config);
        assert_eq!(result.message, "environment Vale is 4x10");
        let position = world.store.place(well).unwrap().position;
        assert_eq!(position, GridPos::new(3, 2));
        assert!(world.environment.contains(position));
    }

    #[test]
    fn test_command_from_json() {
        let command: Command = serde_json::from_str(r#"{"command":"start_election","duration":5}"#).unwrap();
        let (mut world, config) = setup();
        assert!(CommandExecutor::execute(&mut world, command, &config).ok);
        assert_eq!(world.election.as_ref().unwrap().ends_at, 5);
    }

    #[test]
    fn test_custom_action_round_trip() {
        let (mut world, config) = setup();
        let def = ActionDef { name: "Juggle".into(), description: "Entertain".into(), belief_key: None };
        CommandExecutor::execute(&mut world, Command::AddAction { action: def }, &config);
        assert!(world.catalog.get("juggle").is_some());
        assert!(CommandExecutor::execute(&mut world, Command::RemoveAction { name: "Juggle".into() }, &config).ok);
        assert!(world.catalog.get("juggle").is_none());
    }
}
