//! Gather world context for oracle prompts
//!
//! The oracle never sees the store directly. It is handed owned, serializable
//! views of one agent and of the shared world, plus a plain-text summary of
//! each that goes into the prompt.

use serde::{Deserialize, Serialize};

use crate::core::types::{EntityId, GridPos, Tick};
use crate::ecs::world::World;
use crate::entity::agent::Agent;

/// Relationships shown to the oracle, strongest first
const MAX_RELATIONS: usize = 5;
const MAX_NEARBY: usize = 6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationView {
    pub name: String,
    pub kind: String,
    pub score: f32,
}

/// What an agent knows about itself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentView {
    pub id: EntityId,
    pub name: String,
    pub description: String,
    pub position: GridPos,
    pub health: f32,
    pub age: f32,
    pub sickness: Option<String>,
    pub hunger: f32,
    pub thirst: f32,
    pub fatigue: f32,
    pub mood: Option<String>,
    pub social_status: f32,
    pub currency: i64,
    pub inventory: Vec<(String, u32)>,
    pub culture: Option<String>,
    pub religion: Option<String>,
    pub role: Option<String>,
    pub imprisoned: bool,
    pub recent_actions: Vec<String>,
    pub relationships: Vec<RelationView>,
    pub nearby: Vec<String>,
}

impl AgentView {
    pub fn from_agent(world: &World, agent: &Agent, proximity: f32) -> Self {
        let store = &world.store;

        let mut relationships: Vec<RelationView> = agent
            .relationships
            .iter()
            .filter_map(|(id, rel)| {
                store.agent(*id).map(|other| RelationView {
                    name: other.name.clone(),
                    kind: format!("{:?}", rel.kind),
                    score: rel.score(),
                })
            })
            .collect();
        relationships.sort_by(|a, b| b.score.abs().total_cmp(&a.score.abs()));
        relationships.truncate(MAX_RELATIONS);

        let nearby = store
            .agents()
            .filter(|other| other.id != agent.id && other.is_alive())
            .filter(|other| other.position.distance(&agent.position) <= proximity)
            .take(MAX_NEARBY)
            .map(|other| other.name.clone())
            .collect();

        Self {
            id: agent.id,
            name: agent.name.clone(),
            description: agent.description.clone(),
            position: agent.position,
            health: agent.health,
            age: agent.age,
            sickness: agent.sickness.clone(),
            hunger: agent.needs.hunger,
            thirst: agent.needs.thirst,
            fatigue: agent.needs.fatigue,
            mood: agent.emotions.strongest().map(|(emotion, _)| format!("{:?}", emotion).to_lowercase()),
            social_status: agent.social_status,
            currency: agent.currency,
            inventory: agent.inventory.iter().map(|(item, n)| (item.name().to_string(), *n)).collect(),
            culture: agent.culture_id().and_then(|c| store.culture(c)).map(|c| c.name.clone()),
            religion: agent.religion_id().and_then(|r| store.religion(r)).map(|r| r.name.clone()),
            role: agent.role.clone(),
            imprisoned: agent.is_imprisoned(),
            recent_actions: agent.last_actions.iter().cloned().collect(),
            relationships,
            nearby,
        }
    }

    /// Prompt-ready summary
    pub fn summary(&self) -> String {
        let mut lines = vec![
            format!("You are {} at ({}, {}).", self.name, self.position.x, self.position.y),
            format!(
                "Health {:.0}, age {:.0}, hunger {:.0}, thirst {:.0}, fatigue {:.0}.",
                self.health, self.age, self.hunger, self.thirst, self.fatigue
            ),
            format!("Status {:.0}, coins {}.", self.social_status, self.currency),
        ];
        if !self.description.is_empty() {
            lines.push(self.description.clone());
        }
        if let Some(sickness) = &self.sickness {
            lines.push(format!("You are sick with {}.", sickness));
        }
        if let Some(mood) = &self.mood {
            lines.push(format!("You feel {}.", mood));
        }
        if self.imprisoned {
            lines.push("You are locked in jail.".to_string());
        }
        if !self.inventory.is_empty() {
            let items: Vec<String> = self.inventory.iter().map(|(name, n)| format!("{} {}", n, name)).collect();
            lines.push(format!("You carry: {}.", items.join(", ")));
        }
        if let Some(culture) = &self.culture {
            lines.push(format!("Your people: {}.", culture));
        }
        if let Some(religion) = &self.religion {
            lines.push(format!("Your faith: {}.", religion));
        }
        if !self.relationships.is_empty() {
            let known: Vec<String> = self
                .relationships
                .iter()
                .map(|r| format!("{} ({}, {:.0})", r.name, r.kind.to_lowercase(), r.score))
                .collect();
            lines.push(format!("You know: {}.", known.join(", ")));
        }
        if !self.nearby.is_empty() {
            lines.push(format!("Nearby: {}.", self.nearby.join(", ")));
        }
        if !self.recent_actions.is_empty() {
            lines.push(format!("Lately you chose: {}.", self.recent_actions.join(", ")));
        }
        lines.join("\n")
    }
}

/// Shared facts every prompt carries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldView {
    pub tick: Tick,
    pub environment: String,
    pub description: String,
    pub width: i32,
    pub height: i32,
    pub population: usize,
    pub leader: Option<String>,
    pub laws: Vec<String>,
    pub election_open: bool,
}

impl WorldView {
    pub fn from_world(world: &World) -> Self {
        Self {
            tick: world.current_tick,
            environment: world.environment.name.clone(),
            description: world.environment.description.clone(),
            width: world.environment.width,
            height: world.environment.height,
            population: world.store.living_count(),
            leader: world.government.leader.and_then(|id| world.store.agent(id)).map(|a| a.name.clone()),
            laws: world.government.laws.iter().map(|law| law.name.clone()).collect(),
            election_open: world.election.as_ref().map_or(false, |e| e.active),
        }
    }

    pub fn summary(&self) -> String {
        let mut lines = vec![
            format!("Tick {} in {} ({}x{}).", self.tick, self.environment, self.width, self.height),
            format!("{} people live here.", self.population),
        ];
        if !self.description.is_empty() {
            lines.push(self.description.clone());
        }
        match &self.leader {
            Some(leader) => lines.push(format!("{} leads the community.", leader)),
            None => lines.push("Nobody leads the community.".to_string()),
        }
        if !self.laws.is_empty() {
            lines.push(format!("Laws: {}.", self.laws.join(", ")));
        }
        if self.election_open {
            lines.push("An election is under way.".to_string());
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SimConfig;
    use crate::ecs::world::Environment;
    use crate::entity::inventory::Item;

    #[test]
    fn test_agent_view_lists_nearby_and_inventory() {
        let config = SimConfig::default();
        let mut world = World::new(Environment::new("Vale", 10, 10));
        let ada = world.spawn_agent("Ada", GridPos::new(1, 1), &config);
        world.spawn_agent("Bo", GridPos::new(2, 1), &config);
        world.spawn_agent("Cy", GridPos::new(9, 9), &config);
        world.store.agent_mut(ada).unwrap().inventory.add(Item::Food, 3);

        let view = AgentView::from_agent(&world, world.store.agent(ada).unwrap(), config.proximity_threshold);
        assert_eq!(view.nearby, vec!["Bo".to_string()]);
        assert_eq!(view.inventory, vec![("food".to_string(), 3)]);
        assert!(view.summary().contains("You carry: 3 food."));
    }

    #[test]
    fn test_world_view_summary() {
        let world = World::new(Environment::new("Vale", 10, 10));
        let view = WorldView::from_world(&world);
        assert!(view.summary().contains("Nobody leads"));
        assert_eq!(view.population, 0);
    }
}
