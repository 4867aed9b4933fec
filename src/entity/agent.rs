//! The agent record - the unit of simulation

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::config::SimConfig;
use crate::core::types::{CultureId, EntityId, GridPos, ReligionId, Tick};
use crate::entity::genome::Genome;
use crate::entity::inventory::{Inventory, Skills};
use crate::entity::needs::Needs;
use crate::entity::psyche::{Drive, Emotion, Intensities, Personality};
use crate::entity::relationships::Relationships;
use crate::entity::social::{RingBuffer, SocialEvent};

/// Belief keys shared by agents, cultures, religions and actions
pub mod beliefs {
    pub const SURVIVAL: &str = "survival";
    pub const COMMUNITY: &str = "community";
    pub const WEALTH: &str = "wealth";
    pub const FAITH: &str = "faith";
    pub const POWER: &str = "power";
    pub const KNOWLEDGE: &str = "knowledge";
    pub const VIOLENCE: &str = "violence";
    pub const FAMILY: &str = "family";
    pub const CRAFT: &str = "craft";

    pub const ALL: [&str; 9] = [
        SURVIVAL, COMMUNITY, WEALTH, FAITH, POWER, KNOWLEDGE, VIOLENCE, FAMILY, CRAFT,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GoalStatus {
    Active,
    Completed,
    Abandoned,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub kind: String,
    pub status: GoalStatus,
    pub progress: f32,
    pub description: String,
    pub target: Option<EntityId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TraumaKind {
    Assault,
    Loss,
    Imprisonment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trauma {
    pub kind: TraumaKind,
    pub tick: Tick,
    pub severity: f32,
    pub source: Option<EntityId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Imprisonment {
    pub jail: EntityId,
    pub starts_at: Tick,
    pub ends_at: Tick,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: EntityId,
    pub name: String,
    pub description: String,
    pub position: GridPos,

    pub health: f32,
    alive: bool,
    pub sickness: Option<String>,
    pub age: f32,
    pub needs: Needs,

    pub personality: Personality,
    pub emotions: Intensities<Emotion>,
    pub psyche: Intensities<Drive>,
    pub stress: f32,
    pub social_status: f32,
    pub beliefs: BTreeMap<String, f32>,

    pub relationships: Relationships,
    pub social_memory: RingBuffer<SocialEvent>,
    pub conversation_history: RingBuffer<String>,

    pub currency: i64,
    pub inventory: Inventory,
    pub skills: Skills,

    culture_id: Option<CultureId>,
    religion_id: Option<ReligionId>,
    pub role: Option<String>,
    pub genome: Genome,

    pub goals: Vec<Goal>,
    pub traumas: Vec<Trauma>,
    pub imprisonment: Option<Imprisonment>,

    /// Exempt from needs and autonomous action
    pub privileged: bool,
    pub parents: Option<(EntityId, EntityId)>,
    pub offspring: u32,

    pub resonance: BTreeMap<String, f32>,
    pub last_actions: RingBuffer<String>,
}

impl Agent {
    pub fn new(id: EntityId, name: impl Into<String>, position: GridPos, config: &SimConfig) -> Self {
        let beliefs = beliefs::ALL.iter().map(|k| (k.to_string(), 0.5)).collect();
        Self {
            id,
            name: name.into(),
            description: String::new(),
            position,
            health: 100.0,
            alive: true,
            sickness: None,
            age: 20.0,
            needs: Needs::default(),
            personality: Personality::default(),
            emotions: Intensities::new(),
            psyche: Intensities::new(),
            stress: 0.0,
            social_status: 50.0,
            beliefs,
            relationships: Relationships::default(),
            social_memory: RingBuffer::new(config.social_memory_len),
            conversation_history: RingBuffer::new(config.conversation_history_len),
            currency: 20,
            inventory: Inventory::default(),
            skills: Skills::default(),
            culture_id: None,
            religion_id: None,
            role: None,
            genome: Genome::default(),
            goals: Vec::new(),
            traumas: Vec::new(),
            imprisonment: None,
            privileged: false,
            parents: None,
            offspring: 0,
            resonance: BTreeMap::new(),
            last_actions: RingBuffer::new(config.last_actions_len),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Living, not privileged
    pub fn is_active(&self) -> bool {
        self.alive && !self.privileged
    }

    /// Marks the agent dead. Returns true only on the living -> dead transition.
    pub fn die(&mut self) -> bool {
        if !self.alive {
            return false;
        }
        self.alive = false;
        self.health = 0.0;
        true
    }

    /// Explicit admin command; the only way back from death
    pub fn resurrect(&mut self) {
        self.alive = true;
        self.health = self.health.max(50.0);
        self.sickness = None;
    }

    /// Clamp health to [0, 100] and flag death at zero. Returns true if the agent just died.
    pub fn apply_health_delta(&mut self, delta: f32) -> bool {
        self.health = (self.health + delta).clamp(0.0, 100.0);
        if self.health <= 0.0 {
            return self.die();
        }
        false
    }

    pub fn culture_id(&self) -> Option<CultureId> {
        self.culture_id
    }

    pub fn religion_id(&self) -> Option<ReligionId> {
        self.religion_id
    }

    /// Membership lists must be kept in sync; only the entity store calls this
    pub(crate) fn set_culture_id(&mut self, culture: Option<CultureId>) {
        self.culture_id = culture;
    }

    pub(crate) fn set_religion_id(&mut self, religion: Option<ReligionId>) {
        self.religion_id = religion;
    }

    pub fn belief(&self, key: &str) -> f32 {
        self.beliefs.get(key).copied().unwrap_or(0.5)
    }

    pub fn is_imprisoned(&self) -> bool {
        self.imprisonment.is_some()
    }

    pub fn is_elder(&self, config: &SimConfig) -> bool {
        self.age >= config.elder_age
    }

    pub fn adjust_status(&mut self, delta: f32) {
        self.social_status = (self.social_status + delta).clamp(0.0, 100.0);
    }

    pub fn adjust_stress(&mut self, delta: f32) {
        self.stress = (self.stress + delta).clamp(0.0, 100.0);
    }

    pub fn remember(&mut self, event: SocialEvent) {
        self.social_memory.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent() -> Agent {
        Agent::new(EntityId(1), "Ada", GridPos::new(0, 0), &SimConfig::default())
    }

    #[test]
    fn test_death_happens_once() {
        let mut a = agent();
        assert!(a.apply_health_delta(-150.0));
        assert!(!a.is_alive());
        assert_eq!(a.health, 0.0);
        assert!(!a.apply_health_delta(-10.0));
        assert!(!a.die());
    }

    #[test]
    fn test_resurrect_restores_life() {
        let mut a = agent();
        a.die();
        a.resurrect();
        assert!(a.is_alive());
        assert!(a.health >= 50.0);
    }

    #[test]
    fn test_health_clamped_high() {
        let mut a = agent();
        a.apply_health_delta(40.0);
        assert_eq!(a.health, 100.0);
    }

    #[test]
    fn test_default_beliefs() {
        let a = agent();
        assert_eq!(a.belief(beliefs::FAITH), 0.5);
        assert_eq!(a.belief("unknown"), 0.5);
    }
}
