//! Simulation configuration with documented constants
//!
//! All magic numbers are collected here with explanations of their purpose
//! and how they interact with each other. The struct is loaded from TOML;
//! any field left out keeps its default.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::error::{CivError, Result};

/// Configuration for the simulation systems
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    // === NEEDS ===
    /// Hunger added per tick
    pub hunger_rate: f32,
    /// Thirst added per tick (thirst outpaces hunger)
    pub thirst_rate: f32,
    /// Fatigue added per tick
    pub fatigue_rate: f32,
    /// Needs never grow past this ceiling
    pub need_ceiling: f32,
    /// Needs above this level start costing health
    pub need_damage_threshold: f32,
    /// Health lost per tick while hunger is over the threshold
    pub starvation_damage: f32,
    /// Health lost per tick while thirst is over the threshold
    pub dehydration_damage: f32,

    // === AGING ===
    /// Years added per tick
    pub age_increment: f32,
    /// Past this age health declines every tick
    pub max_age: f32,
    /// Health lost per tick past `max_age` (halved by the longevity gene)
    pub old_age_decline: f32,
    /// Agents at or above this age are elders
    pub elder_age: f32,

    // === PSYCHE ===
    /// Multiplier applied to every emotion each tick
    pub emotion_decay: f32,
    /// Multiplier applied to every relationship disposition each tick
    pub disposition_decay: f32,
    /// Pull toward culture beliefs per tick
    pub culture_assimilation_rate: f32,
    /// Pull toward religion dogma per tick (roughly double the culture rate)
    pub religion_assimilation_rate: f32,

    // === DISEASE ===
    /// Chance per tick that a healthy agent falls sick
    pub sickness_chance: f32,
    /// Health lost per tick while sick (halved by the resistant gene)
    pub sickness_damage: f32,
    /// Chance per tick that a sick agent recovers
    pub sickness_recovery_chance: f32,

    // === SOCIAL ===
    /// Euclidean distance under which agents notice each other
    pub proximity_threshold: f32,
    /// Relationship score gained per tick spent near someone
    pub proximity_increment: f32,
    /// Relationship score gained per conversation line, both directions
    pub conversation_increment: f32,
    /// Trust gained by the speaker toward the listener per line
    pub conversation_trust_gain: f32,
    /// Chance that two adjacent idle agents start talking
    pub conversation_start_chance: f32,
    /// Conversations idle for longer than this many ticks are dropped
    pub conversation_timeout_ticks: u64,
    /// Capacity of the conversation history ring buffer
    pub conversation_history_len: usize,
    /// Capacity of the social memory ring buffer
    pub social_memory_len: usize,
    /// Lines of history handed to the oracle
    pub oracle_history_lines: usize,
    /// Milliseconds before an oracle call is abandoned
    pub oracle_timeout_ms: u64,

    // === ACTION SELECTION ===
    /// Fatigue above which the agent must rest
    pub fatigue_override: f32,
    /// Thirst above which the agent must drink
    pub thirst_override: f32,
    /// Hunger above which the agent must eat or gather food
    pub hunger_override: f32,
    /// Sick agents under this health must rest
    pub sick_rest_health: f32,
    /// Chance per tick that an elder rests regardless of needs
    pub elder_rest_chance: f32,
    /// Weight for actions with no belief key
    pub default_belief_weight: f32,
    /// Resonance added each time an action is chosen
    pub resonance_gain: f32,
    /// Multiplier applied to resonance each tick
    pub resonance_decay: f32,
    /// Resonance below this value is forgotten
    pub resonance_cutoff: f32,
    /// Length of the last-actions history
    pub last_actions_len: usize,

    // === ACTIONS ===
    /// Distance under which gathering and trading work
    pub interaction_range: f32,
    /// Skill gained per successful gather
    pub skill_increment: f32,
    /// Hunger removed by eating
    pub eat_amount: f32,
    /// Thirst removed by drinking
    pub drink_amount: f32,
    /// Fatigue removed by resting
    pub rest_amount: f32,
    /// Distance within which a guard steps in
    pub guard_range: f32,
    /// Social status lost on a warning
    pub warning_status_penalty: f32,
    /// Wage paid per work action
    pub wage: i64,
    /// Currency needed to found a business
    pub business_cost: i64,
    /// Minimum social status to run for office
    pub candidacy_status: f32,
    /// Minimum social status to found a culture or religion
    pub founding_status: f32,
    /// Share of weighted support a law needs
    pub law_majority: f32,

    // === FAMILY ===
    pub min_reproduction_age: f32,
    pub max_reproduction_age: f32,
    /// Children per parent before reproduction stops
    pub offspring_cap: u32,
    pub conception_chance: f32,
    /// Chance that each inherited gene survives
    pub gene_keep_chance: f32,
    /// Chance that the child gains a random new gene
    pub gene_mutation_chance: f32,

    // === WORLD ===
    /// Ticks between culture belief averaging passes
    pub culture_averaging_interval: u64,
    /// Transactions considered when pricing
    pub price_window: usize,
    /// Price growth per recent sale of an item
    pub demand_factor: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            hunger_rate: 0.5,
            thirst_rate: 0.75,
            fatigue_rate: 0.4,
            need_ceiling: 150.0,
            need_damage_threshold: 100.0,
            starvation_damage: 1.0,
            dehydration_damage: 2.0,

            age_increment: 0.01,
            max_age: 80.0,
            old_age_decline: 0.5,
            elder_age: 60.0,

            emotion_decay: 0.95,
            disposition_decay: 0.98,
            culture_assimilation_rate: 0.01,
            religion_assimilation_rate: 0.02,

            sickness_chance: 0.001,
            sickness_damage: 0.5,
            sickness_recovery_chance: 0.02,

            proximity_threshold: 2.0,
            proximity_increment: 1.0,
            conversation_increment: 2.0,
            conversation_trust_gain: 0.1,
            conversation_start_chance: 0.2,
            conversation_timeout_ticks: 5,
            conversation_history_len: 20,
            social_memory_len: 20,
            oracle_history_lines: 6,
            oracle_timeout_ms: 10_000,

            fatigue_override: 80.0,
            thirst_override: 60.0,
            hunger_override: 60.0,
            sick_rest_health: 30.0,
            elder_rest_chance: 0.3,
            default_belief_weight: 0.5,
            resonance_gain: 0.5,
            resonance_decay: 0.9,
            resonance_cutoff: 0.01,
            last_actions_len: 10,

            interaction_range: 2.0,
            skill_increment: 0.1,
            eat_amount: 50.0,
            drink_amount: 50.0,
            rest_amount: 30.0,
            guard_range: 5.0,
            warning_status_penalty: 10.0,
            wage: 10,
            business_cost: 50,
            candidacy_status: 50.0,
            founding_status: 40.0,
            law_majority: 0.5,

            min_reproduction_age: 18.0,
            max_reproduction_age: 50.0,
            offspring_cap: 5,
            conception_chance: 0.3,
            gene_keep_chance: 0.5,
            gene_mutation_chance: 0.05,

            culture_averaging_interval: 10,
            price_window: 50,
            demand_factor: 0.05,
        }
    }
}

impl SimConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SimConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.need_ceiling <= self.need_damage_threshold {
            return Err(CivError::Config(format!(
                "need_ceiling ({}) should be > need_damage_threshold ({})",
                self.need_ceiling, self.need_damage_threshold
            )));
        }

        for (name, factor) in [
            ("emotion_decay", self.emotion_decay),
            ("disposition_decay", self.disposition_decay),
            ("resonance_decay", self.resonance_decay),
        ] {
            if !(0.0..=1.0).contains(&factor) {
                return Err(CivError::Config(format!("{} ({}) must be within [0, 1]", name, factor)));
            }
        }

        if self.min_reproduction_age >= self.max_reproduction_age {
            return Err(CivError::Config(format!(
                "min_reproduction_age ({}) should be < max_reproduction_age ({})",
                self.min_reproduction_age, self.max_reproduction_age
            )));
        }

        if self.conversation_history_len == 0 || self.social_memory_len == 0 {
            return Err(CivError::Config("ring buffer capacities must be positive".into()));
        }

        Ok(())
    }
}
