//! What an action reports back to the engine

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::types::{CultureId, EntityId, GridPos, ReligionId};
use crate::entity::inventory::Item;
use crate::entity::place::PlaceRole;
use crate::society::economy::Transaction;
use crate::society::government::Law;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionStatus {
    Success,
    Failure,
    Neutral,
}

/// Reward attached to guard failures
pub const FAILURE_REWARD: f32 = -0.1;

/// A new place requested by an action; the engine assigns the id
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceSpec {
    pub name: String,
    pub description: String,
    pub position: GridPos,
    pub resource: Option<(Item, u32)>,
    pub owner: Option<EntityId>,
    pub role: Option<PlaceRole>,
}

/// Structural changes an action asks the engine to apply
#[derive(Debug, Clone, PartialEq)]
pub enum SideEffect {
    CreateAgent { parents: (EntityId, EntityId), position: GridPos },
    CreateEntity(PlaceSpec),
    ChangeCulture { agent: EntityId, culture: Option<CultureId> },
    ChangeReligion { agent: EntityId, religion: Option<ReligionId> },
    CreateCulture { founder: EntityId, name: String, beliefs: BTreeMap<String, f32> },
    CreateReligion { founder: EntityId, name: String, dogma: BTreeMap<String, f32> },
    AddResearch { culture: CultureId, points: f32 },
    InventTechnology { culture: CultureId, tech: String },
    RegisterCandidate { candidate: EntityId },
    CastVote { voter: EntityId, candidate: EntityId },
    EnactLaw(Law),
    RecordTransaction(Transaction),
    Imprison { agent: EntityId, jail: EntityId, duration: u64 },
    RecordDeath { agent: EntityId, cause: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActionOutcome {
    pub status: ActionStatus,
    /// Stable dotted key, e.g. `vote.no_candidates`
    pub log_key: String,
    pub message: String,
    pub reward: f32,
    pub side_effects: Vec<SideEffect>,
}

impl ActionOutcome {
    fn with_status(status: ActionStatus, key: &str, message: impl Into<String>, reward: f32) -> Self {
        Self {
            status,
            log_key: key.to_string(),
            message: message.into(),
            reward,
            side_effects: Vec::new(),
        }
    }

    pub fn success(key: &str, message: impl Into<String>) -> Self {
        Self::with_status(ActionStatus::Success, key, message, 1.0)
    }

    pub fn failure(key: &str, message: impl Into<String>) -> Self {
        Self::with_status(ActionStatus::Failure, key, message, FAILURE_REWARD)
    }

    pub fn neutral(key: &str, message: impl Into<String>) -> Self {
        Self::with_status(ActionStatus::Neutral, key, message, 0.0)
    }

    pub fn with_reward(mut self, reward: f32) -> Self {
        self.reward = reward;
        self
    }

    pub fn with_effect(mut self, effect: SideEffect) -> Self {
        self.side_effects.push(effect);
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == ActionStatus::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_has_small_negative_reward() {
        let outcome = ActionOutcome::failure("craft.missing_ingredients", "no wood");
        assert_eq!(outcome.status, ActionStatus::Failure);
        assert_eq!(outcome.reward, FAILURE_REWARD);
        assert!(outcome.side_effects.is_empty());
    }

    #[test]
    fn test_with_effect_accumulates() {
        let outcome = ActionOutcome::success("vote.ok", "voted")
            .with_effect(SideEffect::CastVote { voter: EntityId(1), candidate: EntityId(2) });
        assert_eq!(outcome.side_effects.len(), 1);
        assert!(outcome.is_success());
    }
}
