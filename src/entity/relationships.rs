//! Relationships keyed by the other agent's id

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::types::EntityId;
use crate::entity::psyche::Intensities;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationshipType {
    Stranger,
    Acquaintance,
    Friend,
    Rival,
    Partner,
    Spouse,
    ExPartner,
}

impl RelationshipType {
    /// Types that only actions change; score drift never overrides them
    pub fn is_sticky(&self) -> bool {
        matches!(
            self,
            RelationshipType::Rival
                | RelationshipType::Partner
                | RelationshipType::Spouse
                | RelationshipType::ExPartner
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DispositionKind {
    Trust,
    Affection,
    Anger,
    Fear,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub kind: RelationshipType,
    score: f32,
    pub disposition: Intensities<DispositionKind>,
}

impl Relationship {
    pub const ACQUAINTANCE_SCORE: f32 = 20.0;
    pub const FRIEND_SCORE: f32 = 50.0;

    pub fn stranger() -> Self {
        Self {
            kind: RelationshipType::Stranger,
            score: 0.0,
            disposition: Intensities::new(),
        }
    }

    pub fn score(&self) -> f32 {
        self.score
    }

    pub fn set_score(&mut self, score: f32) {
        self.score = score.clamp(0.0, 100.0);
        self.refresh_kind();
    }

    pub fn add_score(&mut self, delta: f32) {
        self.set_score(self.score + delta);
    }

    fn refresh_kind(&mut self) {
        if self.kind.is_sticky() {
            return;
        }
        self.kind = if self.score >= Self::FRIEND_SCORE {
            RelationshipType::Friend
        } else if self.score >= Self::ACQUAINTANCE_SCORE {
            RelationshipType::Acquaintance
        } else {
            RelationshipType::Stranger
        };
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Relationships {
    by_id: BTreeMap<EntityId, Relationship>,
}

impl Relationships {
    pub fn get(&self, other: EntityId) -> Option<&Relationship> {
        self.by_id.get(&other)
    }

    pub fn get_mut(&mut self, other: EntityId) -> Option<&mut Relationship> {
        self.by_id.get_mut(&other)
    }

    /// Existing relationship, or a fresh stranger record
    pub fn ensure(&mut self, other: EntityId) -> &mut Relationship {
        self.by_id.entry(other).or_insert_with(Relationship::stranger)
    }

    pub fn score(&self, other: EntityId) -> f32 {
        self.by_id.get(&other).map(|r| r.score()).unwrap_or(0.0)
    }

    pub fn kind(&self, other: EntityId) -> Option<RelationshipType> {
        self.by_id.get(&other).map(|r| r.kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EntityId, &Relationship)> {
        self.by_id.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&EntityId, &mut Relationship)> {
        self.by_id.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn spouse(&self) -> Option<EntityId> {
        self.by_id
            .iter()
            .find(|(_, r)| r.kind == RelationshipType::Spouse)
            .map(|(id, _)| *id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_clamped() {
        let mut rel = Relationship::stranger();
        rel.add_score(250.0);
        assert_eq!(rel.score(), 100.0);
        rel.add_score(-500.0);
        assert_eq!(rel.score(), 0.0);
    }

    #[test]
    fn test_kind_follows_score() {
        let mut rel = Relationship::stranger();
        rel.set_score(25.0);
        assert_eq!(rel.kind, RelationshipType::Acquaintance);
        rel.set_score(55.0);
        assert_eq!(rel.kind, RelationshipType::Friend);
        rel.set_score(5.0);
        assert_eq!(rel.kind, RelationshipType::Stranger);
    }

    #[test]
    fn test_sticky_kinds_survive_score_changes() {
        let mut rel = Relationship::stranger();
        rel.kind = RelationshipType::Rival;
        rel.set_score(80.0);
        assert_eq!(rel.kind, RelationshipType::Rival);
    }

    #[test]
    fn test_ensure_creates_stranger_once() {
        let mut rels = Relationships::default();
        rels.ensure(EntityId(4)).add_score(3.0);
        rels.ensure(EntityId(4)).add_score(3.0);
        assert_eq!(rels.len(), 1);
        assert_eq!(rels.score(EntityId(4)), 6.0);
    }
}
