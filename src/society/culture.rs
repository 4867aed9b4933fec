//! Cultures and religions
//!
//! Membership lists are owned here but only mutated through the entity
//! store, which keeps them in sync with each agent's affiliation ids.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::core::types::{CultureId, EntityId, ReligionId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Culture {
    pub id: CultureId,
    pub name: String,
    pub beliefs: BTreeMap<String, f32>,
    pub(crate) members: Vec<EntityId>,
    research_points: f32,
    known_technologies: BTreeSet<String>,
}

impl Culture {
    pub fn new(id: CultureId, name: impl Into<String>, beliefs: BTreeMap<String, f32>) -> Self {
        Self {
            id,
            name: name.into(),
            beliefs,
            members: Vec::new(),
            research_points: 0.0,
            known_technologies: BTreeSet::new(),
        }
    }

    pub fn members(&self) -> &[EntityId] {
        &self.members
    }

    pub fn research_points(&self) -> f32 {
        self.research_points
    }

    pub fn add_research(&mut self, points: f32) {
        if points > 0.0 {
            self.research_points += points;
        }
    }

    /// Spend points; nothing is spent when short
    pub fn spend_research(&mut self, points: f32) -> bool {
        if points < 0.0 || self.research_points < points {
            return false;
        }
        self.research_points -= points;
        true
    }

    pub fn knows(&self, tech: &str) -> bool {
        self.known_technologies.contains(tech)
    }

    /// Returns false if already known
    pub fn learn(&mut self, tech: impl Into<String>) -> bool {
        self.known_technologies.insert(tech.into())
    }

    pub fn known_technologies(&self) -> impl Iterator<Item = &String> {
        self.known_technologies.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Religion {
    pub id: ReligionId,
    pub name: String,
    pub dogma: BTreeMap<String, f32>,
    pub(crate) members: Vec<EntityId>,
}

impl Religion {
    pub fn new(id: ReligionId, name: impl Into<String>, dogma: BTreeMap<String, f32>) -> Self {
        Self { id, name: name.into(), dogma, members: Vec::new() }
    }

    pub fn members(&self) -> &[EntityId] {
        &self.members
    }
}
