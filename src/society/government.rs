//! Government, laws and elections

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::core::types::{EntityId, Tick};

/// Acts a law can prohibit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Offense {
    Fighting,
    Stealing,
}

impl Offense {
    pub fn name(&self) -> &'static str {
        match self {
            Offense::Fighting => "fighting",
            Offense::Stealing => "stealing",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Law {
    pub name: String,
    pub prohibits: Offense,
    /// Base imprisonment length in ticks
    pub punishment: u64,
}

impl Law {
    pub fn against(offense: Offense, punishment: u64) -> Self {
        Self {
            name: format!("Ban on {}", offense.name()),
            prohibits: offense,
            punishment,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GovernmentType {
    Chiefdom,
    Council,
    Democracy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Government {
    pub kind: GovernmentType,
    pub leader: Option<EntityId>,
    pub laws: Vec<Law>,
}

impl Default for Government {
    fn default() -> Self {
        Self { kind: GovernmentType::Democracy, leader: None, laws: Vec::new() }
    }
}

impl Government {
    pub fn law_against(&self, offense: Offense) -> Option<&Law> {
        self.laws.iter().find(|law| law.prohibits == offense)
    }

    /// Adds the law unless the offense is already covered
    pub fn enact(&mut self, law: Law) -> bool {
        if self.law_against(law.prohibits).is_some() {
            return false;
        }
        self.laws.push(law);
        true
    }

    pub fn repeal(&mut self, offense: Offense) -> bool {
        let before = self.laws.len();
        self.laws.retain(|law| law.prohibits != offense);
        self.laws.len() != before
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Election {
    pub active: bool,
    pub candidates: Vec<EntityId>,
    pub votes: BTreeMap<EntityId, u32>,
    pub voters: BTreeSet<EntityId>,
    pub ends_at: Tick,
}

impl Election {
    pub fn open(ends_at: Tick) -> Self {
        Self {
            active: true,
            candidates: Vec::new(),
            votes: BTreeMap::new(),
            voters: BTreeSet::new(),
            ends_at,
        }
    }

    pub fn register(&mut self, candidate: EntityId) -> bool {
        if self.candidates.contains(&candidate) {
            return false;
        }
        self.candidates.push(candidate);
        true
    }

    /// One vote per voter, only for registered candidates
    pub fn cast(&mut self, voter: EntityId, candidate: EntityId) -> bool {
        if !self.active || !self.candidates.contains(&candidate) || !self.voters.insert(voter) {
            return false;
        }
        *self.votes.entry(candidate).or_insert(0) += 1;
        true
    }

    /// Forget a departed agent as both candidate and voter
    pub fn withdraw(&mut self, id: EntityId) {
        self.candidates.retain(|c| *c != id);
        self.votes.remove(&id);
        self.voters.remove(&id);
    }

    pub fn total_votes(&self) -> u32 {
        self.votes.values().sum()
    }

    /// Most votes wins; ties go to the lowest id
    pub fn winner(&self) -> Option<EntityId> {
        let mut ranked: Vec<EntityId> = self.candidates.clone();
        ranked.sort();
        ranked
            .into_iter()
            .fold(None, |best: Option<(EntityId, u32)>, candidate| {
                let count = self.votes.get(&candidate).copied().unwrap_or(0);
                match best {
                    Some((_, top)) if top >= count => best,
                    _ => Some((candidate, count)),
                }
            })
            .map(|(id, _)| id)
    }
}
