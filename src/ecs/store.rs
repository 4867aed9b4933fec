//! Entity store - owns agents, places, cultures and religions
//!
//! Every affiliation change goes through this store so that an agent's
//! culture/religion id and the membership lists never disagree.

use std::collections::BTreeMap;

use crate::core::error::{CivError, Result};
use crate::core::types::{CultureId, EntityId, GridPos, ReligionId};
use crate::entity::agent::Agent;
use crate::entity::place::Place;
use crate::society::culture::{Culture, Religion};

/// Borrowed view of whatever lives under an id
#[derive(Debug, Clone, Copy)]
pub enum EntityRef<'a> {
    Agent(&'a Agent),
    Place(&'a Place),
}

/// Membership lists stay sorted by id so rebuilt stores match live ones
fn enroll(members: &mut Vec<EntityId>, id: EntityId) {
    if let Err(slot) = members.binary_search(&id) {
        members.insert(slot, id);
    }
}

#[derive(Debug, Clone, Default)]
pub struct EntityStore {
    agents: BTreeMap<EntityId, Agent>,
    places: BTreeMap<EntityId, Place>,
    cultures: BTreeMap<CultureId, Culture>,
    religions: BTreeMap<ReligionId, Religion>,
    next_id: u64,
    next_culture_id: u32,
    next_religion_id: u32,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate_id(&mut self) -> EntityId {
        self.next_id += 1;
        EntityId(self.next_id)
    }

    pub fn get(&self, id: EntityId) -> Option<EntityRef<'_>> {
        if let Some(agent) = self.agents.get(&id) {
            return Some(EntityRef::Agent(agent));
        }
        self.places.get(&id).map(EntityRef::Place)
    }

    // === AGENTS ===

    /// Insert or replace an agent, registering its affiliations.
    /// Affiliations pointing at unknown cultures/religions are cleared.
    pub fn put_agent(&mut self, mut agent: Agent) -> EntityId {
        let id = agent.id;
        debug_assert!(!self.places.contains_key(&id), "agent id {:?} already names a place", id);
        if self.agents.contains_key(&id) {
            self.detach_agent(id);
        }
        self.next_id = self.next_id.max(id.0);

        if let Some(cid) = agent.culture_id() {
            match self.cultures.get_mut(&cid) {
                Some(culture) => enroll(&mut culture.members, id),
                None => agent.set_culture_id(None),
            }
        }
        if let Some(rid) = agent.religion_id() {
            match self.religions.get_mut(&rid) {
                Some(religion) => enroll(&mut religion.members, id),
                None => agent.set_religion_id(None),
            }
        }

        self.agents.insert(id, agent);
        id
    }

    /// Remove the agent with its memberships, jail cells, market listings
    /// and property claims
    pub fn remove_agent(&mut self, id: EntityId) -> Option<Agent> {
        let agent = self.detach_agent(id)?;
        for place in self.places.values_mut() {
            if place.owner == Some(id) {
                place.owner = None;
            }
            if let Some(inmates) = place.inmates_mut() {
                inmates.retain(|m| *m != id);
            }
            if let Some(listings) = place.listings_mut() {
                listings.retain(|l| l.seller != id);
            }
        }
        Some(agent)
    }

    fn detach_agent(&mut self, id: EntityId) -> Option<Agent> {
        let agent = self.agents.remove(&id)?;
        if let Some(culture) = agent.culture_id().and_then(|c| self.cultures.get_mut(&c)) {
            culture.members.retain(|m| *m != id);
        }
        if let Some(religion) = agent.religion_id().and_then(|r| self.religions.get_mut(&r)) {
            religion.members.retain(|m| *m != id);
        }
        Some(agent)
    }

    pub fn agent(&self, id: EntityId) -> Option<&Agent> {
        self.agents.get(&id)
    }

    pub fn agent_mut(&mut self, id: EntityId) -> Option<&mut Agent> {
        self.agents.get_mut(&id)
    }

    pub fn agents(&self) -> impl Iterator<Item = &Agent> {
        self.agents.values()
    }

    pub fn agents_mut(&mut self) -> impl Iterator<Item = &mut Agent> {
        self.agents.values_mut()
    }

    /// Ids in stable store order, detached from the borrow
    pub fn agent_ids(&self) -> Vec<EntityId> {
        self.agents.keys().copied().collect()
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    pub fn living_count(&self) -> usize {
        self.agents.values().filter(|a| a.is_alive()).count()
    }

    pub fn find_agent_by_name(&self, name: &str) -> Option<&Agent> {
        let lower = name.to_lowercase();
        self.agents.values().find(|a| a.name.to_lowercase() == lower)
    }

    /// Run `f` with both agents mutably borrowed. None if either is missing or a == b.
    pub fn with_pair_mut<R>(
        &mut self,
        a: EntityId,
        b: EntityId,
        f: impl FnOnce(&mut Agent, &mut Agent) -> R,
    ) -> Option<R> {
        if a == b || !self.agents.contains_key(&a) {
            return None;
        }
        let mut second = self.agents.remove(&b)?;
        let result = self.agents.get_mut(&a).map(|first| f(first, &mut second));
        self.agents.insert(b, second);
        result
    }

    /// Closest living agent (other than `exclude`) within `radius` that passes `filter`.
    /// Ties go to the lowest id.
    pub fn nearest_agent(
        &self,
        from: GridPos,
        radius: f32,
        exclude: EntityId,
        filter: impl Fn(&Agent) -> bool,
    ) -> Option<&Agent> {
        self.agents
            .values()
            .filter(|a| a.id != exclude && a.is_alive())
            .filter(|a| from.distance(&a.position) <= radius)
            .filter(|a| filter(*a))
            .fold(None, |best: Option<&Agent>, a| match best {
                Some(b) if from.distance(&b.position) <= from.distance(&a.position) => Some(b),
                _ => Some(a),
            })
    }

    // === PLACES ===

    pub fn put_place(&mut self, place: Place) -> EntityId {
        let id = place.id;
        debug_assert!(!self.agents.contains_key(&id), "place id {:?} already names an agent", id);
        self.next_id = self.next_id.max(id.0);
        self.places.insert(id, place);
        id
    }

    pub fn remove_place(&mut self, id: EntityId) -> Option<Place> {
        self.places.remove(&id)
    }

    pub fn place(&self, id: EntityId) -> Option<&Place> {
        self.places.get(&id)
    }

    pub fn place_mut(&mut self, id: EntityId) -> Option<&mut Place> {
        self.places.get_mut(&id)
    }

    pub fn places(&self) -> impl Iterator<Item = &Place> {
        self.places.values()
    }

    pub fn places_mut(&mut self) -> impl Iterator<Item = &mut Place> {
        self.places.values_mut()
    }

    /// Closest place passing `filter`, ties to the lowest id
    pub fn nearest_place(&self, from: GridPos, filter: impl Fn(&Place) -> bool) -> Option<&Place> {
        self.places
            .values()
            .filter(|p| filter(*p))
            .fold(None, |best: Option<&Place>, p| match best {
                Some(b) if from.distance(&b.position) <= from.distance(&p.position) => Some(b),
                _ => Some(p),
            })
    }

    // === CULTURES & RELIGIONS ===

    pub fn create_culture(&mut self, name: impl Into<String>, beliefs: BTreeMap<String, f32>) -> CultureId {
        self.next_culture_id += 1;
        let id = CultureId(self.next_culture_id);
        self.cultures.insert(id, Culture::new(id, name, beliefs));
        id
    }

    pub fn create_religion(&mut self, name: impl Into<String>, dogma: BTreeMap<String, f32>) -> ReligionId {
        self.next_religion_id += 1;
        let id = ReligionId(self.next_religion_id);
        self.religions.insert(id, Religion::new(id, name, dogma));
        id
    }

    pub fn culture(&self, id: CultureId) -> Option<&Culture> {
        self.cultures.get(&id)
    }

    pub fn culture_mut(&mut self, id: CultureId) -> Option<&mut Culture> {
        self.cultures.get_mut(&id)
    }

    pub fn cultures(&self) -> impl Iterator<Item = &Culture> {
        self.cultures.values()
    }

    pub fn religion(&self, id: ReligionId) -> Option<&Religion> {
        self.religions.get(&id)
    }

    pub fn religions(&self) -> impl Iterator<Item = &Religion> {
        self.religions.values()
    }

    pub fn for_culture(&self, id: CultureId) -> &[EntityId] {
        self.cultures.get(&id).map(|c| c.members()).unwrap_or(&[])
    }

    pub fn for_religion(&self, id: ReligionId) -> &[EntityId] {
        self.religions.get(&id).map(|r| r.members()).unwrap_or(&[])
    }

    /// Move an agent between cultures, updating both membership lists
    pub fn set_culture(&mut self, agent_id: EntityId, culture: Option<CultureId>) -> Result<()> {
        if let Some(cid) = culture {
            if !self.cultures.contains_key(&cid) {
                return Err(CivError::CultureNotFound(cid));
            }
        }
        let agent = self.agents.get_mut(&agent_id).ok_or(CivError::AgentNotFound(agent_id))?;
        let previous = agent.culture_id();
        if previous == culture {
            return Ok(());
        }
        agent.set_culture_id(culture);

        if let Some(old) = previous.and_then(|c| self.cultures.get_mut(&c)) {
            old.members.retain(|m| *m != agent_id);
        }
        if let Some(new) = culture.and_then(|c| self.cultures.get_mut(&c)) {
            enroll(&mut new.members, agent_id);
        }
        Ok(())
    }

    pub fn set_religion(&mut self, agent_id: EntityId, religion: Option<ReligionId>) -> Result<()> {
        if let Some(rid) = religion {
            if !self.religions.contains_key(&rid) {
                return Err(CivError::ReligionNotFound(rid));
            }
        }
        let agent = self.agents.get_mut(&agent_id).ok_or(CivError::AgentNotFound(agent_id))?;
        let previous = agent.religion_id();
        if previous == religion {
            return Ok(());
        }
        agent.set_religion_id(religion);

        if let Some(old) = previous.and_then(|r| self.religions.get_mut(&r)) {
            old.members.retain(|m| *m != agent_id);
        }
        if let Some(new) = religion.and_then(|r| self.religions.get_mut(&r)) {
            enroll(&mut new.members, agent_id);
        }
        Ok(())
    }

    /// Detach every member, then drop the culture
    pub fn remove_culture(&mut self, id: CultureId) -> Option<Culture> {
        let culture = self.cultures.remove(&id)?;
        for member in culture.members() {
            if let Some(agent) = self.agents.get_mut(member) {
                agent.set_culture_id(None);
            }
        }
        Some(culture)
    }

    pub fn remove_religion(&mut self, id: ReligionId) -> Option<Religion> {
        let religion = self.religions.remove(&id)?;
        for member in religion.members() {
            if let Some(agent) = self.agents.get_mut(member) {
                agent.set_religion_id(None);
            }
        }
        Some(religion)
    }

    // === RECONSTRUCTION ===

    /// Rebuild a store from persisted parts. Membership lists are taken from
    /// the agents' ids; cross references are verified.
    pub(crate) fn from_parts(
        agents: Vec<Agent>,
        places: Vec<Place>,
        cultures: Vec<Culture>,
        religions: Vec<Religion>,
    ) -> Result<Self> {
        let mut store = Self::new();
        for mut culture in cultures {
            store.next_culture_id = store.next_culture_id.max(culture.id.0);
            culture.members.clear();
            store.cultures.insert(culture.id, culture);
        }
        for mut religion in religions {
            store.next_religion_id = store.next_religion_id.max(religion.id.0);
            religion.members.clear();
            store.religions.insert(religion.id, religion);
        }
        for place in places {
            if store.agents.contains_key(&place.id) || store.places.contains_key(&place.id) {
                return Err(CivError::Integrity(format!("duplicate id {:?}", place.id)));
            }
            store.put_place(place);
        }
        for agent in agents {
            if store.agents.contains_key(&agent.id) || store.places.contains_key(&agent.id) {
                return Err(CivError::Integrity(format!("duplicate id {:?}", agent.id)));
            }
            if let Some(cid) = agent.culture_id() {
                if !store.cultures.contains_key(&cid) {
                    return Err(CivError::Integrity(format!("{} references missing {:?}", agent.name, cid)));
                }
            }
            if let Some(rid) = agent.religion_id() {
                if !store.religions.contains_key(&rid) {
                    return Err(CivError::Integrity(format!("{} references missing {:?}", agent.name, rid)));
                }
            }
            store.put_agent(agent);
        }
        Ok(store)
    }

    pub(crate) fn id_counters(&self) -> (u64, u32, u32) {
        (self.next_id, self.next_culture_id, self.next_religion_id)
    }

    pub(crate) fn restore_counters(&mut self, next_id: u64, next_culture: u32, next_religion: u32) {
        self.next_id = self.next_id.max(next_id);
        self.next_culture_id = self.next_culture_id.max(next_culture);
        self.next_religion_id = self.next_religion_id.max(next_religion);
    }

    /// Verify membership lists and affiliation ids agree in both directions
    pub fn check_integrity(&self) -> Result<()> {
        for culture in self.cultures.values() {
            for member in culture.members() {
                match self.agents.get(member) {
                    Some(agent) if agent.culture_id() == Some(culture.id) => {}
                    _ => {
                        return Err(CivError::Integrity(format!(
                            "{:?} lists {:?} but the agent disagrees",
                            culture.id, member
                        )))
                    }
                }
            }
        }
        for religion in self.religions.values() {
            for member in religion.members() {
                match self.agents.get(member) {
                    Some(agent) if agent.religion_id() == Some(religion.id) => {}
                    _ => {
                        return Err(CivError::Integrity(format!(
                            "{:?} lists {:?} but the agent disagrees",
                            religion.id, member
                        )))
                    }
                }
            }
        }
        for agent in self.agents.values() {
            if let Some(cid) = agent.culture_id() {
                if !self.for_culture(cid).contains(&agent.id) {
                    return Err(CivError::Integrity(format!("{} missing from {:?}", agent.name, cid)));
                }
            }
            if let Some(rid) = agent.religion_id() {
                if !self.for_religion(rid).contains(&agent.id) {
                    return Err(CivError::Integrity(format!("{} missing from {:?}", agent.name, rid)));
                }
            }
        }
        Ok(())
    }
}
