//! Technology tree

use serde::{Deserialize, Serialize};

use crate::society::culture::Culture;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Technology {
    pub id: String,
    pub name: String,
    pub cost: f32,
    pub requires: Vec<String>,
}

impl Technology {
    fn new(id: &str, name: &str, cost: f32, requires: &[&str]) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            cost,
            requires: requires.iter().map(|r| r.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TechTree {
    technologies: Vec<Technology>,
}

impl Default for TechTree {
    fn default() -> Self {
        Self {
            technologies: vec![
                Technology::new("agriculture", "Agriculture", 10.0, &[]),
                Technology::new("toolmaking", "Toolmaking", 15.0, &[]),
                Technology::new("writing", "Writing", 20.0, &[]),
                Technology::new("masonry", "Masonry", 20.0, &["toolmaking"]),
                Technology::new("medicine", "Medicine", 25.0, &["writing"]),
                Technology::new("metallurgy", "Metallurgy", 30.0, &["toolmaking"]),
            ],
        }
    }
}

impl TechTree {
    pub fn get(&self, id: &str) -> Option<&Technology> {
        self.technologies.iter().find(|t| t.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Technology> {
        self.technologies.iter()
    }

    pub fn insert(&mut self, tech: Technology) {
        self.technologies.retain(|t| t.id != tech.id);
        self.technologies.push(tech);
    }

    /// Unknown to the culture, prerequisites known
    pub fn researchable<'a>(&'a self, culture: &'a Culture) -> impl Iterator<Item = &'a Technology> + 'a {
        self.technologies
            .iter()
            .filter(move |t| !culture.knows(&t.id) && t.requires.iter().all(|r| culture.knows(r)))
    }

    /// Cheapest researchable technology the culture can afford
    pub fn next_affordable<'a>(&'a self, culture: &'a Culture) -> Option<&'a Technology> {
        self.researchable(culture)
            .filter(|t| t.cost <= culture.research_points())
            .fold(None, |best: Option<&'a Technology>, t| match best {
                Some(b) if b.cost <= t.cost => Some(b),
                _ => Some(t),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::CultureId;
    use std::collections::BTreeMap;

    #[test]
    fn test_prerequisites_gate_research() {
        let tree = TechTree::default();
        let mut culture = Culture::new(CultureId(1), "Hill Clans", BTreeMap::new());
        assert!(tree.researchable(&culture).all(|t| t.id != "metallurgy"));
        culture.learn("toolmaking");
        assert!(tree.researchable(&culture).any(|t| t.id == "metallurgy"));
    }

    #[test]
    fn test_next_affordable_picks_cheapest() {
        let tree = TechTree::default();
        let mut culture = Culture::new(CultureId(1), "Hill Clans", BTreeMap::new());
        assert!(tree.next_affordable(&culture).is_none());
        culture.add_research(16.0);
        assert_eq!(tree.next_affordable(&culture).map(|t| t.id.as_str()), Some("agriculture"));
    }
}
