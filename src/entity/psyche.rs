//! Personality traits, emotions and drives

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Five fixed traits, each in [0, 1]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Personality {
    pub openness: f32,
    pub conscientiousness: f32,
    pub extraversion: f32,
    pub agreeableness: f32,
    pub neuroticism: f32,
}

impl Default for Personality {
    fn default() -> Self {
        Self {
            openness: 0.5,
            conscientiousness: 0.5,
            extraversion: 0.5,
            agreeableness: 0.5,
            neuroticism: 0.5,
        }
    }
}

impl Personality {
    pub fn new(
        openness: f32,
        conscientiousness: f32,
        extraversion: f32,
        agreeableness: f32,
        neuroticism: f32,
    ) -> Self {
        Self {
            openness: openness.clamp(0.0, 1.0),
            conscientiousness: conscientiousness.clamp(0.0, 1.0),
            extraversion: extraversion.clamp(0.0, 1.0),
            agreeableness: agreeableness.clamp(0.0, 1.0),
            neuroticism: neuroticism.clamp(0.0, 1.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Emotion {
    Joy,
    Anger,
    Fear,
    Sadness,
    Pride,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Drive {
    Vengefulness,
    Boredom,
    Inspiration,
    Ambition,
}

/// Named intensities, each clamped to [0, 1]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Intensities<K: Ord> {
    values: BTreeMap<K, f32>,
}

impl<K: Ord> Default for Intensities<K> {
    fn default() -> Self {
        Self { values: BTreeMap::new() }
    }
}

impl<K: Ord + Copy> Intensities<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: K) -> f32 {
        self.values.get(&key).copied().unwrap_or(0.0)
    }

    pub fn set(&mut self, key: K, value: f32) {
        self.values.insert(key, value.clamp(0.0, 1.0));
    }

    pub fn add(&mut self, key: K, delta: f32) {
        let next = self.get(key) + delta;
        self.set(key, next);
    }

    /// Multiply every intensity by `factor`; near-zero entries are dropped
    pub fn decay(&mut self, factor: f32) {
        for value in self.values.values_mut() {
            *value = (*value * factor).clamp(0.0, 1.0);
        }
        self.values.retain(|_, v| *v > 0.001);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &f32)> {
        self.values.iter()
    }

    pub fn strongest(&self) -> Option<(K, f32)> {
        self.values
            .iter()
            .fold(None, |best: Option<(K, f32)>, (k, v)| match best {
                Some((_, b)) if b >= *v => best,
                _ => Some((*k, *v)),
            })
    }
}
