//! Bodily needs that drive agent behavior

use serde::{Deserialize, Serialize};

use crate::core::config::SimConfig;

/// Needs are counters: 0 = satisfied, 100 = desperate, capped by the config ceiling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Needs {
    pub hunger: f32,
    pub thirst: f32,
    pub fatigue: f32,
}

impl Default for Needs {
    fn default() -> Self {
        Self { hunger: 10.0, thirst: 10.0, fatigue: 10.0 }
    }
}

impl Needs {
    /// Grow all needs by one tick worth (called each tick)
    pub fn grow(&mut self, config: &SimConfig) {
        self.hunger = (self.hunger + config.hunger_rate).min(config.need_ceiling);
        self.thirst = (self.thirst + config.thirst_rate).min(config.need_ceiling);
        self.fatigue = (self.fatigue + config.fatigue_rate).min(config.need_ceiling);
    }

    pub fn satisfy(&mut self, need: NeedType, amount: f32) {
        match need {
            NeedType::Hunger => self.hunger = (self.hunger - amount).max(0.0),
            NeedType::Thirst => self.thirst = (self.thirst - amount).max(0.0),
            NeedType::Fatigue => self.fatigue = (self.fatigue - amount).max(0.0),
        }
    }

    pub fn most_pressing(&self) -> (NeedType, f32) {
        [
            (NeedType::Hunger, self.hunger),
            (NeedType::Thirst, self.thirst),
            (NeedType::Fatigue, self.fatigue),
        ]
        .into_iter()
        .fold((NeedType::Hunger, f32::MIN), |best, next| if next.1 > best.1 { next } else { best })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NeedType {
    Hunger,
    Thirst,
    Fatigue,
}
