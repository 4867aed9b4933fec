//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use civitas::core::config::SimConfig;
use civitas::core::error::{CivError, Result};
use civitas::core::random::ScriptedRandom;
use civitas::ecs::world::{Environment, World};
use civitas::llm::oracle::{ChoiceRequest, ConversationRequest, DecisionOracle};
use civitas::llm::parser::ConversationReply;
use civitas::simulation::tick::Simulation;

/// Replays canned choices and lines in order; silent once the script runs out
#[derive(Default)]
pub struct ScriptedOracle {
    choices: Mutex<VecDeque<Option<String>>>,
    lines: Mutex<VecDeque<Option<ConversationReply>>>,
}

impl ScriptedOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn choose(self, action: &str) -> Self {
        self.choices.lock().unwrap().push_back(Some(action.to_string()));
        self
    }

    pub fn say(self, dialogue: &str, action: Option<&str>) -> Self {
        let reply = ConversationReply { dialogue: dialogue.to_string(), action: action.map(str::to_string) };
        self.lines.lock().unwrap().push_back(Some(reply));
        self
    }
}

impl DecisionOracle for ScriptedOracle {
    async fn choose_action(&self, _request: &ChoiceRequest) -> Result<Option<String>> {
        Ok(self.choices.lock().unwrap().pop_front().flatten())
    }

    async fn converse(&self, _request: &ConversationRequest) -> Result<Option<ConversationReply>> {
        Ok(self.lines.lock().unwrap().pop_front().flatten())
    }
}

/// Every call fails, as an unreachable model would
pub struct FailingOracle;

impl DecisionOracle for FailingOracle {
    async fn choose_action(&self, _request: &ChoiceRequest) -> Result<Option<String>> {
        Err(CivError::Oracle("connection refused".to_string()))
    }

    async fn converse(&self, _request: &ConversationRequest) -> Result<Option<ConversationReply>> {
        Err(CivError::Oracle("connection refused".to_string()))
    }
}

pub fn empty_world() -> World {
    World::new(Environment::new("Vale", 10, 10))
}

/// A simulation whose every random draw is `value`
pub fn scripted(world: World, config: SimConfig, value: f32) -> Simulation {
    Simulation::new(world, config, Box::new(ScriptedRandom::constant(value)))
}
