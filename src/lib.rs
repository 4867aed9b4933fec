//! Civitas - a small artificial society
//!
//! Agents with needs, personalities and relationships act on a grid world
//! one tick at a time. An external decision oracle (usually a language
//! model) voices their conversations and interprets free-text prompts.

pub mod actions;
pub mod command;
pub mod core;
pub mod ecs;
pub mod entity;
pub mod llm;
pub mod simulation;
pub mod society;
