//! Simulation systems
//!
//! The tick driver lives in `tick`; the other modules are the systems it
//! runs in order.

pub mod action_execute;
pub mod action_select;
pub mod conversation;
pub mod needs_decay;
pub mod politics;
pub mod tick;

pub use action_execute::execute_action;
pub use action_select::{select_action, SelectionReason};
pub use conversation::{Conversation, Conversations};
pub use needs_decay::DeathCause;
pub use tick::{Executed, Simulation, SimulationEvent};
