//! Command pipeline
//!
//! Free text is matched to catalog actions by the resolver; structured
//! admin commands are applied directly by the executor.

pub mod executor;
pub mod resolver;

pub use executor::{Command, CommandExecutor, CommandResult};
pub use resolver::{resolve, Resolution};
