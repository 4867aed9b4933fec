//! Action catalog, context and effect procedures

pub mod catalog;
pub mod context;
pub mod effects;
pub mod outcome;
pub mod recipes;

#[cfg(test)]
pub(crate) mod testing;

pub use catalog::{Action, ActionCatalog, ActionCategory, ActionDef, ActionEffect};
pub use context::{ActionContext, WorldFacts};
pub use outcome::{ActionOutcome, ActionStatus, PlaceSpec, SideEffect};
