pub mod snapshot;
pub mod store;
pub mod world;

pub use snapshot::Snapshot;
pub use store::{EntityRef, EntityStore};
pub use world::{Environment, World};
