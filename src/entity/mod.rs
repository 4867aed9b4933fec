pub mod agent;
pub mod genome;
pub mod inventory;
pub mod needs;
pub mod place;
pub mod psyche;
pub mod relationships;
pub mod social;

pub use agent::{Agent, Goal, GoalStatus, Imprisonment, Trauma, TraumaKind};
pub use genome::{Gene, Genome};
pub use inventory::{Inventory, Item, Skill, Skills};
pub use needs::{NeedType, Needs};
pub use place::{Listing, Place, PlaceRole, ResourceStock};
pub use psyche::{Drive, Emotion, Intensities, Personality};
pub use relationships::{DispositionKind, Relationship, RelationshipType, Relationships};
