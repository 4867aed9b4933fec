pub mod culture;
pub mod economy;
pub mod government;
pub mod technology;

pub use culture::{Culture, Religion};
pub use economy::{PriceTable, Transaction};
pub use government::{Election, Government, GovernmentType, Law, Offense};
pub use technology::{TechTree, Technology};
