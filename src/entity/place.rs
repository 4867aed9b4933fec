//! Non-agent world objects: resources, buildings, markets, jails

use serde::{Deserialize, Serialize};

use crate::core::types::{EntityId, GridPos};
use crate::entity::inventory::Item;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceStock {
    pub item: Item,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub seller: EntityId,
    pub item: Item,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlaceRole {
    Marketplace { listings: Vec<Listing> },
    Jail { inmates: Vec<EntityId> },
    House,
    Workshop,
    Temple,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub id: EntityId,
    pub name: String,
    pub description: String,
    pub position: GridPos,
    pub resource: Option<ResourceStock>,
    pub owner: Option<EntityId>,
    pub role: Option<PlaceRole>,
}

impl Place {
    pub fn new(id: EntityId, name: impl Into<String>, position: GridPos) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            position,
            resource: None,
            owner: None,
            role: None,
        }
    }

    pub fn with_resource(mut self, item: Item, quantity: u32) -> Self {
        self.resource = Some(ResourceStock { item, quantity });
        self
    }

    pub fn with_role(mut self, role: PlaceRole) -> Self {
        self.role = Some(role);
        self
    }

    pub fn with_owner(mut self, owner: EntityId) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn stock_of(&self, item: Item) -> u32 {
        match &self.resource {
            Some(stock) if stock.item == item => stock.quantity,
            _ => 0,
        }
    }

    /// Unowned, or owned by `agent`
    pub fn usable_by(&self, agent: EntityId) -> bool {
        self.owner.map_or(true, |owner| owner == agent)
    }

    /// Take up to `amount`; returns what was actually taken
    pub fn take(&mut self, amount: u32) -> u32 {
        match &mut self.resource {
            Some(stock) => {
                let taken = stock.quantity.min(amount);
                stock.quantity -= taken;
                taken
            }
            None => 0,
        }
    }

    pub fn is_marketplace(&self) -> bool {
        matches!(self.role, Some(PlaceRole::Marketplace { .. }))
    }

    pub fn is_jail(&self) -> bool {
        matches!(self.role, Some(PlaceRole::Jail { .. }))
    }

    pub fn listings(&self) -> &[Listing] {
        match &self.role {
            Some(PlaceRole::Marketplace { listings }) => listings,
            _ => &[],
        }
    }

    pub fn listings_mut(&mut self) -> Option<&mut Vec<Listing>> {
        match &mut self.role {
            Some(PlaceRole::Marketplace { listings }) => Some(listings),
            _ => None,
        }
    }

    pub fn inmates(&self) -> &[EntityId] {
        match &self.role {
            Some(PlaceRole::Jail { inmates }) => inmates,
            _ => &[],
        }
    }

    pub fn inmates_mut(&mut self) -> Option<&mut Vec<EntityId>> {
        match &mut self.role {
            Some(PlaceRole::Jail { inmates }) => Some(inmates),
            _ => None,
        }
    }
}
