//! Transaction history and demand-driven prices

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::config::SimConfig;
use crate::core::types::{EntityId, Tick};
use crate::entity::inventory::Item;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub buyer: EntityId,
    pub seller: EntityId,
    pub item: Item,
    pub price: i64,
    pub tick: Tick,
}

/// Read-only price lookup handed to actions
#[derive(Debug, Clone, Default)]
pub struct PriceTable {
    prices: AHashMap<Item, i64>,
}

impl PriceTable {
    /// Base price scaled by how often the item sold in the recent window
    pub fn from_history(history: &[Transaction], config: &SimConfig) -> Self {
        let mut recent: AHashMap<Item, u32> = AHashMap::new();
        let start = history.len().saturating_sub(config.price_window);
        for tx in &history[start..] {
            *recent.entry(tx.item).or_insert(0) += 1;
        }

        let prices = recent
            .into_iter()
            .map(|(item, count)| {
                let scaled = item.base_price() as f32 * (1.0 + config.demand_factor * count as f32);
                (item, scaled.round() as i64)
            })
            .collect();

        Self { prices }
    }

    pub fn price(&self, item: Item) -> i64 {
        self.prices.get(&item).copied().unwrap_or_else(|| item.base_price())
    }
}
