//! Remaining-capsule bookkeeping for a single machine.
//!
//! The inventory is the multiset of physical capsules still inside
//! the machine. It is mutated only by `draw`, which removes exactly
//! one unit, so the total is strictly decreasing over a lifetime.

use crate::config::SimConfig;
use crate::error::{SimError, SimResult};
use crate::rng::LifetimeRng;
use crate::types::ItemIndex;
use serde::{Deserialize, Serialize};

pub struct Inventory {
    counts: Vec<u64>,
    total: u64,
}

impl Inventory {
    /// A freshly filled machine: every item at `capsules_per_item`.
    pub fn full(config: &SimConfig) -> Self {
        Self {
            counts: vec![config.capsules_per_item; config.items.len()],
            total: config.total_capsules(),
        }
    }

    pub fn total_remaining(&self) -> u64 {
        self.total
    }

    pub fn count(&self, item: ItemIndex) -> u64 {
        self.counts[item]
    }

    /// Remove one capsule, chosen uniformly over the remaining
    /// physical units — each item's probability is proportional to
    /// its remaining count, with no further correction.
    pub fn draw(&mut self, rng: &mut LifetimeRng) -> SimResult<ItemIndex> {
        if self.total == 0 {
            return Err(SimError::EmptyInventory);
        }
        let mut roll = rng.next_u64_below(self.total);
        for (item, count) in self.counts.iter_mut().enumerate() {
            if roll < *count {
                *count -= 1;
                self.total -= 1;
                return Ok(item);
            }
            roll -= *count;
        }
        // counts always sum to total, so the scan cannot fall through.
        unreachable!("draw roll exceeded remaining counts");
    }

    /// Immutable copy of the current per-item counts.
    pub fn snapshot(&self) -> InventorySnapshot {
        InventorySnapshot {
            counts: self.counts.clone(),
        }
    }
}

/// Captured inventory composition, indexed like the item catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySnapshot {
    pub counts: Vec<u64>,
}

impl InventorySnapshot {
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}
