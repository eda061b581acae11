//! Customer behavior: which item a customer wants, and how many
//! pulls they are willing to spend chasing it.
//!
//! The model is stateless given configuration — both choices are
//! plain categorical samples over validated weight tables.

use crate::config::{PatienceEntry, SimConfig};
use crate::rng::LifetimeRng;
use crate::types::ItemIndex;

pub struct CustomerModel {
    desire_weights: Vec<f64>,
    patience: Vec<Option<Vec<PatienceEntry>>>,
    default_patience: Vec<PatienceEntry>,
}

impl CustomerModel {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            desire_weights: config.desire_weights.clone(),
            patience: config.patience.clone(),
            default_patience: config.default_patience.clone(),
        }
    }

    /// Categorical sample over the desire weights. Items with weight
    /// 0 are never chosen, including on the float fallback path.
    pub fn choose_desired_item(&self, rng: &mut LifetimeRng) -> ItemIndex {
        let roll = rng.next_f64();
        let mut cumulative = 0.0;
        let mut fallback = 0;
        for (item, &weight) in self.desire_weights.iter().enumerate() {
            if weight <= 0.0 {
                continue;
            }
            cumulative += weight;
            if roll < cumulative {
                return item;
            }
            fallback = item;
        }
        fallback
    }

    /// Sample the session pull budget from the patience distribution
    /// registered for `desired_item`, falling back to the default
    /// distribution when the item has none.
    pub fn choose_patience(&self, desired_item: ItemIndex, rng: &mut LifetimeRng) -> u64 {
        let entries = self.patience[desired_item]
            .as_deref()
            .unwrap_or(&self.default_patience);
        let roll = rng.next_f64();
        let mut cumulative = 0.0;
        for e in entries {
            cumulative += e.weight;
            if roll < cumulative {
                return e.max_pulls;
            }
        }
        entries.last().map(|e| e.max_pulls).unwrap_or(1)
    }
}
