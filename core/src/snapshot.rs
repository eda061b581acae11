//! Fullness thresholds and unbiased snapshot capture.
//!
//! A snapshot is captured at the exact draw where total remaining
//! first falls to or below a threshold's capsule bound. Capturing at
//! session boundaries instead would weight the observed composition
//! by whatever state a variable-length session happens to end on;
//! per-draw capture samples the crossing exactly once.

use crate::config::SimConfig;
use crate::inventory::{Inventory, InventorySnapshot};
use serde::Serialize;

/// One fullness threshold, resolved to an absolute capsule bound.
#[derive(Debug, Clone, Serialize)]
pub struct ThresholdLevel {
    pub label: String,
    pub fraction: f64,
    /// Capture fires the first time total remaining is <= this.
    pub remaining_at_most: u64,
}

/// The run's thresholds, highest fullness first. Fixed at
/// configuration time and shared read-only across all lifetimes.
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotPlan {
    levels: Vec<ThresholdLevel>,
}

impl SnapshotPlan {
    pub fn from_config(config: &SimConfig) -> Self {
        let total = config.total_capsules();
        let mut fractions = config.snapshot_thresholds.clone();
        fractions.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
        let levels = fractions
            .into_iter()
            .map(|fraction| ThresholdLevel {
                label: percent_label(fraction),
                fraction,
                remaining_at_most: (total as f64 * fraction).floor() as u64,
            })
            .collect();
        Self { levels }
    }

    pub fn levels(&self) -> &[ThresholdLevel] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn labels(&self) -> Vec<String> {
        self.levels.iter().map(|l| l.label.clone()).collect()
    }

    /// Index of the level whose label matches, if any.
    pub fn level_index(&self, label: &str) -> Option<usize> {
        self.levels.iter().position(|l| l.label == label)
    }
}

/// "75%" for integral percentages, "12.5%" otherwise.
fn percent_label(fraction: f64) -> String {
    let percent = fraction * 100.0;
    if (percent - percent.round()).abs() < 1e-9 {
        format!("{:.0}%", percent)
    } else {
        format!("{:.1}%", percent)
    }
}

/// At-most-once capture state for one lifetime.
pub struct SnapshotTracker<'p> {
    plan: &'p SnapshotPlan,
    captured: Vec<Option<InventorySnapshot>>,
}

impl<'p> SnapshotTracker<'p> {
    pub fn new(plan: &'p SnapshotPlan) -> Self {
        Self {
            plan,
            captured: vec![None; plan.len()],
        }
    }

    /// Capture every not-yet-captured level the current remaining
    /// total has reached. Called once before any draws (which claims
    /// the 100% level) and then after every single draw.
    pub fn observe(&mut self, inventory: &Inventory) {
        let remaining = inventory.total_remaining();
        for (i, level) in self.plan.levels().iter().enumerate() {
            if self.captured[i].is_none() && remaining <= level.remaining_at_most {
                self.captured[i] = Some(inventory.snapshot());
            }
        }
    }

    pub fn into_captured(self) -> Vec<Option<InventorySnapshot>> {
        self.captured
    }
}
