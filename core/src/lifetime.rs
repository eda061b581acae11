//! Whole-machine lifetime simulation — the core state machine.
//!
//! A lifetime runs a fresh, full inventory down to empty through a
//! sequence of customer sessions. The loop is RUNNING while anything
//! remains and DONE at zero; every draw strictly decreases the total,
//! so a lifetime terminates within `total_capsules` draws.
//!
//! STEP ORDER after every individual draw (fixed, never reordered):
//!   1. Increment the lifetime's global pull counter.
//!   2. Record a depletion point if the drawn item just hit zero.
//!   3. Check every not-yet-captured fullness threshold.

use crate::config::SimConfig;
use crate::customer_model::CustomerModel;
use crate::error::SimResult;
use crate::inventory::{Inventory, InventorySnapshot};
use crate::rng::LifetimeRng;
use crate::session::{run_session, SessionOutcome};
use crate::snapshot::{SnapshotPlan, SnapshotTracker};
use crate::types::{ItemIndex, PullIndex};
use serde::{Deserialize, Serialize};

/// Per-item first-reached-zero pull indices.
pub struct DepletionTracker {
    first_zero: Vec<Option<PullIndex>>,
}

impl DepletionTracker {
    pub fn new(num_items: usize) -> Self {
        Self {
            first_zero: vec![None; num_items],
        }
    }

    /// Called after a draw with the drawn item's remaining count.
    /// Only the first crossing to zero is recorded.
    pub fn record(&mut self, item: ItemIndex, remaining_count: u64, pull: PullIndex) {
        if remaining_count == 0 && self.first_zero[item].is_none() {
            self.first_zero[item] = Some(pull);
        }
    }

    pub fn into_record(self) -> Vec<Option<PullIndex>> {
        self.first_zero
    }
}

/// Observes every draw of a lifetime, across session boundaries.
pub struct DrawMonitor<'p> {
    pull_counter: PullIndex,
    depletion: DepletionTracker,
    snapshots: SnapshotTracker<'p>,
}

impl<'p> DrawMonitor<'p> {
    pub fn new(plan: &'p SnapshotPlan, num_items: usize) -> Self {
        Self {
            pull_counter: 0,
            depletion: DepletionTracker::new(num_items),
            snapshots: SnapshotTracker::new(plan),
        }
    }

    /// Capture the initial full-machine state (claims the 100% level
    /// before any draws).
    pub fn capture_initial(&mut self, inventory: &Inventory) {
        self.snapshots.observe(inventory);
    }

    pub fn record_draw(&mut self, drawn: ItemIndex, inventory: &Inventory) {
        self.pull_counter += 1;
        self.depletion
            .record(drawn, inventory.count(drawn), self.pull_counter);
        self.snapshots.observe(inventory);
    }

    pub fn pulls_so_far(&self) -> PullIndex {
        self.pull_counter
    }

    fn into_parts(self) -> (Vec<Option<InventorySnapshot>>, Vec<Option<PullIndex>>) {
        (self.snapshots.into_captured(), self.depletion.into_record())
    }
}

/// Everything one lifetime produced. Immutable once returned.
///
/// `snapshots` is indexed like the plan's levels, `depletion` like
/// the item catalog. Both are fully populated by termination: the
/// last unit of every item must be drawn for the total to reach
/// zero, and every threshold bound lies on the path down to zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifetimeResult {
    pub snapshots: Vec<Option<InventorySnapshot>>,
    pub outcomes: Vec<SessionOutcome>,
    pub depletion: Vec<Option<PullIndex>>,
}

/// Drives one machine from full to empty.
pub struct LifetimeSimulator<'a> {
    config: &'a SimConfig,
    model: &'a CustomerModel,
    plan: &'a SnapshotPlan,
}

impl<'a> LifetimeSimulator<'a> {
    pub fn new(config: &'a SimConfig, model: &'a CustomerModel, plan: &'a SnapshotPlan) -> Self {
        Self {
            config,
            model,
            plan,
        }
    }

    pub fn run(&self, rng: &mut LifetimeRng) -> SimResult<LifetimeResult> {
        let mut inventory = Inventory::full(self.config);
        let mut monitor = DrawMonitor::new(self.plan, self.config.items.len());
        monitor.capture_initial(&inventory);

        let mut outcomes: Vec<SessionOutcome> = Vec::new();
        while inventory.total_remaining() > 0 {
            let desired_item = self.model.choose_desired_item(rng);
            let max_pulls = self.model.choose_patience(desired_item, rng);
            let outcome = run_session(&mut inventory, desired_item, max_pulls, &mut monitor, rng)?;
            outcomes.push(outcome);
        }

        log::debug!(
            "lifetime done: {} sessions, {} pulls",
            outcomes.len(),
            monitor.pulls_so_far()
        );

        let (snapshots, depletion) = monitor.into_parts();
        Ok(LifetimeResult {
            snapshots,
            outcomes,
            depletion,
        })
    }
}
