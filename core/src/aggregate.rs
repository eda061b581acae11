//! Cross-run accumulation of lifetime results.
//!
//! The aggregator owns every running sum in the simulation and is the
//! sole serialization point between otherwise independent lifetimes:
//! fold results in on one thread, or build one aggregator per worker
//! and combine them with `merge`.
//!
//! All shapes are fixed at construction from the config and the
//! snapshot plan — no keys appear or vanish at runtime.

use crate::config::SimConfig;
use crate::error::{SimError, SimResult};
use crate::lifetime::LifetimeResult;
use crate::snapshot::SnapshotPlan;
use serde::Serialize;
use std::collections::BTreeMap;

/// Per-item session outcome sums.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ItemTally {
    pub successes: u64,
    pub failures: u64,
    pub pulls_in_successes: u64,
    pub pulls_in_failures: u64,
}

pub struct Aggregator {
    items: Vec<String>,
    labels: Vec<String>,
    runs: u64,
    /// Summed snapshot counts, `[level][item]`.
    snapshot_counts: Vec<Vec<u64>>,
    /// Observed fractional shares, one sample per lifetime,
    /// `[level][item]`.
    rate_samples: Vec<Vec<Vec<f64>>>,
    tallies: Vec<ItemTally>,
    depletion_pull_sum: Vec<u64>,
    depletion_count: Vec<u64>,
    /// How many sessions succeeded on their 1st, 2nd, ... pull.
    success_by_position: BTreeMap<u64, u64>,
}

impl Aggregator {
    pub fn new(config: &SimConfig, plan: &SnapshotPlan) -> Self {
        let num_items = config.items.len();
        let num_levels = plan.len();
        Self {
            items: config.items.clone(),
            labels: plan.labels(),
            runs: 0,
            snapshot_counts: vec![vec![0; num_items]; num_levels],
            rate_samples: vec![vec![Vec::new(); num_items]; num_levels],
            tallies: vec![ItemTally::default(); num_items],
            depletion_pull_sum: vec![0; num_items],
            depletion_count: vec![0; num_items],
            success_by_position: BTreeMap::new(),
        }
    }

    pub fn runs(&self) -> u64 {
        self.runs
    }

    /// Fold one lifetime into the running sums. Monotonic: nothing
    /// ever decreases or is removed.
    pub fn add_result(&mut self, result: &LifetimeResult) {
        self.runs += 1;

        for (level, snap) in result.snapshots.iter().enumerate() {
            let Some(snap) = snap else { continue };
            let total = snap.total();
            for (item, &count) in snap.counts.iter().enumerate() {
                self.snapshot_counts[level][item] += count;
                let rate = if total > 0 {
                    count as f64 / total as f64
                } else {
                    0.0
                };
                self.rate_samples[level][item].push(rate);
            }
        }

        for outcome in &result.outcomes {
            let tally = &mut self.tallies[outcome.desired_item];
            if outcome.succeeded {
                tally.successes += 1;
                tally.pulls_in_successes += outcome.pulls_taken;
                *self
                    .success_by_position
                    .entry(outcome.pulls_taken)
                    .or_insert(0) += 1;
            } else {
                tally.failures += 1;
                tally.pulls_in_failures += outcome.pulls_taken;
            }
        }

        for (item, depletion) in result.depletion.iter().enumerate() {
            if let Some(pull) = depletion {
                self.depletion_pull_sum[item] += pull;
                self.depletion_count[item] += 1;
            }
        }
    }

    /// Combine another aggregator's sums into this one, field by
    /// field. `a.merge(b)` after disjoint folds equals one aggregator
    /// fed every result of `a` then every result of `b`.
    pub fn merge(&mut self, other: Aggregator) {
        self.runs += other.runs;
        for (mine, theirs) in self.snapshot_counts.iter_mut().zip(other.snapshot_counts) {
            for (m, t) in mine.iter_mut().zip(theirs) {
                *m += t;
            }
        }
        for (mine, theirs) in self.rate_samples.iter_mut().zip(other.rate_samples) {
            for (m, t) in mine.iter_mut().zip(theirs) {
                m.extend(t);
            }
        }
        for (mine, theirs) in self.tallies.iter_mut().zip(other.tallies) {
            mine.successes += theirs.successes;
            mine.failures += theirs.failures;
            mine.pulls_in_successes += theirs.pulls_in_successes;
            mine.pulls_in_failures += theirs.pulls_in_failures;
        }
        for (m, t) in self.depletion_pull_sum.iter_mut().zip(other.depletion_pull_sum) {
            *m += t;
        }
        for (m, t) in self.depletion_count.iter_mut().zip(other.depletion_count) {
            *m += t;
        }
        for (position, count) in other.success_by_position {
            *self.success_by_position.entry(position).or_insert(0) += count;
        }
    }

    /// Divide the running sums by the run count and hand the raw rate
    /// samples through for significance testing.
    pub fn finalize(&self) -> SimResult<SimSummary> {
        if self.runs == 0 {
            return Err(SimError::InsufficientData {
                context: "aggregate summary",
                needed: 1,
                got: 0,
            });
        }
        let runs = self.runs as f64;

        let thresholds = self
            .labels
            .iter()
            .zip(&self.snapshot_counts)
            .map(|(label, counts)| {
                let mean_counts: Vec<f64> = counts.iter().map(|&c| c as f64 / runs).collect();
                let mean_total = mean_counts.iter().sum();
                ThresholdSummary {
                    label: label.clone(),
                    mean_counts,
                    mean_total,
                }
            })
            .collect();

        let item_stats = self
            .items
            .iter()
            .enumerate()
            .map(|(idx, item)| {
                let tally = &self.tallies[idx];
                let sessions = tally.successes + tally.failures;
                let success_rate = if sessions > 0 {
                    tally.successes as f64 / sessions as f64
                } else {
                    0.0
                };
                let mean_pulls_to_depletion = if self.depletion_count[idx] > 0 {
                    Some(self.depletion_pull_sum[idx] as f64 / self.depletion_count[idx] as f64)
                } else {
                    None
                };
                ItemSummary {
                    item: item.clone(),
                    successes: tally.successes,
                    failures: tally.failures,
                    success_rate,
                    mean_pulls_to_depletion,
                }
            })
            .collect();

        let total_successes: u64 = self.tallies.iter().map(|t| t.successes).sum();
        let total_failures: u64 = self.tallies.iter().map(|t| t.failures).sum();
        let success_pulls: u64 = self.tallies.iter().map(|t| t.pulls_in_successes).sum();
        let failure_pulls: u64 = self.tallies.iter().map(|t| t.pulls_in_failures).sum();

        Ok(SimSummary {
            runs: self.runs,
            items: self.items.clone(),
            thresholds,
            item_stats,
            mean_pulls_per_success: ratio_or_zero(success_pulls, total_successes),
            mean_pulls_per_failure: ratio_or_zero(failure_pulls, total_failures),
            success_by_position: self.success_by_position.clone(),
            rate_samples: self.rate_samples.clone(),
        })
    }
}

fn ratio_or_zero(numerator: u64, denominator: u64) -> f64 {
    if denominator > 0 {
        numerator as f64 / denominator as f64
    } else {
        0.0
    }
}

// ── Finalized summary ──────────────────────────────────────────────

/// Average machine composition at one fullness level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThresholdSummary {
    pub label: String,
    /// Mean remaining count per item, indexed like the catalog.
    pub mean_counts: Vec<f64>,
    pub mean_total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemSummary {
    pub item: String,
    pub successes: u64,
    pub failures: u64,
    /// 0.0 when the item was never desired.
    pub success_rate: f64,
    /// None when the item was never observed depleting.
    pub mean_pulls_to_depletion: Option<f64>,
}

/// The finalized statistics handed to the report renderer. Never
/// mutated after `finalize`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimSummary {
    pub runs: u64,
    pub items: Vec<String>,
    pub thresholds: Vec<ThresholdSummary>,
    pub item_stats: Vec<ItemSummary>,
    pub mean_pulls_per_success: f64,
    pub mean_pulls_per_failure: f64,
    pub success_by_position: BTreeMap<u64, u64>,
    /// Raw per-lifetime shares, `[level][item]`, passed through
    /// unmodified for downstream significance testing.
    pub rate_samples: Vec<Vec<Vec<f64>>>,
}

impl SimSummary {
    pub fn rate_samples_for(&self, level: usize, item: usize) -> &[f64] {
        &self.rate_samples[level][item]
    }
}
