//! Machine and behavior configuration.
//!
//! Configuration is loaded once, resolved from item names to dense
//! per-index tables, and validated before anything simulates. The core
//! never renormalizes weights at runtime; a weight set that does not
//! sum to 1.0 is a load-time error, not something to paper over.

use crate::error::{SimError, SimResult};
use crate::types::ItemIndex;
use serde::{Deserialize, Serialize};

/// Tolerance when checking that a weight set sums to 1.0.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// One row of a patience distribution: a customer willing to make at
/// most `max_pulls` draws in a session, with probability `weight`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PatienceEntry {
    pub max_pulls: u64,
    pub weight: f64,
}

// ── Machine file format ────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
struct DesireRow {
    item: String,
    weight: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct PatienceRow {
    /// Item name, or "Default" for the required fallback distribution.
    item: String,
    entries: Vec<PatienceEntry>,
}

#[derive(Debug, Clone, Deserialize)]
struct MachineFile {
    items: Vec<String>,
    capsules_per_item: u64,
    desire_weights: Vec<DesireRow>,
    patience: Vec<PatienceRow>,
    lifetimes: u64,
    snapshot_thresholds: Vec<f64>,
}

/// The name a patience row must carry to act as the fallback.
pub const DEFAULT_PATIENCE_KEY: &str = "Default";

// ── Resolved configuration ─────────────────────────────────────────

/// Fully resolved, immutable configuration. Per-item tables are dense
/// and indexed by `ItemIndex` (position in `items`), so every shape
/// the aggregator needs is known before the first draw.
#[derive(Debug, Clone)]
pub struct SimConfig {
    pub items: Vec<String>,
    pub capsules_per_item: u64,
    /// Probability that a customer desires each item. Items with no
    /// row in the file get weight 0 and are never desired.
    pub desire_weights: Vec<f64>,
    /// Per-item patience distribution; `None` falls back to default.
    pub patience: Vec<Option<Vec<PatienceEntry>>>,
    pub default_patience: Vec<PatienceEntry>,
    pub lifetimes: u64,
    /// Fullness fractions in [0, 1] at which to snapshot.
    pub snapshot_thresholds: Vec<f64>,
}

impl SimConfig {
    /// Load and validate a machine file.
    /// In tests, use `SimConfig::default_test()`.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let file: MachineFile = serde_json::from_str(&content)?;
        let config = Self::resolve(file)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve name-keyed file rows into dense per-index tables.
    fn resolve(file: MachineFile) -> SimResult<Self> {
        let index_of = |name: &str| -> SimResult<ItemIndex> {
            file.items
                .iter()
                .position(|i| i == name)
                .ok_or_else(|| SimError::Config(format!("unknown item '{name}'")))
        };

        let mut desire_weights = vec![0.0; file.items.len()];
        for row in &file.desire_weights {
            let idx = index_of(&row.item)?;
            desire_weights[idx] = row.weight;
        }

        let mut patience: Vec<Option<Vec<PatienceEntry>>> = vec![None; file.items.len()];
        let mut default_patience: Option<Vec<PatienceEntry>> = None;
        for row in file.patience {
            if row.item == DEFAULT_PATIENCE_KEY {
                default_patience = Some(row.entries);
            } else {
                let idx = index_of(&row.item)?;
                patience[idx] = Some(row.entries);
            }
        }
        let default_patience = default_patience.ok_or_else(|| {
            SimError::Config(format!(
                "patience table has no '{DEFAULT_PATIENCE_KEY}' entry"
            ))
        })?;

        Ok(Self {
            items: file.items,
            capsules_per_item: file.capsules_per_item,
            desire_weights,
            patience,
            default_patience,
            lifetimes: file.lifetimes,
            snapshot_thresholds: file.snapshot_thresholds,
        })
    }

    /// Check every configuration invariant. Pure: validating twice
    /// yields the same verdict both times.
    pub fn validate(&self) -> SimResult<()> {
        if self.items.is_empty() {
            return Err(SimError::Config("item list is empty".into()));
        }
        for (i, item) in self.items.iter().enumerate() {
            if self.items[..i].contains(item) {
                return Err(SimError::Config(format!("duplicate item '{item}'")));
            }
        }
        if self.capsules_per_item == 0 {
            return Err(SimError::Config("capsules_per_item must be positive".into()));
        }
        if self.lifetimes == 0 {
            return Err(SimError::Config("lifetimes must be positive".into()));
        }

        check_weight_sum("desire_weights", self.desire_weights.iter().copied())?;
        check_patience(DEFAULT_PATIENCE_KEY, &self.default_patience)?;
        for (idx, entries) in self.patience.iter().enumerate() {
            if let Some(entries) = entries {
                check_patience(&self.items[idx], entries)?;
            }
        }

        if self.snapshot_thresholds.is_empty() {
            return Err(SimError::Config("snapshot_thresholds is empty".into()));
        }
        for (i, &f) in self.snapshot_thresholds.iter().enumerate() {
            if !(0.0..=1.0).contains(&f) {
                return Err(SimError::Config(format!(
                    "snapshot threshold {f} outside [0, 1]"
                )));
            }
            if self.snapshot_thresholds[..i].contains(&f) {
                return Err(SimError::Config(format!(
                    "duplicate snapshot threshold {f}"
                )));
            }
        }
        Ok(())
    }

    pub fn total_capsules(&self) -> u64 {
        self.capsules_per_item * self.items.len() as u64
    }

    /// The null-hypothesis rate: an item's nominal physical share.
    pub fn baseline_rate(&self) -> f64 {
        1.0 / self.items.len() as f64
    }

    pub fn item_index(&self, name: &str) -> Option<ItemIndex> {
        self.items.iter().position(|i| i == name)
    }

    /// Small fixture for unit and integration tests.
    pub fn default_test() -> Self {
        Self {
            items: vec![
                "Red Panda".into(),
                "Blue Penguin".into(),
                "Green Frog".into(),
            ],
            capsules_per_item: 4,
            desire_weights: vec![0.4, 0.4, 0.2],
            patience: vec![None, None, None],
            default_patience: vec![
                PatienceEntry { max_pulls: 2, weight: 0.5 },
                PatienceEntry { max_pulls: 3, weight: 0.5 },
            ],
            lifetimes: 50,
            snapshot_thresholds: vec![1.0, 0.5, 0.0],
        }
    }

    /// The demo machine sim-runner falls back to when no config file
    /// is given: five item types, all demand concentrated on one rare
    /// item, customers with effectively unlimited patience.
    pub fn sample_machine() -> Self {
        let items: Vec<String> = vec![
            "Penguin Keychain".into(),
            "Fox Keychain".into(),
            "Turtle Figurine".into(),
            "Otter Sticker".into(),
            "Gilded Lion".into(),
        ];
        let rare = items.len() - 1;
        let mut desire_weights = vec![0.0; items.len()];
        desire_weights[rare] = 1.0;
        let unlimited = vec![PatienceEntry { max_pulls: 10_000_000, weight: 1.0 }];
        let mut patience: Vec<Option<Vec<PatienceEntry>>> = vec![None; items.len()];
        patience[rare] = Some(unlimited.clone());
        Self {
            items,
            capsules_per_item: 50,
            desire_weights,
            patience,
            default_patience: unlimited,
            lifetimes: 10_000,
            snapshot_thresholds: vec![1.0, 0.75, 0.50, 0.25, 0.0],
        }
    }
}

fn check_weight_sum(name: &str, weights: impl Iterator<Item = f64>) -> SimResult<()> {
    let mut sum = 0.0;
    for w in weights {
        if w < 0.0 {
            return Err(SimError::Config(format!("{name}: negative weight {w}")));
        }
        sum += w;
    }
    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(SimError::Config(format!(
            "{name}: weights sum to {sum}, expected 1.0"
        )));
    }
    Ok(())
}

fn check_patience(owner: &str, entries: &[PatienceEntry]) -> SimResult<()> {
    if entries.is_empty() {
        return Err(SimError::Config(format!(
            "patience for '{owner}' has no entries"
        )));
    }
    for e in entries {
        if e.max_pulls == 0 {
            return Err(SimError::Config(format!(
                "patience for '{owner}': max_pulls must be at least 1"
            )));
        }
    }
    check_weight_sum(&format!("patience for '{owner}'"), entries.iter().map(|e| e.weight))
}
