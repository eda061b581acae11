//! Shared primitive types used across the entire simulation.

/// Position of an item type in the configured catalog.
/// All per-item tables in the core are indexed by this.
pub type ItemIndex = usize;

/// 1-based index of a single draw within one lifetime, counted
/// across session boundaries.
pub type PullIndex = u64;

/// The canonical run identifier.
pub type RunId = String;
