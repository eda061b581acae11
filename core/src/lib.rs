//! gachapon-core: Monte Carlo depletion model of a finite-inventory
//! capsule machine.
//!
//! One *lifetime* drains a freshly filled machine to empty through a
//! sequence of customer *sessions*; many independent lifetimes are
//! folded into a single aggregate, and the rare item's observed share
//! at a fullness threshold is tested against its physical baseline.
//!
//! RULES:
//!   - All randomness flows through the RngBank. No platform RNG.
//!   - Lifetime i's stream depends only on (master seed, i), so any
//!     run can be replayed in isolation.
//!   - Snapshots are captured per draw, at the exact threshold
//!     crossing — never at session boundaries.
//!   - The Aggregator is the sole serialization point between runs.

pub mod aggregate;
pub mod config;
pub mod customer_model;
pub mod engine;
pub mod error;
pub mod inventory;
pub mod lifetime;
pub mod rng;
pub mod session;
pub mod significance;
pub mod snapshot;
pub mod types;
