//! The simulation engine — drives many independent lifetimes and
//! folds them into a single aggregate.
//!
//! RULES:
//!   - Lifetimes share no mutable state; the Aggregator is the only
//!     serialization point.
//!   - Lifetime i always draws from stream i of the RngBank, so a
//!     single run can be replayed in isolation with `run_lifetime`.
//!   - Execution is sequential and synchronous; nothing suspends.

use crate::aggregate::{Aggregator, SimSummary};
use crate::config::SimConfig;
use crate::customer_model::CustomerModel;
use crate::error::SimResult;
use crate::lifetime::{LifetimeResult, LifetimeSimulator};
use crate::rng::RngBank;
use crate::snapshot::SnapshotPlan;
use crate::types::RunId;

/// Progress is logged every this many completed lifetimes.
pub const PROGRESS_LOG_INTERVAL: u64 = 1000;

pub struct SimEngine {
    pub run_id: RunId,
    config: SimConfig,
    model: CustomerModel,
    plan: SnapshotPlan,
    rng_bank: RngBank,
    seed: u64,
}

impl SimEngine {
    /// Build an engine over a configuration, rejecting invalid input
    /// up front — nothing downstream revalidates.
    pub fn new(run_id: RunId, config: SimConfig, seed: u64) -> SimResult<Self> {
        config.validate()?;
        let model = CustomerModel::new(&config);
        let plan = SnapshotPlan::from_config(&config);
        Ok(Self {
            run_id,
            config,
            model,
            plan,
            rng_bank: RngBank::new(seed),
            seed,
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn plan(&self) -> &SnapshotPlan {
        &self.plan
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Run (or replay) one lifetime from its derived RNG stream.
    pub fn run_lifetime(&self, lifetime_index: u64) -> SimResult<LifetimeResult> {
        let mut rng = self.rng_bank.for_lifetime(lifetime_index);
        LifetimeSimulator::new(&self.config, &self.model, &self.plan).run(&mut rng)
    }

    /// Run every configured lifetime, fold each result as it lands,
    /// and return the finalized summary.
    pub fn run(&self) -> SimResult<SimSummary> {
        log::info!(
            "run={} starting {} lifetimes (seed {})",
            self.run_id,
            self.config.lifetimes,
            self.seed
        );

        let mut aggregator = Aggregator::new(&self.config, &self.plan);
        for index in 0..self.config.lifetimes {
            let result = self.run_lifetime(index)?;
            aggregator.add_result(&result);

            let done = index + 1;
            if done % PROGRESS_LOG_INTERVAL == 0 || done == self.config.lifetimes {
                log::info!(
                    "run={} lifetimes complete: {done}/{}",
                    self.run_id,
                    self.config.lifetimes
                );
            }
        }
        aggregator.finalize()
    }
}
