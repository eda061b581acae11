//! One customer session: pull until the desired item appears, the
//! pull budget runs out, or the machine goes empty.

use crate::error::SimResult;
use crate::inventory::Inventory;
use crate::lifetime::DrawMonitor;
use crate::rng::LifetimeRng;
use crate::types::ItemIndex;
use serde::{Deserialize, Serialize};

/// What one customer walked away with. Never mutated after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionOutcome {
    pub desired_item: ItemIndex,
    pub succeeded: bool,
    pub pulls_taken: u64,
}

/// Drive one session against the shared inventory.
///
/// Every draw is forwarded to the lifetime-level monitor before the
/// session decides whether to stop — depletion and snapshot tracking
/// must not see session boundaries.
pub fn run_session(
    inventory: &mut Inventory,
    desired_item: ItemIndex,
    max_pulls: u64,
    monitor: &mut DrawMonitor<'_>,
    rng: &mut LifetimeRng,
) -> SimResult<SessionOutcome> {
    let mut pulls_taken = 0u64;
    let mut succeeded = false;

    for _ in 0..max_pulls {
        if inventory.total_remaining() == 0 {
            break;
        }
        let drawn = inventory.draw(rng)?;
        pulls_taken += 1;
        monitor.record_draw(drawn, inventory);
        if drawn == desired_item {
            succeeded = true;
            break;
        }
    }

    Ok(SessionOutcome {
        desired_item,
        succeeded,
        pulls_taken,
    })
}
