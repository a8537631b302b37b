//! Payment allocation across open credit lines.
//!
//! Given an incoming payment and a customer's open credit lines, the
//! allocator walks the lines **in the order given** (the caller puts lines
//! from the payment's own receipt first, then the rest in creation order)
//! and pays each line off in turn until the money runs out.
//!
//! The allocator is pure: it mutates the in-memory lines and reports what
//! it did, and the persistence driver in `ops::credits` writes the result
//! inside one database transaction.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Credit;

/// What the allocator did to one credit line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub credit_id: Uuid,
    pub receipt_id: Uuid,
    /// Portion of the incoming amount absorbed by this line.
    pub amount_applied: i64,
    /// Whether the line reached `amount_left == 0` in this round.
    pub fulfilled: bool,
}

/// Result of allocating one incoming payment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationOutcome {
    pub allocations: Vec<Allocation>,
    /// Surplus left after all lines are fulfilled. Never silently dropped;
    /// callers decide what to do with change.
    pub unallocated: i64,
}

impl AllocationOutcome {
    /// Total amount that landed on credit lines in this round.
    pub fn total_applied(&self) -> i64 {
        self.allocations.iter().map(|a| a.amount_applied).sum()
    }
}

/// Allocates `incoming_amount` across `lines`, preserving their order.
///
/// Fulfilled and deleted lines are skipped silently. Once the running
/// amount reaches zero the remaining lines are left untouched. The sum of
/// applied portions plus `unallocated` always equals `incoming_amount`.
pub fn allocate(incoming_amount: i64, lines: &mut [Credit]) -> AllocationOutcome {
    let mut running = incoming_amount.max(0);
    let mut allocations = Vec::new();

    for line in lines.iter_mut() {
        let applied = line.apply(running);
        if applied == 0 {
            continue;
        }
        running -= applied;
        allocations.push(Allocation {
            credit_id: line.id,
            receipt_id: line.receipt_id,
            amount_applied: applied,
            fulfilled: line.fulfilled,
        });
    }

    AllocationOutcome {
        allocations,
        unallocated: running,
    }
}
