//! Unit rationing allocator
//!
//! Splits an aggregated daily requirement across receiving units
//! proportionally to headcount. Pure computation; persisting the result
//! as planned withdrawal records is the caller's decision.

use rust_decimal::{Decimal, RoundingStrategy};
use shared::models::{Allocation, UnitShare};

/// Fractional digits kept on an allocated quantity
const ALLOCATION_SCALE: u32 = 2;

/// Allocate `total` across `units` proportionally to headcount.
///
/// Shares are computed in decimal arithmetic and rounded to
/// [`ALLOCATION_SCALE`] digits. The residual between `total` and the sum
/// of rounded shares is assigned to the unit with the largest headcount,
/// so the allocations always sum to `total` exactly. When two units tie
/// on headcount the residual goes to the one appearing first in `units`;
/// callers supply units in a stable order (unit code ascending).
///
/// A total headcount of zero is not an error: a day with no reported
/// personnel rations nothing, and every unit receives zero.
pub fn allocate(total: Decimal, units: &[UnitShare]) -> Vec<Allocation> {
    let total_headcount: i64 = units.iter().map(|u| i64::from(u.headcount)).sum();

    if total_headcount == 0 {
        return units
            .iter()
            .map(|u| Allocation {
                unit_id: u.unit_id,
                quantity: Decimal::ZERO,
            })
            .collect();
    }

    let headcount_sum = Decimal::from(total_headcount);
    let mut allocations: Vec<Allocation> = units
        .iter()
        .map(|u| {
            let share = total * Decimal::from(u.headcount) / headcount_sum;
            Allocation {
                unit_id: u.unit_id,
                quantity: share
                    .round_dp_with_strategy(ALLOCATION_SCALE, RoundingStrategy::MidpointAwayFromZero),
            }
        })
        .collect();

    let allocated: Decimal = allocations.iter().map(|a| a.quantity).sum();
    let residual = total - allocated;

    if !residual.is_zero() {
        // Largest headcount absorbs the rounding residual; first wins on ties
        let receiver = units
            .iter()
            .enumerate()
            .max_by(|(ia, a), (ib, b)| {
                a.headcount
                    .cmp(&b.headcount)
                    .then_with(|| ib.cmp(ia))
            })
            .map(|(i, _)| i)
            .unwrap_or(0);
        allocations[receiver].quantity += residual;
    }

    allocations
}
