//! Unit rationing allocator tests
//!
//! Covers proportional splitting, the residual-assignment rule and the
//! conservation invariant: allocations always sum to the requirement
//! exactly, for arbitrary headcount distributions including zero.

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;
use uuid::Uuid;

use food_logistics_backend::services::allocator::allocate;
use shared::models::UnitShare;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn share(code: &str, headcount: i32) -> UnitShare {
    UnitShare {
        unit_id: Uuid::new_v4(),
        code: code.to_string(),
        headcount,
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Monday scenario: 12kg of soybeans across units of 60 and 40
    /// personnel splits 7.2 / 4.8 and sums back to 12 exactly
    #[test]
    fn test_proportional_split_scenario() {
        let units = vec![share("d1", 60), share("d2", 40)];
        let allocations = allocate(dec("12.0"), &units);

        assert_eq!(allocations.len(), 2);
        assert_eq!(allocations[0].quantity, dec("7.2"));
        assert_eq!(allocations[1].quantity, dec("4.8"));

        let total: Decimal = allocations.iter().map(|a| a.quantity).sum();
        assert_eq!(total, dec("12.0"));
    }

    /// Zero total headcount rations nothing and is not an error
    #[test]
    fn test_zero_headcount_allocates_zero() {
        let units = vec![share("d1", 0), share("d2", 0)];
        let allocations = allocate(dec("25.0"), &units);

        assert_eq!(allocations.len(), 2);
        for allocation in &allocations {
            assert_eq!(allocation.quantity, Decimal::ZERO);
        }
    }

    /// No units at all yields no allocations
    #[test]
    fn test_no_units() {
        let allocations = allocate(dec("10.0"), &[]);
        assert!(allocations.is_empty());
    }

    /// The rounding residual lands on the unit with the largest headcount
    #[test]
    fn test_residual_goes_to_largest_unit() {
        // 10 / 3 does not round cleanly at 2 digits
        let units = vec![share("d1", 50), share("d2", 30), share("d3", 20)];
        let allocations = allocate(dec("10.00"), &units);

        let total: Decimal = allocations.iter().map(|a| a.quantity).sum();
        assert_eq!(total, dec("10.00"));

        // 1.00 across 3+2+2 personnel rounds to 0.43/0.29/0.29, one
        // hundredth over; the largest unit gives it back
        let units = vec![share("d1", 3), share("d2", 2), share("d3", 2)];
        let allocations = allocate(dec("1.00"), &units);
        let total: Decimal = allocations.iter().map(|a| a.quantity).sum();
        assert_eq!(total, dec("1.00"));
        assert_eq!(allocations[0].quantity, dec("0.42"));
        assert_eq!(allocations[1].quantity, dec("0.29"));
        assert_eq!(allocations[2].quantity, dec("0.29"));
    }

    /// Equal headcounts: the residual goes to the first unit in the
    /// caller-supplied order, deterministically
    #[test]
    fn test_residual_tie_break_is_first_in_order() {
        let units = vec![share("a", 50), share("b", 50)];
        // 0.01 cannot split evenly: raw shares are 0.005 each, rounding
        // away from zero gives 0.01 + 0.01, residual -0.01
        let allocations = allocate(dec("0.01"), &units);

        let total: Decimal = allocations.iter().map(|a| a.quantity).sum();
        assert_eq!(total, dec("0.01"));
        assert_eq!(allocations[0].quantity, dec("0.00"));
        assert_eq!(allocations[1].quantity, dec("0.01"));
    }

    /// A single unit receives the whole requirement
    #[test]
    fn test_single_unit_takes_all() {
        let units = vec![share("only", 75)];
        let allocations = allocate(dec("33.333"), &units);
        assert_eq!(allocations[0].quantity, dec("33.333"));
    }

    /// Units with zero headcount among active ones receive zero
    #[test]
    fn test_zero_headcount_unit_among_active() {
        let units = vec![share("d1", 0), share("d2", 100)];
        let allocations = allocate(dec("18.5"), &units);

        assert_eq!(allocations[0].quantity, Decimal::ZERO);
        assert_eq!(allocations[1].quantity, dec("18.5"));
    }

    /// Zero requirement yields zero allocations for every unit
    #[test]
    fn test_zero_requirement() {
        let units = vec![share("d1", 60), share("d2", 40)];
        let allocations = allocate(Decimal::ZERO, &units);

        for allocation in &allocations {
            assert_eq!(allocation.quantity, Decimal::ZERO);
        }
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Strategy for generating requirement quantities (0.001 to 10000.000)
    fn quantity_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=10_000_000i64).prop_map(|n| Decimal::new(n, 3))
    }

    /// Strategy for generating headcount vectors, zeros included
    fn headcounts_strategy() -> impl Strategy<Value = Vec<i32>> {
        prop::collection::vec(0i32..=2000, 1..12)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Conservation: allocations sum to the requirement exactly,
        /// whatever the headcount distribution
        #[test]
        fn prop_allocations_conserve_total(
            total in quantity_strategy(),
            headcounts in headcounts_strategy()
        ) {
            let units: Vec<UnitShare> = headcounts
                .iter()
                .enumerate()
                .map(|(i, h)| share(&format!("u{i:02}"), *h))
                .collect();

            let allocations = allocate(total, &units);
            prop_assert_eq!(allocations.len(), units.len());

            let sum: Decimal = allocations.iter().map(|a| a.quantity).sum();
            let expected = if headcounts.iter().all(|h| *h == 0) {
                Decimal::ZERO
            } else {
                total
            };
            prop_assert_eq!(sum, expected);
        }

        /// Proportionality: a unit's share never deviates from the exact
        /// ratio by more than the rounding step plus the residual
        #[test]
        fn prop_shares_track_headcount_ratio(
            total in quantity_strategy(),
            headcounts in headcounts_strategy()
        ) {
            let total_headcount: i64 = headcounts.iter().map(|h| i64::from(*h)).sum();
            prop_assume!(total_headcount > 0);

            let units: Vec<UnitShare> = headcounts
                .iter()
                .enumerate()
                .map(|(i, h)| share(&format!("u{i:02}"), *h))
                .collect();

            let allocations = allocate(total, &units);
            // Residual at most one rounding step per unit
            let tolerance = Decimal::new(1, 2) * Decimal::from(units.len() as i64 + 1);

            for (unit, allocation) in units.iter().zip(&allocations) {
                let exact = total * Decimal::from(unit.headcount)
                    / Decimal::from(total_headcount);
                let deviation = (allocation.quantity - exact).abs();
                prop_assert!(
                    deviation <= tolerance,
                    "unit {} deviates by {}",
                    unit.code,
                    deviation
                );
            }
        }

        /// Determinism: the same inputs always produce the same split
        #[test]
        fn prop_allocation_is_deterministic(
            total in quantity_strategy(),
            headcounts in headcounts_strategy()
        ) {
            let units: Vec<UnitShare> = headcounts
                .iter()
                .enumerate()
                .map(|(i, h)| share(&format!("u{i:02}"), *h))
                .collect();

            let first = allocate(total, &units);
            let second = allocate(total, &units);
            prop_assert_eq!(first, second);
        }
    }
}
