//! FIFO depletion engine tests
//!
//! Exercises the pure planning core: expiry-first ordering, all-or-nothing
//! failure on insufficient stock, exact reversal and the
//! reverse-before-reapply ordering of edits.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;
use uuid::Uuid;

use food_logistics_backend::error::AppError;
use food_logistics_backend::services::depletion::{
    plan_depletion, plan_restoration, BatchHeadroom,
};
use shared::models::{BatchDecrement, BatchState};

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn batch(expiry: NaiveDate, entry: NaiveDate, remaining: &str) -> BatchState {
    BatchState {
        batch_id: Uuid::new_v4(),
        expiry_date: expiry,
        entry_date: entry,
        remaining: dec(remaining),
    }
}

/// Apply a decrement plan to an in-memory snapshot, mirroring what the
/// transactional applier does to the batch rows
fn apply(batches: &mut [BatchState], plan: &[BatchDecrement]) {
    for decrement in plan {
        let state = batches
            .iter_mut()
            .find(|b| b.batch_id == decrement.batch_id)
            .expect("plan references a known batch");
        state.remaining -= decrement.quantity;
    }
}

/// Undo a decrement plan on an in-memory snapshot
fn unapply(batches: &mut [BatchState], plan: &[BatchDecrement]) {
    for decrement in plan {
        let state = batches
            .iter_mut()
            .find(|b| b.batch_id == decrement.batch_id)
            .expect("plan references a known batch");
        state.remaining += decrement.quantity;
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Batches [5,5,5] by ascending expiry, withdrawing 7: the first
    /// drains to 0, the second to 3, the third is untouched
    #[test]
    fn test_fifo_order_across_batches() {
        let entry = date(2025, 1, 1);
        let batches = vec![
            batch(date(2025, 2, 1), entry, "5"),
            batch(date(2025, 3, 1), entry, "5"),
            batch(date(2025, 4, 1), entry, "5"),
        ];

        let plan = plan_depletion(&batches, dec("7")).unwrap();

        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].batch_id, batches[0].batch_id);
        assert_eq!(plan[0].quantity, dec("5"));
        assert_eq!(plan[1].batch_id, batches[1].batch_id);
        assert_eq!(plan[1].quantity, dec("2"));

        let mut state = batches.clone();
        apply(&mut state, &plan);
        assert_eq!(state[0].remaining, dec("0"));
        assert_eq!(state[1].remaining, dec("3"));
        assert_eq!(state[2].remaining, dec("5"));
    }

    /// Station scenario: batches of 3kg (expires Jan 5) and 10kg
    /// (expires Jan 10); withdrawing 5kg drains the first and leaves 8
    /// in the second
    #[test]
    fn test_fifo_scenario_two_batches() {
        let batches = vec![
            batch(date(2025, 1, 5), date(2024, 12, 20), "3"),
            batch(date(2025, 1, 10), date(2024, 12, 22), "10"),
        ];

        let plan = plan_depletion(&batches, dec("5")).unwrap();
        let mut state = batches.clone();
        apply(&mut state, &plan);

        assert_eq!(state[0].remaining, dec("0"));
        assert_eq!(state[1].remaining, dec("8"));
    }

    /// Same expiry date: the older entry date is consumed first
    #[test]
    fn test_entry_date_breaks_expiry_ties() {
        let expiry = date(2025, 6, 1);
        let newer = batch(expiry, date(2025, 1, 10), "4");
        let older = batch(expiry, date(2025, 1, 5), "4");
        // Deliberately out of order in the input
        let batches = vec![newer.clone(), older.clone()];

        let plan = plan_depletion(&batches, dec("4")).unwrap();

        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].batch_id, older.batch_id);
    }

    /// Requesting more than the total on hand fails whole, producing no
    /// plan and reporting both quantities
    #[test]
    fn test_insufficient_inventory_is_all_or_nothing() {
        let entry = date(2025, 1, 1);
        let batches = vec![
            batch(date(2025, 2, 1), entry, "4"),
            batch(date(2025, 3, 1), entry, "6"),
        ];

        let result = plan_depletion(&batches, dec("15"));

        match result {
            Err(AppError::InsufficientInventory {
                available,
                requested,
            }) => {
                assert_eq!(available, dec("10"));
                assert_eq!(requested, dec("15"));
            }
            other => panic!("expected InsufficientInventory, got {:?}", other.map(|_| ())),
        }
    }

    /// Exhausted batches do not participate in planning or availability
    #[test]
    fn test_zeroed_batches_are_inert() {
        let entry = date(2025, 1, 1);
        let batches = vec![
            batch(date(2025, 2, 1), entry, "0"),
            batch(date(2025, 3, 1), entry, "5"),
        ];

        let plan = plan_depletion(&batches, dec("5")).unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].batch_id, batches[1].batch_id);

        let result = plan_depletion(&batches, dec("6"));
        assert!(matches!(
            result,
            Err(AppError::InsufficientInventory { available, .. }) if available == dec("5")
        ));
    }

    /// Withdraw 7 from [5,5,5], reverse it: the first two batches return
    /// to their original quantities, the third was never touched
    #[test]
    fn test_reversal_restores_exact_batches() {
        let entry = date(2025, 1, 1);
        let batches = vec![
            batch(date(2025, 2, 1), entry, "5"),
            batch(date(2025, 3, 1), entry, "5"),
            batch(date(2025, 4, 1), entry, "5"),
        ];

        let plan = plan_depletion(&batches, dec("7")).unwrap();
        let mut state = batches.clone();
        apply(&mut state, &plan);

        let headrooms: Vec<BatchHeadroom> = state
            .iter()
            .map(|b| BatchHeadroom {
                batch_id: b.batch_id,
                quantity_received: dec("5"),
                quantity_on_hand: b.remaining,
            })
            .collect();

        let restores = plan_restoration(&plan, &headrooms).unwrap();
        unapply(&mut state, &restores);

        for (restored, original) in state.iter().zip(&batches) {
            assert_eq!(restored.remaining, original.remaining);
        }
    }

    /// A restore that would push a batch above its received quantity is
    /// refused: the audit no longer matches the ledger
    #[test]
    fn test_restoration_cannot_exceed_received_quantity() {
        let batch_id = Uuid::new_v4();
        let decrements = vec![BatchDecrement {
            batch_id,
            quantity: dec("4"),
        }];
        let headrooms = vec![BatchHeadroom {
            batch_id,
            quantity_received: dec("10"),
            quantity_on_hand: dec("8"),
        }];

        let result = plan_restoration(&decrements, &headrooms);
        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    /// A restore against a vanished batch is refused rather than
    /// silently re-created
    #[test]
    fn test_restoration_requires_original_batch() {
        let decrements = vec![BatchDecrement {
            batch_id: Uuid::new_v4(),
            quantity: dec("2"),
        }];

        let result = plan_restoration(&decrements, &[]);
        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    /// Editing is reverse-then-reapply: when the re-withdrawal fails on
    /// stock, the reversal has still been applied and the ledger reads
    /// as if only the reversal happened
    #[test]
    fn test_edit_ordering_reversal_survives_failed_reapply() {
        let entry = date(2025, 1, 1);
        let mut state = vec![
            batch(date(2025, 2, 1), entry, "5"),
            batch(date(2025, 3, 1), entry, "5"),
        ];
        let original = state.clone();

        // Original withdrawal of 6
        let plan = plan_depletion(&state, dec("6")).unwrap();
        apply(&mut state, &plan);
        assert_eq!(state[0].remaining, dec("0"));
        assert_eq!(state[1].remaining, dec("4"));

        // Edit to 20: step 1 reverses the old withdrawal in full
        let headrooms: Vec<BatchHeadroom> = state
            .iter()
            .map(|b| BatchHeadroom {
                batch_id: b.batch_id,
                quantity_received: dec("5"),
                quantity_on_hand: b.remaining,
            })
            .collect();
        let restores = plan_restoration(&plan, &headrooms).unwrap();
        unapply(&mut state, &restores);

        // Step 2 fails: 20 exceeds the restored stock of 10
        let reapply = plan_depletion(&state, dec("20"));
        assert!(matches!(
            reapply,
            Err(AppError::InsufficientInventory { .. })
        ));

        // Ledger state is exactly as if only the reversal happened
        for (current, before) in state.iter().zip(&original) {
            assert_eq!(current.remaining, before.remaining);
        }
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Strategy for generating batch snapshots with varied expiry and
    /// entry dates
    fn batches_strategy() -> impl Strategy<Value = Vec<BatchState>> {
        prop::collection::vec(
            (0i64..=50_000i64, 0u32..=365, 0u32..=90),
            1..10,
        )
        .prop_map(|specs| {
            let base = date(2025, 1, 1);
            specs
                .into_iter()
                .map(|(remaining, expiry_offset, entry_offset)| BatchState {
                    batch_id: Uuid::new_v4(),
                    expiry_date: base + chrono::Duration::days(i64::from(expiry_offset)),
                    entry_date: base - chrono::Duration::days(i64::from(entry_offset)),
                    remaining: Decimal::new(remaining, 3),
                })
                .collect()
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// A successful plan always withdraws exactly the requested
        /// quantity, never more than any batch held
        #[test]
        fn prop_plan_is_exact_and_bounded(
            batches in batches_strategy(),
            requested_millis in 1i64..=60_000i64
        ) {
            let requested = Decimal::new(requested_millis, 3);
            let available: Decimal = batches.iter().map(|b| b.remaining).sum();

            match plan_depletion(&batches, requested) {
                Ok(plan) => {
                    prop_assert!(available >= requested);

                    let planned: Decimal = plan.iter().map(|d| d.quantity).sum();
                    prop_assert_eq!(planned, requested);

                    for decrement in &plan {
                        let state = batches
                            .iter()
                            .find(|b| b.batch_id == decrement.batch_id)
                            .expect("plan references a known batch");
                        prop_assert!(decrement.quantity > Decimal::ZERO);
                        prop_assert!(decrement.quantity <= state.remaining);
                    }
                }
                Err(AppError::InsufficientInventory { available: a, requested: r }) => {
                    prop_assert!(available < requested);
                    prop_assert_eq!(a, available);
                    prop_assert_eq!(r, requested);
                }
                Err(other) => prop_assert!(false, "unexpected error {other:?}"),
            }
        }

        /// FIFO: every batch the plan touches expires no later than any
        /// batch it leaves stock in
        #[test]
        fn prop_plan_prefers_earliest_expiry(
            batches in batches_strategy(),
            requested_millis in 1i64..=60_000i64
        ) {
            let requested = Decimal::new(requested_millis, 3);
            if let Ok(plan) = plan_depletion(&batches, requested) {
                let mut state = batches.clone();
                apply(&mut state, &plan);

                // A batch with stock left must not expire before a batch
                // that was drained below its starting quantity
                for touched in &plan {
                    let touched_state = state
                        .iter()
                        .find(|b| b.batch_id == touched.batch_id)
                        .unwrap();
                    if touched_state.remaining > Decimal::ZERO {
                        continue; // partially drained tail batch
                    }
                    for untouched in state.iter().filter(|b| {
                        b.remaining > Decimal::ZERO
                            && plan.iter().all(|d| d.batch_id != b.batch_id)
                    }) {
                        prop_assert!(
                            (touched_state.expiry_date, touched_state.entry_date)
                                <= (untouched.expiry_date, untouched.entry_date)
                        );
                    }
                }
            }
        }

        /// Reversal is a complete inverse: apply then restore returns
        /// every batch to its starting quantity
        #[test]
        fn prop_reversal_roundtrips(
            batches in batches_strategy(),
            requested_millis in 1i64..=30_000i64
        ) {
            let requested = Decimal::new(requested_millis, 3);
            if let Ok(plan) = plan_depletion(&batches, requested) {
                let mut state = batches.clone();
                apply(&mut state, &plan);

                let headrooms: Vec<BatchHeadroom> = state
                    .iter()
                    .zip(&batches)
                    .map(|(current, original)| BatchHeadroom {
                        batch_id: current.batch_id,
                        quantity_received: original.remaining,
                        quantity_on_hand: current.remaining,
                    })
                    .collect();

                let restores = plan_restoration(&plan, &headrooms).unwrap();
                unapply(&mut state, &restores);

                for (restored, original) in state.iter().zip(&batches) {
                    prop_assert_eq!(restored.remaining, original.remaining);
                }
            }
        }
    }
}
