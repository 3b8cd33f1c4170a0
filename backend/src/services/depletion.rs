//! FIFO depletion engine
//!
//! Consumes soonest-to-expire stock first. The planning half is pure:
//! given a snapshot of batch state it computes exactly which batches to
//! decrement by how much, or fails whole with `InsufficientInventory`.
//! The applying half executes a plan inside a transaction using
//! conditional updates, so a plan computed against a stale snapshot is
//! detected and retried by the caller instead of over-withdrawing.

use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::{BatchDecrement, BatchState};

/// Per-batch headroom used when reversing a withdrawal
#[derive(Debug, Clone)]
pub struct BatchHeadroom {
    pub batch_id: Uuid,
    pub quantity_received: Decimal,
    pub quantity_on_hand: Decimal,
}

/// Compute the FIFO decrement plan for withdrawing `requested` from
/// `batches`.
///
/// Batches are ordered ascending by expiry date, ties broken by entry
/// date (oldest stock first within the same expiry), then greedily
/// drained. The order is fixed here, at plan time, and the applier never
/// reorders it. If the total on hand cannot satisfy the request no plan
/// is produced at all.
pub fn plan_depletion(
    batches: &[BatchState],
    requested: Decimal,
) -> AppResult<Vec<BatchDecrement>> {
    let mut ordered: Vec<&BatchState> = batches.iter().filter(|b| b.remaining > Decimal::ZERO).collect();
    ordered.sort_by(|a, b| {
        a.expiry_date
            .cmp(&b.expiry_date)
            .then_with(|| a.entry_date.cmp(&b.entry_date))
    });

    let available: Decimal = ordered.iter().map(|b| b.remaining).sum();
    if available < requested {
        return Err(AppError::InsufficientInventory {
            available,
            requested,
        });
    }

    let mut decrements = Vec::new();
    let mut still_needed = requested;
    for batch in ordered {
        if still_needed.is_zero() {
            break;
        }
        let take = batch.remaining.min(still_needed);
        decrements.push(BatchDecrement {
            batch_id: batch.batch_id,
            quantity: take,
        });
        still_needed -= take;
    }

    Ok(decrements)
}

/// Check that restoring `decrements` fits within each batch's originally
/// received quantity.
///
/// Restoration re-adds to the same batch rows the withdrawal drained; a
/// restore that would push a batch above `quantity_received` means the
/// decrement audit no longer matches the ledger and is refused.
pub fn plan_restoration(
    decrements: &[BatchDecrement],
    headrooms: &[BatchHeadroom],
) -> AppResult<Vec<BatchDecrement>> {
    for decrement in decrements {
        let headroom = headrooms
            .iter()
            .find(|h| h.batch_id == decrement.batch_id)
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "batch {} referenced by decrement audit no longer exists",
                    decrement.batch_id
                ))
            })?;
        if headroom.quantity_on_hand + decrement.quantity > headroom.quantity_received {
            return Err(AppError::Internal(format!(
                "restoring {} into batch {} would exceed its received quantity",
                decrement.quantity, decrement.batch_id
            )));
        }
    }
    Ok(decrements.to_vec())
}

/// Transactional applier for depletion and restoration plans
#[derive(Clone)]
pub struct DepletionEngine {
    db: PgPool,
}

/// Database row for batch state
#[derive(Debug, sqlx::FromRow)]
struct BatchStateRow {
    id: Uuid,
    expiry_date: chrono::NaiveDate,
    entry_date: chrono::NaiveDate,
    quantity_on_hand: Decimal,
}

/// Database row for batch headroom
#[derive(Debug, sqlx::FromRow)]
struct BatchHeadroomRow {
    id: Uuid,
    quantity_received: Decimal,
    quantity_on_hand: Decimal,
}

impl DepletionEngine {
    /// Create a new DepletionEngine instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Snapshot the withdrawable state of a product's batches
    pub async fn fetch_states(&self, product_id: Uuid) -> AppResult<Vec<BatchState>> {
        let rows = sqlx::query_as::<_, BatchStateRow>(
            r#"
            SELECT id, expiry_date, entry_date, quantity_on_hand
            FROM inventory_batches
            WHERE product_id = $1 AND quantity_on_hand > 0
            ORDER BY expiry_date ASC, entry_date ASC
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| BatchState {
                batch_id: r.id,
                expiry_date: r.expiry_date,
                entry_date: r.entry_date,
                remaining: r.quantity_on_hand,
            })
            .collect())
    }

    /// Apply a decrement plan inside `tx`.
    ///
    /// Each decrement is conditional on the batch still holding the
    /// planned quantity. Returns `false` (caller must roll back and
    /// retry from a fresh snapshot) if any batch was concurrently
    /// drained below its planned take; `true` when the full plan
    /// applied.
    pub async fn apply_decrements(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        plan: &[BatchDecrement],
    ) -> AppResult<bool> {
        for decrement in plan {
            let result = sqlx::query(
                r#"
                UPDATE inventory_batches
                SET quantity_on_hand = quantity_on_hand - $1
                WHERE id = $2 AND quantity_on_hand >= $1
                "#,
            )
            .bind(decrement.quantity)
            .bind(decrement.batch_id)
            .execute(&mut **tx)
            .await?;

            if result.rows_affected() == 0 {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Fetch headroom for the batches named in a decrement audit,
    /// locking them for the remainder of `tx`.
    pub async fn fetch_headrooms(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        batch_ids: &[Uuid],
    ) -> AppResult<Vec<BatchHeadroom>> {
        let rows = sqlx::query_as::<_, BatchHeadroomRow>(
            r#"
            SELECT id, quantity_received, quantity_on_hand
            FROM inventory_batches
            WHERE id = ANY($1)
            FOR UPDATE
            "#,
        )
        .bind(batch_ids)
        .fetch_all(&mut **tx)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| BatchHeadroom {
                batch_id: r.id,
                quantity_received: r.quantity_received,
                quantity_on_hand: r.quantity_on_hand,
            })
            .collect())
    }

    /// Re-add a withdrawal's recorded decrements to the same batches.
    ///
    /// The cap at `quantity_received` is enforced twice: by
    /// [`plan_restoration`] against the locked headroom snapshot and by
    /// the conditional update itself.
    pub async fn apply_restoration(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        restores: &[BatchDecrement],
    ) -> AppResult<()> {
        for restore in restores {
            let result = sqlx::query(
                r#"
                UPDATE inventory_batches
                SET quantity_on_hand = quantity_on_hand + $1
                WHERE id = $2 AND quantity_on_hand + $1 <= quantity_received
                "#,
            )
            .bind(restore.quantity)
            .bind(restore.batch_id)
            .execute(&mut **tx)
            .await?;

            if result.rows_affected() == 0 {
                return Err(AppError::Internal(format!(
                    "failed to restore {} into batch {}",
                    restore.quantity, restore.batch_id
                )));
            }
        }
        Ok(())
    }
}
