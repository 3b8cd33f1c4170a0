//! Supply withdrawal service
//!
//! Lifecycle of withdrawal records. An actual withdrawal is created
//! together with its FIFO ledger decrement in one transaction; deleting
//! it restores exactly the per-batch quantities it consumed. Editing is
//! reverse-then-reapply: the reversal commits first, and a re-withdrawal
//! that fails on stock leaves the ledger holding only the reversal.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::config::LedgerConfig;
use crate::error::{AppError, AppResult};
use crate::services::depletion::{plan_depletion, plan_restoration, DepletionEngine};
use shared::models::{BatchDecrement, WithdrawalKind, WithdrawalRecord, WithdrawalStatus};
use shared::validation::{validate_quantity_positive, validate_quantity_scale};

/// Withdrawal record service
#[derive(Clone)]
pub struct WithdrawalService {
    db: PgPool,
    engine: DepletionEngine,
    ledger: LedgerConfig,
}

/// Database row for a withdrawal record
#[derive(Debug, sqlx::FromRow)]
struct WithdrawalRow {
    id: Uuid,
    kind: String,
    unit_id: Uuid,
    product_id: Uuid,
    quantity: Decimal,
    withdrawal_date: NaiveDate,
    status: String,
    plan_week: Option<i32>,
    plan_year: Option<i32>,
    receiver: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<WithdrawalRow> for WithdrawalRecord {
    type Error = AppError;

    fn try_from(row: WithdrawalRow) -> Result<Self, AppError> {
        let kind = WithdrawalKind::parse(&row.kind)
            .ok_or_else(|| AppError::Internal(format!("unknown withdrawal kind '{}'", row.kind)))?;
        let status = WithdrawalStatus::parse(&row.status).ok_or_else(|| {
            AppError::Internal(format!("unknown withdrawal status '{}'", row.status))
        })?;
        Ok(WithdrawalRecord {
            id: row.id,
            kind,
            unit_id: row.unit_id,
            product_id: row.product_id,
            quantity: row.quantity,
            withdrawal_date: row.withdrawal_date,
            status,
            plan_week: row.plan_week,
            plan_year: row.plan_year,
            receiver: row.receiver,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Database row for a decrement audit entry
#[derive(Debug, sqlx::FromRow)]
struct DecrementRow {
    batch_id: Uuid,
    quantity: Decimal,
}

/// Input for recording an actual withdrawal
#[derive(Debug, Deserialize)]
pub struct CreateWithdrawalInput {
    pub unit_id: Uuid,
    pub product_id: Uuid,
    pub quantity: Decimal,
    pub withdrawal_date: Option<NaiveDate>,
    pub receiver: Option<String>,
}

/// Input for editing an actual withdrawal
#[derive(Debug, Deserialize)]
pub struct UpdateWithdrawalInput {
    pub unit_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
    pub quantity: Option<Decimal>,
    pub withdrawal_date: Option<NaiveDate>,
    pub receiver: Option<String>,
}

/// List filters
#[derive(Debug, Default, Deserialize)]
pub struct WithdrawalFilter {
    pub kind: Option<WithdrawalKind>,
    pub unit_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// An actual withdrawal together with the batch decrements it performed
#[derive(Debug, Clone, Serialize)]
pub struct WithdrawalWithDecrements {
    #[serde(flatten)]
    pub record: WithdrawalRecord,
    pub batch_decrements: Vec<BatchDecrement>,
}

impl WithdrawalService {
    /// Create a new WithdrawalService instance
    pub fn new(db: PgPool, ledger: LedgerConfig) -> Self {
        let engine = DepletionEngine::new(db.clone());
        Self { db, engine, ledger }
    }

    /// Record an actual withdrawal, depleting the ledger FIFO.
    ///
    /// The scan-plan-apply sequence is optimistic: the plan is computed
    /// from a snapshot and applied with conditional decrements; a
    /// concurrent withdrawal that invalidates the snapshot rolls the
    /// transaction back and the sequence restarts from fresh state, up
    /// to `ledger.max_retries` times.
    pub async fn create_actual(
        &self,
        input: CreateWithdrawalInput,
    ) -> AppResult<WithdrawalWithDecrements> {
        self.validate_quantity(input.quantity)?;
        self.validate_references(input.unit_id, input.product_id)
            .await?;

        let withdrawal_date = input
            .withdrawal_date
            .unwrap_or_else(|| Utc::now().date_naive());

        for attempt in 0..=self.ledger.max_retries {
            let states = self.engine.fetch_states(input.product_id).await?;
            let plan = plan_depletion(&states, input.quantity)?;

            let mut tx = self.db.begin().await?;
            if !self.engine.apply_decrements(&mut tx, &plan).await? {
                tx.rollback().await?;
                tracing::warn!(
                    product_id = %input.product_id,
                    attempt,
                    "conflicting concurrent withdrawal, retrying from fresh batch state"
                );
                continue;
            }

            let row = sqlx::query_as::<_, WithdrawalRow>(
                r#"
                INSERT INTO withdrawal_records
                    (kind, unit_id, product_id, quantity, withdrawal_date, status, receiver)
                VALUES ('actual', $1, $2, $3, $4, 'active', $5)
                RETURNING id, kind, unit_id, product_id, quantity, withdrawal_date, status,
                          plan_week, plan_year, receiver, created_at, updated_at
                "#,
            )
            .bind(input.unit_id)
            .bind(input.product_id)
            .bind(input.quantity)
            .bind(withdrawal_date)
            .bind(&input.receiver)
            .fetch_one(&mut *tx)
            .await?;

            self.insert_decrements(&mut tx, row.id, &plan).await?;
            tx.commit().await?;

            return Ok(WithdrawalWithDecrements {
                record: row.try_into()?,
                batch_decrements: plan,
            });
        }

        Err(AppError::ConcurrencyConflict)
    }

    /// Get a withdrawal record by id
    pub async fn get(&self, withdrawal_id: Uuid) -> AppResult<WithdrawalRecord> {
        let row = sqlx::query_as::<_, WithdrawalRow>(
            r#"
            SELECT id, kind, unit_id, product_id, quantity, withdrawal_date, status,
                   plan_week, plan_year, receiver, created_at, updated_at
            FROM withdrawal_records
            WHERE id = $1
            "#,
        )
        .bind(withdrawal_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Withdrawal record".to_string()))?;

        row.try_into()
    }

    /// List withdrawal records, newest first
    pub async fn list(&self, filter: WithdrawalFilter) -> AppResult<Vec<WithdrawalRecord>> {
        let rows = sqlx::query_as::<_, WithdrawalRow>(
            r#"
            SELECT id, kind, unit_id, product_id, quantity, withdrawal_date, status,
                   plan_week, plan_year, receiver, created_at, updated_at
            FROM withdrawal_records
            WHERE ($1::text IS NULL OR kind = $1)
              AND ($2::uuid IS NULL OR unit_id = $2)
              AND ($3::uuid IS NULL OR product_id = $3)
              AND ($4::date IS NULL OR withdrawal_date >= $4)
              AND ($5::date IS NULL OR withdrawal_date <= $5)
            ORDER BY withdrawal_date DESC, created_at DESC
            "#,
        )
        .bind(filter.kind.map(|k| k.as_str()))
        .bind(filter.unit_id)
        .bind(filter.product_id)
        .bind(filter.from)
        .bind(filter.to)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Edit an actual withdrawal.
    ///
    /// Modeled as: reverse the old withdrawal in full, then perform a
    /// new one with the merged parameters. The reversal is committed on
    /// its own, so a re-withdrawal that fails with
    /// `InsufficientInventory` leaves the ledger exactly as if only the
    /// reversal had happened; the record then stays in status
    /// `reversed` for the operator to re-issue or delete.
    pub async fn update_actual(
        &self,
        withdrawal_id: Uuid,
        input: UpdateWithdrawalInput,
    ) -> AppResult<WithdrawalWithDecrements> {
        let existing = self.get(withdrawal_id).await?;
        if existing.kind != WithdrawalKind::Actual {
            return Err(AppError::Validation {
                field: "id".to_string(),
                message: "Planned records are regenerated from the menu, not edited".to_string(),
                message_vi: "Phiếu kế hoạch được tạo lại từ thực đơn, không sửa trực tiếp"
                    .to_string(),
            });
        }

        let unit_id = input.unit_id.unwrap_or(existing.unit_id);
        let product_id = input.product_id.unwrap_or(existing.product_id);
        let quantity = input.quantity.unwrap_or(existing.quantity);
        let withdrawal_date = input.withdrawal_date.unwrap_or(existing.withdrawal_date);
        let receiver = input.receiver.or_else(|| existing.receiver.clone());

        // Bad input must fail the edit before anything is reversed
        self.validate_quantity(quantity)?;
        self.validate_references(unit_id, product_id).await?;

        // Step 1: reverse the old decrement and mark the record reversed
        if existing.status == WithdrawalStatus::Active {
            let mut tx = self.db.begin().await?;
            self.reverse_in_tx(&mut tx, withdrawal_id).await?;
            sqlx::query(
                "UPDATE withdrawal_records SET status = 'reversed', updated_at = NOW() WHERE id = $1",
            )
            .bind(withdrawal_id)
            .execute(&mut *tx)
            .await?;
            tx.commit().await?;
        }

        // Step 2: re-withdraw with the new parameters
        for attempt in 0..=self.ledger.max_retries {
            let states = self.engine.fetch_states(product_id).await?;
            let plan = plan_depletion(&states, quantity)?;

            let mut tx = self.db.begin().await?;
            if !self.engine.apply_decrements(&mut tx, &plan).await? {
                tx.rollback().await?;
                tracing::warn!(
                    product_id = %product_id,
                    attempt,
                    "conflicting concurrent withdrawal during edit, retrying"
                );
                continue;
            }

            let row = sqlx::query_as::<_, WithdrawalRow>(
                r#"
                UPDATE withdrawal_records
                SET unit_id = $1, product_id = $2, quantity = $3, withdrawal_date = $4,
                    receiver = $5, status = 'active', updated_at = NOW()
                WHERE id = $6
                RETURNING id, kind, unit_id, product_id, quantity, withdrawal_date, status,
                          plan_week, plan_year, receiver, created_at, updated_at
                "#,
            )
            .bind(unit_id)
            .bind(product_id)
            .bind(quantity)
            .bind(withdrawal_date)
            .bind(&receiver)
            .bind(withdrawal_id)
            .fetch_one(&mut *tx)
            .await?;

            self.insert_decrements(&mut tx, withdrawal_id, &plan).await?;
            tx.commit().await?;

            return Ok(WithdrawalWithDecrements {
                record: row.try_into()?,
                batch_decrements: plan,
            });
        }

        Err(AppError::ConcurrencyConflict)
    }

    /// Delete a withdrawal record.
    ///
    /// An active actual record has its recorded batch decrements
    /// restored in the same transaction. Planned and already-reversed
    /// records carry no ledger effect to undo.
    pub async fn delete(&self, withdrawal_id: Uuid) -> AppResult<()> {
        let existing = self.get(withdrawal_id).await?;

        let mut tx = self.db.begin().await?;
        if existing.kind == WithdrawalKind::Actual && existing.status == WithdrawalStatus::Active {
            self.reverse_in_tx(&mut tx, withdrawal_id).await?;
        }
        sqlx::query("DELETE FROM withdrawal_records WHERE id = $1")
            .bind(withdrawal_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(())
    }

    /// The batch decrements recorded for a withdrawal
    pub async fn decrements(&self, withdrawal_id: Uuid) -> AppResult<Vec<BatchDecrement>> {
        let rows = sqlx::query_as::<_, DecrementRow>(
            r#"
            SELECT batch_id, quantity
            FROM withdrawal_batch_decrements
            WHERE withdrawal_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(withdrawal_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| BatchDecrement {
                batch_id: r.batch_id,
                quantity: r.quantity,
            })
            .collect())
    }

    /// Restore a withdrawal's recorded decrements and clear its audit
    /// rows, all inside `tx`
    async fn reverse_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        withdrawal_id: Uuid,
    ) -> AppResult<()> {
        let rows = sqlx::query_as::<_, DecrementRow>(
            r#"
            SELECT batch_id, quantity
            FROM withdrawal_batch_decrements
            WHERE withdrawal_id = $1
            "#,
        )
        .bind(withdrawal_id)
        .fetch_all(&mut **tx)
        .await?;

        let decrements: Vec<BatchDecrement> = rows
            .into_iter()
            .map(|r| BatchDecrement {
                batch_id: r.batch_id,
                quantity: r.quantity,
            })
            .collect();

        if decrements.is_empty() {
            return Ok(());
        }

        let batch_ids: Vec<Uuid> = decrements.iter().map(|d| d.batch_id).collect();
        let headrooms = self.engine.fetch_headrooms(tx, &batch_ids).await?;
        let restores = plan_restoration(&decrements, &headrooms)?;
        self.engine.apply_restoration(tx, &restores).await?;

        sqlx::query("DELETE FROM withdrawal_batch_decrements WHERE withdrawal_id = $1")
            .bind(withdrawal_id)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    /// Insert decrement audit rows for a withdrawal
    async fn insert_decrements(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        withdrawal_id: Uuid,
        plan: &[BatchDecrement],
    ) -> AppResult<()> {
        for decrement in plan {
            sqlx::query(
                r#"
                INSERT INTO withdrawal_batch_decrements (withdrawal_id, batch_id, quantity)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(withdrawal_id)
            .bind(decrement.batch_id)
            .bind(decrement.quantity)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }

    /// Withdrawal quantities must be positive and fit the ledger's
    /// storage scale
    fn validate_quantity(&self, quantity: Decimal) -> AppResult<()> {
        if let Err(message) = validate_quantity_positive(quantity) {
            return Err(AppError::Validation {
                field: "quantity".to_string(),
                message: message.to_string(),
                message_vi: "Số lượng xuất phải là số dương".to_string(),
            });
        }
        if let Err(message) = validate_quantity_scale(quantity) {
            return Err(AppError::Validation {
                field: "quantity".to_string(),
                message: message.to_string(),
                message_vi: "Số lượng xuất không được quá ba chữ số thập phân".to_string(),
            });
        }
        Ok(())
    }

    /// Fail with `InvalidReference` unless both the unit and the product
    /// exist
    async fn validate_references(&self, unit_id: Uuid, product_id: Uuid) -> AppResult<()> {
        let unit_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM units WHERE id = $1)")
                .bind(unit_id)
                .fetch_one(&self.db)
                .await?;
        if !unit_exists {
            return Err(AppError::InvalidReference("unit".to_string()));
        }

        let product_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
                .bind(product_id)
                .fetch_one(&self.db)
                .await?;
        if !product_exists {
            return Err(AppError::InvalidReference("product".to_string()));
        }

        Ok(())
    }
}
