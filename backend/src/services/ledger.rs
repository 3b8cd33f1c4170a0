//! Inventory ledger service
//!
//! Owns the per-batch stock records. Batches enter through supply-intake
//! approval (`receive_batch`) and are only ever mutated by the FIFO
//! depletion engine or by withdrawal reversal; they are zeroed, never
//! deleted.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::InventoryBatch;
use shared::validation::{
    validate_batch_dates, validate_quantity_positive, validate_quantity_scale,
};

/// Inventory ledger service for batch intake and availability queries
#[derive(Clone)]
pub struct LedgerService {
    db: PgPool,
}

/// Database row for an inventory batch
#[derive(Debug, sqlx::FromRow)]
struct BatchRow {
    id: Uuid,
    product_id: Uuid,
    quantity_received: Decimal,
    quantity_on_hand: Decimal,
    unit_cost: Decimal,
    entry_date: NaiveDate,
    expiry_date: NaiveDate,
    created_at: DateTime<Utc>,
}

impl From<BatchRow> for InventoryBatch {
    fn from(row: BatchRow) -> Self {
        InventoryBatch {
            id: row.id,
            product_id: row.product_id,
            quantity_received: row.quantity_received,
            quantity_on_hand: row.quantity_on_hand,
            unit_cost: row.unit_cost,
            entry_date: row.entry_date,
            expiry_date: row.expiry_date,
            created_at: row.created_at,
        }
    }
}

/// Input for receiving a batch into the station
#[derive(Debug, Deserialize)]
pub struct ReceiveBatchInput {
    pub product_id: Uuid,
    pub quantity: Decimal,
    pub unit_cost: Decimal,
    pub entry_date: Option<NaiveDate>,
    pub expiry_date: NaiveDate,
}

impl LedgerService {
    /// Create a new LedgerService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Receive a batch into the ledger (called on supply-intake approval)
    pub async fn receive_batch(&self, input: ReceiveBatchInput) -> AppResult<InventoryBatch> {
        if let Err(message) = validate_quantity_positive(input.quantity) {
            return Err(AppError::Validation {
                field: "quantity".to_string(),
                message: message.to_string(),
                message_vi: "Số lượng phải là số dương".to_string(),
            });
        }

        if let Err(message) = validate_quantity_scale(input.quantity) {
            return Err(AppError::Validation {
                field: "quantity".to_string(),
                message: message.to_string(),
                message_vi: "Số lượng không được quá ba chữ số thập phân".to_string(),
            });
        }

        if input.unit_cost < Decimal::ZERO {
            return Err(AppError::Validation {
                field: "unit_cost".to_string(),
                message: "Unit cost cannot be negative".to_string(),
                message_vi: "Đơn giá không được âm".to_string(),
            });
        }

        let entry_date = input.entry_date.unwrap_or_else(|| Utc::now().date_naive());
        if let Err(message) = validate_batch_dates(entry_date, input.expiry_date) {
            return Err(AppError::Validation {
                field: "expiry_date".to_string(),
                message: message.to_string(),
                message_vi: "Hạn sử dụng không được trước ngày nhập kho".to_string(),
            });
        }

        let product_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
                .bind(input.product_id)
                .fetch_one(&self.db)
                .await?;
        if !product_exists {
            return Err(AppError::InvalidReference("product".to_string()));
        }

        let row = sqlx::query_as::<_, BatchRow>(
            r#"
            INSERT INTO inventory_batches
                (product_id, quantity_received, quantity_on_hand, unit_cost, entry_date, expiry_date)
            VALUES ($1, $2, $2, $3, $4, $5)
            RETURNING id, product_id, quantity_received, quantity_on_hand, unit_cost,
                      entry_date, expiry_date, created_at
            "#,
        )
        .bind(input.product_id)
        .bind(input.quantity)
        .bind(input.unit_cost)
        .bind(entry_date)
        .bind(input.expiry_date)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    /// Get one batch by id
    pub async fn get_batch(&self, batch_id: Uuid) -> AppResult<InventoryBatch> {
        let row = sqlx::query_as::<_, BatchRow>(
            r#"
            SELECT id, product_id, quantity_received, quantity_on_hand, unit_cost,
                   entry_date, expiry_date, created_at
            FROM inventory_batches
            WHERE id = $1
            "#,
        )
        .bind(batch_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Batch".to_string()))?;

        Ok(row.into())
    }

    /// List a product's batches in FIFO order (expiry, then entry date)
    pub async fn batches_for_product(&self, product_id: Uuid) -> AppResult<Vec<InventoryBatch>> {
        let rows = sqlx::query_as::<_, BatchRow>(
            r#"
            SELECT id, product_id, quantity_received, quantity_on_hand, unit_cost,
                   entry_date, expiry_date, created_at
            FROM inventory_batches
            WHERE product_id = $1
            ORDER BY expiry_date ASC, entry_date ASC
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// List all batches, grouped by product in FIFO order
    pub async fn list_batches(&self) -> AppResult<Vec<InventoryBatch>> {
        let rows = sqlx::query_as::<_, BatchRow>(
            r#"
            SELECT id, product_id, quantity_received, quantity_on_hand, unit_cost,
                   entry_date, expiry_date, created_at
            FROM inventory_batches
            ORDER BY product_id, expiry_date ASC, entry_date ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Sum of non-expired batch remainders for a product as of `as_of`
    pub async fn available_quantity(&self, product_id: Uuid, as_of: NaiveDate) -> AppResult<Decimal> {
        let available = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(quantity_on_hand), 0)
            FROM inventory_batches
            WHERE product_id = $1 AND expiry_date >= $2
            "#,
        )
        .bind(product_id)
        .bind(as_of)
        .fetch_one(&self.db)
        .await?;

        Ok(available)
    }
}
