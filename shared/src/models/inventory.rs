//! Inventory ledger models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One received lot of one product, with its own expiry date and
/// remaining quantity.
///
/// Batches are never deleted; a fully consumed batch stays at zero for
/// audit. `quantity_on_hand` is bounded by `[0, quantity_received]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryBatch {
    pub id: Uuid,
    pub product_id: Uuid,
    /// Quantity originally received into the station
    pub quantity_received: Decimal,
    /// Quantity still available for withdrawal
    pub quantity_on_hand: Decimal,
    pub unit_cost: Decimal,
    pub entry_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// The slice of batch state the depletion planner works on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchState {
    pub batch_id: Uuid,
    pub expiry_date: NaiveDate,
    pub entry_date: NaiveDate,
    pub remaining: Decimal,
}

/// One batch's share of a withdrawal, recorded so the exact decrement can
/// be reversed later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchDecrement {
    pub batch_id: Uuid,
    pub quantity: Decimal,
}
