//! HTTP handlers for inventory ledger endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::ledger::{LedgerService, ReceiveBatchInput};
use crate::AppState;
use shared::models::InventoryBatch;

/// Receive a batch into the ledger (supply-intake approval)
pub async fn receive_batch(
    State(state): State<AppState>,
    Json(input): Json<ReceiveBatchInput>,
) -> AppResult<Json<InventoryBatch>> {
    let service = LedgerService::new(state.db);
    let batch = service.receive_batch(input).await?;
    Ok(Json(batch))
}

/// List all batches
pub async fn list_batches(State(state): State<AppState>) -> AppResult<Json<Vec<InventoryBatch>>> {
    let service = LedgerService::new(state.db);
    let batches = service.list_batches().await?;
    Ok(Json(batches))
}

/// Get one batch
pub async fn get_batch(
    State(state): State<AppState>,
    Path(batch_id): Path<Uuid>,
) -> AppResult<Json<InventoryBatch>> {
    let service = LedgerService::new(state.db);
    let batch = service.get_batch(batch_id).await?;
    Ok(Json(batch))
}

/// List a product's batches in FIFO order
pub async fn get_product_batches(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<Vec<InventoryBatch>>> {
    let service = LedgerService::new(state.db);
    let batches = service.batches_for_product(product_id).await?;
    Ok(Json(batches))
}

/// Query parameters for the availability endpoint
#[derive(Debug, Deserialize)]
pub struct AvailableQuery {
    pub as_of: Option<NaiveDate>,
}

/// Response for the availability endpoint
#[derive(Debug, Serialize)]
pub struct AvailableResponse {
    pub product_id: Uuid,
    pub as_of: NaiveDate,
    pub available: Decimal,
}

/// Sum of non-expired batch remainders for a product
pub async fn get_available_quantity(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    Query(query): Query<AvailableQuery>,
) -> AppResult<Json<AvailableResponse>> {
    let as_of = query.as_of.unwrap_or_else(|| Utc::now().date_naive());
    let service = LedgerService::new(state.db);
    let available = service.available_quantity(product_id, as_of).await?;
    Ok(Json(AvailableResponse {
        product_id,
        as_of,
        available,
    }))
}
