//! HTTP handlers for withdrawal endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::withdrawal::{
    CreateWithdrawalInput, UpdateWithdrawalInput, WithdrawalFilter, WithdrawalService,
    WithdrawalWithDecrements,
};
use crate::AppState;
use shared::models::{BatchDecrement, WithdrawalRecord};

/// Record an actual withdrawal (performs the FIFO ledger decrement)
pub async fn create_withdrawal(
    State(state): State<AppState>,
    Json(input): Json<CreateWithdrawalInput>,
) -> AppResult<Json<WithdrawalWithDecrements>> {
    let service = WithdrawalService::new(state.db, state.config.ledger.clone());
    let withdrawal = service.create_actual(input).await?;
    Ok(Json(withdrawal))
}

/// Get a withdrawal record
pub async fn get_withdrawal(
    State(state): State<AppState>,
    Path(withdrawal_id): Path<Uuid>,
) -> AppResult<Json<WithdrawalRecord>> {
    let service = WithdrawalService::new(state.db, state.config.ledger.clone());
    let record = service.get(withdrawal_id).await?;
    Ok(Json(record))
}

/// List withdrawal records
pub async fn list_withdrawals(
    State(state): State<AppState>,
    Query(filter): Query<WithdrawalFilter>,
) -> AppResult<Json<Vec<WithdrawalRecord>>> {
    let service = WithdrawalService::new(state.db, state.config.ledger.clone());
    let records = service.list(filter).await?;
    Ok(Json(records))
}

/// The per-batch decrement audit for a withdrawal
pub async fn get_withdrawal_decrements(
    State(state): State<AppState>,
    Path(withdrawal_id): Path<Uuid>,
) -> AppResult<Json<Vec<BatchDecrement>>> {
    let service = WithdrawalService::new(state.db, state.config.ledger.clone());
    // 404 for an unknown id rather than an empty list
    service.get(withdrawal_id).await?;
    let decrements = service.decrements(withdrawal_id).await?;
    Ok(Json(decrements))
}

/// Edit an actual withdrawal (reverse old decrement, apply new one)
pub async fn update_withdrawal(
    State(state): State<AppState>,
    Path(withdrawal_id): Path<Uuid>,
    Json(input): Json<UpdateWithdrawalInput>,
) -> AppResult<Json<WithdrawalWithDecrements>> {
    let service = WithdrawalService::new(state.db, state.config.ledger.clone());
    let withdrawal = service.update_actual(withdrawal_id, input).await?;
    Ok(Json(withdrawal))
}

/// Delete a withdrawal record (restores the ledger decrement for an
/// active actual record)
pub async fn delete_withdrawal(
    State(state): State<AppState>,
    Path(withdrawal_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = WithdrawalService::new(state.db, state.config.ledger.clone());
    service.delete(withdrawal_id).await?;
    Ok(Json(()))
}
