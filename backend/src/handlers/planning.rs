//! HTTP handlers for ration planning endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::reconciler::{ReconciliationService, VarianceFilter};
use crate::AppState;
use shared::models::{PlannedGeneration, VarianceRow};
use shared::types::PlanWeek;

/// Input for generating planned withdrawals
#[derive(Debug, Deserialize)]
pub struct GeneratePlannedInput {
    pub week: u32,
    pub year: i32,
    #[serde(default)]
    pub overwrite: bool,
}

/// Generate planned withdrawal records for a week
pub async fn generate_planned(
    State(state): State<AppState>,
    Json(input): Json<GeneratePlannedInput>,
) -> AppResult<Json<PlannedGeneration>> {
    let service = ReconciliationService::new(state.db);
    let outcome = service
        .generate_planned(PlanWeek::new(input.week, input.year), input.overwrite)
        .await?;
    Ok(Json(outcome))
}

/// Query parameters for the variance comparison
#[derive(Debug, Deserialize)]
pub struct VarianceQuery {
    pub week: u32,
    pub year: i32,
    pub unit_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
}

/// Compare planned against actual withdrawals for a week
pub async fn get_variance(
    State(state): State<AppState>,
    Query(query): Query<VarianceQuery>,
) -> AppResult<Json<Vec<VarianceRow>>> {
    let service = ReconciliationService::new(state.db);
    let rows = service
        .compare(
            PlanWeek::new(query.week, query.year),
            VarianceFilter {
                unit_id: query.unit_id,
                product_id: query.product_id,
            },
        )
        .await?;
    Ok(Json(rows))
}
