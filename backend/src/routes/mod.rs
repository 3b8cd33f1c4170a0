//! Route definitions for the Food Logistics Management Platform

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Inventory ledger
        .nest("/inventory", inventory_routes())
        // Withdrawals (planned and actual)
        .nest("/withdrawals", withdrawal_routes())
        // Ration planning
        .nest("/planning", planning_routes())
}

/// Inventory ledger routes
fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/batches",
            get(handlers::list_batches).post(handlers::receive_batch),
        )
        .route("/batches/:batch_id", get(handlers::get_batch))
        .route(
            "/products/:product_id/batches",
            get(handlers::get_product_batches),
        )
        .route(
            "/products/:product_id/available",
            get(handlers::get_available_quantity),
        )
}

/// Withdrawal routes
fn withdrawal_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_withdrawals).post(handlers::create_withdrawal),
        )
        .route(
            "/:withdrawal_id",
            get(handlers::get_withdrawal)
                .put(handlers::update_withdrawal)
                .delete(handlers::delete_withdrawal),
        )
        .route(
            "/:withdrawal_id/decrements",
            get(handlers::get_withdrawal_decrements),
        )
}

/// Ration planning routes
fn planning_routes() -> Router<AppState> {
    Router::new()
        .route("/generate", post(handlers::generate_planned))
        .route("/variance", get(handlers::get_variance))
}
