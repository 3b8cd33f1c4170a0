//! Error handling for the Food Logistics Management Platform
//!
//! Provides consistent error responses in Vietnamese and English

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation error: {message}")]
    Validation {
        field: String,
        message: String,
        message_vi: String,
    },

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    // Business logic errors
    #[error("Invalid menu data for {date}: {detail}")]
    InvalidMenuData { date: NaiveDate, detail: String },

    #[error("Insufficient inventory: requested {requested}, available {available}")]
    InsufficientInventory {
        available: Decimal,
        requested: Decimal,
    },

    #[error("Concurrent ledger update conflict")]
    ConcurrencyConflict,

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message_en: String,
    pub message_vi: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested: Option<Decimal>,
}

impl ErrorDetail {
    fn new(code: &str, message_en: String, message_vi: String) -> Self {
        Self {
            code: code.to_string(),
            message_en,
            message_vi,
            field: None,
            available: None,
            requested: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::Validation {
                field,
                message,
                message_vi,
            } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    field: Some(field.clone()),
                    ..ErrorDetail::new("VALIDATION_ERROR", message.clone(), message_vi.clone())
                },
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail::new(
                    "NOT_FOUND",
                    format!("{} not found", resource),
                    format!("Không tìm thấy {}", resource),
                ),
            ),
            AppError::InvalidReference(what) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail::new(
                    "INVALID_REFERENCE",
                    format!("Referenced {} does not exist", what),
                    format!("Tham chiếu {} không tồn tại", what),
                ),
            ),
            AppError::InvalidMenuData { date, detail } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail::new(
                    "INVALID_MENU_DATA",
                    format!("Menu data for {} is malformed: {}", date, detail),
                    format!("Dữ liệu thực đơn ngày {} không hợp lệ: {}", date, detail),
                ),
            ),
            AppError::InsufficientInventory {
                available,
                requested,
            } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    available: Some(*available),
                    requested: Some(*requested),
                    ..ErrorDetail::new(
                        "INSUFFICIENT_INVENTORY",
                        format!(
                            "Requested {} but only {} is in stock",
                            requested, available
                        ),
                        format!(
                            "Yêu cầu xuất {} nhưng tồn kho chỉ còn {}",
                            requested, available
                        ),
                    )
                },
            ),
            AppError::ConcurrencyConflict => (
                StatusCode::CONFLICT,
                ErrorDetail::new(
                    "CONCURRENCY_CONFLICT",
                    "The inventory ledger was modified concurrently; retry the withdrawal"
                        .to_string(),
                    "Sổ kho vừa bị thay đổi đồng thời; vui lòng thử xuất kho lại".to_string(),
                ),
            ),
            AppError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new(
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                    "Đã xảy ra lỗi cơ sở dữ liệu".to_string(),
                ),
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new(
                    "INTERNAL_ERROR",
                    msg.clone(),
                    "Đã xảy ra lỗi nội bộ máy chủ".to_string(),
                ),
            ),
        };

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
