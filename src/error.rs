//! Error types for the loyalty backend
//!
//! Provides unified error handling using thiserror.
//!
//! Two families live here: `CacheError` is internal to the cache layer and is
//! never surfaced to API callers (the ledger gateway absorbs it as a forced
//! miss), while `AppError` is the taxonomy the orchestrator and handlers
//! return over HTTP.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Error type for the in-process cache store.
///
/// These never cross the gateway boundary: a cache failure is logged and
/// treated as a miss, and the authoritative chain is consulted instead.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key not found in cache
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Key has expired
    #[error("Key expired: {0}")]
    Expired(String),

    /// Invalid key or value (too long, too large)
    #[error("Invalid cache request: {0}")]
    InvalidRequest(String),

    /// Cache is full and eviction failed
    #[error("Cache full: {0}")]
    CacheFull(String),
}

/// Convenience Result type for cache-layer operations.
pub type CacheResult<T> = std::result::Result<T, CacheError>;

// == App Error Enum ==
/// Unified error type for ledger, orchestration, and API operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// The chain call failed or timed out; local state has been rolled back.
    #[error("Ledger unavailable: {0}")]
    LedgerUnavailable(String),

    /// The target user does not exist in the store.
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// A chain-reported value cannot be safely represented; never coerced.
    #[error("Data integrity error: {0}")]
    DataIntegrity(String),

    /// Redemption attempted against a balance below the package threshold.
    #[error("Insufficient points: need {required}, have {available}")]
    InsufficientPoints { required: u64, available: u64 },

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::LedgerUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::UserNotFound(_) => StatusCode::NOT_FOUND,
            AppError::DataIntegrity(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InsufficientPoints { .. } => StatusCode::CONFLICT,
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the loyalty backend.
pub type Result<T> = std::result::Result<T, AppError>;
