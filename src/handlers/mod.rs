pub mod auth;
pub mod health;
pub mod multipart;
pub mod participants;
pub mod partners;
pub mod quotes;
pub mod upload;

pub use auth::*;
pub use health::*;
pub use participants::*;
pub use partners::*;
pub use quotes::*;
pub use upload::*;

use axum::{Json, extract::rejection::JsonRejection};

use crate::{
    error::{Error, Result},
    state::AppState,
};

/// Unwraps a JSON body, reporting a missing content type or a malformed
/// payload as a validation error on `body`.
pub(crate) fn json_body<T>(
    payload: std::result::Result<Json<T>, JsonRejection>,
    operation: &str,
) -> Result<T> {
    payload.map(|Json(value)| value).map_err(|rejection| {
        let e = Error::validation(
            "body",
            format!("Corps de requête JSON invalide: {}", rejection.body_text()),
        );
        log_handler_error(operation, &e);
        e
    })
}

/// Logs a failed handler: client errors at warn, server errors at error.
pub(crate) fn log_handler_error(operation: &str, e: &Error) {
    if e.is_client_error() {
        tracing::warn!(operation = operation, error = %e, "Handler operation failed");
    } else {
        tracing::error!(operation = operation, error = %e, "Handler operation failed");
    }
}

pub(crate) async fn acquire_db_connection(
    state: &AppState,
    operation: &'static str,
) -> Result<sqlx::pool::PoolConnection<sqlx::Postgres>> {
    state.pool.acquire().await.map_err(|e| {
        tracing::error!(
            operation = operation,
            error_code = "DATABASE_ACQUISITION_FAILED",
            error = %e,
            "Failed to acquire database connection",
        );
        Error::Sqlx(e)
    })
}
