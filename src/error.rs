use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Import Axum types for HTTP response conversion
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Structured validation errors with field-level error mapping
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValidationErrors {
    Single { field: String, message: String },
    Multiple { fields: IndexMap<String, String> },
}

impl ValidationErrors {
    /// Shorthand for a single failing field.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationErrors::Single {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Field name to message pairs, in the order they were reported.
    pub fn fields(&self) -> IndexMap<String, String> {
        match self {
            ValidationErrors::Single { field, message } => {
                let mut fields = IndexMap::new();
                fields.insert(field.clone(), message.clone());
                fields
            }
            ValidationErrors::Multiple { fields } => fields.clone(),
        }
    }

    /// Human-readable per-field messages, e.g. `"email: Invalid email"`.
    pub fn messages(&self) -> Vec<String> {
        self.fields()
            .into_iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect()
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.messages().join(", "))
    }
}

/// The custom error type for the application.
#[derive(Debug, Error)]
pub enum Error {
    /// An error originating from the sqlx library.
    #[error("SQLx error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// A migration failure at startup.
    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// A validation error with field-level details.
    #[error("Validation error: {0}")]
    Validation(ValidationErrors),

    /// A not found error (resource does not exist or the id is malformed).
    #[error("Not found: {0}")]
    NotFound(String),

    /// A conflict error (unique constraint violation).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// An authentication error (invalid credentials).
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// No bearer credential was supplied.
    #[error("Missing token: {0}")]
    MissingToken(String),

    /// The bearer credential is malformed or its signature does not verify.
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// The bearer credential was valid but has expired.
    #[error("Token expired: {0}")]
    TokenExpired(String),

    /// The object-storage provider rejected or failed an operation.
    #[error("Upload error: {0}")]
    Upload(String),

    /// The mail provider rejected or failed a send.
    #[error("Mail error: {0}")]
    Mail(String),

    /// An internal server error.
    #[error("Internal error: {0}")]
    Internal(String),

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

/// A type alias for `Result<T, Error>` to simplify function signatures.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Builds a single-field validation error.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Validation(ValidationErrors::single(field, message))
    }

    /// Whether the error was caused by the client rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::Validation(_)
                | Error::NotFound(_)
                | Error::Conflict(_)
                | Error::Authentication(_)
                | Error::MissingToken(_)
                | Error::InvalidToken(_)
                | Error::TokenExpired(_)
        )
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Conflict(_) => StatusCode::CONFLICT,
            Error::Authentication(_)
            | Error::MissingToken(_)
            | Error::InvalidToken(_)
            | Error::TokenExpired(_) => StatusCode::UNAUTHORIZED,
            Error::Upload(_)
            | Error::Mail(_)
            | Error::Sqlx(_)
            | Error::Migrate(_)
            | Error::Internal(_)
            | Error::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Convert custom Error to HTTP response
///
/// Every body follows the `{success: false, message, code}` envelope;
/// validation failures also carry `errors` (one message per field) and
/// `fields` (field name to message). Internal details are never exposed.
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match self {
            Error::Validation(errors) => {
                serde_json::json!({
                    "success": false,
                    "message": "Données invalides",
                    "code": "VALIDATION_ERROR",
                    "errors": errors.messages(),
                    "fields": errors.fields(),
                })
            }
            Error::NotFound(msg) => {
                serde_json::json!({
                    "success": false,
                    "message": msg,
                    "code": "NOT_FOUND"
                })
            }
            Error::Conflict(msg) => {
                serde_json::json!({
                    "success": false,
                    "message": msg,
                    "code": "CONFLICT"
                })
            }
            Error::Authentication(msg) => {
                serde_json::json!({
                    "success": false,
                    "message": msg,
                    "code": "AUTHENTICATION_FAILED"
                })
            }
            Error::MissingToken(msg) => {
                serde_json::json!({
                    "success": false,
                    "message": msg,
                    "code": "MISSING_TOKEN"
                })
            }
            Error::InvalidToken(msg) => {
                serde_json::json!({
                    "success": false,
                    "message": msg,
                    "code": "INVALID_TOKEN"
                })
            }
            Error::TokenExpired(msg) => {
                serde_json::json!({
                    "success": false,
                    "message": msg,
                    "code": "TOKEN_EXPIRED"
                })
            }
            Error::Upload(_) => {
                serde_json::json!({
                    "success": false,
                    "message": "Erreur lors de l'upload de l'image",
                    "code": "UPLOAD_ERROR"
                })
            }
            Error::Mail(_) => {
                serde_json::json!({
                    "success": false,
                    "message": "Erreur lors de l'envoi de l'email",
                    "code": "MAIL_ERROR"
                })
            }
            Error::Sqlx(_) | Error::Migrate(_) | Error::Internal(_) => {
                serde_json::json!({
                    "success": false,
                    "message": "Erreur serveur",
                    "code": "INTERNAL_ERROR"
                })
            }
            Error::Config(_) => {
                serde_json::json!({
                    "success": false,
                    "message": "Configuration error",
                    "code": "CONFIG_ERROR"
                })
            }
        };

        (status, Json(body)).into_response()
    }
}
