use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
};

use crate::{
    error::Result,
    handlers::{acquire_db_connection, json_body, log_handler_error},
    middleware::auth::AuthenticatedAdmin,
    models::admins::LoginAdmin,
    services::admins,
    state::AppState,
};

/// POST /api/auth/login
///
/// Authenticates an administrator with email and password.
///
/// # Request Body
/// - `email`: Administrator email (case-insensitive)
/// - `password`: Administrator password
///
/// # Returns
/// `{success, message, token, expiresAt, admin: {id, email, name, role}}`
///
/// # HTTP Status Codes
/// - `200 OK`: Authentication successful
/// - `400 BAD_REQUEST`: Email or password missing, or body not JSON
/// - `401 UNAUTHORIZED`: Unknown email or wrong password (same message)
pub async fn login(
    State(state): State<AppState>,
    payload: std::result::Result<Json<LoginAdmin>, JsonRejection>,
) -> Result<Json<serde_json::Value>> {
    let request = json_body(payload, "login")?;
    let mut conn = acquire_db_connection(&state, "login").await?;

    let login_result = admins::login(&mut conn, request, &state.jwt)
        .await
        .inspect_err(|e| log_handler_error("login", e))?;

    tracing::info!(admin_id = %login_result.admin.id, "Administrator logged in");

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Connexion réussie",
        "token": login_result.token,
        "expiresAt": login_result.expires_at,
        "admin": login_result.admin,
    })))
}

/// GET /api/auth/profile
///
/// Returns the caller's administrator profile (no password hash).
pub async fn profile(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthenticatedAdmin>,
) -> Result<Json<serde_json::Value>> {
    let mut conn = acquire_db_connection(&state, "profile").await?;

    let profile = admins::get_profile(&mut conn, admin.id)
        .await
        .inspect_err(|e| log_handler_error("profile", e))?;

    Ok(Json(serde_json::json!({
        "success": true,
        "admin": profile,
    })))
}

/// GET /api/auth/verify
///
/// Confirms the token is valid and returns the caller's identity.
pub async fn verify(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthenticatedAdmin>,
) -> Result<Json<serde_json::Value>> {
    let mut conn = acquire_db_connection(&state, "verify").await?;

    let identity = admins::verify_identity(&mut conn, admin.id)
        .await
        .inspect_err(|e| log_handler_error("verify", e))?;

    Ok(Json(serde_json::json!({
        "success": true,
        "admin": identity,
    })))
}
