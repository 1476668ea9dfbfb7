//! Bearer-token gate for the administration routes.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use secrecy::ExposeSecret;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    error::Result,
    models::admins::AdminRole,
    services::jwt::{TokenIdentity, authenticate_jwt_token},
    state::AppState,
};

/// Administrator extracted from a verified JWT
///
/// This struct is added to request extensions by the JWT middleware.
#[derive(Debug, Clone, Serialize)]
pub struct AuthenticatedAdmin {
    pub id: Uuid,
    pub email: String,
    pub role: AdminRole,
}

impl From<TokenIdentity> for AuthenticatedAdmin {
    fn from(identity: TokenIdentity) -> Self {
        Self {
            id: identity.admin_id,
            email: identity.email,
            role: identity.role,
        }
    }
}

/// JWT authentication middleware
///
/// # Behavior
/// 1. Reads `Authorization: Bearer <token>`
/// 2. Validates the signature, expiry and payload
/// 3. Adds `AuthenticatedAdmin` to request extensions
///
/// Every rejection is a 401: `MISSING_TOKEN` without a header,
/// `TOKEN_EXPIRED` for an expired token, `INVALID_TOKEN` otherwise.
///
/// # Usage
/// ```ignore
/// Router::new()
///     .route("/protected", get(protected_handler))
///     .route_layer(middleware::from_fn_with_state(
///         state.clone(),
///         jwt_auth_middleware,
///     ))
/// ```
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let auth_header = headers.get(AUTHORIZATION).and_then(|h| h.to_str().ok());

    let identity = authenticate_jwt_token(auth_header, state.jwt.secret.expose_secret())
        .inspect_err(|e| {
            tracing::debug!(path = %request.uri().path(), error = %e, "Rejected bearer token");
        })?;

    request
        .extensions_mut()
        .insert(AuthenticatedAdmin::from(identity));
    Ok(next.run(request).await)
}
