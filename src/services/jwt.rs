use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::admins::AdminRole;

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - admin_id as string
    #[serde(default)]
    pub sub: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: Option<AdminRole>,
    /// Expiration time as Unix timestamp
    pub exp: i64,
    /// Issued at time as Unix timestamp
    pub iat: i64,
}

/// Identity carried by a verified token.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenIdentity {
    pub admin_id: Uuid,
    pub email: String,
    pub role: AdminRole,
}

/// Issued token and the instant it stops being accepted.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Generates a JWT access token for an administrator
///
/// # Arguments
/// * `admin_id` - The administrator's UUID
/// * `email` - The administrator's email, embedded in the claims
/// * `role` - The administrator's role
/// * `secret` - The JWT secret key for signing
/// * `expiration_days` - Token lifetime in days (from config)
///
/// # Example
/// ```rust,no_run
/// use glowup::models::admins::AdminRole;
/// use glowup::services::jwt::generate_jwt;
/// use uuid::Uuid;
///
/// let issued = generate_jwt(Uuid::now_v7(), "admin@example.com", AdminRole::Admin, "my-secret", 7)?;
/// # Ok::<(), glowup::error::Error>(())
/// ```
pub fn generate_jwt(
    admin_id: Uuid,
    email: &str,
    role: AdminRole,
    secret: &str,
    expiration_days: i64,
) -> Result<IssuedToken> {
    let now = Utc::now();
    let expires_at = now + Duration::days(expiration_days);

    let claims = Claims {
        sub: admin_id.to_string(),
        email: email.to_string(),
        role: Some(role),
        exp: expires_at.timestamp(),
        iat: now.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
    .map_err(|e| Error::Internal(format!("Failed to generate JWT: {}", e)))?;

    Ok(IssuedToken { token, expires_at })
}

/// Verifies a JWT token and returns the claims if valid
///
/// # Errors
/// * `Error::TokenExpired` when the signature is valid but `exp` has passed
/// * `Error::InvalidToken` for a bad signature or an undecodable token
pub fn verify_jwt(token: &str, secret: &str) -> Result<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => {
            Error::TokenExpired("Session expirée, veuillez vous reconnecter".to_string())
        }
        _ => Error::InvalidToken("Token invalide".to_string()),
    })?;

    Ok(token_data.claims)
}

/// Verifies a token and checks that its payload names an administrator.
pub fn identity_from_token(token: &str, secret: &str) -> Result<TokenIdentity> {
    let claims = verify_jwt(token, secret)?;

    if claims.sub.trim().is_empty() || claims.email.trim().is_empty() {
        return Err(Error::InvalidToken("Token invalide: données manquantes".to_string()));
    }

    let admin_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| Error::InvalidToken("Token invalide: identifiant incorrect".to_string()))?;

    Ok(TokenIdentity {
        admin_id,
        email: claims.email,
        role: claims.role.unwrap_or(AdminRole::Admin),
    })
}

/// Validates JWT from Authorization header and returns the identity
/// Format: "Authorization: Bearer <token>"
pub fn authenticate_jwt_token(auth_header: Option<&str>, secret: &str) -> Result<TokenIdentity> {
    let token = extract_token_from_header(auth_header)?;
    identity_from_token(token, secret)
}

/// Extracts the Bearer token from the Authorization header
fn extract_token_from_header(auth_header: Option<&str>) -> Result<&str> {
    match auth_header {
        Some(header) => {
            let token = header
                .strip_prefix("Bearer ")
                .ok_or_else(|| {
                    Error::InvalidToken(
                        "Format d'autorisation invalide. Attendu: 'Bearer <token>'".to_string(),
                    )
                })?
                .trim();
            if token.is_empty() {
                return Err(Error::InvalidToken("Token vide".to_string()));
            }
            Ok(token)
        }
        None => Err(Error::MissingToken("Accès non autorisé. Token manquant.".to_string())),
    }
}
