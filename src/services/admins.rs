use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use secrecy::ExposeSecret;
use uuid::Uuid;

use crate::DbConn;
use crate::{
    config::{JwtConfig, SeedAdminConfig},
    error::{Error, Result},
    models::admins::{
        Admin, AdminIdentity, AdminProfile, AdminRole, LoginAdmin, LoginResult, NewAdmin,
        SEED_ADMIN_NAME,
    },
    queries::admins,
    services::jwt::generate_jwt,
    validation::{FieldErrors, normalize_email, optional_string, validate_email, validate_password},
};

const INVALID_CREDENTIALS: &str = "Identifiants invalides";

/// Hashes a password with Argon2 on the blocking thread pool.
pub async fn hash_password(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| Error::Internal(format!("Failed to hash password: {}", e)))
    })
    .await
    .map_err(|e| Error::Internal(format!("Password hashing task failed: {}", e)))?
}

/// Verifies a password against a password hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| Error::Internal(format!("Invalid password hash: {}", e)))?;

    let argon2 = Argon2::default();

    match argon2.verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(Error::Internal(format!(
            "Password verification failed: {}",
            e
        ))),
    }
}

async fn verify_password_blocking(password: String, hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| Error::Internal(format!("Password verification task failed: {}", e)))?
}

/// Authenticates an administrator and issues a bearer token.
///
/// Unknown emails and wrong passwords produce the same error.
pub async fn login(conn: &mut DbConn, login: LoginAdmin, jwt: &JwtConfig) -> Result<LoginResult> {
    let mut errors = FieldErrors::new();
    let email = optional_string(login.email.as_deref());
    let password = login.password.filter(|p| !p.is_empty());
    if email.is_none() {
        errors.add("email", "Email et mot de passe requis");
    }
    if password.is_none() {
        errors.add("password", "Email et mot de passe requis");
    }
    errors.finish()?;

    let (Some(email), Some(password)) = (email, password) else {
        return Err(Error::validation("email", "Email et mot de passe requis"));
    };

    let admin = admins::get_admin_by_email(conn, &normalize_email(&email))
        .await?
        .ok_or_else(|| Error::Authentication(INVALID_CREDENTIALS.to_string()))?;

    if !verify_password_blocking(password, admin.password_hash.clone()).await? {
        return Err(Error::Authentication(INVALID_CREDENTIALS.to_string()));
    }

    let admin = admins::touch_last_login(conn, admin.id).await?;

    let issued = generate_jwt(
        admin.id,
        &admin.email,
        admin.role,
        jwt.secret.expose_secret(),
        jwt.expiration_days,
    )?;

    Ok(LoginResult {
        token: issued.token,
        expires_at: issued.expires_at,
        admin: AdminIdentity::from(&admin),
    })
}

/// Profile of the calling administrator.
pub async fn get_profile(conn: &mut DbConn, admin_id: Uuid) -> Result<AdminProfile> {
    let admin = admins::get_admin_by_id(conn, admin_id)
        .await?
        .ok_or_else(|| Error::NotFound("Administrateur non trouvé".to_string()))?;

    Ok(admin.into())
}

/// Identity of the calling administrator, for token verification.
pub async fn verify_identity(conn: &mut DbConn, admin_id: Uuid) -> Result<AdminIdentity> {
    let admin = admins::get_admin_by_id(conn, admin_id)
        .await?
        .ok_or_else(|| Error::NotFound("Administrateur non trouvé".to_string()))?;

    Ok(AdminIdentity::from(&admin))
}

/// Outcome of the startup seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Created,
    /// An existing administrator was raised to `superadmin`.
    Promoted,
    PasswordReset,
    Unchanged,
}

/// Ensures the configured administrator exists as `superadmin`.
///
/// An existing administrator with a lower role is promoted, and keeps its
/// password unless `force_password_reset` is set. The returned row reflects
/// every change made.
pub async fn ensure_seed_admin(conn: &mut DbConn, seed: &SeedAdminConfig) -> Result<(Admin, SeedOutcome)> {
    validate_email(&seed.email)?;
    validate_password(seed.password.expose_secret())?;
    let email = normalize_email(&seed.email);

    if let Some(mut admin) = admins::get_admin_by_email(conn, &email).await? {
        let mut outcome = SeedOutcome::Unchanged;

        if admin.role != AdminRole::Superadmin {
            admin = admins::update_admin_role(conn, admin.id, AdminRole::Superadmin).await?;
            outcome = SeedOutcome::Promoted;
        }

        if seed.force_password_reset {
            let password_hash = hash_password(seed.password.expose_secret().to_string()).await?;
            admin = admins::update_admin_password(conn, admin.id, &password_hash).await?;
            outcome = SeedOutcome::PasswordReset;
        }

        return Ok((admin, outcome));
    }

    let password_hash = hash_password(seed.password.expose_secret().to_string()).await?;
    let admin = admins::create_admin(
        conn,
        NewAdmin {
            email,
            password_hash,
            name: SEED_ADMIN_NAME.to_string(),
            role: AdminRole::Superadmin,
        },
    )
    .await?;

    Ok((admin, SeedOutcome::Created))
}
