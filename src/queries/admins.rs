use uuid::Uuid;

use crate::{
    DbConn,
    error::{Error, Result},
    models::admins::{Admin, AdminRole, NewAdmin},
    queries::is_unique_violation,
};

const ADMIN_COLUMNS: &str =
    "id, email, password_hash, name, role, last_login_at, created_at, updated_at";

/// Creates a new administrator.
pub async fn create_admin(conn: &mut DbConn, new_admin: NewAdmin) -> Result<Admin> {
    let admin = sqlx::query_as::<_, Admin>(&format!(
        r#"
        INSERT INTO admins (id, email, password_hash, name, role)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {ADMIN_COLUMNS}
        "#
    ))
    .bind(Uuid::now_v7())
    .bind(&new_admin.email)
    .bind(&new_admin.password_hash)
    .bind(&new_admin.name)
    .bind(new_admin.role.to_string())
    .fetch_one(conn)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            Error::Conflict(format!("Admin {} already exists", new_admin.email))
        } else {
            Error::Sqlx(e)
        }
    })?;

    Ok(admin)
}

/// Gets an administrator by id. The admin may not exist.
pub async fn get_admin_by_id(conn: &mut DbConn, id: Uuid) -> Result<Option<Admin>> {
    let admin = sqlx::query_as::<_, Admin>(&format!(
        "SELECT {ADMIN_COLUMNS} FROM admins WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await?;

    Ok(admin)
}

/// Gets an administrator by normalized email. The admin may not exist.
pub async fn get_admin_by_email(conn: &mut DbConn, email: &str) -> Result<Option<Admin>> {
    let admin = sqlx::query_as::<_, Admin>(&format!(
        "SELECT {ADMIN_COLUMNS} FROM admins WHERE email = $1"
    ))
    .bind(email)
    .fetch_optional(conn)
    .await?;

    Ok(admin)
}

/// Replaces an administrator's password hash and returns the refreshed row.
pub async fn update_admin_password(conn: &mut DbConn, id: Uuid, password_hash: &str) -> Result<Admin> {
    let admin = sqlx::query_as::<_, Admin>(&format!(
        r#"
        UPDATE admins
        SET password_hash = $1, updated_at = now()
        WHERE id = $2
        RETURNING {ADMIN_COLUMNS}
        "#
    ))
    .bind(password_hash)
    .bind(id)
    .fetch_optional(conn)
    .await?
    .ok_or_else(|| Error::NotFound(format!("Admin with ID {} not found", id)))?;

    Ok(admin)
}

/// Changes an administrator's role and returns the refreshed row.
pub async fn update_admin_role(conn: &mut DbConn, id: Uuid, role: AdminRole) -> Result<Admin> {
    let admin = sqlx::query_as::<_, Admin>(&format!(
        r#"
        UPDATE admins
        SET role = $1, updated_at = now()
        WHERE id = $2
        RETURNING {ADMIN_COLUMNS}
        "#
    ))
    .bind(role.to_string())
    .bind(id)
    .fetch_optional(conn)
    .await?
    .ok_or_else(|| Error::NotFound(format!("Admin with ID {} not found", id)))?;

    Ok(admin)
}

/// Stamps the last successful login and returns the refreshed row.
pub async fn touch_last_login(conn: &mut DbConn, id: Uuid) -> Result<Admin> {
    let admin = sqlx::query_as::<_, Admin>(&format!(
        r#"
        UPDATE admins
        SET last_login_at = now(), updated_at = now()
        WHERE id = $1
        RETURNING {ADMIN_COLUMNS}
        "#
    ))
    .bind(id)
    .fetch_optional(conn)
    .await?
    .ok_or_else(|| Error::NotFound(format!("Admin with ID {} not found", id)))?;

    Ok(admin)
}
