use axum::{
    Json,
    extract::{Multipart, Path, Query, State, multipart::MultipartRejection},
    http::StatusCode,
};

use crate::{
    error::Result,
    handlers::{acquire_db_connection, log_handler_error, multipart::read_form},
    models::{media::DEFAULT_MAX_IMAGE_BYTES, pagination::ListQuery},
    services::partners::{self, PHOTO_FIELD},
    state::AppState,
};

/// GET /api/partners
///
/// Public listing.
///
/// # Query Parameters
/// - `search`: matches name, specialty or description
/// - `specialty`: case-insensitive substring, `all` disables the filter
/// - `active`: `true` | `false`
/// - `page` (default 1), `limit` (default 10, max 100)
pub async fn list_partners(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<serde_json::Value>> {
    let mut conn = acquire_db_connection(&state, "list_partners").await?;

    let page = partners::list_partners(&mut conn, &query)
        .await
        .inspect_err(|e| log_handler_error("list_partners", e))?;

    Ok(Json(serde_json::json!({
        "success": true,
        "count": page.items.len(),
        "partners": page.items,
        "pagination": page.pagination,
    })))
}

/// GET /api/partners/:id
pub async fn get_partner(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let mut conn = acquire_db_connection(&state, "get_partner").await?;

    let partner = partners::get_partner(&mut conn, &id)
        .await
        .inspect_err(|e| log_handler_error("get_partner", e))?;

    Ok(Json(serde_json::json!({
        "success": true,
        "partner": partner,
    })))
}

/// POST /api/partners
///
/// # Form Fields
/// - `name`, `specialty` (required)
/// - `phone`, `address`, `description`, `website`, `facebook`, `instagram`,
///   `twitter`, `isActive`, `rating` (1-5), `services` (comma separated)
/// - `photo`: optional image up to 5 MB
pub async fn create_partner(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<serde_json::Value>)> {
    let form = read_form(multipart, PHOTO_FIELD, DEFAULT_MAX_IMAGE_BYTES)
        .await
        .inspect_err(|e| log_handler_error("create_partner", e))?;

    let mut conn = acquire_db_connection(&state, "create_partner").await?;

    let partner = partners::create_partner(&mut conn, state.media.as_ref(), &form)
        .await
        .inspect_err(|e| log_handler_error("create_partner", e))?;

    tracing::info!(partner_id = %partner.id, "Partner created");

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "success": true,
            "message": "Partenaire créé avec succès",
            "partner": partner,
        })),
    ))
}

/// PUT /api/partners/:id
///
/// Partial update: only the fields present in the form change. A new
/// `photo` replaces the previous one.
pub async fn update_partner(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<serde_json::Value>> {
    let form = read_form(multipart, PHOTO_FIELD, DEFAULT_MAX_IMAGE_BYTES)
        .await
        .inspect_err(|e| log_handler_error("update_partner", e))?;

    let mut conn = acquire_db_connection(&state, "update_partner").await?;

    let partner = partners::update_partner(&mut conn, state.media.as_ref(), &id, &form)
        .await
        .inspect_err(|e| log_handler_error("update_partner", e))?;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Partenaire mis à jour avec succès",
        "partner": partner,
    })))
}

/// DELETE /api/partners/:id
pub async fn delete_partner(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let mut conn = acquire_db_connection(&state, "delete_partner").await?;

    partners::delete_partner(&mut conn, state.media.as_ref(), &id)
        .await
        .inspect_err(|e| log_handler_error("delete_partner", e))?;

    tracing::info!(partner_id = %id, "Partner deleted");

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Partenaire supprimé avec succès",
    })))
}
