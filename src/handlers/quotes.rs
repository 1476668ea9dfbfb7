use axum::{
    Json,
    extract::{
        Multipart, Path, Query, State,
        multipart::MultipartRejection,
        rejection::JsonRejection,
    },
    http::StatusCode,
};

use crate::{
    error::Result,
    handlers::{acquire_db_connection, json_body, log_handler_error, multipart::read_form},
    models::{media::QUOTE_MAX_IMAGE_BYTES, pagination::ListQuery, quotes::UpdateQuoteStatusHttp},
    services::quotes::{self, PHOTO_FIELD},
    state::AppState,
};

/// POST /api/quotes
///
/// Public quote request form (`multipart/form-data`).
///
/// # Form Fields
/// - `firstName`, `lastName`, `country`, `phone`, `email`, `budget` (required)
/// - `services`: JSON array string or repeated fields, values among
///   `Esthétique`, `Dentaire`, `Cheveux`, `Mode` (at least one)
/// - `city`, `availableDates` (optional)
/// - `photo`: optional image up to 10 MB
pub async fn submit_quote(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<serde_json::Value>)> {
    let form = read_form(multipart, PHOTO_FIELD, QUOTE_MAX_IMAGE_BYTES)
        .await
        .inspect_err(|e| log_handler_error("submit_quote", e))?;

    let mut conn = acquire_db_connection(&state, "submit_quote").await?;

    let quote = quotes::submit_quote(&mut conn, state.media.as_ref(), &state.notifier, &form)
        .await
        .inspect_err(|e| log_handler_error("submit_quote", e))?;

    tracing::info!(quote_id = %quote.id, "Quote request recorded");

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "success": true,
            "message": "Demande de devis envoyée avec succès.",
            "quote": quote,
        })),
    ))
}

/// GET /api/quotes
///
/// # Query Parameters
/// - `search`: matches first name, last name, email, country or city
/// - `status`: `pending` | `contacted` | `treated` | `all`
/// - `page` (default 1), `limit` (default 10, max 100)
pub async fn list_quotes(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<serde_json::Value>> {
    let mut conn = acquire_db_connection(&state, "list_quotes").await?;

    let page = quotes::list_quotes(&mut conn, &query)
        .await
        .inspect_err(|e| log_handler_error("list_quotes", e))?;

    Ok(Json(serde_json::json!({
        "success": true,
        "quotes": page.items,
        "pagination": page.pagination,
    })))
}

/// GET /api/quotes/:id
pub async fn get_quote(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let mut conn = acquire_db_connection(&state, "get_quote").await?;

    let quote = quotes::get_quote(&mut conn, &id)
        .await
        .inspect_err(|e| log_handler_error("get_quote", e))?;

    Ok(Json(serde_json::json!({
        "success": true,
        "quote": quote,
    })))
}

/// PATCH /api/quotes/:id/status
///
/// # Request Body
/// - `status`: `pending` | `contacted` | `treated`
pub async fn update_quote_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<UpdateQuoteStatusHttp>, JsonRejection>,
) -> Result<Json<serde_json::Value>> {
    let request = json_body(payload, "update_quote_status")?;
    let mut conn = acquire_db_connection(&state, "update_quote_status").await?;

    let quote = quotes::update_status(&mut conn, &id, request)
        .await
        .inspect_err(|e| log_handler_error("update_quote_status", e))?;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Statut mis à jour avec succès",
        "quote": quote,
    })))
}

/// DELETE /api/quotes/:id
///
/// Deletes the request, then releases every attached photo.
pub async fn delete_quote(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let mut conn = acquire_db_connection(&state, "delete_quote").await?;

    quotes::delete_quote(&mut conn, state.media.as_ref(), &id)
        .await
        .inspect_err(|e| log_handler_error("delete_quote", e))?;

    tracing::info!(quote_id = %id, "Quote request deleted");

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Demande supprimée avec succès",
    })))
}
