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
    models::{
        media::DEFAULT_MAX_IMAGE_BYTES,
        pagination::ListQuery,
        participants::{ParticipantReceipt, UpdateParticipantStatusHttp},
    },
    services::participants::{self, PHOTO_FIELD},
    state::AppState,
};

/// POST /api/participants
///
/// Public participation form (`multipart/form-data`).
///
/// # Form Fields
/// - `firstName`, `lastName`, `email`, `phone` (required)
/// - `age` (16-80), `city`, `description` (optional)
/// - `photo`: JPEG/PNG/WEBP image up to 5 MB (required)
///
/// # HTTP Status Codes
/// - `201 CREATED`: Participation recorded
/// - `400 BAD_REQUEST`: Invalid form, every failing field is listed
/// - `409 CONFLICT`: Email already registered
/// - `500 INTERNAL_SERVER_ERROR`: Image upload or database failure
pub async fn submit_participation(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<serde_json::Value>)> {
    let form = read_form(multipart, PHOTO_FIELD, DEFAULT_MAX_IMAGE_BYTES)
        .await
        .inspect_err(|e| log_handler_error("submit_participation", e))?;

    let mut conn = acquire_db_connection(&state, "submit_participation").await?;

    let participant = participants::submit_participation(
        &mut conn,
        state.media.as_ref(),
        &state.notifier,
        &form,
    )
    .await
    .inspect_err(|e| log_handler_error("submit_participation", e))?;

    tracing::info!(participant_id = %participant.id, "Participation recorded");

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "success": true,
            "message": "Participation enregistrée avec succès! Un email de confirmation vous a été envoyé.",
            "participant": ParticipantReceipt::from(&participant),
        })),
    ))
}

/// GET /api/participants
///
/// # Query Parameters
/// - `search`: matches first name, last name, email or city
/// - `status`: `pending` | `approved` | `rejected` | `all`
/// - `selected`: `selected` | `unselected` | `all`
/// - `page` (default 1), `limit` (default 10, max 100)
pub async fn list_participants(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<serde_json::Value>> {
    let mut conn = acquire_db_connection(&state, "list_participants").await?;

    let page = participants::list_participants(&mut conn, &query)
        .await
        .inspect_err(|e| log_handler_error("list_participants", e))?;

    Ok(Json(serde_json::json!({
        "success": true,
        "participants": page.items,
        "pagination": page.pagination,
    })))
}

/// GET /api/participants/:id
pub async fn get_participant(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let mut conn = acquire_db_connection(&state, "get_participant").await?;

    let participant = participants::get_participant(&mut conn, &id)
        .await
        .inspect_err(|e| log_handler_error("get_participant", e))?;

    Ok(Json(serde_json::json!({
        "success": true,
        "participant": participant,
    })))
}

/// DELETE /api/participants/:id
///
/// Deletes the record, then releases its photo from storage.
pub async fn delete_participant(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let mut conn = acquire_db_connection(&state, "delete_participant").await?;

    participants::delete_participant(&mut conn, state.media.as_ref(), &id)
        .await
        .inspect_err(|e| log_handler_error("delete_participant", e))?;

    tracing::info!(participant_id = %id, "Participant deleted");

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Participant supprimé avec succès",
    })))
}

/// PATCH /api/participants/:id/select
pub async fn toggle_participant_selection(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let mut conn = acquire_db_connection(&state, "toggle_participant_selection").await?;

    let participant = participants::toggle_selected(&mut conn, &id)
        .await
        .inspect_err(|e| log_handler_error("toggle_participant_selection", e))?;

    let message = if participant.selected {
        "Participant sélectionné"
    } else {
        "Participant désélectionné"
    };

    Ok(Json(serde_json::json!({
        "success": true,
        "message": message,
        "participant": participant,
    })))
}

/// PATCH /api/participants/:id/status
///
/// # Request Body
/// - `status`: `pending` | `approved` | `rejected` (optional)
/// - `notes`: up to 500 characters, empty string clears (optional)
pub async fn update_participant_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<UpdateParticipantStatusHttp>, JsonRejection>,
) -> Result<Json<serde_json::Value>> {
    let request = json_body(payload, "update_participant_status")?;
    let mut conn = acquire_db_connection(&state, "update_participant_status").await?;

    let participant = participants::update_status(&mut conn, &id, request)
        .await
        .inspect_err(|e| log_handler_error("update_participant_status", e))?;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Statut mis à jour avec succès",
        "participant": participant,
    })))
}
