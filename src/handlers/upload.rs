use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartRejection, rejection::JsonRejection},
};
use serde::Deserialize;

use crate::{
    error::{Error, Result},
    handlers::{json_body, log_handler_error, multipart::read_form},
    models::media::{DEFAULT_MAX_IMAGE_BYTES, TransformProfile},
    state::AppState,
    validation::{validate_image, validate_required_string},
};

pub const FILE_FIELD: &str = "file";

#[derive(Debug, Default, Deserialize)]
pub struct DeleteImageRequest {
    #[serde(default, rename = "publicId", alias = "public_id")]
    pub public_id: Option<String>,
}

/// POST /api/upload
///
/// Standalone image upload (`multipart/form-data`, field `file`).
///
/// # Returns
/// `{success, message, data: {url, publicId, format, bytes, width, height}}`
pub async fn upload_image(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<serde_json::Value>> {
    let form = read_form(multipart, FILE_FIELD, DEFAULT_MAX_IMAGE_BYTES)
        .await
        .inspect_err(|e| log_handler_error("upload_image", e))?;

    let image = form
        .file(FILE_FIELD)
        .ok_or_else(|| Error::validation(FILE_FIELD, "Aucun fichier fourni"))
        .and_then(|image| validate_image(image, FILE_FIELD, DEFAULT_MAX_IMAGE_BYTES).map(|_| image))
        .inspect_err(|e| log_handler_error("upload_image", e))?;

    let stored = state
        .media
        .upload(image, TransformProfile::UPLOAD)
        .await
        .inspect_err(|e| log_handler_error("upload_image", e))?;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Upload réussi",
        "data": {
            "url": stored.url,
            "publicId": stored.storage_id,
            "format": stored.format,
            "bytes": stored.bytes,
            "width": stored.width,
            "height": stored.height,
        },
    })))
}

/// DELETE /api/upload
///
/// # Request Body
/// - `publicId` (or `public_id`): storage id of the image
///
/// # HTTP Status Codes
/// - `200 OK`: Image deleted
/// - `400 BAD_REQUEST`: Id missing or body not JSON
/// - `404 NOT_FOUND`: The provider does not know the id
pub async fn delete_image(
    State(state): State<AppState>,
    payload: std::result::Result<Json<DeleteImageRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>> {
    let request = json_body(payload, "delete_image")?;
    let public_id = validate_required_string(
        request.public_id.as_deref(),
        "publicId",
        "ID public requis",
    )
    .inspect_err(|e| log_handler_error("delete_image", e))?;

    let deleted = state
        .media
        .delete(&public_id)
        .await
        .inspect_err(|e| log_handler_error("delete_image", e))?;

    if !deleted {
        let e = Error::NotFound("Image non trouvée".to_string());
        log_handler_error("delete_image", &e);
        return Err(e);
    }

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Image supprimée avec succès",
    })))
}
