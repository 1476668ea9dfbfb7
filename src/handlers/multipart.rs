//! Decoding of `multipart/form-data` bodies into [`FormData`].

use axum::{
    extract::multipart::{Multipart, MultipartError, MultipartRejection},
    http::StatusCode,
};

use crate::{
    error::{Error, Result},
    models::{forms::FormData, media::ImageUpload},
};

fn read_error(e: MultipartError, file_field: &str, max_bytes: usize) -> Error {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return Error::validation(
            file_field,
            format!("L'image ne peut pas dépasser {} Mo", max_bytes / (1024 * 1024)),
        );
    }
    Error::validation("form", format!("Formulaire invalide: {}", e.body_text()))
}

/// A form carries at most one file, under the expected field name.
fn check_file_part(form: &FormData, name: &str, file_field: &str) -> Result<()> {
    if name != file_field {
        return Err(Error::validation(
            file_field,
            format!("Champ de fichier inattendu: {}", name),
        ));
    }
    if form.file(file_field).is_some() {
        return Err(Error::validation(file_field, "Une seule image est autorisée"));
    }
    Ok(())
}

/// Reads every part of the body. Parts carrying a file name (or named like
/// the expected file field) are kept as files, the rest as text.
pub async fn read_form(
    multipart: std::result::Result<Multipart, MultipartRejection>,
    file_field: &str,
    max_bytes: usize,
) -> Result<FormData> {
    let mut multipart = multipart.map_err(|e| {
        Error::validation(
            "form",
            format!("Le formulaire doit être envoyé en multipart/form-data ({})", e.body_text()),
        )
    })?;

    let mut form = FormData::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| read_error(e, file_field, max_bytes))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if field.file_name().is_some() || name == file_field {
            let file_name = field.file_name().map(str::to_string);
            let content_type = field
                .content_type()
                .map(str::to_string)
                .unwrap_or_default();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| read_error(e, file_field, max_bytes))?;

            // Browsers send an empty part for an untouched file input.
            if bytes.is_empty() && file_name.as_deref().is_none_or(str::is_empty) {
                continue;
            }

            check_file_part(&form, &name, file_field)?;
            form.insert_file(
                name,
                ImageUpload {
                    bytes,
                    content_type,
                    file_name,
                },
            );
        } else {
            let text = field
                .text()
                .await
                .map_err(|e| read_error(e, file_field, max_bytes))?;
            form.push_text(name, text);
        }
    }

    Ok(form)
}
