//! Input validation utilities for the service layer.
//!
//! Validators return `Error::Validation` for a single field; `FieldErrors`
//! gathers the failures of a whole form so the client sees every problem
//! at once instead of one per round trip.

use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use uuid::Uuid;

use crate::error::{Error, Result, ValidationErrors};
use crate::models::media::{ALLOWED_IMAGE_TYPES, ImageUpload};

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\w+([.+-]?\w+)*@\w+([.-]?\w+)*(\.\w{2,})+$").expect("email pattern is valid")
});

/// Accumulates per-field validation failures for one request.
#[derive(Debug, Default)]
pub struct FieldErrors {
    fields: IndexMap<String, String>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a failure; the first message reported for a field wins.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields.entry(field.into()).or_insert_with(|| message.into());
    }

    /// Absorbs the outcome of a validator, returning the value on success.
    pub fn check<T>(&mut self, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(Error::Validation(errors)) => {
                for (field, message) in errors.fields() {
                    self.add(field, message);
                }
                None
            }
            Err(other) => {
                self.add("form", other.to_string());
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fails with every recorded field if any validator failed.
    pub fn finish(self) -> Result<()> {
        if self.fields.is_empty() {
            return Ok(());
        }
        if self.fields.len() == 1 {
            if let Some((field, message)) = self.fields.first() {
                return Err(Error::Validation(ValidationErrors::Single {
                    field: field.clone(),
                    message: message.clone(),
                }));
            }
        }
        Err(Error::Validation(ValidationErrors::Multiple {
            fields: self.fields,
        }))
    }
}

/// Lowercases and trims an email address for storage and lookups.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validates email format
///
/// # Arguments
/// * `email` - The email address to validate (already trimmed or not)
///
/// # Returns
/// * `Ok(())` if the email is valid
/// * `Err(Error)` with descriptive message if invalid
///
/// # Examples
/// ```
/// use glowup::validation::validate_email;
///
/// validate_email("user@example.com").unwrap(); // Valid
/// assert!(validate_email("invalid-email").is_err()); // Returns Error
/// ```
pub fn validate_email(email: &str) -> Result<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(Error::validation("email", "L'email est obligatoire"));
    }

    if email.len() > 254 {
        return Err(Error::validation("email", "L'email est trop long (254 caractères maximum)"));
    }

    if !EMAIL_PATTERN.is_match(email) {
        return Err(Error::validation("email", "Email invalide"));
    }

    Ok(())
}

/// Validates password strength for administrator accounts
pub fn validate_password(password: &str) -> Result<()> {
    if password.len() < 8 {
        return Err(Error::validation(
            "password",
            "Password must be at least 8 characters long",
        ));
    }

    if password.len() > 128 {
        return Err(Error::validation("password", "Password is too long (max 128 characters)"));
    }

    if password.contains(' ') {
        return Err(Error::validation("password", "Password cannot contain spaces"));
    }

    Ok(())
}

/// Sanitizes string input by trimming whitespace
pub fn sanitize_string(input: &str) -> String {
    input.trim().to_string()
}

/// Trims an optional input, mapping blank values to `None`.
pub fn optional_string(input: Option<&str>) -> Option<String> {
    input
        .map(sanitize_string)
        .filter(|value| !value.is_empty())
}

/// Validates that a string is present and not empty after sanitization
///
/// # Arguments
/// * `input` - The raw input, if the client sent the field at all
/// * `field` - Name of the field as the client knows it
/// * `message` - Message reported when the field is missing
pub fn validate_required_string(input: Option<&str>, field: &str, message: &str) -> Result<String> {
    match optional_string(input) {
        Some(value) => Ok(value),
        None => Err(Error::validation(field, message)),
    }
}

/// Validates the character length of a value.
pub fn validate_max_length(value: &str, field: &str, max: usize, message: &str) -> Result<()> {
    if value.chars().count() > max {
        return Err(Error::validation(field, message));
    }
    Ok(())
}

/// Parses an optional integer field and checks it against inclusive bounds.
pub fn parse_bounded_int(
    input: Option<&str>,
    field: &str,
    min: i32,
    max: i32,
    message: &str,
) -> Result<Option<i32>> {
    let Some(raw) = optional_string(input) else {
        return Ok(None);
    };

    let value: i32 = raw
        .parse()
        .map_err(|_| Error::validation(field, format!("{} doit être un nombre entier", field)))?;

    if value < min || value > max {
        return Err(Error::validation(field, message));
    }

    Ok(Some(value))
}

/// Parses a boolean form field (`true`/`false`, `1`/`0`, `on`/`off`).
pub fn parse_bool(input: &str, field: &str) -> Result<bool> {
    match input.trim().to_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Ok(true),
        "false" | "0" | "off" | "no" => Ok(false),
        _ => Err(Error::validation(field, format!("{} doit être un booléen", field))),
    }
}

/// Checks an uploaded image's MIME type and size.
pub fn validate_image(image: &ImageUpload, field: &str, max_bytes: usize) -> Result<()> {
    let content_type = image.content_type.trim().to_lowercase();
    if !ALLOWED_IMAGE_TYPES.contains(&content_type.as_str()) {
        return Err(Error::validation(
            field,
            "Seules les images JPEG, PNG et WEBP sont autorisées",
        ));
    }

    if image.bytes.is_empty() {
        return Err(Error::validation(field, "L'image est vide"));
    }

    if image.bytes.len() > max_bytes {
        return Err(Error::validation(
            field,
            format!(
                "L'image ne peut pas dépasser {} Mo",
                max_bytes / (1024 * 1024)
            ),
        ));
    }

    Ok(())
}

/// Requires an image field and checks it.
pub fn validate_required_image(
    image: Option<&ImageUpload>,
    field: &str,
    max_bytes: usize,
) -> Result<ImageUpload> {
    let image = image.ok_or_else(|| Error::validation(field, "L'image est obligatoire"))?;
    validate_image(image, field, max_bytes)?;
    Ok(image.clone())
}

/// Parses a path id. A malformed id cannot resolve to a record, so it is
/// reported as not found rather than as a validation failure.
pub fn parse_resource_id(raw: &str, not_found_message: &str) -> Result<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| Error::NotFound(not_found_message.to_string()))
}
