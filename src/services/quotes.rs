use crate::DbConn;
use crate::{
    error::{Error, Result},
    models::{
        forms::FormData,
        media::{ImageUpload, QUOTE_MAX_IMAGE_BYTES, TransformProfile},
        pagination::{ListQuery, Page, PageRequest, filter_value},
        quotes::{
            NewQuoteRequest, PHONE_MAX_LEN, QuoteFilter, QuotePhoto, QuoteRequest, QuoteService,
            QuoteStatus, QuoteSubmission, TEXT_MAX_LEN, UpdateQuoteStatusHttp,
        },
    },
    queries::quotes,
    services::{
        media::{MediaStore, release_image},
        notifications::{Notification, NotificationQueue},
    },
    validation::{
        FieldErrors, normalize_email, optional_string, parse_resource_id, validate_email,
        validate_image, validate_max_length, validate_required_string,
    },
};

pub const PHOTO_FIELD: &str = "photo";
const NOT_FOUND: &str = "Demande non trouvée";
const SERVICES_MESSAGE: &str = "Services invalides (Esthétique, Dentaire, Cheveux, Mode)";

/// Raw service names: repeated `services` (or `services[]`) fields, or a
/// single field holding a JSON array.
fn raw_services(form: &FormData) -> Result<Vec<String>> {
    let mut values: Vec<String> = form
        .all("services")
        .iter()
        .chain(form.all("services[]"))
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect();

    if values.len() == 1 && values[0].starts_with('[') {
        let first = values.remove(0);
        values = serde_json::from_str::<Vec<String>>(&first)
            .map_err(|_| Error::validation("services", SERVICES_MESSAGE))?;
    }

    Ok(values)
}

/// Parses the requested services against the closed set.
pub fn parse_services(form: &FormData) -> Result<Vec<QuoteService>> {
    let raw = raw_services(form)?;
    if raw.is_empty() {
        return Err(Error::validation(
            "services",
            "Veuillez sélectionner au moins un service",
        ));
    }

    let mut services = Vec::with_capacity(raw.len());
    for name in raw {
        let service = name
            .trim()
            .parse::<QuoteService>()
            .map_err(|_| Error::validation("services", SERVICES_MESSAGE))?;
        if !services.contains(&service) {
            services.push(service);
        }
    }
    Ok(services)
}

fn required_text(
    errors: &mut FieldErrors,
    form: &FormData,
    field: &str,
    max: usize,
    message: &str,
) -> Option<String> {
    let value = errors.check(validate_required_string(form.text(field), field, message))?;
    errors.check(validate_max_length(
        &value,
        field,
        max,
        &format!("{} ne peut pas dépasser {} caractères", field, max),
    ))?;
    Some(value)
}

/// Validates a quote request form.
pub fn validate_submission(form: &FormData) -> Result<(QuoteSubmission, Option<ImageUpload>)> {
    let mut errors = FieldErrors::new();

    let first_name = required_text(
        &mut errors,
        form,
        "firstName",
        TEXT_MAX_LEN,
        "Le prénom est obligatoire",
    );
    let last_name = required_text(
        &mut errors,
        form,
        "lastName",
        TEXT_MAX_LEN,
        "Le nom est obligatoire",
    );
    let country = required_text(
        &mut errors,
        form,
        "country",
        TEXT_MAX_LEN,
        "Le pays est obligatoire",
    );
    let phone = required_text(
        &mut errors,
        form,
        "phone",
        PHONE_MAX_LEN,
        "Le numéro de téléphone est obligatoire",
    );
    let budget = required_text(
        &mut errors,
        form,
        "budget",
        TEXT_MAX_LEN,
        "Le budget est obligatoire",
    );

    let email = errors.check(
        validate_required_string(form.text("email"), "email", "L'email est obligatoire")
            .and_then(|value| validate_email(&value).map(|_| normalize_email(&value))),
    );

    let city = optional_string(form.text("city"));
    if let Some(city) = &city {
        errors.check(validate_max_length(
            city,
            "city",
            TEXT_MAX_LEN,
            "La ville ne peut pas dépasser 100 caractères",
        ));
    }

    let services = errors.check(parse_services(form));

    let photo = match form.file(PHOTO_FIELD) {
        Some(photo) => errors
            .check(validate_image(photo, PHOTO_FIELD, QUOTE_MAX_IMAGE_BYTES))
            .map(|_| photo.clone()),
        None => None,
    };

    errors.finish()?;

    match (first_name, last_name, country, phone, budget, email, services) {
        (
            Some(first_name),
            Some(last_name),
            Some(country),
            Some(phone),
            Some(budget),
            Some(email),
            Some(services),
        ) => Ok((
            QuoteSubmission {
                first_name,
                last_name,
                country,
                city,
                services,
                budget,
                available_dates: optional_string(form.text("availableDates")),
                phone,
                email,
            },
            photo,
        )),
        _ => Err(Error::Internal(
            "Quote validation passed without required values".to_string(),
        )),
    }
}

/// Records a quote request and queues the acknowledgement email.
pub async fn submit_quote(
    conn: &mut DbConn,
    media: &dyn MediaStore,
    notifier: &NotificationQueue,
    form: &FormData,
) -> Result<QuoteRequest> {
    let (submission, photo) = validate_submission(form)?;

    let mut photos = Vec::new();
    if let Some(photo) = &photo {
        let stored = media.upload(photo, TransformProfile::QUOTE).await?;
        photos.push(QuotePhoto {
            url: stored.url,
            storage_id: stored.storage_id,
        });
    }

    let new_quote = NewQuoteRequest {
        first_name: submission.first_name,
        last_name: submission.last_name,
        country: submission.country,
        city: submission.city,
        services: submission.services,
        photos: photos.clone(),
        budget: submission.budget,
        available_dates: submission.available_dates,
        phone: submission.phone,
        email: submission.email,
    };

    let quote = match quotes::create_quote_request(conn, new_quote).await {
        Ok(quote) => quote,
        Err(e) => {
            for photo in &photos {
                release_image(media, &photo.storage_id).await;
            }
            return Err(e);
        }
    };

    notifier.enqueue(Notification::QuoteAcknowledgement {
        to: quote.email.clone(),
        first_name: quote.first_name.clone(),
        last_name: quote.last_name.clone(),
    });

    Ok(quote)
}

pub fn parse_list_query(query: &ListQuery) -> Result<(QuoteFilter, PageRequest)> {
    let mut errors = FieldErrors::new();

    let page = errors.check(query.page_request());

    let status = match filter_value(query.status.as_deref()) {
        Some(raw) => errors.check(parse_status(raw)),
        None => None,
    };

    errors.finish()?;

    Ok((
        QuoteFilter {
            search: query.search(),
            status,
        },
        page.unwrap_or_default(),
    ))
}

fn parse_status(raw: &str) -> Result<QuoteStatus> {
    raw.trim()
        .parse::<QuoteStatus>()
        .map_err(|_| Error::validation("status", "Statut invalide (pending, contacted, treated)"))
}

pub async fn list_quotes(conn: &mut DbConn, query: &ListQuery) -> Result<Page<QuoteRequest>> {
    let (filter, page) = parse_list_query(query)?;
    quotes::list_quote_requests(conn, &filter, page).await
}

pub async fn get_quote(conn: &mut DbConn, raw_id: &str) -> Result<QuoteRequest> {
    let id = parse_resource_id(raw_id, NOT_FOUND)?;
    quotes::get_quote_request_by_id(conn, id)
        .await?
        .ok_or_else(|| Error::NotFound(NOT_FOUND.to_string()))
}

pub async fn update_status(conn: &mut DbConn, raw_id: &str, body: UpdateQuoteStatusHttp) -> Result<QuoteRequest> {
    let id = parse_resource_id(raw_id, NOT_FOUND)?;
    let raw = validate_required_string(body.status.as_deref(), "status", "Le statut est obligatoire")?;
    let status = parse_status(&raw)?;
    quotes::update_quote_status(conn, id, status).await
}

/// Deletes a quote request and releases every attached photo.
pub async fn delete_quote(conn: &mut DbConn, media: &dyn MediaStore, raw_id: &str) -> Result<()> {
    let quote = get_quote(conn, raw_id).await?;

    if quotes::delete_quote_request(conn, quote.id).await? == 0 {
        return Err(Error::NotFound(NOT_FOUND.to_string()));
    }

    for photo in quote.photos.iter() {
        release_image(media, &photo.storage_id).await;
    }
    Ok(())
}
