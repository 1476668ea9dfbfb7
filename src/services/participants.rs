use crate::DbConn;
use crate::{
    error::{Error, Result},
    models::{
        forms::FormData,
        media::{DEFAULT_MAX_IMAGE_BYTES, ImageUpload, TransformProfile},
        pagination::{ListQuery, Page, PageRequest, filter_value},
        participants::{
            CITY_MAX_LEN, DESCRIPTION_MAX_LEN, MAX_AGE, MIN_AGE, NAME_MAX_LEN, NOTES_MAX_LEN,
            NewParticipant, Participant, ParticipantFilter, ParticipantStatus,
            ParticipantSubmission, SelectionFilter, UpdateParticipantStatus,
            UpdateParticipantStatusHttp,
        },
    },
    queries::participants::{self, DUPLICATE_EMAIL_MESSAGE},
    services::{
        mail::ParticipantSummary,
        media::{MediaStore, release_image},
        notifications::{Notification, NotificationQueue},
    },
    validation::{
        FieldErrors, normalize_email, optional_string, parse_bounded_int, parse_resource_id,
        validate_email, validate_max_length, validate_required_image, validate_required_string,
    },
};

pub const PHOTO_FIELD: &str = "photo";
const PHONE_MAX_LEN: usize = 50;
const NOT_FOUND: &str = "Participant non trouvé";

/// Validates a participation form, reporting every failing field at once.
pub fn validate_submission(form: &FormData) -> Result<(ParticipantSubmission, ImageUpload)> {
    let mut errors = FieldErrors::new();

    let first_name = errors.check(
        validate_required_string(form.text("firstName"), "firstName", "Le prénom est obligatoire")
            .and_then(|value| {
                validate_max_length(
                    &value,
                    "firstName",
                    NAME_MAX_LEN,
                    "Le prénom ne peut pas dépasser 50 caractères",
                )
                .map(|_| value)
            }),
    );

    let last_name = errors.check(
        validate_required_string(form.text("lastName"), "lastName", "Le nom est obligatoire")
            .and_then(|value| {
                validate_max_length(
                    &value,
                    "lastName",
                    NAME_MAX_LEN,
                    "Le nom ne peut pas dépasser 50 caractères",
                )
                .map(|_| value)
            }),
    );

    let email = errors.check(
        validate_required_string(form.text("email"), "email", "L'email est obligatoire")
            .and_then(|value| validate_email(&value).map(|_| normalize_email(&value))),
    );

    let phone = errors.check(
        validate_required_string(
            form.text("phone"),
            "phone",
            "Le numéro de téléphone est obligatoire",
        )
        .and_then(|value| {
            validate_max_length(
                &value,
                "phone",
                PHONE_MAX_LEN,
                "Le numéro de téléphone ne peut pas dépasser 50 caractères",
            )
            .map(|_| value)
        }),
    );

    let age = errors
        .check(parse_bounded_int(
            form.text("age"),
            "age",
            MIN_AGE,
            MAX_AGE,
            "L'âge doit être compris entre 16 et 80 ans",
        ))
        .flatten();

    let city = optional_string(form.text("city"));
    if let Some(city) = &city {
        errors.check(validate_max_length(
            city,
            "city",
            CITY_MAX_LEN,
            "La ville ne peut pas dépasser 100 caractères",
        ));
    }

    let description = optional_string(form.text("description"));
    if let Some(description) = &description {
        errors.check(validate_max_length(
            description,
            "description",
            DESCRIPTION_MAX_LEN,
            "La description ne peut pas dépasser 1000 caractères",
        ));
    }

    let photo = errors.check(validate_required_image(
        form.file(PHOTO_FIELD),
        PHOTO_FIELD,
        DEFAULT_MAX_IMAGE_BYTES,
    ));

    errors.finish()?;

    match (first_name, last_name, email, phone, photo) {
        (Some(first_name), Some(last_name), Some(email), Some(phone), Some(photo)) => Ok((
            ParticipantSubmission {
                first_name,
                last_name,
                email,
                phone,
                age,
                city,
                description,
            },
            photo,
        )),
        _ => Err(Error::Internal(
            "Participant validation passed without required values".to_string(),
        )),
    }
}

/// Registers a participation: validate, reject duplicates, upload the
/// photo, insert the record, then queue the confirmation and admin alert.
pub async fn submit_participation(
    conn: &mut DbConn,
    media: &dyn MediaStore,
    notifier: &NotificationQueue,
    form: &FormData,
) -> Result<Participant> {
    let (submission, photo) = validate_submission(form)?;

    if participants::get_participant_by_email(conn, &submission.email)
        .await?
        .is_some()
    {
        return Err(Error::Conflict(DUPLICATE_EMAIL_MESSAGE.to_string()));
    }

    let stored = media.upload(&photo, TransformProfile::PARTICIPANT).await?;

    let new_participant = NewParticipant {
        first_name: submission.first_name,
        last_name: submission.last_name,
        email: submission.email,
        phone: submission.phone,
        age: submission.age,
        city: submission.city,
        description: submission.description,
        image_url: stored.url,
        storage_id: stored.storage_id.clone(),
    };

    let participant = match participants::create_participant(conn, new_participant).await {
        Ok(participant) => participant,
        Err(e) => {
            release_image(media, &stored.storage_id).await;
            return Err(e);
        }
    };

    notifier.enqueue(Notification::ParticipationConfirmation {
        to: participant.email.clone(),
        first_name: participant.first_name.clone(),
        last_name: participant.last_name.clone(),
    });
    notifier.enqueue(Notification::NewParticipation(ParticipantSummary {
        first_name: participant.first_name.clone(),
        last_name: participant.last_name.clone(),
        email: participant.email.clone(),
        phone: Some(participant.phone.clone()),
        submitted_at: participant.created_at,
    }));

    Ok(participant)
}

/// Parses the listing query into a filter and a page request.
pub fn parse_list_query(query: &ListQuery) -> Result<(ParticipantFilter, PageRequest)> {
    let mut errors = FieldErrors::new();

    let page = errors.check(query.page_request());

    let status = match filter_value(query.status.as_deref()) {
        Some(raw) => errors.check(raw.parse::<ParticipantStatus>().map_err(|_| {
            Error::validation("status", "Statut invalide (pending, approved, rejected)")
        })),
        None => None,
    };

    let selected = match filter_value(query.selected.as_deref()) {
        Some(raw) => errors
            .check(raw.parse::<SelectionFilter>().map_err(|_| {
                Error::validation("selected", "Filtre de sélection invalide (selected, unselected, all)")
            }))
            .map(|filter| filter == SelectionFilter::Selected),
        None => None,
    };

    errors.finish()?;

    Ok((
        ParticipantFilter {
            search: query.search(),
            status,
            selected,
        },
        page.unwrap_or_default(),
    ))
}

pub async fn list_participants(conn: &mut DbConn, query: &ListQuery) -> Result<Page<Participant>> {
    let (filter, page) = parse_list_query(query)?;
    participants::list_participants(conn, &filter, page).await
}

pub async fn get_participant(conn: &mut DbConn, raw_id: &str) -> Result<Participant> {
    let id = parse_resource_id(raw_id, NOT_FOUND)?;
    participants::get_participant_by_id(conn, id)
        .await?
        .ok_or_else(|| Error::NotFound(NOT_FOUND.to_string()))
}

/// Flips the `selected` flag.
pub async fn toggle_selected(conn: &mut DbConn, raw_id: &str) -> Result<Participant> {
    let mut participant = get_participant(conn, raw_id).await?;
    participant.selected = !participant.selected;
    participants::update_participant_review(conn, &participant).await
}

/// Validates a status/notes body. An empty `notes` clears the notes.
pub fn validate_status_update(body: UpdateParticipantStatusHttp) -> Result<UpdateParticipantStatus> {
    let mut errors = FieldErrors::new();

    let status = match optional_string(body.status.as_deref()) {
        Some(raw) => errors.check(raw.parse::<ParticipantStatus>().map_err(|_| {
            Error::validation("status", "Statut invalide (pending, approved, rejected)")
        })),
        None => None,
    };

    let notes = match body.notes {
        Some(raw) => {
            let notes = optional_string(Some(&raw));
            if let Some(notes) = &notes {
                errors.check(validate_max_length(
                    notes,
                    "notes",
                    NOTES_MAX_LEN,
                    "Les notes ne peuvent pas dépasser 500 caractères",
                ));
            }
            Some(notes)
        }
        None => None,
    };

    errors.finish()?;

    Ok(UpdateParticipantStatus { status, notes })
}

/// Sets the review status and/or notes.
pub async fn update_status(
    conn: &mut DbConn,
    raw_id: &str,
    body: UpdateParticipantStatusHttp,
) -> Result<Participant> {
    let id = parse_resource_id(raw_id, NOT_FOUND)?;
    let update = validate_status_update(body)?;

    let mut participant = participants::get_participant_by_id(conn, id)
        .await?
        .ok_or_else(|| Error::NotFound(NOT_FOUND.to_string()))?;

    if let Some(status) = update.status {
        participant.status = status;
    }
    if let Some(notes) = update.notes {
        participant.notes = notes;
    }

    participants::update_participant_review(conn, &participant).await
}

/// Deletes a participant and releases its photo.
pub async fn delete_participant(conn: &mut DbConn, media: &dyn MediaStore, raw_id: &str) -> Result<()> {
    let participant = get_participant(conn, raw_id).await?;

    if participants::delete_participant(conn, participant.id).await? == 0 {
        return Err(Error::NotFound(NOT_FOUND.to_string()));
    }

    release_image(media, &participant.storage_id).await;
    Ok(())
}
