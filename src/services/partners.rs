use crate::DbConn;
use crate::{
    error::{Error, Result},
    models::{
        forms::FormData,
        media::{DEFAULT_MAX_IMAGE_BYTES, ImageUpload, TransformProfile},
        pagination::{ListQuery, Page, PageRequest, filter_value},
        partners::{
            ADDRESS_MAX_LEN, DEFAULT_RATING, DESCRIPTION_MAX_LEN, MAX_RATING, MIN_RATING,
            NAME_MAX_LEN, NewPartner, PHONE_MAX_LEN, Partner, PartnerChanges, PartnerFilter,
            PartnerSubmission, SPECIALTY_MAX_LEN, SocialMedia, split_services,
        },
    },
    queries::partners,
    services::media::{MediaStore, release_image},
    validation::{
        FieldErrors, optional_string, parse_bool, parse_bounded_int, parse_resource_id,
        validate_image, validate_max_length, validate_required_string,
    },
};

pub const PHOTO_FIELD: &str = "photo";
const NOT_FOUND: &str = "Partenaire non trouvé";
const RATING_MESSAGE: &str = "La note doit être comprise entre 1 et 5";
const PHONE_MESSAGE: &str = "Le numéro de téléphone ne peut pas dépasser 50 caractères";

fn check_length(errors: &mut FieldErrors, value: Option<&str>, field: &str, max: usize, message: &str) {
    if let Some(value) = value {
        errors.check(validate_max_length(value, field, max, message));
    }
}

fn optional_photo(errors: &mut FieldErrors, form: &FormData) -> Option<ImageUpload> {
    let photo = form.file(PHOTO_FIELD)?;
    errors
        .check(validate_image(photo, PHOTO_FIELD, DEFAULT_MAX_IMAGE_BYTES))
        .map(|_| photo.clone())
}

/// Validates a partner creation form.
pub fn validate_creation(form: &FormData) -> Result<(PartnerSubmission, Option<ImageUpload>)> {
    let mut errors = FieldErrors::new();

    let name = errors.check(validate_required_string(
        form.text("name"),
        "name",
        "Le nom est obligatoire",
    ));
    check_length(
        &mut errors,
        name.as_deref(),
        "name",
        NAME_MAX_LEN,
        "Le nom ne peut pas dépasser 100 caractères",
    );

    let specialty = errors.check(validate_required_string(
        form.text("specialty"),
        "specialty",
        "La spécialité est obligatoire",
    ));
    check_length(
        &mut errors,
        specialty.as_deref(),
        "specialty",
        SPECIALTY_MAX_LEN,
        "La spécialité ne peut pas dépasser 100 caractères",
    );

    let phone = optional_string(form.text("phone"));
    check_length(&mut errors, phone.as_deref(), "phone", PHONE_MAX_LEN, PHONE_MESSAGE);

    let address = optional_string(form.text("address"));
    check_length(
        &mut errors,
        address.as_deref(),
        "address",
        ADDRESS_MAX_LEN,
        "L'adresse ne peut pas dépasser 200 caractères",
    );

    let description = optional_string(form.text("description"));
    check_length(
        &mut errors,
        description.as_deref(),
        "description",
        DESCRIPTION_MAX_LEN,
        "La description ne peut pas dépasser 2000 caractères",
    );

    let is_active = match optional_string(form.text("isActive")) {
        Some(raw) => errors.check(parse_bool(&raw, "isActive")).unwrap_or(true),
        None => true,
    };

    let rating = errors
        .check(parse_bounded_int(
            form.text("rating"),
            "rating",
            MIN_RATING,
            MAX_RATING,
            RATING_MESSAGE,
        ))
        .flatten()
        .unwrap_or(DEFAULT_RATING);

    let photo = optional_photo(&mut errors, form);

    errors.finish()?;

    let (Some(name), Some(specialty)) = (name, specialty) else {
        return Err(Error::Internal(
            "Partner validation passed without required values".to_string(),
        ));
    };

    Ok((
        PartnerSubmission {
            name,
            specialty,
            phone,
            address,
            description,
            website: optional_string(form.text("website")),
            social_media: SocialMedia {
                facebook: optional_string(form.text("facebook")),
                instagram: optional_string(form.text("instagram")),
                twitter: optional_string(form.text("twitter")),
            },
            is_active,
            rating,
            services: form.text("services").map(split_services).unwrap_or_default(),
        },
        photo,
    ))
}

/// Validates a partial update: only fields present in the form change.
pub fn validate_changes(form: &FormData) -> Result<(PartnerChanges, Option<ImageUpload>)> {
    let mut errors = FieldErrors::new();
    let mut changes = PartnerChanges::default();

    // An empty name or specialty keeps the current value.
    changes.name = optional_string(form.text("name"));
    check_length(
        &mut errors,
        changes.name.as_deref(),
        "name",
        NAME_MAX_LEN,
        "Le nom ne peut pas dépasser 100 caractères",
    );

    changes.specialty = optional_string(form.text("specialty"));
    check_length(
        &mut errors,
        changes.specialty.as_deref(),
        "specialty",
        SPECIALTY_MAX_LEN,
        "La spécialité ne peut pas dépasser 100 caractères",
    );

    let clearable = |name: &str| form.has(name).then(|| optional_string(form.text(name)));

    changes.phone = clearable("phone");
    check_length(
        &mut errors,
        changes.phone.clone().flatten().as_deref(),
        "phone",
        PHONE_MAX_LEN,
        PHONE_MESSAGE,
    );
    changes.address = clearable("address");
    check_length(
        &mut errors,
        changes.address.clone().flatten().as_deref(),
        "address",
        ADDRESS_MAX_LEN,
        "L'adresse ne peut pas dépasser 200 caractères",
    );
    changes.description = clearable("description");
    check_length(
        &mut errors,
        changes.description.clone().flatten().as_deref(),
        "description",
        DESCRIPTION_MAX_LEN,
        "La description ne peut pas dépasser 2000 caractères",
    );
    changes.website = clearable("website");
    changes.facebook = clearable("facebook");
    changes.instagram = clearable("instagram");
    changes.twitter = clearable("twitter");

    if form.has("services") {
        changes.services = Some(form.text("services").map(split_services).unwrap_or_default());
    }

    if let Some(raw) = optional_string(form.text("isActive")) {
        changes.is_active = errors.check(parse_bool(&raw, "isActive"));
    }

    changes.rating = errors
        .check(parse_bounded_int(
            form.text("rating"),
            "rating",
            MIN_RATING,
            MAX_RATING,
            RATING_MESSAGE,
        ))
        .flatten();

    let photo = optional_photo(&mut errors, form);

    errors.finish()?;

    Ok((changes, photo))
}

/// Parses the public listing query.
pub fn parse_list_query(query: &ListQuery) -> Result<(PartnerFilter, PageRequest)> {
    let mut errors = FieldErrors::new();

    let page = errors.check(query.page_request());

    let is_active = match optional_string(query.active.as_deref()) {
        Some(raw) => errors.check(parse_bool(&raw, "active")),
        None => None,
    };

    errors.finish()?;

    Ok((
        PartnerFilter {
            search: query.search(),
            specialty: filter_value(query.specialty.as_deref()).map(str::to_string),
            is_active,
        },
        page.unwrap_or_default(),
    ))
}

pub async fn list_partners(conn: &mut DbConn, query: &ListQuery) -> Result<Page<Partner>> {
    let (filter, page) = parse_list_query(query)?;
    partners::list_partners(conn, &filter, page).await
}

pub async fn get_partner(conn: &mut DbConn, raw_id: &str) -> Result<Partner> {
    let id = parse_resource_id(raw_id, NOT_FOUND)?;
    partners::get_partner_by_id(conn, id)
        .await?
        .ok_or_else(|| Error::NotFound(NOT_FOUND.to_string()))
}

/// Creates a partner, uploading its photo first when one is attached.
pub async fn create_partner(conn: &mut DbConn, media: &dyn MediaStore, form: &FormData) -> Result<Partner> {
    let (submission, photo) = validate_creation(form)?;

    let stored = match &photo {
        Some(photo) => Some(media.upload(photo, TransformProfile::PARTNER).await?),
        None => None,
    };

    let new_partner = NewPartner {
        name: submission.name,
        specialty: submission.specialty,
        phone: submission.phone,
        address: submission.address,
        photo_url: stored.as_ref().map(|s| s.url.clone()),
        storage_id: stored.as_ref().map(|s| s.storage_id.clone()),
        description: submission.description,
        website: submission.website,
        social_media: submission.social_media,
        is_active: submission.is_active,
        rating: submission.rating,
        services: submission.services,
    };

    match partners::create_partner(conn, new_partner).await {
        Ok(partner) => Ok(partner),
        Err(e) => {
            if let Some(stored) = &stored {
                release_image(media, &stored.storage_id).await;
            }
            Err(e)
        }
    }
}

/// Applies a partial update. A new photo is uploaded before the record is
/// written; the previous photo is released only once the write succeeded.
pub async fn update_partner(
    conn: &mut DbConn,
    media: &dyn MediaStore,
    raw_id: &str,
    form: &FormData,
) -> Result<Partner> {
    let mut partner = get_partner(conn, raw_id).await?;
    let (changes, photo) = validate_changes(form)?;

    let previous_storage_id = partner.storage_id.clone();
    let stored = match &photo {
        Some(photo) => Some(media.upload(photo, TransformProfile::PARTNER).await?),
        None => None,
    };

    changes.apply(&mut partner);
    if let Some(stored) = &stored {
        partner.photo_url = Some(stored.url.clone());
        partner.storage_id = Some(stored.storage_id.clone());
    }

    let updated = match partners::update_partner(conn, &partner).await {
        Ok(updated) => updated,
        Err(e) => {
            if let Some(stored) = &stored {
                release_image(media, &stored.storage_id).await;
            }
            return Err(e);
        }
    };

    if stored.is_some() {
        if let Some(previous) = previous_storage_id {
            release_image(media, &previous).await;
        }
    }

    Ok(updated)
}

/// Deletes a partner and releases its photo, if any.
pub async fn delete_partner(conn: &mut DbConn, media: &dyn MediaStore, raw_id: &str) -> Result<()> {
    let partner = get_partner(conn, raw_id).await?;

    if partners::delete_partner(conn, partner.id).await? == 0 {
        return Err(Error::NotFound(NOT_FOUND.to_string()));
    }

    if let Some(storage_id) = &partner.storage_id {
        release_image(media, storage_id).await;
    }
    Ok(())
}
