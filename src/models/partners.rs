use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const NAME_MAX_LEN: usize = 100;
pub const SPECIALTY_MAX_LEN: usize = 100;
pub const PHONE_MAX_LEN: usize = 50;
pub const ADDRESS_MAX_LEN: usize = 200;
pub const DESCRIPTION_MAX_LEN: usize = 2000;
pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;
pub const DEFAULT_RATING: i32 = 5;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SocialMedia {
    pub facebook: Option<String>,
    pub instagram: Option<String>,
    pub twitter: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Partner {
    pub id: Uuid,
    pub name: String,
    pub specialty: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub photo_url: Option<String>,
    pub storage_id: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    #[sqlx(flatten)]
    pub social_media: SocialMedia,
    pub is_active: bool,
    pub rating: i32,
    pub services: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPartner {
    pub name: String,
    pub specialty: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub photo_url: Option<String>,
    pub storage_id: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub social_media: SocialMedia,
    pub is_active: bool,
    pub rating: i32,
    pub services: Vec<String>,
}

/// Validated partner creation form.
#[derive(Debug, Clone, PartialEq)]
pub struct PartnerSubmission {
    pub name: String,
    pub specialty: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub social_media: SocialMedia,
    pub is_active: bool,
    pub rating: i32,
    pub services: Vec<String>,
}

/// Validated partial update. `None` leaves the column untouched; for
/// optional columns `Some(None)` clears the value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartnerChanges {
    pub name: Option<String>,
    pub specialty: Option<String>,
    pub phone: Option<Option<String>>,
    pub address: Option<Option<String>>,
    pub description: Option<Option<String>>,
    pub website: Option<Option<String>>,
    pub facebook: Option<Option<String>>,
    pub instagram: Option<Option<String>>,
    pub twitter: Option<Option<String>>,
    pub is_active: Option<bool>,
    pub rating: Option<i32>,
    pub services: Option<Vec<String>>,
}

impl PartnerChanges {
    /// Applies the changes on top of an existing partner.
    pub fn apply(self, partner: &mut Partner) {
        if let Some(name) = self.name {
            partner.name = name;
        }
        if let Some(specialty) = self.specialty {
            partner.specialty = specialty;
        }
        if let Some(phone) = self.phone {
            partner.phone = phone;
        }
        if let Some(address) = self.address {
            partner.address = address;
        }
        if let Some(description) = self.description {
            partner.description = description;
        }
        if let Some(website) = self.website {
            partner.website = website;
        }
        if let Some(facebook) = self.facebook {
            partner.social_media.facebook = facebook;
        }
        if let Some(instagram) = self.instagram {
            partner.social_media.instagram = instagram;
        }
        if let Some(twitter) = self.twitter {
            partner.social_media.twitter = twitter;
        }
        if let Some(is_active) = self.is_active {
            partner.is_active = is_active;
        }
        if let Some(rating) = self.rating {
            partner.rating = rating;
        }
        if let Some(services) = self.services {
            partner.services = services;
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PartnerFilter {
    pub search: Option<String>,
    pub specialty: Option<String>,
    pub is_active: Option<bool>,
}

/// Splits the comma-separated services tag input.
pub fn split_services(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
