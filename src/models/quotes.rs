use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use strum_macros::{Display, EnumIter, EnumString};
use uuid::Uuid;

pub const TEXT_MAX_LEN: usize = 100;
pub const PHONE_MAX_LEN: usize = 50;

/// Services a quote can be requested for. Closed set.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum QuoteService {
    #[serde(rename = "Esthétique")]
    #[strum(serialize = "Esthétique")]
    Esthetique,
    Dentaire,
    Cheveux,
    Mode,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum QuoteStatus {
    #[default]
    Pending,
    Contacted,
    Treated,
}

impl TryFrom<String> for QuoteStatus {
    type Error = strum::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Image attached to a quote request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotePhoto {
    pub url: String,
    pub storage_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub country: String,
    pub city: Option<String>,
    pub services: Vec<String>,
    pub photos: Json<Vec<QuotePhoto>>,
    pub budget: String,
    pub available_dates: Option<String>,
    pub phone: String,
    pub email: String,
    #[sqlx(try_from = "String")]
    pub status: QuoteStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewQuoteRequest {
    pub first_name: String,
    pub last_name: String,
    pub country: String,
    pub city: Option<String>,
    pub services: Vec<QuoteService>,
    pub photos: Vec<QuotePhoto>,
    pub budget: String,
    pub available_dates: Option<String>,
    pub phone: String,
    pub email: String,
}

/// Validated quote form.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteSubmission {
    pub first_name: String,
    pub last_name: String,
    pub country: String,
    pub city: Option<String>,
    pub services: Vec<QuoteService>,
    pub budget: String,
    pub available_dates: Option<String>,
    pub phone: String,
    pub email: String,
}

#[derive(Debug, Clone, Default)]
pub struct QuoteFilter {
    pub search: Option<String>,
    pub status: Option<QuoteStatus>,
}

/// HTTP body of `PATCH /quotes/:id/status`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateQuoteStatusHttp {
    #[serde(default)]
    pub status: Option<String>,
}
