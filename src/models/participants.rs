use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use uuid::Uuid;

pub const NAME_MAX_LEN: usize = 50;
pub const CITY_MAX_LEN: usize = 100;
pub const DESCRIPTION_MAX_LEN: usize = 1000;
pub const NOTES_MAX_LEN: usize = 500;
pub const MIN_AGE: i32 = 16;
pub const MAX_AGE: i32 = 80;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ParticipantStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl TryFrom<String> for ParticipantStatus {
    type Error = strum::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub age: Option<i32>,
    pub city: Option<String>,
    pub description: Option<String>,
    pub image_url: String,
    pub storage_id: String,
    pub selected: bool,
    #[sqlx(try_from = "String")]
    pub status: ParticipantStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewParticipant {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub age: Option<i32>,
    pub city: Option<String>,
    pub description: Option<String>,
    pub image_url: String,
    pub storage_id: String,
}

/// Normalized participation form, produced by validation before any
/// side effect happens.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticipantSubmission {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub age: Option<i32>,
    pub city: Option<String>,
    pub description: Option<String>,
}

/// Projection returned to the public submitter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantReceipt {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl From<&Participant> for ParticipantReceipt {
    fn from(participant: &Participant) -> Self {
        Self {
            id: participant.id,
            first_name: participant.first_name.clone(),
            last_name: participant.last_name.clone(),
            email: participant.email.clone(),
        }
    }
}

/// Filter for `selected` in admin listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum SelectionFilter {
    Selected,
    Unselected,
}

#[derive(Debug, Clone, Default)]
pub struct ParticipantFilter {
    pub search: Option<String>,
    pub status: Option<ParticipantStatus>,
    pub selected: Option<bool>,
}

/// HTTP body of `PATCH /participants/:id/status`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateParticipantStatusHttp {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Validated status update. `notes: Some(None)` clears the notes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateParticipantStatus {
    pub status: Option<ParticipantStatus>,
    pub notes: Option<Option<String>>,
}
