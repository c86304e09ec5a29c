use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::error::StoreError;
use crate::image;

/// A persisted event, exactly as the store holds it.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub location: String,
    pub date: DateTime<Utc>,
    pub max_participants: i32,
    pub current_participants: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_type: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// An uploaded file: raw bytes plus whatever MIME type the client declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

/// Typed create input. Text fields are trimmed before validation, see
/// [`NewEvent::normalized`].
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct NewEvent {
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    #[validate(length(min = 1, message = "location is required"))]
    pub location: String,
    pub date: DateTime<Utc>,
    #[validate(range(min = 1, message = "maxParticipants must be at least 1"))]
    pub max_participants: i32,
    #[validate(range(min = 0, message = "currentParticipants must not be negative"))]
    pub current_participants: i32,
    pub image: Option<Upload>,
}

impl NewEvent {
    /// Trims text fields and checks every constraint. Stores call this before
    /// writing anything.
    pub fn normalized(mut self) -> Result<Self, StoreError> {
        self.title = self.title.trim().to_string();
        self.description = self.description.trim().to_string();
        self.location = self.location.trim().to_string();

        self.validate()
            .map_err(|errors| StoreError::validation(errors.to_string()))?;

        Ok(self)
    }

    pub fn into_event(self, id: Uuid, created_at: DateTime<Utc>) -> Event {
        let (image, image_type) = match self.image {
            Some(upload) => (Some(upload.bytes), upload.content_type),
            None => (None, None),
        };

        Event {
            id,
            title: self.title,
            description: self.description,
            location: self.location,
            date: self.date,
            max_participants: self.max_participants,
            current_participants: self.current_participants,
            image,
            image_type,
            created_at,
        }
    }
}

/// Raw multipart input before type coercion. Every text field is optional here;
/// [`EventForm::into_new_event`] decides what is missing.
#[derive(Debug, Clone, Default)]
pub struct EventForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub date: Option<String>,
    pub max_participants: Option<String>,
    pub current_participants: Option<String>,
    pub image: Option<Upload>,
}

impl EventForm {
    /// Records a text part. Unknown names are ignored, the way a strict schema
    /// drops fields it does not declare.
    pub fn set_text(&mut self, name: &str, value: String) {
        let slot = match name {
            "title" => &mut self.title,
            "description" => &mut self.description,
            "location" => &mut self.location,
            "date" => &mut self.date,
            "maxParticipants" => &mut self.max_participants,
            "currentParticipants" => &mut self.current_participants,
            _ => return,
        };
        *slot = Some(value);
    }

    pub fn into_new_event(self) -> Result<NewEvent, StoreError> {
        let date = match self.date.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => parse_date(raw)?,
            _ => return Err(StoreError::validation("date is required")),
        };

        let max_participants = match self.max_participants.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => parse_count("maxParticipants", raw)?,
            _ => return Err(StoreError::validation("maxParticipants is required")),
        };

        let current_participants = match self.current_participants.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => parse_count("currentParticipants", raw)?,
            _ => 0,
        };

        Ok(NewEvent {
            title: self.title.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            location: self.location.unwrap_or_default(),
            date,
            max_participants,
            current_participants,
            image: self.image,
        })
    }
}

/// Accepts RFC 3339, a naive `YYYY-MM-DDTHH:MM[:SS]` taken as UTC, or a bare date
/// at midnight UTC.
fn parse_date(raw: &str) -> Result<DateTime<Utc>, StoreError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| StoreError::validation(format!("date is not a valid date: {raw}")))
}

fn parse_count(field: &str, raw: &str) -> Result<i32, StoreError> {
    raw.parse::<i32>()
        .map_err(|_| StoreError::validation(format!("{field} must be an integer, got {raw:?}")))
}

/// Read-side shape of an event: the stored image replaced by a data URI, or an
/// explicit `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventView {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub location: String,
    pub date: DateTime<Utc>,
    pub max_participants: i32,
    pub current_participants: i32,
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_type: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl EventView {
    /// List rendering: no image unless the MIME type was stored.
    pub fn listed(event: Event) -> Self {
        let image = image::embed_if_typed(event.image.as_deref(), event.image_type.as_deref());
        Self::with_image(event, image)
    }

    /// Detail rendering: a missing MIME type falls back to `image/jpeg`.
    pub fn detailed(event: Event) -> Self {
        let image = image::embed_or_default(event.image.as_deref(), event.image_type.as_deref());
        Self::with_image(event, image)
    }

    fn with_image(event: Event, image: Option<String>) -> Self {
        EventView {
            id: event.id,
            title: event.title,
            description: event.description,
            location: event.location,
            date: event.date,
            max_participants: event.max_participants,
            current_participants: event.current_participants,
            image,
            image_type: event.image_type,
            created_at: event.created_at,
        }
    }
}
