//! Volunteer record schema and the normalization step shared by every
//! ingestion point (remote responses, cache reads, seed data, local
//! fallback records).
//!
//! The wire format follows the directory service:
//!
//! ```json
//! {
//!   "_id": "665f1c…",
//!   "uniqueId": 1001,
//!   "name": "Asha",
//!   "aakNo": "AAK0001",
//!   "mobileNo": "9876543000",
//!   "address": "Pune, Maharashtra",
//!   "imageUrl": "https://…",
//!   "joinDate": "2025-12-03T10:11:51.000Z",
//!   "createdAt": "2025-12-03T10:11:51.000Z"
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::DirectoryError;

/// Base URL of the placeholder avatar service.
const AVATAR_BASE_URL: &str = "https://ui-avatars.com/api/";

/// Prefix for ids minted on the client when the remote create fails.
pub const LOCAL_ID_PREFIX: &str = "local_";

/// A volunteer as held in memory and in the cache.
///
/// Always has a non-empty `id`; construct through [`RawVolunteer::normalize`]
/// or [`VolunteerRecord::normalized`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawVolunteer")]
pub struct VolunteerRecord {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "uniqueId")]
    pub sequence_number: i64,
    pub name: String,
    #[serde(rename = "aakNo")]
    pub membership_code: String,
    #[serde(rename = "mobileNo")]
    pub mobile_number: String,
    pub address: String,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    #[serde(rename = "joinDate", skip_serializing_if = "Option::is_none")]
    pub join_date: Option<DateTime<Utc>>,
    #[serde(rename = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Lenient wire shape. Every field is optional; ids, ordinals and phone
/// numbers may arrive as strings or numbers, timestamps as RFC 3339 strings
/// or epoch milliseconds.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawVolunteer {
    #[serde(rename = "_id")]
    pub object_id: Option<Value>,
    pub id: Option<Value>,
    pub unique_id: Option<Value>,
    pub name: Option<String>,
    pub aak_no: Option<String>,
    pub mobile_no: Option<Value>,
    pub address: Option<String>,
    pub image_url: Option<String>,
    pub join_date: Option<Value>,
    pub created_at: Option<Value>,
}

#[derive(Debug, thiserror::Error)]
#[error("volunteer record has no id")]
pub struct MissingId;

impl RawVolunteer {
    /// Convert to a [`VolunteerRecord`]. Returns `None` when no usable id is
    /// present (`_id` takes precedence over `id`).
    pub fn normalize(self) -> Option<VolunteerRecord> {
        let id = self
            .object_id
            .as_ref()
            .and_then(lenient_string)
            .filter(|id| !id.trim().is_empty())
            .or_else(|| self.id.as_ref().and_then(lenient_string))?;

        let join_date = self.join_date.as_ref().and_then(lenient_timestamp);
        let created_at = self
            .created_at
            .as_ref()
            .and_then(lenient_timestamp)
            .or(join_date);

        VolunteerRecord {
            id,
            sequence_number: self
                .unique_id
                .as_ref()
                .and_then(lenient_integer)
                .unwrap_or(0),
            name: self.name.unwrap_or_default(),
            membership_code: self.aak_no.unwrap_or_default(),
            mobile_number: self
                .mobile_no
                .as_ref()
                .and_then(lenient_string)
                .unwrap_or_default(),
            address: self.address.unwrap_or_default(),
            image_url: self.image_url.unwrap_or_default(),
            join_date,
            created_at,
        }
        .normalized()
    }
}

impl TryFrom<RawVolunteer> for VolunteerRecord {
    type Error = MissingId;

    fn try_from(raw: RawVolunteer) -> Result<Self, Self::Error> {
        raw.normalize().ok_or(MissingId)
    }
}

/// Normalize a batch, dropping (and logging) records without an id.
pub fn normalize_all(raw: Vec<RawVolunteer>) -> Vec<VolunteerRecord> {
    let total = raw.len();
    let records: Vec<VolunteerRecord> = raw
        .into_iter()
        .filter_map(RawVolunteer::normalize)
        .collect();
    let dropped = total - records.len();
    if dropped > 0 {
        tracing::warn!(dropped, "dropped volunteer records without an id");
    }
    records
}

impl VolunteerRecord {
    /// Trim the id and fill a placeholder avatar when no photo is set.
    /// Returns `None` if the id is blank.
    pub fn normalized(mut self) -> Option<Self> {
        let trimmed = self.id.trim();
        if trimmed.is_empty() {
            return None;
        }
        if trimmed.len() != self.id.len() {
            self.id = trimmed.to_string();
        }
        if self.image_url.trim().is_empty() {
            self.image_url = avatar_url(&self.name);
        }
        Some(self)
    }

    /// Build a client-only record for a payload the remote service did not
    /// accept.
    pub fn local_from_payload(
        payload: &CreatePayload,
        sequence_number: i64,
        now: DateTime<Utc>,
    ) -> Self {
        let image_url = payload
            .image
            .as_deref()
            .map(str::trim)
            .filter(|image| is_displayable_image(image))
            .map(str::to_string)
            .unwrap_or_else(|| avatar_url(payload.name.trim()));

        Self {
            id: format!("{LOCAL_ID_PREFIX}{}", uuid::Uuid::new_v4().simple()),
            sequence_number,
            name: payload.name.trim().to_string(),
            membership_code: payload.membership_code.trim().to_string(),
            mobile_number: payload.mobile_number.trim().to_string(),
            address: payload.address.trim().to_string(),
            image_url,
            join_date: Some(now),
            created_at: Some(now),
        }
    }

    /// True for records that exist only on this client.
    pub fn is_local_only(&self) -> bool {
        self.id.starts_with(LOCAL_ID_PREFIX)
    }
}

/// Fields submitted to the remote create endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CreatePayload {
    pub name: String,
    #[serde(rename = "aakNo")]
    pub membership_code: String,
    #[serde(rename = "mobileNo")]
    pub mobile_number: String,
    pub address: String,
    /// Hosted photo URL or a `data:` URI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl CreatePayload {
    pub fn validate(&self) -> Result<(), DirectoryError> {
        if self.name.trim().is_empty() {
            return Err(DirectoryError::invalid_payload("name is required"));
        }
        if self.membership_code.trim().is_empty() {
            return Err(DirectoryError::invalid_payload(
                "membership code is required",
            ));
        }
        Ok(())
    }
}

/// Placeholder avatar URL derived from a display name.
pub fn avatar_url(name: &str) -> String {
    format!(
        "{AVATAR_BASE_URL}?name={}&background=4f46e5&color=fff&size=200&bold=true&format=png",
        urlencoding::encode(name)
    )
}

fn is_displayable_image(image: &str) -> bool {
    image.starts_with("http://") || image.starts_with("https://") || image.starts_with("data:")
}

fn lenient_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn lenient_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn lenient_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    }
}
