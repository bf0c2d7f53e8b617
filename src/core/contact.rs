use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::dates;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactType {
    Friend,
    Professional,
    Mentor,
}

impl ContactType {
    pub const ALL: [ContactType; 3] = [Self::Friend, Self::Professional, Self::Mentor];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Friend => "friend",
            Self::Professional => "professional",
            Self::Mentor => "mentor",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "friend" => Some(Self::Friend),
            "professional" => Some(Self::Professional),
            "mentor" => Some(Self::Mentor),
            _ => None,
        }
    }
}

impl Default for ContactType {
    fn default() -> Self {
        Self::Friend
    }
}

impl std::fmt::Display for ContactType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Friend => write!(f, "Friend"),
            Self::Professional => write!(f, "Professional"),
            Self::Mentor => write!(f, "Mentor"),
        }
    }
}

/// A contact as reported by the server.
///
/// `needs_attention` is computed server-side from `last_contact`; there is
/// no way to set it from this client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub contact_type: ContactType,
    #[serde(default, deserialize_with = "dates::optional_date")]
    pub birthday: Option<NaiveDate>,
    #[serde(default)]
    pub last_contact: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub needs_attention: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Contact {
    pub fn has_email(&self) -> bool {
        !self.email.is_empty()
    }
}

/// Body for `POST /contacts/`. Empty optional fields are left out of the
/// request entirely.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactFormData {
    pub name: String,
    pub contact_type: ContactType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birthday: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Body for `PATCH /contacts/{id}/`. Only the fields that are set change.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContactPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_type: Option<ContactType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birthday: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ContactPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
