use chrono::{DateTime, Utc};

use super::form::Draft;
use crate::core::dates::parse_date;
use crate::core::{Contact, ContactFormData, ContactType};
use crate::error::ValidationError;

pub const CONTACT_ADDED: &str = "Contact added successfully";
pub const CONTACT_DELETED: &str = "Contact deleted";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeFilter {
    #[default]
    All,
    Only(ContactType),
}

impl TypeFilter {
    pub fn parse(s: &str) -> Option<Self> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Some(Self::All);
        }
        ContactType::parse(s).map(Self::Only)
    }

    pub fn admits(&self, contact_type: ContactType) -> bool {
        match self {
            Self::All => true,
            Self::Only(t) => *t == contact_type,
        }
    }
}

/// Search box plus type selector on the contacts page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactFilter {
    pub search: String,
    pub contact_type: TypeFilter,
}

impl ContactFilter {
    pub fn new(search: impl Into<String>, contact_type: TypeFilter) -> Self {
        Self {
            search: search.into(),
            contact_type,
        }
    }

    /// Case-insensitive substring match on name or email, and the type
    /// selector.
    pub fn matches(&self, contact: &Contact) -> bool {
        let needle = self.search.to_lowercase();
        let matches_search = contact.name.to_lowercase().contains(&needle)
            || contact.email.to_lowercase().contains(&needle);
        matches_search && self.contact_type.admits(contact.contact_type)
    }

    /// Matching contacts in server order.
    pub fn apply<'a>(&self, contacts: &'a [Contact]) -> Vec<&'a Contact> {
        contacts.iter().filter(|c| self.matches(c)).collect()
    }
}

/// Per-type totals for the summary tiles. Always computed over the full
/// list, regardless of the active filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypeCounts {
    pub friend: usize,
    pub professional: usize,
    pub mentor: usize,
}

impl TypeCounts {
    pub fn of(contacts: &[Contact]) -> Self {
        let mut counts = Self::default();
        for contact in contacts {
            match contact.contact_type {
                ContactType::Friend => counts.friend += 1,
                ContactType::Professional => counts.professional += 1,
                ContactType::Mentor => counts.mentor += 1,
            }
        }
        counts
    }

    pub fn get(&self, contact_type: ContactType) -> usize {
        match contact_type {
            ContactType::Friend => self.friend,
            ContactType::Professional => self.professional,
            ContactType::Mentor => self.mentor,
        }
    }

    pub fn total(&self) -> usize {
        self.friend + self.professional + self.mentor
    }
}

/// First character of each word, case kept as typed.
pub fn initials(name: &str) -> String {
    name.split_whitespace().filter_map(|word| word.chars().next()).collect()
}

/// "Never" or a rough "N days ago" style distance.
pub fn last_contact_label(last_contact: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    match last_contact {
        None => "Never".to_string(),
        Some(at) => {
            let seconds = (now - at).num_seconds();
            let phrase = distance_phrase(seconds.unsigned_abs());
            if seconds < 0 {
                format!("in {}", phrase)
            } else {
                format!("{} ago", phrase)
            }
        }
    }
}

fn plural(n: u64, unit: &str) -> String {
    if n == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", n, unit)
    }
}

fn distance_phrase(seconds: u64) -> String {
    const MINUTE: u64 = 60;
    const HOUR: u64 = 60 * MINUTE;
    const DAY: u64 = 24 * HOUR;
    const MONTH: u64 = 30 * DAY;
    const YEAR: u64 = 365 * DAY;

    let minutes = (seconds + MINUTE / 2) / MINUTE;
    if seconds < 30 {
        return "less than a minute".to_string();
    }
    if minutes < 45 {
        return plural(minutes.max(1), "minute");
    }
    if minutes < 90 {
        return "about 1 hour".to_string();
    }
    if seconds < DAY {
        return format!("about {}", plural((seconds + HOUR / 2) / HOUR, "hour"));
    }
    if seconds < 30 * DAY {
        return plural(((seconds + DAY / 2) / DAY).max(1), "day");
    }
    if seconds < 45 * DAY {
        return "about 1 month".to_string();
    }
    if seconds < YEAR {
        return format!("about {}", plural(((seconds + MONTH / 2) / MONTH).max(2), "month"));
    }

    let years = seconds / YEAR;
    let months_over = (seconds % YEAR) / MONTH;
    if months_over < 3 {
        format!("about {}", plural(years, "year"))
    } else if months_over < 9 {
        format!("over {}", plural(years, "year"))
    } else {
        format!("almost {}", plural(years + 1, "year"))
    }
}

/// Add Contact dialog fields, as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub contact_type: ContactType,
    pub birthday: String,
    pub notes: String,
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

impl Draft for ContactDraft {
    type Payload = ContactFormData;

    fn validate(&self) -> Result<ContactFormData, ValidationError> {
        let name = non_empty(&self.name).ok_or(ValidationError::MissingName)?;
        let birthday = match non_empty(&self.birthday) {
            Some(raw) => Some(parse_date(&raw).ok_or(ValidationError::InvalidDate(raw))?),
            None => None,
        };
        Ok(ContactFormData {
            name,
            contact_type: self.contact_type,
            email: non_empty(&self.email),
            phone: non_empty(&self.phone),
            birthday,
            notes: non_empty(&self.notes),
        })
    }
}
