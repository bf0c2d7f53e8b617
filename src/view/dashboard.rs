use super::form::Draft;
use crate::core::DashboardStats;
use crate::error::ValidationError;

pub const MEETUP_LOGGED: &str = "Meetup logged successfully!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatTile {
    pub label: &'static str,
    pub value: u32,
}

/// The four dashboard tiles. Values read 0 until stats have loaded.
pub fn stat_tiles(stats: Option<&DashboardStats>) -> [StatTile; 4] {
    let stats = stats.copied().unwrap_or_default();
    [
        StatTile {
            label: "Total Contacts",
            value: stats.total_contacts,
        },
        StatTile {
            label: "Upcoming Reminders",
            value: stats.upcoming_reminders,
        },
        StatTile {
            label: "Recent Interactions",
            value: stats.recent_interactions_count,
        },
        StatTile {
            label: "Needs Attention",
            value: stats.needs_attention,
        },
    ]
}

/// Log Meetup dialog: just the selected contact.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogMeetupDraft {
    pub contact_id: String,
}

impl Draft for LogMeetupDraft {
    type Payload = String;

    fn validate(&self) -> Result<String, ValidationError> {
        let id = self.contact_id.trim();
        if id.is_empty() {
            return Err(ValidationError::NoContactSelected);
        }
        Ok(id.to_string())
    }
}
