use serde::{Deserialize, Serialize};

/// Aggregate snapshot served by `GET /dashboard/`. Read-only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_contacts: u32,
    pub upcoming_reminders: u32,
    pub recent_interactions_count: u32,
    pub needs_attention: u32,
}

/// Body returned by action endpoints such as log-interaction. Empty when
/// the server answers with no content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionMessage {
    #[serde(default)]
    pub message: String,
}
