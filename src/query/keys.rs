use std::fmt;

/// Hierarchical cache key. A key covers every key that starts with its
/// segments, so invalidating `contacts` also hits `contacts:id:42`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// True when `self` equals `prefix` or is nested under it.
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.len() >= prefix.0.len() && self.0.iter().zip(&prefix.0).all(|(a, b)| a == b)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(":"))
    }
}

pub fn contacts() -> QueryKey {
    QueryKey::new(["contacts"])
}

/// Per-id keys sit under an `id` segment so no id can collide with a
/// named sub-resource such as `reminders:upcoming`.
pub fn contact(id: &str) -> QueryKey {
    contacts().child("id").child(id)
}

pub fn reminders() -> QueryKey {
    QueryKey::new(["reminders"])
}

pub fn reminder(id: &str) -> QueryKey {
    reminders().child("id").child(id)
}

pub fn upcoming_reminders() -> QueryKey {
    reminders().child("upcoming")
}

pub fn dashboard() -> QueryKey {
    QueryKey::new(["dashboard"])
}

pub fn dashboard_stats() -> QueryKey {
    dashboard().child("stats")
}

pub fn stale_contacts() -> QueryKey {
    dashboard().child("stale")
}

pub fn recent_contacts() -> QueryKey {
    dashboard().child("recent")
}
