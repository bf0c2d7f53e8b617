//! Test infrastructure: an in-memory stand-in for the Friendforce API.
//!
//! `FakeApi` implements `Transport` over a shared state so tests can seed
//! data, inspect the calls that were made, and script failures. Every
//! request yields once to the runtime before answering, which keeps the
//! request in flight long enough for concurrent readers to pile up on it.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use chrono::{NaiveDate, Utc};
use reqwest::{Method, StatusCode};
use serde_json::{Value, json};

use crate::api::Transport;
use crate::api::transport::error_from_body;
use crate::core::dates::parse_date;
use crate::core::{Contact, ContactType, DashboardStats, Reminder, ReminderFrequency};
use crate::error::ApiError;

#[derive(Default)]
struct FakeState {
    contacts: Vec<Contact>,
    reminders: Vec<Reminder>,
    next_contact: u32,
    next_reminder: u32,
    calls: Vec<String>,
    last_body: Option<Value>,
    failures: VecDeque<(u16, Option<String>)>,
    empty_replies: usize,
}

#[derive(Clone, Default)]
pub struct FakeApi {
    state: Rc<RefCell<FakeState>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_contact(&self, name: &str, email: &str, contact_type: ContactType) -> String {
        let mut state = self.state.borrow_mut();
        let contact = state.new_contact(name, email, contact_type);
        let id = contact.id.clone();
        state.contacts.push(contact);
        id
    }

    pub fn add_reminder(
        &self,
        contact_id: &str,
        title: &str,
        due_date: NaiveDate,
        frequency: ReminderFrequency,
    ) -> String {
        let mut state = self.state.borrow_mut();
        let reminder = state.new_reminder(contact_id, title, due_date, frequency);
        let id = reminder.id.clone();
        state.reminders.push(reminder);
        id
    }

    /// Make the next request fail with `status`, optionally carrying a
    /// `detail` message in the body.
    pub fn fail_next(&self, status: u16, detail: Option<&str>) {
        self.state
            .borrow_mut()
            .failures
            .push_back((status, detail.map(str::to_string)));
    }

    /// Apply the next request as usual but answer it with no content, the
    /// way a server replying `204` would.
    pub fn empty_next(&self) {
        self.state.borrow_mut().empty_replies += 1;
    }

    /// Every request so far, formatted as `METHOD /path/`.
    pub fn calls(&self) -> Vec<String> {
        self.state.borrow().calls.clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.state.borrow().calls.iter().filter(|c| *c == call).count()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    pub fn last_body(&self) -> Option<Value> {
        self.state.borrow().last_body.clone()
    }

    pub fn contact_count(&self) -> usize {
        self.state.borrow().contacts.len()
    }
}

impl Transport for FakeApi {
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Option<Value>, ApiError> {
        {
            let mut state = self.state.borrow_mut();
            state.calls.push(format!("{} {}", method, path));
            state.last_body = body.clone();
        }

        tokio::task::yield_now().await;

        let mut state = self.state.borrow_mut();
        if let Some((status, detail)) = state.failures.pop_front() {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_REQUEST);
            let body = detail.map(|d| json!({ "detail": d }).to_string()).unwrap_or_default();
            return Err(error_from_body(status, &body));
        }
        let reply = state.route(&method, path, body.unwrap_or(Value::Null))?;
        if state.empty_replies > 0 {
            state.empty_replies -= 1;
            return Ok(None);
        }
        Ok(reply)
    }
}

fn not_found() -> ApiError {
    error_from_body(StatusCode::NOT_FOUND, r#"{"detail": "Not found."}"#)
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Option<Value>, ApiError> {
    serde_json::to_value(value)
        .map(Some)
        .map_err(|e| ApiError::new(e.to_string(), Some(500)))
}

fn text(body: &Value, field: &str) -> Option<String> {
    body.get(field).and_then(Value::as_str).map(str::to_string)
}

impl FakeState {
    fn new_contact(&mut self, name: &str, email: &str, contact_type: ContactType) -> Contact {
        self.next_contact += 1;
        let now = Utc::now();
        Contact {
            id: format!("c{}", self.next_contact),
            name: name.to_string(),
            email: email.to_string(),
            phone: String::new(),
            contact_type,
            birthday: None,
            last_contact: None,
            notes: String::new(),
            needs_attention: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn new_reminder(
        &mut self,
        contact_id: &str,
        title: &str,
        due_date: NaiveDate,
        frequency: ReminderFrequency,
    ) -> Reminder {
        self.next_reminder += 1;
        let now = Utc::now();
        let contact_name = self
            .contacts
            .iter()
            .find(|c| c.id == contact_id)
            .map(|c| c.name.clone())
            .unwrap_or_default();
        Reminder {
            id: format!("r{}", self.next_reminder),
            contact: contact_id.to_string(),
            contact_name,
            title: title.to_string(),
            due_date,
            frequency,
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn stats(&self) -> DashboardStats {
        let count = |n: usize| n as u32;
        DashboardStats {
            total_contacts: count(self.contacts.len()),
            upcoming_reminders: count(self.reminders.iter().filter(|r| !r.completed).count()),
            recent_interactions_count: count(
                self.contacts.iter().filter(|c| c.last_contact.is_some()).count(),
            ),
            needs_attention: count(self.contacts.iter().filter(|c| c.needs_attention).count()),
        }
    }

    fn route(&mut self, method: &Method, path: &str, body: Value) -> Result<Option<Value>, ApiError> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match (method.as_str(), segments.as_slice()) {
            ("GET", ["contacts"]) => to_json(&self.contacts),
            ("POST", ["contacts"]) => {
                let name = text(&body, "name").unwrap_or_default();
                let contact_type = text(&body, "contact_type")
                    .and_then(|t| ContactType::parse(&t))
                    .unwrap_or_default();
                let email = text(&body, "email").unwrap_or_default();
                let mut contact = self.new_contact(&name, &email, contact_type);
                contact.phone = text(&body, "phone").unwrap_or_default();
                contact.notes = text(&body, "notes").unwrap_or_default();
                contact.birthday = text(&body, "birthday").and_then(|b| parse_date(&b));
                self.contacts.push(contact.clone());
                to_json(&contact)
            }
            ("GET", ["contacts", id]) => {
                let contact = self.contacts.iter().find(|c| c.id == *id).ok_or_else(not_found)?;
                to_json(contact)
            }
            ("PATCH", ["contacts", id]) => {
                let contact = self
                    .contacts
                    .iter_mut()
                    .find(|c| c.id == *id)
                    .ok_or_else(not_found)?;
                if let Some(name) = text(&body, "name") {
                    contact.name = name;
                }
                if let Some(email) = text(&body, "email") {
                    contact.email = email;
                }
                if let Some(phone) = text(&body, "phone") {
                    contact.phone = phone;
                }
                if let Some(notes) = text(&body, "notes") {
                    contact.notes = notes;
                }
                if let Some(t) = text(&body, "contact_type").and_then(|t| ContactType::parse(&t)) {
                    contact.contact_type = t;
                }
                contact.updated_at = Utc::now();
                to_json(contact)
            }
            ("DELETE", ["contacts", id]) => {
                let before = self.contacts.len();
                self.contacts.retain(|c| c.id != *id);
                if self.contacts.len() == before {
                    return Err(not_found());
                }
                self.reminders.retain(|r| r.contact != *id);
                Ok(None)
            }
            ("POST", ["contacts", id, "log-interaction"]) => {
                let contact = self
                    .contacts
                    .iter_mut()
                    .find(|c| c.id == *id)
                    .ok_or_else(not_found)?;
                contact.last_contact = Some(Utc::now());
                contact.needs_attention = false;
                Ok(Some(json!({ "message": "Interaction logged" })))
            }
            ("GET", ["reminders"]) => to_json(&self.reminders),
            ("GET", ["reminders", "upcoming"]) => {
                let pending: Vec<&Reminder> = self.reminders.iter().filter(|r| !r.completed).collect();
                to_json(&pending)
            }
            ("POST", ["reminders"]) => {
                let contact = text(&body, "contact").unwrap_or_default();
                let title = text(&body, "title").unwrap_or_default();
                let due = text(&body, "due_date")
                    .and_then(|d| parse_date(&d))
                    .ok_or_else(|| error_from_body(StatusCode::BAD_REQUEST, r#"{"detail": "Invalid due date"}"#))?;
                let frequency = text(&body, "frequency")
                    .and_then(|f| ReminderFrequency::parse(&f))
                    .unwrap_or_default();
                let reminder = self.new_reminder(&contact, &title, due, frequency);
                self.reminders.push(reminder.clone());
                to_json(&reminder)
            }
            ("GET", ["reminders", id]) => {
                let reminder = self.reminders.iter().find(|r| r.id == *id).ok_or_else(not_found)?;
                to_json(reminder)
            }
            ("PATCH", ["reminders", id]) => {
                let reminder = self
                    .reminders
                    .iter_mut()
                    .find(|r| r.id == *id)
                    .ok_or_else(not_found)?;
                if let Some(title) = text(&body, "title") {
                    reminder.title = title;
                }
                if let Some(due) = text(&body, "due_date").and_then(|d| parse_date(&d)) {
                    reminder.due_date = due;
                }
                if let Some(f) = text(&body, "frequency").and_then(|f| ReminderFrequency::parse(&f)) {
                    reminder.frequency = f;
                }
                reminder.updated_at = Utc::now();
                to_json(reminder)
            }
            ("DELETE", ["reminders", id]) => {
                let before = self.reminders.len();
                self.reminders.retain(|r| r.id != *id);
                if self.reminders.len() == before {
                    return Err(not_found());
                }
                Ok(None)
            }
            ("POST", ["reminders", id, "complete"]) => {
                let reminder = self
                    .reminders
                    .iter_mut()
                    .find(|r| r.id == *id)
                    .ok_or_else(not_found)?;
                reminder.completed = true;
                Ok(Some(json!({ "message": "Reminder completed" })))
            }
            ("GET", ["dashboard"]) => to_json(&self.stats()),
            ("GET", ["dashboard", "stale"]) => {
                let stale: Vec<&Contact> = self.contacts.iter().filter(|c| c.needs_attention).collect();
                to_json(&stale)
            }
            ("GET", ["dashboard", "recent"]) => {
                let mut recent: Vec<&Contact> =
                    self.contacts.iter().filter(|c| c.last_contact.is_some()).collect();
                recent.sort_by(|a, b| b.last_contact.cmp(&a.last_contact));
                recent.truncate(5);
                to_json(&recent)
            }
            _ => Err(not_found()),
        }
    }
}
