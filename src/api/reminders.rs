use reqwest::Method;

use super::{Transport, decode, decode_or_default, encode};
use crate::core::{ActionMessage, Reminder, ReminderFormData, ReminderPatch};
use crate::error::ApiError;

/// `/reminders/` endpoints.
#[derive(Clone)]
pub struct RemindersApi<T> {
    transport: T,
}

impl<T: Transport> RemindersApi<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub async fn list(&self) -> Result<Vec<Reminder>, ApiError> {
        let body = self.transport.request(Method::GET, "/reminders/", None).await?;
        decode(body)
    }

    pub async fn get(&self, id: &str) -> Result<Reminder, ApiError> {
        let path = format!("/reminders/{}/", id);
        let body = self.transport.request(Method::GET, &path, None).await?;
        decode(body)
    }

    pub async fn create(&self, data: &ReminderFormData) -> Result<Reminder, ApiError> {
        let body = self
            .transport
            .request(Method::POST, "/reminders/", Some(encode(data)?))
            .await?;
        decode(body)
    }

    pub async fn update(&self, id: &str, patch: &ReminderPatch) -> Result<Reminder, ApiError> {
        let path = format!("/reminders/{}/", id);
        let body = self
            .transport
            .request(Method::PATCH, &path, Some(encode(patch)?))
            .await?;
        decode(body)
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let path = format!("/reminders/{}/", id);
        self.transport.request(Method::DELETE, &path, None).await?;
        Ok(())
    }

    /// Near-term reminders, windowed by the server.
    pub async fn upcoming(&self) -> Result<Vec<Reminder>, ApiError> {
        let body = self
            .transport
            .request(Method::GET, "/reminders/upcoming/", None)
            .await?;
        decode(body)
    }

    pub async fn complete(&self, id: &str) -> Result<ActionMessage, ApiError> {
        let path = format!("/reminders/{}/complete/", id);
        let body = self.transport.request(Method::POST, &path, None).await?;
        decode_or_default(body)
    }
}
