use reqwest::Method;

use super::{Transport, decode, decode_or_default, encode};
use crate::core::{ActionMessage, Contact, ContactFormData, ContactPatch};
use crate::error::ApiError;

/// `/contacts/` endpoints.
#[derive(Clone)]
pub struct ContactsApi<T> {
    transport: T,
}

impl<T: Transport> ContactsApi<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub async fn list(&self) -> Result<Vec<Contact>, ApiError> {
        let body = self.transport.request(Method::GET, "/contacts/", None).await?;
        decode(body)
    }

    pub async fn get(&self, id: &str) -> Result<Contact, ApiError> {
        let path = format!("/contacts/{}/", id);
        let body = self.transport.request(Method::GET, &path, None).await?;
        decode(body)
    }

    pub async fn create(&self, data: &ContactFormData) -> Result<Contact, ApiError> {
        let body = self
            .transport
            .request(Method::POST, "/contacts/", Some(encode(data)?))
            .await?;
        decode(body)
    }

    pub async fn update(&self, id: &str, patch: &ContactPatch) -> Result<Contact, ApiError> {
        let path = format!("/contacts/{}/", id);
        let body = self
            .transport
            .request(Method::PATCH, &path, Some(encode(patch)?))
            .await?;
        decode(body)
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let path = format!("/contacts/{}/", id);
        self.transport.request(Method::DELETE, &path, None).await?;
        Ok(())
    }

    /// Record a meetup now. The server updates `last_contact` and
    /// recomputes `needs_attention`.
    pub async fn log_interaction(&self, id: &str) -> Result<ActionMessage, ApiError> {
        let path = format!("/contacts/{}/log-interaction/", id);
        let body = self.transport.request(Method::POST, &path, None).await?;
        decode_or_default(body)
    }
}
