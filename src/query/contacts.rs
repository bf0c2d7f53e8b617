use std::rc::Rc;

use super::cache::{QueryClient, Subscription};
use super::keys::{self, QueryKey};
use crate::api::{ContactsApi, Transport};
use crate::core::{ActionMessage, Contact, ContactFormData, ContactPatch};
use crate::error::ApiError;

/// Keys touched by any contact mutation. Dashboard aggregates are derived
/// from contacts, so the whole dashboard group goes too.
pub fn affected_keys() -> [QueryKey; 2] {
    [keys::contacts(), keys::dashboard()]
}

#[derive(Clone)]
pub struct ContactQueries<T> {
    cache: QueryClient,
    api: ContactsApi<T>,
}

impl<T: Transport> ContactQueries<T> {
    pub fn new(cache: QueryClient, api: ContactsApi<T>) -> Self {
        Self { cache, api }
    }

    pub async fn list(&self) -> Result<Rc<Vec<Contact>>, ApiError> {
        let api = self.api.clone();
        self.cache
            .read(&keys::contacts(), move || {
                let api = api.clone();
                async move { api.list().await }
            })
            .await
    }

    /// A single contact. An empty id is a disabled read and returns `None`.
    pub async fn get(&self, id: &str) -> Result<Option<Rc<Contact>>, ApiError> {
        let api = self.api.clone();
        let owned = id.to_string();
        self.cache
            .read_if(&keys::contact(id), !id.is_empty(), move || {
                let api = api.clone();
                let id = owned.clone();
                async move { api.get(&id).await }
            })
            .await
    }

    pub fn watch_list(&self) -> Subscription {
        let api = self.api.clone();
        self.cache.subscribe_with(&keys::contacts(), move || {
            let api = api.clone();
            async move { api.list().await }
        })
    }

    pub async fn create(&self, data: &ContactFormData) -> Result<Contact, ApiError> {
        let contact = self.cache.mutate(self.api.create(data), &affected_keys()).await?;
        log::info!("Created contact {} ({})", contact.name, contact.id);
        Ok(contact)
    }

    pub async fn update(&self, id: &str, patch: &ContactPatch) -> Result<Contact, ApiError> {
        let contact = self
            .cache
            .mutate(self.api.update(id, patch), &affected_keys())
            .await?;
        log::info!("Updated contact {}", id);
        Ok(contact)
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.cache.mutate(self.api.delete(id), &affected_keys()).await?;
        log::info!("Deleted contact {}", id);
        Ok(())
    }

    pub async fn log_interaction(&self, id: &str) -> Result<ActionMessage, ApiError> {
        let msg = self
            .cache
            .mutate(self.api.log_interaction(id), &affected_keys())
            .await?;
        log::info!("Logged interaction with {}", id);
        Ok(msg)
    }
}
