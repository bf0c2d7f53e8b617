use std::rc::Rc;

use super::cache::{QueryClient, Subscription};
use super::keys;
use crate::api::{DashboardApi, Transport};
use crate::core::{Contact, DashboardStats};
use crate::error::ApiError;

/// Dashboard reads. There are no dashboard mutations; these keys are
/// refreshed through contact and reminder invalidation.
#[derive(Clone)]
pub struct DashboardQueries<T> {
    cache: QueryClient,
    api: DashboardApi<T>,
}

impl<T: Transport> DashboardQueries<T> {
    pub fn new(cache: QueryClient, api: DashboardApi<T>) -> Self {
        Self { cache, api }
    }

    pub async fn stats(&self) -> Result<Rc<DashboardStats>, ApiError> {
        let api = self.api.clone();
        self.cache
            .read(&keys::dashboard_stats(), move || {
                let api = api.clone();
                async move { api.stats().await }
            })
            .await
    }

    pub async fn stale(&self) -> Result<Rc<Vec<Contact>>, ApiError> {
        let api = self.api.clone();
        self.cache
            .read(&keys::stale_contacts(), move || {
                let api = api.clone();
                async move { api.stale().await }
            })
            .await
    }

    pub async fn recent(&self) -> Result<Rc<Vec<Contact>>, ApiError> {
        let api = self.api.clone();
        self.cache
            .read(&keys::recent_contacts(), move || {
                let api = api.clone();
                async move { api.recent().await }
            })
            .await
    }

    pub fn watch_stats(&self) -> Subscription {
        let api = self.api.clone();
        self.cache.subscribe_with(&keys::dashboard_stats(), move || {
            let api = api.clone();
            async move { api.stats().await }
        })
    }
}
