use crate::api::{ContactsApi, DashboardApi, HttpTransport, RemindersApi, Transport};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::query::{ContactQueries, DashboardQueries, QueryClient, ReminderQueries};

/// One cache context wired to every resource family.
#[derive(Clone)]
pub struct Friendforce<T> {
    pub cache: QueryClient,
    pub contacts: ContactQueries<T>,
    pub reminders: ReminderQueries<T>,
    pub dashboard: DashboardQueries<T>,
}

impl<T: Transport> Friendforce<T> {
    pub fn new(transport: T) -> Self {
        Self::with_cache(transport, QueryClient::new())
    }

    pub fn with_cache(transport: T, cache: QueryClient) -> Self {
        Self {
            contacts: ContactQueries::new(cache.clone(), ContactsApi::new(transport.clone())),
            reminders: ReminderQueries::new(cache.clone(), RemindersApi::new(transport.clone())),
            dashboard: DashboardQueries::new(cache.clone(), DashboardApi::new(transport)),
            cache,
        }
    }
}

impl Friendforce<HttpTransport> {
    pub fn connect(config: &ClientConfig) -> Result<Self, ApiError> {
        log::info!("Using API at {}", config.api_url());
        Ok(Self::new(HttpTransport::new(config)?))
    }
}
