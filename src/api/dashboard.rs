use reqwest::Method;

use super::{Transport, decode};
use crate::core::{Contact, DashboardStats};
use crate::error::ApiError;

/// `/dashboard/` endpoints. All read-only.
#[derive(Clone)]
pub struct DashboardApi<T> {
    transport: T,
}

impl<T: Transport> DashboardApi<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub async fn stats(&self) -> Result<DashboardStats, ApiError> {
        let body = self.transport.request(Method::GET, "/dashboard/", None).await?;
        decode(body)
    }

    /// Contacts past the server's inactivity threshold.
    pub async fn stale(&self) -> Result<Vec<Contact>, ApiError> {
        let body = self
            .transport
            .request(Method::GET, "/dashboard/stale/", None)
            .await?;
        decode(body)
    }

    pub async fn recent(&self) -> Result<Vec<Contact>, ApiError> {
        let body = self
            .transport
            .request(Method::GET, "/dashboard/recent/", None)
            .await?;
        decode(body)
    }
}
