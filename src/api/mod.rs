pub mod contacts;
pub mod dashboard;
pub mod reminders;
pub mod transport;

pub use contacts::ContactsApi;
pub use dashboard::DashboardApi;
pub use reminders::RemindersApi;
pub use transport::{HttpTransport, Transport};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;

/// Decode a transport result into a typed body. An empty result is only
/// acceptable when the caller expects nothing back.
pub(crate) fn decode<T: DeserializeOwned>(value: Option<Value>) -> Result<T, ApiError> {
    let value = value.unwrap_or(Value::Null);
    serde_json::from_value(value)
        .map_err(|e| ApiError::new(format!("Failed to parse response: {}", e), None))
}

/// Decode an action response where a `204 No Content` is just as good as a
/// body, e.g. `ActionMessage`.
pub(crate) fn decode_or_default<T: DeserializeOwned + Default>(
    value: Option<Value>,
) -> Result<T, ApiError> {
    value.map(|v| decode(Some(v))).transpose().map(Option::unwrap_or_default)
}

pub(crate) fn encode<T: Serialize>(body: &T) -> Result<Value, ApiError> {
    serde_json::to_value(body)
        .map_err(|e| ApiError::new(format!("Failed to encode request: {}", e), None))
}
