use thiserror::Error;

use crate::view::form::FormError;

/// A failed call to the remote API.
///
/// `status` is `None` when no HTTP response was received at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ApiError {
    pub message: String,
    pub status: Option<u16>,
}

impl ApiError {
    pub fn new(message: impl Into<String>, status: Option<u16>) -> Self {
        Self {
            message: message.into(),
            status,
        }
    }

    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::new(message, None)
    }
}

/// Client-side checks that run before anything is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Name is required")]
    MissingName,
    #[error("Please fill in all required fields")]
    MissingReminderFields,
    #[error("Please select a contact")]
    NoContactSelected,
    #[error("Please enter a message")]
    EmptyMessage,
    #[error("No contacts with email addresses")]
    NoRecipients,
    #[error("Invalid date: {0}")]
    InvalidDate(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Form(#[from] FormError),
}

impl Error {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
