use std::future::Future;

use thiserror::Error;

use crate::error::{ApiError, Error, ValidationError};

/// Dialog input that turns into a request payload once it passes the
/// client-side checks.
pub trait Draft: Clone {
    type Payload;

    fn validate(&self) -> Result<Self::Payload, ValidationError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Form is not open")]
    NotOpen,
    #[error("Already submitting")]
    AlreadySubmitting,
}

/// Lifecycle of one mutation dialog.
///
/// `Closed -> Open -> Submitting -> Closed` on success, or back to `Open`
/// with the error and the draft intact on failure. A result that arrives
/// after the dialog was closed is dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormState<D> {
    Closed,
    Open { draft: D, error: Option<String> },
    Submitting { draft: D },
}

impl<D> Default for FormState<D> {
    fn default() -> Self {
        Self::Closed
    }
}

impl<D: Draft> FormState<D> {
    /// Open with `draft`. Does nothing if already open.
    pub fn open(&mut self, draft: D) -> bool {
        if !matches!(self, Self::Closed) {
            return false;
        }
        *self = Self::Open { draft, error: None };
        true
    }

    pub fn close(&mut self) {
        *self = Self::Closed;
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Closed)
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self, Self::Submitting { .. })
    }

    pub fn draft(&self) -> Option<&D> {
        match self {
            Self::Closed => None,
            Self::Open { draft, .. } | Self::Submitting { draft } => Some(draft),
        }
    }

    /// Editable only while open; fields are locked during submission.
    pub fn draft_mut(&mut self) -> Option<&mut D> {
        match self {
            Self::Open { draft, .. } => Some(draft),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Open { error, .. } => error.as_deref(),
            _ => None,
        }
    }

    /// Validate and move to `Submitting`. A validation failure keeps the
    /// form open with the message set; nothing is sent.
    pub fn begin_submit(&mut self) -> Result<D::Payload, Error> {
        let (payload, draft) = match self {
            Self::Closed => return Err(FormError::NotOpen.into()),
            Self::Submitting { .. } => return Err(FormError::AlreadySubmitting.into()),
            Self::Open { draft, error } => match draft.validate() {
                Ok(payload) => (payload, draft.clone()),
                Err(e) => {
                    *error = Some(e.to_string());
                    return Err(e.into());
                }
            },
        };
        *self = Self::Submitting { draft };
        Ok(payload)
    }

    /// Apply the outcome of a submission. Returns false when the form was
    /// no longer waiting for one.
    pub fn finish(&mut self, outcome: Result<(), String>) -> bool {
        let draft = match self {
            Self::Submitting { draft } => draft.clone(),
            _ => return false,
        };
        *self = match outcome {
            Ok(()) => Self::Closed,
            Err(message) => Self::Open {
                draft,
                error: Some(message),
            },
        };
        true
    }

    /// Run one full submission through `action`.
    pub async fn submit<R, F, Fut>(&mut self, action: F) -> Result<R, Error>
    where
        F: FnOnce(D::Payload) -> Fut,
        Fut: Future<Output = Result<R, ApiError>>,
    {
        let payload = self.begin_submit()?;
        let result = action(payload).await;
        self.finish(result.as_ref().map(|_| ()).map_err(ToString::to_string));
        result.map_err(Error::from)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialog {
    AddContact,
    AddReminder,
    LogMeetup,
    BlastPreview,
}

/// Tracks the single dialog a page may have open. Owned by interactive
/// front ends that keep a page alive; the CLI opens one form per run.
#[derive(Debug, Default)]
pub struct DialogHost {
    open: Option<Dialog>,
}

impl DialogHost {
    pub fn open(&mut self, dialog: Dialog) -> bool {
        match self.open {
            Some(current) => current == dialog,
            None => {
                self.open = Some(dialog);
                true
            }
        }
    }

    pub fn close(&mut self, dialog: Dialog) {
        if self.open == Some(dialog) {
            self.open = None;
        }
    }

    pub fn current(&self) -> Option<Dialog> {
        self.open
    }
}
