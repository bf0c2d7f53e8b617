use super::form::Draft;
use crate::core::Contact;
use crate::error::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    pub name: String,
    pub email: String,
}

/// Contacts a blast can reach: the ones with an email on file.
pub fn recipients(contacts: &[Contact]) -> Vec<Recipient> {
    contacts
        .iter()
        .filter(|c| c.has_email())
        .map(|c| Recipient {
            name: c.name.clone(),
            email: c.email.clone(),
        })
        .collect()
}

/// What the preview dialog shows before sending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlastPreview {
    pub message: String,
    pub recipients: Vec<Recipient>,
}

impl BlastPreview {
    pub fn recipient_count(&self) -> usize {
        self.recipients.len()
    }

    pub fn confirmation(&self) -> String {
        format!("Blast ready to send to {} contacts!", self.recipient_count())
    }
}

/// Blast composer state. Recipients are captured from the contact list
/// the composer was opened with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlastDraft {
    pub message: String,
    pub recipients: Vec<Recipient>,
}

impl BlastDraft {
    pub fn new(contacts: &[Contact]) -> Self {
        Self {
            message: String::new(),
            recipients: recipients(contacts),
        }
    }
}

impl Draft for BlastDraft {
    type Payload = BlastPreview;

    fn validate(&self) -> Result<BlastPreview, ValidationError> {
        if self.message.trim().is_empty() {
            return Err(ValidationError::EmptyMessage);
        }
        if self.recipients.is_empty() {
            return Err(ValidationError::NoRecipients);
        }
        Ok(BlastPreview {
            message: self.message.clone(),
            recipients: self.recipients.clone(),
        })
    }
}

/// Validate a message against a contact list in one step.
pub fn compose(message: &str, contacts: &[Contact]) -> Result<BlastPreview, ValidationError> {
    BlastDraft {
        message: message.to_string(),
        recipients: recipients(contacts),
    }
    .validate()
}

/// Delivery is handled by the backend and not wired up yet; sending only
/// reports what would go out.
pub fn send(preview: &BlastPreview) -> String {
    log::info!("Blast queued for {} recipients", preview.recipient_count());
    preview.confirmation()
}
