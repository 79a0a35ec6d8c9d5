//! Domain error model.

use thiserror::Error;

/// Result type returned by record validation.
pub type ValidationResult = Result<(), ValidationError>;

/// A record failed validation and must not be persisted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field was missing, empty or whitespace-only.
    #[error("{0} can't be blank")]
    Presence(&'static str),
}

impl ValidationError {
    /// Name of the field that failed validation.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::Presence(field) => field,
        }
    }
}

/// The attachment storage refused or lost a blob.
///
/// These are reported to the caller as-is; nothing in this workspace retries
/// them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AttachmentError {
    /// The uploaded payload had no bytes.
    #[error("attachment is empty")]
    Empty,

    /// The payload exceeded the storage size limit.
    #[error("attachment is {size} bytes, limit is {limit}")]
    TooLarge { size: u64, limit: u64 },

    /// The declared content type is not a MIME type at all.
    #[error("'{0}' is not a valid content type")]
    InvalidContentType(String),

    /// The storage does not accept this content type.
    #[error("content type '{0}' is not allowed")]
    ContentTypeNotAllowed(String),

    /// The referenced blob is not held by the storage.
    #[error("attachment not found")]
    NotFound,

    /// Any other storage failure.
    #[error("attachment storage failed: {0}")]
    Storage(String),
}
