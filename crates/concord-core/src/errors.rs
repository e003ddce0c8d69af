//! Core error types.

use thiserror::Error;

/// Errors raised by the domain types in this crate.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// A value failed validation (range, category, format).
    #[error("validation error: {0}")]
    Validation(String),

    /// A contact references a label id not registered in its contact set.
    #[error("contact {contact_id} references unknown label id {label_id}")]
    UnknownLabel { contact_id: u32, label_id: u64 },

    /// A contact id was expected to be present in a contact set but is not.
    #[error("contact {0} not found")]
    UnknownContact(u32),
}
