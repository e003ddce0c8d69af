//! Remote wire records.
//!
//! All (de)serialization of the remote contact schema lives here; the rest
//! of the engine only ever sees [`Contact`] and [`ContactLabel`].
//!
//! One rule matters: `label_ids` is omitted entirely when a contact carries
//! no labels. The remote side never sends an empty list, and `null`,
//! absent, and empty all mean the same thing on the read path.

use serde::{Deserialize, Serialize};

use crate::contact::{Contact, ContactLabel, EntityCategory};
use crate::errors::CoreError;

/// One contact as the remote API represents it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactRecord {
    pub contact_id: u32,
    pub contact_type: EntityCategory,
    pub standing: f64,
    /// Omitted on the wire when the contact has no labels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_ids: Option<Vec<u64>>,
}

/// One label as the remote API represents it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelRecord {
    pub label_id: u64,
    pub label_name: String,
}

impl Contact {
    /// Build a contact from its wire record.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] when the record fails contact
    /// validation (zero id, standing out of range).
    pub fn from_record(record: &ContactRecord) -> Result<Self, CoreError> {
        Self::new(
            record.contact_id,
            record.contact_type,
            record.standing,
            record.label_ids.iter().flatten().copied(),
        )
    }

    /// Convert to the wire record. An empty label set becomes `None` so the
    /// field is omitted when serialized.
    #[must_use]
    pub fn to_record(&self) -> ContactRecord {
        ContactRecord {
            contact_id: self.contact_id(),
            contact_type: self.category(),
            standing: self.standing(),
            label_ids: if self.label_ids().is_empty() {
                None
            } else {
                Some(self.label_ids().iter().copied().collect())
            },
        }
    }
}

impl ContactLabel {
    #[must_use]
    pub fn from_record(record: &LabelRecord) -> Self {
        Self::new(record.label_id, record.label_name.clone())
    }

    #[must_use]
    pub fn to_record(&self) -> LabelRecord {
        LabelRecord {
            label_id: self.id(),
            label_name: self.name().to_owned(),
        }
    }
}
