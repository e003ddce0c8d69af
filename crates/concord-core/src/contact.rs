//! Contact and label value types.
//!
//! Both types are immutable once constructed. The mutation idiom is
//! clone-with-override: [`Contact::with_standing`] and
//! [`Contact::with_label_ids`] return a new value copying all other fields.

use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Lowest standing value the remote system accepts.
pub const MIN_STANDING: f64 = -10.0;
/// Highest standing value the remote system accepts.
pub const MAX_STANDING: f64 = 10.0;

// ---------------------------------------------------------------------------
// EntityCategory
// ---------------------------------------------------------------------------

/// Category of the entity a contact points at.
///
/// The remote API only knows these four. Anything else is a validation
/// error, never a silent coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityCategory {
    Character,
    Corporation,
    Alliance,
    Faction,
}

impl EntityCategory {
    /// String representation used on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Character => "character",
            Self::Corporation => "corporation",
            Self::Alliance => "alliance",
            Self::Faction => "faction",
        }
    }
}

impl fmt::Display for EntityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityCategory {
    type Err = CoreError;

    /// Case-insensitive parse of a wire category tag.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "character" => Ok(Self::Character),
            "corporation" => Ok(Self::Corporation),
            "alliance" => Ok(Self::Alliance),
            "faction" => Ok(Self::Faction),
            other => Err(CoreError::Validation(format!(
                "unknown entity category: {other}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// ContactLabel
// ---------------------------------------------------------------------------

/// A remote-side named tag.
///
/// The numeric id is assigned by the remote system and is NOT stable across
/// fetches; labels must always be resolved by name, case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContactLabel {
    id: u64,
    name: String,
}

impl ContactLabel {
    #[must_use]
    pub const fn new(id: u64, name: String) -> Self {
        Self { id, name }
    }

    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Case-insensitive name match.
    #[must_use]
    pub fn matches_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }
}

impl fmt::Display for ContactLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

// ---------------------------------------------------------------------------
// Contact
// ---------------------------------------------------------------------------

/// One remote relationship record: target entity, standing, label tags.
///
/// Equality and hashing are by value over all four fields. The standing is
/// compared by bit pattern (exact IEEE equality, no epsilon), which is why
/// construction normalizes `-0.0` to `0.0`.
#[derive(Debug, Clone)]
pub struct Contact {
    contact_id: u32,
    category: EntityCategory,
    standing: f64,
    label_ids: BTreeSet<u64>,
}

impl Contact {
    /// Build a validated contact.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] when `contact_id` is zero or the
    /// standing is outside `[-10.0, +10.0]` or not finite.
    pub fn new(
        contact_id: u32,
        category: EntityCategory,
        standing: f64,
        label_ids: impl IntoIterator<Item = u64>,
    ) -> Result<Self, CoreError> {
        if contact_id == 0 {
            return Err(CoreError::Validation("contact id must be positive".into()));
        }
        let standing = normalize_standing(standing)?;
        Ok(Self {
            contact_id,
            category,
            standing,
            label_ids: label_ids.into_iter().collect(),
        })
    }

    #[must_use]
    pub const fn contact_id(&self) -> u32 {
        self.contact_id
    }

    #[must_use]
    pub const fn category(&self) -> EntityCategory {
        self.category
    }

    #[must_use]
    pub const fn standing(&self) -> f64 {
        self.standing
    }

    #[must_use]
    pub const fn label_ids(&self) -> &BTreeSet<u64> {
        &self.label_ids
    }

    /// Whether this contact carries the given label.
    #[must_use]
    pub fn has_label(&self, label_id: u64) -> bool {
        self.label_ids.contains(&label_id)
    }

    /// Clone with a different standing; all other fields copy over.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] when the new standing is out of
    /// range.
    pub fn with_standing(&self, standing: f64) -> Result<Self, CoreError> {
        Ok(Self {
            standing: normalize_standing(standing)?,
            label_ids: self.label_ids.clone(),
            ..*self
        })
    }

    /// Clone with a different label set; all other fields copy over.
    #[must_use]
    pub fn with_label_ids(&self, label_ids: impl IntoIterator<Item = u64>) -> Self {
        Self {
            label_ids: label_ids.into_iter().collect(),
            ..*self
        }
    }
}

impl PartialEq for Contact {
    fn eq(&self, other: &Self) -> bool {
        self.contact_id == other.contact_id
            && self.category == other.category
            && self.standing.to_bits() == other.standing.to_bits()
            && self.label_ids == other.label_ids
    }
}

impl Eq for Contact {}

impl Hash for Contact {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.contact_id.hash(state);
        self.category.hash(state);
        self.standing.to_bits().hash(state);
        self.label_ids.hash(state);
    }
}

impl fmt::Display for Contact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.category, self.contact_id)
    }
}

/// Validate range and collapse `-0.0` so bitwise equality behaves.
fn normalize_standing(standing: f64) -> Result<f64, CoreError> {
    if !standing.is_finite() || !(MIN_STANDING..=MAX_STANDING).contains(&standing) {
        return Err(CoreError::Validation(format!(
            "standing {standing} not in [{MIN_STANDING}, {MAX_STANDING}]"
        )));
    }
    Ok(if standing == 0.0 { 0.0 } else { standing })
}
