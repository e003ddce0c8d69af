//! The contact set aggregate.
//!
//! A [`ContactSet`] is a transient snapshot of every contact and label a
//! remote actor has at one point in time. It is built fresh each sync pass,
//! either from a remote fetch or from the local standings source, and never
//! persisted. The two snapshots are then compared with
//! [`ContactSet::difference`] to derive the write plan.

use std::collections::BTreeMap;

use sha2::{Digest, Sha256};

use crate::contact::{Contact, ContactLabel};
use crate::errors::CoreError;
use crate::wire::{ContactRecord, LabelRecord};

/// Snapshot of all contacts and labels for one remote actor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactSet {
    contacts: BTreeMap<u32, Contact>,
    labels: BTreeMap<u64, ContactLabel>,
}

/// Result of diffing two snapshots. Each bucket is sorted by contact id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactsDiff {
    /// Contacts present in the new snapshot only.
    pub added: Vec<Contact>,
    /// Contacts present in the old snapshot only.
    pub removed: Vec<Contact>,
    /// Contacts present in both but with differing values; holds the new
    /// version.
    pub changed: Vec<Contact>,
}

impl ContactsDiff {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }
}

impl ContactSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a snapshot from wire records. Labels are registered first so
    /// contact label references validate against them.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError`] when a contact record fails validation or
    /// references an unknown label id.
    pub fn from_records(
        contacts: &[ContactRecord],
        labels: &[LabelRecord],
    ) -> Result<Self, CoreError> {
        let mut set = Self::new();
        for label in labels {
            set.add_label(ContactLabel::from_record(label));
        }
        for record in contacts {
            set.add_contact(Contact::from_record(record)?)?;
        }
        Ok(set)
    }

    /// Register a label, overwriting any label with the same id.
    pub fn add_label(&mut self, label: ContactLabel) {
        self.labels.insert(label.id(), label);
    }

    /// Add a contact, overwriting any contact with the same id.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownLabel`] when the contact references a
    /// label id not registered here. The set is not mutated on error;
    /// stale or foreign label ids are caught before they can spread.
    pub fn add_contact(&mut self, contact: Contact) -> Result<(), CoreError> {
        if let Some(&label_id) = contact
            .label_ids()
            .iter()
            .find(|id| !self.labels.contains_key(id))
        {
            return Err(CoreError::UnknownLabel {
                contact_id: contact.contact_id(),
                label_id,
            });
        }
        self.contacts.insert(contact.contact_id(), contact);
        Ok(())
    }

    /// Add several contacts. Fails on the first invalid one; contacts before
    /// it remain added.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError`] from the first failing [`Self::add_contact`].
    pub fn add_contacts(&mut self, contacts: impl IntoIterator<Item = Contact>) -> Result<(), CoreError> {
        for contact in contacts {
            self.add_contact(contact)?;
        }
        Ok(())
    }

    /// Remove a contact by id.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownContact`] when the id is not present.
    pub fn remove_contact(&mut self, contact_id: u32) -> Result<Contact, CoreError> {
        self.contacts
            .remove(&contact_id)
            .ok_or(CoreError::UnknownContact(contact_id))
    }

    /// Remove several contacts by id.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownContact`] for the first missing id; ids
    /// before it are removed.
    pub fn remove_contacts(
        &mut self,
        contact_ids: impl IntoIterator<Item = u32>,
    ) -> Result<(), CoreError> {
        for contact_id in contact_ids {
            self.remove_contact(contact_id)?;
        }
        Ok(())
    }

    #[must_use]
    pub fn contact_by_id(&self, contact_id: u32) -> Option<&Contact> {
        self.contacts.get(&contact_id)
    }

    #[must_use]
    pub fn label_by_id(&self, label_id: u64) -> Option<&ContactLabel> {
        self.labels.get(&label_id)
    }

    /// Case-insensitive label lookup by name.
    #[must_use]
    pub fn label_by_name(&self, name: &str) -> Option<&ContactLabel> {
        self.labels.values().find(|label| label.matches_name(name))
    }

    /// All contacts, ascending by contact id.
    pub fn contacts(&self) -> impl Iterator<Item = &Contact> {
        self.contacts.values()
    }

    /// All labels, ascending by label id.
    pub fn labels(&self) -> impl Iterator<Item = &ContactLabel> {
        self.labels.values()
    }

    /// All contact ids, ascending.
    pub fn contact_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.contacts.keys().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    /// Diff this snapshot (old) against `other` (new).
    ///
    /// Classification is by id-set membership first: an id present on only
    /// one side is added/removed regardless of values; an id present on both
    /// sides is changed iff the two values differ in any field, and the
    /// reported contact is the `other` (new) version.
    #[must_use]
    pub fn difference(&self, other: &Self) -> ContactsDiff {
        let mut diff = ContactsDiff::default();
        for (contact_id, contact) in &other.contacts {
            match self.contacts.get(contact_id) {
                None => diff.added.push(contact.clone()),
                Some(current) if current != contact => diff.changed.push(contact.clone()),
                Some(_) => {}
            }
        }
        for (contact_id, contact) in &self.contacts {
            if !other.contacts.contains_key(contact_id) {
                diff.removed.push(contact.clone());
            }
        }
        diff
    }

    /// Deterministic content fingerprint over the sorted contact list.
    ///
    /// Labels are excluded: label ids are not stable across fetches and the
    /// fingerprint must answer "did the contacts change", nothing else. The
    /// remote read path is cache-delayed by several minutes, so this hash is
    /// what lets a pass skip writes without a post-write verification read.
    #[must_use]
    pub fn version_hash(&self) -> String {
        let records: Vec<ContactRecord> =
            self.contacts.values().map(Contact::to_record).collect();
        let canonical = serde_json::to_vec(&records).expect("contact records serialize");
        hex::encode(Sha256::digest(canonical))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::contact::EntityCategory;

    use super::*;

    fn contact(id: u32, standing: f64) -> Contact {
        Contact::new(id, EntityCategory::Character, standing, []).unwrap()
    }

    fn set_of(contacts: &[Contact]) -> ContactSet {
        let mut set = ContactSet::new();
        set.add_contacts(contacts.iter().cloned()).unwrap();
        set
    }

    #[test]
    fn difference_classifies_added_and_removed_by_id() {
        let c1 = contact(1, 5.0);
        let c2 = contact(2, 5.0);
        let c3 = contact(3, 5.0);
        let a = set_of(&[c1.clone(), c2.clone()]);
        let b = set_of(&[c1, c3.clone()]);

        let diff = a.difference(&b);
        assert_eq!(diff.added, vec![c3]);
        assert_eq!(diff.removed, vec![c2]);
        assert_eq!(diff.changed, vec![]);
    }

    #[test]
    fn difference_reports_new_version_of_changed_contacts() {
        let old = contact(4, 5.0);
        let new = contact(4, -10.0);
        let a = set_of(&[old]);
        let b = set_of(&[new.clone()]);

        let diff = a.difference(&b);
        assert_eq!(diff.added, vec![]);
        assert_eq!(diff.removed, vec![]);
        assert_eq!(diff.changed, vec![new]);
    }

    #[test]
    fn difference_detects_label_only_changes() {
        let mut a = ContactSet::new();
        a.add_label(ContactLabel::new(1, "STANDINGS".into()));
        a.add_contact(
            Contact::new(5, EntityCategory::Corporation, 5.0, []).unwrap(),
        )
        .unwrap();

        let mut b = ContactSet::new();
        b.add_label(ContactLabel::new(1, "STANDINGS".into()));
        let labeled = Contact::new(5, EntityCategory::Corporation, 5.0, [1]).unwrap();
        b.add_contact(labeled.clone()).unwrap();

        let diff = a.difference(&b);
        assert_eq!(diff.changed, vec![labeled]);
    }

    #[test]
    fn identical_sets_have_empty_difference() {
        let a = set_of(&[contact(1, 5.0), contact(2, -5.0)]);
        let b = a.clone();
        assert!(a.difference(&b).is_empty());
    }

    #[test]
    fn add_contact_rejects_unregistered_label_without_mutating() {
        let mut set = set_of(&[contact(1, 5.0)]);
        let bad = Contact::new(2, EntityCategory::Character, 5.0, [99]).unwrap();

        let err = set.add_contact(bad).unwrap_err();
        assert_eq!(
            err,
            CoreError::UnknownLabel {
                contact_id: 2,
                label_id: 99
            }
        );
        assert_eq!(set.len(), 1);
        assert!(set.contact_by_id(2).is_none());
    }

    #[test]
    fn add_contact_overwrites_same_id() {
        let mut set = set_of(&[contact(1, 5.0)]);
        set.add_contact(contact(1, -5.0)).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.contact_by_id(1).unwrap().standing(), -5.0);
    }

    #[test]
    fn remove_contact_errors_on_missing_id() {
        let mut set = set_of(&[contact(1, 5.0)]);
        assert_eq!(
            set.remove_contact(9).unwrap_err(),
            CoreError::UnknownContact(9)
        );
    }

    #[test]
    fn label_lookup_by_name_folds_case() {
        let mut set = ContactSet::new();
        set.add_label(ContactLabel::new(3, "organization".into()));

        assert_eq!(set.label_by_name("ORGANIZATION").unwrap().id(), 3);
        assert!(set.label_by_name("missing").is_none());
    }

    #[test]
    fn clone_is_independent_of_original() {
        let mut original = set_of(&[contact(1, 5.0)]);
        let mut cloned = original.clone();

        cloned.add_contact(contact(2, 5.0)).unwrap();
        cloned.remove_contact(1).unwrap();

        assert_eq!(original.len(), 1);
        assert!(original.contact_by_id(1).is_some());
        original.add_contact(contact(3, 1.0)).unwrap();
        assert!(cloned.contact_by_id(3).is_none());
    }

    #[test]
    fn version_hash_is_stable_and_ignores_labels() {
        let mut a = set_of(&[contact(1, 5.0), contact(2, -5.0)]);
        let b = set_of(&[contact(2, -5.0), contact(1, 5.0)]);
        assert_eq!(a.version_hash(), b.version_hash());

        a.add_label(ContactLabel::new(7, "STANDINGS".into()));
        assert_eq!(a.version_hash(), b.version_hash());
    }

    #[test]
    fn version_hash_changes_with_contact_values() {
        let a = set_of(&[contact(1, 5.0)]);
        let b = set_of(&[contact(1, 5.5)]);
        assert_ne!(a.version_hash(), b.version_hash());
    }

    #[test]
    fn from_records_registers_labels_before_contacts() {
        let contacts = vec![ContactRecord {
            contact_id: 1001,
            contact_type: EntityCategory::Character,
            standing: 9.9,
            label_ids: Some(vec![5]),
        }];
        let labels = vec![LabelRecord {
            label_id: 5,
            label_name: "STANDINGS".into(),
        }];

        let set = ContactSet::from_records(&contacts, &labels).unwrap();
        assert!(set.contact_by_id(1001).unwrap().has_label(5));
        assert_eq!(set.label_by_id(5).unwrap().name(), "STANDINGS");
    }
}
