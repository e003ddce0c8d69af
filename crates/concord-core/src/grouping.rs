//! Grouping and batching of contacts for the remote write API.
//!
//! The write API accepts exactly one standing value and one label-id set per
//! call, with a bounded number of target ids. Contacts therefore get
//! partitioned by the pair (label set, standing) and each partition chunked.
//! Ordering is deterministic throughout (label sets ascending, standings
//! ascending, ids ascending) so identical inputs always produce identical
//! call sequences.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use crate::contact::Contact;

/// `f64` standing usable as an ordered map key.
///
/// Standings are validated finite at construction, so `total_cmp` gives a
/// plain numeric order here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StandingKey(f64);

impl StandingKey {
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }
}

impl From<f64> for StandingKey {
    fn from(standing: f64) -> Self {
        Self(standing)
    }
}

impl Eq for StandingKey {}

impl PartialOrd for StandingKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for StandingKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// One remote write call: a bounded id list sharing one standing and one
/// label set.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactBatch {
    pub label_ids: BTreeSet<u64>,
    pub standing: f64,
    /// Ascending, at most the batch limit passed to [`batch_contacts`].
    pub contact_ids: Vec<u32>,
}

/// Partition contacts by (label set, standing).
///
/// Unlabeled contacts group under the empty label set; two contacts with the
/// same labels and standing always land in the same partition.
pub fn group_contacts<'a>(
    contacts: impl IntoIterator<Item = &'a Contact>,
) -> BTreeMap<BTreeSet<u64>, BTreeMap<StandingKey, BTreeSet<u32>>> {
    let mut groups: BTreeMap<BTreeSet<u64>, BTreeMap<StandingKey, BTreeSet<u32>>> =
        BTreeMap::new();
    for contact in contacts {
        groups
            .entry(contact.label_ids().clone())
            .or_default()
            .entry(contact.standing().into())
            .or_default()
            .insert(contact.contact_id());
    }
    groups
}

/// Partition and chunk contacts into remote write calls.
///
/// `max_batch` is the remote-imposed per-call id limit (100 for writes).
/// Output order is fully deterministic.
pub fn batch_contacts<'a>(
    contacts: impl IntoIterator<Item = &'a Contact>,
    max_batch: usize,
) -> Vec<ContactBatch> {
    let mut batches = Vec::new();
    for (label_ids, by_standing) in group_contacts(contacts) {
        for (standing, contact_ids) in by_standing {
            let sorted: Vec<u32> = contact_ids.into_iter().collect();
            for chunk in sorted.chunks(max_batch.max(1)) {
                batches.push(ContactBatch {
                    label_ids: label_ids.clone(),
                    standing: standing.value(),
                    contact_ids: chunk.to_vec(),
                });
            }
        }
    }
    batches
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::contact::EntityCategory;

    use super::*;

    fn contact(id: u32, standing: f64, label_ids: &[u64]) -> Contact {
        Contact::new(
            id,
            EntityCategory::Character,
            standing,
            label_ids.iter().copied(),
        )
        .unwrap()
    }

    #[test]
    fn groups_by_label_set_and_standing() {
        let contacts = vec![
            contact(1, 5.0, &[1]),
            contact(2, 5.0, &[1]),
            contact(3, 5.0, &[1, 2]),
            contact(4, -5.0, &[1]),
        ];

        let groups = group_contacts(&contacts);
        assert_eq!(groups.len(), 2);

        let single = &groups[&BTreeSet::from([1])];
        assert_eq!(single[&StandingKey::from(5.0)], BTreeSet::from([1, 2]));
        assert_eq!(single[&StandingKey::from(-5.0)], BTreeSet::from([4]));

        let double = &groups[&BTreeSet::from([1, 2])];
        assert_eq!(double[&StandingKey::from(5.0)], BTreeSet::from([3]));
    }

    #[test]
    fn unlabeled_contacts_merge_under_empty_label_set() {
        let contacts = vec![
            contact(10, 5.0, &[1]),
            contact(11, 5.0, &[1, 2]),
            contact(12, 2.5, &[]),
            contact(13, 2.5, &[]),
        ];

        let batches = batch_contacts(&contacts, 100);
        let unlabeled: Vec<&ContactBatch> = batches
            .iter()
            .filter(|b| b.label_ids.is_empty())
            .collect();
        assert_eq!(unlabeled.len(), 1);
        assert_eq!(unlabeled[0].standing, 2.5);
        assert_eq!(unlabeled[0].contact_ids, vec![12, 13]);
    }

    #[test]
    fn batching_is_deterministic() {
        let contacts = vec![
            contact(3, 5.0, &[1]),
            contact(1, 5.0, &[1]),
            contact(4, 5.0, &[1, 2]),
            contact(2, -2.0, &[]),
        ];

        let first = batch_contacts(&contacts, 100);
        let second = batch_contacts(&contacts, 100);
        assert_eq!(first, second);

        // ids sorted ascending inside a batch regardless of input order
        let labeled = first
            .iter()
            .find(|b| b.label_ids == BTreeSet::from([1]))
            .unwrap();
        assert_eq!(labeled.contact_ids, vec![1, 3]);
    }

    #[test]
    fn chunks_respect_max_batch_size() {
        let contacts: Vec<Contact> =
            (1..=250).map(|id| contact(id, 5.0, &[])).collect();

        let batches = batch_contacts(&contacts, 100);
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].contact_ids.len(), 100);
        assert_eq!(batches[1].contact_ids.len(), 100);
        assert_eq!(batches[2].contact_ids.len(), 50);
        assert_eq!(batches[0].contact_ids[0], 1);
        assert_eq!(batches[2].contact_ids[49], 250);
    }

    #[test]
    fn standings_order_ascending_within_a_label_set() {
        let contacts = vec![
            contact(1, 10.0, &[]),
            contact(2, -10.0, &[]),
            contact(3, 0.0, &[]),
        ];

        let batches = batch_contacts(&contacts, 100);
        let standings: Vec<f64> = batches.iter().map(|b| b.standing).collect();
        assert_eq!(standings, vec![-10.0, 0.0, 10.0]);
    }
}
