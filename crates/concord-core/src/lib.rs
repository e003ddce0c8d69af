//! # concord-core
//!
//! Pure domain types and algorithms for contact standings synchronization:
//!
//! - [`Contact`] / [`ContactLabel`]: immutable value types mirroring one
//!   remote relationship record and one remote label tag.
//! - [`ContactSet`]: a snapshot of all contacts and labels for one actor,
//!   with set-algebra diffing and a content fingerprint.
//! - [`grouping`]: partitioning and batching of contacts for the remote
//!   write API, which accepts one standing and one label set per call.
//! - [`wire`]: the remote wire records and their (de)serialization rules.
//!
//! This crate performs no I/O. Everything here is deterministic and safe to
//! run inside a diff computation between two snapshots.

pub mod contact;
pub mod contact_set;
pub mod grouping;
pub mod wire;

mod errors;

pub use contact::{Contact, ContactLabel, EntityCategory, MAX_STANDING, MIN_STANDING};
pub use contact_set::{ContactSet, ContactsDiff};
pub use errors::CoreError;
pub use grouping::{ContactBatch, StandingKey, batch_contacts, group_contacts};
pub use wire::{ContactRecord, LabelRecord};
