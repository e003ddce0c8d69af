//! # concord-esi
//!
//! The remote gateway: an HTTP client for the ESI character contacts
//! endpoints, wrapped in bounded retry with exponential backoff.
//!
//! - [`ContactsGateway`]: the trait the reconciliation driver depends on.
//! - [`EsiClient`]: the production implementation over reqwest.
//! - [`retry`]: the backoff policy shared by all remote calls.
//!
//! Failure semantics: 429 and 5xx responses (and transport timeouts) are
//! retried up to the attempt budget; any other 4xx propagates immediately.
//! Write calls verify that the remote accepted every requested id and fail
//! with [`EsiError::IncompleteWrite`] otherwise.

mod client;
mod error;
mod gateway;
mod http;
pub mod retry;

pub use client::EsiClient;
pub use error::EsiError;
pub use gateway::{ContactsGateway, Credential};
pub use retry::{RetryPolicy, retry_call};
