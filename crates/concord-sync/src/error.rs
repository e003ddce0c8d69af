//! Sync error types.

use thiserror::Error;

/// Errors that can end a reconciliation pass in the `Failed` state.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A snapshot or contact failed domain validation.
    #[error(transparent)]
    Core(#[from] concord_core::CoreError),

    /// The remote gateway failed after exhausting its retry budget.
    #[error(transparent)]
    Gateway(#[from] concord_esi::EsiError),
}
