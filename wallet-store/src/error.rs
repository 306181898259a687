//! Error types for the account record store.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by the account record store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The underlying database could not be opened or the environment denied
    /// storage access.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// A read against the database failed.
    #[error("storage query failed: {0}")]
    Query(String),

    /// A write against the database failed.
    #[error("storage write failed: {0}")]
    Write(String),

    /// A write would have stored a second record with an address that is
    /// already held by a different record. The write is rejected with no
    /// state change.
    #[error("duplicate address: {address}")]
    DuplicateAddress {
        /// The address both records claim.
        address: String,
    },

    /// A persisted row violates a store invariant (e.g. its kind column and
    /// test index column disagree). This is a corruption signal, not a
    /// normal state.
    #[error("store corrupted: {0}")]
    Corrupted(String),
}
