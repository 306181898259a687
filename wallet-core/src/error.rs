//! Error outputs from the embedded wallet.

use thiserror::Error;

use crate::client::ClientError;

/// Result type for wallet operations.
pub type WalletResult<T> = Result<T, WalletError>;

/// Errors surfaced by the embedded wallet.
#[derive(Debug, Error)]
pub enum WalletError {
    /// An operation was invoked before `initialize()` completed.
    #[error("wallet not initialized")]
    NotInitialized,

    /// Initialization failed; the instance is permanently unusable and a
    /// fresh wallet must be constructed.
    #[error("wallet initialization failed; construct a fresh instance")]
    InitializationFailed,

    /// The underlying account record store failed.
    #[error(transparent)]
    Store(#[from] wallet_store::StoreError),

    /// An explicitly named stored account does not exist.
    #[error("account `{id}` not found")]
    AccountNotFound {
        /// The id that was looked up.
        id: String,
    },

    /// A test-vector index outside the fixed list was requested.
    #[error("test account index {index} out of range ({len} vectors available)")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// Length of the fixed test-vector list.
        len: usize,
    },

    /// The operation requires a connected account and none is connected.
    #[error("no account connected")]
    NoConnectedAccount,

    /// Stored key material could not be decoded or is invalid for the
    /// record's signature scheme. Reconstruction fails closed rather than
    /// producing a wrong identity.
    #[error("invalid key material: {0}")]
    InvalidKeyMaterial(String),

    /// Re-derivation from stored key material produced a different address
    /// than the record claims. This is a corruption signal.
    #[error("reconstructed address {derived} does not match stored address {stored}")]
    AddressMismatch {
        /// The address stored on the record.
        stored: String,
        /// The address re-derived from the record's key material.
        derived: String,
    },

    /// Unexpected error serializing information.
    #[error("serialization_error: {0}")]
    Serialization(String),

    /// A failure from the execution service (network, proving, inclusion
    /// timeout), surfaced verbatim with no retry.
    #[error(transparent)]
    Client(#[from] ClientError),
}
