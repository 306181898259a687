//! Client-side boundary to the remote execution service.
//!
//! The wallet depends only on the [`ExecutionService`] trait: the service
//! proves, simulates, and submits interactions, and registers accounts and
//! contract instances so they can be proved against locally. Two
//! implementations ship with the crate: [`HttpExecutionService`] for a real
//! node and [`MemoryExecutionService`] as an in-process stand-in for
//! development and tests.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

mod http;
mod memory;
mod types;

pub use http::HttpExecutionService;
pub use memory::MemoryExecutionService;
pub use types::{
    AccountRegistration, ContractArtifact, ContractCall, ContractInstance,
    DeploymentParams, FeePayment, NodeInfo, ProveRequest, ProvenTransaction,
    SimulateRequest, TxHash, TxReceipt, TxStatus,
};

/// Result type for execution service operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors raised at the execution service boundary.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network connection error with details.
    #[error("network_error {url}: {error}")]
    Network {
        /// The request URL.
        url: String,
        /// HTTP status, when a response was received.
        status: Option<u16>,
        /// Failure details.
        error: String,
    },

    /// HTTP request failure.
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    /// The account (or scheme instance) is already registered with the
    /// service. Recoverable: registration is idempotent from the wallet's
    /// point of view.
    #[error("already_registered")]
    AlreadyRegistered,

    /// The service failed to prove the interaction.
    #[error("proving_failed: {0}")]
    Proving(String),

    /// The bounded wait for on-chain inclusion elapsed. The outcome is
    /// unknown: the transaction may still land.
    #[error("inclusion_timeout: transaction {tx_hash} not seen within {waited_secs}s")]
    InclusionTimeout {
        /// Hash of the transaction whose inclusion was awaited.
        tx_hash: String,
        /// How long the wait was, in seconds.
        waited_secs: u64,
    },

    /// The service returned a payload the client could not interpret.
    #[error("invalid_response: {0}")]
    InvalidResponse(String),
}

/// The remote service that proves, simulates, and submits interactions.
///
/// All methods are suspension points; local store operations never are.
/// Implementations must be safe to share across concurrent callers: the
/// wallet issues independent `simulate` calls against one connection.
#[async_trait]
pub trait ExecutionService: Send + Sync {
    /// Returns version and chain information for the connected node.
    async fn node_info(&self) -> ClientResult<NodeInfo>;

    /// Registers a contract instance so subsequent interactions with it can
    /// be proved and simulated locally. Re-registering the same instance is
    /// an upsert, not an error.
    async fn register_contract(
        &self,
        instance: &ContractInstance,
        artifact: &ContractArtifact,
    ) -> ClientResult<()>;

    /// Registers an account with the service.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::AlreadyRegistered`] when the account is known
    /// already; callers are expected to treat that case as success.
    async fn register_account(
        &self,
        registration: &AccountRegistration,
    ) -> ClientResult<()>;

    /// Proves an interaction, returning the proven transaction ready to send.
    async fn prove(&self, request: &ProveRequest) -> ClientResult<ProvenTransaction>;

    /// Submits a proven transaction, returning its hash.
    async fn send(&self, transaction: &ProvenTransaction) -> ClientResult<TxHash>;

    /// Waits for the transaction to be included on-chain, up to `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InclusionTimeout`] when the bound elapses;
    /// this means "unknown outcome", not "definitely failed".
    async fn wait_for_inclusion(
        &self,
        tx_hash: &TxHash,
        timeout: Duration,
    ) -> ClientResult<TxReceipt>;

    /// Executes the interaction read-only against current state and returns
    /// the decoded result. No fee handling, no submission.
    async fn simulate(&self, request: &SimulateRequest) -> ClientResult<serde_json::Value>;
}
