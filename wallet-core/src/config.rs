//! Wallet configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::defaults;

/// Where the account record store keeps its database.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StorageLocation {
    /// A database file on disk.
    OnDisk(PathBuf),
    /// A process-lifetime in-memory database (development and tests).
    InMemory,
}

/// Configuration for one [`EmbeddedWallet`](crate::EmbeddedWallet) instance.
#[derive(Clone, Debug)]
pub struct WalletConfig {
    /// URL of the execution service node.
    pub node_url: String,
    /// Where account records are persisted.
    pub storage: StorageLocation,
    /// Whether the service should produce real proofs (disabled in some
    /// development setups for speed).
    pub prover_enabled: bool,
    /// Upper bound on waits for on-chain inclusion of deployments and sends.
    pub inclusion_timeout: Duration,
}

impl WalletConfig {
    /// Creates a configuration persisting to the database file at `db_path`.
    #[must_use]
    pub fn new(node_url: impl Into<String>, db_path: impl Into<PathBuf>) -> Self {
        Self {
            node_url: node_url.into(),
            storage: StorageLocation::OnDisk(db_path.into()),
            prover_enabled: true,
            inclusion_timeout: defaults::INCLUSION_TIMEOUT,
        }
    }

    /// Creates a configuration backed by an in-memory store.
    #[must_use]
    pub fn in_memory(node_url: impl Into<String>) -> Self {
        Self {
            node_url: node_url.into(),
            storage: StorageLocation::InMemory,
            prover_enabled: true,
            inclusion_timeout: defaults::INCLUSION_TIMEOUT,
        }
    }
}
