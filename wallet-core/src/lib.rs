//! Embedded wallet for privacy-preserving execution services.
//!
//! The wallet manages private keypairs for two fixed account kinds, persists
//! their records through [`wallet_store`], and mediates all signed
//! interactions with a remote execution service that proves, simulates, and
//! submits them. It never interprets contract semantics: it holds and
//! derives signing material, persists and retrieves account records, and
//! forwards prepared interactions.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use wallet_core::{client::HttpExecutionService, EmbeddedWallet, WalletConfig};
//!
//! let config = WalletConfig::new("http://localhost:8080", "wallet.db3");
//! let service = Arc::new(HttpExecutionService::new(&config.node_url));
//! let wallet = EmbeddedWallet::new(config, service);
//! wallet.initialize().await?;
//! let account = wallet.connect_test_account(0).await?;
//! println!("connected {}", account.address());
//! ```

pub mod accounts;
pub mod client;
pub mod defaults;

mod config;
mod error;
mod types;
mod wallet;

pub use config::{StorageLocation, WalletConfig};
pub use error::{WalletError, WalletResult};
pub use types::{Address, Salt, Secret, SigningKeyBytes};
pub use wallet::EmbeddedWallet;
