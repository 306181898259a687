//! Durable account record storage for the embedded wallet.
//!
//! This crate owns one on-device SQLite database with two logical
//! collections: `accounts` (keyed by record id, with a secondary lookup by
//! kind and a uniqueness constraint on address) and `settings` (a single
//! `current_account` entry). It is pure persistence: no key material is ever
//! interpreted here, only stored and returned in its at-rest hex form.

mod error;
mod records;
mod schema;
mod store;

pub use error::{StoreError, StoreResult};
pub use records::{AccountId, AccountKind, AccountKindTag, AccountRecord};
pub use store::AccountStore;
