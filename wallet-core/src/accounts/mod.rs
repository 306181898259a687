//! Account key material: handles, derivation, and the fixed test vectors.
//!
//! Two account kinds exist, each bound to its own signature scheme. The
//! derivation functions here turn either a fixed test vector or fresh
//! randomness into an [`AccountHandle`], and reconstruct the same handle
//! from a persisted [`wallet_store::AccountRecord`] later.

use std::time::{SystemTime, UNIX_EPOCH};

use uuid::Uuid;
use wallet_store::AccountId;

pub mod derivation;
mod handle;
mod test_vectors;

pub use handle::{AccountHandle, SignatureScheme};
pub use test_vectors::{initial_test_accounts, TestAccountVector};

/// Returns the deterministic record id for the test vector at `index`.
#[must_use]
pub fn test_account_id(index: u32) -> AccountId {
    AccountId::new(format!("test_{index}"))
}

/// Returns a fresh randomized record id for a created account.
#[must_use]
pub fn created_account_id(created_at: u64) -> AccountId {
    let mut suffix = Uuid::new_v4().simple().to_string();
    suffix.truncate(9);
    AccountId::new(format!("created_{created_at}_{suffix}"))
}

/// Current wall-clock time in milliseconds since the Unix epoch.
///
/// Used only for record ids and display ordering, never for identity.
#[must_use]
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|elapsed| u64::try_from(elapsed.as_millis()).ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_test_account_id_is_deterministic() {
        assert_eq!(test_account_id(0).as_str(), "test_0");
        assert_eq!(test_account_id(7).as_str(), "test_7");
    }

    #[test]
    fn test_created_account_ids_are_unique() {
        let a = created_account_id(1_000);
        let b = created_account_id(1_000);
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("created_1000_"));
    }
}
