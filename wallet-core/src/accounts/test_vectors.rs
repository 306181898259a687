//! The fixed list of deterministic test-vector accounts.
//!
//! Development deployments ship a small set of pre-funded, repeatable
//! accounts. The list is ordered and its length is authoritative for index
//! validation; the wallet accepts an alternative list at construction.

use sha2::{Digest, Sha256};

use crate::types::{Address, Salt, Secret, SigningKeyBytes};

use super::derivation;

/// Label for expanding the fixed test-vector material.
const LABEL_TEST_VECTOR: &[u8] = b"embedded-wallet:test-vector";

/// Number of vectors in the built-in list.
const INITIAL_TEST_ACCOUNT_COUNT: u32 = 3;

/// One deterministic test-vector descriptor.
///
/// Exposes the raw key material plus the derived address; the same vector
/// always produces the same account.
#[derive(Clone, Debug)]
pub struct TestAccountVector {
    /// Master secret.
    pub secret: Secret,
    /// Schnorr-scheme signing key.
    pub signing_key: SigningKeyBytes,
    /// Derivation salt.
    pub salt: Salt,
}

impl TestAccountVector {
    /// The address this vector derives to.
    #[must_use]
    pub fn address(&self) -> Address {
        let verifying_key = derivation::schnorr_verifying_key(&self.signing_key);
        derivation::derive_address(
            super::SignatureScheme::Schnorr,
            &self.secret,
            &verifying_key,
            &self.salt,
        )
    }
}

/// Returns the built-in ordered list of test-vector accounts.
///
/// The material is expanded from fixed labels, so every build and every
/// call sees the same vectors.
#[must_use]
pub fn initial_test_accounts() -> Vec<TestAccountVector> {
    (0..INITIAL_TEST_ACCOUNT_COUNT)
        .map(|index| TestAccountVector {
            secret: Secret::new(vector_material("secret", index)),
            signing_key: SigningKeyBytes::new(vector_material("signing-key", index)),
            salt: Salt::new(vector_material("salt", index)),
        })
        .collect()
}

fn vector_material(role: &str, index: u32) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(LABEL_TEST_VECTOR);
    hasher.update(role.as_bytes());
    hasher.update(index.to_le_bytes());
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_is_stable() {
        let a = initial_test_accounts();
        let b = initial_test_accounts();
        assert_eq!(a.len(), 3);
        for (left, right) in a.iter().zip(&b) {
            assert_eq!(left.address(), right.address());
        }
    }

    #[test]
    fn test_vectors_are_distinct() {
        let vectors = initial_test_accounts();
        assert_ne!(vectors[0].address(), vectors[1].address());
        assert_ne!(vectors[1].address(), vectors[2].address());
    }
}
