//! Key derivation for wallet accounts.
//!
//! Addresses are derived with domain-separated SHA-256 over the account's
//! key material, one label per signature scheme, so the two schemes can
//! never collide:
//!
//! ```text
//! address = SHA256(label || secret || verifying_key || salt)
//! ```

use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use wallet_store::{AccountKind, AccountRecord};

use crate::error::{WalletError, WalletResult};
use crate::types::{Address, Salt, Secret, SigningKeyBytes};

use super::handle::{AccountHandle, SignatureScheme};
use super::test_vectors::TestAccountVector;

/// Label for deriving Schnorr-scheme account addresses.
const LABEL_SCHNORR_ADDRESS: &[u8] = b"embedded-wallet:schnorr-address";

/// Label for deriving ECDSA-scheme account addresses.
const LABEL_ECDSA_ADDRESS: &[u8] = b"embedded-wallet:ecdsa-r-address";

/// Derives the account handle for the test vector at `index`.
///
/// Deterministic: the same vector always yields the same address. Used both
/// to connect and to materialize a storable record on first use.
#[must_use]
pub fn derive_from_test_vector(vector: &TestAccountVector, index: u32) -> AccountHandle {
    let verifying_key = schnorr_verifying_key(&vector.signing_key);
    let address = derive_address(
        SignatureScheme::Schnorr,
        &vector.secret,
        &verifying_key,
        &vector.salt,
    );
    AccountHandle::new(
        address,
        AccountKind::TestVector { index },
        vector.secret.clone(),
        vector.signing_key.clone(),
        vector.salt,
    )
}

/// Derives a brand-new account from a cryptographically secure random
/// source. Each call produces a new identity; nothing is reused.
#[must_use]
pub fn derive_fresh() -> AccountHandle {
    let mut secret = [0u8; 32];
    OsRng.fill_bytes(&mut secret);
    let mut salt = [0u8; 32];
    OsRng.fill_bytes(&mut salt);

    // Rejection-sample until the bytes are a valid secp256k1 scalar; the
    // retry probability is negligible.
    let (signing_key, key) = loop {
        let mut candidate = [0u8; 32];
        OsRng.fill_bytes(&mut candidate);
        if let Ok(key) = k256::ecdsa::SigningKey::from_slice(&candidate) {
            break (SigningKeyBytes::new(candidate), key);
        }
    };

    let secret = Secret::new(secret);
    let salt = Salt::new(salt);
    let verifying_key = key.verifying_key().to_encoded_point(true).as_bytes().to_vec();
    let address = derive_address(SignatureScheme::EcdsaR, &secret, &verifying_key, &salt);

    AccountHandle::new(address, AccountKind::Created, secret, signing_key, salt)
}

/// Reconstructs the account handle a record was persisted from.
///
/// Dispatch is exhaustive on `record.kind`; the two schemes are not
/// interchangeable. Key material that does not decode, or that re-derives
/// to a different address than the record claims, fails closed; the
/// function never silently yields a wrong identity.
///
/// # Errors
///
/// Returns [`WalletError::InvalidKeyMaterial`] on undecodable or
/// scheme-invalid material, and [`WalletError::AddressMismatch`] when the
/// re-derived address disagrees with the stored one.
pub fn reconstruct(record: &AccountRecord) -> WalletResult<AccountHandle> {
    let secret = Secret::from_hex(&record.secret_key)
        .map_err(|err| invalid_field("secret_key", &err))?;
    let signing_key = SigningKeyBytes::from_hex(&record.signing_key)
        .map_err(|err| invalid_field("signing_key", &err))?;
    let salt =
        Salt::from_hex(&record.salt).map_err(|err| invalid_field("salt", &err))?;

    let scheme = SignatureScheme::for_kind(record.kind);
    let verifying_key = verifying_key_bytes(scheme, &signing_key)?;
    let derived = derive_address(scheme, &secret, &verifying_key, &salt);

    if derived.to_hex() != record.address {
        return Err(WalletError::AddressMismatch {
            stored: record.address.clone(),
            derived: derived.to_hex(),
        });
    }

    Ok(AccountHandle::new(
        derived,
        record.kind,
        secret,
        signing_key,
        salt,
    ))
}

/// Computes the public verification key for the scheme.
pub(crate) fn verifying_key_bytes(
    scheme: SignatureScheme,
    signing_key: &SigningKeyBytes,
) -> WalletResult<Vec<u8>> {
    match scheme {
        SignatureScheme::Schnorr => Ok(schnorr_verifying_key(signing_key)),
        SignatureScheme::EcdsaR => {
            let key = k256::ecdsa::SigningKey::from_slice(signing_key.as_bytes())
                .map_err(|err| WalletError::InvalidKeyMaterial(err.to_string()))?;
            Ok(key.verifying_key().to_encoded_point(true).as_bytes().to_vec())
        }
    }
}

pub(crate) fn schnorr_verifying_key(signing_key: &SigningKeyBytes) -> Vec<u8> {
    ed25519_dalek::SigningKey::from_bytes(signing_key.as_bytes())
        .verifying_key()
        .to_bytes()
        .to_vec()
}

pub(crate) fn derive_address(
    scheme: SignatureScheme,
    secret: &Secret,
    verifying_key: &[u8],
    salt: &Salt,
) -> Address {
    let label = match scheme {
        SignatureScheme::Schnorr => LABEL_SCHNORR_ADDRESS,
        SignatureScheme::EcdsaR => LABEL_ECDSA_ADDRESS,
    };
    let mut hasher = Sha256::new();
    hasher.update(label);
    hasher.update(secret.as_bytes());
    hasher.update(verifying_key);
    hasher.update(salt.as_bytes());
    Address::new(hasher.finalize().into())
}

fn invalid_field(field: &str, err: &hex::FromHexError) -> WalletError {
    WalletError::InvalidKeyMaterial(format!("{field}: {err}"))
}
