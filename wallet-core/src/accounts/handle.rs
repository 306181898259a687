//! In-memory account handles capable of authorizing interactions.

use std::fmt;

use ed25519_dalek::Signer as _;
use serde::{Deserialize, Serialize};
use strum::Display;
use wallet_store::{AccountId, AccountKind, AccountRecord};

use crate::client::AccountRegistration;
use crate::error::{WalletError, WalletResult};
use crate::types::{Address, Salt, Secret, SigningKeyBytes};

use super::derivation;

/// Signature scheme recognized by the execution service.
///
/// The two account kinds use different schemes and are not interchangeable:
/// test-vector accounts sign with the Schnorr-family scheme, created
/// accounts with recoverable ECDSA.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SignatureScheme {
    /// Ed25519 (Schnorr family), used by test-vector accounts.
    Schnorr,
    /// Recoverable secp256k1 ECDSA, used by created accounts.
    EcdsaR,
}

impl SignatureScheme {
    /// Returns the scheme an account of the given kind signs with.
    #[must_use]
    pub const fn for_kind(kind: AccountKind) -> Self {
        match kind {
            AccountKind::TestVector { .. } => Self::Schnorr,
            AccountKind::Created => Self::EcdsaR,
        }
    }
}

/// An in-memory account able to sign on behalf of one address.
///
/// Handles are produced by the derivation functions in
/// [`derivation`](super::derivation) and destroyed or replaced whenever a
/// different account is connected or the wallet resets. Only the handle's
/// record is ever persisted.
#[derive(Clone)]
pub struct AccountHandle {
    address: Address,
    kind: AccountKind,
    secret: Secret,
    signing_key: SigningKeyBytes,
    salt: Salt,
}

impl AccountHandle {
    pub(crate) const fn new(
        address: Address,
        kind: AccountKind,
        secret: Secret,
        signing_key: SigningKeyBytes,
        salt: Salt,
    ) -> Self {
        Self {
            address,
            kind,
            secret,
            signing_key,
            salt,
        }
    }

    /// The address this handle signs for.
    #[must_use]
    pub const fn address(&self) -> &Address {
        &self.address
    }

    /// The account kind this handle was derived from.
    #[must_use]
    pub const fn kind(&self) -> AccountKind {
        self.kind
    }

    /// The signature scheme this handle signs with, fixed by its kind.
    #[must_use]
    pub const fn scheme(&self) -> SignatureScheme {
        SignatureScheme::for_kind(self.kind)
    }

    /// The derivation salt.
    #[must_use]
    pub const fn salt(&self) -> &Salt {
        &self.salt
    }

    /// Signs `message`, producing a signature the execution service
    /// recognizes for this handle's scheme.
    ///
    /// # Errors
    ///
    /// Returns [`WalletError::InvalidKeyMaterial`] if the key bytes are not
    /// a valid key for the scheme.
    pub fn sign(&self, message: &[u8]) -> WalletResult<Vec<u8>> {
        match self.scheme() {
            SignatureScheme::Schnorr => {
                let key = ed25519_dalek::SigningKey::from_bytes(self.signing_key.as_bytes());
                Ok(key.sign(message).to_bytes().to_vec())
            }
            SignatureScheme::EcdsaR => {
                let key = k256::ecdsa::SigningKey::from_slice(self.signing_key.as_bytes())
                    .map_err(|err| WalletError::InvalidKeyMaterial(err.to_string()))?;
                let signature: k256::ecdsa::Signature = key.sign(message);
                Ok(signature.to_bytes().to_vec())
            }
        }
    }

    /// Builds the registration payload for the execution service.
    ///
    /// # Errors
    ///
    /// Returns [`WalletError::InvalidKeyMaterial`] if the key bytes are not
    /// a valid key for the scheme.
    pub fn registration(&self) -> WalletResult<AccountRegistration> {
        let public_key = derivation::verifying_key_bytes(self.scheme(), &self.signing_key)?;
        Ok(AccountRegistration {
            scheme: self.scheme(),
            address: self.address,
            public_key: format!("0x{}", hex::encode(public_key)),
            secret_key: self.secret.to_hex(),
            salt: self.salt.to_hex(),
        })
    }

    /// Materializes the persistable record for this handle.
    ///
    /// The record carries everything needed to reconstruct the handle later;
    /// the connected handle itself is never persisted.
    #[must_use]
    pub fn to_record(&self, id: AccountId, created_at: u64) -> AccountRecord {
        AccountRecord {
            id,
            address: self.address.to_hex(),
            signing_key: self.signing_key.to_hex(),
            secret_key: self.secret.to_hex(),
            salt: self.salt.to_hex(),
            kind: self.kind,
            created_at,
        }
    }

}

impl fmt::Debug for AccountHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountHandle")
            .field("address", &self.address)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}
