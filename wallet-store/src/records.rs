//! Persisted account record types.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Stable, unique identifier of a stored account record.
///
/// The id format is decided by the caller (the wallet derives deterministic
/// ids for test-vector accounts and randomized ids for created accounts);
/// the store only requires uniqueness.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Creates an `AccountId` from its string form.
    #[must_use]
    pub const fn new(id: String) -> Self {
        Self(id)
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the id, returning the inner string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({})", self.0)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

/// Which derivation scheme reconstructs a usable account from a record.
///
/// The kind is a tagged variant rather than a bare string so that dispatch
/// on it is exhaustive: a test-vector record always carries its vector
/// index, a created record never does.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AccountKind {
    /// Derived from a fixed, externally supplied test vector.
    #[serde(rename = "test")]
    TestVector {
        /// Position of the vector in the fixed list.
        index: u32,
    },
    /// Freshly generated with random key material and deployed on demand.
    Created,
}

impl AccountKind {
    /// Returns the payload-free discriminant of this kind.
    #[must_use]
    pub const fn tag(&self) -> AccountKindTag {
        match self {
            Self::TestVector { .. } => AccountKindTag::TestVector,
            Self::Created => AccountKindTag::Created,
        }
    }

    /// Returns the test-vector index, if this is a test-vector kind.
    #[must_use]
    pub const fn test_index(&self) -> Option<u32> {
        match self {
            Self::TestVector { index } => Some(*index),
            Self::Created => None,
        }
    }
}

/// Payload-free account kind discriminant.
///
/// Used to filter [`AccountStore::list_by_kind`](crate::AccountStore) and as
/// the at-rest `kind` column value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString)]
pub enum AccountKindTag {
    /// Test-vector accounts.
    #[strum(serialize = "test")]
    TestVector,
    /// Created accounts.
    #[strum(serialize = "created")]
    Created,
}

/// The persisted unit of identity.
///
/// Key material is stored in its at-rest hex form; this crate never decodes
/// it. Records are written once and replaced whole, never partially updated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    /// Primary key.
    pub id: AccountId,
    /// Canonical textual on-chain address; unique across all records.
    pub address: String,
    /// Hex-encoded signing secret.
    pub signing_key: String,
    /// Hex-encoded master secret, distinct from the signing key.
    pub secret_key: String,
    /// Hex-encoded derivation salt.
    pub salt: String,
    /// Which derivation scheme reconstructs this account.
    #[serde(flatten)]
    pub kind: AccountKind,
    /// Creation time in milliseconds; used for display ordering only.
    pub created_at: u64,
}
