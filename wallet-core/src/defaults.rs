//! Well-known constants and the sponsored fee contract.

use std::time::Duration;

use crate::client::{ContractArtifact, ContractInstance};
use crate::error::{WalletError, WalletResult};
use crate::types::{Address, Salt};

/// Upper bound on waits for on-chain inclusion.
pub const INCLUSION_TIMEOUT: Duration = Duration::from_secs(120);

/// Well-known deployment salt of the sponsored fee payment contract.
pub const SPONSORED_FEE_SALT: Salt = Salt::from_low_u64(1);

/// The artifact of the well-known sponsored fee payment contract.
#[must_use]
pub fn sponsored_fee_artifact() -> ContractArtifact {
    ContractArtifact {
        name: "SponsoredFeePayment".to_owned(),
        code: serde_json::json!({ "wellKnown": true, "version": 1 }),
    }
}

/// Returns the instance of the sponsored fee payment contract.
///
/// The instance is universally deployed: its address depends only on the
/// fixed artifact and the well-known salt, so every wallet resolves the
/// same paymaster.
///
/// # Errors
/// Returns an error if the fixed artifact cannot be serialized.
pub fn sponsored_fee_contract() -> WalletResult<ContractInstance> {
    ContractInstance::from_deploy_params(
        &sponsored_fee_artifact(),
        &Address::ZERO,
        SPONSORED_FEE_SALT,
        vec![],
    )
    .map_err(|err| WalletError::Serialization(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fee_contract_is_well_known() {
        let a = sponsored_fee_contract().unwrap();
        let b = sponsored_fee_contract().unwrap();
        assert_eq!(a.address, b.address);
        assert_eq!(a.deployer, Address::ZERO);
    }
}
