//! Wire types exchanged with the execution service.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::accounts::SignatureScheme;
use crate::types::{Address, Salt};

/// Label for deriving contract instance addresses.
const LABEL_CONTRACT_INSTANCE: &[u8] = b"embedded-wallet:contract-instance";

/// Label for hashing contract artifacts.
const LABEL_CONTRACT_ARTIFACT: &[u8] = b"embedded-wallet:contract-artifact";

/// Version and chain information reported by the node.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeInfo {
    /// Node software version string.
    pub node_version: String,
    /// Chain the node is connected to.
    pub chain_id: u64,
}

/// A contract artifact: the compiled definition the service proves against.
///
/// The wallet treats the code as opaque; only its name and canonical hash
/// participate in instance derivation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ContractArtifact {
    /// Human-readable artifact name.
    pub name: String,
    /// Opaque compiled representation.
    pub code: serde_json::Value,
}

impl ContractArtifact {
    /// Computes the canonical hash of this artifact.
    ///
    /// # Errors
    /// Returns an error if the opaque code cannot be serialized.
    pub fn hash(&self) -> Result<[u8; 32], serde_json::Error> {
        let code = serde_json::to_vec(&self.code)?;
        let mut hasher = Sha256::new();
        hasher.update(LABEL_CONTRACT_ARTIFACT);
        hasher.update(self.name.as_bytes());
        hasher.update(&code);
        Ok(hasher.finalize().into())
    }
}

/// A deployed (or deployable) contract instance at a deterministic address.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ContractInstance {
    /// The instance address, derived from the deploy parameters.
    pub address: Address,
    /// The deploying address ([`Address::ZERO`] for universal deployments).
    pub deployer: Address,
    /// Deployment salt.
    pub salt: Salt,
    /// Hex form of the artifact hash the instance was derived from.
    pub artifact_hash: String,
    /// Constructor arguments passed at deployment.
    pub init_args: Vec<serde_json::Value>,
}

impl ContractInstance {
    /// Derives the instance for the given deploy parameters.
    ///
    /// The address is deterministic: the same artifact, deployer, salt and
    /// constructor arguments always yield the same instance.
    ///
    /// # Errors
    /// Returns an error if the artifact or arguments cannot be serialized.
    pub fn from_deploy_params(
        artifact: &ContractArtifact,
        deployer: &Address,
        salt: Salt,
        init_args: Vec<serde_json::Value>,
    ) -> Result<Self, serde_json::Error> {
        let artifact_hash = artifact.hash()?;
        let args = serde_json::to_vec(&init_args)?;

        let mut hasher = Sha256::new();
        hasher.update(LABEL_CONTRACT_INSTANCE);
        hasher.update(artifact_hash);
        hasher.update(deployer.as_bytes());
        hasher.update(salt.as_bytes());
        hasher.update(Sha256::digest(&args));
        let address = Address::new(hasher.finalize().into());

        Ok(Self {
            address,
            deployer: *deployer,
            salt,
            artifact_hash: format!("0x{}", hex::encode(artifact_hash)),
            init_args,
        })
    }
}

/// One call against a contract method.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ContractCall {
    /// Address of the contract being called.
    pub contract: Address,
    /// Method name.
    pub method: String,
    /// Encoded arguments.
    pub args: Vec<serde_json::Value>,
}

impl ContractCall {
    /// Builds a call against `contract`.
    #[must_use]
    pub fn new(
        contract: Address,
        method: impl Into<String>,
        args: Vec<serde_json::Value>,
    ) -> Self {
        Self {
            contract,
            method: method.into(),
            args,
        }
    }
}

/// How the transaction fee is paid.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum FeePayment {
    /// Fees are paid by a well-known third-party fee contract rather than
    /// the sending account's own balance.
    Sponsored {
        /// Address of the sponsoring fee contract.
        paymaster: Address,
    },
}

/// Options attached to an account deployment.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeploymentParams {
    /// Salt fixing the deployed contract address.
    pub contract_address_salt: Salt,
    /// Deploy without a deployer identity.
    pub universal_deploy: bool,
    /// Skip registering the contract class.
    pub skip_class_registration: bool,
    /// Skip the public deployment step.
    pub skip_public_deployment: bool,
}

/// A request to prove one interaction.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProveRequest {
    /// The account the interaction is executed as.
    pub from: Address,
    /// The call to prove.
    pub call: ContractCall,
    /// Fee payment method, when the interaction will be submitted.
    pub fee: Option<FeePayment>,
    /// Present when this interaction deploys an account contract.
    pub deployment: Option<DeploymentParams>,
    /// Hex-encoded authorization signature over the call, produced by the
    /// sending account's handle.
    pub authorization: Option<String>,
    /// Whether the service should produce a real proof or a simulated one.
    pub prover_enabled: bool,
}

/// A proven transaction, ready for submission.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProvenTransaction {
    /// Hash identifying the transaction.
    pub tx_hash: TxHash,
    /// Opaque proof payload.
    pub payload: String,
}

/// Hash identifying a submitted transaction.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxHash(String);

impl TxHash {
    /// Creates a `TxHash` from its string form.
    #[must_use]
    pub const fn new(hash: String) -> Self {
        Self(hash)
    }

    /// Returns the hash as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxHash({})", self.0)
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of an included transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    /// The transaction executed successfully.
    Success,
    /// The transaction was included but reverted.
    Reverted,
}

/// Receipt for an included transaction.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TxReceipt {
    /// Hash of the included transaction.
    pub tx_hash: TxHash,
    /// Block the transaction landed in.
    pub block_number: u64,
    /// Execution outcome.
    pub status: TxStatus,
}

/// A request to execute an interaction read-only.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimulateRequest {
    /// The call to simulate.
    pub call: ContractCall,
    /// The account to simulate as, when one is connected.
    pub from: Option<Address>,
}

/// The payload registering an account with the execution service.
///
/// The service needs the full key material to track the account's notes and
/// produce proofs on its behalf; it is trusted with it by construction.
#[derive(Clone, Serialize, Deserialize)]
pub struct AccountRegistration {
    /// Signature scheme the account uses.
    pub scheme: SignatureScheme,
    /// The account address.
    pub address: Address,
    /// Hex-encoded public verification key.
    pub public_key: String,
    /// Hex-encoded master secret.
    pub secret_key: String,
    /// Hex-encoded derivation salt.
    pub salt: String,
}

impl fmt::Debug for AccountRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountRegistration")
            .field("scheme", &self.scheme)
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact() -> ContractArtifact {
        ContractArtifact {
            name: "Voting".to_owned(),
            code: serde_json::json!({ "version": 1 }),
        }
    }

    #[test]
    fn test_instance_address_is_deterministic() {
        let a = ContractInstance::from_deploy_params(
            &artifact(),
            &Address::ZERO,
            Salt::from_low_u64(7),
            vec![serde_json::json!(5)],
        )
        .unwrap();
        let b = ContractInstance::from_deploy_params(
            &artifact(),
            &Address::ZERO,
            Salt::from_low_u64(7),
            vec![serde_json::json!(5)],
        )
        .unwrap();
        assert_eq!(a.address, b.address);
    }

    #[test]
    fn test_instance_address_varies_with_salt() {
        let a = ContractInstance::from_deploy_params(
            &artifact(),
            &Address::ZERO,
            Salt::from_low_u64(1),
            vec![],
        )
        .unwrap();
        let b = ContractInstance::from_deploy_params(
            &artifact(),
            &Address::ZERO,
            Salt::from_low_u64(2),
            vec![],
        )
        .unwrap();
        assert_ne!(a.address, b.address);
    }

    #[test]
    fn test_registration_debug_omits_secrets() {
        let registration = AccountRegistration {
            scheme: SignatureScheme::Schnorr,
            address: Address::ZERO,
            public_key: "0x00".to_owned(),
            secret_key: "0xsecret".to_owned(),
            salt: "0x00".to_owned(),
        };
        let debug = format!("{registration:?}");
        assert!(!debug.contains("0xsecret"));
    }
}
