//! In-memory execution service used by tests and local development.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::types::Address;

use super::{
    AccountRegistration, ClientError, ClientResult, ContractArtifact,
    ContractInstance, ExecutionService, NodeInfo, ProveRequest, ProvenTransaction,
    SimulateRequest, TxHash, TxReceipt, TxStatus,
};

/// An in-process stand-in for the remote execution service.
///
/// Registration, proving, sending and inclusion all resolve instantly and
/// deterministically: a sent transaction is included in the next block, and
/// re-registering an account fails with
/// [`ClientError::AlreadyRegistered`] exactly like the real service.
/// Simulation results and failures are scriptable per contract method.
#[derive(Default)]
pub struct MemoryExecutionService {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    contracts: HashMap<Address, ContractInstance>,
    accounts: HashSet<Address>,
    receipts: HashMap<TxHash, TxReceipt>,
    simulations: HashMap<(Address, String), Result<serde_json::Value, String>>,
    fail_next_prove: Option<String>,
    withhold_inclusion: bool,
    next_block: u64,
}

impl MemoryExecutionService {
    /// Creates an empty in-memory service.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Scripts the result returned for simulations of `method` on `contract`.
    pub fn set_simulation_result(
        &self,
        contract: Address,
        method: &str,
        value: serde_json::Value,
    ) {
        self.lock()
            .simulations
            .insert((contract, method.to_owned()), Ok(value));
    }

    /// Makes simulations of `method` on `contract` fail.
    pub fn fail_simulation(&self, contract: Address, method: &str, error: &str) {
        self.lock()
            .simulations
            .insert((contract, method.to_owned()), Err(error.to_owned()));
    }

    /// Makes the next `prove` call fail with the given reason.
    pub fn fail_next_prove(&self, error: &str) {
        self.lock().fail_next_prove = Some(error.to_owned());
    }

    /// Stops including sent transactions, so every inclusion wait elapses.
    pub fn withhold_inclusion(&self) {
        self.lock().withhold_inclusion = true;
    }

    /// Whether the account at `address` has been registered.
    #[must_use]
    pub fn is_account_registered(&self, address: &Address) -> bool {
        self.lock().accounts.contains(address)
    }

    /// Number of accounts registered so far.
    #[must_use]
    pub fn registered_account_count(&self) -> usize {
        self.lock().accounts.len()
    }

    /// Whether a contract instance is registered at `address`.
    #[must_use]
    pub fn is_contract_registered(&self, address: &Address) -> bool {
        self.lock().contracts.contains_key(address)
    }
}

impl std::fmt::Debug for MemoryExecutionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryExecutionService").finish_non_exhaustive()
    }
}

#[async_trait]
impl ExecutionService for MemoryExecutionService {
    async fn node_info(&self) -> ClientResult<NodeInfo> {
        Ok(NodeInfo {
            node_version: format!("memory-execution-service/{}", env!("CARGO_PKG_VERSION")),
            chain_id: 31337,
        })
    }

    async fn register_contract(
        &self,
        instance: &ContractInstance,
        _artifact: &ContractArtifact,
    ) -> ClientResult<()> {
        self.lock()
            .contracts
            .insert(instance.address, instance.clone());
        Ok(())
    }

    async fn register_account(
        &self,
        registration: &AccountRegistration,
    ) -> ClientResult<()> {
        let mut state = self.lock();
        if !state.accounts.insert(registration.address) {
            return Err(ClientError::AlreadyRegistered);
        }
        Ok(())
    }

    async fn prove(&self, request: &ProveRequest) -> ClientResult<ProvenTransaction> {
        let mut state = self.lock();
        if let Some(error) = state.fail_next_prove.take() {
            return Err(ClientError::Proving(error));
        }

        let encoded = serde_json::to_vec(request)
            .map_err(|err| ClientError::InvalidResponse(err.to_string()))?;
        let tx_hash = TxHash::new(format!("0x{}", hex::encode(Sha256::digest(&encoded))));
        Ok(ProvenTransaction {
            payload: format!("proof:{tx_hash}"),
            tx_hash,
        })
    }

    async fn send(&self, transaction: &ProvenTransaction) -> ClientResult<TxHash> {
        let mut state = self.lock();
        if !state.withhold_inclusion {
            state.next_block += 1;
            let receipt = TxReceipt {
                tx_hash: transaction.tx_hash.clone(),
                block_number: state.next_block,
                status: TxStatus::Success,
            };
            state.receipts.insert(transaction.tx_hash.clone(), receipt);
        }
        Ok(transaction.tx_hash.clone())
    }

    async fn wait_for_inclusion(
        &self,
        tx_hash: &TxHash,
        timeout: Duration,
    ) -> ClientResult<TxReceipt> {
        // Inclusion is instant here, so a missing receipt means the bounded
        // wait would elapse; the fake reports the timeout without sleeping.
        self.lock().receipts.get(tx_hash).cloned().map_or_else(
            || {
                Err(ClientError::InclusionTimeout {
                    tx_hash: tx_hash.to_string(),
                    waited_secs: timeout.as_secs(),
                })
            },
            Ok,
        )
    }

    async fn simulate(&self, request: &SimulateRequest) -> ClientResult<serde_json::Value> {
        let key = (request.call.contract, request.call.method.clone());
        match self.lock().simulations.get(&key) {
            Some(Ok(value)) => Ok(value.clone()),
            Some(Err(error)) => Err(ClientError::Network {
                url: "memory".to_owned(),
                status: None,
                error: error.clone(),
            }),
            None => Ok(serde_json::Value::Null),
        }
    }
}
