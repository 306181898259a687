//! The embedded wallet orchestrator.
//!
//! One wallet instance owns one execution service connection, one account
//! record store, and at most one connected account handle. All account
//! lifecycle operations consumed by the UI layer live here; results are
//! returned values or surfaced errors, never callbacks.

use std::sync::{Arc, Mutex as StdMutex, PoisonError};

use futures::future::try_join_all;
use log::{debug, info, warn};
use tokio::sync::Mutex;
use wallet_store::{AccountId, AccountKindTag, AccountRecord, AccountStore};

use crate::accounts::{
    self, derivation, initial_test_accounts, AccountHandle, TestAccountVector,
};
use crate::client::{
    ClientError, ContractArtifact, ContractCall, ContractInstance,
    DeploymentParams, ExecutionService, FeePayment, ProveRequest, SimulateRequest,
    TxReceipt,
};
use crate::config::{StorageLocation, WalletConfig};
use crate::defaults;
use crate::error::{WalletError, WalletResult};
use crate::types::{Address, Salt};

/// Lifecycle state of a wallet instance.
///
/// Initialization failure is terminal: the instance stays unusable and a
/// fresh wallet must be constructed. No partial-ready state is exposed.
enum WalletState {
    Uninitialized,
    Initializing,
    Ready(AccountStore),
    Failed,
}

/// A minimal embedded wallet that keeps private keys in a local store and
/// mediates all signed interactions with the execution service.
///
/// Not a full wallet-standard implementation: a single network endpoint,
/// two fixed account kinds, no derivation hierarchy.
pub struct EmbeddedWallet {
    config: WalletConfig,
    service: Arc<dyn ExecutionService>,
    test_vectors: Vec<TestAccountVector>,
    state: Mutex<WalletState>,
    connected: StdMutex<Option<Arc<AccountHandle>>>,
}

impl EmbeddedWallet {
    /// Creates an uninitialized wallet with the built-in test-vector list.
    #[must_use]
    pub fn new(config: WalletConfig, service: Arc<dyn ExecutionService>) -> Self {
        Self::with_test_vectors(config, service, initial_test_accounts())
    }

    /// Creates an uninitialized wallet with an externally supplied
    /// test-vector list. The list's length is authoritative for
    /// [`connect_test_account`](Self::connect_test_account) range checks.
    #[must_use]
    pub fn with_test_vectors(
        config: WalletConfig,
        service: Arc<dyn ExecutionService>,
        test_vectors: Vec<TestAccountVector>,
    ) -> Self {
        Self {
            config,
            service,
            test_vectors,
            state: Mutex::new(WalletState::Uninitialized),
            connected: StdMutex::new(None),
        }
    }

    /// Opens the account store and establishes the execution service
    /// connection. Must complete before any other operation is valid.
    ///
    /// Calling this on an already-initialized wallet is a no-op. If
    /// initialization fails the instance is permanently unusable.
    ///
    /// # Errors
    ///
    /// Returns storage or service errors verbatim, or
    /// [`WalletError::InitializationFailed`] on a wallet that already failed
    /// to initialize.
    pub async fn initialize(&self) -> WalletResult<()> {
        {
            let mut state = self.state.lock().await;
            match &*state {
                WalletState::Ready(_) => return Ok(()),
                WalletState::Initializing => return Err(WalletError::NotInitialized),
                WalletState::Failed => return Err(WalletError::InitializationFailed),
                WalletState::Uninitialized => *state = WalletState::Initializing,
            }
        }

        match self.initialize_inner().await {
            Ok(store) => {
                *self.state.lock().await = WalletState::Ready(store);
                Ok(())
            }
            Err(err) => {
                *self.state.lock().await = WalletState::Failed;
                Err(err)
            }
        }
    }

    async fn initialize_inner(&self) -> WalletResult<AccountStore> {
        let store = match &self.config.storage {
            StorageLocation::OnDisk(path) => AccountStore::open(path)?,
            StorageLocation::InMemory => AccountStore::open_in_memory()?,
        };

        // Make the well-known sponsored fee contract provable before any
        // interaction needs it.
        let fee_contract = defaults::sponsored_fee_contract()?;
        self.service
            .register_contract(&fee_contract, &defaults::sponsored_fee_artifact())
            .await?;

        let node_info = self.service.node_info().await?;
        info!(
            "connected to execution service {} (chain {})",
            node_info.node_version, node_info.chain_id
        );
        Ok(store)
    }

    async fn ready_store(&self) -> WalletResult<AccountStore> {
        match &*self.state.lock().await {
            WalletState::Ready(store) => Ok(store.clone()),
            WalletState::Failed => Err(WalletError::InitializationFailed),
            _ => Err(WalletError::NotInitialized),
        }
    }

    async fn ensure_ready(&self) -> WalletResult<()> {
        self.ready_store().await.map(|_| ())
    }

    fn connected_handle(&self) -> Option<Arc<AccountHandle>> {
        self.connected
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_connected(&self, handle: Option<Arc<AccountHandle>>) {
        *self
            .connected
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = handle;
    }

    /// Returns the currently connected account handle, if any.
    ///
    /// Pure read, no side effects.
    #[must_use]
    pub fn get_connected_account(&self) -> Option<Arc<AccountHandle>> {
        self.connected_handle()
    }

    /// Derives a contract instance from the deploy parameters and registers
    /// it with the execution service so that subsequent interactions with it
    /// can be proved and simulated. Pure delegation; no wallet-side state.
    ///
    /// # Errors
    ///
    /// Returns [`WalletError::NotInitialized`] before initialization, and
    /// service failures verbatim.
    pub async fn register_contract(
        &self,
        artifact: &ContractArtifact,
        deployer: &Address,
        salt: Salt,
        constructor_args: Vec<serde_json::Value>,
    ) -> WalletResult<ContractInstance> {
        self.ensure_ready().await?;
        let instance =
            ContractInstance::from_deploy_params(artifact, deployer, salt, constructor_args)
                .map_err(|err| WalletError::Serialization(err.to_string()))?;
        self.service.register_contract(&instance, artifact).await?;
        Ok(instance)
    }

    /// Reconnects the account the current-account setting points at.
    ///
    /// Returns `None` when no account is selected. A setting that points at
    /// a missing record is a stale reference: it is cleared and `None` is
    /// returned rather than an error.
    ///
    /// # Errors
    ///
    /// Surfaces reconstruction failures and registration failures other
    /// than "already registered" (which is tolerated and logged); on a
    /// surfaced registration failure the connected handle is cleared.
    pub async fn connect_existing_account(
        &self,
    ) -> WalletResult<Option<Arc<AccountHandle>>> {
        let store = self.ready_store().await?;

        let Some(id) = store.current_account_id()? else {
            return Ok(None);
        };
        let Some(record) = store.get(&id)? else {
            warn!("current account {id} has no stored record; clearing stale reference");
            store.set_current_account_id(None)?;
            return Ok(None);
        };

        let handle = Arc::new(derivation::reconstruct(&record)?);
        if let Err(err) = self.register_account_tolerant(&handle).await {
            self.set_connected(None);
            return Err(err);
        }
        self.set_connected(Some(Arc::clone(&handle)));
        Ok(Some(handle))
    }

    /// Connects the test-vector account at `index`, materializing its
    /// record on first use.
    ///
    /// Idempotent: repeated calls with the same index yield the same
    /// address and leave exactly one stored record.
    ///
    /// # Errors
    ///
    /// Returns [`WalletError::IndexOutOfRange`] for an index outside the
    /// fixed list; storage and service failures verbatim.
    pub async fn connect_test_account(
        &self,
        index: usize,
    ) -> WalletResult<Arc<AccountHandle>> {
        let store = self.ready_store().await?;
        let len = self.test_vectors.len();
        let vector = self
            .test_vectors
            .get(index)
            .ok_or(WalletError::IndexOutOfRange { index, len })?;
        let vector_index = u32::try_from(index)
            .map_err(|_| WalletError::IndexOutOfRange { index, len })?;

        let handle = Arc::new(derivation::derive_from_test_vector(vector, vector_index));
        let id = accounts::test_account_id(vector_index);
        if store.get(&id)?.is_none() {
            store.put(&handle.to_record(id.clone(), accounts::now_millis()))?;
        }

        self.register_account_tolerant(&handle).await?;
        self.set_connected(Some(Arc::clone(&handle)));
        store.set_current_account_id(Some(&id))?;
        Ok(handle)
    }

    /// Creates a fresh account, deploys it through the execution service,
    /// persists it, and connects it.
    ///
    /// The record is persisted only after the deployment is confirmed
    /// included on-chain: a failure at any earlier stage leaves no orphaned
    /// record, making a clean retry safe.
    ///
    /// # Errors
    ///
    /// Surfaces proving, sending, and inclusion-timeout failures verbatim
    /// with no retry. A timeout means "unknown outcome": the deployment
    /// may still land, but nothing was persisted.
    pub async fn create_account_and_connect(&self) -> WalletResult<Arc<AccountHandle>> {
        let store = self.ready_store().await?;

        let handle = Arc::new(derivation::derive_fresh());
        let request = self.deployment_request(&handle)?;
        let proven = self.service.prove(&request).await?;
        let tx_hash = self.service.send(&proven).await?;
        let receipt = self
            .service
            .wait_for_inclusion(&tx_hash, self.config.inclusion_timeout)
            .await?;
        info!(
            "account {} deployed in block {}",
            handle.address(),
            receipt.block_number
        );

        let created_at = accounts::now_millis();
        let id = accounts::created_account_id(created_at);
        store.put(&handle.to_record(id.clone(), created_at))?;

        self.register_account_tolerant(&handle).await?;
        self.set_connected(Some(Arc::clone(&handle)));
        store.set_current_account_id(Some(&id))?;
        Ok(handle)
    }

    /// Connects an explicitly named, already-persisted account.
    ///
    /// # Errors
    ///
    /// Returns [`WalletError::AccountNotFound`] when no record with that id
    /// exists; otherwise behaves like
    /// [`connect_existing_account`](Self::connect_existing_account) plus a
    /// current-account update.
    pub async fn connect_stored_account(
        &self,
        id: &AccountId,
    ) -> WalletResult<Arc<AccountHandle>> {
        let store = self.ready_store().await?;
        let record = store.get(id)?.ok_or_else(|| WalletError::AccountNotFound {
            id: id.to_string(),
        })?;

        let handle = Arc::new(derivation::reconstruct(&record)?);
        if let Err(err) = self.register_account_tolerant(&handle).await {
            self.set_connected(None);
            return Err(err);
        }
        self.set_connected(Some(Arc::clone(&handle)));
        store.set_current_account_id(Some(id))?;
        Ok(handle)
    }

    /// Returns all stored test-vector account records in display order.
    ///
    /// # Errors
    /// Returns [`WalletError::NotInitialized`] before initialization and
    /// storage failures verbatim.
    pub async fn get_stored_test_accounts(&self) -> WalletResult<Vec<AccountRecord>> {
        self.list_sorted(AccountKindTag::TestVector).await
    }

    /// Returns all stored created account records in display order.
    ///
    /// # Errors
    /// Returns [`WalletError::NotInitialized`] before initialization and
    /// storage failures verbatim.
    pub async fn get_stored_created_accounts(&self) -> WalletResult<Vec<AccountRecord>> {
        self.list_sorted(AccountKindTag::Created).await
    }

    async fn list_sorted(&self, tag: AccountKindTag) -> WalletResult<Vec<AccountRecord>> {
        let store = self.ready_store().await?;
        let mut records = store.list_by_kind(tag)?;
        records.sort_by_key(|record| record.created_at);
        Ok(records)
    }

    /// Deletes a stored account record.
    ///
    /// When the deleted id was the current account, the setting is cleared
    /// and the connected handle dropped.
    ///
    /// # Errors
    /// Returns storage failures verbatim.
    pub async fn delete_stored_account(&self, id: &AccountId) -> WalletResult<()> {
        let store = self.ready_store().await?;
        store.delete(id)?;
        if store.current_account_id()?.as_ref() == Some(id) {
            store.set_current_account_id(None)?;
            self.set_connected(None);
        }
        Ok(())
    }

    /// Clears all persisted records and the current-account setting, and
    /// drops the connected handle.
    ///
    /// Accounts are not deregistered from the execution service;
    /// deregistration is not assumed possible.
    ///
    /// # Errors
    /// Returns storage failures verbatim.
    pub async fn reset_stored_data(&self) -> WalletResult<()> {
        let store = self.ready_store().await?;
        store.reset_all()?;
        self.set_connected(None);
        Ok(())
    }

    /// Proves the interaction with the sponsored fee payment method,
    /// submits it, and waits for inclusion up to the configured timeout.
    ///
    /// The connected handle is captured at entry: switching accounts while
    /// the send is in flight does not re-attribute it.
    ///
    /// # Errors
    ///
    /// Returns [`WalletError::NoConnectedAccount`] without a connected
    /// account; proving and inclusion failures are surfaced verbatim with
    /// no retry. A timeout means the outcome is unknown, not failed.
    pub async fn send_transaction(&self, call: ContractCall) -> WalletResult<TxReceipt> {
        self.ensure_ready().await?;
        let handle = self
            .connected_handle()
            .ok_or(WalletError::NoConnectedAccount)?;

        let payload = serde_json::to_vec(&call)
            .map_err(|err| WalletError::Serialization(err.to_string()))?;
        let authorization = handle.sign(&payload)?;
        let fee_contract = defaults::sponsored_fee_contract()?;

        let request = ProveRequest {
            from: *handle.address(),
            call,
            fee: Some(FeePayment::Sponsored {
                paymaster: fee_contract.address,
            }),
            deployment: None,
            authorization: Some(format!("0x{}", hex::encode(authorization))),
            prover_enabled: self.config.prover_enabled,
        };
        let proven = self.service.prove(&request).await?;
        let tx_hash = self.service.send(&proven).await?;
        Ok(self
            .service
            .wait_for_inclusion(&tx_hash, self.config.inclusion_timeout)
            .await?)
    }

    /// Executes the interaction read-only against current state and returns
    /// the decoded result. No fee handling, no submission.
    ///
    /// # Errors
    /// Returns [`WalletError::NotInitialized`] before initialization and
    /// service failures verbatim.
    pub async fn simulate_transaction(
        &self,
        call: ContractCall,
    ) -> WalletResult<serde_json::Value> {
        self.ensure_ready().await?;
        let from = self.connected_handle().map(|handle| *handle.address());
        Ok(self.service.simulate(&SimulateRequest { call, from }).await?)
    }

    /// Issues a set of independent simulations concurrently and joins on
    /// all of them.
    ///
    /// All-or-nothing: if any one simulation fails the whole call fails; a
    /// partial result is never reported as complete.
    ///
    /// # Errors
    /// Returns the first simulation failure, or
    /// [`WalletError::NotInitialized`] before initialization.
    pub async fn simulate_batch(
        &self,
        calls: Vec<ContractCall>,
    ) -> WalletResult<Vec<serde_json::Value>> {
        self.ensure_ready().await?;
        let from = self.connected_handle().map(|handle| *handle.address());

        let simulations = calls.into_iter().map(|call| {
            let service = Arc::clone(&self.service);
            async move { service.simulate(&SimulateRequest { call, from }).await }
        });
        Ok(try_join_all(simulations).await?)
    }

    async fn register_account_tolerant(&self, handle: &AccountHandle) -> WalletResult<()> {
        let registration = handle.registration()?;
        match self.service.register_account(&registration).await {
            Ok(()) => Ok(()),
            Err(ClientError::AlreadyRegistered) => {
                debug!(
                    "account {} already registered with execution service",
                    handle.address()
                );
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    fn deployment_request(&self, handle: &AccountHandle) -> WalletResult<ProveRequest> {
        let fee_contract = defaults::sponsored_fee_contract()?;
        Ok(ProveRequest {
            from: *handle.address(),
            call: ContractCall::new(*handle.address(), "constructor", vec![]),
            fee: Some(FeePayment::Sponsored {
                paymaster: fee_contract.address,
            }),
            deployment: Some(DeploymentParams {
                contract_address_salt: *handle.salt(),
                universal_deploy: true,
                skip_class_registration: true,
                skip_public_deployment: true,
            }),
            authorization: None,
            prover_enabled: self.config.prover_enabled,
        })
    }
}

impl std::fmt::Debug for EmbeddedWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddedWallet")
            .field("node_url", &self.config.node_url)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MemoryExecutionService;
    use serde_json::json;
    use wallet_store::AccountKind;

    fn test_wallet() -> (EmbeddedWallet, Arc<MemoryExecutionService>) {
        let service = Arc::new(MemoryExecutionService::new());
        let wallet = EmbeddedWallet::new(
            WalletConfig::in_memory("http://localhost:8080"),
            Arc::clone(&service) as Arc<dyn ExecutionService>,
        );
        (wallet, service)
    }

    async fn ready_wallet() -> (EmbeddedWallet, Arc<MemoryExecutionService>) {
        let (wallet, service) = test_wallet();
        wallet.initialize().await.unwrap();
        (wallet, service)
    }

    #[tokio::test]
    async fn test_operations_require_initialization() {
        let (wallet, _service) = test_wallet();
        let err = wallet.connect_test_account(0).await.unwrap_err();
        assert!(matches!(err, WalletError::NotInitialized));

        let err = wallet.get_stored_test_accounts().await.unwrap_err();
        assert!(matches!(err, WalletError::NotInitialized));
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let (wallet, _service) = test_wallet();
        wallet.initialize().await.unwrap();
        wallet.initialize().await.unwrap();
    }

    #[tokio::test]
    async fn test_initialize_registers_fee_contract() {
        let (_wallet, service) = ready_wallet().await;
        let fee_contract = defaults::sponsored_fee_contract().unwrap();
        assert!(service.is_contract_registered(&fee_contract.address));
    }

    #[tokio::test]
    async fn test_connect_test_account_is_idempotent() {
        let (wallet, service) = ready_wallet().await;

        let first = wallet.connect_test_account(0).await.unwrap();
        let second = wallet.connect_test_account(0).await.unwrap();
        assert_eq!(first.address(), second.address());

        let stored = wallet.get_stored_test_accounts().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id.as_str(), "test_0");
        assert_eq!(service.registered_account_count(), 1);
    }

    #[tokio::test]
    async fn test_connect_test_account_index_out_of_range() {
        let (wallet, _service) = ready_wallet().await;
        let err = wallet.connect_test_account(17).await.unwrap_err();
        assert!(matches!(
            err,
            WalletError::IndexOutOfRange { index: 17, len: 3 }
        ));
        assert!(wallet.get_connected_account().is_none());
    }

    #[tokio::test]
    async fn test_switching_test_accounts_keeps_one_connected_handle() {
        let (wallet, _service) = ready_wallet().await;

        wallet.connect_test_account(0).await.unwrap();
        let second = wallet.connect_test_account(1).await.unwrap();

        let connected = wallet.get_connected_account().unwrap();
        assert_eq!(connected.address(), second.address());

        let stored = wallet.get_stored_test_accounts().await.unwrap();
        let ids: Vec<&str> = stored.iter().map(|r| r.id.as_str()).collect();
        assert!(ids.contains(&"test_0"));
        assert!(ids.contains(&"test_1"));
    }

    #[tokio::test]
    async fn test_create_account_and_connect_end_to_end() {
        let (wallet, service) = ready_wallet().await;

        let handle = wallet.create_account_and_connect().await.unwrap();

        let stored = wallet.get_stored_created_accounts().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].address, handle.address().to_hex());
        assert_eq!(stored[0].kind, AccountKind::Created);

        let connected = wallet.get_connected_account().unwrap();
        assert_eq!(connected.address(), handle.address());
        assert!(service.is_account_registered(handle.address()));

        // Reconnecting resolves the same identity from the stored record.
        let reconnected = wallet.connect_existing_account().await.unwrap().unwrap();
        assert_eq!(reconnected.address(), handle.address());
    }

    #[tokio::test]
    async fn test_create_failure_before_persistence_leaves_no_record() {
        let (wallet, service) = ready_wallet().await;
        service.fail_next_prove("proving backend unavailable");

        let err = wallet.create_account_and_connect().await.unwrap_err();
        assert!(matches!(
            err,
            WalletError::Client(ClientError::Proving(_))
        ));

        assert!(wallet.get_stored_created_accounts().await.unwrap().is_empty());
        assert!(wallet.get_connected_account().is_none());
        assert!(wallet.connect_existing_account().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_inclusion_timeout_leaves_no_record() {
        let (wallet, service) = ready_wallet().await;
        service.withhold_inclusion();

        let err = wallet.create_account_and_connect().await.unwrap_err();
        assert!(matches!(
            err,
            WalletError::Client(ClientError::InclusionTimeout { .. })
        ));
        assert!(wallet.get_stored_created_accounts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_connect_existing_account_with_no_selection() {
        let (wallet, _service) = ready_wallet().await;
        assert!(wallet.connect_existing_account().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_stale_current_account_reference_is_recovered() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("wallet.db3");

        let service = Arc::new(MemoryExecutionService::new());
        let wallet = EmbeddedWallet::new(
            WalletConfig::new("http://localhost:8080", &db_path),
            Arc::clone(&service) as Arc<dyn ExecutionService>,
        );
        wallet.initialize().await.unwrap();
        wallet.connect_test_account(0).await.unwrap();

        // Delete the record out from under the setting, as an older build
        // or another tab might, leaving a dangling current-account id.
        let raw_store = AccountStore::open(&db_path).unwrap();
        raw_store.delete(&AccountId::from("test_0")).unwrap();
        assert!(raw_store.current_account_id().unwrap().is_some());

        assert!(wallet.connect_existing_account().await.unwrap().is_none());
        assert!(raw_store.current_account_id().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reconnect_after_restart() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("wallet.db3");

        let address = {
            let service = Arc::new(MemoryExecutionService::new());
            let wallet = EmbeddedWallet::new(
                WalletConfig::new("http://localhost:8080", &db_path),
                Arc::clone(&service) as Arc<dyn ExecutionService>,
            );
            wallet.initialize().await.unwrap();
            *wallet.connect_test_account(1).await.unwrap().address()
        };

        // A fresh process: new wallet, new service connection, same store.
        let service = Arc::new(MemoryExecutionService::new());
        let wallet = EmbeddedWallet::new(
            WalletConfig::new("http://localhost:8080", &db_path),
            Arc::clone(&service) as Arc<dyn ExecutionService>,
        );
        wallet.initialize().await.unwrap();

        let handle = wallet.connect_existing_account().await.unwrap().unwrap();
        assert_eq!(*handle.address(), address);
    }

    #[tokio::test]
    async fn test_connect_stored_account_not_found() {
        let (wallet, _service) = ready_wallet().await;
        let err = wallet
            .connect_stored_account(&AccountId::from("created_missing"))
            .await
            .unwrap_err();
        assert!(matches!(err, WalletError::AccountNotFound { .. }));
    }

    #[tokio::test]
    async fn test_connect_stored_account_updates_selection() {
        let (wallet, _service) = ready_wallet().await;
        wallet.connect_test_account(0).await.unwrap();
        wallet.connect_test_account(1).await.unwrap();

        let handle = wallet
            .connect_stored_account(&AccountId::from("test_0"))
            .await
            .unwrap();
        let reconnected = wallet.connect_existing_account().await.unwrap().unwrap();
        assert_eq!(reconnected.address(), handle.address());
    }

    #[tokio::test]
    async fn test_delete_current_account_clears_session() {
        let (wallet, _service) = ready_wallet().await;
        wallet.connect_test_account(0).await.unwrap();

        wallet
            .delete_stored_account(&AccountId::from("test_0"))
            .await
            .unwrap();

        assert!(wallet.get_connected_account().is_none());
        assert!(wallet.connect_existing_account().await.unwrap().is_none());
        assert!(wallet.get_stored_test_accounts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_other_account_keeps_session() {
        let (wallet, _service) = ready_wallet().await;
        wallet.connect_test_account(0).await.unwrap();
        let connected = wallet.connect_test_account(1).await.unwrap();

        wallet
            .delete_stored_account(&AccountId::from("test_0"))
            .await
            .unwrap();

        let still_connected = wallet.get_connected_account().unwrap();
        assert_eq!(still_connected.address(), connected.address());
    }

    #[tokio::test]
    async fn test_reset_clears_records_selection_and_session() {
        let (wallet, _service) = ready_wallet().await;
        wallet.connect_test_account(0).await.unwrap();
        wallet.create_account_and_connect().await.unwrap();

        wallet.reset_stored_data().await.unwrap();

        assert!(wallet.get_stored_test_accounts().await.unwrap().is_empty());
        assert!(wallet.get_stored_created_accounts().await.unwrap().is_empty());
        assert!(wallet.get_connected_account().is_none());
        assert!(wallet.connect_existing_account().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_send_transaction_requires_connected_account() {
        let (wallet, _service) = ready_wallet().await;
        let call = ContractCall::new(Address::new([9; 32]), "vote", vec![json!(1)]);
        let err = wallet.send_transaction(call).await.unwrap_err();
        assert!(matches!(err, WalletError::NoConnectedAccount));
    }

    #[tokio::test]
    async fn test_send_transaction_end_to_end() {
        let (wallet, _service) = ready_wallet().await;
        wallet.connect_test_account(0).await.unwrap();

        let call = ContractCall::new(Address::new([9; 32]), "vote", vec![json!(3)]);
        let receipt = wallet.send_transaction(call).await.unwrap();
        assert_eq!(receipt.status, crate::client::TxStatus::Success);
    }

    #[tokio::test]
    async fn test_simulate_transaction_returns_decoded_value() {
        let (wallet, service) = ready_wallet().await;
        let contract = Address::new([9; 32]);
        service.set_simulation_result(contract, "get_vote_count", json!(42));

        let call = ContractCall::new(contract, "get_vote_count", vec![json!(1)]);
        let value = wallet.simulate_transaction(call).await.unwrap();
        assert_eq!(value, json!(42));
    }

    #[tokio::test]
    async fn test_simulate_batch_joins_all_results() {
        let (wallet, service) = ready_wallet().await;
        let contract = Address::new([9; 32]);
        for candidate in 1..=5u64 {
            service.set_simulation_result(
                contract,
                &format!("tally_{candidate}"),
                json!(candidate * 10),
            );
        }

        let calls: Vec<ContractCall> = (1..=5u64)
            .map(|candidate| {
                ContractCall::new(contract, format!("tally_{candidate}"), vec![])
            })
            .collect();
        let values = wallet.simulate_batch(calls).await.unwrap();
        assert_eq!(values, vec![json!(10), json!(20), json!(30), json!(40), json!(50)]);
    }

    #[tokio::test]
    async fn test_simulate_batch_fails_when_any_simulation_fails() {
        let (wallet, service) = ready_wallet().await;
        let contract = Address::new([9; 32]);
        for candidate in 1..=5u64 {
            service.set_simulation_result(
                contract,
                &format!("tally_{candidate}"),
                json!(candidate),
            );
        }
        service.fail_simulation(contract, "tally_3", "state out of sync");

        let calls: Vec<ContractCall> = (1..=5u64)
            .map(|candidate| {
                ContractCall::new(contract, format!("tally_{candidate}"), vec![])
            })
            .collect();
        let err = wallet.simulate_batch(calls).await.unwrap_err();
        assert!(matches!(err, WalletError::Client(ClientError::Network { .. })));
    }

    #[tokio::test]
    async fn test_register_contract_delegates_to_service() {
        let (wallet, service) = ready_wallet().await;
        let artifact = ContractArtifact {
            name: "Voting".to_owned(),
            code: json!({ "version": 1 }),
        };

        let instance = wallet
            .register_contract(&artifact, &Address::ZERO, Salt::from_low_u64(7), vec![])
            .await
            .unwrap();
        assert!(service.is_contract_registered(&instance.address));
    }
}
