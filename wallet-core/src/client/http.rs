//! HTTP implementation of the execution service client.

use std::time::Duration;

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use log::debug;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;

use super::{
    AccountRegistration, ClientError, ClientResult, ContractArtifact,
    ContractInstance, ExecutionService, NodeInfo, ProveRequest, ProvenTransaction,
    SimulateRequest, TxHash, TxReceipt,
};

/// How often the receipt endpoint is polled while waiting for inclusion.
const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Per-request timeout for proving, which legitimately takes much longer
/// than ordinary requests.
const PROVE_TIMEOUT: Duration = Duration::from_secs(120);

/// Execution service client speaking JSON over HTTP to a single node URL.
pub struct HttpExecutionService {
    base_url: String,
    request: Request,
}

impl HttpExecutionService {
    /// Creates a client for the node at `node_url`.
    #[must_use]
    pub fn new(node_url: &str) -> Self {
        Self {
            base_url: node_url.trim_end_matches('/').to_owned(),
            request: Request::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

impl std::fmt::Debug for HttpExecutionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpExecutionService")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
struct SendResponse {
    tx_hash: TxHash,
}

#[async_trait]
impl ExecutionService for HttpExecutionService {
    async fn node_info(&self) -> ClientResult<NodeInfo> {
        let url = self.url("/node-info");
        let response = self.request.get_with_retry(&url).await?;
        Ok(response.json::<NodeInfo>().await?)
    }

    async fn register_contract(
        &self,
        instance: &ContractInstance,
        artifact: &ContractArtifact,
    ) -> ClientResult<()> {
        let url = self.url("/contracts");
        let body = serde_json::json!({ "instance": instance, "artifact": artifact });
        execute(self.request.post(&url).json(&body)).await?;
        debug!("registered contract {} with execution service", instance.address);
        Ok(())
    }

    async fn register_account(
        &self,
        registration: &AccountRegistration,
    ) -> ClientResult<()> {
        let url = self.url("/accounts");
        let response = self.request.post(&url).json(registration).send().await?;
        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::CONFLICT => Err(ClientError::AlreadyRegistered),
            status => {
                let error = response.text().await.unwrap_or_default();
                Err(ClientError::Network {
                    url,
                    status: Some(status.as_u16()),
                    error,
                })
            }
        }
    }

    async fn prove(&self, request: &ProveRequest) -> ClientResult<ProvenTransaction> {
        let url = self.url("/transactions/prove");
        let response = self
            .request
            .post(&url)
            .timeout(PROVE_TIMEOUT)
            .json(request)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let error = response.text().await.unwrap_or_default();
            return Err(ClientError::Proving(format!("{status}: {error}")));
        }
        Ok(response.json::<ProvenTransaction>().await?)
    }

    async fn send(&self, transaction: &ProvenTransaction) -> ClientResult<TxHash> {
        let url = self.url("/transactions");
        let response = execute(self.request.post(&url).json(transaction)).await?;
        Ok(response.json::<SendResponse>().await?.tx_hash)
    }

    async fn wait_for_inclusion(
        &self,
        tx_hash: &TxHash,
        timeout: Duration,
    ) -> ClientResult<TxReceipt> {
        let deadline = tokio::time::Instant::now() + timeout;
        let url = self.url(&format!("/transactions/{tx_hash}/receipt"));
        loop {
            let response = self.request.get(&url).send().await?;
            match response.status() {
                status if status.is_success() => {
                    return Ok(response.json::<TxReceipt>().await?);
                }
                StatusCode::NOT_FOUND => {
                    if tokio::time::Instant::now() + RECEIPT_POLL_INTERVAL > deadline {
                        return Err(ClientError::InclusionTimeout {
                            tx_hash: tx_hash.to_string(),
                            waited_secs: timeout.as_secs(),
                        });
                    }
                    tokio::time::sleep(RECEIPT_POLL_INTERVAL).await;
                }
                status => {
                    let error = response.text().await.unwrap_or_default();
                    return Err(ClientError::Network {
                        url,
                        status: Some(status.as_u16()),
                        error,
                    });
                }
            }
        }
    }

    async fn simulate(&self, request: &SimulateRequest) -> ClientResult<serde_json::Value> {
        let url = self.url("/simulate");
        let response = execute(self.request.post(&url).json(request)).await?;
        Ok(response.json::<serde_json::Value>().await?)
    }
}

/// A thin wrapper on the HTTP client applying sensible defaults: timeouts,
/// user-agent, and retry middleware for transient failures on idempotent
/// requests. Mutating requests (prove/send/register) are never retried.
struct Request {
    client: reqwest::Client,
    timeout: Duration,
    max_retries: u32,
}

impl Request {
    fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout: Duration::from_secs(10),
            max_retries: 3, // total attempts = 4
        }
    }

    fn req(&self, method: Method, url: &str) -> RequestBuilder {
        self.client.request(method, url).timeout(self.timeout).header(
            "User-Agent",
            format!("wallet-core/{}", env!("CARGO_PKG_VERSION")),
        )
    }

    fn get(&self, url: &str) -> RequestBuilder {
        self.req(Method::GET, url)
    }

    fn post(&self, url: &str) -> RequestBuilder {
        self.req(Method::POST, url)
    }

    /// Executes an idempotent GET with retries for transient failures.
    async fn get_with_retry(&self, url: &str) -> ClientResult<Response> {
        let backoff = ExponentialBuilder::default()
            .with_min_delay(Duration::from_millis(200))
            .with_max_delay(Duration::from_secs(2))
            .with_max_times(self.max_retries as usize);

        (|| async { execute(self.get(url)).await })
            .retry(backoff)
            .when(is_transient)
            .await
    }
}

async fn execute(builder: RequestBuilder) -> ClientResult<Response> {
    let response = builder.send().await?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let url = response.url().to_string();
    let error = response.text().await.unwrap_or_default();
    Err(ClientError::Network {
        url,
        status: Some(status.as_u16()),
        error,
    })
}

fn is_transient(err: &ClientError) -> bool {
    match err {
        ClientError::Network {
            status: Some(status),
            ..
        } => *status == 429 || (500..600).contains(status),
        ClientError::Reqwest(err) => err.is_timeout() || err.is_connect(),
        _ => false,
    }
}
