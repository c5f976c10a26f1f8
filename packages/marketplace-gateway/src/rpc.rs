//! Fullnode REST client with primary → fallback failover and circuit breaker.

use crate::metrics::METRICS;
use crate::tx::FunctionCall;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Consecutive failures before the circuit breaker opens.
const CIRCUIT_BREAKER_THRESHOLD: u64 = 5;
/// How long (ms) before a tripped breaker retries the primary.
const CIRCUIT_BREAKER_WINDOW_MS: u64 = 30_000;
/// Per-request timeouts for fullnode calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Finality polling interval.
const POLL_INTERVAL: Duration = Duration::from_millis(500);

struct CircuitState {
    failures: u64,
    last_failure_ms: u64,
    open: bool,
}

/// Fullnode client with primary → fallback failover.
pub struct NodeClient {
    http: reqwest::Client,
    primary_url: String,
    fallback_url: String,
    circuit: Mutex<CircuitState>,
    total_failovers: AtomicU64,
}

impl NodeClient {
    pub fn new(primary_url: &str, fallback_url: &str) -> Self {
        info!(
            primary = primary_url,
            fallback = fallback_url,
            "Fullnode client initialized with failover"
        );
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            http,
            primary_url: primary_url.trim_end_matches('/').to_string(),
            fallback_url: fallback_url.trim_end_matches('/').to_string(),
            circuit: Mutex::new(CircuitState {
                failures: 0,
                last_failure_ms: 0,
                open: false,
            }),
            total_failovers: AtomicU64::new(0),
        }
    }

    // --- View functions ---

    /// Call a contract view function. Returns the raw result values
    /// (one per return value of the Move function). Automatic failover.
    pub async fn view(&self, call: &FunctionCall) -> Result<Vec<Value>, crate::Error> {
        match self.view_on(self.active_url(), call).await {
            Ok(rows) => {
                self.record_success();
                Ok(rows)
            }
            Err(e) => {
                self.record_failure();
                warn!(function = %call.function, error = %e, "Primary view call failed, trying fallback");
                self.view_on(&self.fallback_url, call).await.map_err(|e2| {
                    crate::Error::Rpc(format!(
                        "view {} failed on both nodes: primary={e}, fallback={e2}",
                        call.function
                    ))
                })
            }
        }
    }

    async fn view_on(&self, base: &str, call: &FunctionCall) -> Result<Vec<Value>, crate::Error> {
        let resp = self
            .http
            .post(format!("{base}/v1/view"))
            .json(call)
            .send()
            .await
            .map_err(|e| crate::Error::Rpc(format!("view request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(crate::Error::Rpc(format!(
                "view {} returned {status}: {body}",
                call.function
            )));
        }

        resp.json()
            .await
            .map_err(|e| crate::Error::Rpc(format!("invalid view response: {e}")))
    }

    // --- Transactions ---

    /// Look up a transaction by hash. `None` while the node has not
    /// seen it yet.
    pub async fn transaction_by_hash(&self, hash: &str) -> Result<Option<Value>, crate::Error> {
        let base = self.active_url();
        let resp = self
            .http
            .get(format!("{base}/v1/transactions/by_hash/{hash}"))
            .send()
            .await
            .map_err(|e| {
                self.record_failure();
                crate::Error::Rpc(format!("transaction lookup failed: {e}"))
            })?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            let status = resp.status();
            return Err(crate::Error::Rpc(format!(
                "transaction lookup returned {status}"
            )));
        }
        self.record_success();
        let tx = resp
            .json()
            .await
            .map_err(|e| crate::Error::Rpc(format!("invalid transaction response: {e}")))?;
        Ok(Some(tx))
    }

    /// Block until a submitted transaction reaches finality, or fail
    /// after `timeout`. A transaction that executes but aborts is an
    /// error carrying its vm_status.
    pub async fn wait_for_transaction(
        &self,
        hash: &str,
        timeout: Duration,
    ) -> Result<Value, crate::Error> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.transaction_by_hash(hash).await {
                Ok(Some(tx)) => {
                    if tx["type"].as_str() != Some("pending_transaction") {
                        if tx["success"].as_bool().unwrap_or(false) {
                            return Ok(tx);
                        }
                        let vm_status = tx["vm_status"].as_str().unwrap_or("execution failed");
                        return Err(crate::Error::Tx(vm_status.to_string()));
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    // Transient lookup errors are tolerated until the deadline.
                    if Instant::now() >= deadline {
                        return Err(e);
                    }
                }
            }
            if Instant::now() >= deadline {
                return Err(crate::Error::Tx(format!(
                    "transaction {hash} not final within {}s",
                    timeout.as_secs()
                )));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Quick connectivity check. Returns "ok", "degraded", or error.
    pub async fn health_check(&self) -> Result<&'static str, crate::Error> {
        if self.ledger_info(&self.primary_url).await.is_ok() {
            return Ok("ok");
        }
        match self.ledger_info(&self.fallback_url).await {
            Ok(()) => Ok("degraded"),
            Err(e) => Err(crate::Error::Rpc(format!("Both nodes unreachable: {e}"))),
        }
    }

    async fn ledger_info(&self, base: &str) -> Result<(), crate::Error> {
        let resp = self
            .http
            .get(format!("{base}/v1"))
            .send()
            .await
            .map_err(|e| crate::Error::Rpc(format!("ledger info failed: {e}")))?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(crate::Error::Rpc(format!(
                "ledger info returned {}",
                resp.status()
            )))
        }
    }

    // --- Failover / circuit breaker ---

    fn record_success(&self) {
        let mut circuit = self.circuit.lock().unwrap_or_else(|e| e.into_inner());
        if circuit.failures > 0 {
            info!(primary = %self.primary_url, "Primary node recovered");
            circuit.failures = 0;
            circuit.open = false;
        }
    }

    fn record_failure(&self) {
        METRICS.rpc_errors.fetch_add(1, Ordering::Relaxed);
        let mut circuit = self.circuit.lock().unwrap_or_else(|e| e.into_inner());
        circuit.failures += 1;
        circuit.last_failure_ms = now_ms();
        if circuit.failures >= CIRCUIT_BREAKER_THRESHOLD && !circuit.open {
            circuit.open = true;
            self.total_failovers.fetch_add(1, Ordering::Relaxed);
            METRICS.rpc_failovers.fetch_add(1, Ordering::Relaxed);
            warn!(
                failures = circuit.failures,
                fallback = %self.fallback_url,
                "Circuit breaker opened — routing to fallback"
            );
        }
    }

    pub fn is_circuit_open(&self) -> bool {
        let mut circuit = self.circuit.lock().unwrap_or_else(|e| e.into_inner());
        if !circuit.open {
            return false;
        }
        // Half-open: retry primary after the window
        if now_ms() - circuit.last_failure_ms > CIRCUIT_BREAKER_WINDOW_MS {
            circuit.open = false;
            circuit.failures = 0;
            info!(primary = %self.primary_url, "Circuit breaker half-open, retrying primary");
            return false;
        }
        true
    }

    pub fn failover_count(&self) -> u64 {
        self.total_failovers.load(Ordering::Relaxed)
    }

    /// Currently active node URL.
    pub fn active_url(&self) -> &str {
        if self.is_circuit_open() {
            &self.fallback_url
        } else {
            &self.primary_url
        }
    }
}

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
