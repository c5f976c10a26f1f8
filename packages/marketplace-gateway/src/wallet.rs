//! Wallet service client.
//!
//! The gateway never holds keys or signs. Mutating calls are handed to
//! the connected wallet service, which presents them to the user,
//! signs, submits, and returns the transaction hash. A declined prompt
//! comes back as an error and is surfaced as a notification; the user
//! re-submits manually.

use crate::tx::FunctionCall;
use serde::Deserialize;
use std::time::Duration;
use tracing::info;

const WALLET_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const WALLET_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// HTTP client for the wallet service's signing interface.
pub struct WalletClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct AccountResponse {
    address: String,
}

#[derive(Deserialize)]
struct SubmitResponse {
    hash: String,
}

impl WalletClient {
    pub fn new(base_url: &str) -> Self {
        let http = reqwest::Client::builder()
            // Signing waits on a human; give the prompt time.
            .timeout(WALLET_REQUEST_TIMEOUT)
            .connect_timeout(WALLET_CONNECT_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// The connected account's address.
    pub async fn account(&self) -> Result<String, crate::Error> {
        let resp = self
            .http
            .get(format!("{}/account", self.base_url))
            .send()
            .await
            .map_err(|e| crate::Error::Wallet(format!("wallet unreachable: {e}")))?;

        if !resp.status().is_success() {
            return Err(crate::Error::Wallet(format!(
                "wallet returned {} for account query",
                resp.status()
            )));
        }

        let account: AccountResponse = resp
            .json()
            .await
            .map_err(|e| crate::Error::Wallet(format!("invalid wallet response: {e}")))?;
        Ok(account.address)
    }

    /// Sign and submit an entry-function payload. Blocks until the
    /// wallet has submitted (not until finality — callers poll the
    /// fullnode for that). Declined prompts surface here.
    pub async fn sign_and_submit(&self, call: &FunctionCall) -> Result<String, crate::Error> {
        let resp = self
            .http
            .post(format!("{}/transactions", self.base_url))
            .json(call)
            .send()
            .await
            .map_err(|e| crate::Error::Wallet(format!("wallet unreachable: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(crate::Error::Wallet(format!(
                "wallet declined {} ({status}): {body}",
                call.function
            )));
        }

        let submitted: SubmitResponse = resp
            .json()
            .await
            .map_err(|e| crate::Error::Wallet(format!("invalid wallet response: {e}")))?;

        info!(function = %call.function, tx_hash = %submitted.hash, "Wallet submitted transaction");
        Ok(submitted.hash)
    }
}
