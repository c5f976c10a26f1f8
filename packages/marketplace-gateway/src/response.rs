//! Response types for the gateway API.

use serde::Serialize;
use serde_json::Value;

/// Non-blocking notification envelope. Every page/action response uses
/// this shape; failures are reported here, never as process faults.
#[derive(Serialize)]
pub struct Notification {
    pub success: bool,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
}

impl Notification {
    pub fn ok(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            success: true,
            title: title.into(),
            description: Some(description.into()),
            data: None,
            tx_hash: None,
        }
    }

    pub fn err(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            success: false,
            title: title.into(),
            description: Some(description.into()),
            data: None,
            tx_hash: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_tx_hash(mut self, tx_hash: impl Into<String>) -> Self {
        self.tx_hash = Some(tx_hash.into());
        self
    }
}

/// Response from the health endpoint.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub connected_account: Option<String>,
    pub marketplace: String,
    pub uptime_secs: u64,
    pub requests: u64,
    pub active_node: String,
    pub failovers: u64,
}
