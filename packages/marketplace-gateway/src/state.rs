//! Application state shared across handlers.

use crate::config::Config;
use crate::rpc::NodeClient;
use crate::session::SessionState;
use crate::wallet::WalletClient;
use std::sync::atomic::AtomicU64;
use std::time::Instant;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub rpc: NodeClient,
    pub wallet: WalletClient,
    pub session: SessionState,
    pub start_time: Instant,
    pub request_count: AtomicU64,
}

impl AppState {
    /// Create application state from configuration.
    pub fn new(config: Config) -> Self {
        Self {
            rpc: NodeClient::new(&config.node_url, &config.fallback_node_url),
            wallet: WalletClient::new(&config.wallet_url),
            session: SessionState::default(),
            config,
            start_time: Instant::now(),
            request_count: AtomicU64::new(0),
        }
    }
}
