//! Gateway configuration.

use serde::Deserialize;

/// Configuration for the marketplace gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "defaults::node_url")]
    pub node_url: String,

    #[serde(default = "defaults::fallback_node_url")]
    pub fallback_node_url: String,

    /// Base URL of the wallet service that signs and submits
    /// transactions on behalf of the connected account.
    #[serde(default = "defaults::wallet_url")]
    pub wallet_url: String,

    /// Account address the marketplace module is published under.
    #[serde(default = "defaults::marketplace_address")]
    pub marketplace_address: String,

    #[serde(default = "defaults::module_name")]
    pub module_name: String,

    #[serde(default = "defaults::bind_address")]
    pub bind_address: String,

    /// How long to wait for a submitted transaction to reach finality.
    #[serde(default = "defaults::tx_timeout_secs")]
    pub tx_timeout_secs: u64,
}

impl Config {
    /// Fully-qualified `address::module` id of the marketplace module.
    pub fn module_id(&self) -> String {
        format!("{}::{}", self.marketplace_address, self.module_name)
    }

    /// Fully-qualified `address::module::function` id for a contract
    /// entry point or view function.
    pub fn function_id(&self, name: &str) -> String {
        format!("{}::{}", self.module_id(), name)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            node_url: defaults::node_url(),
            fallback_node_url: defaults::fallback_node_url(),
            wallet_url: defaults::wallet_url(),
            marketplace_address: defaults::marketplace_address(),
            module_name: defaults::module_name(),
            bind_address: defaults::bind_address(),
            tx_timeout_secs: defaults::tx_timeout_secs(),
        }
    }
}

mod defaults {
    fn network() -> String {
        std::env::var("GATEWAY_NETWORK")
            .or_else(|_| std::env::var("APTOS_NETWORK"))
            .unwrap_or_else(|_| "testnet".into())
    }

    pub fn node_url() -> String {
        // Priority: GATEWAY_NODE_URL > network default
        if let Ok(url) = std::env::var("GATEWAY_NODE_URL") {
            if !url.is_empty() {
                return url;
            }
        }
        if network().contains("mainnet") {
            "https://fullnode.mainnet.aptoslabs.com".into()
        } else {
            "https://fullnode.testnet.aptoslabs.com".into()
        }
    }

    pub fn fallback_node_url() -> String {
        if network().contains("mainnet") {
            "https://api.mainnet.aptoslabs.com".into()
        } else {
            "https://api.testnet.aptoslabs.com".into()
        }
    }

    pub fn wallet_url() -> String {
        "http://127.0.0.1:3051".into()
    }

    pub fn marketplace_address() -> String {
        "0x1".into()
    }

    pub fn module_name() -> String {
        "NFTMarketplace".into()
    }

    pub fn bind_address() -> String {
        "0.0.0.0:3050".into()
    }

    pub fn tx_timeout_secs() -> u64 {
        30
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_id() {
        let config = Config {
            marketplace_address: "0xcafe".into(),
            module_name: "NFTMarketplace".into(),
            ..Config::default()
        };
        assert_eq!(
            config.function_id("mint_nft"),
            "0xcafe::NFTMarketplace::mint_nft"
        );
    }
}
