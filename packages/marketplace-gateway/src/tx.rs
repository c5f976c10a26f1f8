//! Contract call payload construction.
//!
//! Every call to the marketplace module — view or entry — is the same
//! fixed shape: a fully-qualified function id, empty type arguments,
//! and positional arguments. The argument encodings here are
//! wire-exact; the contract rejects anything else.

use crate::config::Config;
use serde::Serialize;
use serde_json::{json, Value};

/// A `module::function` call payload.
#[derive(Debug, Clone, Serialize)]
pub struct FunctionCall {
    pub function: String,
    pub type_arguments: Vec<String>,
    pub arguments: Vec<Value>,
}

impl FunctionCall {
    pub fn new(function: String, arguments: Vec<Value>) -> Self {
        Self {
            function,
            type_arguments: Vec::new(),
            arguments,
        }
    }
}

/// Mint a new NFT. Text fields travel as byte arrays, rarity as a
/// plain number.
pub fn mint_nft(config: &Config, name: &str, description: &str, uri: &str, rarity: u64) -> FunctionCall {
    FunctionCall::new(
        config.function_id("mint_nft"),
        vec![
            json!(name.as_bytes()),
            json!(description.as_bytes()),
            json!(uri.as_bytes()),
            json!(rarity),
        ],
    )
}

/// List an owned NFT for sale at a price in octas.
pub fn list_for_sale(config: &Config, id: u64, price_octas: u64) -> FunctionCall {
    FunctionCall::new(
        config.function_id("list_for_sale"),
        vec![json!(id.to_string()), json!(price_octas.to_string())],
    )
}

/// Purchase a listed NFT from its current owner.
pub fn purchase_nft(config: &Config, owner: &str, id: u64) -> FunctionCall {
    FunctionCall::new(
        config.function_id("purchase_nft"),
        vec![json!(owner), json!(id.to_string())],
    )
}

/// Transfer an owned NFT to another account.
pub fn transfer_nft(config: &Config, recipient: &str, id: u64) -> FunctionCall {
    FunctionCall::new(
        config.function_id("transfer_nft"),
        vec![json!(recipient), json!(id.to_string())],
    )
}

/// Donate octas to a creator.
pub fn donate_to_creator(config: &Config, creator: &str, amount_octas: u64) -> FunctionCall {
    FunctionCall::new(
        config.function_id("donate_to_creator"),
        vec![json!(creator), json!(amount_octas.to_string())],
    )
}

/// One-time marketplace initialization. No arguments; failure is
/// expected when already initialized.
pub fn initialize(config: &Config) -> FunctionCall {
    FunctionCall::new(config.function_id("initialize"), vec![])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_config() -> Config {
        Config {
            marketplace_address: "0xcafe".into(),
            module_name: "NFTMarketplace".into(),
            ..Config::default()
        }
    }

    #[test]
    fn test_mint_argument_shape() {
        let call = mint_nft(&test_config(), "Test", "desc", "uri", 3);
        assert_eq!(call.function, "0xcafe::NFTMarketplace::mint_nft");
        assert!(call.type_arguments.is_empty());
        assert_eq!(
            call.arguments,
            vec![
                json!([84, 101, 115, 116]), // bytes("Test")
                json!([100, 101, 115, 99]),
                json!([117, 114, 105]),
                json!(3),
            ]
        );
    }

    #[test]
    fn test_purchase_argument_shape() {
        let call = purchase_nft(&test_config(), "0xabc", 7);
        assert_eq!(call.function, "0xcafe::NFTMarketplace::purchase_nft");
        assert_eq!(call.arguments, vec![json!("0xabc"), json!("7")]);
    }

    #[test]
    fn test_list_for_sale_stringifies_amounts() {
        let call = list_for_sale(&test_config(), 7, 250_000_000);
        assert_eq!(call.arguments, vec![json!("7"), json!("250000000")]);
    }

    #[test]
    fn test_transfer_argument_shape() {
        let call = transfer_nft(&test_config(), "0xbeef", 2);
        assert_eq!(call.arguments, vec![json!("0xbeef"), json!("2")]);
    }

    #[test]
    fn test_donate_argument_shape() {
        let call = donate_to_creator(&test_config(), "0xabc", 10_000_000);
        assert_eq!(call.arguments, vec![json!("0xabc"), json!("10000000")]);
    }

    #[test]
    fn test_initialize_takes_no_arguments() {
        let call = initialize(&test_config());
        assert_eq!(call.function, "0xcafe::NFTMarketplace::initialize");
        assert!(call.arguments.is_empty());
        assert!(call.type_arguments.is_empty());
    }
}
