//! View-function gateway: read-only contract queries, decoded and
//! filtered into display records.
//!
//! Each page fetches independently; nothing is cached or de-duplicated
//! across routes. A mutation only refreshes the view it names.

use crate::metrics::METRICS;
use crate::records::{Creator, MarketplaceStats, Nft};
use crate::state::AppState;
use crate::tx::FunctionCall;
use serde_json::{json, Value};
use std::sync::atomic::Ordering;

/// Issue one view call and unwrap the row array the contract returns
/// as its first value. A missing/non-array value is an empty list, not
/// an error.
async fn view_rows(
    state: &AppState,
    function: &str,
    arguments: Vec<Value>,
) -> Result<Vec<Value>, crate::Error> {
    METRICS.view_total.fetch_add(1, Ordering::Relaxed);
    let call = FunctionCall::new(state.config.function_id(function), arguments);
    let response = match state.rpc.view(&call).await {
        Ok(values) => values,
        Err(e) => {
            METRICS.view_errors.fetch_add(1, Ordering::Relaxed);
            return Err(e);
        }
    };
    Ok(response
        .first()
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default())
}

/// NFTs currently listed for sale, optionally restricted to one
/// rarity tier.
pub async fn nfts_for_sale(
    state: &AppState,
    rarity: Option<u64>,
) -> Result<Vec<Nft>, crate::Error> {
    let rows = view_rows(state, "get_all_nfts_for_sale", vec![]).await?;
    let nfts = rows.iter().map(Nft::decode).collect();
    Ok(filter_by_rarity(nfts, rarity))
}

/// NFTs the account minted and still holds unlisted.
pub async fn user_nfts(state: &AppState, address: &str) -> Result<Vec<Nft>, crate::Error> {
    let rows = view_rows(state, "get_user_nfts", vec![json!(address)]).await?;
    Ok(rows.iter().map(Nft::decode).collect())
}

/// NFTs the account bought.
pub async fn purchased_nfts(state: &AppState, address: &str) -> Result<Vec<Nft>, crate::Error> {
    let rows = view_rows(state, "get_purchased_nfts", vec![json!(address)]).await?;
    Ok(rows.iter().map(Nft::decode).collect())
}

/// NFTs transferred to the account by others.
pub async fn received_nfts(state: &AppState, address: &str) -> Result<Vec<Nft>, crate::Error> {
    let rows = view_rows(state, "get_received_nfts", vec![json!(address)]).await?;
    Ok(rows.iter().map(Nft::decode).collect())
}

/// Creator aggregates, excluding the connected account itself and
/// creators with nothing minted.
pub async fn creators(state: &AppState, own_address: &str) -> Result<Vec<Creator>, crate::Error> {
    let rows = view_rows(state, "get_all_creators", vec![]).await?;
    Ok(filter_creators(
        rows.iter().map(Creator::decode).collect(),
        own_address,
    ))
}

/// Contract-computed marketplace aggregates.
pub async fn marketplace_stats(state: &AppState) -> Result<MarketplaceStats, crate::Error> {
    METRICS.view_total.fetch_add(1, Ordering::Relaxed);
    let call = FunctionCall::new(state.config.function_id("get_marketplace_stats"), vec![]);
    let response = match state.rpc.view(&call).await {
        Ok(values) => values,
        Err(e) => {
            METRICS.view_errors.fetch_add(1, Ordering::Relaxed);
            return Err(e);
        }
    };
    // Stats come back as a single struct value, not a row array.
    Ok(MarketplaceStats::decode(
        response.first().unwrap_or(&Value::Null),
    ))
}

pub fn filter_by_rarity(nfts: Vec<Nft>, rarity: Option<u64>) -> Vec<Nft> {
    match rarity {
        Some(tier) => nfts.into_iter().filter(|n| n.rarity == tier).collect(),
        None => nfts,
    }
}

pub fn filter_creators(creators: Vec<Creator>, own_address: &str) -> Vec<Creator> {
    creators
        .into_iter()
        .filter(|c| c.address != own_address && c.total_nfts > 0)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn nft_with_rarity(id: u64, rarity: u64) -> Nft {
        Nft::decode(&json!({
            "id": id.to_string(),
            "owner": "0xabc",
            "minter": "0xabc",
            "name": "0x54657374",
            "description": "0x",
            "uri": "0x",
            "price": "100000000",
            "for_sale": true,
            "rarity": rarity.to_string()
        }))
    }

    #[test]
    fn test_rarity_filter() {
        let nfts = vec![
            nft_with_rarity(1, 1),
            nft_with_rarity(2, 3),
            nft_with_rarity(3, 3),
        ];
        let rare = filter_by_rarity(nfts.clone(), Some(3));
        assert_eq!(rare.len(), 2);
        assert!(rare.iter().all(|n| n.rarity == 3));
        assert_eq!(filter_by_rarity(nfts, None).len(), 3);
    }

    #[test]
    fn test_creator_filter_excludes_self_and_empty() {
        let creators = vec![
            Creator {
                address: "0xme".into(),
                total_nfts: 5,
                listed_nfts: 2,
            },
            Creator {
                address: "0xother".into(),
                total_nfts: 3,
                listed_nfts: 0,
            },
            Creator {
                address: "0xempty".into(),
                total_nfts: 0,
                listed_nfts: 0,
            },
        ];
        let filtered = filter_creators(creators, "0xme");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].address, "0xother");
    }
}
