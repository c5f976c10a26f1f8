//! Display-ready records decoded from raw contract view rows.

use crate::codec;
use serde::Serialize;
use serde_json::Value;

/// A marketplace NFT, decoded for display. Never mutated locally; the
/// authoritative list is always re-fetched after a mutation.
#[derive(Debug, Clone, Serialize)]
pub struct Nft {
    pub id: u64,
    pub owner: String,
    pub minter: String,
    pub name: String,
    pub description: String,
    pub uri: String,
    /// Price in APT (raw octas / 10^8).
    pub price: f64,
    pub for_sale: bool,
    pub rarity: u64,
    pub rarity_label: String,
    pub rarity_color: &'static str,
}

impl Nft {
    /// Decode one raw view row. A malformed field degrades to its
    /// empty/zero value without failing the rest of the record.
    pub fn decode(raw: &Value) -> Self {
        let rarity = codec::parse_u64(&raw["rarity"]);
        Self {
            id: codec::parse_u64(&raw["id"]),
            owner: str_field(raw, "owner"),
            minter: str_field(raw, "minter"),
            name: codec::decode_hex_field(&raw["name"]),
            description: codec::decode_hex_field(&raw["description"]),
            uri: codec::decode_hex_field(&raw["uri"]),
            price: codec::octas_to_apt(codec::parse_u64(&raw["price"])),
            for_sale: raw["for_sale"].as_bool().unwrap_or(false),
            rarity,
            rarity_label: codec::rarity_label(rarity),
            rarity_color: codec::rarity_color(rarity),
        }
    }
}

/// Per-creator aggregate from `get_all_creators`.
#[derive(Debug, Clone, Serialize)]
pub struct Creator {
    pub address: String,
    pub total_nfts: u64,
    pub listed_nfts: u64,
}

impl Creator {
    pub fn decode(raw: &Value) -> Self {
        Self {
            address: str_field(raw, "address"),
            total_nfts: codec::parse_u64(&raw["total_nfts"]),
            listed_nfts: codec::parse_u64(&raw["listed_nfts"]),
        }
    }
}

/// Contract-computed marketplace aggregates. The gateway only
/// unit-converts volume and derives the success-rate percentage.
#[derive(Debug, Clone, Serialize)]
pub struct MarketplaceStats {
    pub total_nfts: u64,
    pub total_listed: u64,
    pub total_sold: u64,
    /// Total sale volume in APT (raw octas / 10^8).
    pub total_volume: f64,
    pub total_creators: u64,
    /// Sold / total, as a percentage. 0 when nothing is minted.
    pub sale_success_rate: f64,
}

impl MarketplaceStats {
    pub fn decode(raw: &Value) -> Self {
        let total_nfts = codec::parse_u64(&raw["total_nfts"]);
        let total_sold = codec::parse_u64(&raw["total_sold"]);
        let sale_success_rate = if total_nfts > 0 {
            total_sold as f64 / total_nfts as f64 * 100.0
        } else {
            0.0
        };
        Self {
            total_nfts,
            total_listed: codec::parse_u64(&raw["total_listed"]),
            total_sold,
            total_volume: codec::octas_to_apt(codec::parse_u64(&raw["total_volume"])),
            total_creators: codec::parse_u64(&raw["total_creators"]),
            sale_success_rate,
        }
    }
}

fn str_field(raw: &Value, key: &str) -> String {
    raw[key].as_str().unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_row() -> Value {
        json!({
            "id": "7",
            "owner": "0xabc",
            "minter": "0xdef",
            "name": "0x54657374", // "Test"
            "description": "0x6120746573742e", // "a test."
            "uri": "0x68747470733a2f2f6578616d706c652e636f6d2f372e706e67",
            "price": "250000000",
            "for_sale": true,
            "rarity": "3"
        })
    }

    #[test]
    fn test_decode_nft_row() {
        let nft = Nft::decode(&sample_row());
        assert_eq!(nft.id, 7);
        assert_eq!(nft.owner, "0xabc");
        assert_eq!(nft.minter, "0xdef");
        assert_eq!(nft.name, "Test");
        assert_eq!(nft.description, "a test.");
        assert_eq!(nft.uri, "https://example.com/7.png");
        assert_eq!(nft.price, 2.5);
        assert!(nft.for_sale);
        assert_eq!(nft.rarity, 3);
        assert_eq!(nft.rarity_label, "Rare");
        assert_eq!(nft.rarity_color, "blue");
    }

    #[test]
    fn test_malformed_field_does_not_sink_record() {
        let mut row = sample_row();
        row["name"] = json!("0xZZZZ");
        let nft = Nft::decode(&row);
        assert_eq!(nft.name, "");
        // The rest of the record still decodes
        assert_eq!(nft.description, "a test.");
        assert_eq!(nft.price, 2.5);
    }

    #[test]
    fn test_out_of_range_rarity_renders_unknown() {
        let mut row = sample_row();
        row["rarity"] = json!("11");
        let nft = Nft::decode(&row);
        assert_eq!(nft.rarity_label, "Unknown (11)");
    }

    #[test]
    fn test_decode_creator_row() {
        let creator = Creator::decode(&json!({
            "address": "0xabc",
            "total_nfts": "4",
            "listed_nfts": "1"
        }));
        assert_eq!(creator.address, "0xabc");
        assert_eq!(creator.total_nfts, 4);
        assert_eq!(creator.listed_nfts, 1);
    }

    #[test]
    fn test_decode_stats_row() {
        let stats = MarketplaceStats::decode(&json!({
            "total_nfts": "10",
            "total_listed": "4",
            "total_sold": "3",
            "total_volume": "750000000",
            "total_creators": "2"
        }));
        assert_eq!(stats.total_nfts, 10);
        assert_eq!(stats.total_volume, 7.5);
        assert_eq!(stats.sale_success_rate, 30.0);
    }

    #[test]
    fn test_stats_success_rate_with_no_mints() {
        let stats = MarketplaceStats::decode(&json!({}));
        assert_eq!(stats.sale_success_rate, 0.0);
        assert_eq!(stats.total_volume, 0.0);
    }
}
