//! Decoding and formatting for contract-returned values.
//!
//! The contract returns text fields as hex-encoded byte strings and
//! money as integer octas. Everything here degrades instead of
//! erroring: a malformed hex field becomes an empty string so a single
//! bad field never sinks the record it belongs to.

use serde_json::Value;

/// Octas per APT. Every displayed amount is `raw / OCTAS_PER_APT` and
/// every submitted amount is `floor(apt * OCTAS_PER_APT)`.
pub const OCTAS_PER_APT: u64 = 100_000_000;

/// Decode a hex byte string (optional `0x` prefix) into raw bytes.
/// Empty or malformed input yields an empty vec.
pub fn decode_hex_bytes(hex_str: &str) -> Vec<u8> {
    let stripped = hex_str.strip_prefix("0x").unwrap_or(hex_str);
    hex::decode(stripped).unwrap_or_default()
}

/// Decode a hex byte string into display text. Non-UTF-8 bytes are
/// replaced rather than rejected.
pub fn decode_hex_string(hex_str: &str) -> String {
    String::from_utf8_lossy(&decode_hex_bytes(hex_str)).into_owned()
}

/// Hex-encode bytes with the `0x` prefix the chain uses.
pub fn encode_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Decode a JSON field expected to hold a hex byte string.
pub fn decode_hex_field(value: &Value) -> String {
    value.as_str().map(decode_hex_string).unwrap_or_default()
}

/// Parse a u64 from a JSON number or decimal string. The fullnode
/// serializes Move u64s as strings.
pub fn parse_u64(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n.as_u64().unwrap_or(0),
        Value::String(s) => s.parse().unwrap_or(0),
        _ => 0,
    }
}

pub fn octas_to_apt(octas: u64) -> f64 {
    octas as f64 / OCTAS_PER_APT as f64
}

pub fn apt_to_octas(apt: f64) -> u64 {
    if apt <= 0.0 || !apt.is_finite() {
        return 0;
    }
    (apt * OCTAS_PER_APT as f64).floor() as u64
}

/// Format an APT amount for display: up to 8 fractional digits,
/// trailing zeros trimmed ("2.5", not "2.50000000").
pub fn format_apt(apt: f64) -> String {
    let s = format!("{apt:.8}");
    let s = s.trim_end_matches('0');
    s.trim_end_matches('.').to_string()
}

/// Rarity tier label. Tiers outside 1..=5 render as `Unknown (<n>)`.
pub fn rarity_label(rarity: u64) -> String {
    match rarity {
        1 => "Common".into(),
        2 => "Uncommon".into(),
        3 => "Rare".into(),
        4 => "Epic".into(),
        5 => "Legendary".into(),
        other => format!("Unknown ({other})"),
    }
}

/// Display color for a rarity tier.
pub fn rarity_color(rarity: u64) -> &'static str {
    match rarity {
        1 => "gray",
        2 => "green",
        3 => "blue",
        4 => "purple",
        5 => "yellow",
        _ => "gray",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_hex_roundtrip() {
        let original = "0x54657374"; // "Test"
        let bytes = decode_hex_bytes(original);
        assert_eq!(bytes, b"Test");
        assert_eq!(encode_hex(&bytes), original);
        assert_eq!(decode_hex_string(original), "Test");
    }

    #[test]
    fn test_hex_without_prefix() {
        assert_eq!(decode_hex_string("68656c6c6f"), "hello");
    }

    #[test]
    fn test_malformed_hex_degrades_to_empty() {
        assert_eq!(decode_hex_string(""), "");
        assert_eq!(decode_hex_string("0x"), "");
        assert_eq!(decode_hex_string("zz"), "");
        assert_eq!(decode_hex_string("0xabc"), ""); // odd length
        assert_eq!(decode_hex_field(&json!(42)), "");
        assert_eq!(decode_hex_field(&Value::Null), "");
    }

    #[test]
    fn test_octas_scaling() {
        assert_eq!(octas_to_apt(0), 0.0);
        assert_eq!(octas_to_apt(250_000_000), 2.5);
        assert_eq!(octas_to_apt(100_000_000), 1.0);
        assert_eq!(octas_to_apt(1), 0.00000001);
    }

    #[test]
    fn test_apt_to_octas_floors() {
        assert_eq!(apt_to_octas(2.5), 250_000_000);
        assert_eq!(apt_to_octas(0.1), 10_000_000);
        // Sub-octa precision is floored away
        assert_eq!(apt_to_octas(0.000000019), 1);
        assert_eq!(apt_to_octas(0.0), 0);
        assert_eq!(apt_to_octas(-1.0), 0);
        assert_eq!(apt_to_octas(f64::NAN), 0);
    }

    #[test]
    fn test_user_amount_roundtrip() {
        // A user-entered amount submits as floor(amount * 10^8)
        for amount in [0.1, 1.0, 2.5, 99.99999999] {
            assert_eq!(apt_to_octas(amount), (amount * 1e8).floor() as u64);
        }
    }

    #[test]
    fn test_format_apt_trims_zeros() {
        assert_eq!(format_apt(2.5), "2.5");
        assert_eq!(format_apt(1.0), "1");
        assert_eq!(format_apt(0.00000001), "0.00000001");
        assert_eq!(format_apt(0.0), "0");
    }

    #[test]
    fn test_parse_u64_accepts_numbers_and_strings() {
        assert_eq!(parse_u64(&json!(7)), 7);
        assert_eq!(parse_u64(&json!("250000000")), 250_000_000);
        assert_eq!(parse_u64(&json!("not a number")), 0);
        assert_eq!(parse_u64(&Value::Null), 0);
    }

    #[test]
    fn test_rarity_labels() {
        assert_eq!(rarity_label(1), "Common");
        assert_eq!(rarity_label(3), "Rare");
        assert_eq!(rarity_label(5), "Legendary");
        assert_eq!(rarity_label(0), "Unknown (0)");
        assert_eq!(rarity_label(9), "Unknown (9)");
    }

    #[test]
    fn test_rarity_colors() {
        assert_eq!(rarity_color(5), "yellow");
        assert_eq!(rarity_color(42), "gray");
    }
}
