//! Wallet session state and the `wallet-connected` cookie.
//!
//! The cookie is a UX gate, not a security boundary: it only decides
//! whether wallet-required pages render or redirect to the landing
//! route. The wallet service remains the authority on who is actually
//! connected.

use std::sync::RwLock;

pub const WALLET_COOKIE: &str = "wallet-connected";

/// Connected-wallet session. One wallet at a time, mirroring a browser
/// with one extension.
#[derive(Default)]
pub struct SessionState {
    address: RwLock<Option<String>>,
}

impl SessionState {
    /// Record a connected account.
    pub fn connect(&self, address: String) {
        let mut guard = self.address.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(address);
    }

    /// Disconnection always wins over anything in flight.
    pub fn disconnect(&self) {
        let mut guard = self.address.write().unwrap_or_else(|e| e.into_inner());
        *guard = None;
    }

    pub fn address(&self) -> Option<String> {
        self.address
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn is_connected(&self) -> bool {
        self.address
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }
}

/// `Set-Cookie` value marking the session connected.
pub fn connect_cookie() -> String {
    format!("{WALLET_COOKIE}=true; Path=/; Secure; SameSite=Strict")
}

/// `Set-Cookie` value clearing the session.
pub fn clear_cookie() -> String {
    format!("{WALLET_COOKIE}=; Path=/; Max-Age=0; Secure; SameSite=Strict")
}

/// Read one cookie's value out of a `Cookie` request header.
pub fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').find_map(|pair| {
        let (k, v) = pair.trim().split_once('=')?;
        (k == name).then_some(v)
    })
}
