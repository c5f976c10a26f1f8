//! Route guard and request correlation middleware.

use crate::session::{cookie_value, WALLET_COOKIE};
use crate::state::AppState;
use axum::extract::{Request, State};
use axum::http::{header, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use std::sync::atomic::Ordering;
use std::sync::Arc;

/// Pages that require a wallet connection.
pub const PROTECTED_ROUTES: &[&str] = &["/explore", "/mint", "/stats", "/purchased", "/donate"];

pub fn is_protected(path: &str) -> bool {
    PROTECTED_ROUTES.iter().any(|route| path.starts_with(route))
}

/// Redirect wallet-required pages to the landing route while the
/// `wallet-connected` cookie is absent. Two states — connected,
/// disconnected — and disconnection always wins.
pub async fn require_wallet(request: Request, next: Next) -> Response {
    if !is_protected(request.uri().path()) {
        return next.run(request).await;
    }

    let connected = request
        .headers()
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|cookies| cookie_value(cookies, WALLET_COOKIE))
        .map(|v| v == "true")
        .unwrap_or(false);

    if connected {
        next.run(request).await
    } else {
        Redirect::temporary("/").into_response()
    }
}

/// Propagate or generate `x-request-id`, echoed on the response for
/// client-side correlation with the gateway's trace logs.
pub async fn inject_request_id(request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| {
            use rand::Rng;
            let mut rng = rand::thread_rng();
            format!("mkt-{:016x}", rng.gen::<u64>())
        });

    let mut response = next.run(request).await;

    if let Ok(val) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert("x-request-id", val);
    }

    response
}

/// Count every request for the health endpoint.
pub async fn count_request(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    state.request_count.fetch_add(1, Ordering::Relaxed);
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protected_paths() {
        assert!(is_protected("/explore"));
        assert!(is_protected("/explore/purchase"));
        assert!(is_protected("/mint/list"));
        assert!(is_protected("/stats"));
        assert!(is_protected("/purchased/transfer"));
        assert!(is_protected("/donate"));
        assert!(!is_protected("/"));
        assert!(!is_protected("/health"));
        assert!(!is_protected("/wallet/connect"));
    }
}
