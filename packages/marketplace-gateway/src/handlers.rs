//! HTTP request handlers: one per marketplace page.
//!
//! Every handler is the same cycle: fetch → decode → filter → respond,
//! with mutating handlers submitting through the wallet, waiting for
//! finality, then re-fetching the dependent view so the response
//! matches chain state. Failures come back as notifications; nothing
//! here is fatal and nothing is retried automatically.

use crate::codec;
use crate::metrics::METRICS;
use crate::response::{HealthResponse, Notification};
use crate::session;
use crate::state::AppState;
use crate::tx::{self, FunctionCall};
use crate::views;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Landing route: connection state and marketplace coordinates.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "name": "marketplace-gateway",
        "marketplace": state.config.marketplace_address,
        "module": state.config.module_name,
        "connected": state.session.is_connected(),
        "account": state.session.address(),
    }))
}

/// Health check with node and session status.
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let status = state.rpc.health_check().await.unwrap_or("unavailable");
    Json(HealthResponse {
        status,
        connected_account: state.session.address(),
        marketplace: state.config.module_id(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        requests: state.request_count.load(Ordering::Relaxed),
        active_node: state.rpc.active_url().to_string(),
        failovers: state.rpc.failover_count(),
    })
}

/// Prometheus metrics in text exposition format.
pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let body = METRICS.render(state.request_count.load(Ordering::Relaxed));
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
}

// --- Wallet session ---

/// Open a wallet session: verify the wallet service is reachable,
/// record the account, and set the `wallet-connected` cookie.
pub async fn connect(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let address = match state.wallet.account().await {
        Ok(addr) => addr,
        Err(e) => {
            warn!(error = %e, "Wallet connection failed");
            return (
                StatusCode::BAD_GATEWAY,
                axum::http::HeaderMap::new(),
                Json(Notification::err(
                    "Connection Failed",
                    "Could not reach your wallet. Please try again.",
                )),
            );
        }
    };

    info!(account = %address, "Wallet connected");
    state.session.connect(address.clone());

    let mut headers = axum::http::HeaderMap::new();
    if let Ok(cookie) = header::HeaderValue::from_str(&session::connect_cookie()) {
        headers.insert(header::SET_COOKIE, cookie);
    }
    (
        StatusCode::OK,
        headers,
        Json(
            Notification::ok("Wallet Connected", "Your wallet is now connected")
                .with_data(json!({ "account": address })),
        ),
    )
}

/// Close the wallet session and clear the cookie. Disconnection always
/// wins over any pending page render.
pub async fn disconnect(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.session.disconnect();
    info!("Wallet disconnected");

    let mut headers = axum::http::HeaderMap::new();
    if let Ok(cookie) = header::HeaderValue::from_str(&session::clear_cookie()) {
        headers.insert(header::SET_COOKIE, cookie);
    }
    (
        headers,
        Json(Notification::ok(
            "Wallet Disconnected",
            "Your wallet has been disconnected",
        )),
    )
}

// --- Explore ---

#[derive(Deserialize)]
pub struct ExploreQuery {
    /// "all" or a tier number; anything unparseable means no filter.
    pub rarity: Option<String>,
}

/// NFTs listed for sale, optionally filtered by rarity tier.
pub async fn explore(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ExploreQuery>,
) -> (StatusCode, Json<Notification>) {
    let rarity = query
        .rarity
        .as_deref()
        .filter(|r| *r != "all")
        .and_then(|r| r.parse().ok());

    match views::nfts_for_sale(&state, rarity).await {
        Ok(nfts) => (
            StatusCode::OK,
            Json(
                Notification::ok("Explore NFTs", format!("{} NFTs listed for sale", nfts.len()))
                    .with_data(json!({ "nfts": nfts })),
            ),
        ),
        Err(e) => {
            error!(error = %e, "Error fetching NFTs");
            (
                status_for(&e),
                Json(Notification::err(
                    "Error Loading NFTs",
                    "Failed to load NFTs. Please try again.",
                )),
            )
        }
    }
}

#[derive(Deserialize)]
pub struct PurchaseRequest {
    pub id: u64,
    pub owner: String,
}

/// Buy a listed NFT. Looks the listing up first so the success
/// notification can name the price, then re-fetches the for-sale list.
pub async fn purchase(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PurchaseRequest>,
) -> (StatusCode, Json<Notification>) {
    if let Err(resp) = require_session(&state) {
        return resp;
    }

    let listing = match views::nfts_for_sale(&state, None).await {
        Ok(nfts) => nfts
            .into_iter()
            .find(|n| n.id == request.id && n.owner == request.owner),
        Err(e) => {
            error!(error = %e, "Error fetching listings before purchase");
            return (
                status_for(&e),
                Json(Notification::err(
                    "Error Purchasing NFT",
                    "Failed to purchase NFT. Please try again.",
                )),
            );
        }
    };

    let Some(listing) = listing else {
        return (
            StatusCode::NOT_FOUND,
            Json(Notification::err(
                "Error Purchasing NFT",
                "This NFT is no longer listed for sale",
            )),
        );
    };

    let call = tx::purchase_nft(&state.config, &request.owner, request.id);
    match submit_and_wait(&state, &call).await {
        Ok(tx_hash) => {
            let refreshed = views::nfts_for_sale(&state, None).await.unwrap_or_default();
            (
                StatusCode::OK,
                Json(
                    Notification::ok(
                        "NFT Purchased",
                        format!(
                            "You have successfully purchased the NFT for {} APT",
                            codec::format_apt(listing.price)
                        ),
                    )
                    .with_data(json!({ "nfts": refreshed }))
                    .with_tx_hash(tx_hash),
                ),
            )
        }
        Err(e) => {
            error!(error = %e, id = request.id, "Error purchasing NFT");
            (
                status_for(&e),
                Json(Notification::err(
                    "Error Purchasing NFT",
                    "Failed to purchase NFT. Please try again.",
                )),
            )
        }
    }
}

// --- Mint ---

/// The connected account's mintable NFTs.
pub async fn user_nfts(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Notification>) {
    let address = match require_session(&state) {
        Ok(addr) => addr,
        Err(resp) => return resp,
    };

    match views::user_nfts(&state, &address).await {
        Ok(nfts) => (
            StatusCode::OK,
            Json(
                Notification::ok("Your Minted NFTs", format!("{} NFTs available", nfts.len()))
                    .with_data(json!({ "nfts": nfts })),
            ),
        ),
        Err(e) => {
            error!(error = %e, "Error fetching user NFTs");
            (
                status_for(&e),
                Json(Notification::err(
                    "Error Loading NFTs",
                    "Failed to load your NFTs. Please try again.",
                )),
            )
        }
    }
}

#[derive(Deserialize)]
pub struct MintRequest {
    pub name: String,
    pub description: String,
    pub uri: String,
    pub rarity: u64,
}

/// Mint a new NFT, then refresh the user-NFT list.
pub async fn mint(
    State(state): State<Arc<AppState>>,
    Json(request): Json<MintRequest>,
) -> (StatusCode, Json<Notification>) {
    let address = match require_session(&state) {
        Ok(addr) => addr,
        Err(resp) => return resp,
    };

    let call = tx::mint_nft(
        &state.config,
        &request.name,
        &request.description,
        &request.uri,
        request.rarity,
    );
    match submit_and_wait(&state, &call).await {
        Ok(tx_hash) => {
            let refreshed = views::user_nfts(&state, &address).await.unwrap_or_default();
            (
                StatusCode::OK,
                Json(
                    Notification::ok(
                        "NFT Minted Successfully",
                        "Your NFT has been minted successfully",
                    )
                    .with_data(json!({ "nfts": refreshed }))
                    .with_tx_hash(tx_hash),
                ),
            )
        }
        Err(e) => {
            error!(error = %e, name = %request.name, "Mint error");
            (
                status_for(&e),
                Json(Notification::err(
                    "Error Minting NFT",
                    "There was an error minting your NFT. Please try again.",
                )),
            )
        }
    }
}

#[derive(Deserialize)]
pub struct ListRequest {
    pub id: u64,
    pub price_apt: f64,
}

/// List an owned NFT for sale at a price in APT.
pub async fn list_for_sale(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ListRequest>,
) -> (StatusCode, Json<Notification>) {
    let address = match require_session(&state) {
        Ok(addr) => addr,
        Err(resp) => return resp,
    };

    let price_octas = codec::apt_to_octas(request.price_apt);
    if price_octas == 0 {
        return (
            StatusCode::BAD_REQUEST,
            Json(Notification::err(
                "Error Listing NFT",
                "Price must be greater than zero",
            )),
        );
    }

    let call = tx::list_for_sale(&state.config, request.id, price_octas);
    match submit_and_wait(&state, &call).await {
        Ok(tx_hash) => {
            let refreshed = views::user_nfts(&state, &address).await.unwrap_or_default();
            (
                StatusCode::OK,
                Json(
                    Notification::ok(
                        "NFT Listed",
                        format!(
                            "Your NFT has been listed for {} APT",
                            codec::format_apt(request.price_apt)
                        ),
                    )
                    .with_data(json!({ "nfts": refreshed }))
                    .with_tx_hash(tx_hash),
                ),
            )
        }
        Err(e) => {
            error!(error = %e, id = request.id, "Error listing NFT for sale");
            (
                status_for(&e),
                Json(Notification::err(
                    "Error Listing NFT",
                    "Failed to list NFT for sale. Please try again.",
                )),
            )
        }
    }
}

// --- Purchased ---

/// Purchased and received NFTs. A failed received-list fetch degrades
/// to an empty list rather than failing the page.
pub async fn purchased(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Notification>) {
    let address = match require_session(&state) {
        Ok(addr) => addr,
        Err(resp) => return resp,
    };

    let purchased = match views::purchased_nfts(&state, &address).await {
        Ok(nfts) => nfts,
        Err(e) => {
            error!(error = %e, "Error fetching purchased NFTs");
            return (
                status_for(&e),
                Json(Notification::err(
                    "Error Loading NFTs",
                    "Failed to load your purchased NFTs. Please try again.",
                )),
            );
        }
    };

    let received = match views::received_nfts(&state, &address).await {
        Ok(nfts) => nfts,
        Err(e) => {
            warn!(error = %e, "Error fetching received NFTs");
            Vec::new()
        }
    };

    (
        StatusCode::OK,
        Json(
            Notification::ok(
                "Your Purchased NFTs",
                format!("{} purchased, {} received", purchased.len(), received.len()),
            )
            .with_data(json!({ "purchased": purchased, "received": received })),
        ),
    )
}

#[derive(Deserialize)]
pub struct TransferRequest {
    pub id: u64,
    pub recipient: String,
}

/// Transfer an owned NFT, then refresh both purchased and received
/// lists.
pub async fn transfer(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TransferRequest>,
) -> (StatusCode, Json<Notification>) {
    let address = match require_session(&state) {
        Ok(addr) => addr,
        Err(resp) => return resp,
    };

    let call = tx::transfer_nft(&state.config, &request.recipient, request.id);
    match submit_and_wait(&state, &call).await {
        Ok(tx_hash) => {
            let purchased = views::purchased_nfts(&state, &address)
                .await
                .unwrap_or_default();
            let received = views::received_nfts(&state, &address)
                .await
                .unwrap_or_default();
            (
                StatusCode::OK,
                Json(
                    Notification::ok(
                        "NFT Transferred",
                        "Your NFT has been transferred successfully",
                    )
                    .with_data(json!({ "purchased": purchased, "received": received }))
                    .with_tx_hash(tx_hash),
                ),
            )
        }
        Err(e) => {
            error!(error = %e, id = request.id, "Error transferring NFT");
            (
                status_for(&e),
                Json(Notification::err(
                    "Error",
                    "Failed to transfer NFT. Please try again.",
                )),
            )
        }
    }
}

// --- Donate ---

/// Creator aggregates plus the page's summary counts.
pub async fn creators(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Notification>) {
    let address = match require_session(&state) {
        Ok(addr) => addr,
        Err(resp) => return resp,
    };

    match views::creators(&state, &address).await {
        Ok(creators) => {
            let active_creators = creators.len();
            let total_created: u64 = creators.iter().map(|c| c.total_nfts).sum();
            let total_listed: u64 = creators.iter().map(|c| c.listed_nfts).sum();
            (
                StatusCode::OK,
                Json(
                    Notification::ok(
                        "Support NFT Creators",
                        format!("{active_creators} active creators"),
                    )
                    .with_data(json!({
                        "creators": creators,
                        "active_creators": active_creators,
                        "total_nfts_created": total_created,
                        "nfts_for_sale": total_listed,
                    })),
                ),
            )
        }
        Err(e) => {
            error!(error = %e, "Error fetching creators");
            (
                status_for(&e),
                Json(Notification::err(
                    "Error",
                    "Failed to load creator information",
                )),
            )
        }
    }
}

#[derive(Deserialize)]
pub struct DonateRequest {
    pub creator: String,
    pub amount_apt: f64,
}

/// Donate APT to a creator.
pub async fn donate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DonateRequest>,
) -> (StatusCode, Json<Notification>) {
    if let Err(resp) = require_session(&state) {
        return resp;
    }

    let amount_octas = codec::apt_to_octas(request.amount_apt);
    if amount_octas == 0 {
        return (
            StatusCode::BAD_REQUEST,
            Json(Notification::err(
                "Error",
                "Donation amount must be greater than zero",
            )),
        );
    }

    let call = tx::donate_to_creator(&state.config, &request.creator, amount_octas);
    match submit_and_wait(&state, &call).await {
        Ok(tx_hash) => (
            StatusCode::OK,
            Json(
                Notification::ok(
                    "Donation Successful",
                    format!(
                        "You have donated {} APT to the creator",
                        codec::format_apt(request.amount_apt)
                    ),
                )
                .with_tx_hash(tx_hash),
            ),
        ),
        Err(e) => {
            error!(error = %e, creator = %request.creator, "Error donating");
            (
                status_for(&e),
                Json(Notification::err(
                    "Error",
                    "Failed to process donation. Please try again.",
                )),
            )
        }
    }
}

// --- Stats ---

/// Marketplace-wide aggregates.
pub async fn stats(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Notification>) {
    match views::marketplace_stats(&state).await {
        Ok(stats) => (
            StatusCode::OK,
            Json(
                Notification::ok("Marketplace Statistics", "Current marketplace totals")
                    .with_data(json!({ "stats": stats })),
            ),
        ),
        Err(e) => {
            error!(error = %e, "Error fetching stats");
            (
                status_for(&e),
                Json(Notification::err(
                    "Error Loading Stats",
                    "Failed to load marketplace statistics",
                )),
            )
        }
    }
}

// --- Initialize ---

/// One-time marketplace initialization. Failure is tolerated — an
/// already-initialized marketplace rejects the call, which is fine.
pub async fn initialize(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Notification>) {
    if let Err(resp) = require_session(&state) {
        return resp;
    }

    let call = tx::initialize(&state.config);
    match submit_and_wait(&state, &call).await {
        Ok(tx_hash) => (
            StatusCode::OK,
            Json(
                Notification::ok(
                    "Marketplace Initialized",
                    "Marketplace initialized successfully",
                )
                .with_tx_hash(tx_hash),
            ),
        ),
        Err(e) => {
            info!(error = %e, "Marketplace initialization skipped");
            (
                StatusCode::OK,
                Json(Notification::ok(
                    "Marketplace Initialization Skipped",
                    "The marketplace is already initialized",
                )),
            )
        }
    }
}

// --- Shared plumbing ---

/// Submit through the wallet and block until finality. One attempt;
/// the user re-submits failed actions manually.
async fn submit_and_wait(state: &AppState, call: &FunctionCall) -> Result<String, crate::Error> {
    METRICS.tx_total.fetch_add(1, Ordering::Relaxed);

    let tx_hash = match state.wallet.sign_and_submit(call).await {
        Ok(hash) => hash,
        Err(e) => {
            METRICS.tx_error.fetch_add(1, Ordering::Relaxed);
            return Err(e);
        }
    };

    let timeout = Duration::from_secs(state.config.tx_timeout_secs);
    match state.rpc.wait_for_transaction(&tx_hash, timeout).await {
        Ok(_) => {
            METRICS.tx_success.fetch_add(1, Ordering::Relaxed);
            info!(function = %call.function, tx_hash = %tx_hash, "Transaction finalized");
            Ok(tx_hash)
        }
        Err(e) => {
            METRICS.tx_error.fetch_add(1, Ordering::Relaxed);
            Err(e)
        }
    }
}

/// Wallet-required handlers read the connected address or bail with a
/// connect prompt.
fn require_session(state: &AppState) -> Result<String, (StatusCode, Json<Notification>)> {
    state.session.address().ok_or_else(|| {
        (
            StatusCode::UNAUTHORIZED,
            Json(Notification::err(
                "Connect Wallet",
                "Please connect your wallet first",
            )),
        )
    })
}

fn status_for(error: &crate::Error) -> StatusCode {
    match error {
        crate::Error::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        crate::Error::Rpc(_) => StatusCode::BAD_GATEWAY,
        crate::Error::Wallet(_) => StatusCode::BAD_REQUEST,
        crate::Error::Tx(_) => StatusCode::BAD_REQUEST,
    }
}

#[cfg(test)]
mod tests {
    //! Success-path tests against stub wallet and fullnode services,
    //! exercising the full submit → finality → re-fetch cycle.

    use super::*;
    use crate::config::Config;
    use crate::router;
    use axum::body::Body;
    use axum::http::Request;
    use axum::routing::{get, post};
    use axum::Router;
    use serde_json::Value;
    use tower::util::ServiceExt;

    async fn spawn(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn nft_row(id: u64, owner: &str, price: &str, for_sale: bool) -> Value {
        json!({
            "id": id.to_string(),
            "owner": owner,
            "minter": owner,
            "name": "0x54657374",
            "description": "0x6120746573742e",
            "uri": "0x68747470733a2f2f6578616d706c652e636f6d2f372e706e67",
            "price": price,
            "for_sale": for_sale,
            "rarity": "2"
        })
    }

    /// Fullnode stub: one NFT listed for sale, one owned by the buyer,
    /// every submitted transaction already final and successful.
    async fn stub_node() -> String {
        let app = Router::new()
            .route(
                "/v1/view",
                post(|Json(call): Json<Value>| async move {
                    let function = call["function"].as_str().unwrap_or_default();
                    if function.ends_with("::get_all_nfts_for_sale") {
                        Json(json!([[nft_row(7, "0xseller", "250000000", true)]]))
                    } else if function.ends_with("::get_user_nfts") {
                        Json(json!([[nft_row(9, "0xbuyer", "0", false)]]))
                    } else {
                        Json(json!([[]]))
                    }
                }),
            )
            .route(
                "/v1/transactions/by_hash/{hash}",
                get(|| async {
                    Json(json!({
                        "type": "user_transaction",
                        "success": true,
                        "vm_status": "Executed successfully"
                    }))
                }),
            );
        spawn(app).await
    }

    /// Wallet stub that signs everything it is handed.
    async fn stub_wallet() -> String {
        let app = Router::new()
            .route(
                "/account",
                get(|| async { Json(json!({ "address": "0xbuyer" })) }),
            )
            .route(
                "/transactions",
                post(|| async { Json(json!({ "hash": "0xfeed" })) }),
            );
        spawn(app).await
    }

    async fn test_app() -> Router {
        let node = stub_node().await;
        let config = Config {
            node_url: node.clone(),
            fallback_node_url: node,
            wallet_url: stub_wallet().await,
            marketplace_address: "0xcafe".into(),
            tx_timeout_secs: 5,
            ..Config::default()
        };
        let state = Arc::new(AppState::new(config));
        state.session.connect("0xbuyer".into());
        router::create(state)
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_purchase_reports_price_and_refreshes_listings() {
        let response = test_app()
            .await
            .oneshot(
                Request::post("/explore/purchase")
                    .header(header::COOKIE, "wallet-connected=true")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"id":7,"owner":"0xseller"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["success"], json!(true));
        assert_eq!(
            body["description"],
            json!("You have successfully purchased the NFT for 2.5 APT")
        );
        assert_eq!(body["tx_hash"], json!("0xfeed"));
        // The for-sale list was re-fetched after finality
        assert_eq!(body["data"]["nfts"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_purchase_of_unlisted_nft_is_not_found() {
        let response = test_app()
            .await
            .oneshot(
                Request::post("/explore/purchase")
                    .header(header::COOKIE, "wallet-connected=true")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"id":999,"owner":"0xseller"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = json_body(response).await;
        assert_eq!(body["success"], json!(false));
    }

    #[tokio::test]
    async fn test_mint_refreshes_user_nfts() {
        let response = test_app()
            .await
            .oneshot(
                Request::post("/mint")
                    .header(header::COOKIE, "wallet-connected=true")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        r#"{"name":"Test","description":"a test.","uri":"https://example.com/7.png","rarity":2}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["tx_hash"], json!("0xfeed"));
        // The response carries the re-fetched user-NFT list
        let nfts = body["data"]["nfts"].as_array().unwrap();
        assert_eq!(nfts.len(), 1);
        assert_eq!(nfts[0]["id"], json!(9));
        assert_eq!(nfts[0]["name"], json!("Test"));
    }
}
