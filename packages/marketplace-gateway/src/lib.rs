//! # Marketplace Gateway
//!
//! HTTP gateway for an on-chain NFT marketplace. Serves display-ready
//! marketplace data from the contract's view functions and forwards
//! mutating calls (mint, list, purchase, transfer, donate) to the
//! connected wallet service for signing, waiting for on-chain finality
//! before reporting success.
//!
//! Ownership, sale state, pricing, and transfer authorization are all
//! enforced by the contract module; the gateway never re-implements
//! these rules.
//!
//! ## Quick Start
//! ```bash
//! cargo run --bin marketplace-gateway
//! ```
//!
//! ## Endpoints
//! - `GET /health` - Health check with metrics
//! - `POST /wallet/connect` - Open a wallet session
//! - `GET /explore` - NFTs listed for sale
//! - `POST /explore/purchase` - Buy a listed NFT

pub mod codec;
pub mod config;
mod error;
mod handlers;
mod metrics;
pub mod middleware;
pub mod records;
mod response;
mod router;
pub mod rpc;
pub mod session;
mod state;
pub mod tx;
pub mod views;
pub mod wallet;

pub use config::Config;
pub use error::Error;
pub use router::create as create_router;
pub use state::AppState;
