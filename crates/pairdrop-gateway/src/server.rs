// SPDX-FileCopyrightText: 2026 Pairdrop Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state.

use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use pairdrop_allocator::Allocator;
use pairdrop_core::PairdropError;
use pairdrop_storage::PairStore;

use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// Owner and pair catalog plus the claim ledger.
    pub store: Arc<PairStore>,
    /// Claim allocation engine over the same store.
    pub allocator: Arc<Allocator>,
}

/// Gateway server configuration (mirrors GatewayConfig from pairdrop-config).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
}

/// Build the full route tree over `state`.
///
/// Split out from [`start_server`] so tests can drive the router without
/// binding a socket.
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/health", get(handlers::get_health))
        .route("/v1/owners", post(handlers::post_owner).get(handlers::list_owners))
        .route("/v1/owners/{owner_id}", get(handlers::get_owner))
        .route("/v1/owners/{owner_id}/contact", put(handlers::put_contact))
        .route(
            "/v1/owners/{owner_id}/pairs",
            post(handlers::post_pair).get(handlers::list_pairs),
        )
        .route("/v1/owners/{owner_id}/claims", get(handlers::list_claims))
        .route("/v1/pairs/{pair_id}", delete(handlers::delete_pair))
        .route(
            "/v1/claims/{owner_id}",
            get(handlers::get_claim_status).post(handlers::post_claim),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the gateway HTTP server and serve until the process exits.
pub async fn start_server(config: &ServerConfig, state: GatewayState) -> Result<(), PairdropError> {
    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| PairdropError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| PairdropError::Internal(format!("gateway server error: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_config_debug() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8787,
        };
        let debug = format!("{config:?}");
        assert!(debug.contains("127.0.0.1"));
        assert!(debug.contains("8787"));
    }
}
