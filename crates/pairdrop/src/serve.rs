// SPDX-FileCopyrightText: 2026 Pairdrop Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `pairdrop serve` command implementation.
//!
//! Opens the store, wires the allocator, and runs the HTTP gateway until
//! interrupted. The database is WAL-checkpointed on shutdown.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use pairdrop_allocator::{Allocator, AllocatorSettings};
use pairdrop_config::PairdropConfig;
use pairdrop_core::PairdropError;
use pairdrop_gateway::{GatewayState, ServerConfig, start_server};
use pairdrop_storage::PairStore;

/// Run the gateway server until ctrl-c.
pub async fn run_serve(config: &PairdropConfig) -> Result<(), PairdropError> {
    init_tracing(&config.service.log_level);

    let store = Arc::new(PairStore::open(&config.storage.database_path).await?);
    info!(path = %config.storage.database_path, "store opened");

    let allocator = Arc::new(Allocator::new(
        store.clone(),
        AllocatorSettings {
            daily_cap: config.allocator.daily_cap,
            max_retries: config.allocator.claim_max_retries,
            retry_backoff: Duration::from_millis(config.allocator.claim_retry_backoff_ms),
        },
    ));

    let server_config = ServerConfig {
        host: config.gateway.host.clone(),
        port: config.gateway.port,
    };
    let state = GatewayState {
        store: store.clone(),
        allocator,
    };

    let server = tokio::spawn(async move {
        if let Err(e) = start_server(&server_config, state).await {
            tracing::error!("gateway server error: {e}");
        }
    });

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| PairdropError::Internal(format!("failed to listen for ctrl-c: {e}")))?;
    info!("shutdown requested");

    server.abort();
    store.close().await?;
    info!("store checkpointed, bye");
    Ok(())
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("pairdrop={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
