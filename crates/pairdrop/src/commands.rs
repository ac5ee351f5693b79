// SPDX-FileCopyrightText: 2026 Pairdrop Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Owner, catalog, and claim command implementations.
//!
//! Each command opens the configured store, does its work, and checkpoints
//! the database on the way out. The claim commands act as this machine's
//! device, using the locally persisted identity.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use pairdrop_allocator::{Allocator, AllocatorSettings};
use pairdrop_config::PairdropConfig;
use pairdrop_core::types::{OwnerId, PairView};
use pairdrop_core::PairdropError;
use pairdrop_identity::DeviceIdentity;
use pairdrop_storage::PairStore;

pub async fn owner_add(
    config: &PairdropConfig,
    name: &str,
    handle: &str,
) -> Result<(), PairdropError> {
    let store = open_store(config).await?;
    let owner = store.add_owner(name, handle).await?;
    println!("{}  {}  {}", owner.id, owner.display_name, owner.contact_handle);
    store.close().await
}

pub async fn owner_list(config: &PairdropConfig) -> Result<(), PairdropError> {
    let store = open_store(config).await?;
    for owner in store.owners().await? {
        println!("{}  {}  {}", owner.id, owner.display_name, owner.contact_handle);
    }
    store.close().await
}

pub async fn pair_add(
    config: &PairdropConfig,
    owner_id: &str,
    link: &str,
    message: &str,
    limit: Option<i64>,
) -> Result<(), PairdropError> {
    let store = open_store(config).await?;
    let pair = store.add_pair(owner_id, link, message, limit).await?;
    println!("{}  {}", pair.id, pair.resource_link);
    store.close().await
}

pub async fn pair_list(config: &PairdropConfig, owner_id: &str) -> Result<(), PairdropError> {
    let store = open_store(config).await?;
    for pair in store.pairs(owner_id).await? {
        let status = if pair.is_eligible() {
            format!("available {}/{}", pair.usage_count, pair.effective_limit())
        } else {
            "exhausted".to_string()
        };
        println!("{}  {}  {}", pair.id, status, pair.resource_link);
    }
    store.close().await
}

pub async fn pair_remove(config: &PairdropConfig, pair_id: &str) -> Result<(), PairdropError> {
    let store = open_store(config).await?;
    store.remove_pair(pair_id).await?;
    println!("removed {pair_id}");
    store.close().await
}

pub async fn claim(
    config: &PairdropConfig,
    owner_id: &str,
    json: bool,
) -> Result<(), PairdropError> {
    let store = open_store(config).await?;
    let device = local_device(config)?;
    let allocator = build_allocator(config, store.clone());

    let result = allocator
        .request_claim(device.id(), &OwnerId(owner_id.to_string()))
        .await;
    store.close().await?;
    print_view(result?, json);
    Ok(())
}

pub async fn check(
    config: &PairdropConfig,
    owner_id: &str,
    json: bool,
) -> Result<(), PairdropError> {
    let store = open_store(config).await?;
    let device = local_device(config)?;
    let allocator = build_allocator(config, store.clone());

    let held = allocator
        .check_todays_claim(device.id(), &OwnerId(owner_id.to_string()))
        .await;
    store.close().await?;
    match held? {
        Some(view) => print_view(view, json),
        None if json => println!("null"),
        None => println!("no claim today"),
    }
    Ok(())
}

pub async fn claims(config: &PairdropConfig, owner_id: &str) -> Result<(), PairdropError> {
    let store = open_store(config).await?;
    for record in store.claims_for_owner(owner_id).await? {
        println!(
            "{}  {}  {}  {}",
            record.claimed_at, record.device_id, record.pair_id, record.id
        );
    }
    store.close().await
}

async fn open_store(config: &PairdropConfig) -> Result<Arc<PairStore>, PairdropError> {
    Ok(Arc::new(
        PairStore::open(&config.storage.database_path).await?,
    ))
}

fn local_device(config: &PairdropConfig) -> Result<DeviceIdentity, PairdropError> {
    match &config.identity.device_id_path {
        Some(path) => DeviceIdentity::load_or_create(Path::new(path)),
        None => DeviceIdentity::load_or_create_default(),
    }
}

fn build_allocator(config: &PairdropConfig, store: Arc<PairStore>) -> Allocator {
    Allocator::new(
        store,
        AllocatorSettings {
            daily_cap: config.allocator.daily_cap,
            max_retries: config.allocator.claim_max_retries,
            retry_backoff: Duration::from_millis(config.allocator.claim_retry_backoff_ms),
        },
    )
}

fn print_view(view: PairView, json: bool) {
    if json {
        // Serialization of a plain struct cannot fail.
        println!("{}", serde_json::to_string_pretty(&view).unwrap());
    } else {
        println!("link:    {}", view.resource_link);
        println!("message: {}", view.message);
        println!("contact: {}", view.owner_contact_handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::tempdir;

    fn test_config(dir: &Path) -> PairdropConfig {
        let mut config = PairdropConfig::default();
        config.storage.database_path = dir.join("cli.db").display().to_string();
        config.identity.device_id_path = Some(dir.join("device_id").display().to_string());
        config
    }

    #[tokio::test]
    #[serial]
    async fn owner_and_pair_commands_round_trip() {
        let dir = tempdir().unwrap();
        let config = test_config(dir.path());

        owner_add(&config, "Ada", "+234 801 234 5678").await.unwrap();

        let store = open_store(&config).await.unwrap();
        let owners = store.owners().await.unwrap();
        assert_eq!(owners.len(), 1);
        assert_eq!(owners[0].contact_handle, "2348012345678");
        let owner_id = owners[0].id.clone();
        store.close().await.unwrap();

        pair_add(&config, &owner_id, "https://example.com/p/1", "msg", None)
            .await
            .unwrap();
        pair_list(&config, &owner_id).await.unwrap();

        claim(&config, &owner_id, false).await.unwrap();
        // Same-day replay from the same device identity.
        claim(&config, &owner_id, true).await.unwrap();
        check(&config, &owner_id, false).await.unwrap();
        claims(&config, &owner_id).await.unwrap();

        let store = open_store(&config).await.unwrap();
        assert_eq!(store.claims_for_owner(&owner_id).await.unwrap().len(), 1);
        store.close().await.unwrap();
    }

    #[tokio::test]
    #[serial]
    async fn claim_against_unknown_owner_fails() {
        let dir = tempdir().unwrap();
        let config = test_config(dir.path());
        let err = claim(&config, "missing", false).await.unwrap_err();
        assert!(matches!(err, PairdropError::NotFound { .. } | PairdropError::NoPairsAvailable));
    }
}
