// SPDX-FileCopyrightText: 2026 Pairdrop Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite-backed store implementing the [`ClaimLedger`] contract.
//!
//! Wraps a [`Database`] handle and delegates all operations to the typed
//! query modules. The catalog surface (owners, pairs) lives here alongside
//! the ledger seam so callers hold one handle.

use async_trait::async_trait;
use rand::rngs::StdRng;

use pairdrop_core::types::{
    AllocationOutcome, AllocationRequest, ClaimRecord, DeviceClaim, DeviceId, Owner, OwnerId,
    Pair, PairId, PairView,
};
use pairdrop_core::{ClaimLedger, PairdropError};

use crate::database::Database;
use crate::queries;

/// SQLite-backed pair store.
pub struct PairStore {
    db: Database,
}

impl PairStore {
    /// Open (creating and migrating if needed) the store at `path`.
    pub async fn open(path: &str) -> Result<Self, PairdropError> {
        Ok(Self {
            db: Database::open(path).await?,
        })
    }

    /// The underlying database handle.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Checkpoint and release before shutdown.
    pub async fn close(&self) -> Result<(), PairdropError> {
        self.db.close().await
    }

    // --- Owner operations ---

    pub async fn add_owner(
        &self,
        display_name: &str,
        contact_handle: &str,
    ) -> Result<Owner, PairdropError> {
        queries::owners::create_owner(&self.db, display_name, contact_handle).await
    }

    pub async fn owner(&self, id: &str) -> Result<Option<Owner>, PairdropError> {
        queries::owners::get_owner(&self.db, id).await
    }

    pub async fn owners(&self) -> Result<Vec<Owner>, PairdropError> {
        queries::owners::list_owners(&self.db).await
    }

    pub async fn set_contact_handle(
        &self,
        id: &str,
        contact_handle: &str,
    ) -> Result<(), PairdropError> {
        queries::owners::update_contact_handle(&self.db, id, contact_handle).await
    }

    // --- Pair catalog operations ---

    pub async fn add_pair(
        &self,
        owner_id: &str,
        resource_link: &str,
        message: &str,
        usage_limit: Option<i64>,
    ) -> Result<Pair, PairdropError> {
        // Adding to an unknown owner is a caller error, not a FK explosion.
        if self.owner(owner_id).await?.is_none() {
            return Err(PairdropError::NotFound {
                entity: "owner",
                id: owner_id.to_string(),
            });
        }
        queries::pairs::insert_pair(&self.db, owner_id, resource_link, message, usage_limit).await
    }

    pub async fn pair(&self, id: &str) -> Result<Option<Pair>, PairdropError> {
        queries::pairs::get_pair(&self.db, id).await
    }

    pub async fn pairs(&self, owner_id: &str) -> Result<Vec<Pair>, PairdropError> {
        queries::pairs::list_pairs(&self.db, owner_id).await
    }

    pub async fn eligible_pairs(&self, owner_id: &str) -> Result<Vec<Pair>, PairdropError> {
        queries::pairs::list_eligible(&self.db, owner_id).await
    }

    pub async fn remove_pair(&self, id: &str) -> Result<(), PairdropError> {
        queries::pairs::soft_delete(&self.db, id).await
    }

    // --- Audit reads ---

    pub async fn claims_for_owner(&self, owner_id: &str) -> Result<Vec<ClaimRecord>, PairdropError> {
        queries::claims::list_claims_for_owner(&self.db, owner_id).await
    }

    pub async fn daily_count(&self, day: &str, owner_id: &str) -> Result<i64, PairdropError> {
        queries::counters::daily_count(&self.db, day, owner_id).await
    }
}

#[async_trait]
impl ClaimLedger for PairStore {
    async fn device_claim(
        &self,
        device: &DeviceId,
        owner: &OwnerId,
    ) -> Result<Option<DeviceClaim>, PairdropError> {
        queries::device_claims::get_device_claim(&self.db, &device.0, &owner.0).await
    }

    async fn pair_view(&self, pair: &PairId) -> Result<Option<PairView>, PairdropError> {
        queries::pairs::pair_view(&self.db, &pair.0).await
    }

    async fn allocate(
        &self,
        request: AllocationRequest,
        rng: StdRng,
    ) -> Result<AllocationOutcome, PairdropError> {
        queries::allocation::allocate(&self.db, request, rng).await
    }
}
