// SPDX-FileCopyrightText: 2026 Pairdrop Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The storage-collaborator contract the allocator depends on.

use async_trait::async_trait;
use rand::rngs::StdRng;

use crate::error::PairdropError;
use crate::types::{
    AllocationOutcome, AllocationRequest, DeviceClaim, DeviceId, OwnerId, PairId, PairView,
};

/// Persistent claim ledger: daily counters, device claim history, pair claim
/// status, and the append-only audit log.
///
/// `allocate` must be atomic with respect to any other concurrent `allocate`
/// for the same owner -- two callers must never both succeed when one daily
/// slot remains, and must never both reserve the same pair slot. Cap and
/// no-pairs checks are outcomes, not errors; a transient write conflict is
/// reported as [`PairdropError::Conflict`] and is safe to retry.
#[async_trait]
pub trait ClaimLedger: Send + Sync {
    /// Look up the claim record for a (device, owner) combination.
    async fn device_claim(
        &self,
        device: &DeviceId,
        owner: &OwnerId,
    ) -> Result<Option<DeviceClaim>, PairdropError>;

    /// Resolve a pair to its visitor-facing view, joined with the owning
    /// account's contact handle. Returns `None` if the pair no longer exists.
    async fn pair_view(&self, pair: &PairId) -> Result<Option<PairView>, PairdropError>;

    /// Execute one atomic claim attempt: check the daily counter, pick an
    /// eligible pair uniformly at random with `rng`, and commit all ledger
    /// writes -- or roll back leaving no trace.
    async fn allocate(
        &self,
        request: AllocationRequest,
        rng: StdRng,
    ) -> Result<AllocationOutcome, PairdropError>;
}
