// SPDX-FileCopyrightText: 2026 Pairdrop Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The claim allocation engine.
//!
//! [`Allocator`] sits between the request surface and the [`ClaimLedger`]:
//! it answers "does this device already hold today's pair" and runs the
//! claim protocol -- replay check, then atomic allocation with bounded
//! retries on transient write conflicts.
//!
//! Randomness is owned here. The allocator holds a seedable parent RNG and
//! derives an independent child RNG per allocation attempt, so a fixed seed
//! makes a whole claim sequence reproducible in tests while production uses
//! an entropy seed.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use pairdrop_core::types::{
    AllocationOutcome, AllocationRequest, DeviceId, OwnerId, PairId, PairView,
};
use pairdrop_core::{ClaimLedger, PairdropError, now_iso};
use pairdrop_identity::today_key;

/// Allocation engine configuration knobs.
#[derive(Debug, Clone)]
pub struct AllocatorSettings {
    /// Maximum successful claims per owner per calendar day.
    pub daily_cap: u32,
    /// How many times a claim attempt is retried after a transient
    /// write conflict before giving up.
    pub max_retries: u32,
    /// Pause between conflict retries.
    pub retry_backoff: Duration,
}

impl Default for AllocatorSettings {
    fn default() -> Self {
        Self {
            daily_cap: 1,
            max_retries: 3,
            retry_backoff: Duration::from_millis(25),
        }
    }
}

/// Claim allocation engine over a [`ClaimLedger`].
pub struct Allocator {
    ledger: Arc<dyn ClaimLedger>,
    settings: AllocatorSettings,
    rng: Mutex<StdRng>,
}

impl Allocator {
    /// Build an allocator with an entropy-seeded RNG.
    pub fn new(ledger: Arc<dyn ClaimLedger>, settings: AllocatorSettings) -> Self {
        Self::with_seed(ledger, settings, rand::random())
    }

    /// Build an allocator whose selection sequence is reproducible from
    /// `seed`.
    pub fn with_seed(
        ledger: Arc<dyn ClaimLedger>,
        settings: AllocatorSettings,
        seed: u64,
    ) -> Self {
        Self {
            ledger,
            settings,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// The pair this device already holds for `owner` today, if any.
    ///
    /// A stale claim date means the device has no claim today. A claim whose
    /// pair has since been deleted also resolves to `None`; the consumed
    /// daily slot, not the vanished pair, decides what a retry sees.
    pub async fn check_todays_claim(
        &self,
        device: &DeviceId,
        owner: &OwnerId,
    ) -> Result<Option<PairView>, PairdropError> {
        self.claim_for_day(device, owner, &today_key()).await
    }

    /// Obtain today's pair for this (device, owner) combination.
    ///
    /// Same-day replays return the already-held pair without touching any
    /// counter. Otherwise one daily slot is consumed and a pair is selected
    /// uniformly at random from the owner's eligible catalog.
    pub async fn request_claim(
        &self,
        device: &DeviceId,
        owner: &OwnerId,
    ) -> Result<PairView, PairdropError> {
        self.request_claim_on(device, owner, &today_key()).await
    }

    /// [`Self::check_todays_claim`] against a pinned day key.
    pub async fn claim_for_day(
        &self,
        device: &DeviceId,
        owner: &OwnerId,
        day: &str,
    ) -> Result<Option<PairView>, PairdropError> {
        let Some(claim) = self.ledger.device_claim(device, owner).await? else {
            return Ok(None);
        };
        if claim.last_claim_date != day {
            return Ok(None);
        }
        self.ledger
            .pair_view(&PairId(claim.recent_pair_id))
            .await
    }

    /// [`Self::request_claim`] against a pinned day key.
    pub async fn request_claim_on(
        &self,
        device: &DeviceId,
        owner: &OwnerId,
        day: &str,
    ) -> Result<PairView, PairdropError> {
        if let Some(held) = self.claim_for_day(device, owner, day).await? {
            tracing::debug!(device = %device, owner = %owner, "replaying same-day claim");
            return Ok(held);
        }

        let mut attempt = 0u32;
        let outcome = loop {
            attempt += 1;
            let request = AllocationRequest {
                device_id: device.clone(),
                owner_id: owner.clone(),
                day: day.to_string(),
                now: now_iso(),
                daily_cap: self.settings.daily_cap,
            };
            match self.ledger.allocate(request, self.child_rng()).await {
                Ok(outcome) => break outcome,
                Err(e) if e.is_transient() && attempt <= self.settings.max_retries => {
                    tracing::debug!(attempt, "claim conflicted, retrying");
                    tokio::time::sleep(self.settings.retry_backoff).await;
                }
                Err(e) => return Err(e),
            }
        };

        match outcome {
            AllocationOutcome::Claimed(pair) => {
                tracing::info!(device = %device, owner = %owner, pair = %pair.id, "pair claimed");
                self.ledger
                    .pair_view(&PairId(pair.id.clone()))
                    .await?
                    .ok_or_else(|| {
                        PairdropError::Internal(format!(
                            "claimed pair {} vanished before resolution",
                            pair.id
                        ))
                    })
            }
            AllocationOutcome::CapReached => Err(PairdropError::DailyCapReached),
            AllocationOutcome::NoPairs => Err(PairdropError::NoPairsAvailable),
        }
    }

    fn child_rng(&self) -> StdRng {
        let mut parent = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        StdRng::seed_from_u64(parent.r#gen())
    }
}
