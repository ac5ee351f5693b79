// SPDX-FileCopyrightText: 2026 Pairdrop Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the Pairdrop workspace.
//!
//! Row-shaped structs store timestamps as ISO 8601 strings (millisecond
//! precision, UTC) and calendar day keys as `YYYY-MM-DD` strings -- the same
//! representations persisted by the storage layer.

use serde::{Deserialize, Serialize};

/// Unique identifier for an owner account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerId(pub String);

/// Unique identifier for a distributable pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PairId(pub String);

/// Anonymous device identifier, persisted client-side.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceId(pub String);

impl std::fmt::Display for OwnerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::fmt::Display for PairId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::fmt::Display for DeviceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// An owner account that distributes pairs.
///
/// Immutable after creation except for the contact handle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Owner {
    pub id: String,
    pub display_name: String,
    /// WhatsApp handle, normalized to digits only.
    pub contact_handle: String,
    pub created_at: String,
}

/// A distributable unit: a resource link plus an accompanying message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pair {
    pub id: String,
    pub owner_id: String,
    pub resource_link: String,
    pub message: String,
    pub created_at: String,
    /// Terminal exhausted marker. Set once `usage_count` reaches the
    /// effective limit; an exhausted pair never re-enters circulation.
    pub claimed: bool,
    pub claimed_at: Option<String>,
    pub claimed_by_device: Option<String>,
    /// How many claims this pair serves. `None` means 1.
    pub usage_limit: Option<i64>,
    pub usage_count: i64,
    /// Soft-delete flag. Deleted pairs are never eligible but are kept for
    /// claim-history referential integrity.
    pub deleted: bool,
}

impl Pair {
    /// The number of claims this pair serves before it is exhausted.
    pub fn effective_limit(&self) -> i64 {
        self.usage_limit.unwrap_or(1)
    }

    /// Whether this pair can be selected by the allocator.
    pub fn is_eligible(&self) -> bool {
        !self.deleted && !self.claimed && self.usage_count < self.effective_limit()
    }
}

/// Per-(device, owner) claim state. Overwritten on every successful claim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceClaim {
    pub device_id: String,
    pub owner_id: String,
    pub last_claim_at: String,
    /// Calendar date (`YYYY-MM-DD`) of the most recent successful claim.
    /// The day-rollover reset is implicit in this key: a stale date means
    /// the device has no claim today.
    pub last_claim_date: String,
    /// May reference a since-deleted pair; lookups tolerate that.
    pub recent_pair_id: String,
    pub recent_claimed_at: String,
}

/// Append-only audit entry for one successful claim. Never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimRecord {
    pub id: String,
    pub pair_id: String,
    pub device_id: String,
    pub owner_id: String,
    /// Owner contact handle captured at claim time, so later handle changes
    /// do not rewrite history.
    pub contact_handle: String,
    pub claimed_at: String,
}

/// What a visitor sees after a successful claim (or a same-day replay).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairView {
    pub resource_link: String,
    pub message: String,
    pub owner_contact_handle: String,
}

/// Inputs to one atomic allocation attempt.
#[derive(Debug, Clone)]
pub struct AllocationRequest {
    pub device_id: DeviceId,
    pub owner_id: OwnerId,
    /// Day key the attempt is charged against.
    pub day: String,
    /// Claim timestamp, ISO 8601.
    pub now: String,
    /// Maximum successful claims per owner per day.
    pub daily_cap: u32,
}

/// Result of one atomic allocation attempt.
///
/// Cap/no-pairs are outcomes rather than errors at this level so the
/// transaction can roll back cleanly without tunneling domain failures
/// through the storage error channel.
#[derive(Debug, Clone)]
pub enum AllocationOutcome {
    /// A pair was reserved; all ledger writes committed.
    Claimed(Pair),
    /// The owner's daily counter is at the cap. Nothing written.
    CapReached,
    /// No eligible pair exists. Nothing written.
    NoPairs,
}

/// Current timestamp as ISO 8601 with millisecond precision, UTC.
pub fn now_iso() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}
