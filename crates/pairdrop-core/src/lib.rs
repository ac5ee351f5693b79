// SPDX-FileCopyrightText: 2026 Pairdrop Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Pairdrop distribution service.
//!
//! Defines the error taxonomy, the domain types shared across the workspace,
//! and the [`ClaimLedger`] trait seam between the allocator and its
//! transactional storage collaborator.

pub mod error;
pub mod traits;
pub mod types;

pub use error::PairdropError;
pub use traits::ClaimLedger;
pub use types::{
    AllocationOutcome, AllocationRequest, ClaimRecord, DeviceClaim, DeviceId, Owner, OwnerId,
    Pair, PairId, PairView, now_iso,
};
