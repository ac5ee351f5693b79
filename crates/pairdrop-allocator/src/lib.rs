// SPDX-FileCopyrightText: 2026 Pairdrop Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Claim allocation engine: replay detection, daily caps, and retried
//! atomic allocation over a [`pairdrop_core::ClaimLedger`].

pub mod allocator;

pub use allocator::{Allocator, AllocatorSettings};
