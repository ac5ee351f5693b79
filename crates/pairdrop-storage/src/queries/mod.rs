// SPDX-FileCopyrightText: 2026 Pairdrop Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules, one per ledger concern.

pub mod allocation;
pub mod claims;
pub mod counters;
pub mod device_claims;
pub mod owners;
pub mod pairs;
