// SPDX-FileCopyrightText: 2026 Pairdrop Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types for storage entities.
//!
//! The canonical types are defined in `pairdrop-core::types` for use across
//! crate boundaries. This module re-exports them and holds the shared
//! row-mapping helpers.

pub use pairdrop_core::types::{ClaimRecord, DeviceClaim, Owner, Pair, PairView};

/// Map a `pairs` row (full column order) into a [`Pair`].
///
/// Column order: id, owner_id, resource_link, message, created_at, claimed,
/// claimed_at, claimed_by_device, usage_limit, usage_count, deleted.
pub(crate) fn pair_from_row(row: &rusqlite::Row<'_>) -> Result<Pair, rusqlite::Error> {
    Ok(Pair {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        resource_link: row.get(2)?,
        message: row.get(3)?,
        created_at: row.get(4)?,
        claimed: row.get::<_, i64>(5)? != 0,
        claimed_at: row.get(6)?,
        claimed_by_device: row.get(7)?,
        usage_limit: row.get(8)?,
        usage_count: row.get(9)?,
        deleted: row.get::<_, i64>(10)? != 0,
    })
}

/// The shared SELECT column list matching [`pair_from_row`].
pub(crate) const PAIR_COLUMNS: &str = "id, owner_id, resource_link, message, created_at, \
     claimed, claimed_at, claimed_by_device, usage_limit, usage_count, deleted";
