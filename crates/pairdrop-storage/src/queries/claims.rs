// SPDX-FileCopyrightText: 2026 Pairdrop Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only claim audit log reads.
//!
//! Rows are appended only inside the claim transaction and are never
//! mutated or deleted.

use rusqlite::params;

use pairdrop_core::PairdropError;

use crate::database::Database;
use crate::models::ClaimRecord;

/// List an owner's claim audit entries, newest first.
pub async fn list_claims_for_owner(
    db: &Database,
    owner_id: &str,
) -> Result<Vec<ClaimRecord>, PairdropError> {
    let owner_id = owner_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, pair_id, device_id, owner_id, contact_handle, claimed_at
                 FROM claims WHERE owner_id = ?1 ORDER BY claimed_at DESC",
            )?;
            let rows = stmt.query_map(params![owner_id], |row| {
                Ok(ClaimRecord {
                    id: row.get(0)?,
                    pair_id: row.get(1)?,
                    device_id: row.get(2)?,
                    owner_id: row.get(3)?,
                    contact_handle: row.get(4)?,
                    claimed_at: row.get(5)?,
                })
            })?;
            let mut claims = Vec::new();
            for row in rows {
                claims.push(row?);
            }
            Ok(claims)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
