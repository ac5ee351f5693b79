// SPDX-FileCopyrightText: 2026 Pairdrop Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Device claim record lookups.
//!
//! Rows are written only inside the claim transaction; the date key in
//! `last_claim_date` is what makes day rollover implicit.

use rusqlite::params;

use pairdrop_core::PairdropError;

use crate::database::Database;
use crate::models::DeviceClaim;

/// Get the claim record for a (device, owner) combination, if any.
pub async fn get_device_claim(
    db: &Database,
    device_id: &str,
    owner_id: &str,
) -> Result<Option<DeviceClaim>, PairdropError> {
    let device_id = device_id.to_string();
    let owner_id = owner_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT device_id, owner_id, last_claim_at, last_claim_date,
                        recent_pair_id, recent_claimed_at
                 FROM device_claims WHERE device_id = ?1 AND owner_id = ?2",
            )?;
            let result = stmt.query_row(params![device_id, owner_id], |row| {
                Ok(DeviceClaim {
                    device_id: row.get(0)?,
                    owner_id: row.get(1)?,
                    last_claim_at: row.get(2)?,
                    last_claim_date: row.get(3)?,
                    recent_pair_id: row.get(4)?,
                    recent_claimed_at: row.get(5)?,
                })
            });
            match result {
                Ok(claim) => Ok(Some(claim)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn missing_record_returns_none() {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("t.db").to_str().unwrap())
            .await
            .unwrap();
        let claim = get_device_claim(&db, "dev_x", "own-1").await.unwrap();
        assert!(claim.is_none());
        db.close().await.unwrap();
    }
}
