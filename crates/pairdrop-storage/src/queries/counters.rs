// SPDX-FileCopyrightText: 2026 Pairdrop Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Daily counter reads.
//!
//! Counters are only ever written inside the claim transaction
//! ([`crate::queries::allocation`]); this module exposes read access for
//! status reporting and tests.

use rusqlite::params;

use pairdrop_core::PairdropError;

use crate::database::Database;

/// Number of successful claims recorded for (day, owner). Zero if the
/// counter was never created.
pub async fn daily_count(db: &Database, day: &str, owner_id: &str) -> Result<i64, PairdropError> {
    let day = day.to_string();
    let owner_id = owner_id.to_string();
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                "SELECT count FROM daily_counts WHERE day = ?1 AND owner_id = ?2",
                params![day, owner_id],
                |row| row.get(0),
            );
            match result {
                Ok(count) => Ok(count),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
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
    async fn missing_counter_reads_as_zero() {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("t.db").to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(daily_count(&db, "2026-03-14", "own-1").await.unwrap(), 0);
        db.close().await.unwrap();
    }
}
