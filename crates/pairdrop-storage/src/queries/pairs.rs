// SPDX-FileCopyrightText: 2026 Pairdrop Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pair catalog operations: insert, lookup, eligibility listing, soft delete.
//!
//! There are no hard deletes. Deletion is a flag flip so claim history keeps
//! resolving.

use rusqlite::params;

use pairdrop_core::{PairdropError, now_iso};

use crate::database::Database;
use crate::models::{PAIR_COLUMNS, Pair, PairView, pair_from_row};

/// Filter matching the allocator's eligibility rule. Kept in one place so
/// `list_eligible` and the claim transaction can never drift apart.
pub(crate) const ELIGIBLE_FILTER: &str =
    "deleted = 0 AND claimed = 0 AND (usage_limit IS NULL OR usage_count < usage_limit)";

/// Add a new pair to an owner's catalog. Returns the stored row.
pub async fn insert_pair(
    db: &Database,
    owner_id: &str,
    resource_link: &str,
    message: &str,
    usage_limit: Option<i64>,
) -> Result<Pair, PairdropError> {
    let pair = Pair {
        id: uuid::Uuid::new_v4().to_string(),
        owner_id: owner_id.to_string(),
        resource_link: resource_link.to_string(),
        message: message.to_string(),
        created_at: now_iso(),
        claimed: false,
        claimed_at: None,
        claimed_by_device: None,
        usage_limit,
        usage_count: 0,
        deleted: false,
    };

    let row = pair.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO pairs (id, owner_id, resource_link, message, created_at,
                                    claimed, usage_limit, usage_count, deleted)
                 VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6, 0, 0)",
                params![
                    row.id,
                    row.owner_id,
                    row.resource_link,
                    row.message,
                    row.created_at,
                    row.usage_limit,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    Ok(pair)
}

/// Get a pair by id, deleted or not.
pub async fn get_pair(db: &Database, id: &str) -> Result<Option<Pair>, PairdropError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {PAIR_COLUMNS} FROM pairs WHERE id = ?1"))?;
            let result = stmt.query_row(params![id], pair_from_row);
            match result {
                Ok(pair) => Ok(Some(pair)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List an owner's pairs for the dashboard, excluding deleted ones.
pub async fn list_pairs(db: &Database, owner_id: &str) -> Result<Vec<Pair>, PairdropError> {
    let owner_id = owner_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {PAIR_COLUMNS} FROM pairs
                 WHERE owner_id = ?1 AND deleted = 0
                 ORDER BY created_at DESC"
            ))?;
            let rows = stmt.query_map(params![owner_id], pair_from_row)?;
            let mut pairs = Vec::new();
            for row in rows {
                pairs.push(row?);
            }
            Ok(pairs)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List the pairs the allocator may select for an owner.
pub async fn list_eligible(db: &Database, owner_id: &str) -> Result<Vec<Pair>, PairdropError> {
    let owner_id = owner_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {PAIR_COLUMNS} FROM pairs
                 WHERE owner_id = ?1 AND {ELIGIBLE_FILTER}
                 ORDER BY created_at ASC"
            ))?;
            let rows = stmt.query_map(params![owner_id], pair_from_row)?;
            let mut pairs = Vec::new();
            for row in rows {
                pairs.push(row?);
            }
            Ok(pairs)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Resolve a pair to its visitor-facing view, joined with the owning
/// account's contact handle.
///
/// Soft-deleted pairs resolve to `None`: a device whose claimed pair was
/// deleted falls through to a fresh attempt (where the consumed daily slot,
/// not the vanished pair, decides what happens).
pub async fn pair_view(db: &Database, id: &str) -> Result<Option<PairView>, PairdropError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                "SELECT p.resource_link, p.message, o.contact_handle
                 FROM pairs p JOIN owners o ON o.id = p.owner_id
                 WHERE p.id = ?1 AND p.deleted = 0",
                params![id],
                |row| {
                    Ok(PairView {
                        resource_link: row.get(0)?,
                        message: row.get(1)?,
                        owner_contact_handle: row.get(2)?,
                    })
                },
            );
            match result {
                Ok(view) => Ok(Some(view)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Soft-delete a pair. Returns `NotFound` if the pair does not exist.
pub async fn soft_delete(db: &Database, id: &str) -> Result<(), PairdropError> {
    let pair_id = id.to_string();
    let updated = db
        .connection()
        .call(move |conn| {
            let n = conn.execute("UPDATE pairs SET deleted = 1 WHERE id = ?1", params![pair_id])?;
            Ok(n)
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    if updated == 0 {
        return Err(PairdropError::NotFound {
            entity: "pair",
            id: id.to_string(),
        });
    }
    Ok(())
}
