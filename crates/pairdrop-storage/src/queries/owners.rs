// SPDX-FileCopyrightText: 2026 Pairdrop Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Owner account operations.

use rusqlite::params;

use pairdrop_core::{PairdropError, now_iso};

use crate::database::Database;
use crate::models::Owner;

/// Strip a WhatsApp handle down to digits.
///
/// Claim views build `wa.me` links from this, so formatting characters and
/// leading `+` must not survive storage.
pub fn normalize_handle(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Create a new owner account. Returns the stored row.
pub async fn create_owner(
    db: &Database,
    display_name: &str,
    contact_handle: &str,
) -> Result<Owner, PairdropError> {
    let owner = Owner {
        id: uuid::Uuid::new_v4().to_string(),
        display_name: display_name.to_string(),
        contact_handle: normalize_handle(contact_handle),
        created_at: now_iso(),
    };

    let row = owner.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO owners (id, display_name, contact_handle, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![row.id, row.display_name, row.contact_handle, row.created_at],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    Ok(owner)
}

/// Get an owner by id.
pub async fn get_owner(db: &Database, id: &str) -> Result<Option<Owner>, PairdropError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, display_name, contact_handle, created_at
                 FROM owners WHERE id = ?1",
            )?;
            let result = stmt.query_row(params![id], |row| {
                Ok(Owner {
                    id: row.get(0)?,
                    display_name: row.get(1)?,
                    contact_handle: row.get(2)?,
                    created_at: row.get(3)?,
                })
            });
            match result {
                Ok(owner) => Ok(Some(owner)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List all owners, newest first.
pub async fn list_owners(db: &Database) -> Result<Vec<Owner>, PairdropError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, display_name, contact_handle, created_at
                 FROM owners ORDER BY created_at DESC",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok(Owner {
                    id: row.get(0)?,
                    display_name: row.get(1)?,
                    contact_handle: row.get(2)?,
                    created_at: row.get(3)?,
                })
            })?;
            let mut owners = Vec::new();
            for row in rows {
                owners.push(row?);
            }
            Ok(owners)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Update an owner's contact handle. The only mutable owner field.
pub async fn update_contact_handle(
    db: &Database,
    id: &str,
    contact_handle: &str,
) -> Result<(), PairdropError> {
    let id = id.to_string();
    let handle = normalize_handle(contact_handle);
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE owners SET contact_handle = ?1 WHERE id = ?2",
                params![handle, id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}
