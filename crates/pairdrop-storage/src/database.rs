// SPDX-FileCopyrightText: 2026 Pairdrop Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. Do NOT create additional Connection instances for writes.

use std::path::Path;

use tracing::debug;

use pairdrop_core::PairdropError;

/// WAL-mode SQLite handle shared across query modules.
///
/// Wraps a single `tokio_rusqlite::Connection`; the background thread IS the
/// single writer, which is what makes same-process claim transactions
/// serialize without SQLITE_BUSY.
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (creating if needed) the database at `path`, apply PRAGMAs, and
    /// run pending migrations.
    pub async fn open(path: &str) -> Result<Self, PairdropError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| PairdropError::Storage {
                source: Box::new(e),
            })?;
        }

        // Migrations run on a short-lived blocking connection before the
        // background writer starts.
        let migration_path = path.to_string();
        tokio::task::spawn_blocking(move || -> Result<(), PairdropError> {
            let mut conn = rusqlite::Connection::open(&migration_path).map_err(map_sq_err)?;
            apply_pragmas(&conn).map_err(map_sq_err)?;
            crate::migrations::run_migrations(&mut conn)
        })
        .await
        .map_err(|e| PairdropError::Internal(format!("migration task panicked: {e}")))??;

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(map_sq_err)?;
        conn.call(|conn| -> Result<(), rusqlite::Error> { apply_pragmas(conn) })
            .await
            .map_err(map_tr_err)?;

        debug!(path, "database opened");
        Ok(Self { conn })
    }

    /// The underlying tokio-rusqlite connection.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoint the WAL before shutdown.
    pub async fn close(&self) -> Result<(), PairdropError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                // wal_checkpoint returns a result row, so query_row not execute.
                conn.query_row("PRAGMA wal_checkpoint(TRUNCATE)", [], |_| Ok(()))?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

fn apply_pragmas(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    conn.pragma_update(None, "busy_timeout", 5000)?;
    Ok(())
}

/// Convert a tokio-rusqlite error into PairdropError::Storage.
pub fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> PairdropError {
    PairdropError::Storage {
        source: Box::new(e),
    }
}

/// Convert a bare rusqlite error into PairdropError::Storage.
pub fn map_sq_err(e: rusqlite::Error) -> PairdropError {
    PairdropError::Storage {
        source: Box::new(e),
    }
}

/// Whether a rusqlite error is a transient busy/locked conflict from an
/// independent writer process. Same-process writes never see this: they all
/// go through the one background thread.
pub fn is_busy(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(inner, _)
            if inner.code == rusqlite::ErrorCode::DatabaseBusy
                || inner.code == rusqlite::ErrorCode::DatabaseLocked
    )
}
