// SPDX-FileCopyrightText: 2026 Pairdrop Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Pairdrop distribution service.

use thiserror::Error;

/// The primary error type used across all Pairdrop crates.
///
/// Domain failures (`DailyCapReached`, `NoPairsAvailable`) are distinct
/// variants so callers can render specific messages; everything else
/// degrades to a generic failure at the surface.
#[derive(Debug, Error)]
pub enum PairdropError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, migration).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The owner's daily claim allowance is exhausted. Terminal for the day.
    #[error("daily claim cap reached for this owner")]
    DailyCapReached,

    /// The owner has no eligible pairs left. Terminal until the catalog changes.
    #[error("no pairs available for this owner")]
    NoPairsAvailable,

    /// A concurrent writer touched the same counter or pair. Transient;
    /// retried internally and never surfaced to end users as a distinct error.
    #[error("transaction conflict, safe to retry")]
    Conflict,

    /// A referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Device identity errors (unreadable or unwritable identity file).
    #[error("device identity error: {0}")]
    Identity(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl PairdropError {
    /// Whether the failure is transient and the operation can be retried
    /// with the same inputs.
    pub fn is_transient(&self) -> bool {
        matches!(self, PairdropError::Conflict)
    }

    /// Stable machine-readable code for surfacing over the API.
    pub fn code(&self) -> &'static str {
        match self {
            PairdropError::Config(_) => "config",
            PairdropError::Storage { .. } => "storage",
            PairdropError::DailyCapReached => "daily_cap_reached",
            PairdropError::NoPairsAvailable => "no_pairs_available",
            PairdropError::Conflict => "conflict",
            PairdropError::NotFound { .. } => "not_found",
            PairdropError::Identity(_) => "identity",
            PairdropError::Internal(_) => "internal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_conflict_is_transient() {
        assert!(PairdropError::Conflict.is_transient());
        assert!(!PairdropError::DailyCapReached.is_transient());
        assert!(!PairdropError::NoPairsAvailable.is_transient());
        assert!(
            !PairdropError::NotFound {
                entity: "pair",
                id: "p1".into()
            }
            .is_transient()
        );
    }

    #[test]
    fn domain_errors_have_stable_codes() {
        assert_eq!(PairdropError::DailyCapReached.code(), "daily_cap_reached");
        assert_eq!(PairdropError::NoPairsAvailable.code(), "no_pairs_available");
        assert_eq!(PairdropError::Conflict.code(), "conflict");
    }

    #[test]
    fn not_found_names_the_entity() {
        let err = PairdropError::NotFound {
            entity: "owner",
            id: "own-1".into(),
        };
        assert_eq!(err.to_string(), "owner not found: own-1");
    }
}
