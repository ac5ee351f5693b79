// SPDX-FileCopyrightText: 2026 Pairdrop Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Pairdrop service.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Pairdrop configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PairdropConfig {
    /// Service-wide settings (logging).
    #[serde(default)]
    pub service: ServiceConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Claim allocation settings.
    #[serde(default)]
    pub allocator: AllocatorConfig,

    /// Device identity settings.
    #[serde(default)]
    pub identity: IdentityConfig,

    /// HTTP gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Service-wide configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|d| d.join("pairdrop/pairdrop.db").display().to_string())
        .unwrap_or_else(|| "pairdrop.db".to_string())
}

/// Claim allocation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AllocatorConfig {
    /// Maximum successful claims per owner per calendar day.
    #[serde(default = "default_daily_cap")]
    pub daily_cap: u32,

    /// Attempts per claim before a transient conflict is surfaced as a
    /// generic failure.
    #[serde(default = "default_claim_max_retries")]
    pub claim_max_retries: u32,

    /// Backoff between conflict retries, in milliseconds.
    #[serde(default = "default_claim_retry_backoff_ms")]
    pub claim_retry_backoff_ms: u64,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            daily_cap: default_daily_cap(),
            claim_max_retries: default_claim_max_retries(),
            claim_retry_backoff_ms: default_claim_retry_backoff_ms(),
        }
    }
}

fn default_daily_cap() -> u32 {
    1
}

fn default_claim_max_retries() -> u32 {
    3
}

fn default_claim_retry_backoff_ms() -> u64 {
    25
}

/// Device identity configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct IdentityConfig {
    /// Path to the persisted device id file. `None` uses the XDG data dir
    /// (`<data_dir>/pairdrop/device_id`).
    #[serde(default)]
    pub device_id_path: Option<String>,
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Host address to bind.
    #[serde(default = "default_gateway_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_gateway_port")]
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_gateway_host(),
            port: default_gateway_port(),
        }
    }
}

fn default_gateway_host() -> String {
    "127.0.0.1".to_string()
}

fn default_gateway_port() -> u16 {
    8787
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = PairdropConfig::default();
        assert_eq!(config.allocator.daily_cap, 1);
        assert_eq!(config.allocator.claim_max_retries, 3);
        assert_eq!(config.gateway.host, "127.0.0.1");
        assert_eq!(config.gateway.port, 8787);
        assert_eq!(config.service.log_level, "info");
        assert!(!config.storage.database_path.is_empty());
        assert!(config.identity.device_id_path.is_none());
    }
}
