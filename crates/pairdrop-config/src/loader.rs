// SPDX-FileCopyrightText: 2026 Pairdrop Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./pairdrop.toml` > `~/.config/pairdrop/pairdrop.toml`
//! > `/etc/pairdrop/pairdrop.toml` with environment variable overrides via
//! `PAIRDROP_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::PairdropConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/pairdrop/pairdrop.toml` (system-wide)
/// 3. `~/.config/pairdrop/pairdrop.toml` (user XDG config)
/// 4. `./pairdrop.toml` (local directory)
/// 5. `PAIRDROP_*` environment variables
pub fn load_config() -> Result<PairdropConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a specific TOML string only (no XDG lookup).
///
/// Used for testing and explicit config file specification.
pub fn load_config_from_str(toml_content: &str) -> Result<PairdropConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PairdropConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<PairdropConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PairdropConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(PairdropConfig::default()))
        .merge(Toml::file("/etc/pairdrop/pairdrop.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("pairdrop/pairdrop.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("pairdrop.toml"))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `PAIRDROP_STORAGE_DATABASE_PATH` must map
/// to `storage.database_path`, not `storage.database.path`.
fn env_provider() -> Env {
    Env::prefixed("PAIRDROP_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("service_", "service.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("allocator_", "allocator.", 1)
            .replacen("identity_", "identity.", 1)
            .replacen("gateway_", "gateway.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.allocator.daily_cap, 1);
        assert_eq!(config.gateway.port, 8787);
    }

    #[test]
    fn toml_overrides_defaults() {
        let config = load_config_from_str(
            r#"
            [allocator]
            daily_cap = 3

            [gateway]
            port = 9000
            "#,
        )
        .unwrap();
        assert_eq!(config.allocator.daily_cap, 3);
        assert_eq!(config.gateway.port, 9000);
        // Untouched sections keep their defaults.
        assert_eq!(config.service.log_level, "info");
    }

    #[test]
    fn unknown_key_is_rejected() {
        let result = load_config_from_str(
            r#"
            [allocator]
            dailly_cap = 3
            "#,
        );
        assert!(result.is_err(), "deny_unknown_fields should reject typos");
    }
}
