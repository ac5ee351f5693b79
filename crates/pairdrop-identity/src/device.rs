// SPDX-FileCopyrightText: 2026 Pairdrop Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Locally persisted pseudo-random device identity.
//!
//! The identifier is generated once on first run and reused for the lifetime
//! of the installation. There is no server-side verification beyond "one
//! record per (device, owner)": a client that deletes the identity file gets
//! a fresh identity and a fresh daily allowance. That is an accepted
//! weakness of the trust model (anti-abuse by friction only), not a bug.

use std::path::{Path, PathBuf};

use rand::Rng;
use tracing::debug;

use pairdrop_core::{DeviceId, PairdropError};

/// Identifier prefix, kept distinct from owner/pair UUIDs so logs read well.
const DEVICE_ID_PREFIX: &str = "dev_";

/// Length of the random suffix.
const DEVICE_ID_SUFFIX_LEN: usize = 12;

/// Base-36 alphabet for the random suffix.
const CHARSET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// A stable anonymous device identity backed by a plain file.
#[derive(Debug, Clone)]
pub struct DeviceIdentity {
    id: DeviceId,
    path: PathBuf,
}

impl DeviceIdentity {
    /// Load the persisted device id from `path`, or generate and persist a
    /// new one if the file does not exist.
    pub fn load_or_create(path: &Path) -> Result<Self, PairdropError> {
        if let Ok(content) = std::fs::read_to_string(path) {
            let id = content.trim();
            if !id.is_empty() {
                return Ok(Self {
                    id: DeviceId(id.to_string()),
                    path: path.to_path_buf(),
                });
            }
        }

        let id = generate_device_id(&mut rand::thread_rng());
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| PairdropError::Identity(format!("create {}: {e}", parent.display())))?;
        }
        std::fs::write(path, format!("{id}\n"))
            .map_err(|e| PairdropError::Identity(format!("write {}: {e}", path.display())))?;
        debug!(device = %id, path = %path.display(), "generated new device identity");

        Ok(Self {
            id: DeviceId(id),
            path: path.to_path_buf(),
        })
    }

    /// Load or create the identity at the default XDG location
    /// (`<data_dir>/pairdrop/device_id`).
    pub fn load_or_create_default() -> Result<Self, PairdropError> {
        Self::load_or_create(&default_path()?)
    }

    /// The stable device identifier.
    pub fn id(&self) -> &DeviceId {
        &self.id
    }

    /// Where the identity is persisted.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Default identity file location under the XDG data dir.
pub fn default_path() -> Result<PathBuf, PairdropError> {
    dirs::data_dir()
        .map(|d| d.join("pairdrop/device_id"))
        .ok_or_else(|| PairdropError::Identity("no data directory available".to_string()))
}

/// Generate a fresh device identifier: `dev_` + 12 base-36 characters.
pub fn generate_device_id(rng: &mut impl Rng) -> String {
    let suffix: String = (0..DEVICE_ID_SUFFIX_LEN)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect();
    format!("{DEVICE_ID_PREFIX}{suffix}")
}
