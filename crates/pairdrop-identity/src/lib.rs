// SPDX-FileCopyrightText: 2026 Pairdrop Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Device identity and day keys for the Pairdrop distribution service.
//!
//! The identity layer has no dependencies on the rest of the system: it
//! derives a stable anonymous device identifier (persisted locally, generated
//! on first run) and the per-day calendar key that all daily-cap and
//! idempotency logic hangs off.

pub mod daykey;
pub mod device;

pub use daykey::{day_key, day_key_for_date, today_key};
pub use device::{DeviceIdentity, default_path, generate_device_id};
