// SPDX-FileCopyrightText: 2026 Pairdrop Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Pairdrop distribution service.
//!
//! Exposes the owner/catalog management API and the anonymous visitor claim
//! API over axum, backed by the shared [`pairdrop_storage::PairStore`] and
//! [`pairdrop_allocator::Allocator`].

pub mod handlers;
pub mod server;

pub use server::{GatewayState, ServerConfig, router, start_server};
