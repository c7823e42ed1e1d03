// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Nestor - Capability-based Forward-Authentication Gateway
//!
//! This crate issues HMAC-signed tokens listing the URL path prefixes their
//! bearer may access, and answers "may this request proceed?" for a reverse
//! proxy on every incoming request.
//!
//! ## Modules
//!
//! - `api` - HTTP handlers (Axum)
//! - `auth` - Token codec, authorization check, gateway and overlay handshake
//! - `config` - Environment configuration
//! - `logging` - Tracing subscriber setup

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod state;
