// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Capability tokens and the forward-auth decision engine.
//!
//! ## Auth Flow
//!
//! 1. A user logs in with the shared password (or follows an admin-issued
//!    link) and receives a signed token listing the path prefixes it grants
//! 2. The token is stored in a cookie; nothing is kept server-side
//! 3. For every proxied request the reverse proxy asks `/auth`:
//!    - the cookie is decoded and its HMAC verified
//!    - subrequest mode checks the requested path against the prefixes
//!    - domain mode accepts any valid token, or starts the overlay handshake
//!
//! ## Security
//!
//! - Tokens carry no expiry; their lifetime is the cookie's
//! - Rotating the secret key invalidates every token at once
//! - Decoding failures are indistinguishable to the client

pub mod capabilities;
pub mod error;
pub mod extractor;
pub mod gateway;
pub mod issuer;
pub mod overlay;
pub mod token;

pub use capabilities::{check, CapabilityList};
pub use error::AuthError;
pub use extractor::{AdminOnly, TokenCookie};
pub use gateway::{AuthDecision, ForwardAuthGateway, ForwardedRequest};
pub use issuer::{IssuedLink, TokenIssuer};
pub use overlay::OverlayHandshake;
pub use token::{TokenCodec, TokenError};
