// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Capability Token Codec
//!
//! A token is the Base64 encoding of:
//!
//! ```text
//! +----------------------+-----+---------------------------+
//! | HMAC-SHA256 (32 B)   | '|' | JSON array of path prefixes|
//! +----------------------+-----+---------------------------+
//! ```
//!
//! The MAC is computed over the exact JSON bytes that follow the separator.
//! Decoding slices the fixed-length MAC off the front; it never searches for
//! the separator, since the binary MAC may itself contain `'|'`.
//!
//! Every decoding failure collapses into [`TokenError::Invalid`] so callers
//! cannot tell a corrupted token from a forged one. Input is decoded exactly
//! as given; surrounding whitespace makes a token invalid, so a value that
//! decodes is always safe to echo back into a cookie.

use base64ct::{Base64, Encoding};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::capabilities::CapabilityList;

type HmacSha256 = Hmac<Sha256>;

/// Length of the HMAC-SHA256 tag at the start of a decoded token.
pub const MAC_LEN: usize = 32;

/// Byte between the MAC and the JSON payload.
pub const SEPARATOR: u8 = b'|';

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("invalid token")]
    Invalid,
}

/// Signs and verifies capability tokens with a single process-wide secret.
#[derive(Clone)]
pub struct TokenCodec {
    mac: HmacSha256,
}

impl TokenCodec {
    /// Create a codec keyed with `secret`.
    ///
    /// HMAC accepts keys of any length; the error branch exists only because
    /// the `hmac` API is shared with fixed-key MACs.
    pub fn new(secret: &[u8]) -> Result<Self, hmac::digest::InvalidLength> {
        Ok(Self {
            mac: HmacSha256::new_from_slice(secret)?,
        })
    }

    pub fn encode(&self, capabilities: &CapabilityList) -> String {
        // A Vec<String> newtype always serializes.
        let payload = serde_json::to_vec(capabilities).unwrap_or_else(|_| b"[]".to_vec());

        let mut mac = self.mac.clone();
        mac.update(&payload);
        let tag = mac.finalize().into_bytes();

        let mut raw = Vec::with_capacity(MAC_LEN + 1 + payload.len());
        raw.extend_from_slice(&tag);
        raw.push(SEPARATOR);
        raw.extend_from_slice(&payload);

        Base64::encode_string(&raw)
    }

    pub fn decode(&self, token: &str) -> Result<CapabilityList, TokenError> {
        let raw = Base64::decode_vec(token).map_err(|e| {
            tracing::debug!(error = %e, "token is not valid base64");
            TokenError::Invalid
        })?;

        if raw.len() < MAC_LEN + 1 {
            tracing::debug!(len = raw.len(), "token too short");
            return Err(TokenError::Invalid);
        }

        let (tag, rest) = raw.split_at(MAC_LEN);
        let (separator, payload) = rest.split_at(1);
        if separator[0] != SEPARATOR {
            tracing::debug!("token separator mismatch");
            return Err(TokenError::Invalid);
        }

        let mut mac = self.mac.clone();
        mac.update(payload);
        // verify_slice compares in constant time
        mac.verify_slice(tag).map_err(|_| {
            tracing::debug!("token MAC mismatch");
            TokenError::Invalid
        })?;

        serde_json::from_slice::<CapabilityList>(payload).map_err(|e| {
            tracing::debug!(error = %e, "token payload is not a list of strings");
            TokenError::Invalid
        })
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec").finish_non_exhaustive()
    }
}
