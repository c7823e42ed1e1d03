// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for the token cookie and the admin credential.
//!
//! ```rust,ignore
//! async fn my_handler(TokenCookie(token): TokenCookie) -> impl IntoResponse {
//!     // token is Option<String>, the raw cookie value
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::COOKIE, request::Parts, HeaderMap},
};

use super::AuthError;
use crate::state::AppState;

/// Header carrying the admin credential on `POST /admin`.
pub const ADMIN_HEADER: &str = "X-NESTOR-ADMIN";

/// Raw value of the configured token cookie, if present.
///
/// When the browser sends the cookie more than once (for example a stale one
/// scoped to another path), the first value that verifies is chosen, falling
/// back to the first value sent. The chosen value is still handed on raw;
/// the gateway and the issuer treat any failure as "not logged in".
pub struct TokenCookie(pub Option<String>);

impl FromRequestParts<AppState> for TokenCookie {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let mut values = read_cookies(&parts.headers, &state.config.cookie_name);
        let chosen = match values.iter().position(|v| state.issuer.verify(v).is_some()) {
            Some(valid) => Some(values.swap_remove(valid)),
            None => values.into_iter().next(),
        };
        Ok(TokenCookie(chosen))
    }
}

/// Extractor that only succeeds when `X-NESTOR-ADMIN` carries the admin
/// credential.
///
/// Runs before the request body is read, so a rejected caller never gets
/// as far as body parsing. Yields the credential for the issuer.
pub struct AdminOnly(pub String);

impl FromRequestParts<AppState> for AdminOnly {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let credential = parts
            .headers
            .get(ADMIN_HEADER)
            .and_then(|value| value.to_str().ok());

        if !state.issuer.is_admin(credential) {
            tracing::warn!(present = credential.is_some(), "admin credential rejected");
            return Err(AuthError::WrongCredential);
        }

        Ok(AdminOnly(credential.unwrap_or_default().to_string()))
    }
}

/// Every non-empty value of cookie `name` across all `Cookie` headers, in
/// the order sent.
///
/// Surrounding double quotes are stripped from each value.
pub fn read_cookies(headers: &HeaderMap, name: &str) -> Vec<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .filter(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim().trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
        .collect()
}
