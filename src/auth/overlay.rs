// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Overlay Handshake
//!
//! Delivers the token cookie to a protected domain that differs from the
//! domain the user logged in on. A browser cookie can only be set by the
//! domain it belongs to, so the token makes one hop inside a URL:
//!
//! 1. The protected domain D has no valid cookie. The gateway redirects to
//!    the login domain with `redir` (the original URL) and `overlay` (the
//!    callback URL on D).
//! 2. The user logs in. The login domain redirects to
//!    `overlay?redir=<original>&token=<token>`.
//! 3. The callback on D verifies the token, sets the cookie for D and
//!    redirects to `redir`.
//! 4. Later requests to D carry the cookie and pass the gateway directly.
//!
//! A callback missing either parameter is answered with an error, never
//! with another redirect, so a broken proxy setup cannot loop the browser.

use url::form_urlencoded;

use super::{gateway::AuthDecision, token::TokenCodec, AuthError};

pub const REDIR_PARAM: &str = "redir";
pub const TOKEN_PARAM: &str = "token";

#[derive(Debug, Clone)]
pub struct OverlayHandshake {
    path: String,
}

impl OverlayHandshake {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Whether a forwarded request path targets the overlay callback.
    pub fn is_callback(&self, path: &str) -> bool {
        path == self.path
    }

    /// Absolute URL of the callback on the protected domain (step 1).
    pub fn callback_url(&self, proto: &str, host: &str) -> String {
        format!("{proto}://{host}{}", self.path)
    }

    /// URL the login domain sends the browser to after login (step 2).
    pub fn delivery_url(overlay: &str, redir: &str, token: &str) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair(REDIR_PARAM, redir)
            .append_pair(TOKEN_PARAM, token)
            .finish();
        let separator = if overlay.contains('?') { '&' } else { '?' };
        format!("{overlay}{separator}{query}")
    }

    /// Handle the callback on the protected domain (step 3).
    ///
    /// `query` is the raw query string of the forwarded callback URI.
    pub fn complete(
        &self,
        query: Option<&str>,
        codec: &TokenCodec,
    ) -> Result<AuthDecision, AuthError> {
        let mut redir = None;
        let mut token = None;
        for (key, value) in form_urlencoded::parse(query.unwrap_or_default().as_bytes()) {
            if value.is_empty() {
                continue;
            }
            match &*key {
                REDIR_PARAM if redir.is_none() => redir = Some(value.into_owned()),
                TOKEN_PARAM if token.is_none() => token = Some(value.into_owned()),
                _ => {}
            }
        }

        let (Some(redir), Some(token)) = (redir, token) else {
            tracing::warn!(overlay = %self.path, "overlay callback without redir and token");
            return Err(AuthError::IncompleteOverlay);
        };

        codec.decode(&token)?;
        tracing::debug!(redir = %redir, "overlay delivering cookie");

        Ok(AuthDecision::SetCookieAndRedirect { token, url: redir })
    }
}
