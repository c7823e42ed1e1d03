// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Forward-Auth Gateway
//!
//! Per-request decision engine consulted by the reverse proxy. The strategy
//! is picked once from [`Mode`] and both strategies share the same token
//! verification.
//!
//! ## Subrequest mode
//!
//! The proxy asks about one path (`X-Original-URI`, else `X-Forwarded-Uri`).
//! The cookie token must decode and one of its capabilities must prefix the
//! path. Answers are an empty 200 or 401.
//!
//! ## Domain mode
//!
//! Any valid token grants the whole protected domain; capabilities are not
//! consulted. Requests without one are redirected to the central login page,
//! and requests for the overlay path complete the
//! [overlay handshake](super::overlay).

use axum::http::HeaderMap;
use url::form_urlencoded;

use super::{
    capabilities::{check, CapabilityList},
    overlay::OverlayHandshake,
    token::TokenCodec,
    AuthError,
};
use crate::config::{GatewayConfig, Mode};

pub const ORIGINAL_URI_HEADER: &str = "X-Original-URI";
pub const FORWARDED_URI_HEADER: &str = "X-Forwarded-Uri";
pub const FORWARDED_PROTO_HEADER: &str = "X-Forwarded-Proto";
pub const FORWARDED_HOST_HEADER: &str = "X-Forwarded-Host";

/// Outcome of a gateway or issuance decision, rendered by the HTTP layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthDecision {
    Allow,
    Deny,
    RedirectToLogin(String),
    SetCookieAndRedirect { token: String, url: String },
}

/// The parts of a forward-auth request the gateway looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForwardedRequest {
    pub original_uri: Option<String>,
    pub forwarded_uri: Option<String>,
    pub forwarded_proto: Option<String>,
    pub forwarded_host: Option<String>,
    /// Raw value of the token cookie, if the client sent one.
    pub token: Option<String>,
}

impl ForwardedRequest {
    pub fn from_headers(headers: &HeaderMap, token: Option<String>) -> Self {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        Self {
            original_uri: header(ORIGINAL_URI_HEADER),
            forwarded_uri: header(FORWARDED_URI_HEADER),
            forwarded_proto: header(FORWARDED_PROTO_HEADER),
            forwarded_host: header(FORWARDED_HOST_HEADER),
            token,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ForwardAuthGateway {
    mode: Mode,
    codec: TokenCodec,
    overlay: OverlayHandshake,
    login_url: String,
}

impl ForwardAuthGateway {
    pub fn new(config: &GatewayConfig, codec: TokenCodec) -> Self {
        Self {
            mode: config.mode,
            codec,
            overlay: OverlayHandshake::new(config.overlay_path.clone()),
            login_url: config.login_url.clone(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Decide whether the forwarded request may proceed.
    pub fn decide(&self, request: &ForwardedRequest) -> Result<AuthDecision, AuthError> {
        match self.mode {
            Mode::Subrequest => Ok(self.decide_subrequest(request)),
            Mode::Domain => self.decide_domain(request),
        }
    }

    /// Decode the cookie token, treating every failure as "not logged in".
    fn verify(&self, token: Option<&str>) -> Option<CapabilityList> {
        self.codec.decode(token?).ok()
    }

    fn decide_subrequest(&self, request: &ForwardedRequest) -> AuthDecision {
        let Some(path) = request
            .original_uri
            .as_deref()
            .or(request.forwarded_uri.as_deref())
        else {
            tracing::debug!("subrequest without target URI header");
            return AuthDecision::Deny;
        };

        match self.verify(request.token.as_deref()) {
            Some(capabilities) if check(&capabilities, path) => AuthDecision::Allow,
            Some(_) => {
                tracing::debug!(path, "token does not grant path");
                AuthDecision::Deny
            }
            None => {
                tracing::debug!(path, "no valid token");
                AuthDecision::Deny
            }
        }
    }

    fn decide_domain(&self, request: &ForwardedRequest) -> Result<AuthDecision, AuthError> {
        let uri = request.forwarded_uri.as_deref().unwrap_or("/");
        let (path, query) = match uri.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (uri, None),
        };

        if self.overlay.is_callback(path) {
            return self.overlay.complete(query, &self.codec);
        }

        if self.verify(request.token.as_deref()).is_some() {
            return Ok(AuthDecision::Allow);
        }

        let proto = request
            .forwarded_proto
            .as_deref()
            .ok_or(AuthError::MissingForwardedHeader(FORWARDED_PROTO_HEADER))?;
        let host = request
            .forwarded_host
            .as_deref()
            .ok_or(AuthError::MissingForwardedHeader(FORWARDED_HOST_HEADER))?;

        let original = format!("{proto}://{host}{uri}");
        let overlay = self.overlay.callback_url(proto, host);
        tracing::debug!(redir = %original, "redirecting to login");

        Ok(AuthDecision::RedirectToLogin(
            self.login_redirect(&original, Some(&overlay)),
        ))
    }

    /// `<login_url>/login?redir=..&overlay=..` with form-encoded values.
    pub fn login_redirect(&self, redir: &str, overlay: Option<&str>) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        query.append_pair("redir", redir);
        if let Some(overlay) = overlay {
            query.append_pair("overlay", overlay);
        }
        format!("{}/login?{}", self.login_url, query.finish())
    }
}
