// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::token::TokenError;

/// Authentication error type.
///
/// Credential and token failures render as an empty 401 so that nothing
/// about the rejection reaches the client. Protocol errors caused by proxy
/// misconfiguration or a truncated overlay callback carry a plain-text
/// diagnostic instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Token is malformed, tampered with, or signed with another key
    InvalidToken,
    /// Login password or admin credential did not match
    WrongCredential,
    /// Domain mode request arrived without a required forwarding header
    MissingForwardedHeader(&'static str),
    /// Overlay callback invoked without both `redir` and `token`
    IncompleteOverlay,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::InvalidToken => "invalid_token",
            AuthError::WrongCredential => "wrong_credential",
            AuthError::MissingForwardedHeader(_) => "missing_forwarded_header",
            AuthError::IncompleteOverlay => "incomplete_overlay",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidToken | AuthError::WrongCredential => StatusCode::UNAUTHORIZED,
            AuthError::MissingForwardedHeader(_) | AuthError::IncompleteOverlay => {
                StatusCode::BAD_REQUEST
            }
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::InvalidToken => write!(f, "Token is invalid"),
            AuthError::WrongCredential => write!(f, "Credential is incorrect"),
            AuthError::MissingForwardedHeader(header) => {
                write!(f, "Missing {header} header; check the reverse proxy forward-auth configuration")
            }
            AuthError::IncompleteOverlay => {
                write!(f, "Overlay callback requires both `redir` and `token` query parameters")
            }
        }
    }
}

impl std::error::Error for AuthError {}

impl From<TokenError> for AuthError {
    fn from(_: TokenError) -> Self {
        AuthError::InvalidToken
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            AuthError::InvalidToken | AuthError::WrongCredential => status.into_response(),
            _ => (status, self.to_string()).into_response(),
        }
    }
}
