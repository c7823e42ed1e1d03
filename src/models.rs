// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Query parameters carried to the login page.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct LoginQuery {
    /// Where to send the browser after login.
    pub redir: Option<String>,
    /// Overlay callback on the protected domain (domain mode).
    pub overlay: Option<String>,
}

/// Login form submission.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct LoginForm {
    #[serde(default)]
    pub password: String,
    pub redir: Option<String>,
    pub overlay: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct LinkQuery {
    /// Token issued by `POST /admin`.
    pub authkey: String,
    /// Redirect target; defaults to the token's first capability.
    pub redir: Option<String>,
}

/// Token issued through the admin endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IssuedLinkResponse {
    /// The signed capability token.
    pub authkey: String,
    /// Link that installs the token as a cookie when opened.
    pub url: String,
}

/// Treat an empty form/query value as absent.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_drops_blank_values() {
        assert_eq!(non_empty(Some(String::new())), None);
        assert_eq!(non_empty(Some("  ".to_string())), None);
        assert_eq!(non_empty(Some("/x".to_string())).as_deref(), Some("/x"));
        assert_eq!(non_empty(None), None);
    }

    #[test]
    fn issued_link_serializes_expected_keys() {
        let body = serde_json::to_value(IssuedLinkResponse {
            authkey: "tok".to_string(),
            url: "https://auth.example.com/link?authkey=tok".to_string(),
        })
        .unwrap();
        assert_eq!(body["authkey"], "tok");
        assert_eq!(body["url"], "https://auth.example.com/link?authkey=tok");
    }
}
