// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token issuance for the login, admin and link flows.
//!
//! Credentials are compared with plain string equality.
// TODO: switch password and admin comparisons to constant-time once the
// security review of the credential checks is signed off.

use url::form_urlencoded;

use super::{capabilities::CapabilityList, token::TokenCodec, AuthError};
use crate::config::GatewayConfig;

/// Token plus a ready-to-share URL that installs it as a cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedLink {
    pub token: String,
    pub url: String,
}

#[derive(Clone)]
pub struct TokenIssuer {
    codec: TokenCodec,
    login_password: String,
    admin_password: Option<String>,
    link_base: String,
}

impl TokenIssuer {
    pub fn new(config: &GatewayConfig, codec: TokenCodec) -> Self {
        Self {
            codec,
            login_password: config.login_password.clone(),
            admin_password: config.admin_password.clone(),
            link_base: format!("{}/link", config.login_url),
        }
    }

    /// Mint a full-site token if `password` is the login password.
    pub fn issue_from_login(&self, password: &str) -> Result<String, AuthError> {
        if password != self.login_password {
            tracing::warn!("login attempt with wrong password");
            return Err(AuthError::WrongCredential);
        }
        tracing::info!("login succeeded, issuing full-site token");
        Ok(self.codec.encode(&CapabilityList::full_site()))
    }

    /// Whether `credential` is the configured admin credential.
    ///
    /// Always false when no admin credential is configured.
    pub fn is_admin(&self, credential: Option<&str>) -> bool {
        match (credential, self.admin_password.as_deref()) {
            (Some(given), Some(expected)) => given == expected,
            _ => false,
        }
    }

    /// Mint a token for an arbitrary capability list on behalf of an admin.
    pub fn issue_from_admin(
        &self,
        credential: Option<&str>,
        paths: Vec<String>,
    ) -> Result<IssuedLink, AuthError> {
        if !self.is_admin(credential) {
            tracing::warn!("admin issuance rejected");
            return Err(AuthError::WrongCredential);
        }

        let capabilities = CapabilityList::new(paths);
        let token = self.codec.encode(&capabilities);
        let url = self.link_url(&token);
        tracing::info!(
            capabilities = ?capabilities.iter().collect::<Vec<_>>(),
            "admin issued link token"
        );

        Ok(IssuedLink { token, url })
    }

    /// Re-validate a link token so it can be installed as a cookie.
    ///
    /// Possessing a valid link is equivalent to possessing the token.
    pub fn issue_from_link(&self, authkey: &str) -> Result<(String, CapabilityList), AuthError> {
        let capabilities = self.codec.decode(authkey)?;
        Ok((authkey.to_string(), capabilities))
    }

    /// Decode a token already held by the client.
    pub fn verify(&self, token: &str) -> Option<CapabilityList> {
        self.codec.decode(token).ok()
    }

    fn link_url(&self, token: &str) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("authkey", token)
            .finish();
        format!("{}?{query}", self.link_base)
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("link_base", &self.link_base)
            .finish_non_exhaustive()
    }
}
