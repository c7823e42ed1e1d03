// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::{
    auth::{ForwardAuthGateway, TokenCodec, TokenIssuer},
    config::{ConfigError, GatewayConfig, SECRET_KEY_ENV},
};

/// Shared, read-only state handed to every handler.
///
/// Everything here is derived from the configuration at startup; requests
/// never mutate it, so no locking is involved.
#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub gateway: Arc<ForwardAuthGateway>,
    pub issuer: Arc<TokenIssuer>,
}

impl AppState {
    pub fn new(config: GatewayConfig) -> Result<Self, ConfigError> {
        let codec = TokenCodec::new(&config.secret_key).map_err(|_| ConfigError::Invalid {
            var: SECRET_KEY_ENV,
            value: "<redacted>".to_string(),
            reason: "unusable as an HMAC key",
        })?;

        Ok(Self {
            gateway: Arc::new(ForwardAuthGateway::new(&config, codec.clone())),
            issuer: Arc::new(TokenIssuer::new(&config, codec)),
            config: Arc::new(config),
        })
    }
}

#[cfg(test)]
impl AppState {
    pub fn for_tests(mode: crate::config::Mode) -> Self {
        Self::new(GatewayConfig::for_tests(mode)).expect("test config is valid")
    }

    /// Encode a token with the state's secret.
    pub fn token_for(&self, prefixes: &[&str]) -> String {
        TokenCodec::new(&self.config.secret_key)
            .expect("test secret")
            .encode(&prefixes.iter().copied().collect())
    }
}
