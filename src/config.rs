// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names, default values and the
//! immutable [`GatewayConfig`] built from them. Configuration is loaded from
//! the environment once at startup and handed to every handler through the
//! router state.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `SECRET_KEY` | HMAC key signing every token | Required |
//! | `PASSWORD` | Login form password | Required |
//! | `ADMIN_PASSWORD` | Expected `X-NESTOR-ADMIN` header value | Unset (admin disabled) |
//! | `NESTOR_MODE` | `subrequest` or `domain` | `subrequest` |
//! | `LOGIN_URL` | Public base URL of this service | Empty; required in domain mode |
//! | `OVERLAY_PATH` | Overlay callback path on protected domains | `/_nestor/overlay` |
//! | `COOKIE_NAME` | Name of the token cookie | `_nestor_token` |
//! | `BG_URL` | Login page background image | Unset |
//! | `ROUTE_PREFIX` | Prefix all routes are nested under | Empty |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `TLS_CERT_PATH` / `TLS_KEY_PATH` | PEM certificate chain and key | Unset (plain HTTP) |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |
//!
//! Rotating `SECRET_KEY` invalidates every outstanding token at once.

use std::{env, fmt, net::SocketAddr, path::PathBuf, str::FromStr};

pub const SECRET_KEY_ENV: &str = "SECRET_KEY";
pub const PASSWORD_ENV: &str = "PASSWORD";
pub const ADMIN_PASSWORD_ENV: &str = "ADMIN_PASSWORD";
pub const MODE_ENV: &str = "NESTOR_MODE";
pub const LOGIN_URL_ENV: &str = "LOGIN_URL";
pub const OVERLAY_PATH_ENV: &str = "OVERLAY_PATH";
pub const COOKIE_NAME_ENV: &str = "COOKIE_NAME";
pub const BG_URL_ENV: &str = "BG_URL";
pub const ROUTE_PREFIX_ENV: &str = "ROUTE_PREFIX";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_COOKIE_NAME: &str = "_nestor_token";
pub const DEFAULT_OVERLAY_PATH: &str = "/_nestor/overlay";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{0} must not be empty")]
    Empty(&'static str),
    #[error("{var} has invalid value {value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Forward-auth protocol spoken with the reverse proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// nginx `auth_request` style: empty 200/401 per path-scoped subrequest.
    #[default]
    Subrequest,
    /// Traefik `forwardAuth` style: redirect to a central login domain and
    /// deliver the cookie back through the overlay handshake.
    Domain,
}

impl FromStr for Mode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "subrequest" => Ok(Mode::Subrequest),
            "domain" => Ok(Mode::Domain),
            _ => Err(ConfigError::Invalid {
                var: MODE_ENV,
                value: s.to_string(),
                reason: "expected `subrequest` or `domain`",
            }),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Subrequest => write!(f, "subrequest"),
            Mode::Domain => write!(f, "domain"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            _ => Err(ConfigError::Invalid {
                var: LOG_FORMAT_ENV,
                value: s.to_string(),
                reason: "expected `json` or `pretty`",
            }),
        }
    }
}

/// PEM files for HTTPS termination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Process-wide gateway configuration. Never mutated after startup.
#[derive(Clone)]
pub struct GatewayConfig {
    pub secret_key: Vec<u8>,
    pub login_password: String,
    /// `None` disables the admin issuance endpoint.
    pub admin_password: Option<String>,
    pub mode: Mode,
    /// Public base URL of this service, without a trailing slash. Login
    /// redirects and ready-made links are built on top of it.
    pub login_url: String,
    pub overlay_path: String,
    pub cookie_name: String,
    pub background_url: Option<String>,
    pub route_prefix: String,
    pub bind_addr: SocketAddr,
    pub tls: Option<TlsPaths>,
    pub log_format: LogFormat,
}

impl GatewayConfig {
    /// Load the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load the configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| -> Result<String, ConfigError> {
            let value = lookup(name).ok_or(ConfigError::Missing(name))?;
            if value.is_empty() {
                return Err(ConfigError::Empty(name));
            }
            Ok(value)
        };
        let optional = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let secret_key = required(SECRET_KEY_ENV)?.into_bytes();
        let login_password = required(PASSWORD_ENV)?;
        let admin_password = optional(ADMIN_PASSWORD_ENV);

        let mode = optional(MODE_ENV)
            .map(|v| v.parse())
            .transpose()?
            .unwrap_or_default();

        let login_url = optional(LOGIN_URL_ENV)
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .unwrap_or_default();
        if mode == Mode::Domain && login_url.is_empty() {
            return Err(ConfigError::Missing(LOGIN_URL_ENV));
        }

        let overlay_path = optional(OVERLAY_PATH_ENV)
            .map(|v| v.trim().to_string())
            .unwrap_or_else(|| DEFAULT_OVERLAY_PATH.to_string());
        if !overlay_path.starts_with('/') {
            return Err(ConfigError::Invalid {
                var: OVERLAY_PATH_ENV,
                value: overlay_path,
                reason: "must start with `/`",
            });
        }

        let cookie_name = optional(COOKIE_NAME_ENV)
            .map(|v| v.trim().to_string())
            .unwrap_or_else(|| DEFAULT_COOKIE_NAME.to_string());
        if cookie_name.contains([';', '=', ',', ' ']) {
            return Err(ConfigError::Invalid {
                var: COOKIE_NAME_ENV,
                value: cookie_name,
                reason: "must be a cookie token without `;`, `=`, `,` or spaces",
            });
        }

        let route_prefix = optional(ROUTE_PREFIX_ENV)
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .unwrap_or_default();
        if !route_prefix.is_empty() && !route_prefix.starts_with('/') {
            return Err(ConfigError::Invalid {
                var: ROUTE_PREFIX_ENV,
                value: route_prefix,
                reason: "must start with `/`",
            });
        }

        let host = optional(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match optional(PORT_ENV) {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::Invalid {
                var: PORT_ENV,
                value: raw.clone(),
                reason: "expected a TCP port number",
            })?,
            None => DEFAULT_PORT,
        };
        let bind_addr = format!("{host}:{port}")
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::Invalid {
                var: HOST_ENV,
                value: host.clone(),
                reason: "expected an IP address",
            })?;

        let tls = match (optional(TLS_CERT_PATH_ENV), optional(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: cert.into(),
                key: key.into(),
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing(TLS_KEY_PATH_ENV)),
            (None, Some(_)) => return Err(ConfigError::Missing(TLS_CERT_PATH_ENV)),
        };

        let log_format = optional(LOG_FORMAT_ENV)
            .map(|v| v.parse())
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            secret_key,
            login_password,
            admin_password,
            mode,
            login_url,
            overlay_path,
            cookie_name,
            background_url: optional(BG_URL_ENV),
            route_prefix,
            bind_addr,
            tls,
            log_format,
        })
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("secret_key", &"<redacted>")
            .field("login_password", &"<redacted>")
            .field(
                "admin_password",
                &self.admin_password.as_ref().map(|_| "<redacted>"),
            )
            .field("mode", &self.mode)
            .field("login_url", &self.login_url)
            .field("overlay_path", &self.overlay_path)
            .field("cookie_name", &self.cookie_name)
            .field("background_url", &self.background_url)
            .field("route_prefix", &self.route_prefix)
            .field("bind_addr", &self.bind_addr)
            .field("tls", &self.tls)
            .field("log_format", &self.log_format)
            .finish()
    }
}

#[cfg(test)]
impl GatewayConfig {
    /// Fixed configuration used across handler and gateway tests.
    pub fn for_tests(mode: Mode) -> Self {
        Self {
            secret_key: b"test-secret".to_vec(),
            login_password: "hunter2".to_string(),
            admin_password: Some("admin-secret".to_string()),
            mode,
            login_url: "https://auth.example.com".to_string(),
            overlay_path: DEFAULT_OVERLAY_PATH.to_string(),
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            background_url: None,
            route_prefix: String::new(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)),
            tls: None,
            log_format: LogFormat::Pretty,
        }
    }
}
