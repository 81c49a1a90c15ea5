// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment once at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DATA_DIR` | Root directory of the document store | `./data` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `3001` |
//! | `AUTH_SECRET` | HS256 secret for access tokens | Required |
//! | `TOKEN_TTL_SECS` | Lifetime of issued tokens | `604800` |
//! | `ENFORCE_TOKEN_VERSION` | Reject tokens revoked by logout | `false` |
//! | `STRIPE_WEBHOOK_SECRET` | Payment webhook signing secret | Unset (webhook answers 503) |
//! | `TLS_CERT_PATH` / `TLS_KEY_PATH` | PEM files enabling HTTPS | Unset (plain HTTP) |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

use crate::state::{AuthConfig, PaymentsConfig};
use crate::storage::paths::DATA_ROOT;

/// Environment variable name for the document store root.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const AUTH_SECRET_ENV: &str = "AUTH_SECRET";
pub const TOKEN_TTL_ENV: &str = "TOKEN_TTL_SECS";
pub const ENFORCE_TOKEN_VERSION_ENV: &str = "ENFORCE_TOKEN_VERSION";
pub const STRIPE_WEBHOOK_SECRET_ENV: &str = "STRIPE_WEBHOOK_SECRET";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3001;
/// Seven days.
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// Secret used when `AUTH_SECRET` is unset in builds with the `dev` feature.
#[cfg(feature = "dev")]
const DEV_AUTH_SECRET: &str = "bounty-board-dev-secret";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
    #[error("{0} and {1} must be set together")]
    Incomplete(&'static str, &'static str),
}

/// PEM certificate chain and private key for HTTPS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Logging output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub bind_addr: SocketAddr,
    pub auth: AuthConfig,
    pub payments: Option<PaymentsConfig>,
    pub tls: Option<TlsPaths>,
    pub log_format: LogFormat,
    /// `AUTH_SECRET` was unset and the development secret is in use
    pub using_dev_secret: bool,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let data_dir = get(DATA_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DATA_ROOT));

        let host = get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match get(PORT_ENV) {
            Some(value) => value.parse::<u16>().map_err(|_| ConfigError::Invalid {
                name: PORT_ENV,
                value,
            })?,
            None => DEFAULT_PORT,
        };
        let bind_addr: SocketAddr =
            format!("{host}:{port}")
                .parse()
                .map_err(|_| ConfigError::Invalid {
                    name: HOST_ENV,
                    value: host.clone(),
                })?;

        let (secret, using_dev_secret) = match get(AUTH_SECRET_ENV) {
            Some(secret) => (secret, false),
            None => (dev_secret().ok_or(ConfigError::Missing(AUTH_SECRET_ENV))?, true),
        };

        let token_ttl_secs = match get(TOKEN_TTL_ENV) {
            Some(value) => match value.parse::<u64>() {
                Ok(ttl) if ttl > 0 => ttl,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: TOKEN_TTL_ENV,
                        value,
                    })
                }
            },
            None => DEFAULT_TOKEN_TTL_SECS,
        };

        let enforce_token_version = match get(ENFORCE_TOKEN_VERSION_ENV) {
            Some(value) => parse_bool(&value).ok_or(ConfigError::Invalid {
                name: ENFORCE_TOKEN_VERSION_ENV,
                value,
            })?,
            None => false,
        };

        let payments = get(STRIPE_WEBHOOK_SECRET_ENV).map(|webhook_secret| PaymentsConfig {
            webhook_secret,
        });

        let tls = match (get(TLS_CERT_PATH_ENV), get(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: PathBuf::from(cert),
                key: PathBuf::from(key),
            }),
            (None, None) => None,
            _ => return Err(ConfigError::Incomplete(TLS_CERT_PATH_ENV, TLS_KEY_PATH_ENV)),
        };

        let log_format = match get(LOG_FORMAT_ENV).as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Self {
            data_dir,
            bind_addr,
            auth: AuthConfig {
                secret,
                token_ttl_secs,
                enforce_token_version,
            },
            payments,
            tls,
            log_format,
            using_dev_secret,
        })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(feature = "dev")]
fn dev_secret() -> Option<String> {
    Some(DEV_AUTH_SECRET.to_string())
}

#[cfg(not(feature = "dev"))]
fn dev_secret() -> Option<String> {
    None
}
