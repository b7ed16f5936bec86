// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names, default values, and the
//! [`AppConfig`] parsed from them once at startup. Nothing here is mutated
//! after the server starts.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `DATA_DIR` | Directory holding `members.redb` | `./data` |
//! | `JWT_SECRET` | HMAC signing secret (at least 32 bytes) | Required |
//! | `JWT_LIFETIME_SECS` | Token lifetime in seconds | `7200` |
//! | `ADMIN_EMAILS` | Comma separated emails granted admin at sign-up | empty |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::collections::BTreeSet;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use chrono::Duration;

use crate::logging::LogFormat;
use crate::storage::{MEMBERS_DB_FILE, STORES_DB_FILE};

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";

/// Environment variable name for the data directory path.
///
/// The member database file is created inside it on first start.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

/// Environment variable name for the token signing secret.
///
/// The same secret must be used by every instance serving the same members,
/// otherwise tokens issued by one are rejected by the others.
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";
pub const JWT_LIFETIME_ENV: &str = "JWT_LIFETIME_SECS";
pub const ADMIN_EMAILS_ENV: &str = "ADMIN_EMAILS";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATA_DIR: &str = "./data";

/// Default token lifetime: two hours.
pub const DEFAULT_JWT_LIFETIME_SECS: i64 = 7200;

/// HS256 keys shorter than the hash output are rejected.
pub const MIN_SECRET_LEN: usize = 32;

/// Default `RUST_LOG` filter when the variable is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Immutable server configuration.
#[derive(Clone)]
pub struct AppConfig {
    pub host: IpAddr,
    pub port: u16,
    pub data_dir: PathBuf,
    pub jwt_secret: Vec<u8>,
    pub jwt_lifetime: Duration,
    pub admin_emails: BTreeSet<String>,
    pub log_format: LogFormat,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("data_dir", &self.data_dir)
            .field("jwt_secret", &"<redacted>")
            .field("jwt_lifetime_secs", &self.jwt_lifetime.num_seconds())
            .field("admin_emails", &self.admin_emails)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl AppConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let host = match var(HOST_ENV) {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                name: HOST_ENV,
                reason: format!("'{raw}' is not an IP address"),
            })?,
            None => DEFAULT_HOST,
        };

        let port = match var(PORT_ENV) {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                name: PORT_ENV,
                reason: format!("'{raw}' is not a port number"),
            })?,
            None => DEFAULT_PORT,
        };

        let data_dir = PathBuf::from(var(DATA_DIR_ENV).unwrap_or_else(|| DEFAULT_DATA_DIR.to_string()));

        // Not trimmed: whitespace may be part of the secret.
        let jwt_secret = lookup(JWT_SECRET_ENV)
            .filter(|secret| !secret.is_empty())
            .ok_or(ConfigError::Missing(JWT_SECRET_ENV))?
            .into_bytes();
        if jwt_secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::Invalid {
                name: JWT_SECRET_ENV,
                reason: format!("must be at least {MIN_SECRET_LEN} bytes"),
            });
        }

        let lifetime_secs = match var(JWT_LIFETIME_ENV) {
            Some(raw) => raw.parse::<i64>().map_err(|_| ConfigError::Invalid {
                name: JWT_LIFETIME_ENV,
                reason: format!("'{raw}' is not a number of seconds"),
            })?,
            None => DEFAULT_JWT_LIFETIME_SECS,
        };
        if lifetime_secs <= 0 {
            return Err(ConfigError::Invalid {
                name: JWT_LIFETIME_ENV,
                reason: "must be positive".to_string(),
            });
        }
        let jwt_lifetime = Duration::try_seconds(lifetime_secs).ok_or(ConfigError::Invalid {
            name: JWT_LIFETIME_ENV,
            reason: "out of range".to_string(),
        })?;

        let admin_emails = var(ADMIN_EMAILS_ENV)
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|email| !email.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let log_format = match var(LOG_FORMAT_ENV) {
            Some(raw) => raw.parse().map_err(|reason| ConfigError::Invalid {
                name: LOG_FORMAT_ENV,
                reason,
            })?,
            None => LogFormat::default(),
        };

        Ok(Self {
            host,
            port,
            data_dir,
            jwt_secret,
            jwt_lifetime,
            admin_emails,
            log_format,
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn members_db_path(&self) -> PathBuf {
        self.data_dir.join(MEMBERS_DB_FILE)
    }

    pub fn stores_db_path(&self) -> PathBuf {
        self.data_dir.join(STORES_DB_FILE)
    }
}
