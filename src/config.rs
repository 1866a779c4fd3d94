use std::{env, net::SocketAddr, path::PathBuf};

use axum_extra::extract::cookie::Key;
use rand::Rng;
use thiserror::Error;
use tracing::{info, warn};

/// `Key::derive_from` refuses anything shorter.
pub const MIN_SECRET_LEN: usize = 32;

const DEFAULT_DATABASE_PATH: &str = "database/park_rental.db";
const DEFAULT_UPLOAD_FOLDER: &str = "uploads";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("SECRET_KEY must be at least 32 bytes, got {0}")]
    SecretTooShort(usize),

    #[error("Invalid BIND_ADDR {value:?}: {source}")]
    BindAddr {
        value: String,
        source: std::net::AddrParseError,
    },
}

/// Settings shared by both applications. Each app takes the parts it needs
/// when building its state.
#[derive(Clone)]
pub struct Config {
    pub secret_key: String,
    pub database_path: PathBuf,
    pub upload_folder: PathBuf,
    pub bind_addr: SocketAddr,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup, falling back to defaults for
    /// unset or blank keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let secret_key = match var("SECRET_KEY") {
            Some(secret) if secret.len() < MIN_SECRET_LEN => {
                return Err(ConfigError::SecretTooShort(secret.len()))
            }
            Some(secret) => secret,
            None => {
                warn!("SECRET_KEY not set, generating a random key; flash cookies will not survive a restart");
                generate_secret()
            }
        };

        let bind = or_default(var("BIND_ADDR"), "BIND_ADDR", DEFAULT_BIND_ADDR);
        let bind_addr = bind
            .parse::<SocketAddr>()
            .map_err(|source| ConfigError::BindAddr { value: bind, source })?;

        Ok(Self {
            secret_key,
            database_path: or_default(var("DATABASE_PATH"), "DATABASE_PATH", DEFAULT_DATABASE_PATH)
                .into(),
            upload_folder: or_default(var("UPLOAD_FOLDER"), "UPLOAD_FOLDER", DEFAULT_UPLOAD_FOLDER)
                .into(),
            bind_addr,
        })
    }

    pub fn signing_key(&self) -> Key {
        Key::derive_from(self.secret_key.as_bytes())
    }
}

fn or_default(value: Option<String>, key: &str, default: &str) -> String {
    value.unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    })
}

fn generate_secret() -> String {
    rand::thread_rng()
        .sample_iter(&rand::distributions::Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}
