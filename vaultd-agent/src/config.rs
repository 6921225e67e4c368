//! Agent configuration.
//!
//! Loaded from a TOML file whose string values may reference environment
//! variables as `$VAR` or `${VAR}`. Variables that are not set are left in
//! place, so a missing signer key is reported instead of silently blank.
//!
//! # Example Configuration
//!
//! ```toml
//! host = "127.0.0.1"
//! port = 8080
//! cors_origins = ["https://vault.example"]
//! rpc_url = "https://sepolia.base.org"
//! signer_private_key = "$VAULT_SIGNER_KEY"
//! vault_address = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"
//! token_decimals = 18
//! confirmations = 1
//! receipt_timeout_secs = 30
//! wait_for_receipt = true
//! max_reason_len = 280
//! session_capacity = 10000
//! ```

use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use alloy_primitives::Address;
use alloy_signer_local::{LocalSignerError, PrivateKeySigner};
use axum::http::{HeaderValue, Method};
use serde::{Deserialize, Deserializer};
use tower_http::cors::{self, AllowOrigin, CorsLayer};
use url::Url;
use vaultd::DispatchConfig;
use vaultd::validate::{DEFAULT_DECIMALS, validate_address};
use vaultd_evm::{EvmSubmitterConfig, VaultActionOptions};

use crate::session::DEFAULT_SESSION_CAPACITY;

/// Failure to load or interpret the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// Config file path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// The file is not valid TOML or does not match the schema.
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
    /// `signer_private_key` is empty or references an unset variable.
    #[error("signer_private_key is not set (missing environment variable?)")]
    MissingSigner,
    /// `signer_private_key` is not a valid secp256k1 key.
    #[error("signer_private_key is invalid")]
    InvalidSigner(#[source] LocalSignerError),
    /// An entry of `cors_origins` is not a valid header value.
    #[error("cors_origins: invalid origin `{0}`")]
    InvalidOrigin(String),
}

/// Top-level agent configuration.
#[derive(Clone, Deserialize)]
pub struct AgentConfig {
    /// Server bind address (default: `127.0.0.1`).
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Server port (default: `8080`).
    #[serde(default = "default_port")]
    pub port: u16,

    /// Browser origins allowed to call the agent. Empty disables CORS;
    /// `"*"` allows any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// HTTP JSON-RPC endpoint.
    pub rpc_url: Url,

    /// Hex private key of the submitting account. Never logged.
    #[serde(default)]
    pub signer_private_key: String,

    /// The vault every call targets. Mixed-case input must be checksummed.
    #[serde(deserialize_with = "deserialize_vault")]
    pub vault_address: Address,

    /// Decimal precision used to scale human amounts (default: `18`).
    #[serde(default = "default_decimals")]
    pub token_decimals: u8,

    /// Confirmations to wait for after inclusion (default: `1`).
    #[serde(default = "default_confirmations")]
    pub confirmations: u64,

    /// Receipt wait bound in seconds (default: `30`).
    #[serde(default = "default_receipt_timeout_secs")]
    pub receipt_timeout_secs: u64,

    /// Wait for a receipt before reporting success (default: `true`).
    #[serde(default = "default_wait_for_receipt")]
    pub wait_for_receipt: bool,

    /// Maximum proposal reason length in characters. Unbounded when unset.
    #[serde(default)]
    pub max_reason_len: Option<usize>,

    /// Chat senders whose sessions are kept in memory (default: `10000`).
    #[serde(default = "default_session_capacity")]
    pub session_capacity: usize,
}

impl fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("cors_origins", &self.cors_origins)
            .field("rpc_url", &self.rpc_url.origin().ascii_serialization())
            .field("signer_private_key", &"<redacted>")
            .field("vault_address", &self.vault_address)
            .field("token_decimals", &self.token_decimals)
            .field("confirmations", &self.confirmations)
            .field("receipt_timeout_secs", &self.receipt_timeout_secs)
            .field("wait_for_receipt", &self.wait_for_receipt)
            .field("max_reason_len", &self.max_reason_len)
            .field("session_capacity", &self.session_capacity)
            .finish()
    }
}

const fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

const fn default_port() -> u16 {
    8080
}

const fn default_decimals() -> u8 {
    DEFAULT_DECIMALS
}

const fn default_confirmations() -> u64 {
    1
}

const fn default_receipt_timeout_secs() -> u64 {
    30
}

const fn default_wait_for_receipt() -> bool {
    true
}

const fn default_session_capacity() -> usize {
    DEFAULT_SESSION_CAPACITY
}

fn deserialize_vault<'de, D>(deserializer: D) -> Result<Address, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    validate_address(&raw)
        .map_err(|reason| serde::de::Error::custom(format!("vault_address: {reason}")))
}

impl AgentConfig {
    /// Loads configuration from `path`.
    ///
    /// A missing file is treated as empty, so every required field must
    /// then come from elsewhere and parsing will report which is absent.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = if path.exists() {
            std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_owned(),
                source,
            })?
        } else {
            String::new()
        };
        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text after environment expansion.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on malformed or incomplete input.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let expanded = expand_env_vars(content);
        Ok(toml::from_str(&expanded)?)
    }

    /// Parses the signing key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingSigner`] if the key is empty or still
    /// an unexpanded `$VAR`, or [`ConfigError::InvalidSigner`] if it does
    /// not parse.
    pub fn signer(&self) -> Result<PrivateKeySigner, ConfigError> {
        let key = self.signer_private_key.trim();
        if key.is_empty() || key.starts_with('$') {
            return Err(ConfigError::MissingSigner);
        }
        key.parse().map_err(ConfigError::InvalidSigner)
    }

    /// Dispatcher settings.
    #[must_use]
    pub const fn dispatch(&self) -> DispatchConfig {
        DispatchConfig::new(self.vault_address).with_decimals(self.token_decimals)
    }

    /// Action table settings.
    #[must_use]
    pub const fn actions(&self) -> VaultActionOptions {
        VaultActionOptions {
            max_reason_len: self.max_reason_len,
        }
    }

    /// Submitter settings.
    #[must_use]
    pub const fn submitter(&self) -> EvmSubmitterConfig {
        EvmSubmitterConfig {
            confirmations: self.confirmations,
            receipt_timeout: Duration::from_secs(self.receipt_timeout_secs),
            wait_for_receipt: self.wait_for_receipt,
        }
    }

    /// CORS layer for `cors_origins`, or `None` when the list is empty.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOrigin`] for an origin that is not a
    /// valid header value.
    pub fn cors(&self) -> Result<Option<CorsLayer>, ConfigError> {
        if self.cors_origins.is_empty() {
            return Ok(None);
        }
        let allow_origin = if self.cors_origins.iter().any(|o| o.trim() == "*") {
            AllowOrigin::any()
        } else {
            let origins = self
                .cors_origins
                .iter()
                .map(|o| {
                    HeaderValue::from_str(o.trim().trim_end_matches('/'))
                        .map_err(|_| ConfigError::InvalidOrigin(o.clone()))
                })
                .collect::<Result<Vec<_>, _>>()?;
            AllowOrigin::list(origins)
        };
        Ok(Some(
            CorsLayer::new()
                .allow_origin(allow_origin)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers(cors::Any),
        ))
    }
}

/// Expands `$VAR` and `${VAR}` from the process environment.
///
/// Unresolved variables are left as-is.
fn expand_env_vars(input: &str) -> String {
    expand_with(input, |name| std::env::var(name).ok())
}

fn expand_with(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '$' {
            result.push(ch);
            continue;
        }

        let braced = chars.next_if_eq(&'{').is_some();
        let mut name = String::new();
        let mut closed = false;
        while let Some(&c) = chars.peek() {
            if braced && c == '}' {
                chars.next();
                closed = true;
                break;
            }
            if !braced && !c.is_ascii_alphanumeric() && c != '_' {
                break;
            }
            name.push(c);
            chars.next();
        }

        match lookup(&name).filter(|_| !name.is_empty()) {
            Some(value) => result.push_str(&value),
            None => {
                result.push('$');
                if braced {
                    result.push('{');
                }
                result.push_str(&name);
                if closed {
                    result.push('}');
                }
            }
        }
    }

    result
}
