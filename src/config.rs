//! Client configuration with persistence.
//!
//! [`ClientConfig`] holds the knobs of the enrichment collaborators:
//! endpoint overrides, timeouts, the `Referer` header and the WASM proxy
//! registry settings.
//!
//! # Configuration File Location
//!
//! - Linux: `~/.config/casper-wallet-core/config.json`
//! - macOS: `~/Library/Application Support/casper-wallet-core/config.json`
//! - Windows: `%APPDATA%/casper-wallet-core/config.json`
//!
//! # Example
//!
//! ```ignore
//! use casper_wallet_core::ClientConfig;
//!
//! let config = ClientConfig::load();
//! let preparer = SignatureRequestPreparer::from_config(&config)?;
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::client::cache::DEFAULT_MAX_ACCOUNTS_PER_NETWORK;
use crate::client::http::{DEFAULT_TIMEOUT_SECS, HttpConfig};
use crate::domain::network::PRODUCTION_API_URL;
use crate::domain::{CasperNetwork, ConfigError};

// ============================================================================
// Constants
// ============================================================================

/// Directory name under the platform config directory.
const APP_NAME: &str = "casper-wallet-core";

/// Configuration file name.
const CONFIG_FILE: &str = "config.json";

// ============================================================================
// Endpoints
// ============================================================================

/// Per-network endpoint overrides. Unset fields use the built-in URLs.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NetworkEndpoints {
    pub wallet_api_url: Option<String>,
    pub rpc_url: Option<String>,
}

// ============================================================================
// ClientConfig
// ============================================================================

/// Configuration for the enrichment collaborators.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    /// Endpoint overrides keyed by network.
    pub endpoints: HashMap<CasperNetwork, NetworkEndpoints>,
    /// Per-request timeout.
    pub timeout_secs: u64,
    /// `Referer` header for proxied API access.
    pub referer: Option<String>,
    /// Module hashes always treated as WASM proxies.
    pub known_wasm_proxies: Vec<String>,
    /// Whether to ask the remote registry about modules not listed above.
    pub use_remote_proxy_registry: bool,
    /// Base URL of the remote WASM proxy registry.
    pub proxy_registry_url: String,
    /// Accounts remembered per network before the cache starts over.
    pub account_cache_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoints: HashMap::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            referer: None,
            known_wasm_proxies: Vec::new(),
            use_remote_proxy_registry: true,
            proxy_registry_url: PRODUCTION_API_URL.to_string(),
            account_cache_size: DEFAULT_MAX_ACCOUNTS_PER_NETWORK,
        }
    }
}

impl ClientConfig {
    /// Returns the path to the configuration file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NoConfigDir` if the platform has no
    /// configuration directory.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let mut path = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        path.push(APP_NAME);
        path.push(CONFIG_FILE);
        Ok(path)
    }

    /// Loads the configuration from the default location, falling back to
    /// defaults when it is missing or unreadable.
    #[must_use]
    pub fn load() -> Self {
        match Self::config_path() {
            Ok(path) => Self::load_from(&path),
            Err(err) => {
                tracing::warn!(error = %err, "Config load failed, using defaults");
                Self::default()
            }
        }
    }

    /// Loads the configuration from `path`, falling back to defaults.
    #[must_use]
    pub fn load_from(path: &Path) -> Self {
        match Self::try_load_from(path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "Config load failed, using defaults");
                Self::default()
            }
        }
    }

    /// Attempts to load the configuration from `path`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the file cannot be read, or
    /// `ConfigError::Json` if its content is not a valid configuration.
    pub fn try_load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Saves the configuration to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the file cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Wallet API base URL for a network.
    #[must_use]
    pub fn wallet_api_url(&self, network: CasperNetwork) -> String {
        self.endpoints
            .get(&network)
            .and_then(|endpoints| endpoints.wallet_api_url.clone())
            .unwrap_or_else(|| network.wallet_api_url().to_string())
    }

    /// Node JSON-RPC URL for a network.
    #[must_use]
    pub fn rpc_url(&self, network: CasperNetwork) -> String {
        self.endpoints
            .get(&network)
            .and_then(|endpoints| endpoints.rpc_url.clone())
            .unwrap_or_else(|| network.rpc_url().to_string())
    }

    /// HTTP settings shared by every collaborator.
    #[must_use]
    pub fn http_config(&self) -> HttpConfig {
        HttpConfig {
            timeout: Duration::from_secs(self.timeout_secs),
            referer: self.referer.clone(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
