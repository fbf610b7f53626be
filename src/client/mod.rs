//! Enrichment collaborators for the signature request preparer.
//!
//! This module provides typed clients for:
//! - Casper Wallet API - fiat rates, account metadata, contract packages and
//!   the WASM proxy registry, plus token, NFT, stake and deploy history
//!   listings and application announcements
//! - Casper node JSON-RPC - account records and global state queries
//!
//! # Example
//!
//! ```ignore
//! use casper_wallet_core::client::{NodeRpcClient, WalletApiClient};
//! use casper_wallet_core::ClientConfig;
//!
//! let config = ClientConfig::load();
//! let api = WalletApiClient::new(config.clone())?;
//! let node = NodeRpcClient::new(config)?;
//! ```

pub mod cache;
pub mod http;
pub mod proxies;
pub mod rpc;
pub mod traits;
pub mod wallet_api;


// ============================================================================
// Re-exports
// ============================================================================

pub use cache::AccountInfoCache;
pub use http::{HttpClient, HttpConfig};
pub use proxies::KnownWasmProxies;
pub use rpc::NodeRpcClient;
pub use traits::{
    AccountInfoSource, ContractPackageSource, OnChainAccountSource, RateSource, WasmProxyRegistry,
};
pub use wallet_api::{WalletApiClient, resolve_record_accounts};
