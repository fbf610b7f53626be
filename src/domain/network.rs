//! Network configuration for Casper networks.
//!
//! This module defines the supported Casper networks, the endpoints the
//! wallet talks to on each of them, and the well-known contracts deployed
//! there.

use serde::{Deserialize, Serialize};

// ============================================================================
// Constants
// ============================================================================

/// Wallet API that serves network-independent data (e.g. the WASM proxy registry).
pub const PRODUCTION_API_URL: &str = "https://api.casperwallet.io";

// ============================================================================
// Network
// ============================================================================

/// Casper network variants.
///
/// A network can be named either by its wallet-facing name (`mainnet`) or by
/// the chain name carried inside transactions (`casper`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CasperNetwork {
    /// The production network.
    #[default]
    Mainnet,
    /// The public test network.
    Testnet,
    /// Development network.
    Devnet,
    /// Integration network.
    Integration,
}

impl CasperNetwork {
    /// All networks, in display order.
    pub const ALL: [Self; 4] = [Self::Mainnet, Self::Testnet, Self::Devnet, Self::Integration];

    /// Returns the wallet-facing name of the network.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
            Self::Devnet => "devnet",
            Self::Integration => "integration",
        }
    }

    /// Returns the chain name transactions carry for this network.
    #[must_use]
    pub const fn chain_name(&self) -> &'static str {
        match self {
            Self::Mainnet => "casper",
            Self::Testnet => "casper-test",
            Self::Devnet => "dev-net",
            Self::Integration => "integration-test",
        }
    }

    /// Resolves a network from either its own name or its chain name.
    ///
    /// # Returns
    ///
    /// `None` when the name matches no known network.
    #[must_use]
    pub fn from_chain_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|network| network.as_str() == name || network.chain_name() == name)
    }

    /// Returns the block explorer base URL.
    #[must_use]
    pub const fn explorer_url(&self) -> &'static str {
        match self {
            Self::Mainnet => "https://cspr.live",
            Self::Testnet => "https://testnet.cspr.live",
            Self::Devnet => "https://devnet.cspr.live",
            Self::Integration => "https://integration.cspr.live",
        }
    }

    /// Returns the wallet API base URL.
    #[must_use]
    pub const fn wallet_api_url(&self) -> &'static str {
        match self {
            Self::Mainnet => "https://api.mainnet.casperwallet.io",
            Self::Testnet => "https://cspr-click-accounts.dev.make.services/api/wallet-proxy",
            Self::Devnet => "https://cspr-wallet-api.dev.make.services",
            Self::Integration => "https://api.integration.casperwallet.io",
        }
    }

    /// Returns the node JSON-RPC URL.
    #[must_use]
    pub const fn rpc_url(&self) -> &'static str {
        match self {
            Self::Mainnet => "https://node.cspr.cloud/rpc",
            Self::Testnet => "https://cspr-click-accounts.dev.make.services/api/node-proxy/rpc",
            Self::Devnet => {
                "https://cspr-api-gateway.dev.make.services/cspr-node-proxy-rpc-dev-condor/rpc"
            }
            Self::Integration => "https://node.integration.cspr.cloud/rpc",
        }
    }

    /// The auction (staking) system contract, where deployed.
    #[must_use]
    pub const fn auction_manager(&self) -> Option<KnownContract> {
        match self {
            Self::Mainnet => Some(KnownContract::named(
                "ccb576d6ce6dec84a551e48f0d0b7af89ddba44c7390b690036257a04a3ae9ea",
                "86f2d45f024d7bb7fb5266b2390d7c253b588a0a16ebd946a60cb4314600af74",
                "Auction",
            )),
            Self::Testnet => Some(KnownContract::named(
                "93d923e336b20a4c4ca14d592b60e5bd3fe330775618290104f9beb326db7ae2",
                "e375d42c29c0e4b2baefa63cf2d70af34439eda851e08129d8515515d63bd6a9",
                "Auction",
            )),
            Self::Devnet | Self::Integration => None,
        }
    }

    /// The CSPR.market marketplace contract, where deployed.
    #[must_use]
    pub const fn cspr_market(&self) -> Option<KnownContract> {
        match self {
            Self::Mainnet => Some(KnownContract::named(
                "5adb720d529964437caf75f3df974edffd204fe511b9e359e7dff28f79d12337",
                "31cc023b17c903a963ec60eab96a60f1fa37cb74b4b3bafc91a441e0e9d70f97",
                "CSPR.market",
            )),
            Self::Testnet => Some(KnownContract::named(
                "a7b2de3119f20c32ec19a103359e7b2942159a3198bde29687b497c22a9d27bc",
                "154ff59b5f9feec42d3a418058d66badcb2121dc3ffb2e3cf92596bf5aafbc88",
                "CSPR.market",
            )),
            Self::Devnet | Self::Integration => None,
        }
    }

    /// The associated-keys manager contract, where deployed.
    #[must_use]
    pub const fn associated_keys_manager(&self) -> Option<KnownContract> {
        match self {
            Self::Mainnet => Some(KnownContract::named(
                "b2ec4f982efa8643c979cb3ab42ad1a18851c2e6f91804cd3e65c079679bdc59",
                "51f3812fde357ac73c6d89785155be59ddbcba97cf8f5b49362ebdbbd90290d2",
                "Associated Key Manager",
            )),
            Self::Testnet => Some(KnownContract::named(
                "676794cbbb35ff5642d0ae9c35302e244a7236a614d7e9ef58d0fb2cba6be3ed",
                "ff9c3c0c447d2e3a79c02e13d048c03f6fac8a911fdc04118cc754c84ef6259e",
                "Associated Key Manager",
            )),
            Self::Devnet | Self::Integration => None,
        }
    }
}

impl std::fmt::Display for CasperNetwork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Known Contracts
// ============================================================================

/// Identity of a contract the wallet recognises by address or name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownContract {
    /// Hash of the deployed contract version.
    pub contract_hash: &'static str,
    /// Name the contract is installed under.
    pub contract_name: &'static str,
    /// Hash of the contract package.
    pub package_hash: &'static str,
    /// Name the package is installed under.
    pub package_name: &'static str,
}

impl KnownContract {
    const fn named(contract_hash: &'static str, package_hash: &'static str, name: &'static str) -> Self {
        Self {
            contract_hash,
            contract_name: name,
            package_hash,
            package_name: name,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
