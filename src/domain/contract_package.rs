//! Contract package metadata.
//!
//! The declared contract type of a package's latest version decides which
//! action builder interprets a custom call into it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::keys::strip_prefix;

// ============================================================================
// Contract Type
// ============================================================================

/// Contract type identifiers as declared by the wallet API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContractTypeId {
    System,
    Cep18,
    CustomCep18,
    Cep47Nft,
    CustomCep47Nft,
    DeFi,
    Cep78Nft,
    CustomCep78Nft,
    CsprMarket,
    Cep95Nft,
}

impl ContractTypeId {
    /// Maps the numeric identifier; unknown numbers yield `None`.
    #[must_use]
    pub const fn from_id(id: u64) -> Option<Self> {
        match id {
            1 => Some(Self::System),
            2 => Some(Self::Cep18),
            3 => Some(Self::CustomCep18),
            4 => Some(Self::Cep47Nft),
            5 => Some(Self::CustomCep47Nft),
            6 => Some(Self::DeFi),
            7 => Some(Self::Cep78Nft),
            8 => Some(Self::CustomCep78Nft),
            9 => Some(Self::CsprMarket),
            10 => Some(Self::Cep95Nft),
            _ => None,
        }
    }

    #[must_use]
    pub const fn id(&self) -> u64 {
        match self {
            Self::System => 1,
            Self::Cep18 => 2,
            Self::CustomCep18 => 3,
            Self::Cep47Nft => 4,
            Self::CustomCep47Nft => 5,
            Self::DeFi => 6,
            Self::Cep78Nft => 7,
            Self::CustomCep78Nft => 8,
            Self::CsprMarket => 9,
            Self::Cep95Nft => 10,
        }
    }

    /// Fungible token standards.
    #[must_use]
    pub const fn is_fungible_token(&self) -> bool {
        matches!(self, Self::Cep18 | Self::CustomCep18)
    }

    /// Non-fungible token standards.
    #[must_use]
    pub const fn is_nft(&self) -> bool {
        matches!(
            self,
            Self::Cep47Nft | Self::CustomCep47Nft | Self::Cep78Nft | Self::CustomCep78Nft | Self::Cep95Nft
        )
    }
}

// ============================================================================
// Contract Package Info
// ============================================================================

/// Display identity of a contract package.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContractPackageInfo {
    /// Bare hex package hash.
    pub contract_package_hash: String,
    pub name: String,
    pub icon_url: Option<String>,
    /// Token decimals; `None` when the package declares none.
    pub decimals: Option<u32>,
    /// Token symbol; `None` when the package declares none.
    pub symbol: Option<String>,
    pub contract_type: Option<ContractTypeId>,
}

impl ContractPackageInfo {
    /// Create from a wallet API contract package payload.
    ///
    /// # Arguments
    ///
    /// * `json` - The `data` object of the API response
    ///
    /// # Returns
    ///
    /// A new `ContractPackageInfo`; absent fields stay absent rather than
    /// defaulting, so a legitimate zero is never confused with "missing".
    #[must_use]
    pub fn from_json(json: &Value) -> Self {
        let metadata = &json["metadata"];
        Self {
            contract_package_hash: strip_prefix(json["contract_package_hash"].as_str().unwrap_or("")),
            name: json["name"].as_str().unwrap_or("").to_string(),
            icon_url: json["icon_url"].as_str().map(String::from),
            decimals: metadata["decimals"]
                .as_u64()
                .and_then(|d| u32::try_from(d).ok()),
            symbol: metadata["symbol"].as_str().map(String::from),
            contract_type: json["latest_version_contract_type_id"]
                .as_u64()
                .and_then(ContractTypeId::from_id),
        }
    }
}
