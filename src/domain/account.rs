//! Account display identities and the hash-keyed lookup they are resolved from.
//!
//! [`AccountInfo`] is what the wallet API knows about an account (name, logo,
//! CSPR.name). [`AccountInfoMap`] is the caller-populated cache the
//! signature request builders read from; a miss is never an error.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::explorer;
use super::keys::{AccountKeyType, hash_by_type, strip_prefix};
use super::network::CasperNetwork;

// ============================================================================
// Account Info
// ============================================================================

/// Resolved display identity of an account.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    /// Hex public key; empty when only the account hash is known.
    pub public_key: String,
    /// Bare hex account hash.
    pub account_hash: String,
    /// Display name, empty when the account is anonymous.
    pub name: String,
    /// Logo or avatar URL.
    pub branding_logo: Option<String>,
    /// Registered CSPR.name alias.
    pub cspr_name: Option<String>,
    /// Block explorer link for the account.
    pub explorer_link: Option<String>,
}

impl AccountInfo {
    /// Create account info from a wallet API account payload.
    ///
    /// The name comes from on-chain owner info, then centralized info. The
    /// logo prefers the 256px PNG, then SVG, then 1024px PNG, then the
    /// centralized avatar.
    ///
    /// # Arguments
    ///
    /// * `network` - Network the account lives on, used for the explorer link
    /// * `json` - One account entry from the API response
    ///
    /// # Returns
    ///
    /// A new `AccountInfo`; missing fields fall back to empty values.
    #[must_use]
    pub fn from_json(network: CasperNetwork, json: &Value) -> Self {
        let public_key = json["public_key"].as_str().unwrap_or("").to_string();
        let account_hash = strip_prefix(json["account_hash"].as_str().unwrap_or(""));

        let owner = &json["account_info"]["info"]["owner"];
        let centralized = &json["centralized_account_info"];

        let name = owner["name"]
            .as_str()
            .or_else(|| centralized["name"].as_str())
            .unwrap_or("")
            .to_string();

        let logo = &owner["branding"]["logo"];
        let branding_logo = ["png_256", "svg", "png_1024"]
            .iter()
            .find_map(|size| logo[size].as_str())
            .or_else(|| centralized["avatar_url"].as_str())
            .map(String::from);

        let cspr_name = json["cspr_name"].as_str().map(String::from);

        let link_key = if public_key.is_empty() {
            account_hash.as_str()
        } else {
            public_key.as_str()
        };
        let explorer_link = explorer::account_url(network.as_str(), link_key);

        Self {
            public_key,
            account_hash,
            name,
            branding_logo,
            cspr_name,
            explorer_link,
        }
    }

    /// The public key when the API knows it.
    #[must_use]
    pub fn known_public_key(&self) -> Option<&str> {
        Some(self.public_key.as_str()).filter(|key| !key.is_empty())
    }
}

// ============================================================================
// Resolved Identity
// ============================================================================

/// A key as it should be displayed, after resolution against the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity {
    pub key: String,
    pub key_type: AccountKeyType,
    pub account_info: Option<AccountInfo>,
}

// ============================================================================
// Account Info Map
// ============================================================================

/// Account info keyed by lowercase bare account hash.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountInfoMap(HashMap<String, AccountInfo>);

impl AccountInfoMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry under its account hash, deriving the hash from the
    /// public key when the payload omitted it.
    pub fn insert(&mut self, info: AccountInfo) {
        let key = if info.account_hash.is_empty() {
            hash_by_type(&info.public_key, AccountKeyType::PublicKey)
        } else {
            Some(info.account_hash.to_ascii_lowercase())
        };
        if let Some(key) = key {
            self.0.insert(key, info);
        }
    }

    pub fn extend(&mut self, other: Self) {
        self.0.extend(other.0);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when the account hash is already cached.
    #[must_use]
    pub fn contains(&self, account_hash: &str) -> bool {
        self.0.contains_key(&account_hash.to_ascii_lowercase())
    }

    /// Looks a key up after normalising it by type.
    ///
    /// Public keys are hashed to their account hash first; contract hashes
    /// and purses are never found.
    #[must_use]
    pub fn resolve(&self, key: &str, key_type: AccountKeyType) -> Option<&AccountInfo> {
        hash_by_type(key, key_type).and_then(|hash| self.0.get(&hash))
    }

    /// Resolves a key and applies the upgrade rule: on a hit that knows the
    /// public key, the public key becomes the displayed key.
    #[must_use]
    pub fn resolve_identity(&self, key: &str, key_type: AccountKeyType) -> ResolvedIdentity {
        let account_info = self.resolve(key, key_type).cloned();
        match account_info.as_ref().and_then(AccountInfo::known_public_key) {
            Some(public_key) => ResolvedIdentity {
                key: public_key.to_string(),
                key_type: AccountKeyType::PublicKey,
                account_info,
            },
            None => ResolvedIdentity {
                key: key.to_string(),
                key_type,
                account_info,
            },
        }
    }
}

impl FromIterator<AccountInfo> for AccountInfoMap {
    fn from_iter<I: IntoIterator<Item = AccountInfo>>(iter: I) -> Self {
        let mut map = Self::new();
        for info in iter {
            map.insert(info);
        }
        map
    }
}

// ============================================================================
// On-chain Account
// ============================================================================

/// A key allowed to sign for an account, with its weight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociatedKey {
    /// Bare lowercase account hash.
    pub account_hash: String,
    pub weight: u8,
}

/// The subset of the node's account record used for signature weights.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RpcAccountInfo {
    pub associated_keys: Vec<AssociatedKey>,
}

impl RpcAccountInfo {
    /// Create from a `state_get_account_info` result object.
    #[must_use]
    pub fn from_json(result: &Value) -> Self {
        let associated_keys = result["account"]["associated_keys"]
            .as_array()
            .map(|keys| {
                keys.iter()
                    .filter_map(|key| {
                        let account_hash = strip_prefix(key["account_hash"].as_str()?);
                        let weight = u8::try_from(key["weight"].as_u64()?).ok()?;
                        Some(AssociatedKey {
                            account_hash: account_hash.to_ascii_lowercase(),
                            weight,
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self { associated_keys }
    }

    /// Weight of the given account hash, if it is an associated key.
    #[must_use]
    pub fn weight_of(&self, account_hash: &str) -> Option<u8> {
        let account_hash = strip_prefix(account_hash).to_ascii_lowercase();
        self.associated_keys
            .iter()
            .find(|key| key.account_hash == account_hash)
            .map(|key| key.weight)
    }
}

// ============================================================================
// Tests
// ============================================================================
