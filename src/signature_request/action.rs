//! The action union: what a transaction does, in display form.
//!
//! Serialized with a `type` discriminant and camelCase fields, so a wallet
//! UI can switch on `type` and render the remaining fields directly.

use std::collections::BTreeMap;

use serde::Serialize;

use super::args::DecodedArgs;
use crate::domain::account::{AccountInfo, ResolvedIdentity};
use crate::domain::amount::{self, CSPR_DECIMALS, CSPR_SYMBOL};
use crate::domain::keys::AccountKeyType;

// ============================================================================
// Shared Parts
// ============================================================================

/// Identity of the contract a transaction calls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractInfo {
    pub contract_package_hash: Option<String>,
    pub contract_hash: Option<String>,
    pub contract_name: String,
    pub contract_link: Option<String>,
}

/// A token amount in raw, decimal, display and fiat forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenAmount {
    /// Integer string in the token's smallest unit.
    pub amount: String,
    pub decimal_amount: String,
    pub formatted_decimal_amount: String,
    /// Empty when no rate is known.
    pub fiat_amount: String,
    pub decimals: u32,
    pub symbol: String,
}

impl TokenAmount {
    /// A native-token amount, with fiat value at `fiat_rate`.
    #[must_use]
    pub fn cspr(amount: String, fiat_rate: &str) -> Self {
        Self {
            decimal_amount: amount::decimal_amount(&amount, CSPR_DECIMALS),
            formatted_decimal_amount: amount::formatted_amount(&amount, CSPR_DECIMALS),
            fiat_amount: amount::fiat_amount(&amount, fiat_rate),
            decimals: CSPR_DECIMALS,
            symbol: CSPR_SYMBOL.to_string(),
            amount,
        }
    }

    /// A fungible-token amount; no fiat value is known for these.
    #[must_use]
    pub fn token(amount: String, decimals: u32, symbol: String) -> Self {
        Self {
            decimal_amount: amount::decimal_amount(&amount, decimals),
            formatted_decimal_amount: amount::formatted_amount(&amount, decimals),
            fiat_amount: String::new(),
            decimals,
            symbol,
            amount,
        }
    }
}

/// NFT token ids with their explorer links.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NftTokens {
    /// Bare hex of the collection contract, or empty.
    pub collection_hash: String,
    pub collection_name: Option<String>,
    pub nft_token_ids: Vec<String>,
    pub nft_token_urls_map: BTreeMap<String, Option<String>>,
    /// `None` for entry points that carry no meaningful count.
    #[serde(rename = "amountOfNFTs")]
    pub amount_of_nfts: Option<usize>,
}

// ============================================================================
// Variants
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeCsprAction {
    pub recipient_key: String,
    pub recipient_key_type: AccountKeyType,
    pub recipient_account_info: Option<AccountInfo>,
    #[serde(flatten)]
    pub amount: TokenAmount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cep18Action {
    pub entry_point: String,
    pub recipient_key: String,
    pub recipient_key_type: AccountKeyType,
    pub recipient_account_info: Option<AccountInfo>,
    #[serde(flatten)]
    pub amount: TokenAmount,
    pub icon_url: Option<String>,
    #[serde(flatten)]
    pub contract: ContractInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NftAction {
    pub entry_point: String,
    pub recipient_key: String,
    pub recipient_key_type: AccountKeyType,
    pub recipient_account_info: Option<AccountInfo>,
    #[serde(flatten)]
    pub tokens: NftTokens,
    pub icon_url: Option<String>,
    #[serde(flatten)]
    pub contract: ContractInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CasperMarketAction {
    pub entry_point: String,
    pub offerer_hash: String,
    pub offerer_hash_type: AccountKeyType,
    pub offerer_account_info: Option<AccountInfo>,
    #[serde(flatten)]
    pub amount: TokenAmount,
    #[serde(flatten)]
    pub tokens: NftTokens,
    pub icon_url: Option<String>,
    #[serde(flatten)]
    pub contract: ContractInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssociatedKeysAction {
    #[serde(flatten)]
    pub contract: ContractInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuctionAction {
    pub entry_point: String,
    /// Set only for undelegate and redelegate.
    pub from_validator: Option<String>,
    pub from_validator_key_type: AccountKeyType,
    pub from_validator_account_info: Option<AccountInfo>,
    /// `None` when no validator argument names one.
    pub to_validator: Option<String>,
    pub to_validator_key_type: AccountKeyType,
    pub to_validator_account_info: Option<AccountInfo>,
    #[serde(flatten)]
    pub amount: TokenAmount,
    #[serde(flatten)]
    pub contract: ContractInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnknownContractAction {
    pub entry_point: String,
    pub icon_url: Option<String>,
    pub args: DecodedArgs,
    #[serde(flatten)]
    pub contract: ContractInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WasmAction {
    /// Hex blake2b-256 of the module bytes.
    pub wasm_hash: String,
    pub args: DecodedArgs,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WasmProxyAction {
    /// Entry point of the wrapped call.
    pub entry_point: String,
    pub wasm_hash: String,
    pub icon_url: Option<String>,
    /// Proxy arguments merged with the wrapped call's own arguments.
    pub args: DecodedArgs,
    #[serde(flatten)]
    pub contract: ContractInfo,
}

/// What a transaction does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum Action {
    #[serde(rename = "CSPR_NATIVE")]
    NativeCspr(NativeCsprAction),
    #[serde(rename = "CEP18")]
    Cep18(Cep18Action),
    #[serde(rename = "NFT")]
    Nft(NftAction),
    #[serde(rename = "CSPR_MARKET")]
    CasperMarket(CasperMarketAction),
    #[serde(rename = "ASSOCIATED_KEYS")]
    AssociatedKeys(AssociatedKeysAction),
    #[serde(rename = "AUCTION")]
    Auction(AuctionAction),
    #[serde(rename = "UNKNOWN")]
    Unknown(UnknownContractAction),
    #[serde(rename = "WASM")]
    Wasm(WasmAction),
    #[serde(rename = "WASM_PROXY")]
    WasmProxy(WasmProxyAction),
}

impl Action {
    /// The serialized `type` discriminant.
    #[must_use]
    pub const fn action_type(&self) -> &'static str {
        match self {
            Self::NativeCspr(_) => "CSPR_NATIVE",
            Self::Cep18(_) => "CEP18",
            Self::Nft(_) => "NFT",
            Self::CasperMarket(_) => "CSPR_MARKET",
            Self::AssociatedKeys(_) => "ASSOCIATED_KEYS",
            Self::Auction(_) => "AUCTION",
            Self::Unknown(_) => "UNKNOWN",
            Self::Wasm(_) => "WASM",
            Self::WasmProxy(_) => "WASM_PROXY",
        }
    }

    /// Collection contract hash, for actions that name one.
    #[must_use]
    pub fn collection_hash(&self) -> Option<&str> {
        let tokens = match self {
            Self::Nft(action) => &action.tokens,
            Self::CasperMarket(action) => &action.tokens,
            _ => return None,
        };
        Some(tokens.collection_hash.as_str()).filter(|hash| !hash.is_empty())
    }

    /// Keys this action surfaces, for the enrichment pass.
    #[must_use]
    pub fn referenced_keys(&self) -> Vec<(String, AccountKeyType)> {
        match self {
            Self::NativeCspr(action) => vec![(action.recipient_key.clone(), action.recipient_key_type)],
            Self::Cep18(action) => vec![(action.recipient_key.clone(), action.recipient_key_type)],
            Self::Nft(action) => vec![(action.recipient_key.clone(), action.recipient_key_type)],
            Self::Auction(action) => [
                (&action.to_validator, action.to_validator_key_type),
                (&action.from_validator, action.from_validator_key_type),
            ]
            .into_iter()
            .filter_map(|(key, key_type)| key.clone().map(|key| (key, key_type)))
            .collect(),
            Self::CasperMarket(action) => vec![(action.offerer_hash.clone(), action.offerer_hash_type)],
            Self::Unknown(UnknownContractAction { args, .. })
            | Self::Wasm(WasmAction { args, .. })
            | Self::WasmProxy(WasmProxyAction { args, .. }) => args.account_links(),
            Self::AssociatedKeys(_) => Vec::new(),
        }
    }
}

/// Splits a resolved identity into the (key, key type, info) triple the
/// action structs store.
pub(crate) fn identity_parts(identity: ResolvedIdentity) -> (String, AccountKeyType, Option<AccountInfo>) {
    (identity.key, identity.key_type, identity.account_info)
}
