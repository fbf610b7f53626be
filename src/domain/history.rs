//! Deploy history of an account: executed deploys, native CSPR transfers and
//! CEP-18 token movements.
//!
//! Records are normalised from wallet API listings with raw keys. The keys
//! are upgraded to display identities afterwards through
//! [`AccountReferences::resolve_accounts`], once the account metadata they
//! reference has been fetched in one batch.

use serde::Serialize;
use serde_json::Value;

use super::account::{AccountInfo, AccountInfoMap};
use super::amount::{
    CSPR_DECIMALS, CSPR_SYMBOL, decimal_amount, fiat_amount, formatted_amount, number_text,
    token_fiat_amount,
};
use super::contract_package::ContractTypeId;
use super::keys::{AccountKeyType, account_hash_from_public_key, hash_by_type, strip_prefix};
use super::network::{CasperNetwork, KnownContract};
use super::token::market_price;

/// Execution type the API assigns to native transfers.
const NATIVE_TRANSFER_EXECUTION_TYPE: u64 = 6;

// ============================================================================
// Account References
// ============================================================================

/// A record whose keys can be resolved against account metadata.
pub trait AccountReferences {
    /// Account hashes worth looking up for this record.
    fn account_hashes(&self) -> Vec<String>;

    /// Replaces raw keys with resolved identities where the map knows them.
    fn resolve_accounts(&mut self, accounts: &AccountInfoMap);
}

/// A key as shown in history, with whatever the wallet API knows about it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Party {
    pub key: String,
    pub key_type: AccountKeyType,
    pub account_info: Option<AccountInfo>,
}

impl Party {
    fn new(key: impl Into<String>, key_type: AccountKeyType) -> Self {
        Self {
            key: key.into(),
            key_type,
            account_info: None,
        }
    }

    fn account_hash(&self) -> Option<String> {
        hash_by_type(&self.key, self.key_type)
    }

    fn resolve(&mut self, accounts: &AccountInfoMap) {
        let identity = accounts.resolve_identity(&self.key, self.key_type);
        self.key = identity.key;
        self.key_type = identity.key_type;
        self.account_info = identity.account_info;
    }

    fn is(&self, public_key: &str, account_hash: Option<&str>) -> bool {
        match self.key_type {
            AccountKeyType::PublicKey => self.key.eq_ignore_ascii_case(public_key),
            AccountKeyType::AccountHash => {
                account_hash.is_some_and(|hash| strip_prefix(&self.key).eq_ignore_ascii_case(hash))
            }
            AccountKeyType::ContractHash | AccountKeyType::Purse => false,
        }
    }
}

fn party_hashes<'a>(parties: impl IntoIterator<Item = &'a Party>) -> Vec<String> {
    let mut hashes: Vec<String> = parties.into_iter().filter_map(Party::account_hash).collect();
    hashes.sort();
    hashes.dedup();
    hashes
}

fn str_field(json: &Value, field: &str) -> Option<String> {
    json[field].as_str().filter(|text| !text.is_empty()).map(String::from)
}

// ============================================================================
// Deploys
// ============================================================================

/// What a deploy did, judged by the contract it called.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeployKind {
    CsprNative,
    Cep18,
    Nft,
    Auction,
    CsprMarket,
    AssociatedKeys,
    Unknown,
}

impl DeployKind {
    /// Classifies a deploy by its well-known target contracts first, then by
    /// the declared type of the called package.
    #[must_use]
    pub fn classify(network: CasperNetwork, json: &Value) -> Self {
        let package = &json["contract_package"];
        let contract_hash = json["contract_hash"].as_str().map(strip_prefix).unwrap_or_default();
        let package_hash = package["contract_package_hash"]
            .as_str()
            .map(strip_prefix)
            .unwrap_or_default();
        let package_name = package["name"].as_str().unwrap_or("");
        let is_contract = |known: Option<KnownContract>, hash: &str| {
            known.is_some_and(|contract| !hash.is_empty() && contract.contract_hash.eq_ignore_ascii_case(hash))
        };
        let contract_type = package["latest_version_contract_type_id"]
            .as_u64()
            .filter(|id| *id != 0)
            .or_else(|| package["contract_type_id"].as_u64())
            .and_then(ContractTypeId::from_id);

        if package_name == "Auction" || is_contract(network.auction_manager(), &contract_hash) {
            Self::Auction
        } else if is_contract(network.associated_keys_manager(), &contract_hash) {
            Self::AssociatedKeys
        } else if is_contract(network.cspr_market(), &contract_hash)
            || is_contract(network.cspr_market(), &package_hash)
        {
            Self::CsprMarket
        } else if contract_type.is_some_and(|ty| ty.is_fungible_token()) {
            Self::Cep18
        } else if contract_type.is_some_and(|ty| ty.is_nft()) {
            Self::Nft
        } else if package_name == "Mint"
            || json["execution_type_id"].as_u64() == Some(NATIVE_TRANSFER_EXECUTION_TYPE)
        {
            Self::CsprNative
        } else {
            Self::Unknown
        }
    }
}

/// Outcome of a deploy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeployStatus {
    Success,
    Error,
    Pending,
}

impl DeployStatus {
    fn from_json(json: &Value) -> Self {
        let failed_status = json["status"]
            .as_str()
            .is_some_and(|status| matches!(status, "failed" | "error" | "expired"));
        if json["pending"].as_bool().unwrap_or(false) {
            Self::Pending
        } else if failed_status || str_field(json, "error_message").is_some() {
            Self::Error
        } else {
            Self::Success
        }
    }
}

/// One deploy from the account's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployRecord {
    pub deploy_hash: String,
    pub kind: DeployKind,
    pub status: DeployStatus,
    pub timestamp: String,
    pub caller: Party,
    pub is_caller_active: bool,
    pub contract_hash: Option<String>,
    pub contract_package_hash: Option<String>,
    pub contract_name: Option<String>,
    pub entry_point: Option<String>,
    /// Symbol the amount is denominated in.
    pub symbol: String,
    pub decimals: u32,
    pub amount: String,
    pub decimal_amount: String,
    pub formatted_decimal_amount: String,
    pub fiat_amount: String,
    pub cost: String,
    pub formatted_cost: String,
    pub fiat_cost: String,
    pub payment_amount: String,
    pub formatted_payment_amount: String,
    pub error_message: Option<String>,
}

impl DeployRecord {
    /// Create from one deploy of the `deploys` listing or a single deploy
    /// response. `active_public_key` is the account the history belongs to.
    #[must_use]
    pub fn from_json(network: CasperNetwork, active_public_key: &str, json: &Value) -> Self {
        let package = &json["contract_package"];
        let kind = DeployKind::classify(network, json);
        let rate = number_text(&json["rate"]).unwrap_or_default();
        let amount = number_text(&json["args"]["amount"]["parsed"]).unwrap_or_else(|| "0".to_string());
        let cost = number_text(&json["cost"]).unwrap_or_else(|| "0".to_string());
        let payment_amount = number_text(&json["payment_amount"]).unwrap_or_else(|| "0".to_string());

        let (symbol, decimals, fiat) = if kind == DeployKind::Cep18 {
            let decimals = package["metadata"]["decimals"]
                .as_u64()
                .and_then(|d| u32::try_from(d).ok())
                .unwrap_or(0);
            let fiat = market_price(package)
                .map(|(_, price)| token_fiat_amount(&amount, decimals, &price))
                .unwrap_or_default();
            let symbol = package["metadata"]["symbol"].as_str().unwrap_or("").to_string();
            (symbol, decimals, fiat)
        } else {
            (CSPR_SYMBOL.to_string(), CSPR_DECIMALS, fiat_amount(&amount, &rate))
        };

        let caller_key = json["caller_public_key"].as_str().unwrap_or("");
        Self {
            deploy_hash: json["deploy_hash"].as_str().unwrap_or("").to_string(),
            kind,
            status: DeployStatus::from_json(json),
            timestamp: json["timestamp"].as_str().unwrap_or("").to_string(),
            is_caller_active: caller_key.eq_ignore_ascii_case(active_public_key),
            caller: Party::new(caller_key, AccountKeyType::PublicKey),
            contract_hash: json["contract_hash"].as_str().map(strip_prefix),
            contract_package_hash: json["contract_package_hash"].as_str().map(strip_prefix),
            contract_name: str_field(package, "name"),
            entry_point: json["entry_point"]["name"]
                .as_str()
                .or_else(|| json["contract_entrypoint"]["name"].as_str())
                .map(String::from),
            decimal_amount: decimal_amount(&amount, decimals),
            formatted_decimal_amount: formatted_amount(&amount, decimals),
            fiat_amount: fiat,
            symbol,
            decimals,
            amount,
            formatted_cost: formatted_amount(&cost, CSPR_DECIMALS),
            fiat_cost: fiat_amount(&cost, &rate),
            cost,
            formatted_payment_amount: formatted_amount(&payment_amount, CSPR_DECIMALS),
            payment_amount,
            error_message: str_field(json, "error_message"),
        }
    }
}

impl AccountReferences for DeployRecord {
    fn account_hashes(&self) -> Vec<String> {
        party_hashes([&self.caller])
    }

    fn resolve_accounts(&mut self, accounts: &AccountInfoMap) {
        self.caller.resolve(accounts);
    }
}

// ============================================================================
// Native Transfers
// ============================================================================

/// A native CSPR transfer into or out of the account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRecord {
    pub deploy_hash: String,
    pub transfer_id: Option<String>,
    pub timestamp: String,
    pub caller: Party,
    pub recipient: Party,
    pub is_receive: bool,
    pub amount: String,
    pub decimal_amount: String,
    pub formatted_decimal_amount: String,
    pub fiat_amount: String,
}

impl TransferRecord {
    /// Create from one entry of the `transfers` listing.
    ///
    /// The caller is the initiating account, unless it transferred to itself,
    /// in which case the source purse is shown instead.
    #[must_use]
    pub fn from_json(active_public_key: &str, json: &Value) -> Self {
        let pick = |candidates: &[(&str, AccountKeyType)]| {
            candidates
                .iter()
                .find_map(|(field, key_type)| str_field(json, field).map(|key| Party::new(key, *key_type)))
                .unwrap_or_else(|| Party::new("", AccountKeyType::Purse))
        };

        let same = |a: &str, b: &str| match (str_field(json, a), str_field(json, b)) {
            (Some(a), Some(b)) => strip_prefix(&a).eq_ignore_ascii_case(&strip_prefix(&b)),
            _ => false,
        };
        let self_transfer = same("initiator_account_hash", "to_account_hash")
            || same("initiator_public_key", "to_public_key");

        let caller = if self_transfer {
            pick(&[
                ("from_purse", AccountKeyType::Purse),
                ("from_purse_public_key", AccountKeyType::PublicKey),
            ])
        } else {
            pick(&[
                ("initiator_public_key", AccountKeyType::PublicKey),
                ("from_purse_public_key", AccountKeyType::PublicKey),
                ("initiator_account_hash", AccountKeyType::AccountHash),
                ("from_purse", AccountKeyType::Purse),
            ])
        };
        let recipient = pick(&[
            ("to_public_key", AccountKeyType::PublicKey),
            ("to_purse_public_key", AccountKeyType::PublicKey),
            ("to_account_hash", AccountKeyType::AccountHash),
            ("to_purse", AccountKeyType::Purse),
        ]);

        let amount = number_text(&json["amount"]).unwrap_or_else(|| "0".to_string());
        let rate = number_text(&json["rate"]).unwrap_or_default();
        let active_hash = account_hash_from_public_key(active_public_key).ok();
        Self {
            deploy_hash: json["deploy_hash"].as_str().unwrap_or("").to_string(),
            transfer_id: number_text(&json["id"]),
            timestamp: json["timestamp"].as_str().unwrap_or("").to_string(),
            is_receive: recipient.is(active_public_key, active_hash.as_deref()),
            caller,
            recipient,
            decimal_amount: decimal_amount(&amount, CSPR_DECIMALS),
            formatted_decimal_amount: formatted_amount(&amount, CSPR_DECIMALS),
            fiat_amount: fiat_amount(&amount, &rate),
            amount,
        }
    }
}

impl AccountReferences for TransferRecord {
    fn account_hashes(&self) -> Vec<String> {
        party_hashes([&self.caller, &self.recipient])
    }

    fn resolve_accounts(&mut self, accounts: &AccountInfoMap) {
        self.caller.resolve(accounts);
        self.recipient.resolve(accounts);
    }
}

// ============================================================================
// CEP-18 Token Actions
// ============================================================================

/// A CEP-18 token movement touching the account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenActionRecord {
    pub deploy_hash: String,
    pub contract_package_hash: String,
    pub token_name: String,
    pub symbol: String,
    pub decimals: u32,
    pub icon_url: Option<String>,
    pub action_type_id: Option<u64>,
    pub timestamp: String,
    /// Absent for mints.
    pub from: Option<Party>,
    /// Absent for burns.
    pub to: Option<Party>,
    pub is_receive: bool,
    pub amount: String,
    pub decimal_amount: String,
    pub formatted_decimal_amount: String,
    pub fiat_amount: String,
}

/// `from_type`/`to_type` value marking an account hash; anything else is a
/// contract.
const ACCOUNT_TRANSACTOR: u64 = 0;

fn transactor(json: &Value, side: &str) -> Option<Party> {
    if let Some(public_key) = str_field(json, &format!("{side}_public_key")) {
        return Some(Party::new(public_key, AccountKeyType::PublicKey));
    }
    let hash = str_field(json, &format!("{side}_hash"))?;
    let key_type = match &json[format!("{side}_type")] {
        Value::Number(ty) if ty.as_u64() != Some(ACCOUNT_TRANSACTOR) => AccountKeyType::ContractHash,
        _ => AccountKeyType::AccountHash,
    };
    Some(Party::new(hash, key_type))
}

impl TokenActionRecord {
    /// Create from one entry of the `ft-token-actions` listing.
    #[must_use]
    pub fn from_json(active_public_key: &str, json: &Value) -> Self {
        let package = &json["contract_package"];
        let decimals = package["metadata"]["decimals"]
            .as_u64()
            .and_then(|d| u32::try_from(d).ok())
            .unwrap_or(0);
        let amount = number_text(&json["amount"]).unwrap_or_else(|| "0".to_string());
        let fiat = market_price(package)
            .map(|(_, price)| token_fiat_amount(&amount, decimals, &price))
            .unwrap_or_default();
        let to = transactor(json, "to");
        let active_hash = account_hash_from_public_key(active_public_key).ok();

        Self {
            deploy_hash: json["deploy_hash"].as_str().unwrap_or("").to_string(),
            contract_package_hash: strip_prefix(json["contract_package_hash"].as_str().unwrap_or("")),
            token_name: package["name"].as_str().unwrap_or("").to_string(),
            symbol: package["metadata"]["symbol"].as_str().unwrap_or("").to_string(),
            decimals,
            icon_url: package["icon_url"].as_str().map(String::from),
            action_type_id: json["ft_action_type_id"].as_u64(),
            timestamp: json["timestamp"].as_str().unwrap_or("").to_string(),
            from: transactor(json, "from"),
            is_receive: to
                .as_ref()
                .is_some_and(|to| to.is(active_public_key, active_hash.as_deref())),
            to,
            decimal_amount: decimal_amount(&amount, decimals),
            formatted_decimal_amount: formatted_amount(&amount, decimals),
            fiat_amount: fiat,
            amount,
        }
    }
}

impl AccountReferences for TokenActionRecord {
    fn account_hashes(&self) -> Vec<String> {
        party_hashes(self.from.iter().chain(self.to.iter()))
    }

    fn resolve_accounts(&mut self, accounts: &AccountInfoMap) {
        for party in self.from.iter_mut().chain(self.to.iter_mut()) {
            party.resolve(accounts);
        }
    }
}
