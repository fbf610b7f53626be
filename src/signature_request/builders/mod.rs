//! Per-intent action builders and the helpers they share.
//!
//! Each builder reads one [`Transaction`] plus the enrichment gathered for
//! it and produces one [`Action`](super::Action) variant. Builders are pure;
//! only the native transfer builder can fail.
//!
//! # Module Organization
//!
//! - [`native`] - Native CSPR transfers
//! - [`auction`] - Staking operations
//! - [`tokens`] - CEP-18 fungible tokens, NFTs and CSPR.market calls
//! - [`contract`] - Associated keys and unknown contract calls
//! - [`wasm`] - Session code, plain or behind a WASM proxy

use crate::domain::account::{AccountInfoMap, ResolvedIdentity};
use crate::domain::cl_value::{CLValue, Key, RuntimeArgs};
use crate::domain::contract_package::ContractPackageInfo;
use crate::domain::explorer;
use crate::domain::keys::AccountKeyType;
use crate::domain::transaction::{StoredTargetId, Transaction};

use super::action::ContractInfo;
use super::classifier::Enrichment;

pub mod auction;
pub mod contract;
pub mod native;
pub mod tokens;
pub mod wasm;

// ============================================================================
// Build Context
// ============================================================================

/// Everything a builder reads.
#[derive(Debug, Clone, Copy)]
pub struct BuildContext<'a> {
    pub tx: &'a Transaction,
    pub enrichment: &'a Enrichment,
    /// Hex key of the account asked to sign.
    pub signing_key: &'a str,
}

impl<'a> BuildContext<'a> {
    #[must_use]
    pub const fn new(tx: &'a Transaction, enrichment: &'a Enrichment, signing_key: &'a str) -> Self {
        Self {
            tx,
            enrichment,
            signing_key,
        }
    }

    #[must_use]
    pub fn args(&self) -> &'a RuntimeArgs {
        &self.tx.args
    }

    #[must_use]
    pub fn chain_name(&self) -> &'a str {
        &self.tx.chain_name
    }

    #[must_use]
    pub fn accounts(&self) -> &'a AccountInfoMap {
        &self.enrichment.accounts
    }

    #[must_use]
    pub fn fiat_rate(&self) -> &'a str {
        &self.enrichment.cspr_fiat_rate
    }

    #[must_use]
    pub fn contract_package(&self) -> Option<&'a ContractPackageInfo> {
        self.enrichment.contract_package.as_ref()
    }

    /// Name of the custom entry point, or empty.
    #[must_use]
    pub fn custom_entry_point(&self) -> String {
        self.tx.entry_point.custom_name().unwrap_or_default().to_string()
    }

    /// Icon of the called contract package.
    #[must_use]
    pub fn icon_url(&self) -> Option<String> {
        self.contract_package().and_then(|package| package.icon_url.clone())
    }

    /// Resolves a key against the account cache, applying the upgrade rule.
    #[must_use]
    pub fn resolve(&self, key: &str, key_type: AccountKeyType) -> ResolvedIdentity {
        self.accounts().resolve_identity(key, key_type)
    }

    /// Contract identity: package metadata first, then the stored target.
    #[must_use]
    pub fn contract_info(&self) -> ContractInfo {
        let stored = self.tx.stored_target();
        let package = self.contract_package();

        let target_package_hash = stored.and_then(StoredTargetId::package_hash);
        let contract_hash = stored.and_then(StoredTargetId::contract_hash).map(String::from);
        let contract_package_hash = package
            .map(|package| package.contract_package_hash.as_str())
            .filter(|hash| !hash.is_empty())
            .or(target_package_hash)
            .map(String::from);

        let contract_name = package
            .map(|package| package.name.as_str())
            .or_else(|| stored.and_then(StoredTargetId::package_name))
            .or_else(|| stored.and_then(StoredTargetId::contract_name))
            .unwrap_or_default()
            .to_string();

        ContractInfo {
            contract_link: explorer::contract_package_url(
                self.chain_name(),
                contract_package_hash.as_deref(),
                contract_hash.as_deref(),
            ),
            contract_package_hash,
            contract_hash,
            contract_name,
        }
    }
}

// ============================================================================
// Argument Helpers
// ============================================================================

/// Display text of an argument, looking through `Some`; `None` when absent,
/// undecodable, `None`-valued or empty.
#[must_use]
pub fn arg_text(args: &RuntimeArgs, name: &str) -> Option<String> {
    args.get(name)
        .and_then(CLValue::unwrap_option)
        .map(ToString::to_string)
        .filter(|text| !text.is_empty())
}

/// Integer text of the `amount` argument, or `"0"`.
#[must_use]
pub fn amount_arg(args: &RuntimeArgs) -> String {
    args.get("amount")
        .and_then(CLValue::unwrap_option)
        .and_then(CLValue::integer_string)
        .unwrap_or_else(|| "0".to_string())
}

/// Account or contract referenced by a `Key` argument.
///
/// Only account and hash keys qualify; every other value yields `None`.
#[must_use]
pub fn account_key_data(value: Option<&CLValue>) -> Option<(String, AccountKeyType)> {
    match value? {
        CLValue::Key(Key::Account(account_hash)) => {
            Some((account_hash.to_hex(), AccountKeyType::AccountHash))
        }
        CLValue::Key(Key::Hash(addr)) => Some((hex::encode(addr), AccountKeyType::ContractHash)),
        _ => None,
    }
}

/// The first `Key` argument among `names` that references an account or
/// contract, or an empty account hash.
#[must_use]
pub fn first_account_key(args: &RuntimeArgs, names: &[&str]) -> (String, AccountKeyType) {
    names
        .iter()
        .find_map(|name| account_key_data(args.get(name)))
        .unwrap_or((String::new(), AccountKeyType::AccountHash))
}

/// True when the entry point is one of `names`, compared case-insensitively.
#[must_use]
pub fn entry_point_is(entry_point: &str, names: &[&str]) -> bool {
    names.iter().any(|name| entry_point.eq_ignore_ascii_case(name))
}
