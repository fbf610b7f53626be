//! Signature request interpretation.
//!
//! Turns a parsed [`Transaction`] plus whatever enrichment could be fetched
//! for it into a [`SignatureRequest`]: a self-contained, serializable view a
//! wallet renders before the user approves a signature.
//!
//! # Module Organization
//!
//! - [`args`] - Typed argument decoding for display
//! - [`action`] - The action union and its variants
//! - [`builders`] - One builder per transaction intent
//! - [`classifier`] - Builder selection and the enrichment it reads
//! - [`prepare`] - Asynchronous end-to-end preparation from raw JSON

use std::collections::BTreeSet;

use serde::Serialize;

use crate::domain::account::{AccountInfo, AccountInfoMap, RpcAccountInfo};
use crate::domain::amount::{self, CSPR_DECIMALS};
use crate::domain::error::SignatureRequestError;
use crate::domain::keys::{AccountKeyType, derive_key_type, hash_by_type};
use crate::domain::transaction::{EntryPoint, Transaction};

pub mod action;
pub mod args;
pub mod builders;
pub mod classifier;
pub mod prepare;

pub use action::{
    Action, AssociatedKeysAction, AuctionAction, CasperMarketAction, Cep18Action, ContractInfo,
    NativeCsprAction, NftAction, NftTokens, TokenAmount, UnknownContractAction, WasmAction,
    WasmProxyAction,
};
pub use args::{DecodedArgs, SignatureRequestArg, decode_arguments};
pub use classifier::{Enrichment, classify_action};
pub use prepare::SignatureRequestPreparer;

/// Shown instead of a payment amount when the pricing mode carries none.
pub const PAYMENT_NOT_AVAILABLE: &str = "N/A";

// ============================================================================
// Signature Request
// ============================================================================

/// A signature already present on the transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignaturesCollectedInfo {
    pub public_key: String,
    /// Weight as an associated key of the sender; `None` when the signer is
    /// not (yet) one.
    pub weight: Option<u8>,
    pub account_info: Option<AccountInfo>,
}

/// Everything a wallet shows before signing a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureRequest {
    pub tx_hash: String,
    pub chain_name: String,
    /// ISO-8601 expiry with milliseconds.
    pub expires: String,
    /// Pretty-printed source JSON.
    pub raw_json: String,

    pub signing_key: String,
    pub signing_key_type: AccountKeyType,
    pub signing_account_info: Option<AccountInfo>,

    pub sender_key: String,
    pub sender_key_type: AccountKeyType,
    pub sender_account_info: Option<AccountInfo>,

    /// Motes, or `"N/A"` when the transaction does not cap its payment.
    pub payment_amount: String,
    pub formatted_payment_amount: String,
    pub fiat_payment_amount: String,

    /// Transfer id, for native transfers only.
    pub memo: Option<String>,
    pub signatures_collected: Vec<SignaturesCollectedInfo>,

    pub action: Action,
}

/// Assembles the signature request for a transaction.
///
/// # Arguments
///
/// * `tx` - The transaction awaiting signature
/// * `signing_key` - Hex key of the account asked to sign
/// * `enrichment` - Data fetched about the transaction; may be empty
///
/// # Errors
///
/// Returns `SignatureRequestError::InvalidSignatureRequest` for a native
/// transfer with a missing or mistyped recipient or amount.
pub fn build_signature_request(
    tx: &Transaction,
    signing_key: &str,
    enrichment: &Enrichment,
) -> Result<SignatureRequest, SignatureRequestError> {
    let accounts = &enrichment.accounts;

    let signing = accounts.resolve_identity(signing_key, derive_key_type(signing_key));
    let sender_key = tx.initiator.key();
    let sender = accounts.resolve_identity(sender_key, derive_key_type(sender_key));

    let payment_amount = tx
        .limited_payment_amount()
        .filter(|amount| !amount.is_empty())
        .unwrap_or(PAYMENT_NOT_AVAILABLE)
        .to_string();

    let action = classify_action(tx, enrichment, signing_key)?;

    Ok(SignatureRequest {
        tx_hash: tx.hash.clone(),
        chain_name: tx.chain_name.clone(),
        expires: tx.expires(),
        raw_json: tx.raw_json_pretty(),
        signing_key: signing.key,
        signing_key_type: signing.key_type,
        signing_account_info: signing.account_info,
        sender_key: sender.key,
        sender_key_type: sender.key_type,
        sender_account_info: sender.account_info,
        formatted_payment_amount: amount::formatted_amount(&payment_amount, CSPR_DECIMALS),
        fiat_payment_amount: amount::fiat_amount(&payment_amount, &enrichment.cspr_fiat_rate),
        payment_amount,
        memo: memo(tx),
        signatures_collected: signatures_collected(tx, accounts, enrichment.rpc_account_info.as_ref()),
        action,
    })
}

/// Account hashes a request references, for the enrichment pass.
///
/// Covers the signer, the sender, every collected signature and whatever
/// the action surfaces. Keys that cannot be normalised (contract hashes,
/// purses, empty keys) are skipped.
#[must_use]
pub fn collect_referenced_hashes(request: &SignatureRequest) -> BTreeSet<String> {
    let mut keys = vec![
        (request.signing_key.clone(), request.signing_key_type),
        (request.sender_key.clone(), request.sender_key_type),
    ];
    keys.extend(
        request
            .signatures_collected
            .iter()
            .map(|signature| (signature.public_key.clone(), AccountKeyType::PublicKey)),
    );
    keys.extend(request.action.referenced_keys());

    keys.iter()
        .filter_map(|(key, key_type)| hash_by_type(key, *key_type))
        .collect()
}

fn memo(tx: &Transaction) -> Option<String> {
    match tx.entry_point {
        EntryPoint::Transfer => builders::arg_text(&tx.args, "id"),
        _ => None,
    }
}

fn signatures_collected(
    tx: &Transaction,
    accounts: &AccountInfoMap,
    rpc_account_info: Option<&RpcAccountInfo>,
) -> Vec<SignaturesCollectedInfo> {
    tx.approvals
        .iter()
        .map(|approval| {
            let account_hash = hash_by_type(&approval.signer, AccountKeyType::PublicKey);
            SignaturesCollectedInfo {
                public_key: approval.signer.clone(),
                weight: account_hash
                    .as_deref()
                    .and_then(|hash| rpc_account_info?.weight_of(hash)),
                account_info: accounts
                    .resolve(&approval.signer, AccountKeyType::PublicKey)
                    .cloned(),
            }
        })
        .collect()
}
