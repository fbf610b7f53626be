//! Picks the action builder for a transaction.

use super::action::Action;
use super::builders::{BuildContext, auction, contract, native, tokens, wasm};
use crate::domain::account::{AccountInfoMap, RpcAccountInfo};
use crate::domain::contract_package::ContractPackageInfo;
use crate::domain::error::SignatureRequestError;
use crate::domain::network::CasperNetwork;
use crate::domain::transaction::{EntryPoint, Transaction};

/// Everything fetched about a transaction before it is interpreted.
///
/// Every field has a neutral default, so an empty enrichment yields a
/// request that shows raw hashes and no fiat values.
#[derive(Debug, Clone, Default)]
pub struct Enrichment {
    /// Network resolved from the chain name; `None` disables known-contract
    /// matching.
    pub network: Option<CasperNetwork>,
    /// Fiat price of one CSPR; empty or zero when unknown.
    pub cspr_fiat_rate: String,
    pub accounts: AccountInfoMap,
    /// Package of the called contract.
    pub contract_package: Option<ContractPackageInfo>,
    /// Package of the NFT collection an action names.
    pub collection_package: Option<ContractPackageInfo>,
    /// Sender's on-chain record, for signature weights.
    pub rpc_account_info: Option<RpcAccountInfo>,
    /// True when the session module is a registered WASM proxy.
    pub is_wasm_proxy: bool,
}

/// Classifies a transaction and builds its action.
///
/// # Errors
///
/// Only a malformed native transfer fails; every other intent degrades to a
/// less specific action instead.
pub fn classify_action(
    tx: &Transaction,
    enrichment: &Enrichment,
    signing_key: &str,
) -> Result<Action, SignatureRequestError> {
    let ctx = BuildContext::new(tx, enrichment, signing_key);

    match &tx.entry_point {
        EntryPoint::Transfer => native::build(&ctx),
        EntryPoint::Auction(_) => Ok(auction::build(&ctx)),
        EntryPoint::Call => {
            if wasm::is_wasm_proxy_call(tx, enrichment.is_wasm_proxy) {
                Ok(wasm::build_proxy(&ctx).unwrap_or_else(|| wasm::build(&ctx)))
            } else {
                Ok(wasm::build(&ctx))
            }
        }
        EntryPoint::Custom(_) => Ok(classify_custom(&ctx)),
        EntryPoint::Other(_) => Ok(contract::build_unknown(&ctx)),
    }
}

fn classify_custom(ctx: &BuildContext<'_>) -> Action {
    let network = ctx.enrichment.network;
    let tx = ctx.tx;

    if tx.is_call_to(network.and_then(|n| n.auction_manager())) {
        return auction::build(ctx);
    }
    if tx.is_call_to(network.and_then(|n| n.associated_keys_manager())) {
        return contract::build_associated_keys(ctx);
    }
    if tx.is_call_to(network.and_then(|n| n.cspr_market())) {
        return tokens::build_market(ctx);
    }

    match ctx.contract_package().and_then(|package| package.contract_type) {
        Some(kind) if kind.is_fungible_token() => tokens::build_cep18(ctx),
        Some(kind) if kind.is_nft() => tokens::build_nft(ctx),
        _ => contract::build_unknown(ctx),
    }
}
