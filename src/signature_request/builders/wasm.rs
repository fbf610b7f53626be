//! Session code: plain WASM and calls routed through a WASM proxy.

use super::BuildContext;
use crate::domain::cl_value::{CLValue, Key, RuntimeArgs};
use crate::domain::explorer;
use crate::domain::keys::{blake2b_256, strip_prefix};
use crate::domain::transaction::Transaction;
use crate::signature_request::action::{Action, ContractInfo, WasmAction, WasmProxyAction};
use crate::signature_request::args::decode_arguments;

/// Proxy arguments that route the wrapped call rather than describe it.
const PROXY_PLUMBING_ARGS: [&str; 4] = [
    "contract_package_hash",
    "entry_point",
    "package_hash",
    "attached_value",
];

/// Hex blake2b-256 of the session module, or of nothing for stored targets.
#[must_use]
pub fn wasm_hash(tx: &Transaction) -> String {
    hex::encode(blake2b_256(tx.module_bytes().unwrap_or_default()))
}

/// Bare package hash the proxy forwards to, from `contract_package_hash`
/// or `package_hash`.
#[must_use]
pub fn wasm_proxy_package_hash(args: &RuntimeArgs) -> Option<String> {
    let value = args
        .get("contract_package_hash")
        .or_else(|| args.get("package_hash"))?
        .unwrap_option()?;
    let hash = match value {
        CLValue::Key(Key::Hash(addr)) => hex::encode(addr),
        CLValue::ByteArray(bytes) => hex::encode(bytes),
        CLValue::String(text) => strip_prefix(text),
        other => strip_prefix(&other.to_string()),
    };
    Some(hash).filter(|hash| !hash.is_empty())
}

/// True when a session call is a registered proxy carrying both a target
/// package and an entry point.
#[must_use]
pub fn is_wasm_proxy_call(tx: &Transaction, is_registered_proxy: bool) -> bool {
    is_registered_proxy
        && tx.module_bytes().is_some()
        && wasm_proxy_package_hash(&tx.args).is_some()
        && tx.args.contains("entry_point")
}

/// Plain session code; every argument is decoded.
#[must_use]
pub fn build(ctx: &BuildContext<'_>) -> Action {
    Action::Wasm(WasmAction {
        wasm_hash: wasm_hash(ctx.tx),
        args: decode_arguments(ctx.args(), ctx.accounts(), ctx.chain_name()),
    })
}

/// A call routed through a WASM proxy.
///
/// Shows the wrapped call: its package, entry point and arguments. Returns
/// `None` when the proxy arguments do not name a package and entry point.
#[must_use]
pub fn build_proxy(ctx: &BuildContext<'_>) -> Option<Action> {
    let args = ctx.args();
    let package_hash = wasm_proxy_package_hash(args)?;
    let entry_point = args.get("entry_point")?.unwrap_option()?.to_string();

    let embedded = args.get("args").and_then(CLValue::as_byte_list);
    let mut excluded: Vec<&str> = PROXY_PLUMBING_ARGS.to_vec();
    if embedded.is_some() {
        excluded.push("args");
    }

    let embedded_args = embedded.and_then(|bytes| match RuntimeArgs::from_bytes(&bytes) {
        Ok(embedded_args) => Some(embedded_args),
        Err(err) => {
            tracing::debug!(error = %err, "Failed to decode arguments embedded in proxy call");
            None
        }
    });

    let mut decoded = decode_arguments(&args.without(&excluded), ctx.accounts(), ctx.chain_name());
    if let Some(embedded_args) = embedded_args.filter(|embedded_args| !embedded_args.is_empty()) {
        decoded.merge(decode_arguments(&embedded_args, ctx.accounts(), ctx.chain_name()));
    }

    let package = ctx.contract_package();
    Some(Action::WasmProxy(WasmProxyAction {
        entry_point,
        wasm_hash: wasm_hash(ctx.tx),
        icon_url: ctx.icon_url(),
        args: decoded,
        contract: ContractInfo {
            contract_link: explorer::contract_package_url(ctx.chain_name(), Some(&package_hash), None),
            contract_package_hash: Some(package_hash),
            contract_hash: None,
            contract_name: package.map(|package| package.name.clone()).unwrap_or_default(),
        },
    }))
}
