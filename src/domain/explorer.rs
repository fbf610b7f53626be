//! Block explorer links.
//!
//! Every builder takes the chain name a transaction carries (or a network
//! name) and returns `None` when no known network matches it.

use super::network::CasperNetwork;

fn explorer_base(chain_name: &str) -> Option<&'static str> {
    CasperNetwork::from_chain_name(chain_name).map(|network| network.explorer_url())
}

/// Link to an account, or to a purse when the key is a URef.
#[must_use]
pub fn account_url(chain_name: &str, account_key: &str) -> Option<String> {
    let base = explorer_base(chain_name)?;
    if account_key.is_empty() {
        return None;
    }
    let path = if account_key.contains("uref") { "uref" } else { "account" };
    Some(format!("{base}/{path}/{account_key}"))
}

/// Link to a contract package, falling back to the contract itself.
#[must_use]
pub fn contract_package_url(
    chain_name: &str,
    contract_package_hash: Option<&str>,
    contract_hash: Option<&str>,
) -> Option<String> {
    let base = explorer_base(chain_name)?;
    match (
        contract_package_hash.filter(|hash| !hash.is_empty()),
        contract_hash.filter(|hash| !hash.is_empty()),
    ) {
        (Some(package), _) => Some(format!("{base}/contract-package/{package}")),
        (None, Some(contract)) => Some(format!("{base}/contract/{contract}")),
        (None, None) => None,
    }
}

/// Explorer search link for an arbitrary hash.
#[must_use]
pub fn hash_url(chain_name: &str, hash: &str) -> Option<String> {
    let base = explorer_base(chain_name)?;
    Some(format!("{base}/search/{hash}"))
}

/// Link to a single NFT inside a collection.
#[must_use]
pub fn nft_token_url(chain_name: &str, collection_hash: &str, token_id: &str) -> Option<String> {
    let base = explorer_base(chain_name)?;
    if collection_hash.is_empty() || token_id.is_empty() {
        return None;
    }
    Some(format!("{base}/contracts/{collection_hash}/nfts/{token_id}"))
}
