//! Collaborator seams the preparer fetches enrichment through.
//!
//! Every method is best-effort from the preparer's point of view: an `Err`
//! is logged and replaced with the documented default, never propagated.

use async_trait::async_trait;

use crate::domain::account::{AccountInfoMap, RpcAccountInfo};
use crate::domain::contract_package::ContractPackageInfo;
use crate::domain::{CasperNetwork, ClientError};

/// CSPR to fiat exchange rate.
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Current rate as decimal text.
    async fn cspr_fiat_rate(&self, network: CasperNetwork) -> Result<String, ClientError>;
}

/// Batched account display metadata.
#[async_trait]
pub trait AccountInfoSource: Send + Sync {
    /// Info for the given bare account hashes. Unknown hashes are simply
    /// absent from the result.
    async fn accounts_info(
        &self,
        network: CasperNetwork,
        account_hashes: &[String],
    ) -> Result<AccountInfoMap, ClientError>;
}

/// Contract package metadata by package hash.
#[async_trait]
pub trait ContractPackageSource: Send + Sync {
    async fn contract_package(
        &self,
        network: CasperNetwork,
        package_hash: &str,
    ) -> Result<Option<ContractPackageInfo>, ClientError>;
}

/// Membership check for WASM proxy modules, keyed by hex module hash.
#[async_trait]
pub trait WasmProxyRegistry: Send + Sync {
    async fn is_wasm_proxy(&self, wasm_hash: &str) -> Result<bool, ClientError>;
}

/// On-chain reads through a node.
#[async_trait]
pub trait OnChainAccountSource: Send + Sync {
    /// The account record of a public key or account hash.
    async fn account_info(
        &self,
        network: CasperNetwork,
        account_identifier: &str,
    ) -> Result<RpcAccountInfo, ClientError>;

    /// Package hash of a stored contract, recovered from global state.
    async fn contract_package_hash(
        &self,
        network: CasperNetwork,
        contract_hash: &str,
    ) -> Result<Option<String>, ClientError>;
}
