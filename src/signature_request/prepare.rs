//! Asynchronous end-to-end preparation of a signature request.
//!
//! Parses the transaction, gathers enrichment from the collaborators and
//! builds the request twice: once blind, to learn which accounts and
//! collection it references, and once with everything resolved.
//!
//! Only parsing and malformed native transfers are fatal. Every collaborator
//! failure is logged and replaced with its neutral default.

use std::future::Future;
use std::sync::Arc;

use super::action::Action;
use super::builders::wasm;
use super::classifier::Enrichment;
use super::{SignatureRequest, build_signature_request, collect_referenced_hashes};
use crate::client::{
    AccountInfoCache, AccountInfoSource, ContractPackageSource, KnownWasmProxies, NodeRpcClient,
    OnChainAccountSource, RateSource, WalletApiClient, WasmProxyRegistry,
};
use crate::config::ClientConfig;
use crate::domain::account::{AccountInfoMap, RpcAccountInfo};
use crate::domain::contract_package::ContractPackageInfo;
use crate::domain::transaction::{EntryPoint, Transaction};
use crate::domain::{CasperNetwork, ClientError, SignatureRequestError};

// ============================================================================
// Preparer
// ============================================================================

/// Turns raw transaction JSON into a fully enriched [`SignatureRequest`].
#[derive(Clone)]
pub struct SignatureRequestPreparer {
    rates: Arc<dyn RateSource>,
    accounts: Arc<dyn AccountInfoSource>,
    contract_packages: Arc<dyn ContractPackageSource>,
    proxies: Arc<dyn WasmProxyRegistry>,
    node: Arc<dyn OnChainAccountSource>,
}

impl SignatureRequestPreparer {
    #[must_use]
    pub fn new(
        rates: Arc<dyn RateSource>,
        accounts: Arc<dyn AccountInfoSource>,
        contract_packages: Arc<dyn ContractPackageSource>,
        proxies: Arc<dyn WasmProxyRegistry>,
        node: Arc<dyn OnChainAccountSource>,
    ) -> Self {
        Self {
            rates,
            accounts,
            contract_packages,
            proxies,
            node,
        }
    }

    /// Wires the wallet API and node clients described by `config`.
    ///
    /// Account lookups go through an [`AccountInfoCache`]; the static proxy
    /// list falls back to the remote registry when enabled.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Network` if an HTTP client fails to initialise.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        let api = Arc::new(WalletApiClient::new(config.clone())?);
        let node = Arc::new(NodeRpcClient::new(config.clone())?);

        let mut proxies = KnownWasmProxies::new(&config.known_wasm_proxies);
        if config.use_remote_proxy_registry {
            proxies = proxies.with_fallback(api.clone());
        }

        Ok(Self::new(
            api.clone(),
            Arc::new(AccountInfoCache::with_capacity(api.clone(), config.account_cache_size)),
            api,
            Arc::new(proxies),
            node,
        ))
    }

    /// Prepares the signature request for a transaction.
    ///
    /// # Arguments
    ///
    /// * `transaction_json` - V1 transaction or legacy deploy JSON
    /// * `signing_key` - Hex public key or account hash asked to sign
    ///
    /// # Errors
    ///
    /// Returns `SignatureRequestError::InvalidTransactionJson` when the JSON
    /// is not a transaction, and `SignatureRequestError::InvalidSignatureRequest`
    /// for a malformed native transfer.
    pub async fn prepare(
        &self,
        transaction_json: &str,
        signing_key: &str,
    ) -> Result<SignatureRequest, SignatureRequestError> {
        let tx = Transaction::from_json_str(transaction_json)?;

        let Some(network) = CasperNetwork::from_chain_name(&tx.chain_name) else {
            tracing::debug!(chain_name = %tx.chain_name, "Unknown network, preparing without enrichment");
            return build_signature_request(&tx, signing_key, &Enrichment::default());
        };

        let (cspr_fiat_rate, (is_wasm_proxy, contract_package)) = tokio::join!(
            self.fiat_rate(network),
            self.proxy_and_contract_package(network, &tx),
        );

        let mut enrichment = Enrichment {
            network: Some(network),
            cspr_fiat_rate,
            contract_package,
            is_wasm_proxy,
            ..Enrichment::default()
        };

        let blind = build_signature_request(&tx, signing_key, &enrichment)?;
        let account_hashes: Vec<String> = collect_referenced_hashes(&blind).into_iter().collect();

        let (collection_package, accounts, rpc_account_info) = tokio::join!(
            self.collection_package(network, &blind.action),
            self.accounts_info(network, &account_hashes),
            self.sender_account(network, &tx),
        );
        enrichment.collection_package = collection_package;
        enrichment.accounts = accounts;
        enrichment.rpc_account_info = rpc_account_info;

        build_signature_request(&tx, signing_key, &enrichment)
    }

    // ------------------------------------------------------------------------
    // Enrichment steps
    // ------------------------------------------------------------------------

    async fn fiat_rate(&self, network: CasperNetwork) -> String {
        best_effort("fiat rate", self.rates.cspr_fiat_rate(network))
            .await
            .unwrap_or_default()
    }

    async fn proxy_and_contract_package(
        &self,
        network: CasperNetwork,
        tx: &Transaction,
    ) -> (bool, Option<ContractPackageInfo>) {
        let is_wasm_proxy = self.is_wasm_proxy(tx).await;
        let contract_package = self.contract_package(network, tx, is_wasm_proxy).await;
        (is_wasm_proxy, contract_package)
    }

    async fn is_wasm_proxy(&self, tx: &Transaction) -> bool {
        if tx.module_bytes().is_none() {
            return false;
        }
        best_effort("WASM proxy registry", self.proxies.is_wasm_proxy(&wasm::wasm_hash(tx)))
            .await
            .unwrap_or(false)
    }

    async fn contract_package(
        &self,
        network: CasperNetwork,
        tx: &Transaction,
        is_wasm_proxy: bool,
    ) -> Option<ContractPackageInfo> {
        let package_hash = match &tx.entry_point {
            EntryPoint::Custom(_) => self.stored_target_package_hash(network, tx).await?,
            EntryPoint::Call if wasm::is_wasm_proxy_call(tx, is_wasm_proxy) => {
                wasm::wasm_proxy_package_hash(&tx.args)?
            }
            _ => return None,
        };
        self.fetch_contract_package(network, &package_hash).await
    }

    /// Package hash of a stored target, recovering it through the node when
    /// the call names a contract hash.
    async fn stored_target_package_hash(
        &self,
        network: CasperNetwork,
        tx: &Transaction,
    ) -> Option<String> {
        if let Some(package_hash) = tx.target_package_hash() {
            return Some(package_hash);
        }
        let contract_hash = tx.target_contract_hash()?;
        best_effort(
            "contract package hash",
            self.node.contract_package_hash(network, &contract_hash),
        )
        .await
        .flatten()
    }

    async fn collection_package(
        &self,
        network: CasperNetwork,
        action: &Action,
    ) -> Option<ContractPackageInfo> {
        let collection_hash = action.collection_hash()?;
        self.fetch_contract_package(network, collection_hash).await
    }

    async fn fetch_contract_package(
        &self,
        network: CasperNetwork,
        package_hash: &str,
    ) -> Option<ContractPackageInfo> {
        best_effort(
            "contract package",
            self.contract_packages.contract_package(network, package_hash),
        )
        .await
        .flatten()
    }

    async fn accounts_info(&self, network: CasperNetwork, account_hashes: &[String]) -> AccountInfoMap {
        if account_hashes.is_empty() {
            return AccountInfoMap::new();
        }
        best_effort("account info", self.accounts.accounts_info(network, account_hashes))
            .await
            .unwrap_or_default()
    }

    async fn sender_account(&self, network: CasperNetwork, tx: &Transaction) -> Option<RpcAccountInfo> {
        best_effort(
            "sender account record",
            self.node.account_info(network, tx.initiator.key()),
        )
        .await
    }
}

impl std::fmt::Debug for SignatureRequestPreparer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureRequestPreparer").finish_non_exhaustive()
    }
}

/// Awaits a collaborator call, logging and discarding its failure.
async fn best_effort<T>(what: &'static str, call: impl Future<Output = Result<T, ClientError>>) -> Option<T> {
    match call.await {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::debug!(error = %err, "Failed to fetch {what}, using default");
            None
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::AssociatedKey;
    use crate::domain::keys::{AccountKeyType, account_hash_from_public_key, blake2b_256};
    use crate::signature_request::PAYMENT_NOT_AVAILABLE;
    use crate::test_utils::{
        AccountInfoMother, ContractPackageMother, FakeAccounts, FakeContractPackages, FakeNode,
        FakeProxyRegistry, FakeRate, Fakes, RECIPIENT_KEY, SENDER_KEY, TxJsonMother, fakes,
        native_transfer_json,
    };
    use rstest::rstest;
    use serde_json::json;

    const MODULE_HEX: &str = "0061736d";

    #[rstest]
    #[tokio::test]
    async fn test_native_transfer_is_fully_enriched(fakes: Fakes, native_transfer_json: String) {
        let sender_hash = account_hash_from_public_key(SENDER_KEY).unwrap();
        let fakes = Fakes {
            accounts: Arc::new(FakeAccounts::new(vec![
                AccountInfoMother::with_public_key(SENDER_KEY, "Alice"),
                AccountInfoMother::with_public_key(RECIPIENT_KEY, "Bob"),
            ])),
            node: Arc::new(FakeNode::default().with_account(RpcAccountInfo {
                associated_keys: vec![AssociatedKey {
                    account_hash: sender_hash.clone(),
                    weight: 1,
                }],
            })),
            ..fakes
        };

        let request = fakes
            .preparer()
            .prepare(&native_transfer_json, &sender_hash)
            .await
            .unwrap();

        assert_eq!(request.signing_key, SENDER_KEY);
        assert_eq!(request.signing_key_type, AccountKeyType::PublicKey);
        assert_eq!(request.fiat_payment_amount, "0.05");
        assert_eq!(request.signatures_collected[0].weight, Some(1));
        let Action::NativeCspr(action) = &request.action else {
            panic!("Expected native transfer, got {:?}", request.action);
        };
        assert_eq!(action.amount.fiat_amount, "1.25");
        assert_eq!(
            action.recipient_account_info.as_ref().map(|info| info.name.as_str()),
            Some("Bob")
        );

        let requests = fakes.accounts.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].len(), 2);
        assert_eq!(fakes.node.account_requests(), vec![SENDER_KEY.to_string()]);
    }

    #[rstest]
    #[tokio::test]
    async fn test_unknown_network_skips_enrichment(fakes: Fakes) {
        let mut json = TxJsonMother::native_transfer();
        json["payload"]["chain_name"] = json!("private-net");

        let request = fakes
            .preparer()
            .prepare(&json.to_string(), SENDER_KEY)
            .await
            .unwrap();

        assert_eq!(request.chain_name, "private-net");
        assert_eq!(request.fiat_payment_amount, "");
        assert!(fakes.accounts.requests().is_empty());
        assert!(fakes.node.account_requests().is_empty());
    }

    #[tokio::test]
    async fn test_collaborator_failures_degrade() {
        let fakes = Fakes {
            rates: Arc::new(FakeRate(None)),
            accounts: Arc::new(FakeAccounts::failing()),
            packages: Arc::new(FakeContractPackages::failing()),
            proxies: Arc::new(FakeProxyRegistry::failing()),
            node: Arc::new(FakeNode::default()),
        };
        let json = TxJsonMother::custom_call_by_package("transfer", &"cd".repeat(32));

        let request = fakes
            .preparer()
            .prepare(&json.to_string(), SENDER_KEY)
            .await
            .unwrap();

        assert_eq!(request.action.action_type(), "UNKNOWN");
        assert_eq!(request.fiat_payment_amount, "");
        assert_eq!(request.sender_account_info, None);
        assert_eq!(request.signatures_collected[0].weight, None);
        assert_eq!(fakes.packages.requests(), vec!["cd".repeat(32)]);
    }

    #[rstest]
    #[case::not_json("{not json")]
    #[case::not_a_transaction(r#"{"foo": 1}"#)]
    #[tokio::test]
    async fn test_unparseable_json_is_fatal(#[case] input: &str) {
        let err = Fakes::default().preparer().prepare(input, SENDER_KEY).await.unwrap_err();
        assert!(matches!(err, SignatureRequestError::InvalidTransactionJson(_)));
        assert_eq!(err.operation(), "invalidSignatureRequest");
    }

    #[rstest]
    #[tokio::test]
    async fn test_malformed_transfer_is_fatal(fakes: Fakes) {
        let mut json = TxJsonMother::native_transfer();
        json["payload"]["fields"]["args"]["Named"]
            .as_array_mut()
            .unwrap()
            .retain(|arg| arg[0] != "amount");

        let err = fakes
            .preparer()
            .prepare(&json.to_string(), SENDER_KEY)
            .await
            .unwrap_err();
        assert!(matches!(err, SignatureRequestError::InvalidSignatureRequest(_)));
    }

    #[rstest]
    #[tokio::test]
    async fn test_contract_package_by_package_hash(fakes: Fakes) {
        let package_hash = "cd".repeat(32);
        let fakes = Fakes {
            packages: Arc::new(FakeContractPackages::new(vec![ContractPackageMother::cep18(
                &package_hash,
                "Token",
                "TKN",
                9,
            )])),
            ..fakes
        };
        let mut json = TxJsonMother::custom_call_by_package("transfer", &package_hash);
        json["payload"]["fields"]["args"] = json!({"Named": [
            ["recipient", {"cl_type": "Key", "bytes": format!("00{}", "aa".repeat(32)), "parsed": null}],
            ["amount", {"cl_type": "U256", "bytes": "02f401", "parsed": "500"}]
        ]});

        let request = fakes
            .preparer()
            .prepare(&json.to_string(), SENDER_KEY)
            .await
            .unwrap();

        let Action::Cep18(action) = &request.action else {
            panic!("Expected CEP-18 action, got {:?}", request.action);
        };
        assert_eq!(action.amount.symbol, "TKN");
        assert_eq!(action.recipient_key, "aa".repeat(32));
    }

    #[rstest]
    #[tokio::test]
    async fn test_contract_package_recovered_through_node(fakes: Fakes) {
        let contract_hash = "ab".repeat(32);
        let package_hash = "cd".repeat(32);
        let fakes = Fakes {
            packages: Arc::new(FakeContractPackages::new(vec![ContractPackageMother::nft(
                &package_hash,
                "Casper Punks",
            )])),
            node: Arc::new(FakeNode::default().with_contract(&contract_hash, &package_hash)),
            ..fakes
        };
        let mut json = TxJsonMother::custom_call_by_package("approve", &package_hash);
        json["payload"]["fields"]["target"] = json!({"Stored": {"id": {"ByHash": contract_hash}, "runtime": "VmCasperV1"}});

        let request = fakes
            .preparer()
            .prepare(&json.to_string(), SENDER_KEY)
            .await
            .unwrap();

        assert_eq!(request.action.action_type(), "NFT");
        assert_eq!(fakes.packages.requests(), vec![package_hash]);
    }

    #[rstest]
    #[tokio::test]
    async fn test_wasm_proxy_is_detected_through_registry(fakes: Fakes) {
        let module_hash = hex::encode(blake2b_256(&hex::decode(MODULE_HEX).unwrap()));
        let package_hash = "cd".repeat(32);
        let fakes = Fakes {
            proxies: Arc::new(FakeProxyRegistry::new([module_hash])),
            packages: Arc::new(FakeContractPackages::new(vec![ContractPackageMother::cep18(
                &package_hash,
                "Token",
                "TKN",
                9,
            )])),
            ..fakes
        };
        let json = TxJsonMother::session_call(
            MODULE_HEX,
            json!([
                ["contract_package_hash", {"cl_type": {"ByteArray": 32}, "bytes": package_hash, "parsed": null}],
                ["entry_point", {"cl_type": "String", "bytes": "080000007472616e73666572", "parsed": "transfer"}]
            ]),
        );

        let request = fakes
            .preparer()
            .prepare(&json.to_string(), SENDER_KEY)
            .await
            .unwrap();

        let Action::WasmProxy(action) = &request.action else {
            panic!("Expected WASM proxy action, got {:?}", request.action);
        };
        assert_eq!(action.entry_point, "transfer");
        assert_eq!(action.contract.contract_name, "Token");
        assert_eq!(fakes.proxies.lookups(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn test_unregistered_module_is_plain_wasm(fakes: Fakes) {
        let json = TxJsonMother::session_call(MODULE_HEX, json!([]));

        let request = fakes
            .preparer()
            .prepare(&json.to_string(), SENDER_KEY)
            .await
            .unwrap();

        assert_eq!(request.action.action_type(), "WASM");
        assert!(fakes.packages.requests().is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn test_legacy_deploy_without_payment_cap(fakes: Fakes) {
        let mut json = TxJsonMother::deploy_stored_call("delegate", &"ef".repeat(32));
        json["payment"] = json!({"ModuleBytes": {"module_bytes": "", "args": []}});

        let request = fakes
            .preparer()
            .prepare(&json.to_string(), SENDER_KEY)
            .await
            .unwrap();

        assert_eq!(request.chain_name, "casper");
        assert_eq!(request.payment_amount, PAYMENT_NOT_AVAILABLE);
    }

    #[test]
    fn test_from_config_builds_clients() {
        let config = ClientConfig {
            known_wasm_proxies: vec!["ab".repeat(32)],
            ..ClientConfig::default()
        };
        assert!(SignatureRequestPreparer::from_config(&config).is_ok());
    }
}
