//! Casper node JSON-RPC client.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};

use super::http::HttpClient;
use super::traits::OnChainAccountSource;
use crate::config::ClientConfig;
use crate::domain::account::RpcAccountInfo;
use crate::domain::keys::{NamedKeyPrefix, add_prefix, is_public_key_hex, strip_prefix};
use crate::domain::{CasperNetwork, ClientError};

/// Legacy formatted package hashes carry a `wasm` marker after the prefix.
const LEGACY_PACKAGE_PREFIX: &str = "contract-package-wasm";

// ============================================================================
// Node RPC Client
// ============================================================================

#[derive(Debug, Clone)]
pub struct NodeRpcClient {
    http: HttpClient,
    config: ClientConfig,
    next_id: Arc<AtomicU64>,
}

impl NodeRpcClient {
    /// Create a client for the endpoints in `config`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Network` if the HTTP client fails to initialise.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        Ok(Self {
            http: HttpClient::with_config(config.http_config())?,
            config,
            next_id: Arc::new(AtomicU64::new(1)),
        })
    }

    /// Call a JSON-RPC method and return its `result` member.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Rpc` when the node answers with an error object,
    /// or the transport error of the underlying request.
    pub async fn call(
        &self,
        network: CasperNetwork,
        method: &str,
        params: Value,
    ) -> Result<Value, ClientError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = rpc_request(id, method, params);
        let response = self.http.post_json(&self.config.rpc_url(network), &body).await?;
        rpc_result(response)
    }

    /// Id of the era the latest switch block closed.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Parse` when the node reports no era summary.
    pub async fn latest_era_id(&self, network: CasperNetwork) -> Result<u64, ClientError> {
        let result = self.call(network, "chain_get_era_summary", json!([])).await?;
        parse_era_id(&result)
    }
}

// ============================================================================
// Envelope
// ============================================================================

pub(crate) fn rpc_request(id: u64, method: &str, params: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": method,
        "params": params,
    })
}

pub(crate) fn rpc_result(mut response: Value) -> Result<Value, ClientError> {
    if let Some(error) = response.get("error").filter(|error| !error.is_null()) {
        return Err(ClientError::Rpc {
            code: error["code"].as_i64().unwrap_or_default(),
            message: error["message"].as_str().unwrap_or_default().to_string(),
        });
    }
    match response.get_mut("result") {
        Some(result) => Ok(result.take()),
        None => Err(ClientError::parse("RPC response has neither result nor error")),
    }
}

/// A public key is sent as is; anything else is framed as an account hash.
pub(crate) fn account_identifier(key: &str) -> String {
    if is_public_key_hex(key) {
        key.to_string()
    } else {
        add_prefix(&strip_prefix(key), NamedKeyPrefix::AccountHash)
    }
}

/// Bare package hash from a `query_global_state` result for a contract.
pub(crate) fn parse_contract_package_hash(result: &Value) -> Option<String> {
    let formatted = result["stored_value"]["Contract"]["contract_package_hash"].as_str()?;
    let bare = match formatted.get(..LEGACY_PACKAGE_PREFIX.len()) {
        Some(head) if head.eq_ignore_ascii_case(LEGACY_PACKAGE_PREFIX) => {
            formatted[LEGACY_PACKAGE_PREFIX.len()..].to_string()
        }
        _ => strip_prefix(formatted),
    };
    Some(bare.to_ascii_lowercase()).filter(|hash| !hash.is_empty())
}

/// Era id from a `chain_get_era_summary` result.
pub(crate) fn parse_era_id(result: &Value) -> Result<u64, ClientError> {
    result["era_summary"]["era_id"]
        .as_u64()
        .ok_or_else(|| ClientError::parse("era summary has no era_id"))
}

// ============================================================================
// Collaborator Implementation
// ============================================================================

#[async_trait]
impl OnChainAccountSource for NodeRpcClient {
    async fn account_info(
        &self,
        network: CasperNetwork,
        account_identifier_key: &str,
    ) -> Result<RpcAccountInfo, ClientError> {
        let params = json!({
            "account_identifier": account_identifier(account_identifier_key),
            "block_identifier": null,
        });
        let result = self.call(network, "state_get_account_info", params).await?;
        Ok(RpcAccountInfo::from_json(&result))
    }

    async fn contract_package_hash(
        &self,
        network: CasperNetwork,
        contract_hash: &str,
    ) -> Result<Option<String>, ClientError> {
        let params = json!({
            "state_identifier": null,
            "key": add_prefix(&strip_prefix(contract_hash), NamedKeyPrefix::Hash),
            "path": [],
        });
        let result = self.call(network, "query_global_state", params).await?;
        Ok(parse_contract_package_hash(&result))
    }
}
