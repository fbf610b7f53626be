//! Shared test utilities and Mother pattern factories.
//!
//! This module provides reusable test fixtures following the Mother pattern.
//! Use these helpers to avoid copy-pasting setup code across tests.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeDelta, TimeZone, Utc};
use num_bigint::BigUint;
use rstest::fixture;
use serde_json::{Value, json};

use crate::client::traits::{
    AccountInfoSource, ContractPackageSource, OnChainAccountSource, RateSource, WasmProxyRegistry,
};
use crate::domain::account::{AccountInfo, AccountInfoMap, RpcAccountInfo};
use crate::domain::cl_value::{CLType, CLValue, Key, RuntimeArgs};
use crate::domain::contract_package::{ContractPackageInfo, ContractTypeId};
use crate::domain::keys::{AccountHash, PublicKey, account_hash_from_public_key};
use crate::domain::transaction::{
    Approval, AuctionOperation, EntryPoint, InitiatorAddr, PricingMode, StoredTargetId, Target,
    Transaction,
};
use crate::domain::{CasperNetwork, ClientError};
use crate::signature_request::SignatureRequestPreparer;

// ============================================================================
// Keys
// ============================================================================

/// Ed25519 key of the account that creates and signs the fixtures.
pub const SENDER_KEY: &str = "01deba7173738a7f55de3ad9dc27e081df41ff285f25887ec424a8a65b43d0cf77";

/// Ed25519 key the native transfer fixture pays.
pub const RECIPIENT_KEY: &str = "0106ca7c39cd272dbf21a86eeb3b36b7c26e2e9b94af64292419f7862936bca2ca";

const TX_HASH: &str = "3b8a8c9a3c2c6c0e7e1f1a5d2f0b9e4c8d7a6b5c4d3e2f1a0b9c8d7e6f5a4b3c";

fn signature() -> String {
    format!("01{}", "00".repeat(64))
}

// ============================================================================
// Mother Pattern Factories
// ============================================================================

pub struct TransactionMother;

impl TransactionMother {
    fn base(entry_point: EntryPoint, target: Target) -> Transaction {
        Transaction {
            hash: TX_HASH.to_string(),
            chain_name: "casper-test".to_string(),
            initiator: InitiatorAddr::PublicKey(SENDER_KEY.to_string()),
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            ttl: TimeDelta::minutes(30),
            entry_point,
            target,
            args: RuntimeArgs::new(),
            approvals: vec![Approval {
                signer: SENDER_KEY.to_string(),
                signature: signature(),
            }],
            pricing_mode: Some(PricingMode::PaymentLimited {
                payment_amount: "2500000000".to_string(),
                gas_price_tolerance: 1,
                standard_payment: true,
            }),
            is_legacy_deploy: false,
            raw_json: Value::Null,
        }
    }

    /// 2.5 CSPR from the sender to the recipient, transfer id 42, 0.1 CSPR
    /// payment.
    #[must_use]
    pub fn native_transfer() -> Transaction {
        Transaction {
            args: RuntimeArgs::new()
                .with(
                    "target",
                    CLValue::PublicKey(PublicKey::from_hex(RECIPIENT_KEY).unwrap()),
                )
                .with("amount", CLValue::U512(BigUint::from(2_500_000_000u64)))
                .with(
                    "id",
                    CLValue::Option {
                        inner_type: CLType::U64,
                        value: Some(Box::new(CLValue::U64(42))),
                    },
                ),
            pricing_mode: Some(PricingMode::PaymentLimited {
                payment_amount: "100000000".to_string(),
                gas_price_tolerance: 1,
                standard_payment: true,
            }),
            raw_json: TxJsonMother::native_transfer(),
            ..Self::base(EntryPoint::Transfer, Target::Native)
        }
    }

    /// A custom entry point on a contract called by hash, without arguments.
    #[must_use]
    pub fn custom_by_hash(entry_point: &str, contract_hash: &str) -> Transaction {
        Self::base(
            EntryPoint::Custom(entry_point.to_string()),
            Target::Stored(StoredTargetId::ByHash(contract_hash.to_string())),
        )
    }

    /// A native auction call, without arguments.
    #[must_use]
    pub fn auction(operation: AuctionOperation) -> Transaction {
        Self::base(EntryPoint::Auction(operation), Target::Native)
    }

    /// Session code with the given module bytes, without arguments.
    #[must_use]
    pub fn session(module_bytes: &[u8]) -> Transaction {
        Self::base(
            EntryPoint::Call,
            Target::Session {
                module_bytes: module_bytes.to_vec(),
            },
        )
    }
}

pub struct TxJsonMother;

impl TxJsonMother {
    fn v1(initiator: &str, fields: Value) -> Value {
        json!({
            "hash": TX_HASH,
            "payload": {
                "initiator_addr": {"PublicKey": initiator},
                "timestamp": "2024-01-01T00:00:00.000Z",
                "ttl": "30m",
                "chain_name": "casper-test",
                "pricing_mode": {
                    "PaymentLimited": {
                        "payment_amount": 100_000_000u64,
                        "gas_price_tolerance": 1,
                        "standard_payment": true
                    }
                },
                "fields": fields
            },
            "approvals": [{"signer": initiator, "signature": signature()}]
        })
    }

    /// V1 JSON of [`TransactionMother::native_transfer`].
    #[must_use]
    pub fn native_transfer() -> Value {
        Self::v1(
            SENDER_KEY,
            json!({
                "args": {"Named": [
                    ["target", {"cl_type": "PublicKey", "bytes": RECIPIENT_KEY, "parsed": RECIPIENT_KEY}],
                    ["amount", {"cl_type": "U512", "bytes": "0400f90295", "parsed": "2500000000"}],
                    ["id", {"cl_type": {"Option": "U64"}, "bytes": "012a00000000000000", "parsed": 42}]
                ]},
                "entry_point": "Transfer",
                "target": "Native",
                "scheduling": "Standard"
            }),
        )
    }

    /// V1 JSON of a custom call on a package, without arguments.
    #[must_use]
    pub fn custom_call_by_package(entry_point: &str, package_hash: &str) -> Value {
        Self::v1(
            SENDER_KEY,
            json!({
                "args": {"Named": []},
                "entry_point": {"Custom": entry_point},
                "target": {"Stored": {
                    "id": {"ByPackageHash": {"addr": package_hash, "version": null}},
                    "runtime": "VmCasperV1"
                }},
                "scheduling": "Standard"
            }),
        )
    }

    /// V1 JSON of session code with the given named arguments.
    #[must_use]
    pub fn session_call(module_hex: &str, named_args: Value) -> Value {
        Self::v1(
            SENDER_KEY,
            json!({
                "args": {"Named": named_args},
                "entry_point": "Call",
                "target": {"Session": {
                    "module_bytes": module_hex,
                    "runtime": "VmCasperV1",
                    "is_install_upgrade": false
                }},
                "scheduling": "Standard"
            }),
        )
    }

    /// Legacy mainnet deploy calling a contract by hash with a 2.5 CSPR
    /// `amount` argument and standard payment of the same size.
    #[must_use]
    pub fn deploy_stored_call(entry_point: &str, contract_hash: &str) -> Value {
        let amount = json!(["amount", {"cl_type": "U512", "bytes": "0400f90295", "parsed": "2500000000"}]);
        json!({
            "hash": TX_HASH,
            "header": {
                "account": SENDER_KEY,
                "timestamp": "2024-01-01T00:00:00.000Z",
                "ttl": "30m",
                "gas_price": 1,
                "body_hash": "00".repeat(32),
                "dependencies": [],
                "chain_name": "casper"
            },
            "payment": {"ModuleBytes": {"module_bytes": "", "args": [amount]}},
            "session": {"StoredContractByHash": {
                "hash": format!("hash-{contract_hash}"),
                "entry_point": entry_point,
                "args": [amount]
            }},
            "approvals": [{"signer": SENDER_KEY, "signature": signature()}]
        })
    }
}

pub struct AccountInfoMother;

impl AccountInfoMother {
    /// A named account whose public key is known.
    #[must_use]
    pub fn with_public_key(public_key: &str, name: &str) -> AccountInfo {
        AccountInfo {
            public_key: public_key.to_string(),
            account_hash: account_hash_from_public_key(public_key).unwrap(),
            name: name.to_string(),
            ..AccountInfo::default()
        }
    }

    /// A named account known only by its hash.
    #[must_use]
    pub fn anonymous(account_hash: &str, name: &str) -> AccountInfo {
        AccountInfo {
            account_hash: account_hash.to_string(),
            name: name.to_string(),
            ..AccountInfo::default()
        }
    }
}

pub struct ContractPackageMother;

impl ContractPackageMother {
    #[must_use]
    pub fn cep18(package_hash: &str, name: &str, symbol: &str, decimals: u32) -> ContractPackageInfo {
        ContractPackageInfo {
            contract_package_hash: package_hash.to_string(),
            name: name.to_string(),
            icon_url: None,
            decimals: Some(decimals),
            symbol: Some(symbol.to_string()),
            contract_type: Some(ContractTypeId::Cep18),
        }
    }

    #[must_use]
    pub fn nft(package_hash: &str, name: &str) -> ContractPackageInfo {
        ContractPackageInfo {
            contract_package_hash: package_hash.to_string(),
            name: name.to_string(),
            contract_type: Some(ContractTypeId::Cep78Nft),
            ..ContractPackageInfo::default()
        }
    }
}

pub struct ClValueMother;

impl ClValueMother {
    /// A `List<U8>`, the shape byte payloads take inside arguments.
    #[must_use]
    pub fn byte_list(bytes: &[u8]) -> CLValue {
        CLValue::List {
            item_type: CLType::U8,
            items: bytes.iter().map(|byte| CLValue::U8(*byte)).collect(),
        }
    }

    /// A public key, a list of account keys, a map with an option and a unit.
    #[must_use]
    pub fn mixed_args(public_key: &str) -> RuntimeArgs {
        let owner = CLValue::Key(Key::Account(AccountHash([0xcc; 32])));
        RuntimeArgs::new()
            .with(
                "validator",
                CLValue::PublicKey(PublicKey::from_hex(public_key).unwrap()),
            )
            .with(
                "owners",
                CLValue::List {
                    item_type: CLType::Key,
                    items: vec![owner.clone(), owner],
                },
            )
            .with(
                "limits",
                CLValue::Map(vec![(
                    CLValue::String("daily".to_string()),
                    CLValue::Option {
                        inner_type: CLType::U64,
                        value: Some(Box::new(CLValue::U64(10))),
                    },
                )]),
            )
            .with("marker", CLValue::Unit)
    }
}

// ============================================================================
// API Response Fixtures
// ============================================================================

pub struct ApiJsonMother;

impl ApiJsonMother {
    /// `/accounts` response with one named account.
    #[must_use]
    pub fn accounts_response(public_key: &str, name: &str) -> Value {
        let account_hash = account_hash_from_public_key(public_key).unwrap();
        json!({
            "data": [{
                "account_hash": format!("account-hash-{account_hash}"),
                "public_key": public_key,
                "account_info": {"info": {"owner": {"name": name}}},
                "centralized_account_info": null,
                "cspr_name": format!("{}.cspr", name.to_lowercase())
            }]
        })
    }

    /// `/contract-packages/{hash}` response.
    #[must_use]
    pub fn contract_package_response(package_hash: &str, name: &str, contract_type_id: u64) -> Value {
        json!({
            "data": {
                "contract_package_hash": package_hash,
                "name": name,
                "icon_url": null,
                "latest_version_contract_type_id": contract_type_id,
                "metadata": {}
            }
        })
    }

    /// `state_get_account_info` result with a single associated key.
    #[must_use]
    pub fn rpc_account_result(account_hash: &str, weight: u8) -> Value {
        json!({
            "api_version": "2.0.0",
            "account": {
                "account_hash": format!("account-hash-{account_hash}"),
                "associated_keys": [{
                    "account_hash": format!("account-hash-{account_hash}"),
                    "weight": weight
                }],
                "action_thresholds": {"deployment": 1, "key_management": 1}
            }
        })
    }

    /// `ft-token-ownership` response with one CoinGecko-quoted token.
    #[must_use]
    pub fn token_ownership_response(package_hash: &str, balance: &str) -> Value {
        json!({
            "data": [{
                "balance": balance,
                "contract_package_hash": package_hash,
                "contract_package": {
                    "contract_package_hash": package_hash,
                    "name": "Wrapped CSPR",
                    "icon_url": "https://img/wcspr.png",
                    "coingecko_id": "wrapped-cspr",
                    "latest_version_contract_hash": format!("hash-{}", "ef".repeat(32)),
                    "metadata": {"decimals": 9, "symbol": "WCSPR"},
                    "coingecko_data": {"price": 0.02},
                    "friendlymarket_data": null
                }
            }]
        })
    }

    /// `nft-tokens` page with one token carrying list and off-chain metadata.
    #[must_use]
    pub fn nft_tokens_response(package_hash: &str, owner_public_key: &str) -> Value {
        json!({
            "item_count": 21,
            "page_count": 3,
            "data": [{
                "tracking_id": 9001,
                "token_standard_id": 2,
                "is_burned": false,
                "contract_package_hash": package_hash,
                "contract_package": {"name": "Casper Punks", "contract_type_id": 7},
                "token_id": "42",
                "owner_account_hash": account_hash_from_public_key(owner_public_key).unwrap(),
                "owner_public_key": owner_public_key,
                "metadata": [{"key": "name", "value": "Punk #42"}],
                "offchain_metadata": {"image": "https://img/punk42.png", "description": "A punk"},
                "onchain_metadata": {},
                "timestamp": "2024-05-01T10:00:00Z"
            }]
        })
    }

    /// `validators` response with one named validator.
    #[must_use]
    pub fn validators_response(public_key: &str, name: &str) -> Value {
        json!({
            "data": [{
                "public_key": public_key,
                "fee": 5,
                "delegators_number": 120,
                "total_stake": "12345678000000000",
                "is_active": true,
                "account_info": {"info": {"owner": {
                    "name": name,
                    "branding": {"logo": {"svg": "https://img/v.svg", "png_1024": "https://img/v1024.png"}}
                }}}
            }]
        })
    }

    /// `delegations` response with one anonymous validator.
    #[must_use]
    pub fn delegations_response(validator_key: &str, stake: &str) -> Value {
        json!({
            "data": [{
                "validator_public_key": validator_key,
                "stake": stake,
                "bidder": {
                    "public_key": validator_key,
                    "fee": 10,
                    "delegators_number": 3,
                    "total_stake": 9_000_000_000_000u64
                },
                "validator_account_info": null
            }]
        })
    }

    /// `deploys` page with a failed CEP-18 transfer by `caller`.
    #[must_use]
    pub fn deploys_response(caller: &str, package_hash: &str) -> Value {
        json!({
            "item_count": 1,
            "page_count": 1,
            "data": [{
                "deploy_hash": "d1".repeat(32),
                "caller_public_key": caller,
                "contract_hash": format!("hash-{}", "c1".repeat(32)),
                "contract_package_hash": package_hash,
                "contract_package": {
                    "contract_package_hash": package_hash,
                    "name": "Wrapped CSPR",
                    "contract_type_id": 2,
                    "metadata": {"decimals": 9, "symbol": "WCSPR"}
                },
                "entry_point": {"name": "transfer"},
                "args": {"amount": {"cl_type": "U256", "parsed": "2500000000"}},
                "status": "processed",
                "error_message": "User error: 60001",
                "cost": "1500000000",
                "payment_amount": "3000000000",
                "rate": 0.02,
                "timestamp": "2024-05-01T10:00:00Z",
                "execution_type_id": 2
            }]
        })
    }

    /// `transfers` page with one transfer from `from` to `to`.
    #[must_use]
    pub fn transfers_response(from: &str, to: &str) -> Value {
        json!({
            "item_count": 1,
            "page_count": 1,
            "data": [{
                "deploy_hash": "d2".repeat(32),
                "amount": "2500000000",
                "id": 7,
                "initiator_public_key": from,
                "initiator_account_hash": account_hash_from_public_key(from).unwrap(),
                "to_public_key": to,
                "to_account_hash": account_hash_from_public_key(to).unwrap(),
                "from_purse": "uref-aa-007",
                "to_purse": "uref-bb-007",
                "rate": 0.02,
                "timestamp": "2024-05-01T10:00:00Z"
            }]
        })
    }

    /// `ft-token-actions` page with one transfer to the account hash of `to`.
    #[must_use]
    pub fn token_actions_response(from: &str, to: &str, package_hash: &str) -> Value {
        json!({
            "item_count": 1,
            "page_count": 1,
            "data": [{
                "deploy_hash": "d3".repeat(32),
                "contract_package_hash": package_hash,
                "contract_package": {
                    "name": "Wrapped CSPR",
                    "metadata": {"decimals": 9, "symbol": "WCSPR"},
                    "friendlymarket_data": {"price": "0.5"}
                },
                "from_public_key": from,
                "from_hash": account_hash_from_public_key(from).unwrap(),
                "from_type": 0,
                "to_public_key": null,
                "to_hash": account_hash_from_public_key(to).unwrap(),
                "to_type": 0,
                "ft_action_type_id": 2,
                "amount": "1000000000",
                "timestamp": "2024-05-01T10:00:00Z"
            }]
        })
    }

    /// `query_global_state` result for a stored contract.
    #[must_use]
    pub fn global_state_contract_result(formatted_package_hash: &str) -> Value {
        json!({
            "api_version": "2.0.0",
            "stored_value": {
                "Contract": {
                    "contract_package_hash": formatted_package_hash,
                    "contract_wasm_hash": format!("contract-wasm-{}", "00".repeat(32)),
                    "named_keys": [],
                    "entry_points": [],
                    "protocol_version": "1.5.0"
                }
            },
            "merkle_proof": ""
        })
    }
}

// ============================================================================
// Fake Collaborators
// ============================================================================

fn unavailable(what: &str) -> ClientError {
    ClientError::parse(format!("{what} unavailable"))
}

/// A fixed rate, or a failure when `None`.
pub struct FakeRate(pub Option<String>);

#[async_trait]
impl RateSource for FakeRate {
    async fn cspr_fiat_rate(&self, _network: CasperNetwork) -> Result<String, ClientError> {
        self.0.clone().ok_or_else(|| unavailable("rate"))
    }
}

/// Serves a fixed set of accounts and records every batch it was asked for.
#[derive(Default)]
pub struct FakeAccounts {
    accounts: AccountInfoMap,
    requests: Mutex<Vec<Vec<String>>>,
    failing: bool,
}

impl FakeAccounts {
    #[must_use]
    pub fn new(accounts: Vec<AccountInfo>) -> Self {
        Self {
            accounts: accounts.into_iter().collect(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn requests(&self) -> Vec<Vec<String>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl AccountInfoSource for FakeAccounts {
    async fn accounts_info(
        &self,
        _network: CasperNetwork,
        account_hashes: &[String],
    ) -> Result<AccountInfoMap, ClientError> {
        self.requests.lock().unwrap().push(account_hashes.to_vec());
        if self.failing {
            return Err(unavailable("accounts"));
        }
        Ok(account_hashes
            .iter()
            .filter_map(|hash| {
                self.accounts
                    .resolve(hash, crate::domain::keys::AccountKeyType::AccountHash)
                    .cloned()
            })
            .collect())
    }
}

/// Serves contract packages keyed by package hash.
#[derive(Default)]
pub struct FakeContractPackages {
    packages: HashMap<String, ContractPackageInfo>,
    requests: Mutex<Vec<String>>,
    failing: bool,
}

impl FakeContractPackages {
    #[must_use]
    pub fn new(packages: Vec<ContractPackageInfo>) -> Self {
        Self {
            packages: packages
                .into_iter()
                .map(|package| (package.contract_package_hash.clone(), package))
                .collect(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContractPackageSource for FakeContractPackages {
    async fn contract_package(
        &self,
        _network: CasperNetwork,
        package_hash: &str,
    ) -> Result<Option<ContractPackageInfo>, ClientError> {
        self.requests.lock().unwrap().push(package_hash.to_string());
        if self.failing {
            return Err(unavailable("contract package"));
        }
        Ok(self.packages.get(package_hash).cloned())
    }
}

/// Knows a fixed set of proxy module hashes and counts lookups.
#[derive(Default)]
pub struct FakeProxyRegistry {
    hashes: HashSet<String>,
    lookups: AtomicUsize,
    failing: bool,
}

impl FakeProxyRegistry {
    #[must_use]
    pub fn new<I, S>(hashes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            hashes: hashes.into_iter().map(|hash| hash.as_ref().to_string()).collect(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WasmProxyRegistry for FakeProxyRegistry {
    async fn is_wasm_proxy(&self, wasm_hash: &str) -> Result<bool, ClientError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(unavailable("proxy registry"));
        }
        Ok(self.hashes.contains(wasm_hash))
    }
}

/// A node holding one account record and a contract to package mapping.
#[derive(Default)]
pub struct FakeNode {
    account: Option<RpcAccountInfo>,
    package_hashes: HashMap<String, String>,
    account_requests: Mutex<Vec<String>>,
}

impl FakeNode {
    #[must_use]
    pub fn with_account(mut self, account: RpcAccountInfo) -> Self {
        self.account = Some(account);
        self
    }

    #[must_use]
    pub fn with_contract(mut self, contract_hash: &str, package_hash: &str) -> Self {
        self.package_hashes
            .insert(contract_hash.to_string(), package_hash.to_string());
        self
    }

    pub fn account_requests(&self) -> Vec<String> {
        self.account_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl OnChainAccountSource for FakeNode {
    async fn account_info(
        &self,
        _network: CasperNetwork,
        account_identifier: &str,
    ) -> Result<RpcAccountInfo, ClientError> {
        self.account_requests
            .lock()
            .unwrap()
            .push(account_identifier.to_string());
        self.account
            .clone()
            .ok_or_else(|| ClientError::not_found("account", account_identifier))
    }

    async fn contract_package_hash(
        &self,
        _network: CasperNetwork,
        contract_hash: &str,
    ) -> Result<Option<String>, ClientError> {
        Ok(self.package_hashes.get(contract_hash).cloned())
    }
}

/// One of each collaborator, all empty until a test fills them in.
pub struct Fakes {
    pub rates: Arc<FakeRate>,
    pub accounts: Arc<FakeAccounts>,
    pub packages: Arc<FakeContractPackages>,
    pub proxies: Arc<FakeProxyRegistry>,
    pub node: Arc<FakeNode>,
}

impl Default for Fakes {
    fn default() -> Self {
        Self {
            rates: Arc::new(FakeRate(Some("0.5".to_string()))),
            accounts: Arc::new(FakeAccounts::default()),
            packages: Arc::new(FakeContractPackages::default()),
            proxies: Arc::new(FakeProxyRegistry::default()),
            node: Arc::new(FakeNode::default()),
        }
    }
}

impl Fakes {
    #[must_use]
    pub fn preparer(&self) -> SignatureRequestPreparer {
        SignatureRequestPreparer::new(
            self.rates.clone(),
            self.accounts.clone(),
            self.packages.clone(),
            self.proxies.clone(),
            self.node.clone(),
        )
    }
}

// ============================================================================
// Fixtures
// ============================================================================

#[fixture]
pub fn fakes() -> Fakes {
    Fakes::default()
}

#[fixture]
pub fn native_transfer_json() -> String {
    TxJsonMother::native_transfer().to_string()
}
