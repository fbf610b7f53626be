//! Casper Wallet API client.
//!
//! Serves fiat rates, account display metadata, contract packages and the
//! WASM proxy registry to the signature request preparer. The same client
//! lists what an account holds (tokens, NFTs, stakes), its deploy history
//! and the application's release and marketing announcements.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;

use super::http::HttpClient;
use super::traits::{AccountInfoSource, ContractPackageSource, RateSource, WasmProxyRegistry};
use crate::config::ClientConfig;
use crate::domain::account::{AccountInfo, AccountInfoMap};
use crate::domain::app_event::{self, AppEnv, AppMarketingEvent, AppReleaseEvent};
use crate::domain::contract_package::ContractPackageInfo;
use crate::domain::history::{AccountReferences, DeployRecord, TokenActionRecord, TransferRecord};
use crate::domain::keys::account_hash_from_public_key;
use crate::domain::nft::{self, Nft};
use crate::domain::page::Page;
use crate::domain::token::{CsprBalance, Token};
use crate::domain::validator::Validator;
use crate::domain::{CasperNetwork, ClientError};

/// Extra data requested alongside each account.
const ACCOUNT_INCLUDES: &str = "account_info,centralized_account_info,cspr_name";

/// Currency id of USD in the rates endpoint.
const USD_CURRENCY_ID: u32 = 1;

/// Extra data requested with token holdings.
const TOKEN_INCLUDES: &str = "contract_package,friendlymarket_data(1),coingecko_data(1)";

/// Token holdings fetched in one request.
const TOKEN_PAGE_SIZE: u32 = 100;

/// Stakes fetched in one request.
const DELEGATION_PAGE_SIZE: u32 = 100;

const BALANCE_INCLUDES: &str = "delegated_balance,undelegating_balance";
const VALIDATOR_INCLUDES: &str = "account_info,average_performance";
const DELEGATION_INCLUDES: &str = "account_info,validator_account_info,bidder";
const DEPLOYS_INCLUDES: &str = "rate(1),contract_entrypoint,contract_package,transfers,account_info";
const DEPLOY_INCLUDES: &str = "rate(1),contract,contract_package,contract_entrypoint,account_info,transfers,nft_token_actions,ft_token_actions";
const TRANSFER_INCLUDES: &str = "initiator_public_key,to_public_key,rate(1),deploy";
const TOKEN_ACTION_INCLUDES: &str = "contract_package,deploy";

// ============================================================================
// Wallet API Client
// ============================================================================

#[derive(Debug, Clone)]
pub struct WalletApiClient {
    http: HttpClient,
    config: ClientConfig,
}

impl WalletApiClient {
    /// Create a client for the endpoints in `config`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Network` if the HTTP client fails to initialise.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        Ok(Self {
            http: HttpClient::with_config(config.http_config())?,
            config,
        })
    }

    #[must_use]
    pub fn base_url(&self, network: CasperNetwork) -> String {
        self.config.wallet_api_url(network)
    }

    fn proxy_registry_url(&self, wasm_hash: &str) -> String {
        format!(
            "{}/odra-wasm-proxies/{wasm_hash}",
            self.config.proxy_registry_url.trim_end_matches('/')
        )
    }
}

// ============================================================================
// URL Builders
// ============================================================================

pub(crate) fn rate_url(base_url: &str) -> String {
    format!("{}/rates/{USD_CURRENCY_ID}/amount", base_url.trim_end_matches('/'))
}

pub(crate) fn accounts_url(base_url: &str, account_hashes: &[String]) -> String {
    format!(
        "{}/accounts?account_hash={}&includes={ACCOUNT_INCLUDES}",
        base_url.trim_end_matches('/'),
        account_hashes.join(",")
    )
}

pub(crate) fn contract_package_url(base_url: &str, package_hash: &str) -> String {
    format!("{}/contract-packages/{package_hash}", base_url.trim_end_matches('/'))
}

pub(crate) fn tokens_url(base_url: &str, account_hash: &str) -> String {
    format!(
        "{}/accounts/{account_hash}/ft-token-ownership?page_size={TOKEN_PAGE_SIZE}&includes={TOKEN_INCLUDES}",
        base_url.trim_end_matches('/')
    )
}

pub(crate) fn balance_url(base_url: &str, public_key: &str) -> String {
    format!(
        "{}/accounts/{public_key}?includes={BALANCE_INCLUDES}",
        base_url.trim_end_matches('/')
    )
}

pub(crate) fn nfts_url(base_url: &str, account_hash: &str, page: u32, limit: u32) -> String {
    format!(
        "{}/accounts/{account_hash}/nft-tokens?page={page}&page_size={limit}&is_burned=false&includes=contract_package",
        base_url.trim_end_matches('/')
    )
}

/// All active validators of an era, unpaginated.
pub(crate) fn validators_url(base_url: &str, era_id: u64) -> String {
    format!(
        "{}/validators?page=1&page_size=-1&era_id={era_id}&is_active=true&includes={VALIDATOR_INCLUDES}",
        base_url.trim_end_matches('/')
    )
}

pub(crate) fn delegations_url(base_url: &str, public_key: &str, era_id: u64) -> String {
    format!(
        "{}/accounts/{public_key}/delegations?page=1&page_size={DELEGATION_PAGE_SIZE}&era_id={era_id}&includes={DELEGATION_INCLUDES}",
        base_url.trim_end_matches('/')
    )
}

pub(crate) fn deploys_url(
    base_url: &str,
    public_key: &str,
    page: u32,
    limit: u32,
    contract_package_hash: Option<&str>,
) -> String {
    let url = format!(
        "{}/accounts/{public_key}/deploys?page={page}&page_size={limit}&includes={DEPLOYS_INCLUDES}",
        base_url.trim_end_matches('/')
    );
    with_package_filter(url, contract_package_hash)
}

pub(crate) fn deploy_url(base_url: &str, deploy_hash: &str) -> String {
    format!(
        "{}/deploys/{deploy_hash}?includes={DEPLOY_INCLUDES}",
        base_url.trim_end_matches('/')
    )
}

pub(crate) fn transfers_url(base_url: &str, account_hash: &str, page: u32, limit: u32) -> String {
    format!(
        "{}/accounts/{account_hash}/transfers?page={page}&page_size={limit}&includes={TRANSFER_INCLUDES}",
        base_url.trim_end_matches('/')
    )
}

pub(crate) fn token_actions_url(
    base_url: &str,
    account_hash: &str,
    page: u32,
    limit: u32,
    contract_package_hash: Option<&str>,
) -> String {
    let url = format!(
        "{}/accounts/{account_hash}/ft-token-actions?page={page}&page_size={limit}&includes={TOKEN_ACTION_INCLUDES}",
        base_url.trim_end_matches('/')
    );
    with_package_filter(url, contract_package_hash)
}

pub(crate) fn release_events_url(env: AppEnv, current_version: &str) -> String {
    let version = current_version.trim_start_matches('v');
    format!("{}/mobile-client-versions?after=v{version}", env.api_url())
}

pub(crate) fn marketing_events_url(env: AppEnv) -> String {
    format!("{}/marketing-events", env.api_url())
}

fn with_package_filter(url: String, contract_package_hash: Option<&str>) -> String {
    match contract_package_hash.filter(|hash| !hash.is_empty()) {
        Some(hash) => format!("{url}&contract_package_hash={hash}"),
        None => url,
    }
}

// ============================================================================
// Response Parsing
// ============================================================================

/// Rate text from `{"data": {"amount": ..}}`; the amount may be a number or
/// a string.
pub(crate) fn parse_rate(json: &Value) -> Result<String, ClientError> {
    match &json["data"]["amount"] {
        Value::Number(amount) => Ok(amount.to_string()),
        Value::String(amount) => Ok(amount.clone()),
        _ => Err(ClientError::parse("rate response has no data.amount")),
    }
}

/// Account infos from `{"data": [..]}`.
pub(crate) fn parse_accounts(network: CasperNetwork, json: &Value) -> Result<AccountInfoMap, ClientError> {
    let entries = json["data"]
        .as_array()
        .ok_or_else(|| ClientError::parse("accounts response has no data array"))?;
    Ok(entries
        .iter()
        .map(|entry| AccountInfo::from_json(network, entry))
        .collect())
}

/// Contract package from `{"data": {..}}`; a null `data` is a miss.
pub(crate) fn parse_contract_package(json: &Value) -> Option<ContractPackageInfo> {
    let data = &json["data"];
    data.is_object().then(|| ContractPackageInfo::from_json(data))
}

fn data_array<'a>(json: &'a Value, what: &str) -> Result<&'a Vec<Value>, ClientError> {
    json["data"]
        .as_array()
        .ok_or_else(|| ClientError::parse(format!("{what} response has no data array")))
}

fn data_page<T>(json: &Value, what: &str, item: impl FnMut(&Value) -> T) -> Result<Page<T>, ClientError> {
    Page::from_json(json, item)
        .ok_or_else(|| ClientError::parse(format!("{what} response has no data array")))
}

/// Token holdings from `{"data": [..]}`.
pub(crate) fn parse_tokens(network: CasperNetwork, json: &Value) -> Result<Vec<Token>, ClientError> {
    Ok(data_array(json, "tokens")?
        .iter()
        .map(|entry| Token::from_ownership_json(network, entry))
        .collect())
}

/// Balances from `{"data": {..}}`; an account without data has none.
pub(crate) fn parse_cspr_balance(public_key: &str, json: &Value) -> CsprBalance {
    let data = &json["data"];
    if data.is_object() {
        CsprBalance::from_json(data)
    } else {
        CsprBalance::zero(public_key)
    }
}

pub(crate) fn parse_nfts(network: CasperNetwork, json: &Value) -> Result<Page<Nft>, ClientError> {
    data_page(json, "NFTs", |entry| Nft::from_json(network, entry))
}

pub(crate) fn parse_validators(json: &Value) -> Result<Vec<Validator>, ClientError> {
    Ok(data_array(json, "validators")?.iter().map(Validator::from_json).collect())
}

pub(crate) fn parse_delegations(json: &Value) -> Result<Vec<Validator>, ClientError> {
    Ok(data_array(json, "delegations")?
        .iter()
        .map(Validator::from_delegation_json)
        .collect())
}

pub(crate) fn parse_deploys(
    network: CasperNetwork,
    active_public_key: &str,
    json: &Value,
) -> Result<Page<DeployRecord>, ClientError> {
    data_page(json, "deploys", |entry| {
        DeployRecord::from_json(network, active_public_key, entry)
    })
}

/// Single deploy from `{"data": {..}}`; a null `data` is a miss.
pub(crate) fn parse_deploy(
    network: CasperNetwork,
    active_public_key: &str,
    json: &Value,
) -> Option<DeployRecord> {
    let data = &json["data"];
    data.is_object()
        .then(|| DeployRecord::from_json(network, active_public_key, data))
}

pub(crate) fn parse_transfers(
    active_public_key: &str,
    json: &Value,
) -> Result<Page<TransferRecord>, ClientError> {
    data_page(json, "transfers", |entry| {
        TransferRecord::from_json(active_public_key, entry)
    })
}

pub(crate) fn parse_token_actions(
    active_public_key: &str,
    json: &Value,
) -> Result<Page<TokenActionRecord>, ClientError> {
    data_page(json, "token actions", |entry| {
        TokenActionRecord::from_json(active_public_key, entry)
    })
}

/// Release announcements; a missing `data` means none.
pub(crate) fn parse_release_events(json: &Value) -> Vec<AppReleaseEvent> {
    json["data"]
        .as_array()
        .into_iter()
        .flatten()
        .map(AppReleaseEvent::from_json)
        .collect()
}

/// Marketing campaigns; a missing `data` means none.
pub(crate) fn parse_marketing_events(json: &Value) -> Vec<AppMarketingEvent> {
    json["data"]
        .as_array()
        .into_iter()
        .flatten()
        .map(AppMarketingEvent::from_json)
        .collect()
}

fn account_hash_of(public_key: &str) -> Result<String, ClientError> {
    account_hash_from_public_key(public_key).map_err(|err| ClientError::parse(err.to_string()))
}

// ============================================================================
// Account Data
// ============================================================================

impl WalletApiClient {
    /// CEP-18 tokens the account holds, with fiat values where quoted.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Parse` for a malformed public key or response,
    /// or the transport error of the request.
    pub async fn tokens(&self, network: CasperNetwork, public_key: &str) -> Result<Vec<Token>, ClientError> {
        let url = tokens_url(&self.base_url(network), &account_hash_of(public_key)?);
        let json = self.http.get_json(&url).await?;
        parse_tokens(network, &json)
    }

    /// Liquid, delegated and undelegating CSPR. An account the API does not
    /// know yet has a zero balance.
    ///
    /// # Errors
    ///
    /// Returns the transport error of the request, except a 404.
    pub async fn cspr_balance(&self, network: CasperNetwork, public_key: &str) -> Result<CsprBalance, ClientError> {
        match self.http.get_json(&balance_url(&self.base_url(network), public_key)).await {
            Ok(json) => Ok(parse_cspr_balance(public_key, &json)),
            Err(ClientError::Http { status: 404, .. }) => Ok(CsprBalance::zero(public_key)),
            Err(err) => Err(err),
        }
    }

    /// The native coin as a token entry. A failed rate lookup leaves the
    /// fiat fields unquoted rather than failing the balance.
    ///
    /// # Errors
    ///
    /// Returns the error of the balance request.
    pub async fn cspr_token(&self, network: CasperNetwork, public_key: &str) -> Result<Token, ClientError> {
        let (balance, rate) = tokio::join!(
            self.cspr_balance(network, public_key),
            self.cspr_fiat_rate(network)
        );
        let rate = rate.unwrap_or_else(|err| {
            tracing::debug!(%network, error = %err, "CSPR rate unavailable");
            String::new()
        });
        Ok(Token::cspr(network, &balance?, &rate))
    }

    /// One page of the account's NFTs, burned tokens excluded.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Parse` for a malformed public key or response,
    /// or the transport error of the request.
    pub async fn nfts(
        &self,
        network: CasperNetwork,
        public_key: &str,
        page: u32,
        limit: u32,
    ) -> Result<Page<Nft>, ClientError> {
        let url = nfts_url(&self.base_url(network), &account_hash_of(public_key)?, page, limit);
        let json = self.http.get_json(&url).await?;
        parse_nfts(network, &json)
    }

    /// Previewable media type of an NFT asset, from a HEAD request. Any
    /// failure yields the unknown type.
    pub async fn nft_media_type(&self, url: &str) -> String {
        match self.http.head_content_type(url).await {
            Ok(content_type) => nft::media_type(content_type.as_deref()),
            Err(err) => {
                tracing::debug!(url, error = %err, "NFT media type unavailable");
                nft::UNKNOWN_MEDIA_TYPE.to_string()
            }
        }
    }

    /// Active validators of `era_id`; the current era comes from
    /// `NodeRpcClient::latest_era_id`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Parse` for a malformed response, or the
    /// transport error of the request.
    pub async fn validators(&self, network: CasperNetwork, era_id: u64) -> Result<Vec<Validator>, ClientError> {
        let json = self.http.get_json(&validators_url(&self.base_url(network), era_id)).await?;
        parse_validators(&json)
    }

    /// Validators the account delegates to, with its stake in each.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Parse` for a malformed response, or the
    /// transport error of the request.
    pub async fn validators_with_stakes(
        &self,
        network: CasperNetwork,
        public_key: &str,
        era_id: u64,
    ) -> Result<Vec<Validator>, ClientError> {
        let url = delegations_url(&self.base_url(network), public_key, era_id);
        let json = self.http.get_json(&url).await?;
        parse_delegations(&json)
    }
}

// ============================================================================
// Deploy History
// ============================================================================

impl WalletApiClient {
    /// One page of deploys sent by the account, optionally only those
    /// calling one contract package.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Parse` for a malformed response, or the
    /// transport error of the request.
    pub async fn deploys(
        &self,
        network: CasperNetwork,
        public_key: &str,
        page: u32,
        limit: u32,
        contract_package_hash: Option<&str>,
    ) -> Result<Page<DeployRecord>, ClientError> {
        let url = deploys_url(&self.base_url(network), public_key, page, limit, contract_package_hash);
        let json = self.http.get_json(&url).await?;
        parse_deploys(network, public_key, &json)
    }

    /// A single deploy. `None` while the API has not indexed it yet.
    ///
    /// # Errors
    ///
    /// Returns the transport error of the request, except a 404.
    pub async fn deploy(
        &self,
        network: CasperNetwork,
        public_key: &str,
        deploy_hash: &str,
    ) -> Result<Option<DeployRecord>, ClientError> {
        match self.http.get_json(&deploy_url(&self.base_url(network), deploy_hash)).await {
            Ok(json) => Ok(parse_deploy(network, public_key, &json)),
            Err(ClientError::Http { status: 404, .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// One page of native CSPR transfers into or out of the account.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Parse` for a malformed public key or response,
    /// or the transport error of the request.
    pub async fn cspr_transfers(
        &self,
        network: CasperNetwork,
        public_key: &str,
        page: u32,
        limit: u32,
    ) -> Result<Page<TransferRecord>, ClientError> {
        let url = transfers_url(&self.base_url(network), &account_hash_of(public_key)?, page, limit);
        let json = self.http.get_json(&url).await?;
        parse_transfers(public_key, &json)
    }

    /// One page of CEP-18 movements touching the account.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Parse` for a malformed public key or response,
    /// or the transport error of the request.
    pub async fn cep18_transfers(
        &self,
        network: CasperNetwork,
        public_key: &str,
        page: u32,
        limit: u32,
        contract_package_hash: Option<&str>,
    ) -> Result<Page<TokenActionRecord>, ClientError> {
        let account_hash = account_hash_of(public_key)?;
        let url = token_actions_url(&self.base_url(network), &account_hash, page, limit, contract_package_hash);
        let json = self.http.get_json(&url).await?;
        parse_token_actions(public_key, &json)
    }
}

/// Resolves every party of `records` against account metadata fetched in
/// one batch. A failed lookup leaves the raw keys in place.
pub async fn resolve_record_accounts<T, S>(source: &S, network: CasperNetwork, records: &mut [T])
where
    T: AccountReferences,
    S: AccountInfoSource + ?Sized,
{
    let mut hashes: Vec<String> = records.iter().flat_map(AccountReferences::account_hashes).collect();
    hashes.sort();
    hashes.dedup();
    if hashes.is_empty() {
        return;
    }
    match source.accounts_info(network, &hashes).await {
        Ok(accounts) => {
            for record in records.iter_mut() {
                record.resolve_accounts(&accounts);
            }
        }
        Err(err) => tracing::debug!(%network, error = %err, "history accounts unavailable"),
    }
}

// ============================================================================
// Application Events
// ============================================================================

impl WalletApiClient {
    /// Releases newer than `current_version`.
    ///
    /// # Errors
    ///
    /// Returns the transport error of the request.
    pub async fn release_events(&self, env: AppEnv, current_version: &str) -> Result<Vec<AppReleaseEvent>, ClientError> {
        let json = self.http.get_json(&release_events_url(env, current_version)).await?;
        Ok(parse_release_events(&json))
    }

    /// All marketing campaigns, running or not.
    ///
    /// # Errors
    ///
    /// Returns the transport error of the request.
    pub async fn marketing_events(&self, env: AppEnv) -> Result<Vec<AppMarketingEvent>, ClientError> {
        let json = self.http.get_json(&marketing_events_url(env)).await?;
        Ok(parse_marketing_events(&json))
    }

    /// The first campaign running now that is not in `ignored_ids`.
    ///
    /// # Errors
    ///
    /// Returns the transport error of the request.
    pub async fn active_marketing_event(
        &self,
        env: AppEnv,
        ignored_ids: &[u64],
    ) -> Result<Option<AppMarketingEvent>, ClientError> {
        let events = self.marketing_events(env).await?;
        Ok(app_event::active_marketing_event(events, Utc::now(), ignored_ids))
    }
}

// ============================================================================
// Collaborator Implementations
// ============================================================================

#[async_trait]
impl RateSource for WalletApiClient {
    async fn cspr_fiat_rate(&self, network: CasperNetwork) -> Result<String, ClientError> {
        let json = self.http.get_json(&rate_url(&self.base_url(network))).await?;
        parse_rate(&json)
    }
}

#[async_trait]
impl AccountInfoSource for WalletApiClient {
    async fn accounts_info(
        &self,
        network: CasperNetwork,
        account_hashes: &[String],
    ) -> Result<AccountInfoMap, ClientError> {
        if account_hashes.is_empty() {
            return Ok(AccountInfoMap::new());
        }
        let url = accounts_url(&self.base_url(network), account_hashes);
        let json = self.http.get_json(&url).await?;
        parse_accounts(network, &json)
    }
}

#[async_trait]
impl ContractPackageSource for WalletApiClient {
    async fn contract_package(
        &self,
        network: CasperNetwork,
        package_hash: &str,
    ) -> Result<Option<ContractPackageInfo>, ClientError> {
        let url = contract_package_url(&self.base_url(network), package_hash);
        match self.http.get_json(&url).await {
            Ok(json) => Ok(parse_contract_package(&json)),
            Err(ClientError::Http { status: 404, .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }
}

#[async_trait]
impl WasmProxyRegistry for WalletApiClient {
    async fn is_wasm_proxy(&self, wasm_hash: &str) -> Result<bool, ClientError> {
        match self.http.get_json(&self.proxy_registry_url(wasm_hash)).await {
            Ok(_) => Ok(true),
            Err(ClientError::Http { status: 404, .. }) => Ok(false),
            Err(err) => Err(err),
        }
    }
}
