//! Fungible token holdings and the native CSPR balance.
//!
//! Balances stay integer strings of the smallest unit; the decimal, display
//! and fiat forms are derived once when the API payload is normalised.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::amount::{
    CSPR_DECIMALS, CSPR_SYMBOL, decimal_amount, format_with_commas, formatted_amount, is_zero_text,
    number_text, sum_amounts, token_fiat_amount,
};
use super::keys::strip_prefix;
use super::network::CasperNetwork;

/// Decimals assumed for a token whose package declares none.
const DEFAULT_TOKEN_DECIMALS: u32 = 18;

/// The only fiat currency the wallet API quotes.
pub const FIAT_CURRENCY: &str = "USD";

// ============================================================================
// Market Data
// ============================================================================

/// Source of a token's fiat price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketDataProvider {
    CoinGecko,
    FriendlyMarket,
}

impl MarketDataProvider {
    /// Page describing the token at this provider.
    #[must_use]
    pub fn token_url(&self, coingecko_id: Option<&str>, contract_hash: Option<&str>) -> Option<String> {
        match self {
            Self::CoinGecko => {
                coingecko_id.map(|id| format!("https://www.coingecko.com/en/coins/{id}"))
            }
            Self::FriendlyMarket => contract_hash
                .map(|hash| format!("https://www.friendly.market/tokens/hash-{}", strip_prefix(hash))),
        }
    }
}

/// Price quoted for a contract package: CoinGecko first, then Friendly.Market.
/// Zero prices count as no quote.
pub(crate) fn market_price(package: &Value) -> Option<(MarketDataProvider, String)> {
    [
        (MarketDataProvider::CoinGecko, "coingecko_data"),
        (MarketDataProvider::FriendlyMarket, "friendlymarket_data"),
    ]
    .into_iter()
    .find_map(|(provider, field)| {
        number_text(&package[field]["price"])
            .filter(|price| !is_zero_text(price))
            .map(|price| (provider, price))
    })
}

fn with_commas(plain: &str) -> String {
    match plain.split_once('.') {
        Some((integer, fraction)) => format!("{}.{fraction}", format_with_commas(integer)),
        None => format_with_commas(plain),
    }
}

// ============================================================================
// Token
// ============================================================================

/// A fungible token the account holds, with its display and fiat forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub id: String,
    pub contract_package_hash: String,
    pub contract_hash: Option<String>,
    pub network: CasperNetwork,
    pub name: String,
    pub symbol: String,
    pub decimals: u32,
    pub icon_url: Option<String>,
    /// Integer balance in the smallest unit.
    pub balance: String,
    pub decimal_balance: String,
    pub formatted_decimal_balance: String,
    pub is_native: bool,
    /// Unit price, `"0"` when unquoted.
    pub fiat_price: String,
    pub fiat_balance: String,
    pub formatted_fiat_balance: String,
    pub currency: &'static str,
    pub market_data_provider: Option<MarketDataProvider>,
    pub market_data_provider_url: Option<String>,
}

impl Token {
    /// Create from one `ft-token-ownership` entry: `{"balance", "contract_package": {..}}`.
    #[must_use]
    pub fn from_ownership_json(network: CasperNetwork, entry: &Value) -> Self {
        let package = &entry["contract_package"];
        let contract_package_hash = strip_prefix(
            package["contract_package_hash"]
                .as_str()
                .or_else(|| entry["contract_package_hash"].as_str())
                .unwrap_or(""),
        );
        let contract_hash = package["latest_version_contract_hash"]
            .as_str()
            .map(strip_prefix);
        let decimals = package["metadata"]["decimals"]
            .as_u64()
            .and_then(|d| u32::try_from(d).ok())
            .unwrap_or(DEFAULT_TOKEN_DECIMALS);
        let symbol = package["metadata"]["symbol"].as_str().unwrap_or("").to_string();
        let balance = number_text(&entry["balance"]).unwrap_or_else(|| "0".to_string());

        let quote = market_price(package);
        let fiat_price = quote.as_ref().map_or("0", |(_, price)| price.as_str());
        let fiat_balance = token_fiat_amount(&balance, decimals, fiat_price);
        let market_data_provider = quote.as_ref().map(|(provider, _)| *provider);
        let market_data_provider_url = market_data_provider.and_then(|provider| {
            provider.token_url(package["coingecko_id"].as_str(), contract_hash.as_deref())
        });

        Self {
            id: contract_package_hash.clone(),
            contract_package_hash,
            contract_hash,
            network,
            name: package["name"].as_str().unwrap_or("").to_string(),
            is_native: symbol == CSPR_SYMBOL,
            symbol,
            decimals,
            icon_url: package["icon_url"].as_str().map(String::from),
            decimal_balance: decimal_amount(&balance, decimals),
            formatted_decimal_balance: formatted_amount(&balance, decimals),
            balance,
            fiat_price: fiat_price.to_string(),
            formatted_fiat_balance: with_commas(&fiat_balance),
            fiat_balance,
            currency: FIAT_CURRENCY,
            market_data_provider,
            market_data_provider_url,
        }
    }

    /// The native coin as a token entry, holding the liquid balance.
    #[must_use]
    pub fn cspr(network: CasperNetwork, balance: &CsprBalance, rate: &str) -> Self {
        let liquid = &balance.liquid;
        let fiat_balance = token_fiat_amount(&liquid.amount, CSPR_DECIMALS, rate);
        let quoted = !is_zero_text(rate);
        Self {
            id: format!("Cspr-{network}-{}", balance.public_key),
            contract_package_hash: String::new(),
            contract_hash: None,
            network,
            name: "Casper".to_string(),
            symbol: CSPR_SYMBOL.to_string(),
            decimals: CSPR_DECIMALS,
            icon_url: None,
            balance: liquid.amount.clone(),
            decimal_balance: liquid.decimal_amount.clone(),
            formatted_decimal_balance: liquid.formatted_amount.clone(),
            is_native: true,
            fiat_price: if quoted { rate.trim().to_string() } else { "0".to_string() },
            formatted_fiat_balance: with_commas(&fiat_balance),
            fiat_balance,
            currency: FIAT_CURRENCY,
            market_data_provider: None,
            market_data_provider_url: None,
        }
    }
}

// ============================================================================
// CSPR Balance
// ============================================================================

/// One CSPR balance in raw, decimal and display form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceAmount {
    /// Motes.
    pub amount: String,
    pub decimal_amount: String,
    pub formatted_amount: String,
}

impl BalanceAmount {
    fn cspr(amount: String) -> Self {
        Self {
            decimal_amount: decimal_amount(&amount, CSPR_DECIMALS),
            formatted_amount: formatted_amount(&amount, CSPR_DECIMALS),
            amount,
        }
    }
}

/// Liquid, staked and unbonding CSPR of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CsprBalance {
    pub public_key: String,
    pub account_hash: String,
    pub liquid: BalanceAmount,
    pub delegated: BalanceAmount,
    pub undelegating: BalanceAmount,
    /// Sum of the three above.
    pub total: BalanceAmount,
}

impl CsprBalance {
    /// Create from the `data` object of an account response. Absent
    /// balances count as zero.
    #[must_use]
    pub fn from_json(json: &Value) -> Self {
        let amount = |field: &str| number_text(&json[field]).unwrap_or_else(|| "0".to_string());
        let liquid = amount("balance");
        let delegated = amount("delegated_balance");
        let undelegating = amount("undelegating_balance");
        let total = sum_amounts([liquid.as_str(), delegated.as_str(), undelegating.as_str()]);
        Self {
            public_key: json["public_key"].as_str().unwrap_or("").to_string(),
            account_hash: strip_prefix(json["account_hash"].as_str().unwrap_or("")),
            liquid: BalanceAmount::cspr(liquid),
            delegated: BalanceAmount::cspr(delegated),
            undelegating: BalanceAmount::cspr(undelegating),
            total: BalanceAmount::cspr(total),
        }
    }

    /// Balance of an account the network has never seen.
    #[must_use]
    pub fn zero(public_key: &str) -> Self {
        let mut balance = Self::from_json(&Value::Null);
        balance.public_key = public_key.to_string();
        balance
    }
}
