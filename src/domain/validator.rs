//! Validators, with the account's stake when listed through its delegations.

use serde::Serialize;
use serde_json::Value;

use super::amount::{CSPR_DECIMALS, decimal_amount, formatted_amount, formatted_whole_amount, number_text};

/// Characters kept on each side of a shortened key.
const SHORT_KEY_EDGE: usize = 5;

/// A validator as offered for delegation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Validator {
    pub id: String,
    pub public_key: String,
    /// Owner name, or the shortened public key.
    pub name: String,
    pub delegators_number: u64,
    /// Motes.
    pub total_stake: String,
    /// Whole CSPR with thousands separators.
    pub formatted_total_stake: String,
    /// The account's own delegation, when listed through its delegations.
    pub stake: Option<String>,
    pub decimal_stake: Option<String>,
    pub formatted_decimal_stake: Option<String>,
    /// Delegation fee in percent.
    pub fee: String,
    pub svg_logo: Option<String>,
    pub img_logo: Option<String>,
}

impl Validator {
    /// Create from one entry of the `validators` listing.
    #[must_use]
    pub fn from_json(json: &Value) -> Self {
        Self::build(json, &json["account_info"], None)
    }

    /// Create from one entry of an account's `delegations` listing, where
    /// validator figures sit under `bidder`.
    #[must_use]
    pub fn from_delegation_json(json: &Value) -> Self {
        let stake = number_text(&json["stake"]);
        Self::build(&json["bidder"], &json["validator_account_info"], stake)
    }

    fn build(bid: &Value, account_info: &Value, stake: Option<String>) -> Self {
        let public_key = bid["public_key"].as_str().unwrap_or("").to_string();
        let owner = &account_info["info"]["owner"];
        let logo = &owner["branding"]["logo"];
        let total_stake = number_text(&bid["total_stake"]).unwrap_or_else(|| "0".to_string());

        Self {
            id: public_key.clone(),
            name: owner["name"]
                .as_str()
                .filter(|name| !name.is_empty())
                .map_or_else(|| short_key(&public_key), String::from),
            delegators_number: bid["delegators_number"].as_u64().unwrap_or(0),
            formatted_total_stake: formatted_whole_amount(&total_stake, CSPR_DECIMALS),
            total_stake,
            decimal_stake: stake.as_deref().map(|s| decimal_amount(s, CSPR_DECIMALS)),
            formatted_decimal_stake: stake.as_deref().map(|s| formatted_amount(s, CSPR_DECIMALS)),
            stake,
            fee: number_text(&bid["fee"]).unwrap_or_else(|| "0".to_string()),
            svg_logo: logo["svg"].as_str().map(String::from),
            img_logo: logo["png_256"]
                .as_str()
                .or_else(|| logo["png_1024"].as_str())
                .map(String::from),
            public_key,
        }
    }
}

/// `01a2b3...x8y9z` style abbreviation; short keys are kept whole.
#[must_use]
pub fn short_key(key: &str) -> String {
    if key.len() <= SHORT_KEY_EDGE * 2 + 3 || !key.is_ascii() {
        return key.to_string();
    }
    format!("{}...{}", &key[..SHORT_KEY_EDGE], &key[key.len() - SHORT_KEY_EDGE..])
}
