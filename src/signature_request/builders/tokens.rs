//! Token contracts: CEP-18 fungible tokens, NFT collections and CSPR.market.

use std::collections::BTreeMap;

use super::{BuildContext, account_key_data, amount_arg, entry_point_is, first_account_key};
use crate::domain::cl_value::{CLValue, RuntimeArgs};
use crate::domain::explorer;
use crate::domain::keys::AccountKeyType;
use crate::signature_request::action::{
    Action, CasperMarketAction, Cep18Action, NftAction, NftTokens, TokenAmount, identity_parts,
};

/// Decimals assumed for a fungible token whose package is unknown.
pub const DEFAULT_TOKEN_DECIMALS: u32 = 18;

const CEP18_RECIPIENT_ARGS: [&str; 3] = ["recipient", "owner", "spender"];

const NFT_RECIPIENT_ARGS: [&str; 7] = [
    "recipient",
    "token_owner",
    "spender",
    "owner",
    "target_key",
    "source_key",
    "operator",
];

const NFT_COUNTLESS_ENTRY_POINTS: [&str; 2] = ["approve", "update_token_meta"];
const MARKET_COUNTLESS_ENTRY_POINTS: [&str; 2] = ["list_token", "delist_token"];

// ============================================================================
// CEP-18
// ============================================================================

/// Builds a fungible-token action.
#[must_use]
pub fn build_cep18(ctx: &BuildContext<'_>) -> Action {
    let args = ctx.args();
    let package = ctx.contract_package();
    let decimals = package
        .and_then(|package| package.decimals)
        .unwrap_or(DEFAULT_TOKEN_DECIMALS);
    let symbol = package
        .and_then(|package| package.symbol.clone())
        .unwrap_or_default();

    let (key, key_type) = first_account_key(args, &CEP18_RECIPIENT_ARGS);
    let (recipient_key, recipient_key_type, recipient_account_info) =
        identity_parts(ctx.resolve(&key, key_type));

    Action::Cep18(Cep18Action {
        entry_point: ctx.custom_entry_point(),
        recipient_key,
        recipient_key_type,
        recipient_account_info,
        amount: TokenAmount::token(amount_arg(args), decimals, symbol),
        icon_url: ctx.icon_url(),
        contract: ctx.contract_info(),
    })
}

// ============================================================================
// NFT
// ============================================================================

/// Builds an NFT collection action.
#[must_use]
pub fn build_nft(ctx: &BuildContext<'_>) -> Action {
    let entry_point = ctx.custom_entry_point();

    let (key, key_type) = first_account_key(ctx.args(), &NFT_RECIPIENT_ARGS);
    let (recipient_key, recipient_key_type, recipient_account_info) =
        identity_parts(ctx.resolve(&key, key_type));

    Action::Nft(NftAction {
        tokens: nft_tokens(ctx, &entry_point, &NFT_COUNTLESS_ENTRY_POINTS),
        entry_point,
        recipient_key,
        recipient_key_type,
        recipient_account_info,
        icon_url: ctx.icon_url(),
        contract: ctx.contract_info(),
    })
}

// ============================================================================
// CSPR.market
// ============================================================================

/// Builds a marketplace action. Prices are always in CSPR.
#[must_use]
pub fn build_market(ctx: &BuildContext<'_>) -> Action {
    let args = ctx.args();
    let entry_point = ctx.custom_entry_point();

    let (key, key_type) = first_account_key(args, &["offerer"]);
    let (offerer_hash, offerer_hash_type, offerer_account_info) =
        identity_parts(ctx.resolve(&key, key_type));

    Action::CasperMarket(CasperMarketAction {
        tokens: nft_tokens(ctx, &entry_point, &MARKET_COUNTLESS_ENTRY_POINTS),
        entry_point,
        offerer_hash,
        offerer_hash_type,
        offerer_account_info,
        amount: TokenAmount::cspr(amount_arg(args), ctx.fiat_rate()),
        icon_url: ctx.icon_url(),
        contract: ctx.contract_info(),
    })
}

// ============================================================================
// Shared NFT Extraction
// ============================================================================

fn nft_tokens(ctx: &BuildContext<'_>, entry_point: &str, countless: &[&str]) -> NftTokens {
    let args = ctx.args();
    let collection_hash = collection_hash(args);
    let nft_token_ids = token_ids(args);
    let nft_token_urls_map = nft_token_ids
        .iter()
        .map(|id| {
            (
                id.clone(),
                explorer::nft_token_url(ctx.chain_name(), &collection_hash, id),
            )
        })
        .collect::<BTreeMap<_, _>>();

    let amount_of_nfts = if !entry_point.is_empty() && entry_point_is(entry_point, countless) {
        None
    } else {
        token_count(args)
    };

    NftTokens {
        collection_name: ctx
            .enrichment
            .collection_package
            .as_ref()
            .map(|package| package.name.clone()),
        collection_hash,
        nft_token_ids,
        nft_token_urls_map,
        amount_of_nfts,
    }
}

/// Contract hash named by a `collection` key argument, or empty.
fn collection_hash(args: &RuntimeArgs) -> String {
    match account_key_data(args.get("collection")) {
        Some((hash, AccountKeyType::ContractHash)) => hash,
        _ => String::new(),
    }
}

/// Token ids from `token_ids`, `tokens` and `token_id`, deduplicated in
/// first-seen order.
fn token_ids(args: &RuntimeArgs) -> Vec<String> {
    let listed = ["token_ids", "tokens"]
        .iter()
        .filter_map(|name| match args.get(name) {
            Some(CLValue::List { items, .. }) => Some(items.iter().map(ToString::to_string)),
            _ => None,
        })
        .flatten();
    let single = args
        .get("token_id")
        .and_then(CLValue::unwrap_option)
        .map(ToString::to_string);

    let mut ids: Vec<String> = Vec::new();
    for id in listed.chain(single) {
        if !id.is_empty() && !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}

/// Number of tokens an NFT call touches, when it can be told.
fn token_count(args: &RuntimeArgs) -> Option<usize> {
    let listed = ["token_ids", "token_metas", "tokens"]
        .iter()
        .find_map(|name| match args.get(name) {
            Some(CLValue::List { items, .. }) => Some(items.len()),
            _ => None,
        });
    if listed.is_some() {
        return listed;
    }
    (args.contains("token_meta_data") || args.contains("token_id")).then_some(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cl_value::{CLType, Key};
    use crate::domain::contract_package::{ContractPackageInfo, ContractTypeId};
    use crate::domain::keys::AccountHash;
    use crate::domain::transaction::Transaction;
    use crate::signature_request::classifier::Enrichment;
    use crate::test_utils::{ContractPackageMother, TransactionMother};
    use insta::assert_json_snapshot;
    use rstest::rstest;

    fn call(entry_point: &str, args: RuntimeArgs) -> Transaction {
        let mut tx = TransactionMother::custom_by_hash(entry_point, &"ab".repeat(32));
        tx.args = args;
        tx
    }

    fn account(byte: u8) -> CLValue {
        CLValue::Key(Key::Account(AccountHash([byte; 32])))
    }

    fn string_list(ids: &[&str]) -> CLValue {
        CLValue::List {
            item_type: CLType::String,
            items: ids.iter().map(|id| CLValue::String((*id).to_string())).collect(),
        }
    }

    fn build_with(builder: fn(&BuildContext<'_>) -> Action, tx: &Transaction, enrichment: &Enrichment) -> Action {
        builder(&BuildContext::new(tx, enrichment, ""))
    }

    #[test]
    fn test_cep18_transfer() {
        let tx = call(
            "transfer",
            RuntimeArgs::new()
                .with("recipient", account(0xaa))
                .with("amount", CLValue::U256(500_000_000_000u64.into())),
        );
        let enrichment = Enrichment {
            contract_package: Some(ContractPackageMother::cep18(&"cd".repeat(32), "Token", "TOKEN", 9)),
            ..Enrichment::default()
        };
        let Action::Cep18(action) = build_with(build_cep18, &tx, &enrichment) else {
            panic!("Expected CEP-18 action");
        };
        assert_eq!(action.entry_point, "transfer");
        assert_eq!(action.recipient_key, "aa".repeat(32));
        assert_eq!(action.recipient_key_type, AccountKeyType::AccountHash);
        assert_eq!(action.amount.decimal_amount, "500");
        assert_eq!(action.amount.symbol, "TOKEN");
        assert_eq!(action.amount.fiat_amount, "");
    }

    #[test]
    fn test_cep18_defaults_without_package() {
        let tx = call(
            "approve",
            RuntimeArgs::new()
                .with("spender", CLValue::Key(Key::Hash([0x11; 32])))
                .with("owner", account(0x22)),
        );
        let Action::Cep18(action) = build_with(build_cep18, &tx, &Enrichment::default()) else {
            panic!("Expected CEP-18 action");
        };
        assert_eq!(action.amount.decimals, DEFAULT_TOKEN_DECIMALS);
        assert_eq!(action.amount.symbol, "");
        assert_eq!(action.amount.amount, "0");
        assert_eq!(action.recipient_key, "22".repeat(32));
        assert_eq!(action.icon_url, None);
    }

    #[rstest]
    #[case::recipient_first(&["recipient", "token_owner"], "recipient")]
    #[case::token_owner_before_spender(&["spender", "token_owner"], "token_owner")]
    #[case::spender_before_owner(&["owner", "spender"], "spender")]
    #[case::operator_last(&["operator", "source_key"], "source_key")]
    fn test_nft_recipient_priority(#[case] present: &[&str], #[case] expected: &str) {
        let mut args = RuntimeArgs::new();
        for (index, name) in present.iter().enumerate() {
            args = args.with(*name, account(u8::try_from(index).unwrap() + 1));
        }
        let expected_byte = u8::try_from(present.iter().position(|name| *name == expected).unwrap()).unwrap() + 1;

        let Action::Nft(action) = build_with(build_nft, &call("transfer", args), &Enrichment::default()) else {
            panic!("Expected NFT action");
        };
        assert_eq!(action.recipient_key, hex::encode([expected_byte; 32]));
    }

    #[test]
    fn test_nft_token_ids_are_deduplicated() {
        let tx = call(
            "burn",
            RuntimeArgs::new()
                .with("token_ids", string_list(&["7", "8"]))
                .with("tokens", string_list(&["8", "9"]))
                .with("token_id", CLValue::U64(7)),
        );
        let Action::Nft(action) = build_with(build_nft, &tx, &Enrichment::default()) else {
            panic!("Expected NFT action");
        };
        assert_eq!(action.tokens.nft_token_ids, vec!["7", "8", "9"]);
        assert_eq!(action.tokens.amount_of_nfts, Some(2));
    }

    #[rstest]
    #[case::approve("approve", None)]
    #[case::update_meta("update_token_meta", None)]
    #[case::transfer("transfer", Some(1))]
    fn test_nft_count_suppressed_for_countless_entry_points(
        #[case] entry_point: &str,
        #[case] expected: Option<usize>,
    ) {
        let tx = call(entry_point, RuntimeArgs::new().with("token_id", CLValue::U64(3)));
        let Action::Nft(action) = build_with(build_nft, &tx, &Enrichment::default()) else {
            panic!("Expected NFT action");
        };
        assert_eq!(action.tokens.amount_of_nfts, expected);
    }

    #[test]
    fn test_nft_without_token_args_has_no_count() {
        let tx = call("set_approval_for_all", RuntimeArgs::new().with("operator", account(1)));
        let Action::Nft(action) = build_with(build_nft, &tx, &Enrichment::default()) else {
            panic!("Expected NFT action");
        };
        assert_eq!(action.tokens.amount_of_nfts, None);
        assert!(action.tokens.nft_token_ids.is_empty());
    }

    #[test]
    fn test_market_listing() {
        let tx = call(
            "list_token",
            RuntimeArgs::new()
                .with("offerer", account(0x33))
                .with("collection", CLValue::Key(Key::Hash([0x44; 32])))
                .with("token_id", CLValue::String("12".to_string()))
                .with("amount", CLValue::U512(2_500_000_000u64.into())),
        );
        let enrichment = Enrichment {
            cspr_fiat_rate: "0.02".to_string(),
            collection_package: Some(ContractPackageInfo {
                name: "Casper Punks".to_string(),
                contract_type: Some(ContractTypeId::Cep78Nft),
                ..ContractPackageInfo::default()
            }),
            ..Enrichment::default()
        };

        let action = build_with(build_market, &tx, &enrichment);
        assert_eq!(action.collection_hash(), Some("44".repeat(32).as_str()));
        assert_json_snapshot!(action, {
            ".offererHash" => "[hash]",
            ".collectionHash" => "[hash]",
            ".contractHash" => "[hash]",
            ".contractLink" => "[link]",
            ".nftTokenUrlsMap.*" => "[link]",
        }, @r#"
        {
          "type": "CSPR_MARKET",
          "entryPoint": "list_token",
          "offererHash": "[hash]",
          "offererHashType": "accountHash",
          "offererAccountInfo": null,
          "amount": "2500000000",
          "decimalAmount": "2.5",
          "formattedDecimalAmount": "2.5",
          "fiatAmount": "0.05",
          "decimals": 9,
          "symbol": "CSPR",
          "collectionHash": "[hash]",
          "collectionName": "Casper Punks",
          "nftTokenIds": [
            "12"
          ],
          "nftTokenUrlsMap": {
            "12": "[link]"
          },
          "amountOfNFTs": null,
          "iconUrl": null,
          "contractPackageHash": null,
          "contractHash": "[hash]",
          "contractName": "",
          "contractLink": "[link]"
        }
        "#);
    }

    #[test]
    fn test_market_collection_must_be_a_contract() {
        let tx = call("buy_token", RuntimeArgs::new().with("collection", account(0x55)));
        let Action::CasperMarket(action) = build_with(build_market, &tx, &Enrichment::default()) else {
            panic!("Expected market action");
        };
        assert_eq!(action.tokens.collection_hash, "");
        assert_eq!(action.amount.amount, "0");
        assert_eq!(action.offerer_hash, "");
    }
}
