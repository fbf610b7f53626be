//! Staking operations: delegation, bids and reservations.

use super::{BuildContext, amount_arg, entry_point_is};
use crate::domain::cl_value::{CLValue, RuntimeArgs};
use crate::domain::account::AccountInfo;
use crate::domain::keys::{AccountKeyType, derive_key_type};
use crate::domain::transaction::EntryPoint;
use crate::signature_request::action::{Action, AuctionAction, TokenAmount, identity_parts};

/// Builds the auction action for a native auction operation or a custom
/// call into the auction contract.
#[must_use]
pub fn build(ctx: &BuildContext<'_>) -> Action {
    let args = ctx.args();
    let entry_point = auction_entry_point(&ctx.tx.entry_point);

    let from_validator = if entry_point_is(&entry_point, &["undelegate", "redelegate"]) {
        public_key_arg(args, "validator")
    } else {
        None
    };
    let (from_validator, from_validator_key_type, from_validator_account_info) =
        resolve_validator(ctx, from_validator);

    let to_validator = if args.contains("new_validator") {
        public_key_arg(args, "new_validator")
    } else if entry_point.eq_ignore_ascii_case("undelegate") {
        Some(ctx.signing_key.to_string())
    } else {
        public_key_arg(args, "validator")
    };
    let (to_validator, to_validator_key_type, to_validator_account_info) =
        resolve_validator(ctx, to_validator);

    Action::Auction(AuctionAction {
        entry_point,
        from_validator,
        from_validator_key_type,
        from_validator_account_info,
        to_validator,
        to_validator_key_type,
        to_validator_account_info,
        amount: TokenAmount::cspr(amount_arg(args), ctx.fiat_rate()),
        contract: ctx.contract_info(),
    })
}

/// Resolves a validator key; an absent key stays `None` and is typed as an
/// account hash.
fn resolve_validator(
    ctx: &BuildContext<'_>,
    key: Option<String>,
) -> (Option<String>, AccountKeyType, Option<AccountInfo>) {
    let key_type = derive_key_type(key.as_deref().unwrap_or_default());
    match key {
        Some(key) => {
            let (key, key_type, info) = identity_parts(ctx.resolve(&key, key_type));
            (Some(key), key_type, info)
        }
        None => (None, key_type, None),
    }
}

fn auction_entry_point(entry_point: &EntryPoint) -> String {
    match entry_point {
        EntryPoint::Auction(op) => op.as_str().to_string(),
        EntryPoint::Custom(name) => name.clone(),
        _ => String::new(),
    }
}

fn public_key_arg(args: &RuntimeArgs, name: &str) -> Option<String> {
    match args.get(name) {
        Some(CLValue::PublicKey(key)) => Some(key.to_hex()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::AccountInfoMap;
    use crate::domain::keys::{AccountKeyType, PublicKey};
    use crate::domain::transaction::AuctionOperation;
    use crate::signature_request::classifier::Enrichment;
    use crate::test_utils::{AccountInfoMother, TransactionMother};
    use rstest::rstest;

    const SIGNER: &str = "01deba7173738a7f55de3ad9dc27e081df41ff285f25887ec424a8a65b43d0cf77";
    const VALIDATOR: &str = "0106ca7c39cd272dbf21a86eeb3b36b7c26e2e9b94af64292419f7862936bca2ca";
    const NEW_VALIDATOR: &str = "02035dd4c9d9d49d1d11dc1c1c2d4bb23f5ef8e36b4c8b8e2d7b3e56e5d4c3b2a190";

    fn auction_action(tx: &crate::domain::transaction::Transaction, enrichment: &Enrichment) -> AuctionAction {
        match build(&BuildContext::new(tx, enrichment, SIGNER)) {
            Action::Auction(action) => action,
            other => panic!("Expected auction action, got {other:?}"),
        }
    }

    fn staking(op: AuctionOperation, args: RuntimeArgs) -> crate::domain::transaction::Transaction {
        let mut tx = TransactionMother::auction(op);
        tx.args = args;
        tx
    }

    fn validator(hex: &str) -> CLValue {
        CLValue::PublicKey(PublicKey::from_hex(hex).unwrap())
    }

    #[test]
    fn test_delegate_targets_validator() {
        let tx = staking(
            AuctionOperation::Delegate,
            RuntimeArgs::new()
                .with("validator", validator(VALIDATOR))
                .with("amount", CLValue::U512(500_000_000_000u64.into())),
        );
        let action = auction_action(&tx, &Enrichment::default());
        assert_eq!(action.entry_point, "Delegate");
        assert_eq!(action.from_validator, None);
        assert_eq!(action.to_validator.as_deref(), Some(VALIDATOR));
        assert_eq!(action.to_validator_key_type, AccountKeyType::PublicKey);
        assert_eq!(action.amount.decimal_amount, "500");
    }

    #[test]
    fn test_undelegate_returns_to_signer() {
        let tx = staking(
            AuctionOperation::Undelegate,
            RuntimeArgs::new().with("validator", validator(VALIDATOR)),
        );
        let action = auction_action(&tx, &Enrichment::default());
        assert_eq!(action.from_validator.as_deref(), Some(VALIDATOR));
        assert_eq!(action.to_validator.as_deref(), Some(SIGNER));
        assert_eq!(action.amount.amount, "0");
    }

    #[test]
    fn test_redelegate_moves_between_validators() {
        let tx = staking(
            AuctionOperation::Redelegate,
            RuntimeArgs::new()
                .with("validator", validator(VALIDATOR))
                .with("new_validator", validator(NEW_VALIDATOR)),
        );
        let action = auction_action(&tx, &Enrichment::default());
        assert_eq!(action.from_validator.as_deref(), Some(VALIDATOR));
        assert_eq!(action.to_validator.as_deref(), Some(NEW_VALIDATOR));
    }

    #[rstest]
    #[case::new_validator_not_a_key("new_validator")]
    #[case::validator_not_a_key("validator")]
    fn test_mistyped_validator_is_absent(#[case] name: &str) {
        let tx = staking(
            AuctionOperation::Delegate,
            RuntimeArgs::new().with(name, CLValue::String(VALIDATOR.to_string())),
        );
        let action = auction_action(&tx, &Enrichment::default());
        assert_eq!(action.to_validator, None);
        assert_eq!(action.to_validator_key_type, AccountKeyType::AccountHash);
        assert!(serde_json::to_value(&action).unwrap()["toValidator"].is_null());
        assert!(Action::Auction(action).referenced_keys().is_empty());
    }

    #[test]
    fn test_validator_identity_is_resolved() {
        let tx = staking(
            AuctionOperation::Delegate,
            RuntimeArgs::new().with("validator", validator(VALIDATOR)),
        );
        let enrichment = Enrichment {
            accounts: [AccountInfoMother::with_public_key(VALIDATOR, "Validator One")]
                .into_iter()
                .collect::<AccountInfoMap>(),
            ..Enrichment::default()
        };
        let action = auction_action(&tx, &enrichment);
        assert_eq!(
            action.to_validator_account_info.map(|info| info.name),
            Some("Validator One".to_string())
        );
    }

    #[test]
    fn test_custom_call_uses_custom_entry_point() {
        let auction = crate::domain::network::CasperNetwork::Testnet
            .auction_manager()
            .unwrap();
        let mut tx = TransactionMother::custom_by_hash("undelegate", auction.contract_hash);
        tx.args = RuntimeArgs::new().with("validator", validator(VALIDATOR));
        let action = auction_action(&tx, &Enrichment::default());
        assert_eq!(action.entry_point, "undelegate");
        assert_eq!(action.to_validator.as_deref(), Some(SIGNER));
        assert_eq!(action.contract.contract_hash.as_deref(), Some(auction.contract_hash));
    }
}
