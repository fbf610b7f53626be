//! Native CSPR transfers.

use super::BuildContext;
use crate::domain::cl_value::CLValue;
use crate::domain::error::SignatureRequestError;
use crate::domain::keys::AccountKeyType;
use crate::signature_request::action::{Action, NativeCsprAction, TokenAmount, identity_parts};

/// Builds the native transfer action.
///
/// # Errors
///
/// Returns `SignatureRequestError::InvalidSignatureRequest` when the
/// `target` or `amount` argument is missing or of an unexpected type. A
/// transfer without a resolvable recipient or amount is never presented.
pub fn build(ctx: &BuildContext<'_>) -> Result<Action, SignatureRequestError> {
    let args = ctx.args();

    let (recipient_key, recipient_key_type) = match args.get("target") {
        None => {
            return Err(SignatureRequestError::invalid(
                "Couldn't find 'target' in transfer data",
            ));
        }
        Some(CLValue::ByteArray(bytes)) => (hex::encode(bytes), AccountKeyType::AccountHash),
        Some(CLValue::PublicKey(public_key)) => (public_key.to_hex(), AccountKeyType::PublicKey),
        Some(_) => {
            return Err(SignatureRequestError::invalid(
                "Target from tx was neither AccountHash or PublicKey",
            ));
        }
    };

    let amount = match args.get("amount") {
        None => {
            return Err(SignatureRequestError::invalid(
                "Couldn't find 'amount' in transfer data",
            ));
        }
        Some(value) => value
            .integer_string()
            .ok_or_else(|| SignatureRequestError::invalid("Amount from tx was not an integer"))?,
    };

    let (recipient_key, recipient_key_type, recipient_account_info) =
        identity_parts(ctx.resolve(&recipient_key, recipient_key_type));

    Ok(Action::NativeCspr(NativeCsprAction {
        recipient_key,
        recipient_key_type,
        recipient_account_info,
        amount: TokenAmount::cspr(amount, ctx.fiat_rate()),
    }))
}
