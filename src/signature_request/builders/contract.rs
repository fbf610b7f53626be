//! Contract calls shown by identity only, or argument by argument.

use super::BuildContext;
use crate::signature_request::action::{Action, AssociatedKeysAction, UnknownContractAction};
use crate::signature_request::args::decode_arguments;

/// A call into the associated-keys manager. Only the contract is shown.
#[must_use]
pub fn build_associated_keys(ctx: &BuildContext<'_>) -> Action {
    Action::AssociatedKeys(AssociatedKeysAction {
        contract: ctx.contract_info(),
    })
}

/// A call whose intent is not understood; every argument is decoded.
#[must_use]
pub fn build_unknown(ctx: &BuildContext<'_>) -> Action {
    Action::Unknown(UnknownContractAction {
        entry_point: ctx.custom_entry_point(),
        icon_url: ctx.icon_url(),
        args: decode_arguments(ctx.args(), ctx.accounts(), ctx.chain_name()),
        contract: ctx.contract_info(),
    })
}
