//! Domain types for the Casper wallet core.
//!
//! This module contains the value types the signature request core is built
//! from: networks, keys, typed argument values, transactions, amounts, and
//! the account and contract metadata used for display. It also holds the
//! records the wallet lists for an account: tokens, NFTs, validators and
//! deploy history.
//!
//! # Module Organization
//!
//! - [`error`] - Error enums, one per concern
//! - [`network`] - Networks, endpoints and well-known contracts
//! - [`keys`] - Public keys, account hashes, URefs and prefixed identifiers
//! - [`explorer`] - Block explorer links
//! - [`cl_value`] - Typed values and named argument sets
//! - [`transaction`] - Transaction model and JSON parsing
//! - [`amount`] - Token amount formatting and fiat conversion
//! - [`account`] - Account display identities and the lookup cache
//! - [`contract_package`] - Contract package metadata
//! - [`token`] - Fungible token holdings and CSPR balances
//! - [`nft`] - Owned NFTs and their metadata
//! - [`validator`] - Validators and delegated stakes
//! - [`history`] - Deploy, transfer and token action history
//! - [`app_event`] - Release and marketing announcements
//! - [`page`] - Paginated listings

// ============================================================================
// Module Declarations
// ============================================================================

pub mod account;
pub mod amount;
pub mod app_event;
pub mod cl_value;
pub mod contract_package;
pub mod error;
pub mod explorer;
pub mod history;
pub mod keys;
pub mod network;
pub mod nft;
pub mod page;
pub mod token;
pub mod transaction;
pub mod validator;

// ============================================================================
// Re-exports
// ============================================================================

// Error types
pub use error::{
    ClValueError, ClientError, ConfigError, KeyError, SignatureRequestError, TransactionParseError,
};

// Network types
pub use network::{CasperNetwork, KnownContract};

// Key types
pub use keys::{AccountHash, AccountKeyType, PublicKey, URef};

// Typed values
pub use cl_value::{ArgValue, CLType, CLValue, EntityAddr, EntityKind, Key, NamedArg, RuntimeArgs};

// Transaction types
pub use transaction::{
    Approval, AuctionOperation, EntryPoint, InitiatorAddr, PricingMode, StoredTargetId, Target,
    Transaction,
};

// Metadata types
pub use account::{AccountInfo, AccountInfoMap, AssociatedKey, ResolvedIdentity, RpcAccountInfo};
pub use contract_package::{ContractPackageInfo, ContractTypeId};

// Wallet data types
pub use app_event::{AppEnv, AppMarketingEvent, AppReleaseEvent};
pub use history::{
    AccountReferences, DeployKind, DeployRecord, DeployStatus, Party, TokenActionRecord,
    TransferRecord,
};
pub use nft::{Nft, NftMetadataEntry};
pub use page::Page;
pub use token::{BalanceAmount, CsprBalance, MarketDataProvider, Token};
pub use validator::Validator;
