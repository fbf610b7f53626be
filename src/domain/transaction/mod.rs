//! Transaction model for Casper.
//!
//! Both the current transaction format and legacy deploys are normalised into
//! one [`Transaction`] so the signature request core never branches on the
//! wire format.
//!
//! # Module Organization
//!
//! - [`parsing`] - JSON parsing logic for transactions and deploys

use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use serde_json::Value;

use super::cl_value::RuntimeArgs;
use super::keys::strip_prefix;
use super::network::KnownContract;

pub mod parsing;

pub use parsing::parse_ttl;

// ============================================================================
// Entry Point
// ============================================================================

/// Built-in auction (staking) operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuctionOperation {
    AddBid,
    WithdrawBid,
    Delegate,
    Undelegate,
    Redelegate,
    ActivateBid,
    ChangeBidPublicKey,
    AddReservations,
    CancelReservations,
}

impl AuctionOperation {
    pub const ALL: [Self; 9] = [
        Self::AddBid,
        Self::WithdrawBid,
        Self::Delegate,
        Self::Undelegate,
        Self::Redelegate,
        Self::ActivateBid,
        Self::ChangeBidPublicKey,
        Self::AddReservations,
        Self::CancelReservations,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AddBid => "AddBid",
            Self::WithdrawBid => "WithdrawBid",
            Self::Delegate => "Delegate",
            Self::Undelegate => "Undelegate",
            Self::Redelegate => "Redelegate",
            Self::ActivateBid => "ActivateBid",
            Self::ChangeBidPublicKey => "ChangeBidPublicKey",
            Self::AddReservations => "AddReservations",
            Self::CancelReservations => "CancelReservations",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str() == name)
    }
}

/// The operation a transaction invokes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryPoint {
    /// Native token transfer.
    Transfer,
    /// Session code (`call` of module bytes).
    Call,
    /// A named method on a stored contract.
    Custom(String),
    /// A built-in auction operation.
    Auction(AuctionOperation),
    /// Any other built-in operation (e.g. `Burn`).
    Other(String),
}

impl EntryPoint {
    /// Name of a custom entry point.
    #[must_use]
    pub fn custom_name(&self) -> Option<&str> {
        match self {
            Self::Custom(name) => Some(name),
            _ => None,
        }
    }
}

// ============================================================================
// Target
// ============================================================================

/// How a stored contract call addresses its target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredTargetId {
    ByHash(String),
    ByName(String),
    ByPackageHash { addr: String, version: Option<u32> },
    ByPackageName { name: String, version: Option<u32> },
}

impl StoredTargetId {
    #[must_use]
    pub fn contract_hash(&self) -> Option<&str> {
        match self {
            Self::ByHash(hash) => Some(hash),
            _ => None,
        }
    }

    #[must_use]
    pub fn contract_name(&self) -> Option<&str> {
        match self {
            Self::ByName(name) => Some(name),
            _ => None,
        }
    }

    #[must_use]
    pub fn package_hash(&self) -> Option<&str> {
        match self {
            Self::ByPackageHash { addr, .. } => Some(addr),
            _ => None,
        }
    }

    #[must_use]
    pub fn package_name(&self) -> Option<&str> {
        match self {
            Self::ByPackageName { name, .. } => Some(name),
            _ => None,
        }
    }

    /// True when any addressing form names the known contract.
    #[must_use]
    pub fn matches(&self, contract: &KnownContract) -> bool {
        match self {
            Self::ByHash(hash) => hash.eq_ignore_ascii_case(contract.contract_hash),
            Self::ByPackageHash { addr, .. } => addr.eq_ignore_ascii_case(contract.package_hash),
            Self::ByName(name) => name == contract.contract_name,
            Self::ByPackageName { name, .. } => name == contract.package_name,
        }
    }
}

/// What a transaction executes against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Built-in native operations (transfers, auction).
    Native,
    /// A contract already stored on chain.
    Stored(StoredTargetId),
    /// Session code shipped inside the transaction.
    Session { module_bytes: Vec<u8> },
}

// ============================================================================
// Pricing, Initiator, Approvals
// ============================================================================

/// How the transaction pays for execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PricingMode {
    PaymentLimited {
        /// Motes, as an integer string.
        payment_amount: String,
        gas_price_tolerance: u8,
        standard_payment: bool,
    },
    Fixed {
        gas_price_tolerance: u8,
        additional_computation_factor: u8,
    },
    Prepaid {
        receipt: String,
    },
}

/// The account that created the transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitiatorAddr {
    /// Hex public key.
    PublicKey(String),
    /// Bare hex account hash.
    AccountHash(String),
}

impl InitiatorAddr {
    /// The raw key as displayed before resolution.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::PublicKey(key) | Self::AccountHash(key) => key,
        }
    }
}

/// A signature collected on the transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Approval {
    /// Hex public key of the signer.
    pub signer: String,
    pub signature: String,
}

// ============================================================================
// Transaction
// ============================================================================

/// A transaction awaiting signature, normalised from either wire format.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub hash: String,
    pub chain_name: String,
    pub initiator: InitiatorAddr,
    pub timestamp: DateTime<Utc>,
    pub ttl: TimeDelta,
    pub entry_point: EntryPoint,
    pub target: Target,
    pub args: RuntimeArgs,
    pub approvals: Vec<Approval>,
    pub pricing_mode: Option<PricingMode>,
    /// True when parsed from a legacy deploy.
    pub is_legacy_deploy: bool,
    /// The JSON the transaction was parsed from.
    pub raw_json: Value,
}

impl Transaction {
    /// Expiry (`timestamp + ttl`) as ISO-8601 with milliseconds.
    #[must_use]
    pub fn expires(&self) -> String {
        (self.timestamp + self.ttl).to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Pretty-printed echo of the source JSON.
    #[must_use]
    pub fn raw_json_pretty(&self) -> String {
        serde_json::to_string_pretty(&self.raw_json).unwrap_or_else(|_| self.raw_json.to_string())
    }

    /// Session module bytes, if the target is session code.
    #[must_use]
    pub fn module_bytes(&self) -> Option<&[u8]> {
        match &self.target {
            Target::Session { module_bytes } => Some(module_bytes),
            _ => None,
        }
    }

    /// Stored-contract addressing, if the target is a stored contract.
    #[must_use]
    pub fn stored_target(&self) -> Option<&StoredTargetId> {
        match &self.target {
            Target::Stored(id) => Some(id),
            _ => None,
        }
    }

    /// Payment amount when the pricing mode is payment-limited.
    #[must_use]
    pub fn limited_payment_amount(&self) -> Option<&str> {
        match &self.pricing_mode {
            Some(PricingMode::PaymentLimited { payment_amount, .. }) => Some(payment_amount),
            _ => None,
        }
    }

    /// True for a custom call whose stored target names the known contract.
    #[must_use]
    pub fn is_call_to(&self, contract: Option<KnownContract>) -> bool {
        let Some(contract) = contract else {
            return false;
        };
        matches!(self.entry_point, EntryPoint::Custom(_))
            && self.stored_target().is_some_and(|id| id.matches(&contract))
    }

    /// Bare contract package hash of the stored target, if addressed by one.
    #[must_use]
    pub fn target_package_hash(&self) -> Option<String> {
        self.stored_target()
            .and_then(StoredTargetId::package_hash)
            .map(strip_prefix)
    }

    /// Bare contract hash of the stored target, if addressed by one.
    #[must_use]
    pub fn target_contract_hash(&self) -> Option<String> {
        self.stored_target()
            .and_then(StoredTargetId::contract_hash)
            .map(strip_prefix)
    }
}
