//! Typed values carried in transaction arguments.
//!
//! A typed value is a [`CLType`] descriptor plus a payload in the canonical
//! binary encoding. This module models both halves and the ordered
//! named-argument set built from them.
//!
//! # Module Organization
//!
//! - [`bytesrepr`] - Cursor over the binary encoding
//! - [`parsing`] - Type descriptors from JSON/binary, values from bytes
//! - [`args`] - Named argument sets

use std::fmt;

use num_bigint::BigUint;

use super::keys::{AccountHash, PublicKey, URef};

pub mod args;
pub mod bytesrepr;
pub mod parsing;

pub use args::{ArgValue, NamedArg, RuntimeArgs};
pub use bytesrepr::ByteReader;

// ============================================================================
// CLType
// ============================================================================

/// Type descriptor of a typed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CLType {
    Bool,
    I32,
    I64,
    U8,
    U32,
    U64,
    U128,
    U256,
    U512,
    Unit,
    String,
    Key,
    URef,
    PublicKey,
    Option(Box<CLType>),
    List(Box<CLType>),
    ByteArray(u32),
    Result { ok: Box<CLType>, err: Box<CLType> },
    Map { key: Box<CLType>, value: Box<CLType> },
    Tuple1(Box<CLType>),
    Tuple2(Box<CLType>, Box<CLType>),
    Tuple3(Box<CLType>, Box<CLType>, Box<CLType>),
    Any,
}

impl CLType {
    /// True for every fixed-width and big integer type.
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(
            self,
            Self::I32 | Self::I64 | Self::U8 | Self::U32 | Self::U64 | Self::U128 | Self::U256 | Self::U512
        )
    }

    /// Smallest number of bytes a value of this type can occupy.
    #[must_use]
    pub fn min_encoded_len(&self) -> usize {
        match self {
            Self::Unit | Self::Any => 0,
            Self::Bool | Self::U8 | Self::Key | Self::PublicKey | Self::Option(_) | Self::Result { .. } => 1,
            Self::U128 | Self::U256 | Self::U512 => 1,
            Self::I32 | Self::U32 | Self::String | Self::List(_) | Self::Map { .. } => 4,
            Self::I64 | Self::U64 => 8,
            Self::URef => 33,
            Self::ByteArray(length) => *length as usize,
            Self::Tuple1(a) => a.min_encoded_len(),
            Self::Tuple2(a, b) => a.min_encoded_len() + b.min_encoded_len(),
            Self::Tuple3(a, b, c) => a.min_encoded_len() + b.min_encoded_len() + c.min_encoded_len(),
        }
    }
}

impl fmt::Display for CLType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => write!(f, "Bool"),
            Self::I32 => write!(f, "I32"),
            Self::I64 => write!(f, "I64"),
            Self::U8 => write!(f, "U8"),
            Self::U32 => write!(f, "U32"),
            Self::U64 => write!(f, "U64"),
            Self::U128 => write!(f, "U128"),
            Self::U256 => write!(f, "U256"),
            Self::U512 => write!(f, "U512"),
            Self::Unit => write!(f, "Unit"),
            Self::String => write!(f, "String"),
            Self::Key => write!(f, "Key"),
            Self::URef => write!(f, "URef"),
            Self::PublicKey => write!(f, "PublicKey"),
            Self::Any => write!(f, "Any"),
            Self::Option(inner) => write!(f, "Option({inner})"),
            Self::List(inner) => write!(f, "List({inner})"),
            Self::ByteArray(length) => write!(f, "ByteArray({length})"),
            Self::Result { ok, err } => write!(f, "Result(Ok:{ok}, Err:{err})"),
            Self::Map { key, value } => write!(f, "Map({key}, {value})"),
            Self::Tuple1(a) => write!(f, "Tuple1({a})"),
            Self::Tuple2(a, b) => write!(f, "Tuple2({a}, {b})"),
            Self::Tuple3(a, b, c) => write!(f, "Tuple3({a}, {b}, {c})"),
        }
    }
}

// ============================================================================
// Key
// ============================================================================

/// Global-state key variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Account(AccountHash),
    Hash([u8; 32]),
    URef(URef),
    Transfer([u8; 32]),
    DeployInfo([u8; 32]),
    EraInfo(u64),
    Balance([u8; 32]),
    Bid([u8; 32]),
    Withdraw([u8; 32]),
    Dictionary([u8; 32]),
    SystemContractRegistry([u8; 32]),
    EraSummary([u8; 32]),
    Unbond([u8; 32]),
    ChainspecRegistry([u8; 32]),
    ChecksumRegistry([u8; 32]),
    Package([u8; 32]),
    AddressableEntity(EntityAddr),
    State(EntityAddr),
    /// Any other variant, as its tag and the raw bytes that follow it.
    Other { tag: u8, bytes: Vec<u8> },
}

impl Key {
    /// Prefixed textual form, e.g. `account-hash-<hex>` or `era-42`.
    #[must_use]
    pub fn to_formatted_string(&self) -> String {
        match self {
            Self::Account(hash) => hash.to_formatted_string(),
            Self::Hash(addr) => format!("hash-{}", hex::encode(addr)),
            Self::URef(uref) => uref.to_formatted_string(),
            Self::Transfer(addr) => format!("transfer-{}", hex::encode(addr)),
            Self::DeployInfo(addr) => format!("deploy-{}", hex::encode(addr)),
            Self::EraInfo(era) => format!("era-{era}"),
            Self::Balance(addr) => format!("balance-{}", hex::encode(addr)),
            Self::Bid(addr) => format!("bid-{}", hex::encode(addr)),
            Self::Withdraw(addr) => format!("withdraw-{}", hex::encode(addr)),
            Self::Dictionary(addr) => format!("dictionary-{}", hex::encode(addr)),
            Self::SystemContractRegistry(addr) => {
                format!("system-contract-registry-{}", hex::encode(addr))
            }
            Self::EraSummary(addr) => format!("era-summary-{}", hex::encode(addr)),
            Self::Unbond(addr) => format!("unbond-{}", hex::encode(addr)),
            Self::ChainspecRegistry(addr) => format!("chainspec-registry-{}", hex::encode(addr)),
            Self::ChecksumRegistry(addr) => format!("checksum-registry-{}", hex::encode(addr)),
            Self::Package(addr) => format!("package-{}", hex::encode(addr)),
            Self::AddressableEntity(entity) => entity.to_formatted_string(),
            Self::State(entity) => format!("entity-state-{}", entity.formatted_suffix()),
            Self::Other { tag, bytes } => match other_key_prefix(*tag) {
                Some(prefix) => format!("{prefix}-{}", hex::encode(bytes)),
                None => format!("key-{tag}-{}", hex::encode(bytes)),
            },
        }
    }
}

const fn other_key_prefix(tag: u8) -> Option<&'static str> {
    match tag {
        15 => Some("bid-addr"),
        18 => Some("byte-code"),
        19 => Some("message"),
        20 => Some("named-key"),
        21 => Some("block-global"),
        22 => Some("balance-hold"),
        23 => Some("entry-point"),
        _ => None,
    }
}

/// What an addressable entity is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    System,
    Account,
    SmartContract,
}

impl EntityKind {
    #[must_use]
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::System),
            1 => Some(Self::Account),
            2 => Some(Self::SmartContract),
            _ => None,
        }
    }

    #[must_use]
    pub const fn tag(&self) -> u8 {
        match self {
            Self::System => 0,
            Self::Account => 1,
            Self::SmartContract => 2,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Account => "account",
            Self::SmartContract => "contract",
        }
    }
}

/// Address of an addressable entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityAddr {
    pub kind: EntityKind,
    pub addr: [u8; 32],
}

impl EntityAddr {
    /// `entity-account-<hex>`, `entity-contract-<hex>` or `entity-system-<hex>`.
    #[must_use]
    pub fn to_formatted_string(&self) -> String {
        format!("entity-{}", self.formatted_suffix())
    }

    fn formatted_suffix(&self) -> String {
        format!("{}-{}", self.kind.as_str(), hex::encode(self.addr))
    }
}

// ============================================================================
// CLValue
// ============================================================================

/// A decoded typed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CLValue {
    Bool(bool),
    I32(i32),
    I64(i64),
    U8(u8),
    U32(u32),
    U64(u64),
    U128(BigUint),
    U256(BigUint),
    U512(BigUint),
    Unit,
    String(String),
    Key(Key),
    URef(URef),
    PublicKey(PublicKey),
    Option {
        inner_type: CLType,
        value: Option<Box<CLValue>>,
    },
    List {
        item_type: CLType,
        items: Vec<CLValue>,
    },
    ByteArray(Vec<u8>),
    Result(Result<Box<CLValue>, Box<CLValue>>),
    Map(Vec<(CLValue, CLValue)>),
    Tuple(Vec<CLValue>),
    Any(Vec<u8>),
}

impl CLValue {
    /// Decimal text of an integer value; `None` for every other kind.
    #[must_use]
    pub fn integer_string(&self) -> Option<String> {
        match self {
            Self::I32(v) => Some(v.to_string()),
            Self::I64(v) => Some(v.to_string()),
            Self::U8(v) => Some(v.to_string()),
            Self::U32(v) => Some(v.to_string()),
            Self::U64(v) => Some(v.to_string()),
            Self::U128(v) | Self::U256(v) | Self::U512(v) => Some(v.to_string()),
            _ => None,
        }
    }

    /// The value behind a `Some`, or the value itself when it is not an option.
    #[must_use]
    pub fn unwrap_option(&self) -> Option<&CLValue> {
        match self {
            Self::Option { value, .. } => value.as_deref(),
            other => Some(other),
        }
    }

    /// The element bytes of a `List<U8>` or the content of a byte array.
    #[must_use]
    pub fn as_byte_list(&self) -> Option<Vec<u8>> {
        match self {
            Self::ByteArray(bytes) => Some(bytes.clone()),
            Self::List { items, .. } => items
                .iter()
                .map(|item| match item {
                    Self::U8(byte) => Some(*byte),
                    _ => None,
                })
                .collect(),
            _ => None,
        }
    }
}

impl fmt::Display for CLValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(number) = self.integer_string() {
            return write!(f, "{number}");
        }
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Unit => write!(f, "Unit"),
            Self::String(v) => write!(f, "{v}"),
            Self::Key(key) => write!(f, "{}", key.to_formatted_string()),
            Self::URef(uref) => write!(f, "{}", uref.to_formatted_string()),
            Self::PublicKey(key) => write!(f, "{key}"),
            Self::ByteArray(bytes) | Self::Any(bytes) => write!(f, "{}", hex::encode(bytes)),
            Self::Option { value: Some(v), .. } => write!(f, "{v}"),
            Self::Option { value: None, .. } => Ok(()),
            Self::Result(Ok(v) | Err(v)) => write!(f, "{v}"),
            Self::List { items, .. } | Self::Tuple(items) => {
                let parts: Vec<String> = items.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            Self::Map(entries) => {
                let parts: Vec<String> = entries.iter().map(|(k, v)| format!("{k}: {v}")).collect();
                write!(f, "{{{}}}", parts.join(", "))
            }
            _ => Ok(()),
        }
    }
}
