//! Display decoding of typed transaction arguments.
//!
//! Every argument becomes a [`SignatureRequestArg`]: a leaf carrying a
//! string, or a branch carrying further arguments. Decoding never fails; a
//! value that cannot be understood degrades to a `string` leaf.

use chrono::{DateTime, SecondsFormat};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::domain::account::{AccountInfo, AccountInfoMap};
use crate::domain::cl_value::{ArgValue, CLType, CLValue, Key, RuntimeArgs};
use crate::domain::explorer;
use crate::domain::keys::{AccountHash, AccountKeyType, URef, is_public_key_hex};

// ============================================================================
// Types
// ============================================================================

/// A decoded argument, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureRequestArg {
    /// An account, by public key or bare account hash.
    AccountLink {
        value: String,
        account_info: Option<AccountInfo>,
        link: Option<String>,
    },
    /// A formatted `uref-<hex>-<access>` purse.
    URef { value: String, link: Option<String> },
    /// Bare hex: contract hashes, byte arrays, byte lists.
    Hash { value: String, link: Option<String> },
    Number(String),
    String(String),
    /// ISO-8601 rendering of a time-like integer.
    Timestamp(String),
    List(Vec<SignatureRequestArg>),
    Map(DecodedArgs),
    /// The value inside an option's `Some`.
    SingleInner(Box<SignatureRequestArg>),
    ResultOk(Box<SignatureRequestArg>),
    ResultErr(Box<SignatureRequestArg>),
    Tuple(Vec<SignatureRequestArg>),
}

impl SignatureRequestArg {
    /// The `type` tag this argument serializes with.
    #[must_use]
    pub const fn arg_type(&self) -> &'static str {
        match self {
            Self::AccountLink { .. } => "accountLink",
            Self::URef { .. } => "uref",
            Self::Hash { .. } => "hash",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Timestamp(_) => "timestamp",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::SingleInner(_) => "singleInner",
            Self::ResultOk(_) => "resultOk",
            Self::ResultErr(_) => "resultErr",
            Self::Tuple(_) => "tuple",
        }
    }

    fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    /// Pushes the value of every `accountLink` in this tree onto `out`.
    fn collect_account_links<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::AccountLink { value, .. } => out.push(value),
            Self::List(items) | Self::Tuple(items) => {
                items.iter().for_each(|item| item.collect_account_links(out));
            }
            Self::Map(entries) => entries
                .values()
                .for_each(|item| item.collect_account_links(out)),
            Self::SingleInner(inner) | Self::ResultOk(inner) | Self::ResultErr(inner) => {
                inner.collect_account_links(out);
            }
            Self::URef { .. }
            | Self::Hash { .. }
            | Self::Number(_)
            | Self::String(_)
            | Self::Timestamp(_) => {}
        }
    }
}

impl Serialize for SignatureRequestArg {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("type", self.arg_type())?;
        match self {
            Self::AccountLink {
                value,
                account_info,
                link,
            } => {
                map.serialize_entry("value", value)?;
                if let Some(info) = account_info {
                    map.serialize_entry("accountInfo", info)?;
                }
                if let Some(link) = link {
                    map.serialize_entry("link", link)?;
                }
            }
            Self::URef { value, link } | Self::Hash { value, link } => {
                map.serialize_entry("value", value)?;
                if let Some(link) = link {
                    map.serialize_entry("link", link)?;
                }
            }
            Self::Number(value) | Self::String(value) | Self::Timestamp(value) => {
                map.serialize_entry("value", value)?;
            }
            Self::List(items) | Self::Tuple(items) => map.serialize_entry("value", items)?,
            Self::Map(entries) => map.serialize_entry("value", entries)?,
            Self::SingleInner(inner) | Self::ResultOk(inner) | Self::ResultErr(inner) => {
                map.serialize_entry("value", &[inner.as_ref()])?;
            }
        }
        map.end()
    }
}

/// Decoded arguments by name, in first-insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedArgs(Vec<(String, SignatureRequestArg)>);

impl DecodedArgs {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Adds an entry; a repeated name overwrites the earlier value in place.
    pub fn insert(&mut self, name: impl Into<String>, arg: SignatureRequestArg) {
        let name = name.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = arg,
            None => self.0.push((name, arg)),
        }
    }

    /// Adds every entry of `other`, overwriting repeated names.
    pub fn merge(&mut self, other: Self) {
        for (name, arg) in other.0 {
            self.insert(name, arg);
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SignatureRequestArg> {
        self.0
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, arg)| arg)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SignatureRequestArg)> {
        self.0.iter().map(|(name, arg)| (name.as_str(), arg))
    }

    pub fn values(&self) -> impl Iterator<Item = &SignatureRequestArg> {
        self.0.iter().map(|(_, arg)| arg)
    }

    /// Every account referenced anywhere in the tree, deduplicated, with the
    /// key type implied by its form.
    #[must_use]
    pub fn account_links(&self) -> Vec<(String, AccountKeyType)> {
        let mut links = Vec::new();
        self.values().for_each(|arg| arg.collect_account_links(&mut links));

        let mut unique: Vec<(String, AccountKeyType)> = Vec::new();
        for link in links {
            if unique.iter().any(|(seen, _)| seen == link) {
                continue;
            }
            let key_type = if is_public_key_hex(link) {
                AccountKeyType::PublicKey
            } else {
                AccountKeyType::AccountHash
            };
            unique.push((link.to_string(), key_type));
        }
        unique
    }
}

impl Serialize for DecodedArgs {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, arg) in &self.0 {
            map.serialize_entry(name, arg)?;
        }
        map.end()
    }
}

// ============================================================================
// Decoding
// ============================================================================

/// Decodes a whole argument set for display.
///
/// # Arguments
///
/// * `args` - The named arguments of a transaction
/// * `accounts` - Account info used to annotate account references
/// * `chain_name` - Chain the transaction targets, used for explorer links
#[must_use]
pub fn decode_arguments(args: &RuntimeArgs, accounts: &AccountInfoMap, chain_name: &str) -> DecodedArgs {
    let decoder = ArgDecoder { accounts, chain_name };
    let mut decoded = DecodedArgs::new();
    for arg in args {
        let value = match &arg.value {
            ArgValue::Decoded(value) => decoder.decode(&arg.name, value),
            ArgValue::UnknownType(tag) => SignatureRequestArg::string(format!("Unknown type: {tag}")),
            ArgValue::Malformed(text) => SignatureRequestArg::string(text.clone()),
        };
        decoded.insert(arg.name.clone(), value);
    }
    decoded
}

struct ArgDecoder<'a> {
    accounts: &'a AccountInfoMap,
    chain_name: &'a str,
}

impl ArgDecoder<'_> {
    fn decode(&self, name: &str, value: &CLValue) -> SignatureRequestArg {
        if let Some(number) = value.integer_string() {
            return timestamp_from_numeric_arg(name, &number)
                .map_or(SignatureRequestArg::Number(number), SignatureRequestArg::Timestamp);
        }

        match value {
            CLValue::Bool(flag) => self.prefixed_string(name, &flag.to_string(), None),
            CLValue::String(text) => self.prefixed_string(name, text, None),
            CLValue::Unit => SignatureRequestArg::string("CLValue Unit"),
            CLValue::URef(uref) => self.prefixed_string(name, &uref.to_formatted_string(), None),
            CLValue::Key(key) => self.decode_key(name, key),
            CLValue::PublicKey(public_key) => {
                let hex = public_key.to_hex();
                SignatureRequestArg::AccountLink {
                    account_info: self
                        .accounts
                        .resolve(&hex, AccountKeyType::PublicKey)
                        .cloned(),
                    link: explorer::account_url(self.chain_name, &hex),
                    value: hex,
                }
            }
            CLValue::Option {
                inner_type,
                value: None,
            } => SignatureRequestArg::string(format!("None ({inner_type})")),
            CLValue::Option {
                value: Some(inner), ..
            } => SignatureRequestArg::SingleInner(Box::new(self.decode(name, inner))),
            CLValue::Result(result) => match result {
                Ok(inner) | Err(inner) if **inner == CLValue::Unit => SignatureRequestArg::string(""),
                Ok(inner) => SignatureRequestArg::ResultOk(Box::new(self.decode(name, inner))),
                Err(inner) => SignatureRequestArg::ResultErr(Box::new(self.decode(name, inner))),
            },
            CLValue::List { items, .. } if items.is_empty() => SignatureRequestArg::List(Vec::new()),
            CLValue::List { item_type, items } => match value.as_byte_list() {
                Some(bytes) if *item_type == CLType::U8 => SignatureRequestArg::Hash {
                    value: hex::encode(bytes),
                    link: None,
                },
                _ => SignatureRequestArg::List(items.iter().map(|item| self.decode("", item)).collect()),
            },
            CLValue::Map(entries) => {
                let mut decoded = DecodedArgs::new();
                for (key, entry) in entries {
                    let key = key.to_string();
                    let entry = self.decode(&key, entry);
                    decoded.insert(key, entry);
                }
                SignatureRequestArg::Map(decoded)
            }
            CLValue::Tuple(items) => {
                SignatureRequestArg::Tuple(items.iter().map(|item| self.decode("", item)).collect())
            }
            CLValue::ByteArray(bytes) | CLValue::Any(bytes) => SignatureRequestArg::Hash {
                value: hex::encode(bytes),
                link: None,
            },
            // Integers were handled above.
            CLValue::I32(_)
            | CLValue::I64(_)
            | CLValue::U8(_)
            | CLValue::U32(_)
            | CLValue::U64(_)
            | CLValue::U128(_)
            | CLValue::U256(_)
            | CLValue::U512(_) => SignatureRequestArg::Number(value.to_string()),
        }
    }

    fn decode_key(&self, name: &str, key: &Key) -> SignatureRequestArg {
        match key {
            Key::Account(account_hash) => {
                let account_info = self
                    .accounts
                    .resolve(&account_hash.to_hex(), AccountKeyType::AccountHash)
                    .cloned();
                self.prefixed_string(name, &account_hash.to_formatted_string(), account_info)
            }
            Key::URef(uref) => self.prefixed_string(name, &uref.to_formatted_string(), None),
            Key::Hash(addr) => self.prefixed_string(name, &hex::encode(addr), None),
            other => SignatureRequestArg::Hash {
                value: other.to_formatted_string(),
                link: None,
            },
        }
    }

    /// Recognises `uref-`, `account-hash-` and bare or `hash-` framed hashes
    /// inside string-like values.
    fn prefixed_string(
        &self,
        name: &str,
        text: &str,
        account_info: Option<AccountInfo>,
    ) -> SignatureRequestArg {
        if text.starts_with("uref-") {
            return match URef::from_formatted(text) {
                Ok(uref) => {
                    let formatted = uref.to_formatted_string();
                    SignatureRequestArg::URef {
                        link: explorer::account_url(self.chain_name, &formatted),
                        value: formatted,
                    }
                }
                Err(_) => SignatureRequestArg::string(text),
            };
        }
        if text.starts_with("account-hash-") {
            return match AccountHash::from_formatted(text) {
                Ok(account_hash) => {
                    let hex = account_hash.to_hex();
                    SignatureRequestArg::AccountLink {
                        link: explorer::account_url(self.chain_name, &hex),
                        value: hex,
                        account_info,
                    }
                }
                Err(_) => SignatureRequestArg::string(text),
            };
        }
        if let Some(hash) = bare_hash(text) {
            return SignatureRequestArg::Hash {
                link: explorer::hash_url(self.chain_name, &hash),
                value: hash,
            };
        }
        if let Some(timestamp) = timestamp_from_numeric_arg(name, text) {
            return SignatureRequestArg::Timestamp(timestamp);
        }
        SignatureRequestArg::string(text)
    }
}

/// Lowercase hex of `hash-<64 hex>` or bare `<64 hex>`.
fn bare_hash(text: &str) -> Option<String> {
    let hash = text.strip_prefix("hash-").unwrap_or(text);
    (hash.len() == 64 && hash.bytes().all(|b| b.is_ascii_hexdigit()))
        .then(|| hash.to_ascii_lowercase())
}

// ============================================================================
// Timestamp Heuristic
// ============================================================================

/// Argument names whose integer values are read as points in time.
pub const TIMESTAMP_ARG_NAMES: [&str; 4] = ["deadline", "timestamp", "time_to_live", "expiration"];

/// 2060-01-01T00:00:00Z, in seconds.
const MAX_TIMESTAMP_SECS: i64 = 2_840_140_800;

/// Reads a numeric argument as a Unix timestamp when both its name and its
/// shape say it is one.
///
/// The name must be one of [`TIMESTAMP_ARG_NAMES`]; the digits must number
/// exactly 10 (seconds) or 13 (milliseconds) and fall before 2060.
///
/// # Returns
///
/// ISO-8601 with milliseconds, or `None` to keep the plain number.
#[must_use]
pub fn timestamp_from_numeric_arg(name: &str, digits: &str) -> Option<String> {
    if !TIMESTAMP_ARG_NAMES.contains(&name) || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value: i64 = digits.parse().ok()?;
    let millis = match digits.len() {
        10 if value <= MAX_TIMESTAMP_SECS => value.checked_mul(1_000)?,
        13 if value <= MAX_TIMESTAMP_SECS * 1_000 => value,
        _ => return None,
    };
    DateTime::from_timestamp_millis(millis).map(|ts| ts.to_rfc3339_opts(SecondsFormat::Millis, true))
}

// ============================================================================
// Tests
// ============================================================================
