//! Public keys, account hashes, URefs and the hash/key classifier.
//!
//! Casper identifiers travel as hex text, optionally framed by a named-key
//! prefix (`account-hash-`, `hash-`, `uref-`, ...). This module recognises
//! those forms, derives account hashes from public keys, and normalises a key
//! into the form the account-info cache is keyed by.

use blake2::{Blake2b, Digest, digest::consts::U32};
use serde::{Deserialize, Serialize};

use super::error::KeyError;

// ============================================================================
// Constants
// ============================================================================

/// Length of a hash (account hash, contract hash, URef address) in bytes.
pub const HASH_LENGTH: usize = 32;

const ED25519_TAG: u8 = 1;
const SECP256K1_TAG: u8 = 2;
const ED25519_KEY_LENGTH: usize = 32;
const SECP256K1_KEY_LENGTH: usize = 33;

// ============================================================================
// Hashing
// ============================================================================

/// 32-byte BLAKE2b digest.
#[must_use]
pub fn blake2b_256(data: &[u8]) -> [u8; HASH_LENGTH] {
    let mut hasher = Blake2b::<U32>::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut hash = [0u8; HASH_LENGTH];
    hash.copy_from_slice(&result);
    hash
}

fn is_hex(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_hexdigit())
}

fn decode_hash(text: &str) -> Option<[u8; HASH_LENGTH]> {
    if text.len() != HASH_LENGTH * 2 {
        return None;
    }
    let bytes = hex::decode(text).ok()?;
    let mut hash = [0u8; HASH_LENGTH];
    hash.copy_from_slice(&bytes);
    Some(hash)
}

// ============================================================================
// AccountKeyType
// ============================================================================

/// How a raw hex key should be interpreted and matched against the info cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AccountKeyType {
    PublicKey,
    AccountHash,
    ContractHash,
    Purse,
}

impl AccountKeyType {
    /// Returns the serialized name of the key type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PublicKey => "publicKey",
            Self::AccountHash => "accountHash",
            Self::ContractHash => "contractHash",
            Self::Purse => "purse",
        }
    }
}

impl std::fmt::Display for AccountKeyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// PublicKey
// ============================================================================

/// An asymmetric public key as carried on chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PublicKey {
    /// The system account key; carries no key bytes.
    System,
    /// Ed25519 key, 32 bytes.
    Ed25519(Vec<u8>),
    /// Secp256k1 compressed key, 33 bytes.
    Secp256k1(Vec<u8>),
}

impl PublicKey {
    /// Parses an algorithm-tagged hex public key (`01…` or `02…`).
    ///
    /// # Errors
    ///
    /// Returns `KeyError::InvalidPublicKey` if the text is not hex, carries an
    /// unknown algorithm tag, or has the wrong length for its algorithm.
    pub fn from_hex(text: &str) -> Result<Self, KeyError> {
        let invalid = || KeyError::InvalidPublicKey(text.to_string());
        let bytes = hex::decode(text.trim()).map_err(|_| invalid())?;
        let (tag, raw) = bytes.split_first().ok_or_else(invalid)?;
        Self::from_tagged(*tag, raw).ok_or_else(invalid)
    }

    /// Builds a key from its algorithm tag and raw key bytes.
    #[must_use]
    pub fn from_tagged(tag: u8, raw: &[u8]) -> Option<Self> {
        match (tag, raw.len()) {
            (0, 0) => Some(Self::System),
            (ED25519_TAG, ED25519_KEY_LENGTH) => Some(Self::Ed25519(raw.to_vec())),
            (SECP256K1_TAG, SECP256K1_KEY_LENGTH) => Some(Self::Secp256k1(raw.to_vec())),
            _ => None,
        }
    }

    /// Raw key length for an algorithm tag, if the tag is known.
    #[must_use]
    pub const fn key_length(tag: u8) -> Option<usize> {
        match tag {
            0 => Some(0),
            ED25519_TAG => Some(ED25519_KEY_LENGTH),
            SECP256K1_TAG => Some(SECP256K1_KEY_LENGTH),
            _ => None,
        }
    }

    const fn tag(&self) -> u8 {
        match self {
            Self::System => 0,
            Self::Ed25519(_) => ED25519_TAG,
            Self::Secp256k1(_) => SECP256K1_TAG,
        }
    }

    const fn algorithm_name(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Ed25519(_) => "ed25519",
            Self::Secp256k1(_) => "secp256k1",
        }
    }

    fn raw_bytes(&self) -> &[u8] {
        match self {
            Self::System => &[],
            Self::Ed25519(bytes) | Self::Secp256k1(bytes) => bytes,
        }
    }

    /// Lowercase hex with the leading algorithm tag.
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("{:02x}{}", self.tag(), hex::encode(self.raw_bytes()))
    }

    /// Derives the account hash: `blake2b(algorithm || 0x00 || raw key)`.
    #[must_use]
    pub fn account_hash(&self) -> AccountHash {
        let name = self.algorithm_name().as_bytes();
        let raw = self.raw_bytes();
        let mut preimage = Vec::with_capacity(name.len() + 1 + raw.len());
        preimage.extend_from_slice(name);
        preimage.push(0);
        preimage.extend_from_slice(raw);
        AccountHash(blake2b_256(&preimage))
    }
}

impl std::fmt::Display for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

// ============================================================================
// AccountHash
// ============================================================================

/// 32-byte account identifier derived from a public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccountHash(pub [u8; HASH_LENGTH]);

impl AccountHash {
    /// Parses `account-hash-<hex>` or bare 64-character hex.
    ///
    /// # Errors
    ///
    /// Returns `KeyError::InvalidAccountHash` for anything else.
    pub fn from_formatted(text: &str) -> Result<Self, KeyError> {
        let bare = text.strip_prefix(NamedKeyPrefix::AccountHash.as_str()).unwrap_or(text);
        decode_hash(bare)
            .map(Self)
            .ok_or_else(|| KeyError::InvalidAccountHash(text.to_string()))
    }

    /// Bare lowercase hex.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// `account-hash-<hex>`.
    #[must_use]
    pub fn to_formatted_string(&self) -> String {
        add_prefix(&self.to_hex(), NamedKeyPrefix::AccountHash)
    }
}

// ============================================================================
// URef
// ============================================================================

/// Unforgeable reference: an address plus access rights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct URef {
    pub address: [u8; HASH_LENGTH],
    pub access_rights: u8,
}

impl URef {
    /// Parses `uref-<64 hex>-<3 octal digits>`.
    ///
    /// # Errors
    ///
    /// Returns `KeyError::InvalidURef` if the framing, address or access
    /// rights are malformed.
    pub fn from_formatted(text: &str) -> Result<Self, KeyError> {
        let invalid = || KeyError::InvalidURef(text.to_string());
        let rest = text.strip_prefix(NamedKeyPrefix::URef.as_str()).ok_or_else(invalid)?;
        let (addr, access) = rest.rsplit_once('-').ok_or_else(invalid)?;
        let address = decode_hash(addr).ok_or_else(invalid)?;
        if access.len() != 3 {
            return Err(invalid());
        }
        let access_rights = u8::from_str_radix(access, 8).map_err(|_| invalid())?;
        Ok(Self {
            address,
            access_rights,
        })
    }

    /// `uref-<hex>-<access rights as 3 octal digits>`.
    #[must_use]
    pub fn to_formatted_string(&self) -> String {
        format!(
            "{}{}-{:03o}",
            NamedKeyPrefix::URef.as_str(),
            hex::encode(self.address),
            self.access_rights
        )
    }
}

// ============================================================================
// Named-Key Prefixes
// ============================================================================

/// Well-known prefixes framing on-chain identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedKeyPrefix {
    AccountHash,
    ContractPackage,
    Dictionary,
    Withdraw,
    Contract,
    Balance,
    Deploy,
    Hash,
    URef,
    Era,
    Bid,
}

impl NamedKeyPrefix {
    /// Longest first, so `account-hash-` wins over `hash-`.
    pub const ALL: [Self; 11] = [
        Self::ContractPackage,
        Self::AccountHash,
        Self::Dictionary,
        Self::Withdraw,
        Self::Contract,
        Self::Balance,
        Self::Deploy,
        Self::Hash,
        Self::URef,
        Self::Era,
        Self::Bid,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AccountHash => "account-hash-",
            Self::ContractPackage => "contract-package-",
            Self::Dictionary => "dictionary-",
            Self::Withdraw => "withdraw-",
            Self::Contract => "contract-",
            Self::Balance => "balance-",
            Self::Deploy => "deploy-",
            Self::Hash => "hash-",
            Self::URef => "uref-",
            Self::Era => "era-",
            Self::Bid => "bid-",
        }
    }
}

/// A possibly-prefixed identifier split into its prefix and bare hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixedHash {
    pub prefix: Option<NamedKeyPrefix>,
    /// The bare hash; a URef keeps its `-<access>` suffix.
    pub hash: String,
}

/// Splits a known prefix off an identifier (case-insensitive).
///
/// A prefix only counts when a hex character follows it; otherwise the text
/// is returned whole with no prefix.
#[must_use]
pub fn split_prefixed(text: &str) -> PrefixedHash {
    let lower = text.to_ascii_lowercase();
    for prefix in NamedKeyPrefix::ALL {
        let Some(rest) = lower.strip_prefix(prefix.as_str()) else {
            continue;
        };
        if rest.chars().next().is_some_and(|c| c.is_ascii_hexdigit()) {
            return PrefixedHash {
                prefix: Some(prefix),
                hash: text[prefix.as_str().len()..].to_string(),
            };
        }
    }
    PrefixedHash {
        prefix: None,
        hash: text.to_string(),
    }
}

/// Returns the identifier with any known prefix removed.
#[must_use]
pub fn strip_prefix(text: &str) -> String {
    split_prefixed(text).hash
}

/// Frames a bare hash with the given prefix.
#[must_use]
pub fn add_prefix(hash: &str, prefix: NamedKeyPrefix) -> String {
    format!("{}{hash}", prefix.as_str())
}

// ============================================================================
// Classification
// ============================================================================

/// True for 66-char hex with tag `01` or 68-char hex with tag `02`.
#[must_use]
pub fn is_public_key_hex(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    is_hex(&lower)
        && ((lower.len() == 66 && lower.starts_with("01"))
            || (lower.len() == 68 && lower.starts_with("02")))
}

/// Decides what kind of key an identifier is.
///
/// Bare 64-character hex is read as an account hash; only `hash-` or
/// `contract-` framing marks a contract hash.
#[must_use]
pub fn classify_key(text: &str) -> Option<AccountKeyType> {
    let text = text.trim();
    if is_public_key_hex(text) {
        return Some(AccountKeyType::PublicKey);
    }
    if text.to_ascii_lowercase().starts_with(NamedKeyPrefix::URef.as_str()) {
        return URef::from_formatted(&text.to_ascii_lowercase())
            .ok()
            .map(|_| AccountKeyType::Purse);
    }

    let PrefixedHash { prefix, hash } = split_prefixed(text);
    if decode_hash(&hash).is_none() {
        return None;
    }
    match prefix {
        None | Some(NamedKeyPrefix::AccountHash) => Some(AccountKeyType::AccountHash),
        Some(NamedKeyPrefix::Hash | NamedKeyPrefix::Contract) => Some(AccountKeyType::ContractHash),
        Some(_) => None,
    }
}

/// Key type of a raw signer/sender key: public key when it looks like one,
/// account hash otherwise.
#[must_use]
pub fn derive_key_type(key: &str) -> AccountKeyType {
    if is_public_key_hex(key) {
        AccountKeyType::PublicKey
    } else {
        AccountKeyType::AccountHash
    }
}

/// Account hash hex for a public key hex.
///
/// # Errors
///
/// Returns `KeyError::InvalidPublicKey` if the text is not a public key.
pub fn account_hash_from_public_key(public_key: &str) -> Result<String, KeyError> {
    Ok(PublicKey::from_hex(public_key)?.account_hash().to_hex())
}

/// Normalises a key to the account-hash form the info cache is keyed by.
///
/// Public keys are hashed down, account hashes pass through. Contract hashes,
/// purses, empty keys and unparseable public keys yield `None`.
#[must_use]
pub fn hash_by_type(hash: &str, key_type: AccountKeyType) -> Option<String> {
    if hash.is_empty() {
        return None;
    }
    match key_type {
        AccountKeyType::PublicKey => account_hash_from_public_key(hash).ok(),
        AccountKeyType::AccountHash => Some(strip_prefix(hash).to_ascii_lowercase()),
        AccountKeyType::ContractHash | AccountKeyType::Purse => None,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const ED25519_KEY: &str = "01deba7173738a7f55de3ad9dc27e081df41ff285f25887ec424a8a65b43d0cf77";
    const SECP256K1_KEY: &str =
        "0203b8ac1e6e1b2a1f1f1c1d1e1f202122232425262728292a2b2c2d2e2f30313233";
    const HASH: &str = "2f4a3e4b8c6d2e1f0a9b8c7d6e5f4a3b2c1d0e9f8a7b6c5d4e3f2a1b0c9d8e7f";

    #[test]
    fn test_public_key_round_trip() {
        let key = PublicKey::from_hex(ED25519_KEY).unwrap();
        assert!(matches!(key, PublicKey::Ed25519(_)));
        assert_eq!(key.to_hex(), ED25519_KEY);

        let key = PublicKey::from_hex(SECP256K1_KEY).unwrap();
        assert!(matches!(key, PublicKey::Secp256k1(_)));
        assert_eq!(key.to_hex(), SECP256K1_KEY);
    }

    #[rstest]
    #[case::wrong_tag("03deba7173738a7f55de3ad9dc27e081df41ff285f25887ec424a8a65b43d0cf77")]
    #[case::short("01deba71")]
    #[case::not_hex("01zz")]
    #[case::empty("")]
    fn test_public_key_rejects(#[case] input: &str) {
        assert!(PublicKey::from_hex(input).is_err());
    }

    #[test]
    fn test_account_hash_derivation_is_stable() {
        let key = PublicKey::from_hex(ED25519_KEY).unwrap();
        let first = key.account_hash().to_hex();
        let second = account_hash_from_public_key(ED25519_KEY).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);

        let mut preimage = b"ed25519".to_vec();
        preimage.push(0);
        preimage.extend_from_slice(&hex::decode(&ED25519_KEY[2..]).unwrap());
        assert_eq!(first, hex::encode(blake2b_256(&preimage)));
    }

    #[test]
    fn test_account_hash_differs_by_algorithm() {
        let ed = PublicKey::Ed25519(vec![7; 32]).account_hash();
        let secp = PublicKey::Secp256k1(vec![7; 33]).account_hash();
        assert_ne!(ed, secp);
    }

    #[test]
    fn test_uref_round_trip() {
        let text = format!("uref-{HASH}-007");
        let uref = URef::from_formatted(&text).unwrap();
        assert_eq!(uref.access_rights, 7);
        assert_eq!(uref.to_formatted_string(), text);
        assert!(URef::from_formatted(&format!("uref-{HASH}")).is_err());
        assert!(URef::from_formatted(&format!("uref-{HASH}-9")).is_err());
    }

    #[rstest]
    #[case::hash(NamedKeyPrefix::Hash)]
    #[case::contract(NamedKeyPrefix::Contract)]
    #[case::uref(NamedKeyPrefix::URef)]
    #[case::deploy(NamedKeyPrefix::Deploy)]
    #[case::era(NamedKeyPrefix::Era)]
    #[case::balance(NamedKeyPrefix::Balance)]
    #[case::bid(NamedKeyPrefix::Bid)]
    #[case::withdraw(NamedKeyPrefix::Withdraw)]
    #[case::dictionary(NamedKeyPrefix::Dictionary)]
    #[case::account_hash(NamedKeyPrefix::AccountHash)]
    #[case::contract_package(NamedKeyPrefix::ContractPackage)]
    fn test_prefix_round_trip(#[case] prefix: NamedKeyPrefix) {
        let prefixed = add_prefix(HASH, prefix);
        let split = split_prefixed(&prefixed);
        assert_eq!(split.prefix, Some(prefix));
        assert_eq!(split.hash, HASH);
        assert_eq!(strip_prefix(&prefixed), HASH);
    }

    #[test]
    fn test_split_prefixed_keeps_uref_suffix() {
        let split = split_prefixed(&format!("uref-{HASH}-007"));
        assert_eq!(split.prefix, Some(NamedKeyPrefix::URef));
        assert_eq!(split.hash, format!("{HASH}-007"));
    }

    #[test]
    fn test_split_prefixed_is_case_insensitive() {
        let split = split_prefixed(&format!("Account-Hash-{HASH}"));
        assert_eq!(split.prefix, Some(NamedKeyPrefix::AccountHash));
        assert_eq!(split.hash, HASH);
    }

    #[test]
    fn test_split_prefixed_requires_hex_after_prefix() {
        let split = split_prefixed("hash-mismatch");
        assert_eq!(split.prefix, None);
        assert_eq!(split.hash, "hash-mismatch");
    }

    #[rstest]
    #[case::ed25519(ED25519_KEY, Some(AccountKeyType::PublicKey))]
    #[case::secp256k1(SECP256K1_KEY, Some(AccountKeyType::PublicKey))]
    #[case::account_hash_prefixed(&format!("account-hash-{HASH}"), Some(AccountKeyType::AccountHash))]
    #[case::bare_hash(HASH, Some(AccountKeyType::AccountHash))]
    #[case::contract_hash(&format!("hash-{HASH}"), Some(AccountKeyType::ContractHash))]
    #[case::contract_prefixed(&format!("contract-{HASH}"), Some(AccountKeyType::ContractHash))]
    #[case::uref(&format!("uref-{HASH}-007"), Some(AccountKeyType::Purse))]
    #[case::deploy(&format!("deploy-{HASH}"), None)]
    #[case::garbage("hello", None)]
    fn test_classify_key(#[case] input: &str, #[case] expected: Option<AccountKeyType>) {
        assert_eq!(classify_key(input), expected);
    }

    #[test]
    fn test_hash_by_type() {
        let derived = account_hash_from_public_key(ED25519_KEY).unwrap();
        assert_eq!(
            hash_by_type(ED25519_KEY, AccountKeyType::PublicKey),
            Some(derived)
        );
        assert_eq!(
            hash_by_type(&HASH.to_uppercase(), AccountKeyType::AccountHash),
            Some(HASH.to_string())
        );
        assert_eq!(hash_by_type(HASH, AccountKeyType::ContractHash), None);
        assert_eq!(hash_by_type("", AccountKeyType::AccountHash), None);
        assert_eq!(hash_by_type("nope", AccountKeyType::PublicKey), None);
    }

    #[test]
    fn test_derive_key_type() {
        assert_eq!(derive_key_type(ED25519_KEY), AccountKeyType::PublicKey);
        assert_eq!(derive_key_type(HASH), AccountKeyType::AccountHash);
    }
}
