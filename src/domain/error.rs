//! Error types for Casper domain operations.
//!
//! Each concern gets its own enum so callers can match on exactly the failure
//! modes an operation can produce. Only [`SignatureRequestError`] ever leaves
//! the signature request assembler.

use thiserror::Error;

// ============================================================================
// Key Errors
// ============================================================================

/// Errors raised while parsing textual key representations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    /// The text is not a hex public key with a known algorithm tag.
    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    /// The text is not a 32-byte account hash.
    #[error("Invalid account hash: {0}")]
    InvalidAccountHash(String),

    /// The text is not a formatted `uref-<hex>-<access>` string.
    #[error("Invalid URef: {0}")]
    InvalidURef(String),
}

// ============================================================================
// Typed Value Errors
// ============================================================================

/// Errors raised while decoding typed values from their binary encoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClValueError {
    /// The payload ended before the value was complete.
    #[error("Unexpected end of bytes: needed {needed}, {remaining} remaining")]
    EndOfBytes {
        /// Bytes the reader tried to take.
        needed: usize,
        /// Bytes that were left.
        remaining: usize,
    },

    /// A discriminant byte did not match any known variant.
    #[error("Invalid {kind} tag: {tag}")]
    InvalidTag {
        /// What was being decoded (e.g. "key", "option").
        kind: &'static str,
        /// The offending tag byte.
        tag: u8,
    },

    /// A string payload was not valid UTF-8.
    #[error("Invalid UTF-8 in string value")]
    InvalidUtf8,

    /// Bytes were left over after a complete value.
    #[error("{0} trailing bytes after value")]
    TrailingBytes(usize),

    /// The type descriptor is not one this crate understands.
    #[error("Unknown type: {0}")]
    UnknownType(String),

    /// The type descriptor nests deeper than the decoder allows.
    #[error("Type nesting exceeds {0} levels")]
    TooDeep(usize),

    /// A hex payload could not be decoded.
    #[error("Invalid hex payload: {0}")]
    InvalidHex(String),
}

impl ClValueError {
    /// Create an end-of-bytes error.
    #[must_use]
    pub const fn end_of_bytes(needed: usize, remaining: usize) -> Self {
        Self::EndOfBytes { needed, remaining }
    }

    /// Create an invalid tag error for the given kind of value.
    #[must_use]
    pub const fn invalid_tag(kind: &'static str, tag: u8) -> Self {
        Self::InvalidTag { kind, tag }
    }
}

// ============================================================================
// Transaction Errors
// ============================================================================

/// Errors raised while reading a transaction from its JSON form.
#[derive(Debug, Error)]
pub enum TransactionParseError {
    /// The input was not JSON at all.
    #[error("Invalid transaction JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A required field was absent.
    #[error("Missing transaction field: {0}")]
    MissingField(&'static str),

    /// A field was present but its content could not be understood.
    #[error("Invalid transaction field '{field}': {message}")]
    InvalidField {
        /// The field that failed.
        field: &'static str,
        /// Description of the problem.
        message: String,
    },
}

impl TransactionParseError {
    /// Create an invalid field error.
    ///
    /// # Arguments
    ///
    /// * `field` - Name of the JSON field that failed
    /// * `message` - Description of why it failed
    ///
    /// # Returns
    ///
    /// A new `TransactionParseError::InvalidField` variant.
    #[must_use]
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            message: message.into(),
        }
    }
}

// ============================================================================
// Signature Request Errors
// ============================================================================

/// Fatal errors that abort signature request preparation.
///
/// Enrichment failures never surface here; they degrade to defaults.
#[derive(Debug, Error)]
pub enum SignatureRequestError {
    /// The transaction cannot be presented for approval (e.g. a native
    /// transfer without a recipient or amount).
    #[error("Invalid signature request: {0}")]
    InvalidSignatureRequest(String),

    /// The transaction JSON could not be parsed.
    #[error(transparent)]
    InvalidTransactionJson(#[from] TransactionParseError),
}

impl SignatureRequestError {
    /// Create an invalid signature request error.
    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidSignatureRequest(message.into())
    }

    /// Discriminant identifying which operation failed, for caller-facing messages.
    ///
    /// Both variants abort the same operation; callers tell them apart by
    /// matching on the variant.
    #[must_use]
    pub const fn operation(&self) -> &'static str {
        match self {
            Self::InvalidSignatureRequest(_) | Self::InvalidTransactionJson(_) => {
                "invalidSignatureRequest"
            }
        }
    }
}

// ============================================================================
// Client Errors
// ============================================================================

/// Errors from the wallet API and node RPC collaborators.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network-related errors from HTTP requests.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Http {
        /// Response status code.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// JSON parsing or data structure errors.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of what failed to parse.
        message: String,
    },

    /// Entity not found on the network.
    #[error("{entity} '{id}' not found")]
    NotFound {
        /// The type of entity that was not found (e.g. "contract package").
        entity: &'static str,
        /// The identifier that was searched for.
        id: String,
    },

    /// The node returned a JSON-RPC error object.
    #[error("RPC error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code.
        code: i64,
        /// JSON-RPC error message.
        message: String,
    },

    /// No endpoint is configured for the requested network.
    #[error("No endpoint configured for {0}")]
    UnsupportedNetwork(String),
}

impl ClientError {
    /// Create a new parse error with the given message.
    #[must_use]
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create a new not found error.
    #[must_use]
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }
}

// ============================================================================
// Config Errors
// ============================================================================

/// Errors raised while loading or saving client configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform has no configuration directory.
    #[error("Could not determine config directory")]
    NoConfigDir,

    /// Reading or writing the file failed.
    #[error("Config IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid configuration JSON.
    #[error("Config parse error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_request_error_display() {
        let err = SignatureRequestError::invalid("Couldn't find 'amount' in transfer data");
        assert_eq!(
            err.to_string(),
            "Invalid signature request: Couldn't find 'amount' in transfer data"
        );
        assert_eq!(err.operation(), "invalidSignatureRequest");
    }

    #[test]
    fn test_transaction_json_error_is_transparent() {
        let err: SignatureRequestError = TransactionParseError::MissingField("hash").into();
        assert_eq!(err.to_string(), "Missing transaction field: hash");
        assert_eq!(err.operation(), "invalidSignatureRequest");
        assert!(matches!(err, SignatureRequestError::InvalidTransactionJson(_)));
    }

    #[test]
    fn test_client_error_display() {
        let not_found = ClientError::not_found("contract package", "abc123");
        assert_eq!(not_found.to_string(), "contract package 'abc123' not found");

        let rpc = ClientError::Rpc {
            code: -32003,
            message: "state query failed".to_string(),
        };
        assert_eq!(rpc.to_string(), "RPC error -32003: state query failed");
    }

    #[test]
    fn test_cl_value_error_constructors() {
        match ClValueError::invalid_tag("key", 42) {
            ClValueError::InvalidTag { kind, tag } => {
                assert_eq!(kind, "key");
                assert_eq!(tag, 42);
            }
            _ => panic!("Expected InvalidTag variant"),
        }
        assert_eq!(
            ClValueError::end_of_bytes(4, 1).to_string(),
            "Unexpected end of bytes: needed 4, 1 remaining"
        );
    }

    #[test]
    fn test_transaction_parse_invalid_field() {
        let err = TransactionParseError::invalid("ttl", "unknown unit 'x'");
        assert_eq!(
            err.to_string(),
            "Invalid transaction field 'ttl': unknown unit 'x'"
        );
    }
}
