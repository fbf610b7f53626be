//! Ordered named-argument sets.
//!
//! Arguments are read from the JSON transaction form
//! (`[[name, {cl_type, bytes, parsed}], ...]`) or from the binary form
//! embedded inside WASM-proxy calls. An argument whose type or payload cannot
//! be decoded is kept with a textual fallback instead of failing the set.

use serde_json::Value;

use super::bytesrepr::ByteReader;
use super::{CLType, CLValue};
use crate::domain::error::{ClValueError, TransactionParseError};

/// Payload of one named argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    /// Fully decoded value.
    Decoded(CLValue),
    /// Type descriptor not understood; carries the descriptor tag.
    UnknownType(String),
    /// Known type but undecodable payload; carries the original text.
    Malformed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedArg {
    pub name: String,
    pub value: ArgValue,
}

impl NamedArg {
    #[must_use]
    pub fn new(name: impl Into<String>, value: CLValue) -> Self {
        Self {
            name: name.into(),
            value: ArgValue::Decoded(value),
        }
    }
}

/// Named arguments in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeArgs(Vec<NamedArg>);

impl RuntimeArgs {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, arg: NamedArg) {
        self.0.push(arg);
    }

    /// Adds a decoded value under `name`.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: CLValue) -> Self {
        self.push(NamedArg::new(name, value));
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NamedArg> {
        self.0.iter()
    }

    /// True when an argument with this name exists, decoded or not.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|arg| arg.name == name)
    }

    /// The decoded value of the first argument named `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&CLValue> {
        self.0
            .iter()
            .find(|arg| arg.name == name)
            .and_then(|arg| match &arg.value {
                ArgValue::Decoded(value) => Some(value),
                ArgValue::UnknownType(_) | ArgValue::Malformed(_) => None,
            })
    }

    /// Copy of the set without the named arguments.
    #[must_use]
    pub fn without(&self, names: &[&str]) -> Self {
        Self(
            self.0
                .iter()
                .filter(|arg| !names.contains(&arg.name.as_str()))
                .cloned()
                .collect(),
        )
    }

    /// Appends every argument from `other`.
    pub fn extend(&mut self, other: Self) {
        self.0.extend(other.0);
    }

    // ------------------------------------------------------------------------
    // JSON form
    // ------------------------------------------------------------------------

    /// Parses `{"Named": [...]}` or a bare `[[name, value], ...]` array.
    ///
    /// # Errors
    ///
    /// Returns `TransactionParseError::InvalidField` when the structure is not
    /// a list of `[name, value]` pairs. Individual values never fail.
    pub fn from_json(json: &Value) -> Result<Self, TransactionParseError> {
        if json.is_null() {
            return Ok(Self::new());
        }
        if let Some(hex_bytes) = json.get("Bytesrepr").and_then(Value::as_str) {
            let bytes = hex::decode(hex_bytes)
                .map_err(|e| TransactionParseError::invalid("args", e.to_string()))?;
            return Self::from_bytes(&bytes)
                .map_err(|e| TransactionParseError::invalid("args", e.to_string()));
        }

        let entries = json
            .get("Named")
            .unwrap_or(json)
            .as_array()
            .ok_or_else(|| TransactionParseError::invalid("args", "expected a list of named arguments"))?;

        entries
            .iter()
            .map(|entry| {
                let pair = entry.as_array().filter(|pair| pair.len() == 2);
                let (name, value) = pair
                    .and_then(|pair| Some((pair[0].as_str()?, &pair[1])))
                    .ok_or_else(|| TransactionParseError::invalid("args", "expected [name, value] pair"))?;
                Ok(NamedArg {
                    name: name.to_string(),
                    value: parse_json_value(value),
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    // ------------------------------------------------------------------------
    // Binary form
    // ------------------------------------------------------------------------

    /// Parses the binary form: `u32` count, then per argument a string name
    /// and a length-prefixed payload followed by its type descriptor.
    ///
    /// # Errors
    ///
    /// Fails when the framing itself is broken. A payload that does not
    /// decode under a known type degrades to `ArgValue::Malformed`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ClValueError> {
        let mut reader = ByteReader::new(bytes);
        let count = reader.read_u32()? as usize;
        if count > reader.remaining() {
            return Err(ClValueError::end_of_bytes(count, reader.remaining()));
        }

        let mut args = Vec::with_capacity(count);
        for _ in 0..count {
            let name = reader.read_string()?;
            let payload = reader.read_length_prefixed()?;
            let ty = CLType::from_reader(&mut reader)?;
            let value = match CLValue::from_bytes(&ty, payload) {
                Ok(value) => ArgValue::Decoded(value),
                Err(e) => {
                    tracing::trace!("argument '{name}' of type {ty} did not decode: {e}");
                    ArgValue::Malformed(hex::encode(payload))
                }
            };
            args.push(NamedArg { name, value });
        }

        if !reader.is_empty() {
            return Err(ClValueError::TrailingBytes(reader.remaining()));
        }
        Ok(Self(args))
    }
}

impl<'a> IntoIterator for &'a RuntimeArgs {
    type Item = &'a NamedArg;
    type IntoIter = std::slice::Iter<'a, NamedArg>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Text shown for a value that cannot be decoded.
fn original_text(value: &Value) -> String {
    match value.get("parsed") {
        Some(Value::String(text)) => text.clone(),
        Some(parsed) if !parsed.is_null() => parsed.to_string(),
        _ => value
            .get("bytes")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
    }
}

fn parse_json_value(value: &Value) -> ArgValue {
    let type_json = value.get("cl_type").unwrap_or(&Value::Null);
    let ty = match CLType::from_json(type_json) {
        Ok(ty) => ty,
        Err(ClValueError::UnknownType(tag)) => return ArgValue::UnknownType(tag),
        Err(e) => {
            tracing::trace!("argument type did not parse: {e}");
            return ArgValue::Malformed(original_text(value));
        }
    };

    let decoded = value
        .get("bytes")
        .and_then(Value::as_str)
        .ok_or_else(|| ClValueError::InvalidHex("missing bytes".to_string()))
        .and_then(|text| hex::decode(text).map_err(|e| ClValueError::InvalidHex(e.to_string())))
        .and_then(|bytes| CLValue::from_bytes(&ty, &bytes));

    match decoded {
        Ok(value) => ArgValue::Decoded(value),
        Err(e) => {
            tracing::trace!("argument of type {ty} did not decode: {e}");
            ArgValue::Malformed(original_text(value))
        }
    }
}
