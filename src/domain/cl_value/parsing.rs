//! Type descriptors from JSON and binary forms, values from bytes.

use serde_json::Value;

use super::bytesrepr::ByteReader;
use super::{CLType, CLValue, EntityAddr, EntityKind, Key};
use crate::domain::error::ClValueError;
use crate::domain::keys::{AccountHash, PublicKey, URef};

/// Deepest type nesting the decoders accept.
pub const MAX_TYPE_DEPTH: usize = 50;

/// Upper bound on zero-sized list/map elements (lists of `Unit`).
const MAX_ZERO_SIZED_ITEMS: usize = 1 << 16;

// ============================================================================
// CLType from JSON
// ============================================================================

impl CLType {
    /// Parses the JSON type descriptor (`"U512"`, `{"List":"U8"}`, ...).
    ///
    /// # Errors
    ///
    /// Returns `ClValueError::UnknownType` for descriptors this crate does
    /// not model, carrying the descriptor text.
    pub fn from_json(json: &Value) -> Result<Self, ClValueError> {
        parse_json_type(json, 0)
    }

    /// Reads a binary type descriptor.
    ///
    /// # Errors
    ///
    /// Returns `ClValueError::UnknownType` for unknown tags and
    /// `ClValueError::EndOfBytes` for truncated descriptors.
    pub fn from_reader(reader: &mut ByteReader<'_>) -> Result<Self, ClValueError> {
        parse_binary_type(reader, 0)
    }
}

fn unknown_type(json: &Value) -> ClValueError {
    match json {
        Value::String(name) => ClValueError::UnknownType(name.clone()),
        other => ClValueError::UnknownType(other.to_string()),
    }
}

fn parse_json_type(json: &Value, depth: usize) -> Result<CLType, ClValueError> {
    if depth > MAX_TYPE_DEPTH {
        return Err(ClValueError::TooDeep(MAX_TYPE_DEPTH));
    }
    let nested = |value: &Value| parse_json_type(value, depth + 1).map(Box::new);

    if let Some(name) = json.as_str() {
        return match name {
            "Bool" => Ok(CLType::Bool),
            "I32" => Ok(CLType::I32),
            "I64" => Ok(CLType::I64),
            "U8" => Ok(CLType::U8),
            "U32" => Ok(CLType::U32),
            "U64" => Ok(CLType::U64),
            "U128" => Ok(CLType::U128),
            "U256" => Ok(CLType::U256),
            "U512" => Ok(CLType::U512),
            "Unit" => Ok(CLType::Unit),
            "String" => Ok(CLType::String),
            "Key" => Ok(CLType::Key),
            "URef" => Ok(CLType::URef),
            "PublicKey" => Ok(CLType::PublicKey),
            "Any" => Ok(CLType::Any),
            _ => Err(unknown_type(json)),
        };
    }

    let Some(object) = json.as_object().filter(|object| object.len() == 1) else {
        return Err(unknown_type(json));
    };
    let Some((name, inner)) = object.iter().next() else {
        return Err(unknown_type(json));
    };

    match name.as_str() {
        "Option" => Ok(CLType::Option(nested(inner)?)),
        "List" => Ok(CLType::List(nested(inner)?)),
        "ByteArray" => inner
            .as_u64()
            .and_then(|length| u32::try_from(length).ok())
            .map(CLType::ByteArray)
            .ok_or_else(|| unknown_type(json)),
        "Result" => Ok(CLType::Result {
            ok: nested(inner.get("ok").ok_or_else(|| unknown_type(json))?)?,
            err: nested(inner.get("err").ok_or_else(|| unknown_type(json))?)?,
        }),
        "Map" => Ok(CLType::Map {
            key: nested(inner.get("key").ok_or_else(|| unknown_type(json))?)?,
            value: nested(inner.get("value").ok_or_else(|| unknown_type(json))?)?,
        }),
        "Tuple1" | "Tuple2" | "Tuple3" => {
            let items = inner.as_array().ok_or_else(|| unknown_type(json))?;
            match (name.as_str(), items.as_slice()) {
                ("Tuple1", [a]) => Ok(CLType::Tuple1(nested(a)?)),
                ("Tuple2", [a, b]) => Ok(CLType::Tuple2(nested(a)?, nested(b)?)),
                ("Tuple3", [a, b, c]) => Ok(CLType::Tuple3(nested(a)?, nested(b)?, nested(c)?)),
                _ => Err(unknown_type(json)),
            }
        }
        _ => Err(unknown_type(json)),
    }
}

// ============================================================================
// CLType from bytes
// ============================================================================

fn parse_binary_type(reader: &mut ByteReader<'_>, depth: usize) -> Result<CLType, ClValueError> {
    if depth > MAX_TYPE_DEPTH {
        return Err(ClValueError::TooDeep(MAX_TYPE_DEPTH));
    }
    let nested = |reader: &mut ByteReader| parse_binary_type(reader, depth + 1).map(Box::new);

    let tag = reader.read_u8()?;
    let ty = match tag {
        0 => CLType::Bool,
        1 => CLType::I32,
        2 => CLType::I64,
        3 => CLType::U8,
        4 => CLType::U32,
        5 => CLType::U64,
        6 => CLType::U128,
        7 => CLType::U256,
        8 => CLType::U512,
        9 => CLType::Unit,
        10 => CLType::String,
        11 => CLType::Key,
        12 => CLType::URef,
        13 => CLType::Option(nested(reader)?),
        14 => CLType::List(nested(reader)?),
        15 => CLType::ByteArray(reader.read_u32()?),
        16 => {
            let ok = nested(reader)?;
            let err = nested(reader)?;
            CLType::Result { ok, err }
        }
        17 => {
            let key = nested(reader)?;
            let value = nested(reader)?;
            CLType::Map { key, value }
        }
        18 => CLType::Tuple1(nested(reader)?),
        19 => {
            let a = nested(reader)?;
            let b = nested(reader)?;
            CLType::Tuple2(a, b)
        }
        20 => {
            let a = nested(reader)?;
            let b = nested(reader)?;
            let c = nested(reader)?;
            CLType::Tuple3(a, b, c)
        }
        21 => CLType::Any,
        22 => CLType::PublicKey,
        other => return Err(ClValueError::UnknownType(other.to_string())),
    };
    Ok(ty)
}

// ============================================================================
// CLValue from bytes
// ============================================================================

impl CLValue {
    /// Decodes a complete payload of the given type.
    ///
    /// # Errors
    ///
    /// Fails on truncated or malformed payloads and when bytes are left over.
    pub fn from_bytes(ty: &CLType, bytes: &[u8]) -> Result<Self, ClValueError> {
        let mut reader = ByteReader::new(bytes);
        let value = decode(ty, &mut reader)?;
        if !reader.is_empty() {
            return Err(ClValueError::TrailingBytes(reader.remaining()));
        }
        Ok(value)
    }
}

fn check_count(count: usize, item_len: usize, reader: &ByteReader<'_>) -> Result<(), ClValueError> {
    let fits = if item_len == 0 {
        count <= MAX_ZERO_SIZED_ITEMS
    } else {
        count.saturating_mul(item_len) <= reader.remaining()
    };
    if fits {
        Ok(())
    } else {
        Err(ClValueError::end_of_bytes(
            count.saturating_mul(item_len),
            reader.remaining(),
        ))
    }
}

/// Decodes one value of type `ty` from the reader.
///
/// # Errors
///
/// Fails on truncated payloads and invalid discriminants.
pub fn decode(ty: &CLType, reader: &mut ByteReader<'_>) -> Result<CLValue, ClValueError> {
    let value = match ty {
        CLType::Bool => CLValue::Bool(reader.read_bool()?),
        CLType::I32 => CLValue::I32(reader.read_i32()?),
        CLType::I64 => CLValue::I64(reader.read_i64()?),
        CLType::U8 => CLValue::U8(reader.read_u8()?),
        CLType::U32 => CLValue::U32(reader.read_u32()?),
        CLType::U64 => CLValue::U64(reader.read_u64()?),
        CLType::U128 => CLValue::U128(reader.read_big_uint(16)?),
        CLType::U256 => CLValue::U256(reader.read_big_uint(32)?),
        CLType::U512 => CLValue::U512(reader.read_big_uint(64)?),
        CLType::Unit => CLValue::Unit,
        CLType::String => CLValue::String(reader.read_string()?),
        CLType::Key => CLValue::Key(decode_key(reader)?),
        CLType::URef => CLValue::URef(decode_uref(reader)?),
        CLType::PublicKey => CLValue::PublicKey(decode_public_key(reader)?),
        CLType::Option(inner) => {
            let value = match reader.read_u8()? {
                0 => None,
                1 => Some(Box::new(decode(inner, reader)?)),
                tag => return Err(ClValueError::invalid_tag("option", tag)),
            };
            CLValue::Option {
                inner_type: (**inner).clone(),
                value,
            }
        }
        CLType::List(inner) => {
            let count = reader.read_u32()? as usize;
            check_count(count, inner.min_encoded_len(), reader)?;
            let items = (0..count)
                .map(|_| decode(inner, reader))
                .collect::<Result<Vec<_>, _>>()?;
            CLValue::List {
                item_type: (**inner).clone(),
                items,
            }
        }
        CLType::ByteArray(length) => CLValue::ByteArray(reader.take(*length as usize)?.to_vec()),
        CLType::Result { ok, err } => match reader.read_u8()? {
            0 => CLValue::Result(Err(Box::new(decode(err, reader)?))),
            1 => CLValue::Result(Ok(Box::new(decode(ok, reader)?))),
            tag => return Err(ClValueError::invalid_tag("result", tag)),
        },
        CLType::Map { key, value } => {
            let count = reader.read_u32()? as usize;
            check_count(count, key.min_encoded_len() + value.min_encoded_len(), reader)?;
            let entries = (0..count)
                .map(|_| Ok((decode(key, reader)?, decode(value, reader)?)))
                .collect::<Result<Vec<_>, ClValueError>>()?;
            CLValue::Map(entries)
        }
        CLType::Tuple1(a) => CLValue::Tuple(vec![decode(a, reader)?]),
        CLType::Tuple2(a, b) => CLValue::Tuple(vec![decode(a, reader)?, decode(b, reader)?]),
        CLType::Tuple3(a, b, c) => CLValue::Tuple(vec![
            decode(a, reader)?,
            decode(b, reader)?,
            decode(c, reader)?,
        ]),
        CLType::Any => CLValue::Any(reader.take_rest().to_vec()),
    };
    Ok(value)
}

fn decode_uref(reader: &mut ByteReader<'_>) -> Result<URef, ClValueError> {
    let address = reader.read_hash()?;
    let access_rights = reader.read_u8()?;
    Ok(URef {
        address,
        access_rights,
    })
}

fn decode_public_key(reader: &mut ByteReader<'_>) -> Result<PublicKey, ClValueError> {
    let tag = reader.read_u8()?;
    let length = PublicKey::key_length(tag).ok_or(ClValueError::invalid_tag("public key", tag))?;
    let raw = reader.take(length)?;
    PublicKey::from_tagged(tag, raw).ok_or(ClValueError::invalid_tag("public key", tag))
}

fn decode_key(reader: &mut ByteReader<'_>) -> Result<Key, ClValueError> {
    let tag = reader.read_u8()?;
    let key = match tag {
        0 => Key::Account(AccountHash(reader.read_hash()?)),
        1 => Key::Hash(reader.read_hash()?),
        2 => Key::URef(decode_uref(reader)?),
        3 => Key::Transfer(reader.read_hash()?),
        4 => Key::DeployInfo(reader.read_hash()?),
        5 => Key::EraInfo(reader.read_u64()?),
        6 => Key::Balance(reader.read_hash()?),
        7 => Key::Bid(reader.read_hash()?),
        8 => Key::Withdraw(reader.read_hash()?),
        9 => Key::Dictionary(reader.read_hash()?),
        10 => Key::SystemContractRegistry(reader.read_hash()?),
        11 => Key::EraSummary(reader.read_hash()?),
        12 => Key::Unbond(reader.read_hash()?),
        13 => Key::ChainspecRegistry(reader.read_hash()?),
        14 => Key::ChecksumRegistry(reader.read_hash()?),
        16 => Key::Package(reader.read_hash()?),
        17 => Key::AddressableEntity(decode_entity_addr(reader)?),
        24 => Key::State(decode_entity_addr(reader)?),
        other => Key::Other {
            tag: other,
            bytes: other_key_bytes(other, reader)?,
        },
    };
    Ok(key)
}

fn decode_entity_addr(reader: &mut ByteReader<'_>) -> Result<EntityAddr, ClValueError> {
    let tag = reader.read_u8()?;
    let kind = EntityKind::from_tag(tag).ok_or(ClValueError::invalid_tag("entity kind", tag))?;
    Ok(EntityAddr {
        kind,
        addr: reader.read_hash()?,
    })
}

/// Raw bytes of a key variant kept undecoded.
///
/// Known layouts are consumed exactly so the key can sit inside a list or
/// tuple; unknown tags and sub-tags take the rest of the payload.
fn other_key_bytes(tag: u8, reader: &mut ByteReader<'_>) -> Result<Vec<u8>, ClValueError> {
    let mut bytes = Vec::new();
    match tag {
        // BidAddr
        15 => read_tagged(reader, &mut bytes, |sub| match sub {
            0 | 1 => Some(32),
            2 | 3 => Some(64),
            4 => Some(40),
            _ => None,
        })?,
        // ByteCode
        18 => read_tagged(reader, &mut bytes, |sub| match sub {
            0 => Some(0),
            1 | 2 => Some(32),
            _ => None,
        })?,
        // Message: entity, topic hash, optional index
        19 => {
            read_entity_bytes(reader, &mut bytes)?;
            bytes.extend_from_slice(reader.take(32)?);
            read_tagged(reader, &mut bytes, |sub| match sub {
                0 => Some(0),
                1 => Some(4),
                _ => None,
            })?;
        }
        // NamedKey: entity, name hash
        20 => {
            read_entity_bytes(reader, &mut bytes)?;
            bytes.extend_from_slice(reader.take(32)?);
        }
        // BlockGlobal: tag plus zero padding
        21 => read_tagged(reader, &mut bytes, |_| Some(31))?,
        // BalanceHold: purse and block time
        22 => read_tagged(reader, &mut bytes, |_| Some(40))?,
        // EntryPoint: entity, then name hash or selector
        23 => {
            let sub = reader.read_u8()?;
            bytes.push(sub);
            read_entity_bytes(reader, &mut bytes)?;
            match sub {
                0 => bytes.extend_from_slice(reader.take(32)?),
                1 => bytes.extend_from_slice(reader.take(4)?),
                _ => bytes.extend_from_slice(reader.take_rest()),
            }
        }
        _ => bytes.extend_from_slice(reader.take_rest()),
    }
    Ok(bytes)
}

fn read_tagged(
    reader: &mut ByteReader<'_>,
    bytes: &mut Vec<u8>,
    body_len: impl Fn(u8) -> Option<usize>,
) -> Result<(), ClValueError> {
    let sub = reader.read_u8()?;
    bytes.push(sub);
    let body = match body_len(sub) {
        Some(len) => reader.take(len)?,
        None => reader.take_rest(),
    };
    bytes.extend_from_slice(body);
    Ok(())
}

fn read_entity_bytes(reader: &mut ByteReader<'_>, bytes: &mut Vec<u8>) -> Result<(), ClValueError> {
    let entity = decode_entity_addr(reader)?;
    bytes.push(entity.kind.tag());
    bytes.extend_from_slice(&entity.addr);
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
