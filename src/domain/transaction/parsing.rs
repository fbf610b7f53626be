//! JSON parsing logic for transactions and legacy deploys.
//!
//! Accepts the current transaction JSON (bare or wrapped in `Version1`) and
//! the legacy deploy JSON (bare or wrapped in `Deploy`/`deploy`).

use chrono::{DateTime, TimeDelta, Utc};
use serde_json::Value;

use super::{
    Approval, AuctionOperation, EntryPoint, InitiatorAddr, PricingMode, StoredTargetId, Target,
    Transaction,
};
use crate::domain::cl_value::RuntimeArgs;
use crate::domain::error::TransactionParseError;
use crate::domain::keys::strip_prefix;

const WRAPPER_KEYS: [&str; 4] = ["Version1", "Deploy", "deploy", "transaction"];

impl Transaction {
    /// Create a new transaction from its JSON text.
    ///
    /// # Errors
    ///
    /// Returns `TransactionParseError` if the text is not JSON or is not a
    /// recognisable transaction or deploy.
    pub fn from_json_str(text: &str) -> Result<Self, TransactionParseError> {
        let json: Value = serde_json::from_str(text)?;
        Self::from_json(&json)
    }

    /// Create a new transaction from JSON data.
    ///
    /// # Arguments
    ///
    /// * `json` - Transaction or deploy JSON, optionally wrapped
    ///
    /// # Returns
    ///
    /// A parsed `Transaction`, or an error if required fields are missing.
    ///
    /// # Errors
    ///
    /// Returns `TransactionParseError` for missing or malformed fields.
    pub fn from_json(json: &Value) -> Result<Self, TransactionParseError> {
        let inner = unwrap_envelope(json);
        if inner.get("payload").is_some() {
            parse_transaction_v1(inner, json)
        } else if inner.get("header").is_some() {
            parse_deploy(inner, json)
        } else {
            Err(TransactionParseError::MissingField("payload"))
        }
    }
}

fn unwrap_envelope(json: &Value) -> &Value {
    let mut current = json;
    while let Some(inner) = WRAPPER_KEYS.iter().find_map(|key| current.get(*key)) {
        current = inner;
    }
    current
}

// ============================================================================
// Shared Field Extraction
// ============================================================================

fn required_str<'a>(json: &'a Value, field: &'static str) -> Result<&'a str, TransactionParseError> {
    json[field]
        .as_str()
        .ok_or(TransactionParseError::MissingField(field))
}

fn extract_hash(json: &Value) -> Result<String, TransactionParseError> {
    match &json["hash"] {
        Value::String(hash) => Ok(hash.clone()),
        // Some encoders wrap the hash as {"Version1": "<hex>"}.
        Value::Object(object) => object
            .values()
            .find_map(Value::as_str)
            .map(String::from)
            .ok_or_else(|| TransactionParseError::invalid("hash", "expected a hex string")),
        _ => Err(TransactionParseError::MissingField("hash")),
    }
}

fn extract_timestamp(json: &Value) -> Result<DateTime<Utc>, TransactionParseError> {
    let text = required_str(json, "timestamp")?;
    DateTime::parse_from_rfc3339(text)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| TransactionParseError::invalid("timestamp", e.to_string()))
}

fn extract_approvals(json: &Value) -> Vec<Approval> {
    json["approvals"]
        .as_array()
        .map(|approvals| {
            approvals
                .iter()
                .filter_map(|approval| {
                    Some(Approval {
                        signer: approval["signer"].as_str()?.to_string(),
                        signature: approval["signature"].as_str().unwrap_or("").to_string(),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

fn decode_module_bytes(text: &str) -> Result<Vec<u8>, TransactionParseError> {
    hex::decode(text).map_err(|e| TransactionParseError::invalid("module_bytes", e.to_string()))
}

fn amount_string(value: &Value) -> Option<String> {
    match value {
        Value::Number(number) => Some(number.to_string()),
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        _ => None,
    }
}

fn optional_version(value: &Value) -> Option<u32> {
    value.as_u64().and_then(|v| u32::try_from(v).ok())
}

/// Parses a human-readable duration such as `30m`, `1h 30m`, `1day` or `500ms`.
///
/// # Errors
///
/// Returns `TransactionParseError::InvalidField` for unknown units, missing
/// numbers, or overflowing totals.
pub fn parse_ttl(text: &str) -> Result<TimeDelta, TransactionParseError> {
    let invalid = |message: &str| TransactionParseError::invalid("ttl", format!("{message} in '{text}'"));

    let mut total_ms: i64 = 0;
    let mut chars = text.trim().chars().peekable();
    let mut seen_component = false;

    while chars.peek().is_some() {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        if chars.peek().is_none() {
            break;
        }

        let mut number = String::new();
        while let Some(c) = chars.next_if(char::is_ascii_digit) {
            number.push(c);
        }
        let mut unit = String::new();
        while let Some(c) = chars.next_if(char::is_ascii_alphabetic) {
            unit.push(c);
        }

        let amount: i64 = number.parse().map_err(|_| invalid("missing number"))?;
        let unit_ms: i64 = match unit.as_str() {
            "ms" | "msec" | "msecs" => 1,
            "s" | "sec" | "secs" | "second" | "seconds" => 1_000,
            "m" | "min" | "mins" | "minute" | "minutes" => 60_000,
            "h" | "hr" | "hrs" | "hour" | "hours" => 3_600_000,
            "d" | "day" | "days" => 86_400_000,
            _ => return Err(invalid("unknown unit")),
        };
        let component = amount.checked_mul(unit_ms).ok_or_else(|| invalid("overflow"))?;
        total_ms = total_ms.checked_add(component).ok_or_else(|| invalid("overflow"))?;
        seen_component = true;
    }

    if !seen_component {
        return Err(invalid("empty duration"));
    }
    TimeDelta::try_milliseconds(total_ms).ok_or_else(|| invalid("overflow"))
}

// ============================================================================
// Transaction V1
// ============================================================================

fn parse_transaction_v1(json: &Value, raw: &Value) -> Result<Transaction, TransactionParseError> {
    let payload = &json["payload"];
    let fields = &payload["fields"];

    Ok(Transaction {
        hash: extract_hash(json)?,
        chain_name: required_str(payload, "chain_name")?.to_string(),
        initiator: parse_initiator(&payload["initiator_addr"])?,
        timestamp: extract_timestamp(payload)?,
        ttl: parse_ttl(required_str(payload, "ttl")?)?,
        entry_point: parse_entry_point(&fields["entry_point"])?,
        target: parse_target(&fields["target"])?,
        args: RuntimeArgs::from_json(&fields["args"])?,
        approvals: extract_approvals(json),
        pricing_mode: parse_pricing_mode(&payload["pricing_mode"]),
        is_legacy_deploy: false,
        raw_json: raw.clone(),
    })
}

fn parse_initiator(json: &Value) -> Result<InitiatorAddr, TransactionParseError> {
    if let Some(key) = json["PublicKey"].as_str() {
        return Ok(InitiatorAddr::PublicKey(key.to_string()));
    }
    if let Some(hash) = json["AccountHash"].as_str() {
        return Ok(InitiatorAddr::AccountHash(strip_prefix(hash)));
    }
    Err(TransactionParseError::MissingField("initiator_addr"))
}

fn parse_entry_point(json: &Value) -> Result<EntryPoint, TransactionParseError> {
    if let Some(name) = json["Custom"].as_str() {
        return Ok(EntryPoint::Custom(name.to_string()));
    }
    let name = json
        .as_str()
        .ok_or(TransactionParseError::MissingField("entry_point"))?;
    Ok(match name {
        "Transfer" => EntryPoint::Transfer,
        "Call" => EntryPoint::Call,
        other => AuctionOperation::from_name(other)
            .map_or_else(|| EntryPoint::Other(other.to_string()), EntryPoint::Auction),
    })
}

fn parse_target(json: &Value) -> Result<Target, TransactionParseError> {
    if json.as_str() == Some("Native") {
        return Ok(Target::Native);
    }
    if let Some(session) = json.get("Session") {
        let module_bytes = decode_module_bytes(session["module_bytes"].as_str().unwrap_or(""))?;
        return Ok(Target::Session { module_bytes });
    }
    if let Some(stored) = json.get("Stored") {
        return parse_stored_id(&stored["id"]).map(Target::Stored);
    }
    Err(TransactionParseError::MissingField("target"))
}

fn parse_stored_id(json: &Value) -> Result<StoredTargetId, TransactionParseError> {
    if let Some(hash) = json["ByHash"].as_str() {
        return Ok(StoredTargetId::ByHash(strip_prefix(hash)));
    }
    if let Some(name) = json["ByName"].as_str() {
        return Ok(StoredTargetId::ByName(name.to_string()));
    }
    if let Some(by_package) = json.get("ByPackageHash") {
        let addr = by_package["addr"]
            .as_str()
            .ok_or(TransactionParseError::MissingField("ByPackageHash.addr"))?;
        return Ok(StoredTargetId::ByPackageHash {
            addr: strip_prefix(addr),
            version: optional_version(&by_package["version"]),
        });
    }
    if let Some(by_name) = json.get("ByPackageName") {
        let name = by_name["name"]
            .as_str()
            .ok_or(TransactionParseError::MissingField("ByPackageName.name"))?;
        return Ok(StoredTargetId::ByPackageName {
            name: name.to_string(),
            version: optional_version(&by_name["version"]),
        });
    }
    Err(TransactionParseError::invalid("target", "unrecognised stored target id"))
}

fn small_uint(json: &Value, field: &str) -> u8 {
    json[field]
        .as_u64()
        .and_then(|v| u8::try_from(v).ok())
        .unwrap_or(0)
}

fn parse_pricing_mode(json: &Value) -> Option<PricingMode> {
    if let Some(limited) = json.get("PaymentLimited") {
        return Some(PricingMode::PaymentLimited {
            payment_amount: amount_string(&limited["payment_amount"])?,
            gas_price_tolerance: small_uint(limited, "gas_price_tolerance"),
            standard_payment: limited["standard_payment"].as_bool().unwrap_or(true),
        });
    }
    if let Some(fixed) = json.get("Fixed") {
        return Some(PricingMode::Fixed {
            gas_price_tolerance: small_uint(fixed, "gas_price_tolerance"),
            additional_computation_factor: small_uint(fixed, "additional_computation_factor"),
        });
    }
    json.get("Prepaid").map(|prepaid| PricingMode::Prepaid {
        receipt: prepaid["receipt"].as_str().unwrap_or("").to_string(),
    })
}

// ============================================================================
// Legacy Deploy
// ============================================================================

fn parse_deploy(json: &Value, raw: &Value) -> Result<Transaction, TransactionParseError> {
    let header = &json["header"];
    let (entry_point, target, args) = parse_session(&json["session"])?;

    Ok(Transaction {
        hash: extract_hash(json)?,
        chain_name: required_str(header, "chain_name")?.to_string(),
        initiator: InitiatorAddr::PublicKey(required_str(header, "account")?.to_string()),
        timestamp: extract_timestamp(header)?,
        ttl: parse_ttl(required_str(header, "ttl")?)?,
        entry_point,
        target,
        args,
        approvals: extract_approvals(json),
        pricing_mode: parse_payment(&json["payment"])?,
        is_legacy_deploy: true,
        raw_json: raw.clone(),
    })
}

fn parse_session(json: &Value) -> Result<(EntryPoint, Target, RuntimeArgs), TransactionParseError> {
    let (kind, body) = json
        .as_object()
        .and_then(|object| object.iter().next())
        .ok_or(TransactionParseError::MissingField("session"))?;
    let args = RuntimeArgs::from_json(&body["args"])?;
    let custom = || -> Result<EntryPoint, TransactionParseError> {
        Ok(EntryPoint::Custom(required_str(body, "entry_point")?.to_string()))
    };
    let version = || optional_version(&body["version"]);

    let (entry_point, target) = match kind.as_str() {
        "Transfer" => (EntryPoint::Transfer, Target::Native),
        "ModuleBytes" => (
            EntryPoint::Call,
            Target::Session {
                module_bytes: decode_module_bytes(body["module_bytes"].as_str().unwrap_or(""))?,
            },
        ),
        "StoredContractByHash" => (
            custom()?,
            Target::Stored(StoredTargetId::ByHash(strip_prefix(required_str(body, "hash")?))),
        ),
        "StoredContractByName" => (
            custom()?,
            Target::Stored(StoredTargetId::ByName(required_str(body, "name")?.to_string())),
        ),
        "StoredVersionedContractByHash" => (
            custom()?,
            Target::Stored(StoredTargetId::ByPackageHash {
                addr: strip_prefix(required_str(body, "hash")?),
                version: version(),
            }),
        ),
        "StoredVersionedContractByName" => (
            custom()?,
            Target::Stored(StoredTargetId::ByPackageName {
                name: required_str(body, "name")?.to_string(),
                version: version(),
            }),
        ),
        other => {
            return Err(TransactionParseError::invalid(
                "session",
                format!("unknown session kind '{other}'"),
            ));
        }
    };
    Ok((entry_point, target, args))
}

/// Standard payment becomes a payment-limited pricing mode.
fn parse_payment(json: &Value) -> Result<Option<PricingMode>, TransactionParseError> {
    let Some((_, body)) = json.as_object().and_then(|object| object.iter().next()) else {
        return Ok(None);
    };
    let args = RuntimeArgs::from_json(&body["args"])?;
    let standard_payment = body["module_bytes"].as_str().is_some_and(str::is_empty);
    Ok(args
        .get("amount")
        .and_then(|amount| amount.integer_string())
        .map(|payment_amount| PricingMode::PaymentLimited {
            payment_amount,
            gas_price_tolerance: 1,
            standard_payment,
        }))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cl_value::CLValue;
    use crate::test_utils::TxJsonMother;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case::minutes("30m", 30 * 60_000)]
    #[case::compound("1h 30m", 90 * 60_000)]
    #[case::concatenated("1h30m", 90 * 60_000)]
    #[case::day("1day", 86_400_000)]
    #[case::millis("500ms", 500)]
    #[case::seconds("2s", 2_000)]
    fn test_parse_ttl(#[case] input: &str, #[case] expected_ms: i64) {
        assert_eq!(parse_ttl(input).unwrap().num_milliseconds(), expected_ms);
    }

    #[rstest]
    #[case::empty("")]
    #[case::no_number("m")]
    #[case::bad_unit("5 parsecs")]
    fn test_parse_ttl_rejects(#[case] input: &str) {
        assert!(parse_ttl(input).is_err());
    }

    #[test]
    fn test_parse_v1_native_transfer() {
        let tx = Transaction::from_json(&TxJsonMother::native_transfer()).unwrap();
        assert_eq!(tx.chain_name, "casper-test");
        assert_eq!(tx.entry_point, EntryPoint::Transfer);
        assert_eq!(tx.target, Target::Native);
        assert!(!tx.is_legacy_deploy);
        assert_eq!(tx.limited_payment_amount(), Some("100000000"));
        assert_eq!(tx.expires(), "2024-01-01T00:30:00.000Z");
        assert_eq!(tx.approvals.len(), 1);
        assert!(tx.args.contains("target"));
    }

    #[test]
    fn test_parse_v1_wrapped_custom_call() {
        let json = json!({ "Version1": TxJsonMother::custom_call_by_package("transfer", "ab".repeat(32).as_str()) });
        let tx = Transaction::from_json(&json).unwrap();
        assert_eq!(tx.entry_point, EntryPoint::Custom("transfer".to_string()));
        assert_eq!(tx.target_package_hash(), Some("ab".repeat(32)));
    }

    #[test]
    fn test_parse_v1_auction_entry_point() {
        let mut json = TxJsonMother::native_transfer();
        json["payload"]["fields"]["entry_point"] = json!("Delegate");
        let tx = Transaction::from_json(&json).unwrap();
        assert_eq!(tx.entry_point, EntryPoint::Auction(AuctionOperation::Delegate));

        json["payload"]["fields"]["entry_point"] = json!("Burn");
        let tx = Transaction::from_json(&json).unwrap();
        assert_eq!(tx.entry_point, EntryPoint::Other("Burn".to_string()));
    }

    #[test]
    fn test_parse_v1_session_and_fixed_pricing() {
        let mut json = TxJsonMother::native_transfer();
        json["payload"]["fields"]["target"] =
            json!({"Session": {"module_bytes": "0061736d", "runtime": "VmCasperV1", "is_install_upgrade": false}});
        json["payload"]["fields"]["entry_point"] = json!("Call");
        json["payload"]["pricing_mode"] = json!({"Fixed": {"gas_price_tolerance": 5, "additional_computation_factor": 0}});
        let tx = Transaction::from_json(&json).unwrap();
        assert_eq!(tx.module_bytes(), Some(&[0x00, 0x61, 0x73, 0x6d][..]));
        assert_eq!(tx.limited_payment_amount(), None);
    }

    #[test]
    fn test_parse_v1_account_hash_initiator() {
        let mut json = TxJsonMother::native_transfer();
        json["payload"]["initiator_addr"] = json!({"AccountHash": format!("account-hash-{}", "cd".repeat(32))});
        let tx = Transaction::from_json(&json).unwrap();
        assert_eq!(tx.initiator, InitiatorAddr::AccountHash("cd".repeat(32)));
    }

    #[test]
    fn test_parse_legacy_deploy_stored_call() {
        let tx = Transaction::from_json(&TxJsonMother::deploy_stored_call("delegate", &"ef".repeat(32))).unwrap();
        assert!(tx.is_legacy_deploy);
        assert_eq!(tx.entry_point, EntryPoint::Custom("delegate".to_string()));
        assert_eq!(tx.target_contract_hash(), Some("ef".repeat(32)));
        assert_eq!(tx.limited_payment_amount(), Some("2500000000"));
        assert_eq!(tx.chain_name, "casper");
        assert!(matches!(tx.initiator, InitiatorAddr::PublicKey(_)));
        assert!(matches!(tx.args.get("amount"), Some(CLValue::U512(_))));
    }

    #[test]
    fn test_parse_legacy_deploy_transfer() {
        let mut json = TxJsonMother::deploy_stored_call("delegate", &"ef".repeat(32));
        json["session"] = json!({"Transfer": {"args": []}});
        let tx = Transaction::from_json(&json!({ "deploy": json })).unwrap();
        assert_eq!(tx.entry_point, EntryPoint::Transfer);
        assert_eq!(tx.target, Target::Native);
    }

    #[test]
    fn test_rejects_unrecognised_json() {
        assert!(matches!(
            Transaction::from_json(&json!({"foo": 1})),
            Err(TransactionParseError::MissingField("payload"))
        ));
        assert!(matches!(
            Transaction::from_json_str("{not json"),
            Err(TransactionParseError::Json(_))
        ));
    }

    #[test]
    fn test_rejects_bad_timestamp() {
        let mut json = TxJsonMother::native_transfer();
        json["payload"]["timestamp"] = json!("yesterday");
        assert!(matches!(
            Transaction::from_json(&json),
            Err(TransactionParseError::InvalidField { field: "timestamp", .. })
        ));
    }
}
