use crate::types::{Address, ValidationError};
use ethers::types::U256;
use serde_json::Value;
use std::fmt;

/// An inbound transaction request, parsed once from its wire-side JSON form
/// into a per-protocol tagged union.
///
/// `version` 3 selects the current protocol; anything else, the absent case
/// included, selects the legacy protocol. Every field is optional at parse
/// time: which fields are required, and in which order their absence is
/// reported, is the validator's business, so a missing field surfaces as
/// [`ValidationError::MissingField`] at the same point in the check chain
/// where the protocol demands it.
#[derive(Debug, Clone)]
pub enum TransactionRequest {
    V2(RequestV2),
    V3(RequestV3),
}

/// A wire-side amount (`value`, `fee`).
///
/// Covers the full unsigned 256-bit range, and keeps the magnitude of a
/// negative input instead of failing the parse, so the "value < 0" rejection
/// fires inside the validator chain where the protocol places it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireAmount {
    Unsigned(U256),
    /// A negative input, stored as its absolute value (never zero)
    Negative(U256),
}

impl WireAmount {
    pub fn is_negative(&self) -> bool {
        matches!(self, WireAmount::Negative(_))
    }
}

impl fmt::Display for WireAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireAmount::Unsigned(abs) => write!(f, "{abs}"),
            WireAmount::Negative(abs) => write!(f, "-{abs}"),
        }
    }
}

/// Legacy-protocol transfer request (flat-fee model)
#[derive(Debug, Clone, Default)]
pub struct RequestV2 {
    pub from: Option<Address>,
    pub to: Option<Address>,
    pub value: Option<WireAmount>,
    pub fee: Option<WireAmount>,
    pub timestamp: Option<u64>,
    pub nonce: Option<U256>,
}

/// Current-protocol request (step-metered fee model)
#[derive(Debug, Clone, Default)]
pub struct RequestV3 {
    pub from: Option<Address>,
    pub to: Option<Address>,
    pub value: Option<WireAmount>,
    pub step_limit: Option<U256>,
    pub timestamp: Option<u64>,
    pub nonce: Option<U256>,
    pub data_type: Option<String>,
    /// Nested payload kept as-is; the size rule and the call/deploy
    /// validators walk it structurally
    pub data: Option<Value>,
}

impl TransactionRequest {
    /// Parse a request from its JSON mapping.
    ///
    /// Numeric fields accept JSON integers or `0x`-prefixed hex strings;
    /// address fields accept any string (non-canonical text becomes an
    /// opaque ledger key, never a parse error).
    pub fn from_value(raw: &Value) -> Result<Self, ValidationError> {
        let fields = raw.as_object().ok_or_else(|| {
            ValidationError::InvalidParameter("transaction request must be an object".to_string())
        })?;

        let version = fields
            .get("version")
            .map(|v| parse_uint(v, "version"))
            .transpose()?;

        let from = fields
            .get("from")
            .map(|v| parse_address(v, "from"))
            .transpose()?;
        let to = fields.get("to").map(|v| parse_address(v, "to")).transpose()?;
        let value = fields
            .get("value")
            .map(|v| parse_amount(v, "value"))
            .transpose()?;
        let timestamp = fields
            .get("timestamp")
            .map(|v| parse_timestamp(v))
            .transpose()?;
        let nonce = fields
            .get("nonce")
            .map(|v| parse_uint(v, "nonce"))
            .transpose()?;

        if version == Some(U256::from(3u8)) {
            Ok(TransactionRequest::V3(RequestV3 {
                from,
                to,
                value,
                step_limit: fields
                    .get("stepLimit")
                    .map(|v| parse_uint(v, "stepLimit"))
                    .transpose()?,
                timestamp,
                nonce,
                data_type: fields
                    .get("dataType")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                data: fields.get("data").cloned(),
            }))
        } else {
            Ok(TransactionRequest::V2(RequestV2 {
                from,
                to,
                value,
                fee: fields
                    .get("fee")
                    .map(|v| parse_amount(v, "fee"))
                    .transpose()?,
                timestamp,
                nonce,
            }))
        }
    }
}

fn invalid_field(field: &str, value: &Value) -> ValidationError {
    ValidationError::InvalidParameter(format!("invalid value for '{field}': {value}"))
}

fn parse_address(value: &Value, field: &'static str) -> Result<Address, ValidationError> {
    value
        .as_str()
        .map(Address::from_string)
        .ok_or_else(|| invalid_field(field, value))
}

fn parse_uint(value: &Value, field: &'static str) -> Result<U256, ValidationError> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .map(U256::from)
            .ok_or_else(|| invalid_field(field, value)),
        Value::String(s) => {
            let parsed = match s.strip_prefix("0x") {
                Some(hex) => U256::from_str_radix(hex, 16).ok(),
                None => U256::from_dec_str(s).ok(),
            };
            parsed.ok_or_else(|| invalid_field(field, value))
        }
        _ => Err(invalid_field(field, value)),
    }
}

fn parse_amount(value: &Value, field: &'static str) -> Result<WireAmount, ValidationError> {
    let signed = |abs: U256| {
        if abs.is_zero() {
            // "-0" is not a negative amount
            WireAmount::Unsigned(abs)
        } else {
            WireAmount::Negative(abs)
        }
    };
    match value {
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                Ok(WireAmount::Unsigned(U256::from(u)))
            } else if let Some(i) = n.as_i64() {
                Ok(signed(U256::from(i.unsigned_abs())))
            } else {
                Err(invalid_field(field, value))
            }
        }
        Value::String(s) => {
            let parsed = if let Some(hex) = s.strip_prefix("0x") {
                // Hex amounts are unsigned and span the full 256-bit range
                U256::from_str_radix(hex, 16).ok().map(WireAmount::Unsigned)
            } else if let Some(rest) = s.strip_prefix('-') {
                U256::from_dec_str(rest).ok().map(signed)
            } else {
                U256::from_dec_str(s).ok().map(WireAmount::Unsigned)
            };
            parsed.ok_or_else(|| invalid_field(field, value))
        }
        _ => Err(invalid_field(field, value)),
    }
}

fn parse_timestamp(value: &Value) -> Result<u64, ValidationError> {
    let parsed = parse_uint(value, "timestamp")?;
    if parsed > U256::from(u64::MAX) {
        return Err(invalid_field("timestamp", value));
    }
    Ok(parsed.as_u64())
}
