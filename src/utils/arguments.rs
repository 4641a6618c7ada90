//! Text to ABI value conversion
//!
//! Converts operator input into typed call arguments and renders typed values
//! back into text, driven by the ABI type of each parameter.
//!
//! ## Input conventions
//!
//! | Shape      | Types                                        | Example input            |
//! |------------|----------------------------------------------|--------------------------|
//! | textual    | `string`, `address`, `bytes`, `bytesN`, `function` | `hello`, `0xd8dA…6045` |
//! | numeric    | `intN`, `uintN`                              | `42`, `-7`, `0x2a`       |
//! | structured | `bool`, `T[]`, `T[N]`, tuples                | `true`, `[1, 2]`, `["0xab", 3]` |
//!
//! Textual input is taken verbatim as a JSON string, so `42` entered for a
//! `string` parameter is the string `"42"` while the same text entered for a
//! `uint256` is the number 42. Structured input is JSON; inside it, textual
//! elements are JSON strings and integers may be JSON numbers or strings.

use alloy::dyn_abi::{DynSolType, DynSolValue, Specifier};
use alloy::hex;
use alloy::json_abi::Param;
use alloy::primitives::U256;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::ui::formatter::print_info;
use crate::ui::input::{input_text, InputError, Prompter};

/// Errors that can occur while encoding or rendering values
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("no value provided")]
    Empty,

    #[error("Invalid value '{input}' for type '{ty}': {reason}")]
    InvalidValue {
        ty: String,
        input: String,
        reason: String,
    },

    #[error("JSON parsing error: {0}")]
    Json(String),

    #[error("Type/value mismatch: expected {expected} but got {actual}")]
    TypeMismatch { expected: String, actual: String },

    #[error("Array length mismatch for {ty}: expected {expected}, got {actual}")]
    LengthMismatch {
        ty: String,
        expected: usize,
        actual: usize,
    },

    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    #[error("Invalid parameter type '{ty}': {reason}")]
    InvalidType { ty: String, reason: String },

    #[error("Failed to encode call data: {0}")]
    Encoding(String),

    #[error("Failed to decode return data: {0}")]
    Decoding(String),
}

impl From<serde_json::Error> for CodecError {
    fn from(err: serde_json::Error) -> Self {
        CodecError::Json(err.to_string())
    }
}

/// How raw text is interpreted for a given type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// String-like: the raw text is the value, never parsed as JSON.
    Textual,
    /// Integer: the raw text is a bare literal parsed at full precision.
    Numeric,
    /// Boolean, array or tuple: the raw text is JSON.
    Structured,
}

impl Shape {
    pub fn of(ty: &DynSolType) -> Self {
        match ty {
            DynSolType::String
            | DynSolType::Address
            | DynSolType::Bytes
            | DynSolType::FixedBytes(_)
            | DynSolType::Function => Shape::Textual,
            DynSolType::Int(_) | DynSolType::Uint(_) => Shape::Numeric,
            _ => Shape::Structured,
        }
    }
}

/// Resolve the ABI type of a parameter, including tuple components.
pub fn param_type(param: &Param) -> Result<DynSolType, CodecError> {
    param.resolve().map_err(|e| CodecError::InvalidType {
        ty: param.ty.clone(),
        reason: e.to_string(),
    })
}

/// Convert operator text into a value of type `ty`.
pub fn encode(text: &str, ty: &DynSolType) -> Result<DynSolValue, CodecError> {
    let shape = Shape::of(ty);
    let blank = match shape {
        Shape::Textual => text.is_empty(),
        Shape::Numeric | Shape::Structured => text.trim().is_empty(),
    };
    if blank {
        return Err(CodecError::Empty);
    }

    match shape {
        Shape::Textual => {
            // string-like targets keep the text exactly as typed, surrounding
            // whitespace included
            debug!(ty = %ty, "Encoding textual value");
            from_json(&Value::String(text.to_string()), ty)
        }
        Shape::Numeric => {
            debug!(ty = %ty, "Encoding numeric value");
            coerce_leaf(text.trim(), ty)
        }
        Shape::Structured => {
            debug!(ty = %ty, "Encoding structured value");
            let json: Value = serde_json::from_str(text.trim())?;
            from_json(&json, ty)
        }
    }
}

/// Convert a JSON value into a value of type `ty`.
pub fn from_json(json: &Value, ty: &DynSolType) -> Result<DynSolValue, CodecError> {
    match ty {
        DynSolType::String => match json {
            Value::String(s) => Ok(DynSolValue::String(s.clone())),
            other => Err(mismatch("string", other)),
        },
        DynSolType::Bool => match json {
            Value::Bool(b) => Ok(DynSolValue::Bool(*b)),
            Value::String(s) => coerce_leaf(s, ty),
            other => Err(mismatch("bool", other)),
        },
        DynSolType::Int(_) | DynSolType::Uint(_) => match json {
            Value::Number(n) if n.is_i64() || n.is_u64() => coerce_leaf(&n.to_string(), ty),
            Value::Number(n) => Err(CodecError::InvalidValue {
                ty: ty.to_string(),
                input: n.to_string(),
                reason: "not an integer; quote large numbers as strings".to_string(),
            }),
            Value::String(s) => coerce_leaf(s.trim(), ty),
            other => Err(mismatch("integer", other)),
        },
        DynSolType::Address
        | DynSolType::Bytes
        | DynSolType::FixedBytes(_)
        | DynSolType::Function => match json {
            Value::String(s) => coerce_leaf(s.trim(), ty),
            other => Err(mismatch("hex string", other)),
        },
        DynSolType::Array(inner) => {
            let items = as_array(json, ty)?;
            items
                .iter()
                .map(|item| from_json(item, inner))
                .collect::<Result<Vec<_>, _>>()
                .map(DynSolValue::Array)
        }
        DynSolType::FixedArray(inner, len) => {
            let items = as_array(json, ty)?;
            if items.len() != *len {
                return Err(CodecError::LengthMismatch {
                    ty: ty.to_string(),
                    expected: *len,
                    actual: items.len(),
                });
            }
            items
                .iter()
                .map(|item| from_json(item, inner))
                .collect::<Result<Vec<_>, _>>()
                .map(DynSolValue::FixedArray)
        }
        DynSolType::Tuple(components) => {
            let items = as_array(json, ty)?;
            if items.len() != components.len() {
                return Err(CodecError::LengthMismatch {
                    ty: ty.to_string(),
                    expected: components.len(),
                    actual: items.len(),
                });
            }
            items
                .iter()
                .zip(components)
                .map(|(item, component)| from_json(item, component))
                .collect::<Result<Vec<_>, _>>()
                .map(DynSolValue::Tuple)
        }
        #[allow(unreachable_patterns)]
        other => Err(CodecError::UnsupportedType(other.to_string())),
    }
}

/// Render a value as display text.
///
/// The rendered text of any value is accepted by [`encode`] for the value's
/// own type and yields an equal value.
pub fn decode(value: &DynSolValue) -> Result<String, CodecError> {
    match value {
        DynSolValue::String(s) => Ok(s.clone()),
        DynSolValue::Bool(b) => Ok(b.to_string()),
        DynSolValue::Int(i, _) => Ok(i.to_string()),
        DynSolValue::Uint(u, _) => Ok(u.to_string()),
        DynSolValue::Address(a) => Ok(a.to_checksum(None)),
        DynSolValue::FixedBytes(word, size) => Ok(hex::encode_prefixed(&word[..*size])),
        DynSolValue::Bytes(b) => Ok(hex::encode_prefixed(b)),
        DynSolValue::Function(f) => Ok(hex::encode_prefixed(f)),
        DynSolValue::Array(_) | DynSolValue::FixedArray(_) | DynSolValue::Tuple(_) => {
            Ok(serde_json::to_string(&to_json(value)?)?)
        }
        #[allow(unreachable_patterns)]
        other => Err(CodecError::UnsupportedType(format!("{:?}", other))),
    }
}

/// Convert a value into its nested JSON form.
pub fn to_json(value: &DynSolValue) -> Result<Value, CodecError> {
    match value {
        DynSolValue::Bool(b) => Ok(Value::Bool(*b)),
        DynSolValue::Int(i, _) => Ok(integer_json(i.to_string())),
        DynSolValue::Uint(u, _) => Ok(integer_json(u.to_string())),
        DynSolValue::Array(items) | DynSolValue::FixedArray(items) | DynSolValue::Tuple(items) => {
            items
                .iter()
                .map(to_json)
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        }
        other => decode(other).map(Value::String),
    }
}

/// Values returned by a method call.
#[derive(Debug, Clone, PartialEq)]
pub enum CallOutput {
    Empty,
    Single(DynSolValue),
    Multiple(Vec<DynSolValue>),
}

impl CallOutput {
    /// All values in output order.
    pub fn values(&self) -> Vec<&DynSolValue> {
        match self {
            CallOutput::Empty => Vec::new(),
            CallOutput::Single(v) => vec![v],
            CallOutput::Multiple(vs) => vs.iter().collect(),
        }
    }
}

impl From<Vec<DynSolValue>> for CallOutput {
    fn from(mut values: Vec<DynSolValue>) -> Self {
        match values.len() {
            0 => CallOutput::Empty,
            1 => CallOutput::Single(values.remove(0)),
            _ => CallOutput::Multiple(values),
        }
    }
}

/// Error raised while collecting arguments interactively.
#[derive(Debug, Error)]
pub enum CollectError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Prompt for every parameter in order and encode the answers.
///
/// Empty answers re-prompt; an answer that does not parse ends collection.
pub fn collect_arguments(
    params: &[Param],
    prompter: &mut dyn Prompter,
) -> Result<Vec<DynSolValue>, CollectError> {
    let mut values = Vec::with_capacity(params.len());
    for param in params {
        let ty = param_type(param)?;
        let prompt = format!("{} ({}): ", param.name, param.ty);
        loop {
            let text = input_text(prompter, &prompt)?;
            match encode(&text, &ty) {
                Ok(value) => {
                    values.push(value);
                    break;
                }
                Err(CodecError::Empty) => print_info("...."),
                Err(e) => return Err(e.into()),
            }
        }
    }
    Ok(values)
}

fn coerce_leaf(text: &str, ty: &DynSolType) -> Result<DynSolValue, CodecError> {
    let invalid = |reason: String| CodecError::InvalidValue {
        ty: ty.to_string(),
        input: text.to_string(),
        reason,
    };
    let value = ty.coerce_str(text).map_err(|e| invalid(e.to_string()))?;
    if !fits_width(&value) {
        return Err(invalid(format!("out of range for {}", ty)));
    }
    Ok(value)
}

fn fits_width(value: &DynSolValue) -> bool {
    match value {
        DynSolValue::Uint(u, bits) => u.bit_len() <= *bits,
        DynSolValue::Int(i, bits) if *bits < 256 => {
            let limit = U256::from(1u64) << (*bits - 1);
            let magnitude = i.unsigned_abs();
            if i.is_negative() {
                magnitude <= limit
            } else {
                magnitude < limit
            }
        }
        _ => true,
    }
}

fn as_array<'a>(json: &'a Value, ty: &DynSolType) -> Result<&'a Vec<Value>, CodecError> {
    json.as_array().ok_or_else(|| CodecError::TypeMismatch {
        expected: format!("JSON array for {}", ty),
        actual: json.to_string(),
    })
}

fn mismatch(expected: &str, actual: &Value) -> CodecError {
    CodecError::TypeMismatch {
        expected: expected.to_string(),
        actual: actual.to_string(),
    }
}

fn integer_json(decimal: String) -> Value {
    if let Ok(n) = decimal.parse::<u64>() {
        Value::from(n)
    } else if let Ok(n) = decimal.parse::<i64>() {
        Value::from(n)
    } else {
        Value::String(decimal)
    }
}
