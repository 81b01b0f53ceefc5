//! Decoded ABI values.
//!
//! Byte-like values (addresses, `bytesN`, `bytes`) are carried as lower-case
//! `0x`-prefixed hex strings so that a decoded call can be printed, serialized
//! or fed straight back into the encoder without a separate conversion step.

use crate::hash;
use alloy_primitives::{I256, U256};
use serde::{Serialize, Serializer};
use std::fmt;

/// A single decoded (or to-be-encoded) ABI value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiValue {
    /// Any `uintN`.
    Uint(U256),
    /// Any `intN`.
    Int(I256),
    Bool(bool),
    /// `0x`-prefixed hex: `address`, `bytesN`, `bytes`.
    Hex(String),
    /// UTF-8 `string`.
    String(String),
    /// Array elements or tuple components, in order.
    List(Vec<AbiValue>),
}

impl AbiValue {
    /// Hex-encode raw bytes into a `Hex` value.
    pub fn hex(bytes: impl AsRef<[u8]>) -> Self {
        AbiValue::Hex(hash::to_hex_prefixed(bytes))
    }

    pub fn uint(v: u64) -> Self {
        AbiValue::Uint(U256::from(v))
    }

    pub fn int(v: i64) -> Self {
        AbiValue::Int(I256::try_from(v).unwrap_or_default())
    }

    pub fn as_uint(&self) -> Option<U256> {
        match self {
            AbiValue::Uint(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<I256> {
        match self {
            AbiValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AbiValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The hex text of a `Hex` value.
    pub fn as_hex(&self) -> Option<&str> {
        match self {
            AbiValue::Hex(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Text of either a `Hex` or a `String` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AbiValue::Hex(s) | AbiValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[AbiValue]> {
        match self {
            AbiValue::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Short variant label used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            AbiValue::Uint(_) => "uint",
            AbiValue::Int(_) => "int",
            AbiValue::Bool(_) => "bool",
            AbiValue::Hex(_) => "hex",
            AbiValue::String(_) => "string",
            AbiValue::List(_) => "list",
        }
    }
}

impl From<bool> for AbiValue {
    fn from(b: bool) -> Self {
        AbiValue::Bool(b)
    }
}

impl From<U256> for AbiValue {
    fn from(v: U256) -> Self {
        AbiValue::Uint(v)
    }
}

impl From<I256> for AbiValue {
    fn from(v: I256) -> Self {
        AbiValue::Int(v)
    }
}

impl From<Vec<AbiValue>> for AbiValue {
    fn from(items: Vec<AbiValue>) -> Self {
        AbiValue::List(items)
    }
}

impl fmt::Display for AbiValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiValue::Uint(v) => write!(f, "{v}"),
            AbiValue::Int(v) => write!(f, "{v}"),
            AbiValue::Bool(b) => write!(f, "{b}"),
            AbiValue::Hex(s) | AbiValue::String(s) => write!(f, "{s}"),
            AbiValue::List(items) => {
                let parts: Vec<_> = items.iter().map(|x| x.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

/// Integers serialize as decimal strings so 256-bit values survive JSON.
impl Serialize for AbiValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AbiValue::Uint(v) => serializer.serialize_str(&v.to_string()),
            AbiValue::Int(v) => serializer.serialize_str(&v.to_string()),
            AbiValue::Bool(b) => serializer.serialize_bool(*b),
            AbiValue::Hex(s) | AbiValue::String(s) => serializer.serialize_str(s),
            AbiValue::List(items) => serializer.collect_seq(items),
        }
    }
}
