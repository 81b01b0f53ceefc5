//! JSON → [`AbiValue`] coercion, the input side of call encoding.
//!
//! The codec itself is strict about value shapes (`uint` wants `Uint`,
//! `address` wants `Hex`, ...). User input arrives as loosely typed JSON, so
//! it is coerced against the declared type first:
//!
//! | type | accepted JSON |
//! |---|---|
//! | `uintN` / `intN` | number, decimal string, `0x` hex string |
//! | `bool` | bool, `"true"` / `"false"` |
//! | `address`, `bytesN`, `bytes` | hex string |
//! | `string` | string |
//! | arrays, tuples | array |
//!
//! Range checks (bit width, byte length) are left to the encoder.

use abicodec_core::{error::EncodeError, hash, types::SolidityType, value::AbiValue};
use alloy_primitives::{I256, U256};
use serde_json::Value;

use crate::entry::Function;
use crate::param::Param;

/// Coerce one JSON value against `ty`.
pub fn coerce_json(ty: &SolidityType, json: &Value) -> Result<AbiValue, EncodeError> {
    let unexpected = || EncodeError::mismatch(ty, format!("cannot use JSON {json} here"));

    match ty {
        SolidityType::Uint(_) => match json {
            Value::Number(n) => n.as_u64().map(AbiValue::uint).ok_or_else(unexpected),
            Value::String(s) => s
                .trim()
                .parse::<U256>()
                .map(AbiValue::Uint)
                .map_err(|e| EncodeError::mismatch(ty, format!("'{s}': {e}"))),
            _ => Err(unexpected()),
        },
        SolidityType::Int(_) => match json {
            Value::Number(n) => n.as_i64().map(AbiValue::int).ok_or_else(unexpected),
            Value::String(s) => s
                .trim()
                .parse::<I256>()
                .map(AbiValue::Int)
                .map_err(|e| EncodeError::mismatch(ty, format!("'{s}': {e}"))),
            _ => Err(unexpected()),
        },
        SolidityType::Bool => match json {
            Value::Bool(b) => Ok(AbiValue::Bool(*b)),
            Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(AbiValue::Bool(true)),
            Value::String(s) if s.eq_ignore_ascii_case("false") => Ok(AbiValue::Bool(false)),
            _ => Err(unexpected()),
        },
        SolidityType::Address | SolidityType::FixedBytes(_) | SolidityType::DynamicBytes => {
            match json {
                Value::String(s) => Ok(AbiValue::Hex(format!(
                    "0x{}",
                    hash::strip_0x(s.trim()).to_ascii_lowercase()
                ))),
                _ => Err(unexpected()),
            }
        }
        SolidityType::String => match json {
            Value::String(s) => Ok(AbiValue::String(s.clone())),
            _ => Err(unexpected()),
        },
        SolidityType::FixedArray(elem, _) | SolidityType::DynamicArray(elem) => match json {
            Value::Array(items) => items
                .iter()
                .map(|item| coerce_json(elem, item))
                .collect::<Result<Vec<_>, _>>()
                .map(AbiValue::List),
            _ => Err(unexpected()),
        },
        SolidityType::Tuple(components) => match json {
            Value::Array(items) if items.len() == components.len() => components
                .iter()
                .zip(items)
                .map(|(c, item)| coerce_json(c, item))
                .collect::<Result<Vec<_>, _>>()
                .map(AbiValue::List),
            _ => Err(unexpected()),
        },
    }
}

/// Coerce call arguments given either as a JSON array (positional) or an
/// object keyed by param name.
pub fn coerce_args(params: &[Param], json: &Value) -> Result<Vec<AbiValue>, EncodeError> {
    match json {
        Value::Array(items) => {
            if items.len() > params.len() {
                return Err(EncodeError::TooManyArguments {
                    given: items.len(),
                    expected: params.len(),
                });
            }
            params
                .iter()
                .zip(items)
                .map(|(p, item)| coerce_json(&p.ty, item))
                .collect()
        }
        Value::Object(fields) => params
            .iter()
            .map(|p| {
                let item = fields.get(&p.name).ok_or_else(|| {
                    EncodeError::mismatch(&p.ty, format!("missing argument '{}'", p.name))
                })?;
                coerce_json(&p.ty, item)
            })
            .collect(),
        other => Err(EncodeError::mismatch(
            "arguments",
            format!("expected a JSON array or object, got {other}"),
        )),
    }
}

/// Coerce JSON arguments and encode a full call to `function`.
pub fn encode_call_json(function: &Function, args: &Value) -> Result<Vec<u8>, EncodeError> {
    let values = coerce_args(function.inputs(), args)?;
    function.encode_call(&values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::StateMutability;
    use serde_json::json;

    #[test]
    fn integers_from_numbers_and_strings() {
        let u = SolidityType::Uint(256);
        assert_eq!(coerce_json(&u, &json!(42)).unwrap(), AbiValue::uint(42));
        assert_eq!(
            coerce_json(&u, &json!("6283178947560620")).unwrap(),
            AbiValue::uint(6283178947560620)
        );
        assert_eq!(coerce_json(&u, &json!("0xff")).unwrap(), AbiValue::uint(255));
        assert!(coerce_json(&u, &json!(-1)).is_err());

        let i = SolidityType::Int(24);
        assert_eq!(coerce_json(&i, &json!(-60)).unwrap(), AbiValue::int(-60));
        assert_eq!(coerce_json(&i, &json!("-887272")).unwrap(), AbiValue::int(-887272));
    }

    #[test]
    fn hex_like_values_are_normalised() {
        let v = coerce_json(
            &SolidityType::Address,
            &json!("0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"),
        )
        .unwrap();
        assert_eq!(v, AbiValue::Hex("0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2".into()));
        assert_eq!(
            coerce_json(&SolidityType::DynamicBytes, &json!("beef")).unwrap(),
            AbiValue::Hex("0xbeef".into())
        );
    }

    #[test]
    fn nested_arrays_and_tuples() {
        let ty = SolidityType::parse("(address,uint24)[]").unwrap();
        let v = coerce_json(
            &ty,
            &json!([["0x0000000000000000000000000000000000000001", 500]]),
        )
        .unwrap();
        assert_eq!(
            v,
            AbiValue::List(vec![AbiValue::List(vec![
                AbiValue::Hex("0x0000000000000000000000000000000000000001".into()),
                AbiValue::uint(500),
            ])])
        );
        // wrong arity
        assert!(coerce_json(&ty, &json!([["0x01"]])).is_err());
    }

    #[test]
    fn named_and_positional_args_encode_identically() {
        let transfer = Function::new(
            "transfer",
            vec![
                Param::new("to", SolidityType::Address),
                Param::new("amount", SolidityType::Uint(256)),
            ],
            vec![],
            StateMutability::NonPayable,
        );
        let to = "0x00000000000000000000000000000000000a11ce";
        let positional = encode_call_json(&transfer, &json!([to, "1000"])).unwrap();
        let named = encode_call_json(&transfer, &json!({"amount": 1000, "to": to})).unwrap();
        assert_eq!(positional, named);
        assert_eq!(hex::encode(&positional[..4]), "a9059cbb");
        assert!(matches!(
            encode_call_json(&transfer, &json!([to, 1, 2])),
            Err(EncodeError::TooManyArguments { given: 3, expected: 2 })
        ));
    }
}
