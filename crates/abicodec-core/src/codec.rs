//! The ABI head/tail codec.
//!
//! A sequence of values (function arguments, tuple components, array
//! elements) is laid out as a head of fixed-size slots followed by a tail.
//! Static values sit directly in their head slot; dynamic values leave a
//! 32-byte big-endian offset there, measured from the start of the
//! enclosing sequence, pointing at their payload in the tail.
//!
//! [`SolidityType::decode`] takes the offset of the value itself: the head
//! slot for static types, the already-dereferenced payload start for
//! dynamic ones. [`decode_sequence`] does the dereferencing.

use crate::error::{DecodeError, EncodeError};
use crate::hash;
use crate::types::SolidityType;
use crate::value::AbiValue;
use alloy_primitives::{I256, U256};
use std::iter;

/// Size in bytes of one ABI word.
pub const WORD: usize = 32;

impl SolidityType {
    /// Decode one value of this type from `buf` at `offset`.
    pub fn decode(&self, buf: &[u8], offset: usize) -> Result<AbiValue, DecodeError> {
        match self {
            SolidityType::Uint(bits) => {
                let word = read_word(buf, offset)?;
                if !uint_fits(word, *bits) {
                    return Err(out_of_range(self, offset));
                }
                Ok(AbiValue::Uint(U256::from_be_bytes(*word)))
            }
            SolidityType::Int(bits) => {
                let word = read_word(buf, offset)?;
                if !int_fits(word, *bits) {
                    return Err(out_of_range(self, offset));
                }
                Ok(AbiValue::Int(I256::from_raw(U256::from_be_bytes(*word))))
            }
            SolidityType::Bool => {
                let word = read_word(buf, offset)?;
                if !uint_fits(word, 8) || word[WORD - 1] > 1 {
                    return Err(DecodeError::malformed(format!(
                        "non-canonical bool at offset {offset}"
                    )));
                }
                Ok(AbiValue::Bool(word[WORD - 1] == 1))
            }
            SolidityType::Address => {
                let word = read_word(buf, offset)?;
                if !uint_fits(word, 160) {
                    return Err(out_of_range(self, offset));
                }
                Ok(AbiValue::hex(&word[12..]))
            }
            SolidityType::FixedBytes(n) => {
                let word = read_word(buf, offset)?;
                Ok(AbiValue::hex(&word[..*n]))
            }
            SolidityType::DynamicBytes => Ok(AbiValue::hex(read_bytes(buf, offset)?)),
            SolidityType::String => {
                let bytes = read_bytes(buf, offset)?;
                let s = std::str::from_utf8(bytes).map_err(|e| {
                    DecodeError::malformed(format!("invalid UTF-8 in string at offset {offset}: {e}"))
                })?;
                Ok(AbiValue::String(s.to_string()))
            }
            SolidityType::FixedArray(elem, len) => {
                let region = region_from(buf, offset)?;
                check_element_count(*len, elem, region.len())?;
                let items = decode_sequence(iter::repeat(&**elem).take(*len), region)?;
                Ok(AbiValue::List(items))
            }
            SolidityType::DynamicArray(elem) => {
                let len = read_usize(buf, offset)?;
                let region = region_from(buf, offset + WORD)?;
                check_element_count(len, elem, region.len())?;
                let items = decode_sequence(iter::repeat(&**elem).take(len), region)?;
                Ok(AbiValue::List(items))
            }
            SolidityType::Tuple(components) => {
                let region = region_from(buf, offset)?;
                Ok(AbiValue::List(decode_sequence(components, region)?))
            }
        }
    }

    /// Encode one value of this type.
    ///
    /// Static types produce exactly [`SolidityType::static_width`] bytes;
    /// dynamic types produce the payload that belongs in the tail.
    pub fn encode(&self, value: &AbiValue) -> Result<Vec<u8>, EncodeError> {
        match (self, value) {
            (SolidityType::Uint(bits), AbiValue::Uint(v)) => {
                let word = v.to_be_bytes::<WORD>();
                if !uint_fits(&word, *bits) {
                    return Err(EncodeError::mismatch(self, format!("{v} does not fit")));
                }
                Ok(word.to_vec())
            }
            (SolidityType::Int(bits), AbiValue::Int(v)) => {
                let word = v.into_raw().to_be_bytes::<WORD>();
                if !int_fits(&word, *bits) {
                    return Err(EncodeError::mismatch(self, format!("{v} does not fit")));
                }
                Ok(word.to_vec())
            }
            (SolidityType::Bool, AbiValue::Bool(b)) => Ok(usize_word(usize::from(*b)).to_vec()),
            (SolidityType::Address, AbiValue::Hex(s)) => {
                let bytes = self.hex_bytes(s)?;
                if bytes.len() != 20 {
                    return Err(EncodeError::mismatch(
                        self,
                        format!("expected 20 bytes, got {}", bytes.len()),
                    ));
                }
                let mut word = [0u8; WORD];
                word[12..].copy_from_slice(&bytes);
                Ok(word.to_vec())
            }
            (SolidityType::FixedBytes(n), AbiValue::Hex(s)) => {
                let bytes = self.hex_bytes(s)?;
                if bytes.len() > *n {
                    return Err(EncodeError::mismatch(
                        self,
                        format!("expected at most {n} bytes, got {}", bytes.len()),
                    ));
                }
                let mut word = [0u8; WORD];
                word[..bytes.len()].copy_from_slice(&bytes);
                Ok(word.to_vec())
            }
            (SolidityType::DynamicBytes, AbiValue::Hex(s)) => {
                Ok(length_prefixed(&self.hex_bytes(s)?))
            }
            (SolidityType::String, AbiValue::String(s)) => Ok(length_prefixed(s.as_bytes())),
            (SolidityType::FixedArray(elem, len), AbiValue::List(items)) => {
                if items.len() != *len {
                    return Err(EncodeError::mismatch(
                        self,
                        format!("expected {len} elements, got {}", items.len()),
                    ));
                }
                encode_sequence(iter::repeat(&**elem).take(*len), items)
            }
            (SolidityType::DynamicArray(elem), AbiValue::List(items)) => {
                let body = encode_sequence(iter::repeat(&**elem).take(items.len()), items)?;
                Ok(hash::concat(&[&usize_word(items.len()), &body]))
            }
            (SolidityType::Tuple(components), AbiValue::List(items)) => {
                if items.len() != components.len() {
                    return Err(EncodeError::mismatch(
                        self.canonical_name(),
                        format!(
                            "expected {} components, got {}",
                            components.len(),
                            items.len()
                        ),
                    ));
                }
                encode_sequence(components, items)
            }
            (ty, other) => Err(EncodeError::mismatch(
                ty,
                format!("unexpected {} value '{other}'", other.kind()),
            )),
        }
    }

    fn hex_bytes(&self, s: &str) -> Result<Vec<u8>, EncodeError> {
        hash::decode_hex(s).map_err(|e| EncodeError::mismatch(self, format!("'{s}': {e}")))
    }
}

/// Decode a head/tail sequence of `types` laid out at the start of `region`.
///
/// A single head cursor walks the types in order; dynamic entries are
/// followed through their offset, static ones are read in place. The cursor
/// advances by each type's `static_width()`.
pub fn decode_sequence<'a, I>(types: I, region: &[u8]) -> Result<Vec<AbiValue>, DecodeError>
where
    I: IntoIterator<Item = &'a SolidityType>,
{
    let mut values = Vec::new();
    let mut head = 0usize;
    for ty in types {
        let value = if ty.is_dynamic() {
            let offset = read_usize(region, head)?;
            ty.decode(region, offset)?
        } else {
            ty.decode(region, head)?
        };
        values.push(value);
        head = head
            .checked_add(ty.static_width())
            .ok_or_else(|| DecodeError::malformed("head cursor overflow"))?;
    }
    Ok(values)
}

/// Encode `values` against `types` as a head/tail sequence.
///
/// Types and values are paired positionally; surplus types are ignored, so
/// callers enforce arity. Tail offsets are relative to the start of the
/// returned buffer.
pub fn encode_sequence<'a, I>(types: I, values: &[AbiValue]) -> Result<Vec<u8>, EncodeError>
where
    I: IntoIterator<Item = &'a SolidityType>,
{
    let pairs: Vec<(&SolidityType, &AbiValue)> = types.into_iter().zip(values).collect();
    let head_size = pairs
        .iter()
        .try_fold(0usize, |acc, (ty, _)| acc.checked_add(ty.checked_static_width()?))
        .ok_or_else(|| EncodeError::mismatch("sequence", "head width overflows"))?;

    let mut head = Vec::with_capacity(head_size);
    let mut tail = Vec::new();
    for (ty, value) in pairs {
        let encoded = ty.encode(value)?;
        if ty.is_dynamic() {
            head.extend_from_slice(&usize_word(head_size + tail.len()));
            tail.extend_from_slice(&encoded);
        } else {
            head.extend_from_slice(&encoded);
        }
    }
    head.extend_from_slice(&tail);
    Ok(head)
}

/// Big-endian 32-byte word holding `n`.
pub fn usize_word(n: usize) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[WORD - 8..].copy_from_slice(&(n as u64).to_be_bytes());
    word
}

fn read_word(buf: &[u8], offset: usize) -> Result<&[u8; WORD], DecodeError> {
    offset
        .checked_add(WORD)
        .and_then(|end| buf.get(offset..end))
        .and_then(|slice| slice.try_into().ok())
        .ok_or_else(|| {
            DecodeError::malformed(format!(
                "need 32 bytes at offset {offset}, buffer has {}",
                buf.len()
            ))
        })
}

fn read_usize(buf: &[u8], offset: usize) -> Result<usize, DecodeError> {
    let word = read_word(buf, offset)?;
    if word[..WORD - 8].iter().any(|b| *b != 0) {
        return Err(DecodeError::malformed(format!(
            "length or offset at {offset} does not fit in 64 bits"
        )));
    }
    let mut low = [0u8; 8];
    low.copy_from_slice(&word[WORD - 8..]);
    usize::try_from(u64::from_be_bytes(low))
        .map_err(|_| DecodeError::malformed(format!("length or offset at {offset} too large")))
}

/// Length-prefixed byte payload starting at `offset`.
fn read_bytes(buf: &[u8], offset: usize) -> Result<&[u8], DecodeError> {
    let len = read_usize(buf, offset)?;
    let start = offset + WORD;
    start
        .checked_add(len)
        .and_then(|end| buf.get(start..end))
        .ok_or_else(|| {
            DecodeError::malformed(format!(
                "{len} bytes at offset {start} exceed buffer of {}",
                buf.len()
            ))
        })
}

fn region_from(buf: &[u8], offset: usize) -> Result<&[u8], DecodeError> {
    buf.get(offset..).ok_or_else(|| {
        DecodeError::malformed(format!(
            "offset {offset} points past buffer of {}",
            buf.len()
        ))
    })
}

/// Reject element counts the remaining bytes cannot possibly hold, before
/// anything is allocated for them.
fn check_element_count(len: usize, elem: &SolidityType, available: usize) -> Result<(), DecodeError> {
    let needed = len.checked_mul(elem.static_width().max(1));
    match needed {
        Some(n) if n <= available => Ok(()),
        _ => Err(DecodeError::malformed(format!(
            "array of {len} {elem} elements exceeds remaining {available} bytes"
        ))),
    }
}

fn length_prefixed(bytes: &[u8]) -> Vec<u8> {
    let padded = bytes.len().div_ceil(WORD) * WORD;
    let mut out = Vec::with_capacity(WORD + padded);
    out.extend_from_slice(&usize_word(bytes.len()));
    out.extend_from_slice(bytes);
    out.resize(WORD + padded, 0);
    out
}

/// All bits above `bits` are zero. Widths past 256 accept any word.
fn uint_fits(word: &[u8; WORD], bits: usize) -> bool {
    let pad = WORD.saturating_sub(bits / 8);
    word[..pad].iter().all(|b| *b == 0)
}

/// All bits above `bits` replicate the sign bit. Widths past 256 accept any
/// word; widths under 8 accept only zero.
fn int_fits(word: &[u8; WORD], bits: usize) -> bool {
    let pad = WORD.saturating_sub(bits / 8);
    match word.get(pad) {
        Some(top) => {
            let fill = if top & 0x80 != 0 { 0xff } else { 0x00 };
            word[..pad].iter().all(|b| *b == fill)
        }
        None => word.iter().all(|b| *b == 0),
    }
}

fn out_of_range(ty: &SolidityType, offset: usize) -> DecodeError {
    DecodeError::malformed(format!("value at offset {offset} out of range for {ty}"))
}
