//! The Solidity ABI type system.
//!
//! `SolidityType` is a closed sum type: every dispatch point (width
//! computation, naming, encode/decode in [`crate::codec`]) matches it
//! exhaustively. Nested arrays and tuples own their element types; the ABI
//! has no recursive types, so plain boxing is enough.

use crate::codec::WORD;
use crate::error::DefinitionError;
use std::fmt;

/// A resolved Solidity ABI type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SolidityType {
    /// Unsigned integer, width in bits (8..=256).
    Uint(usize),
    /// Two's-complement signed integer, width in bits (8..=256).
    Int(usize),
    Bool,
    /// 20-byte account address.
    Address,
    /// `bytes1` .. `bytes32`, length in bytes.
    FixedBytes(usize),
    /// Variable-length `bytes`.
    DynamicBytes,
    /// UTF-8 `string`.
    String,
    /// `T[n]`
    FixedArray(Box<SolidityType>, usize),
    /// `T[]`
    DynamicArray(Box<SolidityType>),
    /// `(T1,T2,...)`, declared as `tuple` in ABI JSON.
    Tuple(Vec<SolidityType>),
}

impl SolidityType {
    /// Parse a type string with no `tuple` placeholder in it.
    ///
    /// Accepts elementary names, array suffixes, and inline tuple syntax
    /// such as `(address,uint256)[]`.
    pub fn parse(s: &str) -> Result<Self, DefinitionError> {
        Self::parse_with_components(s, None)
    }

    /// Parse an ABI JSON type string, substituting `components` for a
    /// leading `tuple` base (e.g. `tuple[]` with its component list).
    pub fn parse_with_components(
        s: &str,
        components: Option<Vec<SolidityType>>,
    ) -> Result<Self, DefinitionError> {
        let s = s.trim();
        let invalid = || DefinitionError::InvalidType {
            type_name: s.to_string(),
        };

        let (base, suffixes) = split_array_suffixes(s).ok_or_else(invalid)?;

        let mut ty = if base == "tuple" {
            match components {
                Some(c) => SolidityType::Tuple(c),
                None => {
                    return Err(DefinitionError::MissingComponents {
                        param: s.to_string(),
                    })
                }
            }
        } else if base.starts_with('(') {
            let inner = base
                .strip_prefix('(')
                .and_then(|b| b.strip_suffix(')'))
                .ok_or_else(invalid)?;
            let parts = split_top_level(inner).ok_or_else(invalid)?;
            let elems = parts
                .into_iter()
                .map(SolidityType::parse)
                .collect::<Result<Vec<_>, _>>()?;
            SolidityType::Tuple(elems)
        } else {
            parse_elementary(base).ok_or_else(invalid)?
        };

        for suffix in suffixes {
            ty = match suffix {
                None => SolidityType::DynamicArray(Box::new(ty)),
                Some(n) => SolidityType::FixedArray(Box::new(ty), n),
            };
        }
        if !ty.is_well_formed() {
            return Err(invalid());
        }
        Ok(ty)
    }

    /// Widths are in range, fixed arrays are non-empty over elements that
    /// occupy head space, and the total head width fits in `usize`.
    fn is_well_formed(&self) -> bool {
        match self {
            SolidityType::Uint(bits) | SolidityType::Int(bits) => {
                bits % 8 == 0 && (8..=256).contains(bits)
            }
            SolidityType::FixedBytes(n) => (1..=32).contains(n),
            SolidityType::FixedArray(elem, len) => {
                *len > 0
                    && elem.is_well_formed()
                    && elem.checked_static_width().is_some_and(|w| w > 0)
                    && self.checked_static_width().is_some()
            }
            SolidityType::DynamicArray(elem) => elem.is_well_formed(),
            SolidityType::Tuple(components) => {
                components.iter().all(SolidityType::is_well_formed)
                    && self.checked_static_width().is_some()
            }
            SolidityType::Bool
            | SolidityType::Address
            | SolidityType::DynamicBytes
            | SolidityType::String => true,
        }
    }

    /// True if this type, or anything nested in it, is variable-length.
    pub fn is_dynamic(&self) -> bool {
        match self {
            SolidityType::DynamicBytes | SolidityType::String | SolidityType::DynamicArray(_) => {
                true
            }
            SolidityType::FixedArray(elem, _) => elem.is_dynamic(),
            SolidityType::Tuple(components) => components.iter().any(SolidityType::is_dynamic),
            SolidityType::Uint(_)
            | SolidityType::Int(_)
            | SolidityType::Bool
            | SolidityType::Address
            | SolidityType::FixedBytes(_) => false,
        }
    }

    /// Bytes this type occupies in the head of an enclosing sequence.
    ///
    /// Dynamic types take a single 32-byte offset slot. Saturates at
    /// `usize::MAX` for hand-built types whose width overflows; parsed types
    /// never do.
    pub fn static_width(&self) -> usize {
        self.checked_static_width().unwrap_or(usize::MAX)
    }

    /// [`SolidityType::static_width`], or `None` on overflow.
    pub fn checked_static_width(&self) -> Option<usize> {
        if self.is_dynamic() {
            return Some(WORD);
        }
        match self {
            SolidityType::FixedArray(elem, len) => elem.checked_static_width()?.checked_mul(*len),
            SolidityType::Tuple(components) => components
                .iter()
                .try_fold(0usize, |acc, c| acc.checked_add(c.checked_static_width()?)),
            _ => Some(WORD),
        }
    }

    /// Whether an indexed event argument of this type is stored as the
    /// Keccak-256 hash of its encoding rather than the value itself.
    pub fn is_hashed_in_topic(&self) -> bool {
        self.is_dynamic()
            || matches!(
                self,
                SolidityType::FixedArray(..) | SolidityType::Tuple(_)
            )
    }

    /// Fully canonical name as used in signatures, e.g. `(address,uint24)[]`.
    pub fn canonical_name(&self) -> String {
        match self {
            SolidityType::FixedArray(elem, len) => format!("{}[{len}]", elem.canonical_name()),
            SolidityType::DynamicArray(elem) => format!("{}[]", elem.canonical_name()),
            SolidityType::Tuple(components) => {
                let parts: Vec<_> = components.iter().map(|c| c.canonical_name()).collect();
                format!("({})", parts.join(","))
            }
            other => other.to_string(),
        }
    }

    /// Element type of an array, if this is one.
    pub fn element(&self) -> Option<&SolidityType> {
        match self {
            SolidityType::FixedArray(elem, _) | SolidityType::DynamicArray(elem) => Some(elem),
            _ => None,
        }
    }
}

/// Declared-style rendering, matching the `type` field of ABI JSON:
/// tuples render as `tuple`, so `tuple[]` round-trips.
impl fmt::Display for SolidityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolidityType::Uint(bits) => write!(f, "uint{bits}"),
            SolidityType::Int(bits) => write!(f, "int{bits}"),
            SolidityType::Bool => write!(f, "bool"),
            SolidityType::Address => write!(f, "address"),
            SolidityType::FixedBytes(n) => write!(f, "bytes{n}"),
            SolidityType::DynamicBytes => write!(f, "bytes"),
            SolidityType::String => write!(f, "string"),
            SolidityType::FixedArray(elem, len) => write!(f, "{elem}[{len}]"),
            SolidityType::DynamicArray(elem) => write!(f, "{elem}[]"),
            SolidityType::Tuple(_) => write!(f, "tuple"),
        }
    }
}

impl std::str::FromStr for SolidityType {
    type Err = DefinitionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SolidityType::parse(s)
    }
}

fn parse_elementary(base: &str) -> Option<SolidityType> {
    match base {
        "bool" => return Some(SolidityType::Bool),
        "address" => return Some(SolidityType::Address),
        "bytes" => return Some(SolidityType::DynamicBytes),
        "string" => return Some(SolidityType::String),
        "uint" => return Some(SolidityType::Uint(256)),
        "int" => return Some(SolidityType::Int(256)),
        _ => {}
    }

    if let Some(bits) = base.strip_prefix("uint") {
        return parse_bits(bits).map(SolidityType::Uint);
    }
    if let Some(bits) = base.strip_prefix("int") {
        return parse_bits(bits).map(SolidityType::Int);
    }
    if let Some(len) = base.strip_prefix("bytes") {
        let n: usize = parse_decimal(len)?;
        return (1..=32).contains(&n).then_some(SolidityType::FixedBytes(n));
    }
    None
}

fn parse_bits(s: &str) -> Option<usize> {
    let bits = parse_decimal(s)?;
    (bits % 8 == 0 && (8..=256).contains(&bits)).then_some(bits)
}

/// Decimal digits only; rejects signs, whitespace and leading zeros.
fn parse_decimal(s: &str) -> Option<usize> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) || (s.len() > 1 && s.starts_with('0'))
    {
        return None;
    }
    s.parse().ok()
}

/// Split `T[2][]` into (`T`, [Some(2), None]). Suffixes are returned
/// innermost first. Brackets inside a parenthesised base are skipped.
fn split_array_suffixes(s: &str) -> Option<(&str, Vec<Option<usize>>)> {
    let base_end = if s.starts_with('(') {
        matching_paren(s)? + 1
    } else {
        s.find('[').unwrap_or(s.len())
    };
    let (base, mut rest) = s.split_at(base_end);
    if base.is_empty() {
        return None;
    }

    let mut suffixes = Vec::new();
    while !rest.is_empty() {
        let close = rest.find(']')?;
        let inner = rest.strip_prefix('[')?.get(..close - 1)?;
        suffixes.push(if inner.is_empty() {
            None
        } else {
            Some(parse_decimal(inner)?)
        });
        rest = &rest[close + 1..];
    }
    Some((base, suffixes))
}

fn matching_paren(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split on commas that are not nested inside parentheses.
fn split_top_level(s: &str) -> Option<Vec<&str>> {
    if s.trim().is_empty() {
        return Some(Vec::new());
    }
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.checked_sub(1)?,
            ',' if depth == 0 => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    Some(parts)
}
