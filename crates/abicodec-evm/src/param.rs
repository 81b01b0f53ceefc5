//! Named, typed parameters and the parameter-list codec.

use abicodec_core::{
    codec, error::DecodeError, error::EncodeError, types::SolidityType, value::AbiValue,
};
use std::fmt;

/// A function/event/error/constructor parameter.
///
/// For tuple-typed params (including arrays of tuples) `components` holds the
/// named members and `ty` already embeds their types; both are fixed when the
/// param is built and never edited afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub ty: SolidityType,
    /// Only meaningful for event inputs
    pub indexed: bool,
    pub components: Vec<Param>,
}

impl Param {
    /// A non-tuple param.
    pub fn new(name: impl Into<String>, ty: SolidityType) -> Self {
        Self {
            name: name.into(),
            ty,
            indexed: false,
            components: Vec::new(),
        }
    }

    /// A tuple-based param. `type_str` is the declared type (`tuple`,
    /// `tuple[]`, `tuple[2]`, ...); its tuple is built from `components`.
    pub fn tuple(
        name: impl Into<String>,
        type_str: &str,
        components: Vec<Param>,
    ) -> Result<Self, abicodec_core::DefinitionError> {
        let component_types = components.iter().map(|c| c.ty.clone()).collect();
        let ty = SolidityType::parse_with_components(type_str, Some(component_types))?;
        Ok(Self {
            name: name.into(),
            ty,
            indexed: false,
            components,
        })
    }

    /// Mark the param as an indexed event input.
    pub fn indexed(mut self, indexed: bool) -> Self {
        self.indexed = indexed;
        self
    }

    /// Declared type name as reported in decoded output.
    pub fn type_name(&self) -> String {
        self.ty.to_string()
    }
}

/// `uint256 amount` / `address indexed from`
impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let indexed = if self.indexed { " indexed" } else { "" };
        write!(f, "{}{indexed} {}", self.ty.canonical_name(), self.name)
    }
}

/// Decode an ABI-encoded region against `params`, returning one value per
/// param in declaration order.
pub fn decode_list(params: &[Param], bytes: &[u8]) -> Result<Vec<AbiValue>, DecodeError> {
    codec::decode_sequence(params.iter().map(|p| &p.ty), bytes)
}

/// ABI-encode `values` against the leading `params`.
///
/// Offsets are relative to the start of the returned region and never
/// include a selector. Supplying more values than params is an error;
/// supplying fewer encodes only the leading params.
pub fn encode_args(params: &[Param], values: &[AbiValue]) -> Result<Vec<u8>, EncodeError> {
    if values.len() > params.len() {
        return Err(EncodeError::TooManyArguments {
            given: values.len(),
            expected: params.len(),
        });
    }
    codec::encode_sequence(params.iter().map(|p| &p.ty), values)
}
