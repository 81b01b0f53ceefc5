//! ABI entries: constructors, functions, events and custom errors.
//!
//! Each entry caches its canonical signature and Keccak-256 fingerprint when
//! it is built. Entries are immutable afterwards, so the cache can never go
//! stale.
//!
//! - functions/errors: selector = `keccak256(signature)[..4]`
//! - events: selector = the full 32-byte hash, emitted as topic 0
//! - constructors: keyed by the full hash of `(types)`; nothing on chain
//!   refers to it, it only keeps every entry addressable in the index

use abicodec_core::{
    codec,
    error::{DecodeError, EncodeError},
    hash,
    value::AbiValue,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::param::{self, Param};

/// Length of a function/error selector.
pub const SELECTOR_LEN: usize = 4;

/// Discriminant of an [`Entry`], used in lookups and error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Constructor,
    Function,
    Event,
    Error,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::Constructor => write!(f, "constructor"),
            EntryKind::Function => write!(f, "function"),
            EntryKind::Event => write!(f, "event"),
            EntryKind::Error => write!(f, "error"),
        }
    }
}

/// Solidity state mutability of a function or constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateMutability {
    Pure,
    View,
    #[default]
    NonPayable,
    Payable,
}

impl StateMutability {
    /// Derive mutability from the legacy `constant` / `payable` flags.
    pub fn from_flags(constant: bool, payable: bool) -> Self {
        match (constant, payable) {
            (_, true) => StateMutability::Payable,
            (true, false) => StateMutability::View,
            (false, false) => StateMutability::NonPayable,
        }
    }
}

/// `function` entries also cover `fallback` and `receive`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FunctionKind {
    #[default]
    Function,
    Fallback,
    Receive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Signature {
    canonical: String,
    fingerprint: [u8; 32],
}

impl Signature {
    /// `name(t1,t2,...)` with tuples rendered as their parenthesised
    /// component list.
    fn new(name: &str, inputs: &[Param]) -> Self {
        let types: Vec<String> = inputs.iter().map(|p| p.ty.canonical_name()).collect();
        let canonical = format!("{name}({})", types.join(","));
        let fingerprint = hash::keccak256(canonical.as_bytes());
        Self {
            canonical,
            fingerprint,
        }
    }

    fn selector(&self) -> [u8; SELECTOR_LEN] {
        let mut out = [0u8; SELECTOR_LEN];
        out.copy_from_slice(&self.fingerprint[..SELECTOR_LEN]);
        out
    }
}

/// A contract constructor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constructor {
    inputs: Vec<Param>,
    state_mutability: StateMutability,
    signature: Signature,
}

impl Constructor {
    pub fn new(inputs: Vec<Param>, state_mutability: StateMutability) -> Self {
        let signature = Signature::new("", &inputs);
        Self {
            inputs,
            state_mutability,
            signature,
        }
    }

    pub fn inputs(&self) -> &[Param] {
        &self.inputs
    }

    pub fn is_payable(&self) -> bool {
        self.state_mutability == StateMutability::Payable
    }

    /// Decode constructor arguments (no selector prefix).
    pub fn decode_args(&self, data: &[u8]) -> Result<Vec<AbiValue>, DecodeError> {
        param::decode_list(&self.inputs, data)
    }

    /// Encode constructor arguments (appended to init code on deploy).
    pub fn encode_args(&self, values: &[AbiValue]) -> Result<Vec<u8>, EncodeError> {
        param::encode_args(&self.inputs, values)
    }
}

/// A callable function (including `fallback` / `receive`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    name: String,
    inputs: Vec<Param>,
    outputs: Vec<Param>,
    state_mutability: StateMutability,
    kind: FunctionKind,
    signature: Signature,
}

impl Function {
    pub fn new(
        name: impl Into<String>,
        inputs: Vec<Param>,
        outputs: Vec<Param>,
        state_mutability: StateMutability,
    ) -> Self {
        Self::with_kind(FunctionKind::Function, name, inputs, outputs, state_mutability)
    }

    pub fn with_kind(
        kind: FunctionKind,
        name: impl Into<String>,
        inputs: Vec<Param>,
        outputs: Vec<Param>,
        state_mutability: StateMutability,
    ) -> Self {
        let name = name.into();
        let signature = Signature::new(&name, &inputs);
        Self {
            name,
            inputs,
            outputs,
            state_mutability,
            kind,
            signature,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inputs(&self) -> &[Param] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Param] {
        &self.outputs
    }

    pub fn kind(&self) -> FunctionKind {
        self.kind
    }

    pub fn state_mutability(&self) -> StateMutability {
        self.state_mutability
    }

    /// `view` or `pure`.
    pub fn is_constant(&self) -> bool {
        matches!(
            self.state_mutability,
            StateMutability::View | StateMutability::Pure
        )
    }

    pub fn is_payable(&self) -> bool {
        self.state_mutability == StateMutability::Payable
    }

    pub fn signature(&self) -> &str {
        &self.signature.canonical
    }

    pub fn selector(&self) -> [u8; SELECTOR_LEN] {
        self.signature.selector()
    }

    /// Decode call arguments that follow the 4-byte selector.
    pub fn decode_input(&self, args: &[u8]) -> Result<Vec<AbiValue>, DecodeError> {
        param::decode_list(&self.inputs, args)
    }

    /// Decode return data against `outputs`.
    pub fn decode_output(&self, data: &[u8]) -> Result<Vec<AbiValue>, DecodeError> {
        param::decode_list(&self.outputs, data)
    }

    /// `selector ++ encode_args(inputs, values)`.
    pub fn encode_call(&self, values: &[AbiValue]) -> Result<Vec<u8>, EncodeError> {
        let args = param::encode_args(&self.inputs, values)?;
        Ok(hash::concat(&[&self.selector(), &args]))
    }
}

/// An event emitted into a log record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    name: String,
    inputs: Vec<Param>,
    anonymous: bool,
    signature: Signature,
}

impl Event {
    pub fn new(name: impl Into<String>, inputs: Vec<Param>, anonymous: bool) -> Self {
        let name = name.into();
        let signature = Signature::new(&name, &inputs);
        Self {
            name,
            inputs,
            anonymous,
            signature,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inputs(&self) -> &[Param] {
        &self.inputs
    }

    pub fn is_anonymous(&self) -> bool {
        self.anonymous
    }

    pub fn signature(&self) -> &str {
        &self.signature.canonical
    }

    /// Topic 0 of every non-anonymous log of this event.
    pub fn topic(&self) -> [u8; 32] {
        self.signature.fingerprint
    }

    /// Decode a log into one value per input, in declaration order.
    ///
    /// `topics` is the full topic list as emitted (including topic 0 for
    /// non-anonymous events). Indexed inputs are read positionally from the
    /// argument topics; the rest are decoded from `data`. Indexed inputs of
    /// reference type only carry the Keccak-256 hash of their value, which is
    /// returned as-is.
    pub fn decode_log(
        &self,
        topics: &[Vec<u8>],
        data: &[u8],
    ) -> Result<Vec<AbiValue>, DecodeError> {
        let arg_topics = if self.anonymous {
            topics
        } else {
            topics.get(1..).unwrap_or_default()
        };

        let indexed_count = self.inputs.iter().filter(|p| p.indexed).count();
        if arg_topics.len() < indexed_count {
            return Err(DecodeError::invalid_input(format!(
                "event {} has {indexed_count} indexed inputs but the log carries {} argument topics",
                self.name,
                arg_topics.len()
            )));
        }

        let mut indexed = Vec::with_capacity(indexed_count);
        for (param, topic) in self.inputs.iter().filter(|p| p.indexed).zip(arg_topics) {
            if topic.len() != codec::WORD {
                return Err(DecodeError::invalid_input(format!(
                    "topic for '{}' is {} bytes, expected 32",
                    param.name,
                    topic.len()
                )));
            }
            let value = if param.ty.is_hashed_in_topic() {
                AbiValue::hex(topic)
            } else {
                param.ty.decode(topic, 0)?
            };
            indexed.push(value);
        }

        let not_indexed =
            codec::decode_sequence(self.inputs.iter().filter(|p| !p.indexed).map(|p| &p.ty), data)?;

        let mut indexed = indexed.into_iter();
        let mut not_indexed = not_indexed.into_iter();
        self.inputs
            .iter()
            .map(|p| {
                let next = if p.indexed {
                    indexed.next()
                } else {
                    not_indexed.next()
                };
                next.ok_or_else(|| DecodeError::MissingField {
                    field: p.name.clone(),
                })
            })
            .collect()
    }
}

/// A Solidity custom error (`error Name(...)`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomError {
    name: String,
    inputs: Vec<Param>,
    signature: Signature,
}

impl CustomError {
    pub fn new(name: impl Into<String>, inputs: Vec<Param>) -> Self {
        let name = name.into();
        let signature = Signature::new(&name, &inputs);
        Self {
            name,
            inputs,
            signature,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inputs(&self) -> &[Param] {
        &self.inputs
    }

    pub fn signature(&self) -> &str {
        &self.signature.canonical
    }

    pub fn selector(&self) -> [u8; SELECTOR_LEN] {
        self.signature.selector()
    }

    /// Decode revert arguments that follow the 4-byte selector.
    pub fn decode_args(&self, args: &[u8]) -> Result<Vec<AbiValue>, DecodeError> {
        param::decode_list(&self.inputs, args)
    }
}

/// One ABI entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Constructor(Constructor),
    Function(Function),
    Event(Event),
    Error(CustomError),
}

impl Entry {
    pub fn kind(&self) -> EntryKind {
        match self {
            Entry::Constructor(_) => EntryKind::Constructor,
            Entry::Function(_) => EntryKind::Function,
            Entry::Event(_) => EntryKind::Event,
            Entry::Error(_) => EntryKind::Error,
        }
    }

    /// Entry name; empty for constructors.
    pub fn name(&self) -> &str {
        match self {
            Entry::Constructor(_) => "",
            Entry::Function(f) => &f.name,
            Entry::Event(e) => &e.name,
            Entry::Error(e) => &e.name,
        }
    }

    pub fn inputs(&self) -> &[Param] {
        match self {
            Entry::Constructor(c) => &c.inputs,
            Entry::Function(f) => &f.inputs,
            Entry::Event(e) => &e.inputs,
            Entry::Error(e) => &e.inputs,
        }
    }

    fn sig(&self) -> &Signature {
        match self {
            Entry::Constructor(c) => &c.signature,
            Entry::Function(f) => &f.signature,
            Entry::Event(e) => &e.signature,
            Entry::Error(e) => &e.signature,
        }
    }

    /// `name(t1,t2,...)`
    pub fn canonical_signature(&self) -> &str {
        &self.sig().canonical
    }

    /// Keccak-256 of the canonical signature.
    pub fn fingerprint(&self) -> &[u8; 32] {
        &self.sig().fingerprint
    }

    /// 4 bytes for functions and errors, all 32 for events and constructors.
    pub fn selector(&self) -> &[u8] {
        let fp = &self.sig().fingerprint;
        match self {
            Entry::Function(_) | Entry::Error(_) => &fp[..SELECTOR_LEN],
            Entry::Event(_) | Entry::Constructor(_) => &fp[..],
        }
    }

    /// Lower-case hex of [`Entry::selector`] without a prefix; the
    /// signature index key.
    pub fn selector_hex(&self) -> String {
        hex::encode(self.selector())
    }

    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Entry::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_event(&self) -> Option<&Event> {
        match self {
            Entry::Event(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_error(&self) -> Option<&CustomError> {
        match self {
            Entry::Error(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_constructor(&self) -> Option<&Constructor> {
        match self {
            Entry::Constructor(c) => Some(c),
            _ => None,
        }
    }
}

fn join_params(params: &[Param]) -> String {
    params
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Solidity-like declaration, e.g.
/// `function balanceOf(address owner) view returns (uint256);`
impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entry::Constructor(c) => {
                write!(f, "constructor({})", join_params(&c.inputs))?;
                if c.is_payable() {
                    write!(f, " payable")?;
                }
                write!(f, ";")
            }
            Entry::Function(func) => {
                match func.kind {
                    FunctionKind::Fallback => write!(f, "fallback()")?,
                    FunctionKind::Receive => write!(f, "receive()")?,
                    FunctionKind::Function => {
                        write!(f, "function {}({})", func.name, join_params(&func.inputs))?
                    }
                }
                match func.state_mutability {
                    StateMutability::NonPayable => {}
                    StateMutability::Pure => write!(f, " pure")?,
                    StateMutability::View => write!(f, " view")?,
                    StateMutability::Payable => write!(f, " payable")?,
                }
                if !func.outputs.is_empty() {
                    let types: Vec<_> = func.outputs.iter().map(|p| p.ty.canonical_name()).collect();
                    write!(f, " returns ({})", types.join(", "))?;
                }
                write!(f, ";")
            }
            Entry::Event(e) => {
                write!(f, "event {}({})", e.name, join_params(&e.inputs))?;
                if e.anonymous {
                    write!(f, " anonymous")?;
                }
                write!(f, ";")
            }
            Entry::Error(e) => write!(f, "error {}({});", e.name, join_params(&e.inputs)),
        }
    }
}
