//! Request-level decoding: function calls, multicall batches, event logs,
//! revert data, constructor arguments and return data.
//!
//! Every request follows the same path: hex input → selector → index lookup
//! → variant check → parameter-list decode → named result. Requests share no
//! state, so one `AbiDecoder` can serve any number of threads.

use abicodec_core::{
    call::{DecodedCall, DecodedParam},
    error::{DecodeError, DefinitionError, EncodeError},
    hash,
    types::SolidityType,
    value::AbiValue,
};
use std::sync::Arc;
use tracing::{debug, trace};

use crate::definition::{AbiDefinition, ParseOptions};
use crate::entry::{CustomError, Entry, EntryKind, Function, SELECTOR_LEN};
use crate::index::SignatureIndex;
use crate::param::Param;

/// Name of the function whose `data` argument carries nested calls.
const MULTICALL: &str = "multicall";
const MULTICALL_DATA: &str = "data";

/// Decoder over one ABI document.
#[derive(Debug, Clone)]
pub struct AbiDecoder {
    abi: AbiDefinition,
    index: SignatureIndex,
    /// `Error(string)` and `Panic(uint256)`, emitted by the compiler for
    /// `require`/`revert` strings and failed assertions
    builtin_errors: [CustomError; 2],
}

impl AbiDecoder {
    /// Build the selector index over `abi`. The decoder is complete once this
    /// returns.
    pub fn new(abi: AbiDefinition) -> Self {
        let index = SignatureIndex::build(&abi);
        debug!(entries = abi.len(), selectors = index.len(), "ABI decoder ready");
        Self {
            abi,
            index,
            builtin_errors: builtin_errors(),
        }
    }

    /// Parse an ABI JSON document leniently and build a decoder over it.
    pub fn from_json(json: &str) -> Result<Self, DefinitionError> {
        Ok(Self::new(AbiDefinition::from_json(json)?))
    }

    pub fn from_json_with(json: &str, opts: &ParseOptions) -> Result<Self, DefinitionError> {
        Ok(Self::new(AbiDefinition::from_json_with(json, opts)?))
    }

    pub fn definition(&self) -> &AbiDefinition {
        &self.abi
    }

    pub fn index(&self) -> &SignatureIndex {
        &self.index
    }

    // ── Function calls ───────────────────────────────────────────────────────

    /// Decode transaction input (`selector ‖ args`, optionally `0x`-prefixed).
    pub fn decode_function_call(&self, hex_input: &str) -> Result<DecodedCall, DecodeError> {
        let calldata = parse_hex(hex_input, "call data")?;
        self.decode_function_call_bytes(&calldata)
    }

    /// Raw-bytes form of [`AbiDecoder::decode_function_call`].
    pub fn decode_function_call_bytes(&self, calldata: &[u8]) -> Result<DecodedCall, DecodeError> {
        let (selector, args) = split_selector(calldata)?;
        let entry = self.lookup(selector)?;
        let function = entry.as_function().ok_or_else(|| mismatch(EntryKind::Function, entry))?;

        debug!(selector = %hex::encode(selector), function = function.name(), "decoding function call");
        let values = function.decode_input(args)?;
        Ok(assemble(function.name(), function.inputs(), values))
    }

    /// Decode a call and, if it is a `multicall`, every call it wraps.
    ///
    /// A non-multicall input yields exactly one call. A multicall yields its
    /// inner calls in argument order; inner multicalls are flattened the same
    /// way, with no depth limit. An N-element multicall therefore returns
    /// more than N calls when one of its elements is itself a multicall; use
    /// [`AbiDecoder::decode_function_call`] on each element for a one-level
    /// expansion.
    pub fn decode_function_calls(&self, hex_input: &str) -> Result<Vec<DecodedCall>, DecodeError> {
        let call = self.decode_function_call(hex_input)?;
        self.flatten(call)
    }

    /// Raw-bytes form of [`AbiDecoder::decode_function_calls`].
    pub fn decode_function_calls_bytes(&self, calldata: &[u8]) -> Result<Vec<DecodedCall>, DecodeError> {
        let call = self.decode_function_call_bytes(calldata)?;
        self.flatten(call)
    }

    fn flatten(&self, call: DecodedCall) -> Result<Vec<DecodedCall>, DecodeError> {
        if !call.name.eq_ignore_ascii_case(MULTICALL) {
            return Ok(vec![call]);
        }

        let data = call.param(MULTICALL_DATA).ok_or_else(|| DecodeError::MissingField {
            field: MULTICALL_DATA.into(),
        })?;
        let unsupported = || DecodeError::UnsupportedValueShape {
            name: data.name.clone(),
            type_name: data.type_name.clone(),
            value: data.value.to_string(),
        };

        match &data.value {
            AbiValue::Hex(inner) | AbiValue::String(inner) => {
                trace!("unwrapping single multicall payload");
                self.decode_function_calls(inner)
            }
            AbiValue::List(items) => {
                trace!(calls = items.len(), "unwrapping multicall batch");
                let mut calls = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        AbiValue::Hex(inner) | AbiValue::String(inner) => {
                            calls.extend(self.decode_function_calls(inner)?)
                        }
                        _ => return Err(unsupported()),
                    }
                }
                Ok(calls)
            }
            _ => Err(unsupported()),
        }
    }

    // ── Events ───────────────────────────────────────────────────────────────

    /// Decode a log record. `topics[0]` must be the event's topic hash.
    pub fn decode_log_event<T: AsRef<str>>(
        &self,
        topics: &[T],
        data: &str,
    ) -> Result<DecodedCall, DecodeError> {
        let first = topics
            .first()
            .ok_or_else(|| DecodeError::invalid_input("log has no topics"))?;
        let entry = self
            .index
            .get(first.as_ref().trim())
            .ok_or_else(|| DecodeError::UnknownSignature {
                selector: first.as_ref().trim().to_string(),
            })?;
        let event = entry.as_event().ok_or_else(|| mismatch(EntryKind::Event, entry))?;

        let topics = parse_topics(topics)?;
        let data = parse_hex(data, "log data")?;
        debug!(event = event.name(), topics = topics.len(), "decoding log");
        let values = event.decode_log(&topics, &data)?;
        Ok(assemble(event.name(), event.inputs(), values))
    }

    /// Decode a log of a named anonymous event; anonymous logs carry no
    /// signature topic, so they cannot be found by selector.
    pub fn decode_anonymous_event<T: AsRef<str>>(
        &self,
        name: &str,
        topics: &[T],
        data: &str,
    ) -> Result<DecodedCall, DecodeError> {
        let event = self
            .abi
            .events()
            .find(|e| e.is_anonymous() && e.name() == name)
            .ok_or_else(|| DecodeError::UnknownSignature {
                selector: format!("anonymous event {name}"),
            })?;
        let topics = parse_topics(topics)?;
        let data = parse_hex(data, "log data")?;
        let values = event.decode_log(&topics, &data)?;
        Ok(assemble(event.name(), event.inputs(), values))
    }

    // ── Errors, constructors, return data ────────────────────────────────────

    /// Decode revert data against the ABI's custom errors, falling back to
    /// the built-in `Error(string)` and `Panic(uint256)`.
    pub fn decode_error(&self, hex_input: &str) -> Result<DecodedCall, DecodeError> {
        let revert = parse_hex(hex_input, "revert data")?;
        let (selector, args) = split_selector(&revert)?;

        let error = match self.index.get_bytes(selector) {
            Some(entry) => entry.as_error().ok_or_else(|| mismatch(EntryKind::Error, entry))?,
            None => self
                .builtin_errors
                .iter()
                .find(|e| e.selector() == selector)
                .ok_or_else(|| DecodeError::UnknownSignature {
                    selector: hex::encode(selector),
                })?,
        };

        debug!(error = error.name(), "decoding revert data");
        let values = error.decode_args(args)?;
        Ok(assemble(error.name(), error.inputs(), values))
    }

    /// Decode constructor arguments (the bytes appended after init code).
    pub fn decode_constructor(&self, hex_input: &str) -> Result<DecodedCall, DecodeError> {
        let constructor = self.abi.constructor().ok_or_else(|| DecodeError::UnknownSignature {
            selector: "constructor".into(),
        })?;
        let args = parse_hex(hex_input, "constructor arguments")?;
        let values = constructor.decode_args(&args)?;
        Ok(assemble("", constructor.inputs(), values))
    }

    /// Decode data returned by the named function (or full signature, for
    /// overloads).
    pub fn decode_function_result(
        &self,
        function: &str,
        hex_output: &str,
    ) -> Result<DecodedCall, DecodeError> {
        let func = self.function(function).ok_or_else(|| DecodeError::UnknownSignature {
            selector: function.to_string(),
        })?;
        let output = parse_hex(hex_output, "return data")?;
        let values = func.decode_output(&output)?;
        Ok(assemble(func.name(), func.outputs(), values))
    }

    // ── Encoding ─────────────────────────────────────────────────────────────

    /// `selector ‖ args` for the named function (or full signature).
    pub fn encode_function_call(
        &self,
        function: &str,
        values: &[AbiValue],
    ) -> Result<Vec<u8>, EncodeError> {
        let func = self.function(function).ok_or_else(|| EncodeError::UnknownFunction {
            name: function.to_string(),
        })?;
        func.encode_call(values)
    }

    /// `0x`-prefixed hex form of [`AbiDecoder::encode_function_call`].
    pub fn encode_function_call_hex(
        &self,
        function: &str,
        values: &[AbiValue],
    ) -> Result<String, EncodeError> {
        Ok(hash::to_hex_prefixed(self.encode_function_call(function, values)?))
    }

    /// Find a function by name, or by canonical signature when `function`
    /// contains a parenthesis.
    pub fn function(&self, function: &str) -> Option<&Function> {
        if function.contains('(') {
            let wanted: String = function.chars().filter(|c| !c.is_whitespace()).collect();
            self.abi.functions().find(|f| f.signature() == wanted)
        } else {
            self.abi.find_function(function)
        }
    }

    fn lookup(&self, selector: &[u8]) -> Result<&Arc<Entry>, DecodeError> {
        self.index
            .get_bytes(selector)
            .ok_or_else(|| DecodeError::UnknownSignature {
                selector: hex::encode(selector),
            })
    }
}

fn builtin_errors() -> [CustomError; 2] {
    [
        CustomError::new("Error", vec![Param::new("message", SolidityType::String)]),
        CustomError::new("Panic", vec![Param::new("code", SolidityType::Uint(256))]),
    ]
}

fn mismatch(expected: EntryKind, actual: &Entry) -> DecodeError {
    DecodeError::TypeMismatch {
        expected: expected.to_string(),
        actual: actual.kind().to_string(),
    }
}

/// Pair decoded values with their params, in declaration order.
fn assemble(name: &str, params: &[Param], values: Vec<AbiValue>) -> DecodedCall {
    let params = params
        .iter()
        .zip(values)
        .map(|(p, v)| DecodedParam::new(p.name.clone(), p.type_name(), v))
        .collect();
    DecodedCall::new(name, params)
}

fn split_selector(bytes: &[u8]) -> Result<(&[u8], &[u8]), DecodeError> {
    if bytes.len() < SELECTOR_LEN {
        return Err(DecodeError::invalid_input(format!(
            "input is {} bytes, need at least {SELECTOR_LEN} for a selector",
            bytes.len()
        )));
    }
    Ok(bytes.split_at(SELECTOR_LEN))
}

fn parse_hex(input: &str, what: &str) -> Result<Vec<u8>, DecodeError> {
    hash::decode_hex(input.trim())
        .map_err(|e| DecodeError::invalid_input(format!("{what} is not valid hex: {e}")))
}

fn parse_topics<T: AsRef<str>>(topics: &[T]) -> Result<Vec<Vec<u8>>, DecodeError> {
    topics
        .iter()
        .map(|t| parse_hex(t.as_ref(), "topic"))
        .collect()
}
