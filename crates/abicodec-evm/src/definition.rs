//! ABI JSON document → immutable [`AbiDefinition`].
//!
//! Parsing happens in two steps: serde deserializes each array element into a
//! raw record, then a single resolution pass turns raw records into
//! [`Param`]s with fully-built tuple types. Nothing is mutated after that pass.

use abicodec_core::{error::DefinitionError, types::SolidityType};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fs, io::Read, path::Path, sync::Arc};
use tracing::warn;

use crate::entry::{Constructor, CustomError, Entry, Event, Function, FunctionKind, StateMutability};
use crate::param::Param;

/// How strictly an ABI document is read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Reject unknown fields and unknown entry types instead of ignoring them
    pub strict: bool,
}

impl ParseOptions {
    pub fn strict() -> Self {
        Self { strict: true }
    }

    pub fn lenient() -> Self {
        Self { strict: false }
    }

    fn check_fields(&self, extra: &BTreeMap<String, serde_json::Value>) -> Result<(), DefinitionError> {
        match extra.keys().next() {
            Some(field) if self.strict => Err(DefinitionError::UnknownField {
                field: field.clone(),
            }),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawParam {
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    ty: String,
    #[serde(default)]
    indexed: bool,
    #[serde(default)]
    components: Option<Vec<RawParam>>,
    /// Compiler metadata; accepted in strict mode but not used
    #[serde(default)]
    #[allow(dead_code)]
    internal_type: Option<String>,
    #[serde(flatten)]
    extra: BTreeMap<String, serde_json::Value>,
}

fn default_entry_type() -> String {
    "function".into()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEntry {
    #[serde(rename = "type", default = "default_entry_type")]
    kind: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    inputs: Vec<RawParam>,
    #[serde(default)]
    outputs: Vec<RawParam>,
    #[serde(default)]
    anonymous: bool,
    #[serde(default)]
    constant: Option<bool>,
    #[serde(default)]
    payable: Option<bool>,
    #[serde(default)]
    state_mutability: Option<StateMutability>,
    #[serde(flatten)]
    extra: BTreeMap<String, serde_json::Value>,
}

impl RawEntry {
    fn mutability(&self) -> StateMutability {
        self.state_mutability.unwrap_or_else(|| {
            StateMutability::from_flags(
                self.constant.unwrap_or(false),
                self.payable.unwrap_or(false),
            )
        })
    }
}

fn resolve_param(raw: RawParam, opts: &ParseOptions) -> Result<Param, DefinitionError> {
    opts.check_fields(&raw.extra)?;

    let param = if raw.ty.trim().starts_with("tuple") {
        let components = raw.components.ok_or_else(|| DefinitionError::MissingComponents {
            param: raw.name.clone(),
        })?;
        let components = resolve_params(components, opts)?;
        Param::tuple(raw.name, &raw.ty, components)?
    } else {
        Param::new(raw.name, SolidityType::parse(&raw.ty)?)
    };
    Ok(param.indexed(raw.indexed))
}

fn resolve_params(raw: Vec<RawParam>, opts: &ParseOptions) -> Result<Vec<Param>, DefinitionError> {
    raw.into_iter().map(|p| resolve_param(p, opts)).collect()
}

/// `None` means the entry type is unknown and was skipped.
fn resolve_entry(raw: RawEntry, opts: &ParseOptions) -> Result<Option<Entry>, DefinitionError> {
    opts.check_fields(&raw.extra)?;
    let mutability = raw.mutability();

    let entry = match raw.kind.as_str() {
        "function" | "fallback" | "receive" => {
            let kind = match raw.kind.as_str() {
                "fallback" => FunctionKind::Fallback,
                "receive" => FunctionKind::Receive,
                _ => FunctionKind::Function,
            };
            Entry::Function(Function::with_kind(
                kind,
                raw.name,
                resolve_params(raw.inputs, opts)?,
                resolve_params(raw.outputs, opts)?,
                mutability,
            ))
        }
        "constructor" => Entry::Constructor(Constructor::new(
            resolve_params(raw.inputs, opts)?,
            mutability,
        )),
        "event" => Entry::Event(Event::new(
            raw.name,
            resolve_params(raw.inputs, opts)?,
            raw.anonymous,
        )),
        "error" => Entry::Error(CustomError::new(raw.name, resolve_params(raw.inputs, opts)?)),
        other if opts.strict => {
            return Err(DefinitionError::UnknownEntryType {
                kind: other.to_string(),
            })
        }
        other => {
            warn!(kind = other, name = %raw.name, "skipping ABI entry of unknown type");
            return Ok(None);
        }
    };
    Ok(Some(entry))
}

/// An ordered, immutable collection of ABI entries.
///
/// Entries are shared as `Arc<Entry>` so the signature index and any caller
/// can hold them without copying.
#[derive(Debug, Clone, Default)]
pub struct AbiDefinition {
    entries: Vec<Arc<Entry>>,
}

impl AbiDefinition {
    /// Build a definition from already-constructed entries.
    pub fn new(entries: Vec<Entry>) -> Self {
        Self {
            entries: entries.into_iter().map(Arc::new).collect(),
        }
    }

    /// Parse an ABI JSON array with lenient options.
    pub fn from_json(json: &str) -> Result<Self, DefinitionError> {
        Self::from_json_with(json, &ParseOptions::default())
    }

    pub fn from_json_with(json: &str, opts: &ParseOptions) -> Result<Self, DefinitionError> {
        let doc: serde_json::Value = serde_json::from_str(json)?;
        Self::from_value(doc, opts)
    }

    pub fn from_slice(bytes: &[u8], opts: &ParseOptions) -> Result<Self, DefinitionError> {
        let doc: serde_json::Value = serde_json::from_slice(bytes)?;
        Self::from_value(doc, opts)
    }

    pub fn from_reader<R: Read>(reader: R, opts: &ParseOptions) -> Result<Self, DefinitionError> {
        let doc: serde_json::Value = serde_json::from_reader(reader)?;
        Self::from_value(doc, opts)
    }

    /// Load an ABI file from disk.
    pub fn from_path(path: impl AsRef<Path>, opts: &ParseOptions) -> Result<Self, DefinitionError> {
        let bytes = fs::read(path)?;
        Self::from_slice(&bytes, opts)
    }

    /// Accepts a bare entry array, or a compiler artifact object carrying it
    /// under `"abi"`.
    fn from_value(doc: serde_json::Value, opts: &ParseOptions) -> Result<Self, DefinitionError> {
        let items = match doc {
            serde_json::Value::Array(items) => items,
            serde_json::Value::Object(mut obj) => match obj.remove("abi") {
                Some(serde_json::Value::Array(items)) => items,
                _ => return Err(DefinitionError::NotAnArray),
            },
            _ => return Err(DefinitionError::NotAnArray),
        };

        let mut entries = Vec::with_capacity(items.len());
        for item in items {
            let raw: RawEntry = serde_json::from_value(item)?;
            if let Some(entry) = resolve_entry(raw, opts)? {
                entries.push(Arc::new(entry));
            }
        }
        Ok(Self { entries })
    }

    /// All entries in document order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Entry>> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn functions(&self) -> impl Iterator<Item = &Function> {
        self.entries.iter().filter_map(|e| e.as_function())
    }

    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.entries.iter().filter_map(|e| e.as_event())
    }

    pub fn errors(&self) -> impl Iterator<Item = &CustomError> {
        self.entries.iter().filter_map(|e| e.as_error())
    }

    /// The first constructor, if any.
    pub fn constructor(&self) -> Option<&Constructor> {
        self.entries.iter().find_map(|e| e.as_constructor())
    }

    /// First function with this exact name; for overloads use
    /// [`AbiDefinition::functions`].
    pub fn find_function(&self, name: &str) -> Option<&Function> {
        self.functions().find(|f| f.name() == name)
    }

    pub fn find_event(&self, name: &str) -> Option<&Event> {
        self.events().find(|e| e.name() == name)
    }

    pub fn find_error(&self, name: &str) -> Option<&CustomError> {
        self.errors().find(|e| e.name() == name)
    }
}

impl<'a> IntoIterator for &'a AbiDefinition {
    type Item = &'a Arc<Entry>;
    type IntoIter = std::slice::Iter<'a, Arc<Entry>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
