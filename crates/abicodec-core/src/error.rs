//! Error types for the AbiCodec pipeline.

use thiserror::Error;

/// Errors raised while decoding call data, return data, revert data or logs.
///
/// Every variant is terminal: a decode either produces a complete result or
/// fails with one of these, never a partial value.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("Unknown signature {selector}")]
    UnknownSignature { selector: String },

    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Unsupported value shape for param '{name}' ({type_name}): {value}")]
    UnsupportedValueShape {
        name: String,
        type_name: String,
        value: String,
    },

    #[error("Malformed ABI payload: {reason}")]
    Malformed { reason: String },
}

impl DecodeError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        DecodeError::Malformed {
            reason: reason.into(),
        }
    }

    /// Build an `InvalidInput` error.
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        DecodeError::InvalidInput {
            reason: reason.into(),
        }
    }
}

/// Errors raised while ABI-encoding values.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("Too many arguments: {given} > {expected}")]
    TooManyArguments { given: usize, expected: usize },

    #[error("Cannot encode value as {type_name}: {reason}")]
    ValueMismatch { type_name: String, reason: String },

    #[error("Function '{name}' not found in ABI")]
    UnknownFunction { name: String },
}

impl EncodeError {
    /// Build a `ValueMismatch` error.
    pub fn mismatch(type_name: impl ToString, reason: impl Into<String>) -> Self {
        EncodeError::ValueMismatch {
            type_name: type_name.to_string(),
            reason: reason.into(),
        }
    }
}

/// Errors raised while loading an ABI document into the entry model.
#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("Invalid ABI JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ABI document must be a JSON array of entries")]
    NotAnArray,

    #[error("Invalid Solidity type '{type_name}'")]
    InvalidType { type_name: String },

    #[error("Tuple param '{param}' has no components")]
    MissingComponents { param: String },

    #[error("Unknown entry type '{kind}'")]
    UnknownEntryType { kind: String },

    #[error("Unknown field '{field}' in ABI entry")]
    UnknownField { field: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_mismatch_names_both_variants() {
        let err = DecodeError::TypeMismatch {
            expected: "function".into(),
            actual: "event".into(),
        };
        assert_eq!(
            err.to_string(),
            "Type mismatch: expected function, got event"
        );
    }
}
