//! Rayon-powered batch decoding of many calldata strings against one
//! decoder.

use abicodec_core::{call::DecodedCall, error::DecodeError};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::decoder::AbiDecoder;

/// How a batch reacts to inputs that fail to decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorMode {
    /// Drop failures silently.
    #[default]
    Skip,
    /// Return failures next to the successes.
    Collect,
    /// Fail the whole batch on the first failure (by input position).
    Throw,
}

/// Successes in input order, plus `(input index, error)` pairs when
/// collecting.
#[derive(Debug, Default)]
pub struct BatchResult {
    pub calls: Vec<DecodedCall>,
    pub errors: Vec<(usize, DecodeError)>,
}

/// Decode every input with [`AbiDecoder::decode_function_call`] in parallel.
pub fn decode_calls_parallel(
    decoder: &AbiDecoder,
    inputs: &[String],
    mode: ErrorMode,
) -> Result<BatchResult, (usize, DecodeError)> {
    run(inputs, mode, |input| decoder.decode_function_call(input).map(|c| vec![c]))
}

/// Like [`decode_calls_parallel`], flattening multicalls; one input may
/// contribute several calls.
pub fn decode_multicalls_parallel(
    decoder: &AbiDecoder,
    inputs: &[String],
    mode: ErrorMode,
) -> Result<BatchResult, (usize, DecodeError)> {
    run(inputs, mode, |input| decoder.decode_function_calls(input))
}

fn run<F>(inputs: &[String], mode: ErrorMode, decode: F) -> Result<BatchResult, (usize, DecodeError)>
where
    F: Fn(&str) -> Result<Vec<DecodedCall>, DecodeError> + Sync,
{
    // par_iter().collect() keeps input order
    let results: Vec<Result<Vec<DecodedCall>, DecodeError>> =
        inputs.par_iter().map(|input| decode(input)).collect();

    let mut out = BatchResult::default();
    for (idx, result) in results.into_iter().enumerate() {
        match (result, mode) {
            (Ok(calls), _) => out.calls.extend(calls),
            (Err(_), ErrorMode::Skip) => {}
            (Err(e), ErrorMode::Collect) => out.errors.push((idx, e)),
            (Err(e), ErrorMode::Throw) => return Err((idx, e)),
        }
    }

    info!(
        inputs = inputs.len(),
        decoded = out.calls.len(),
        errors = out.errors.len(),
        "batch decode complete"
    );
    Ok(out)
}
