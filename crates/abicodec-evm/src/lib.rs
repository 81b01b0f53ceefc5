//! # abicodec-evm
//!
//! ABI document model and request-level decoding for EVM contracts.
//!
//! ## Features
//! - Function-call decoding by 4-byte selector, with `multicall` flattening
//! - Event-log decoding with indexed/non-indexed reassembly
//! - Custom error, constructor and return-data decoding
//! - Call encoding from typed values or loosely typed JSON
//! - Parallel batch decoding via Rayon
//!
//! ```ignore
//! let decoder = AbiDecoder::from_json(ABI_JSON)?;
//! let call = decoder.decode_function_call("0xa9059cbb...")?;
//! println!("{call}");
//! ```

pub mod batch;
pub mod decoder;
pub mod definition;
pub mod encoder;
pub mod entry;
pub mod index;
pub mod param;

pub use batch::{decode_calls_parallel, BatchResult, ErrorMode};
pub use decoder::AbiDecoder;
pub use definition::{AbiDefinition, ParseOptions};
pub use entry::{
    Constructor, CustomError, Entry, EntryKind, Event, Function, FunctionKind, StateMutability,
};
pub use index::SignatureIndex;
pub use param::Param;
