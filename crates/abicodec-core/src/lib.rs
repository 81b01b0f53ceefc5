//! # abicodec-core
//!
//! The Solidity ABI type system and value codec shared by every AbiCodec crate.
//! Entry models, signature indexing and the request-level decoder live in
//! `abicodec-evm`; everything here is independent of any particular ABI
//! document.

pub mod call;
pub mod codec;
pub mod error;
pub mod hash;
pub mod types;
pub mod value;

pub use call::{DecodedCall, DecodedParam};
pub use codec::{decode_sequence, encode_sequence, WORD};
pub use error::{DecodeError, DefinitionError, EncodeError};
pub use types::SolidityType;
pub use value::AbiValue;
