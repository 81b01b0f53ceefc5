//! # abicodec-observability
//!
//! Logging setup for AbiCodec. Library crates only emit `tracing` events;
//! binaries call [`init_tracing`] once at startup to decide where they go.
//!
//! Levels are configurable globally and per component (crate name), and
//! output is either human-readable text or JSON lines on stderr.

pub mod tracing_setup;

pub use tracing_setup::{init_tracing, LogConfig};
