//! Firmware version record codec.
//!
//! Devices store their running firmware version in a small fixed-size binary
//! record that the update tooling writes at build time and re-validates
//! before any metadata block is assembled. This crate owns that record:
//!
//! - [`crc`]: CRC-32 engine (CRC-32/ISO-HDLC, the zlib/Ethernet variant)
//! - [`record`]: the 28-byte record layout, encode/decode/validate
//!
//! Everything here is pure and synchronous; no I/O, no shared state.

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod crc;
pub mod error;
pub mod record;

pub use crc::crc32;
pub use error::VersionRecordError;
pub use record::{
    RECORD_REVISION, RECORD_SIZE, SIGNATURE, SIGNATURE_TAG, VersionRecord, pack_version,
    version_major, version_minor,
};

/// Convenience result alias for version record operations.
pub type VersionRecordResult<T> = Result<T, VersionRecordError>;
