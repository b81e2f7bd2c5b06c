//! Error types for version record decoding and validation.

use thiserror::Error;

/// Errors returned when decoding or validating a firmware version record.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionRecordError {
    /// Fewer bytes than the record's fixed size were supplied.
    #[error("malformed version record: expected {expected} bytes, got {actual}")]
    MalformedInput {
        /// Fixed size of the record in bytes.
        expected: usize,
        /// Number of bytes actually supplied.
        actual: usize,
    },

    /// The 8-byte signature does not decode to the expected ASCII tag.
    #[error("bad version record signature: 0x{found:016X}")]
    BadSignature {
        /// Signature value found in the record.
        found: u64,
    },

    /// The packed record revision does not match the expected major.minor.
    #[error("bad version record revision: 0x{found:08X}, expected 0x{expected:08X}")]
    BadRevision {
        /// Revision value found in the record.
        found: u32,
        /// Expected packed revision.
        expected: u32,
    },

    /// The stored CRC does not match the CRC of the record with the CRC
    /// field zeroed.
    #[error("bad version record checksum: stored 0x{stored:08X}, computed 0x{computed:08X}")]
    BadChecksum {
        /// CRC stored in the record.
        stored: u32,
        /// CRC computed over the record with the CRC field zeroed.
        computed: u32,
    },
}
