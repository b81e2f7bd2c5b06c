//! CRC-32 engine for the version record.
//!
//! The firmware-update agent checks record integrity with CRC-32/ISO-HDLC:
//! polynomial `0x04C11DB7`, initial register `0xFFFFFFFF`, input and output
//! bit-reflection, final XOR `0xFFFFFFFF`. That is the same variant zlib and
//! Ethernet use, so `crc32fast` computes it directly.

/// Compute the CRC-32/ISO-HDLC checksum of `bytes`.
///
/// Pure function; callers are responsible for passing exactly the byte range
/// the checksum covers (never trailing padding).
pub fn crc32(bytes: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(bytes);
    hasher.finalize()
}
