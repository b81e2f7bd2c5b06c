//! The 28-byte firmware version record.
//!
//! Layout (little-endian, packed, no implicit padding):
//!
//! ```text
//! [Signature:8][Revision:4][VersionDataSize:4][VersionDataCrc32:4][FwVersion:4][LowestSupportedFwVersion:4]
//! ```
//!
//! The CRC field covers the whole record with itself zeroed. The signature
//! and revision are fixed constants; a record failing any of the three
//! checks is never trusted by the metadata pipeline.

use tracing::{debug, error};

use crate::crc::crc32;
use crate::error::VersionRecordError;

/// Fixed size of the encoded record in bytes.
pub const RECORD_SIZE: usize = 28;

/// ASCII signature tag stored in the first 8 bytes.
pub const SIGNATURE_TAG: &[u8; 8] = b"SYSFWVER";

/// Signature as the little-endian u64 the record stores.
pub const SIGNATURE: u64 = u64::from_le_bytes(*SIGNATURE_TAG);

/// Expected record revision, packed as `1.0`.
pub const RECORD_REVISION: u32 = pack_version(1, 0);

/// Pack a `major.minor` pair into the record's 32-bit version form
/// (high 16 bits major, low 16 bits minor).
pub const fn pack_version(major: u16, minor: u16) -> u32 {
    ((major as u32) << 16) | minor as u32
}

/// High 16 bits of a packed version.
pub const fn version_major(packed: u32) -> u16 {
    (packed >> 16) as u16
}

/// Low 16 bits of a packed version.
pub const fn version_minor(packed: u32) -> u16 {
    (packed & 0xFFFF) as u16
}

/// Decoded firmware version record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionRecord {
    /// 64-bit ASCII signature, stored little-endian.
    pub signature: u64,
    /// Packed record format revision.
    pub revision: u32,
    /// Size of this record in bytes.
    pub version_data_size: u32,
    /// CRC-32 of the record with this field zeroed.
    pub version_data_crc32: u32,
    /// Packed firmware version (exact packing defined by the caller).
    pub fw_version: u32,
    /// Packed lowest supported firmware version.
    pub lowest_supported_fw_version: u32,
}

/// Consumes a byte slice front-to-back in fixed-width chunks.
///
/// Callers check the total length up front; a short read past the end
/// zero-fills, which never happens for pre-checked input.
struct FieldReader<'a> {
    bytes: &'a [u8],
}

impl<'a> FieldReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    fn take<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0u8; N];
        for slot in out.iter_mut() {
            if let Some((first, rest)) = self.bytes.split_first() {
                *slot = *first;
                self.bytes = rest;
            }
        }
        out
    }

    fn read_u32_le(&mut self) -> u32 {
        u32::from_le_bytes(self.take::<4>())
    }

    fn read_u64_le(&mut self) -> u64 {
        u64::from_le_bytes(self.take::<8>())
    }
}

impl VersionRecord {
    /// Build a fresh record for the given firmware/lowest-supported version
    /// pair, with the fixed signature and revision and a computed CRC.
    pub fn new(fw_version: u32, lowest_supported_fw_version: u32) -> Self {
        let mut record = Self {
            signature: SIGNATURE,
            revision: RECORD_REVISION,
            version_data_size: RECORD_SIZE as u32,
            version_data_crc32: 0,
            fw_version,
            lowest_supported_fw_version,
        };
        record.version_data_crc32 = crc32(&record.encode());
        record
    }

    /// Decode a record from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`VersionRecordError::MalformedInput`] if fewer than
    /// [`RECORD_SIZE`] bytes are supplied. Field values are not checked
    /// here; call [`validate`](Self::validate) for that.
    pub fn decode(bytes: &[u8]) -> Result<Self, VersionRecordError> {
        if bytes.len() < RECORD_SIZE {
            return Err(VersionRecordError::MalformedInput {
                expected: RECORD_SIZE,
                actual: bytes.len(),
            });
        }

        let mut reader = FieldReader::new(bytes);
        Ok(Self {
            signature: reader.read_u64_le(),
            revision: reader.read_u32_le(),
            version_data_size: reader.read_u32_le(),
            version_data_crc32: reader.read_u32_le(),
            fw_version: reader.read_u32_le(),
            lowest_supported_fw_version: reader.read_u32_le(),
        })
    }

    /// Serialize the record in wire order.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(RECORD_SIZE);
        out.extend_from_slice(&self.signature.to_le_bytes());
        out.extend_from_slice(&self.revision.to_le_bytes());
        out.extend_from_slice(&self.version_data_size.to_le_bytes());
        out.extend_from_slice(&self.version_data_crc32.to_le_bytes());
        out.extend_from_slice(&self.fw_version.to_le_bytes());
        out.extend_from_slice(&self.lowest_supported_fw_version.to_le_bytes());
        out
    }

    /// Validate signature, revision, and checksum.
    ///
    /// The three checks are independent and every violation is logged, but
    /// the first failing check (in signature, revision, checksum order) is
    /// what the caller gets back.
    ///
    /// # Errors
    ///
    /// [`VersionRecordError::BadSignature`], [`VersionRecordError::BadRevision`],
    /// or [`VersionRecordError::BadChecksum`].
    pub fn validate(&self) -> Result<(), VersionRecordError> {
        let mut first_error = None;

        if self.signature != SIGNATURE {
            error!("unexpected version record signature 0x{:016X}", self.signature);
            first_error.get_or_insert(VersionRecordError::BadSignature {
                found: self.signature,
            });
        }

        if self.revision != RECORD_REVISION {
            error!(
                "unexpected version record revision 0x{:08X}, expected 0x{RECORD_REVISION:08X}",
                self.revision
            );
            first_error.get_or_insert(VersionRecordError::BadRevision {
                found: self.revision,
                expected: RECORD_REVISION,
            });
        }

        let mut scratch = *self;
        scratch.version_data_crc32 = 0;
        let computed = crc32(&scratch.encode());
        if computed != self.version_data_crc32 {
            error!(
                "version record checksum mismatch: stored 0x{:08X}, computed 0x{computed:08X}",
                self.version_data_crc32
            );
            first_error.get_or_insert(VersionRecordError::BadChecksum {
                stored: self.version_data_crc32,
                computed,
            });
        }

        match first_error {
            Some(err) => Err(err),
            None => {
                debug!("version record validated");
                Ok(())
            }
        }
    }

    /// Firmware version as its packed `(high, low)` halves.
    pub fn fw_version_parts(&self) -> (u16, u16) {
        (version_major(self.fw_version), version_minor(self.fw_version))
    }

    /// Lowest supported firmware version as its packed `(high, low)` halves.
    pub fn lowest_supported_parts(&self) -> (u16, u16) {
        (
            version_major(self.lowest_supported_fw_version),
            version_minor(self.lowest_supported_fw_version),
        )
    }
}

impl std::fmt::Display for VersionRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (fw_hi, fw_lo) = self.fw_version_parts();
        let (ls_hi, ls_lo) = self.lowest_supported_parts();
        write!(
            f,
            "signature=0x{:016X} revision={}.{} size={} crc32=0x{:08X} fw={fw_hi}.{fw_lo} lowest={ls_hi}.{ls_lo}",
            self.signature,
            version_major(self.revision),
            version_minor(self.revision),
            self.version_data_size,
            self.version_data_crc32,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_size_matches_layout() {
        let record = VersionRecord::new(0x0001_0002, 0x0001_0000);
        assert_eq!(record.encode().len(), RECORD_SIZE);
        assert_eq!(record.version_data_size, RECORD_SIZE as u32);
    }

    #[test]
    fn test_encode_decode_round_trip() -> Result<(), VersionRecordError> {
        let record = VersionRecord::new(0x0003_0001, 0x0002_0000);
        let decoded = VersionRecord::decode(&record.encode())?;
        assert_eq!(decoded, record);
        decoded.validate()?;
        assert_eq!(decoded.fw_version, 0x0003_0001);
        assert_eq!(decoded.lowest_supported_fw_version, 0x0002_0000);
        Ok(())
    }

    #[test]
    fn test_decode_short_input() {
        let err = VersionRecord::decode(&[0u8; 27]);
        assert_eq!(
            err,
            Err(VersionRecordError::MalformedInput {
                expected: RECORD_SIZE,
                actual: 27
            })
        );
    }

    #[test]
    fn test_signature_decodes_to_ascii_tag() {
        assert_eq!(&SIGNATURE.to_le_bytes(), SIGNATURE_TAG);
    }

    #[test]
    fn test_validate_rejects_wrong_signature() {
        let mut record = VersionRecord::new(1, 0);
        record.signature = 0xDEAD_BEEF;
        assert!(matches!(
            record.validate(),
            Err(VersionRecordError::BadSignature { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_wrong_revision() {
        let mut record = VersionRecord::new(1, 0);
        record.revision = pack_version(2, 0);
        // CRC is now stale too, but the revision check fires first.
        assert!(matches!(
            record.validate(),
            Err(VersionRecordError::BadRevision { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_tampered_payload() -> Result<(), VersionRecordError> {
        let record = VersionRecord::new(0x0001_0005, 0x0001_0000);
        let mut bytes = record.encode();
        if let Some(byte) = bytes.last_mut() {
            *byte ^= 0x40;
        }
        let tampered = VersionRecord::decode(&bytes)?;
        assert!(matches!(
            tampered.validate(),
            Err(VersionRecordError::BadChecksum { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_version_packing_helpers() {
        let packed = pack_version(7, 42);
        assert_eq!(version_major(packed), 7);
        assert_eq!(version_minor(packed), 42);
    }
}
