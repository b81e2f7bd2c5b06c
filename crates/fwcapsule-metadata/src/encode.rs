//! Binary serialization of the metadata block.
//!
//! All fields are little-endian and packed back-to-back with no implicit
//! padding. The block is a 40-byte header followed by one fixed-width record
//! per accepted entry; the record width depends on the selected on-wire
//! revision.

use tracing::debug;

use crate::guid::{encode_utf16_fixed, to_efi_bytes};
use crate::rules::{FILE_NAME_MAX_CHARS, MATCH_IDENTIFIER_MAX_CHARS, PARTITION_NAME_MAX_CHARS};
use crate::types::{ValidatedDevicePath, ValidatedFirmwareEntry};

/// First magic word of the metadata header.
pub const METADATA_HEADER_SIGNATURE1: u32 = 0x2E19_46FB;

/// Second magic word of the metadata header.
pub const METADATA_HEADER_SIGNATURE2: u32 = 0x7F74_4D57;

/// Total header length in bytes.
pub const METADATA_HEADER_SIZE: usize = 40;

/// Byte count excluded from the header's `Size` field: the two signature
/// words, the revision word, and the size word itself.
pub const METADATA_HEADER_SIZE_ADJUSTMENT: usize = 16;

/// Revision marker stored inside each revision-4 entry record.
pub const METADATA_ENTRY_REVISION: u32 = 1;

/// Width of one device path sub-record:
/// `[DiskType:4][PartitionName:72][PartitionTypeId:16][FileName:510]`.
pub const DEVICE_PATH_SIZE: usize = 4 + 2 * PARTITION_NAME_MAX_CHARS + 16 + 2 * FILE_NAME_MAX_CHARS;

/// Width of one legacy (revision 3) entry record.
pub const ENTRY_RECORD_SIZE_V3: usize = 16 + 3 * 4 + 2 * DEVICE_PATH_SIZE;

/// Width of one revision 4 entry record: the legacy record plus the record
/// revision word and the fixed-width match identifier buffer.
pub const ENTRY_RECORD_SIZE_V4: usize =
    ENTRY_RECORD_SIZE_V3 + 4 + 2 * MATCH_IDENTIFIER_MAX_CHARS;

/// On-wire revision of the metadata block.
///
/// Chosen once per block; every entry record's byte width and field set is
/// derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetadataRevision {
    /// Legacy layout without the match identifier field.
    V3,
    /// Layout carrying a per-entry match identifier.
    V4,
}

impl MetadataRevision {
    /// Revision code stored in the header.
    pub const fn header_revision(self) -> u32 {
        match self {
            MetadataRevision::V3 => 3,
            MetadataRevision::V4 => 4,
        }
    }

    /// Byte width of one entry record under this revision.
    pub const fn entry_record_size(self) -> usize {
        match self {
            MetadataRevision::V3 => ENTRY_RECORD_SIZE_V3,
            MetadataRevision::V4 => ENTRY_RECORD_SIZE_V4,
        }
    }

    /// Whether entry records carry a match identifier field.
    pub const fn carries_match_identifier(self) -> bool {
        matches!(self, MetadataRevision::V4)
    }
}

impl std::fmt::Display for MetadataRevision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "revision {}", self.header_revision())
    }
}

/// Header fields of the metadata block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetadataHeader {
    /// On-wire revision of the whole block.
    pub revision: MetadataRevision,
    /// Packed firmware version being installed.
    pub firmware_version: u32,
    /// Packed lowest firmware version this update may be applied over.
    pub lowest_supported_version: u32,
    /// Monotonic counter bumped on compatibility-breaking updates.
    pub breaking_change_number: u32,
    /// Number of entry records following the header.
    pub entry_count: u32,
}

impl MetadataHeader {
    /// Serialize the 40-byte header.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(METADATA_HEADER_SIZE);
        put_u32(&mut out, METADATA_HEADER_SIGNATURE1);
        put_u32(&mut out, METADATA_HEADER_SIGNATURE2);
        put_u32(&mut out, self.revision.header_revision());
        put_u32(
            &mut out,
            (METADATA_HEADER_SIZE - METADATA_HEADER_SIZE_ADJUSTMENT) as u32,
        );
        put_u32(&mut out, self.firmware_version);
        put_u32(&mut out, self.lowest_supported_version);
        put_u32(&mut out, self.breaking_change_number);
        put_u32(&mut out, 0); // Reserved1
        put_u32(&mut out, 0); // Reserved2
        put_u32(&mut out, self.entry_count);
        debug_assert_eq!(out.len(), METADATA_HEADER_SIZE);
        out
    }
}

/// Serialize the full metadata block: header followed by one record per
/// accepted entry, no padding.
pub fn encode_metadata_block(
    header: &MetadataHeader,
    entries: &[ValidatedFirmwareEntry],
) -> Vec<u8> {
    let record_size = header.revision.entry_record_size();
    let mut out =
        Vec::with_capacity(METADATA_HEADER_SIZE.saturating_add(record_size.saturating_mul(entries.len())));
    out.extend_from_slice(&header.encode());
    for entry in entries {
        out.extend_from_slice(&encode_entry(entry, header.revision));
    }
    debug!(
        "encoded metadata block: {} entries, {} bytes, {}",
        entries.len(),
        out.len(),
        header.revision
    );
    out
}

/// Serialize one entry record.
pub fn encode_entry(entry: &ValidatedFirmwareEntry, revision: MetadataRevision) -> Vec<u8> {
    let mut out = Vec::with_capacity(revision.entry_record_size());
    out.extend_from_slice(&to_efi_bytes(entry.file_guid));
    put_u32(&mut out, entry.operation.code());
    put_u32(&mut out, entry.update_type.code());
    put_u32(&mut out, entry.backup_type.code());
    out.extend_from_slice(&encode_device_path(&entry.update_path));
    out.extend_from_slice(&encode_device_path(&entry.backup_path));
    if revision.carries_match_identifier() {
        put_u32(&mut out, METADATA_ENTRY_REVISION);
        let identifier = entry.match_identifier.as_deref().unwrap_or_default();
        out.extend_from_slice(&fixed_text(identifier, MATCH_IDENTIFIER_MAX_CHARS));
    }
    debug_assert_eq!(out.len(), revision.entry_record_size());
    out
}

/// Serialize one device path sub-record.
pub fn encode_device_path(path: &ValidatedDevicePath) -> Vec<u8> {
    let mut out = Vec::with_capacity(DEVICE_PATH_SIZE);
    put_u32(&mut out, path.disk_type.code());
    out.extend_from_slice(&fixed_text(&path.partition_name, PARTITION_NAME_MAX_CHARS));
    out.extend_from_slice(&to_efi_bytes(path.partition_type_guid));
    out.extend_from_slice(&fixed_text(&path.file_name, FILE_NAME_MAX_CHARS));
    debug_assert_eq!(out.len(), DEVICE_PATH_SIZE);
    out
}

fn put_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

// An oversized name here means a validated entry was constructed by hand
// with unchecked values. Assert in debug builds; emit an all-zero buffer
// rather than a malformed record otherwise.
fn fixed_text(value: &str, max_chars: usize) -> Vec<u8> {
    match encode_utf16_fixed(value, max_chars) {
        Ok(buf) => buf,
        Err(overflow) => {
            debug_assert!(
                false,
                "fixed-width text overflow after validation: {} > {}",
                overflow.len, overflow.max
            );
            vec![0u8; max_chars.saturating_mul(2)]
        }
    }
}
