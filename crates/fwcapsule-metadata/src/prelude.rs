//! Convenience re-exports for common metadata block types

pub use crate::builder::MetadataBlockBuilder;
pub use crate::encode::{
    ENTRY_RECORD_SIZE_V3, ENTRY_RECORD_SIZE_V4, METADATA_HEADER_SIZE, MetadataHeader,
    MetadataRevision, encode_metadata_block,
};
pub use crate::error::{PathRelation, ValidationError, ValidationResult};
pub use crate::guid::{FileGuidSource, RandomFileGuidSource, to_efi_bytes};
pub use crate::rules::{METADATA_FILE_GUID, ValidationRules};
pub use crate::types::{
    BackupType, DiskType, FlashType, Operation, RawDevicePath, RawFirmwareEntry, UpdateType,
    ValidatedDevicePath, ValidatedFirmwareEntry,
};
pub use crate::validate::validate_entries;
