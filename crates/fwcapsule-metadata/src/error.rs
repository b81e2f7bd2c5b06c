//! Error types for entry validation and block encoding.
//!
//! Every error is terminal for the current batch: the pipeline surfaces the
//! first one with enough context (entry index, offending field) for the
//! caller to report and abort the larger build.

use thiserror::Error;

use fwcapsule_version::VersionRecordError;

use crate::types::{BackupType, DiskType, FlashType, UpdateType};

/// Which pair of device paths collided in the partition exclusivity pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathRelation {
    /// An entry's own update path vs its own backup path.
    SelfUpdateVsBackup,
    /// Base update path vs target update path.
    UpdateVsUpdate,
    /// Base update path vs target backup path.
    UpdateVsBackup,
    /// Base backup path vs target update path.
    BackupVsUpdate,
    /// Base backup path vs target backup path.
    BackupVsBackup,
}

impl std::fmt::Display for PathRelation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            PathRelation::SelfUpdateVsBackup => "update path vs own backup path",
            PathRelation::UpdateVsUpdate => "update path vs update path",
            PathRelation::UpdateVsBackup => "update path vs backup path",
            PathRelation::BackupVsUpdate => "backup path vs update path",
            PathRelation::BackupVsBackup => "backup path vs backup path",
        };
        f.write_str(text)
    }
}

/// Errors raised while validating a batch of firmware entries or encoding
/// the metadata block.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// An operation/type/disk-type token is not in the keyword tables.
    #[error("entry {entry_index}: {keyword:?} is not a recognized {field} keyword")]
    UnrecognizedKeyword {
        /// Index of the offending entry in the input list.
        entry_index: usize,
        /// Which field carried the keyword.
        field: &'static str,
        /// The unrecognized token.
        keyword: String,
    },

    /// A field the entry's schema requires is absent.
    #[error("entry {entry_index}: required field <{field}> is absent")]
    MissingRequiredField {
        /// Index of the offending entry.
        entry_index: usize,
        /// The absent field.
        field: &'static str,
    },

    /// A field the entry's update type forbids is present.
    #[error("entry {entry_index}: <{field}> is not supported for {update_type} entries")]
    UnexpectedField {
        /// Index of the offending entry.
        entry_index: usize,
        /// The forbidden field.
        field: &'static str,
        /// Update type whose schema forbids the field.
        update_type: UpdateType,
    },

    /// A name or identifier exceeds its fixed-width buffer.
    #[error("entry {entry_index}: more than {max} characters found in <{field}> ({len})")]
    FieldTooLong {
        /// Index of the offending entry.
        entry_index: usize,
        /// The oversized field.
        field: &'static str,
        /// Characters found.
        len: usize,
        /// Fixed maximum.
        max: usize,
    },

    /// The partition name reserved for the firmware version record was used.
    #[error(
        "entry {entry_index}: partition name {name:?} is reserved for the firmware version record"
    )]
    ReservedPartitionName {
        /// Index of the offending entry.
        entry_index: usize,
        /// The reserved name.
        name: String,
    },

    /// A partition type GUID string failed to parse.
    #[error("entry {entry_index}: <{field}> is not a valid GUID: {value:?}")]
    InvalidGuid {
        /// Index of the offending entry.
        entry_index: usize,
        /// Which field carried the GUID string.
        field: &'static str,
        /// The malformed value.
        value: String,
    },

    /// The entry's update type is never valid in the current schema.
    #[error("entry {entry_index}: update type {update_type} is not supported")]
    UnsupportedUpdateType {
        /// Index of the offending entry.
        entry_index: usize,
        /// The unsupported update type.
        update_type: UpdateType,
    },

    /// The entry's backup type is never valid in the current schema.
    #[error("entry {entry_index}: backup type {backup_type} is not supported")]
    UnsupportedBackupType {
        /// Index of the offending entry.
        entry_index: usize,
        /// The unsupported backup type.
        backup_type: BackupType,
    },

    /// A referenced disk type is not usable on the device's flash type.
    #[error("entry {entry_index}: disk type {disk_type} can't be used on a {flash_type} device")]
    IncompatibleDiskType {
        /// Index of the offending entry.
        entry_index: usize,
        /// The incompatible disk type.
        disk_type: DiskType,
        /// The device's flash type.
        flash_type: FlashType,
    },

    /// Two provisioning entries of the same sub-type target the same file.
    #[error(
        "entries {base_index} and {target_index}: duplicated {update_type} provisioning item {file_name:?}"
    )]
    DuplicateProvisioningItem {
        /// Index of the first entry.
        base_index: usize,
        /// Index of the second entry.
        target_index: usize,
        /// The shared provisioning sub-type.
        update_type: UpdateType,
        /// The duplicated destination file name.
        file_name: String,
    },

    /// Two partition entries (or one entry's two paths) target the same
    /// (disk type, partition type GUID, partition name) triple.
    #[error("entries {base_index} and {target_index}: same partition device path ({relation})")]
    DuplicatePartitionPath {
        /// Index of the first entry.
        base_index: usize,
        /// Index of the second entry (equal to `base_index` for the
        /// self-comparison relation).
        target_index: usize,
        /// Which pair of paths collided.
        relation: PathRelation,
    },

    /// Two match-identified entries share a device path but come from the
    /// same source input binary.
    #[error(
        "entries {base_index} and {target_index}: same partition path sourced from the same input binary {input_binary:?}"
    )]
    DuplicateInputBinaryForSamePath {
        /// Index of the first entry.
        base_index: usize,
        /// Index of the second entry.
        target_index: usize,
        /// The shared source binary.
        input_binary: String,
    },

    /// The version record's firmware version is below its lowest supported
    /// version.
    #[error(
        "firmware version 0x{fw_version:08X} is lower than the lowest supported version 0x{lowest_supported:08X}"
    )]
    VersionOrdering {
        /// Packed firmware version.
        fw_version: u32,
        /// Packed lowest supported version.
        lowest_supported: u32,
    },

    /// The supplied firmware version record failed validation.
    #[error(transparent)]
    VersionRecord(#[from] VersionRecordError),
}

/// Convenience result alias for validation and encoding operations.
pub type ValidationResult<T> = Result<T, ValidationError>;
