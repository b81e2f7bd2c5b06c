//! Pipeline facade: version record check, entry validation, block encoding.
//!
//! Any stage failure aborts the whole build; no partial output is ever
//! produced. The pipeline is synchronous and owns its inputs, so concurrent
//! builds over independent batches share nothing.

use tracing::info;

use fwcapsule_version::VersionRecord;

use crate::encode::{MetadataHeader, MetadataRevision, encode_metadata_block};
use crate::error::{ValidationError, ValidationResult};
use crate::guid::{FileGuidSource, RandomFileGuidSource};
use crate::rules::ValidationRules;
use crate::types::{FlashType, RawFirmwareEntry};
use crate::validate::validate_entries;

/// Builds the packed metadata block from raw entries and a validated
/// firmware version record.
pub struct MetadataBlockBuilder {
    flash_type: FlashType,
    revision: MetadataRevision,
    breaking_change_number: u32,
    rules: ValidationRules,
    guid_source: Box<dyn FileGuidSource>,
}

impl MetadataBlockBuilder {
    /// New builder for a device with the given flash type, targeting the
    /// given on-wire revision.
    pub fn new(flash_type: FlashType, revision: MetadataRevision) -> Self {
        Self {
            flash_type,
            revision,
            breaking_change_number: 0,
            rules: ValidationRules::default(),
            guid_source: Box::new(RandomFileGuidSource),
        }
    }

    /// Set the breaking-change number written into the header.
    #[must_use]
    pub fn with_breaking_change_number(mut self, number: u32) -> Self {
        self.breaking_change_number = number;
        self
    }

    /// Replace the default validation rules.
    #[must_use]
    pub fn with_rules(mut self, rules: ValidationRules) -> Self {
        self.rules = rules;
        self
    }

    /// Replace the file GUID source. Tests pin a deterministic source here.
    #[must_use]
    pub fn with_guid_source(mut self, source: Box<dyn FileGuidSource>) -> Self {
        self.guid_source = source;
        self
    }

    /// Validate the inputs and produce the packed metadata block.
    ///
    /// # Errors
    ///
    /// The first [`ValidationError`] from any stage: a bad version record,
    /// inverted version ordering, or a failed entry check.
    pub fn build(
        mut self,
        version_record: &VersionRecord,
        raw_entries: Vec<RawFirmwareEntry>,
    ) -> ValidationResult<Vec<u8>> {
        version_record.validate()?;
        if version_record.fw_version < version_record.lowest_supported_fw_version {
            return Err(ValidationError::VersionOrdering {
                fw_version: version_record.fw_version,
                lowest_supported: version_record.lowest_supported_fw_version,
            });
        }

        let entry_total = raw_entries.len();
        let entries = validate_entries(
            &self.rules,
            self.flash_type,
            self.revision,
            raw_entries,
            self.guid_source.as_mut(),
        )?;

        let header = MetadataHeader {
            revision: self.revision,
            firmware_version: version_record.fw_version,
            lowest_supported_version: version_record.lowest_supported_fw_version,
            breaking_change_number: self.breaking_change_number,
            entry_count: u32::try_from(entries.len()).unwrap_or(u32::MAX),
        };
        let block = encode_metadata_block(&header, &entries);
        info!(
            "metadata block built: {} of {entry_total} entries accepted, {} bytes",
            entries.len(),
            block.len()
        );
        Ok(block)
    }
}

impl std::fmt::Debug for MetadataBlockBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataBlockBuilder")
            .field("flash_type", &self.flash_type)
            .field("revision", &self.revision)
            .field("breaking_change_number", &self.breaking_change_number)
            .finish_non_exhaustive()
    }
}
