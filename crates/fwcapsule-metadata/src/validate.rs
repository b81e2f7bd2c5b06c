//! Entry validation: per-entry schema checks followed by global cross-entry
//! exclusivity passes.
//!
//! Validation is fail-fast and runs in input order: the first failing check
//! anywhere aborts the whole batch. The global passes are O(n^2) pairwise
//! scans; batches are tens of entries, and keeping the scans naive keeps the
//! error ordering deterministic.

use tracing::{debug, warn};
use uuid::Uuid;

use crate::encode::MetadataRevision;
use crate::error::{PathRelation, ValidationError, ValidationResult};
use crate::guid::{FileGuidSource, assign_file_guid, utf16_len};
use crate::rules::ValidationRules;
use crate::types::{
    BackupType, FlashType, Operation, RawDevicePath, RawFirmwareEntry, UpdateType,
    ValidatedDevicePath, ValidatedFirmwareEntry,
};

/// Validate a batch of raw entries for a device with the given flash type.
///
/// Ignore entries are dropped; the returned list holds only the entries the
/// update agent will act on, in input order, ready for encoding.
///
/// # Errors
///
/// The first [`ValidationError`] encountered, with the source entry index
/// attached.
pub fn validate_entries(
    rules: &ValidationRules,
    flash_type: FlashType,
    revision: MetadataRevision,
    raw_entries: Vec<RawFirmwareEntry>,
    guid_source: &mut dyn FileGuidSource,
) -> ValidationResult<Vec<ValidatedFirmwareEntry>> {
    let mut accepted = Vec::with_capacity(raw_entries.len());
    for (index, raw) in raw_entries.into_iter().enumerate() {
        if let Some(entry) = validate_entry(rules, index, revision, raw, guid_source)? {
            accepted.push(entry);
        }
    }
    debug!(
        "per-entry validation accepted {} update entries",
        accepted.len()
    );

    check_flash_exclusivity(rules, flash_type, &accepted)?;
    check_provisioning_exclusivity(&accepted)?;
    check_partition_path_exclusivity(&accepted)?;
    check_fat_rejected(&accepted)?;
    debug!("global validation passes complete");

    Ok(accepted)
}

/// Validate one raw entry. Returns `None` for ignore entries.
fn validate_entry(
    rules: &ValidationRules,
    index: usize,
    revision: MetadataRevision,
    raw: RawFirmwareEntry,
    guid_source: &mut dyn FileGuidSource,
) -> ValidationResult<Option<ValidatedFirmwareEntry>> {
    let operation = match raw.operation.as_deref() {
        Some(keyword) => rules.operation_from_keyword(keyword).ok_or_else(|| {
            ValidationError::UnrecognizedKeyword {
                entry_index: index,
                field: "Operation",
                keyword: keyword.to_string(),
            }
        })?,
        None => {
            warn!("entry {index}: no operation given, treating as {}", Operation::Ignore);
            Operation::Ignore
        }
    };
    if operation == Operation::Ignore {
        debug!("entry {index}: ignored, skipping");
        return Ok(None);
    }

    let update_type = translate_update_type(rules, index, raw.update_type.as_deref())?;
    let backup_type = translate_backup_type(rules, index, update_type, raw.backup_type.as_deref())?;

    let input_binary = non_empty(raw.input_binary.as_deref());
    if update_type != UpdateType::FwClassGuid && input_binary.is_none() {
        return Err(ValidationError::MissingRequiredField {
            entry_index: index,
            field: "InputBinary",
        });
    }

    check_field_presence(index, update_type, backup_type, &raw)?;

    let update_path = validate_path(rules, index, &UPDATE_PATH_FIELDS, &raw.update_path)?;
    let backup_path = validate_path(rules, index, &BACKUP_PATH_FIELDS, &raw.backup_path)?;

    let match_identifier = validate_match_identifier(
        rules,
        index,
        revision,
        raw.match_identifier.as_deref(),
    )?;

    let file_guid = assign_file_guid(
        update_type,
        &update_path.file_name,
        raw.file_guid,
        rules,
        guid_source,
    );

    Ok(Some(ValidatedFirmwareEntry {
        source_index: index,
        file_guid,
        operation,
        update_type,
        backup_type,
        update_path,
        backup_path,
        match_identifier,
        input_binary: input_binary.unwrap_or_default().to_string(),
    }))
}

fn translate_update_type(
    rules: &ValidationRules,
    index: usize,
    keyword: Option<&str>,
) -> ValidationResult<UpdateType> {
    let Some(keyword) = keyword else {
        return Err(ValidationError::MissingRequiredField {
            entry_index: index,
            field: "UpdateType",
        });
    };
    let update_type = rules.update_type_from_keyword(keyword).ok_or_else(|| {
        ValidationError::UnrecognizedKeyword {
            entry_index: index,
            field: "UpdateType",
            keyword: keyword.to_string(),
        }
    })?;
    // Parsed so the error can name the type, but never valid.
    if update_type == UpdateType::FatFile {
        return Err(ValidationError::UnsupportedUpdateType {
            entry_index: index,
            update_type,
        });
    }
    Ok(update_type)
}

fn translate_backup_type(
    rules: &ValidationRules,
    index: usize,
    update_type: UpdateType,
    keyword: Option<&str>,
) -> ValidationResult<BackupType> {
    let Some(keyword) = keyword else {
        return Ok(BackupType::default());
    };
    if update_type == UpdateType::FwClassGuid {
        return Err(ValidationError::UnexpectedField {
            entry_index: index,
            field: "BackupType",
            update_type,
        });
    }
    let backup_type = rules.backup_type_from_keyword(keyword).ok_or_else(|| {
        ValidationError::UnrecognizedKeyword {
            entry_index: index,
            field: "BackupType",
            keyword: keyword.to_string(),
        }
    })?;
    if backup_type == BackupType::FatFile {
        return Err(ValidationError::UnsupportedBackupType {
            entry_index: index,
            backup_type,
        });
    }
    Ok(backup_type)
}

/// Field-presence rules keyed by update type.
fn check_field_presence(
    index: usize,
    update_type: UpdateType,
    backup_type: BackupType,
    raw: &RawFirmwareEntry,
) -> ValidationResult<()> {
    match update_type {
        UpdateType::Partition => {
            require_partition_path(index, &UPDATE_PATH_FIELDS, &raw.update_path)?;
            if backup_type == BackupType::Partition {
                require_partition_path(index, &BACKUP_PATH_FIELDS, &raw.backup_path)?;
            }
        }
        UpdateType::DppQcom | UpdateType::DppOem | UpdateType::OpmPrivKey => {
            if non_empty(raw.update_path.file_name.as_deref()).is_none() {
                return Err(ValidationError::MissingRequiredField {
                    entry_index: index,
                    field: "UpdatePath.FileName",
                });
            }
            // A backup location is optional, but half a path is not.
            if !raw.backup_path.is_empty() {
                require_partition_path(index, &BACKUP_PATH_FIELDS, &raw.backup_path)?;
            }
        }
        UpdateType::FwClassGuid => {
            if !raw.update_path.is_empty() {
                return Err(ValidationError::UnexpectedField {
                    entry_index: index,
                    field: "UpdatePath",
                    update_type,
                });
            }
            if !raw.backup_path.is_empty() {
                return Err(ValidationError::UnexpectedField {
                    entry_index: index,
                    field: "BackupPath",
                    update_type,
                });
            }
        }
        // Rejected during translation.
        UpdateType::FatFile => {
            return Err(ValidationError::UnsupportedUpdateType {
                entry_index: index,
                update_type,
            });
        }
    }
    Ok(())
}

/// Error-context field names for one device path.
struct PathFields {
    disk_type: &'static str,
    partition_name: &'static str,
    partition_type_guid: &'static str,
    file_name: &'static str,
}

const UPDATE_PATH_FIELDS: PathFields = PathFields {
    disk_type: "UpdatePath.DiskType",
    partition_name: "UpdatePath.PartitionName",
    partition_type_guid: "UpdatePath.PartitionTypeGuid",
    file_name: "UpdatePath.FileName",
};

const BACKUP_PATH_FIELDS: PathFields = PathFields {
    disk_type: "BackupPath.DiskType",
    partition_name: "BackupPath.PartitionName",
    partition_type_guid: "BackupPath.PartitionTypeGuid",
    file_name: "BackupPath.FileName",
};

fn require_partition_path(
    index: usize,
    fields: &PathFields,
    path: &RawDevicePath,
) -> ValidationResult<()> {
    let required = [
        (fields.disk_type, path.disk_type.as_deref()),
        (fields.partition_name, path.partition_name.as_deref()),
        (fields.partition_type_guid, path.partition_type_guid.as_deref()),
    ];
    for (field, value) in required {
        if non_empty(value).is_none() {
            return Err(ValidationError::MissingRequiredField {
                entry_index: index,
                field,
            });
        }
    }
    Ok(())
}

/// Translate and length-check one device path.
fn validate_path(
    rules: &ValidationRules,
    index: usize,
    fields: &PathFields,
    raw: &RawDevicePath,
) -> ValidationResult<ValidatedDevicePath> {
    let disk_type = match non_empty(raw.disk_type.as_deref()) {
        Some(keyword) => rules.disk_type_from_keyword(keyword).ok_or_else(|| {
            ValidationError::UnrecognizedKeyword {
                entry_index: index,
                field: fields.disk_type,
                keyword: keyword.to_string(),
            }
        })?,
        None => Default::default(),
    };

    let partition_name = non_empty(raw.partition_name.as_deref()).unwrap_or_default();
    let name_len = utf16_len(partition_name);
    if name_len > rules.partition_name_max_chars {
        return Err(ValidationError::FieldTooLong {
            entry_index: index,
            field: fields.partition_name,
            len: name_len,
            max: rules.partition_name_max_chars,
        });
    }
    if partition_name == rules.reserved_partition_name {
        return Err(ValidationError::ReservedPartitionName {
            entry_index: index,
            name: partition_name.to_string(),
        });
    }

    let partition_type_guid = match non_empty(raw.partition_type_guid.as_deref()) {
        Some(text) => parse_guid(index, fields.partition_type_guid, text)?,
        None => Uuid::nil(),
    };

    let file_name = non_empty(raw.file_name.as_deref()).unwrap_or_default();
    let file_len = utf16_len(file_name);
    if file_len > rules.file_name_max_chars {
        return Err(ValidationError::FieldTooLong {
            entry_index: index,
            field: fields.file_name,
            len: file_len,
            max: rules.file_name_max_chars,
        });
    }

    Ok(ValidatedDevicePath {
        disk_type,
        partition_name: partition_name.to_string(),
        partition_type_guid,
        file_name: file_name.to_string(),
    })
}

fn parse_guid(index: usize, field: &'static str, text: &str) -> ValidationResult<Uuid> {
    let trimmed = text
        .trim()
        .trim_start_matches('{')
        .trim_end_matches('}');
    Uuid::parse_str(trimmed).map_err(|_| ValidationError::InvalidGuid {
        entry_index: index,
        field,
        value: text.to_string(),
    })
}

fn validate_match_identifier(
    rules: &ValidationRules,
    index: usize,
    revision: MetadataRevision,
    identifier: Option<&str>,
) -> ValidationResult<Option<String>> {
    let Some(identifier) = non_empty(identifier) else {
        return Ok(None);
    };
    if !revision.carries_match_identifier() {
        warn!(
            "entry {index}: match identifier {identifier:?} dropped, not carried by the {revision} layout"
        );
        return Ok(None);
    }
    let len = utf16_len(identifier);
    if len > rules.match_identifier_max_chars {
        return Err(ValidationError::FieldTooLong {
            entry_index: index,
            field: "MatchIdentifier",
            len,
            max: rules.match_identifier_max_chars,
        });
    }
    Ok(Some(identifier.to_string()))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}

/// Global pass 1: every disk type a partition entry references must be
/// usable on the device's flash type. Provisioning and firmware-class
/// entries carry no meaningful disk types and are skipped.
fn check_flash_exclusivity(
    rules: &ValidationRules,
    flash_type: FlashType,
    entries: &[ValidatedFirmwareEntry],
) -> ValidationResult<()> {
    for entry in entries {
        if entry.update_type != UpdateType::Partition {
            continue;
        }
        for path in [&entry.update_path, &entry.backup_path] {
            if !rules.flash_supports(path.disk_type, flash_type) {
                return Err(ValidationError::IncompatibleDiskType {
                    entry_index: entry.source_index,
                    disk_type: path.disk_type,
                    flash_type,
                });
            }
        }
    }
    Ok(())
}

/// Global pass 2: destination file names must be pairwise distinct within
/// each provisioning sub-type.
fn check_provisioning_exclusivity(entries: &[ValidatedFirmwareEntry]) -> ValidationResult<()> {
    for (position, base) in entries.iter().enumerate() {
        if !base.update_type.is_provisioning() {
            continue;
        }
        for target in entries.iter().skip(position.saturating_add(1)) {
            if target.update_type != base.update_type {
                continue;
            }
            if base
                .update_path
                .file_name
                .eq_ignore_ascii_case(&target.update_path.file_name)
            {
                return Err(ValidationError::DuplicateProvisioningItem {
                    base_index: base.source_index,
                    target_index: target.source_index,
                    update_type: base.update_type,
                    file_name: base.update_path.file_name.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Global pass 3: no two partition device paths may collide.
///
/// The (disk type, partition type GUID, partition name) triples are compared
/// across five relations: an entry's own update path vs its own backup path,
/// then all four update/backup combinations for every unordered pair of
/// entries. Collisions on the update-vs-update and backup-vs-backup
/// relations are excused when both entries carry distinct non-empty match
/// identifiers and come from distinct input binaries.
fn check_partition_path_exclusivity(entries: &[ValidatedFirmwareEntry]) -> ValidationResult<()> {
    let partitions: Vec<&ValidatedFirmwareEntry> = entries
        .iter()
        .filter(|entry| entry.update_type == UpdateType::Partition)
        .collect();

    for (position, base) in partitions.iter().enumerate() {
        if base.update_path.partition_triple() == base.backup_path.partition_triple() {
            return Err(ValidationError::DuplicatePartitionPath {
                base_index: base.source_index,
                target_index: base.source_index,
                relation: PathRelation::SelfUpdateVsBackup,
            });
        }
        for target in partitions.iter().skip(position.saturating_add(1)) {
            check_path_pair(base, target, PathRelation::UpdateVsUpdate)?;
            check_path_pair(base, target, PathRelation::UpdateVsBackup)?;
            check_path_pair(base, target, PathRelation::BackupVsUpdate)?;
            check_path_pair(base, target, PathRelation::BackupVsBackup)?;
        }
    }
    Ok(())
}

fn check_path_pair(
    base: &ValidatedFirmwareEntry,
    target: &ValidatedFirmwareEntry,
    relation: PathRelation,
) -> ValidationResult<()> {
    let (base_path, target_path) = match relation {
        PathRelation::SelfUpdateVsBackup | PathRelation::UpdateVsUpdate => {
            (&base.update_path, &target.update_path)
        }
        PathRelation::UpdateVsBackup => (&base.update_path, &target.backup_path),
        PathRelation::BackupVsUpdate => (&base.backup_path, &target.update_path),
        PathRelation::BackupVsBackup => (&base.backup_path, &target.backup_path),
    };
    if base_path.partition_triple() != target_path.partition_triple() {
        return Ok(());
    }

    // Distinct match identifiers legitimize a shared path, but only on the
    // like-for-like relations, and only across distinct input binaries.
    let excusable = matches!(
        relation,
        PathRelation::UpdateVsUpdate | PathRelation::BackupVsBackup
    );
    if excusable {
        if let (Some(base_id), Some(target_id)) = (
            base.effective_match_identifier(),
            target.effective_match_identifier(),
        ) {
            if base_id != target_id {
                if base.input_binary == target.input_binary {
                    return Err(ValidationError::DuplicateInputBinaryForSamePath {
                        base_index: base.source_index,
                        target_index: target.source_index,
                        input_binary: base.input_binary.clone(),
                    });
                }
                return Ok(());
            }
        }
    }

    Err(ValidationError::DuplicatePartitionPath {
        base_index: base.source_index,
        target_index: target.source_index,
        relation,
    })
}

/// Global pass 4: belt on top of the per-entry check. A FAT-file entry can
/// never reach the accepted list, but the schema says the type is invalid,
/// so the accepted list is scanned too.
fn check_fat_rejected(entries: &[ValidatedFirmwareEntry]) -> ValidationResult<()> {
    for entry in entries {
        if entry.update_type == UpdateType::FatFile {
            return Err(ValidationError::UnsupportedUpdateType {
                entry_index: entry.source_index,
                update_type: entry.update_type,
            });
        }
    }
    Ok(())
}
