//! Unit tests for entry validation

use fwcapsule_metadata::prelude::*;
use uuid::Uuid;

const PARTITION_GUID: &str = "11111111-2222-3333-4444-555555555555";

/// Deterministic GUID source so validated output is reproducible.
struct SequentialGuidSource(u128);

impl FileGuidSource for SequentialGuidSource {
    fn next_guid(&mut self) -> Uuid {
        self.0 = self.0.saturating_add(1);
        Uuid::from_u128(self.0)
    }
}

fn partition_path(disk: &str, name: &str) -> RawDevicePath {
    RawDevicePath {
        disk_type: Some(disk.to_string()),
        partition_name: Some(name.to_string()),
        partition_type_guid: Some(PARTITION_GUID.to_string()),
        file_name: None,
    }
}

fn partition_entry(name: &str, binary: &str) -> RawFirmwareEntry {
    RawFirmwareEntry {
        operation: Some("UPDATE".to_string()),
        update_type: Some("UPDATE_PARTITION".to_string()),
        input_binary: Some(binary.to_string()),
        update_path: partition_path("UFS_LUN4", name),
        backup_path: partition_path("UFS_LUN4", &format!("{name}_bak")),
        ..RawFirmwareEntry::default()
    }
}

fn provisioning_entry(file_name: &str) -> RawFirmwareEntry {
    RawFirmwareEntry {
        operation: Some("UPDATE".to_string()),
        update_type: Some("UPDATE_DPP_OEM".to_string()),
        input_binary: Some("dpp.bin".to_string()),
        update_path: RawDevicePath {
            file_name: Some(file_name.to_string()),
            ..RawDevicePath::default()
        },
        ..RawFirmwareEntry::default()
    }
}

fn run(
    entries: Vec<RawFirmwareEntry>,
) -> Result<Vec<ValidatedFirmwareEntry>, ValidationError> {
    run_on(FlashType::Ufs, MetadataRevision::V4, entries)
}

fn run_on(
    flash_type: FlashType,
    revision: MetadataRevision,
    entries: Vec<RawFirmwareEntry>,
) -> Result<Vec<ValidatedFirmwareEntry>, ValidationError> {
    let rules = ValidationRules::default();
    let mut source = SequentialGuidSource(0);
    validate_entries(&rules, flash_type, revision, entries, &mut source)
}

mod classification_tests {
    use super::*;

    #[test]
    fn test_ignore_entries_are_dropped() -> Result<(), ValidationError> {
        let mut ignored = partition_entry("abl_a", "abl.elf");
        ignored.operation = Some("IGNORE".to_string());
        let accepted = run(vec![ignored, partition_entry("xbl_a", "xbl.elf")])?;
        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].source_index, 1);
        Ok(())
    }

    #[test]
    fn test_missing_operation_treated_as_ignore() -> Result<(), ValidationError> {
        let mut entry = partition_entry("abl_a", "abl.elf");
        entry.operation = None;
        let accepted = run(vec![entry])?;
        assert!(accepted.is_empty());
        Ok(())
    }

    #[test]
    fn test_unknown_operation_keyword_rejected() {
        let mut entry = partition_entry("abl_a", "abl.elf");
        entry.operation = Some("DELETE".to_string());
        let result = run(vec![entry]);
        assert!(matches!(
            result,
            Err(ValidationError::UnrecognizedKeyword { entry_index: 0, .. })
        ));
    }

    #[test]
    fn test_missing_update_type_rejected() {
        let mut entry = partition_entry("abl_a", "abl.elf");
        entry.update_type = None;
        let result = run(vec![entry]);
        assert!(matches!(
            result,
            Err(ValidationError::MissingRequiredField {
                field: "UpdateType",
                ..
            })
        ));
    }

    #[test]
    fn test_fat_file_update_always_rejected() {
        let mut entry = partition_entry("abl_a", "abl.elf");
        entry.update_type = Some("UPDATE_FAT_FILE".to_string());
        let result = run(vec![entry]);
        assert!(matches!(
            result,
            Err(ValidationError::UnsupportedUpdateType {
                update_type: UpdateType::FatFile,
                ..
            })
        ));
    }

    #[test]
    fn test_fat_file_backup_rejected() {
        let mut entry = partition_entry("abl_a", "abl.elf");
        entry.backup_type = Some("BACKUP_FAT_FILE".to_string());
        let result = run(vec![entry]);
        assert!(matches!(
            result,
            Err(ValidationError::UnsupportedBackupType {
                backup_type: BackupType::FatFile,
                ..
            })
        ));
    }
}

mod field_presence_tests {
    use super::*;

    #[test]
    fn test_partition_entry_missing_name_rejected() {
        let mut entry = partition_entry("abl_a", "abl.elf");
        entry.update_path.partition_name = None;
        let result = run(vec![entry]);
        assert!(matches!(
            result,
            Err(ValidationError::MissingRequiredField {
                field: "UpdatePath.PartitionName",
                ..
            })
        ));
    }

    #[test]
    fn test_partition_entry_missing_backup_disk_rejected() {
        let mut entry = partition_entry("abl_a", "abl.elf");
        entry.backup_path.disk_type = None;
        let result = run(vec![entry]);
        assert!(matches!(
            result,
            Err(ValidationError::MissingRequiredField {
                field: "BackupPath.DiskType",
                ..
            })
        ));
    }

    #[test]
    fn test_missing_input_binary_rejected() {
        let mut entry = partition_entry("abl_a", "abl.elf");
        entry.input_binary = None;
        let result = run(vec![entry]);
        assert!(matches!(
            result,
            Err(ValidationError::MissingRequiredField {
                field: "InputBinary",
                ..
            })
        ));
    }

    #[test]
    fn test_provisioning_requires_dest_file_name() {
        let mut entry = provisioning_entry("oem.dpp");
        entry.update_path.file_name = None;
        let result = run(vec![entry]);
        assert!(matches!(
            result,
            Err(ValidationError::MissingRequiredField {
                field: "UpdatePath.FileName",
                ..
            })
        ));
    }

    #[test]
    fn test_provisioning_partial_backup_path_rejected() {
        let mut entry = provisioning_entry("oem.dpp");
        entry.backup_path.partition_name = Some("dpp_bak".to_string());
        let result = run(vec![entry]);
        assert!(matches!(
            result,
            Err(ValidationError::MissingRequiredField {
                field: "BackupPath.DiskType",
                ..
            })
        ));
    }

    #[test]
    fn test_fwclass_guid_with_empty_paths_accepted() -> Result<(), ValidationError> {
        let entry = RawFirmwareEntry {
            operation: Some("UPDATE".to_string()),
            update_type: Some("UPDATE_FWCLASS_GUID".to_string()),
            ..RawFirmwareEntry::default()
        };
        let accepted = run(vec![entry])?;
        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].update_type, UpdateType::FwClassGuid);
        Ok(())
    }

    #[test]
    fn test_fwclass_guid_with_populated_path_rejected() {
        let entry = RawFirmwareEntry {
            operation: Some("UPDATE".to_string()),
            update_type: Some("UPDATE_FWCLASS_GUID".to_string()),
            update_path: partition_path("UFS_LUN0", "xbl_a"),
            ..RawFirmwareEntry::default()
        };
        let result = run(vec![entry]);
        assert!(matches!(
            result,
            Err(ValidationError::UnexpectedField {
                field: "UpdatePath",
                ..
            })
        ));
    }

    #[test]
    fn test_fwclass_guid_with_backup_type_rejected() {
        let entry = RawFirmwareEntry {
            operation: Some("UPDATE".to_string()),
            update_type: Some("UPDATE_FWCLASS_GUID".to_string()),
            backup_type: Some("BACKUP_PARTITION".to_string()),
            ..RawFirmwareEntry::default()
        };
        let result = run(vec![entry]);
        assert!(matches!(
            result,
            Err(ValidationError::UnexpectedField {
                field: "BackupType",
                ..
            })
        ));
    }
}

mod value_check_tests {
    use super::*;

    #[test]
    fn test_reserved_partition_name_rejected() {
        let entry = partition_entry("SYSFW_VERSION", "sysfw.bin");
        let result = run(vec![entry]);
        assert!(matches!(
            result,
            Err(ValidationError::ReservedPartitionName { .. })
        ));
    }

    #[test]
    fn test_overlong_partition_name_rejected() {
        let long_name: String = "x".repeat(37);
        let entry = partition_entry(&long_name, "abl.elf");
        let result = run(vec![entry]);
        assert!(matches!(
            result,
            Err(ValidationError::FieldTooLong {
                field: "UpdatePath.PartitionName",
                len: 37,
                max: 36,
                ..
            })
        ));
    }

    #[test]
    fn test_malformed_partition_guid_rejected() {
        let mut entry = partition_entry("abl_a", "abl.elf");
        entry.update_path.partition_type_guid = Some("not-a-guid".to_string());
        let result = run(vec![entry]);
        assert!(matches!(result, Err(ValidationError::InvalidGuid { .. })));
    }

    #[test]
    fn test_braced_partition_guid_accepted() -> Result<(), ValidationError> {
        let mut entry = partition_entry("abl_a", "abl.elf");
        entry.update_path.partition_type_guid =
            Some(format!("{{{PARTITION_GUID}}}"));
        let accepted = run(vec![entry])?;
        assert_eq!(
            accepted[0].update_path.partition_type_guid,
            uuid::uuid!("11111111-2222-3333-4444-555555555555")
        );
        Ok(())
    }

    #[test]
    fn test_match_identifier_dropped_under_v3() -> Result<(), ValidationError> {
        let mut entry = partition_entry("abl_a", "abl.elf");
        entry.match_identifier = Some("variant-a".to_string());
        let accepted = run_on(FlashType::Ufs, MetadataRevision::V3, vec![entry])?;
        assert!(accepted[0].match_identifier.is_none());
        Ok(())
    }

    #[test]
    fn test_overlong_match_identifier_rejected() {
        let mut entry = partition_entry("abl_a", "abl.elf");
        entry.match_identifier = Some("m".repeat(37));
        let result = run(vec![entry]);
        assert!(matches!(
            result,
            Err(ValidationError::FieldTooLong {
                field: "MatchIdentifier",
                ..
            })
        ));
    }
}

mod guid_assignment_tests {
    use super::*;

    #[test]
    fn test_well_known_provisioning_guid_wins() -> Result<(), ValidationError> {
        let mut entry = provisioning_entry("OPM_PRIV.PROVISION");
        entry.update_type = Some("UPDATE_OPM_PRIV_KEY".to_string());
        let accepted = run(vec![entry])?;
        assert_eq!(
            accepted[0].file_guid,
            fwcapsule_metadata::rules::FILE_GUID_OPM_PRIV_PROVISION
        );
        Ok(())
    }

    #[test]
    fn test_preset_guid_kept() -> Result<(), ValidationError> {
        let preset = Uuid::from_u128(0xDEAD_BEEF);
        let mut entry = partition_entry("abl_a", "abl.elf");
        entry.file_guid = Some(preset);
        let accepted = run(vec![entry])?;
        assert_eq!(accepted[0].file_guid, preset);
        Ok(())
    }

    #[test]
    fn test_fresh_guids_come_from_source() -> Result<(), ValidationError> {
        let accepted = run(vec![
            partition_entry("abl_a", "abl.elf"),
            partition_entry("xbl_a", "xbl.elf"),
        ])?;
        assert_eq!(accepted[0].file_guid, Uuid::from_u128(1));
        assert_eq!(accepted[1].file_guid, Uuid::from_u128(2));
        Ok(())
    }
}

mod global_pass_tests {
    use super::*;

    #[test]
    fn test_emmc_disk_rejected_on_ufs_device() {
        let mut entry = partition_entry("abl_a", "abl.elf");
        entry.update_path.disk_type = Some("EMMC_PARTITION_BOOT1".to_string());
        let result = run(vec![entry]);
        assert!(matches!(
            result,
            Err(ValidationError::IncompatibleDiskType {
                disk_type: DiskType::Boot1,
                flash_type: FlashType::Ufs,
                ..
            })
        ));
    }

    #[test]
    fn test_lun0_accepted_on_norufs_device() -> Result<(), ValidationError> {
        let mut entry = partition_entry("xbl_a", "xbl.elf");
        entry.update_path.disk_type = Some("UFS_LUN0".to_string());
        entry.backup_path.disk_type = Some("UFS_LUN0".to_string());
        let accepted = run_on(FlashType::NorUfs, MetadataRevision::V4, vec![entry])?;
        assert_eq!(accepted.len(), 1);
        Ok(())
    }

    #[test]
    fn test_provisioning_skips_flash_pass() -> Result<(), ValidationError> {
        // Provisioning entries carry no meaningful disk types.
        let accepted = run_on(
            FlashType::NorNvme,
            MetadataRevision::V4,
            vec![provisioning_entry("oem.dpp")],
        )?;
        assert_eq!(accepted.len(), 1);
        Ok(())
    }

    #[test]
    fn test_duplicate_provisioning_names_rejected() {
        let result = run(vec![
            provisioning_entry("oem.dpp"),
            provisioning_entry("OEM.DPP"),
        ]);
        assert!(matches!(
            result,
            Err(ValidationError::DuplicateProvisioningItem {
                base_index: 0,
                target_index: 1,
                ..
            })
        ));
    }

    #[test]
    fn test_distinct_provisioning_subtypes_may_share_names() -> Result<(), ValidationError> {
        let qcom = RawFirmwareEntry {
            update_type: Some("UPDATE_DPP_QCOM".to_string()),
            ..provisioning_entry("shared.dpp")
        };
        let accepted = run(vec![qcom, provisioning_entry("shared.dpp")])?;
        assert_eq!(accepted.len(), 2);
        Ok(())
    }
}

mod path_exclusivity_tests {
    use super::*;

    fn with_match_id(mut entry: RawFirmwareEntry, id: &str) -> RawFirmwareEntry {
        entry.match_identifier = Some(id.to_string());
        entry
    }

    #[test]
    fn test_duplicate_update_paths_rejected() {
        let result = run(vec![
            partition_entry("abl_a", "abl.elf"),
            partition_entry("abl_a", "abl_other.elf"),
        ]);
        assert!(matches!(
            result,
            Err(ValidationError::DuplicatePartitionPath {
                base_index: 0,
                target_index: 1,
                relation: PathRelation::UpdateVsUpdate,
            })
        ));
    }

    #[test]
    fn test_match_identifiers_excuse_shared_path() -> Result<(), ValidationError> {
        let accepted = run(vec![
            with_match_id(partition_entry("abl_a", "abl_v1.elf"), "v1"),
            with_match_id(partition_entry("abl_a", "abl_v2.elf"), "v2"),
        ])?;
        assert_eq!(accepted.len(), 2);
        Ok(())
    }

    #[test]
    fn test_same_input_binary_defeats_match_identifiers() {
        let result = run(vec![
            with_match_id(partition_entry("abl_a", "abl.elf"), "v1"),
            with_match_id(partition_entry("abl_a", "abl.elf"), "v2"),
        ]);
        assert!(matches!(
            result,
            Err(ValidationError::DuplicateInputBinaryForSamePath { .. })
        ));
    }

    #[test]
    fn test_equal_match_identifiers_still_collide() {
        let result = run(vec![
            with_match_id(partition_entry("abl_a", "abl_v1.elf"), "v1"),
            with_match_id(partition_entry("abl_a", "abl_v2.elf"), "v1"),
        ]);
        assert!(matches!(
            result,
            Err(ValidationError::DuplicatePartitionPath { .. })
        ));
    }

    #[test]
    fn test_update_path_equal_to_own_backup_rejected() {
        let mut entry = partition_entry("abl_a", "abl.elf");
        entry.backup_path = entry.update_path.clone();
        let result = run(vec![entry]);
        assert!(matches!(
            result,
            Err(ValidationError::DuplicatePartitionPath {
                base_index: 0,
                target_index: 0,
                relation: PathRelation::SelfUpdateVsBackup,
            })
        ));
    }

    #[test]
    fn test_match_identifiers_do_not_excuse_cross_relation() {
        // Base update path colliding with target backup path is always an
        // error, identifiers or not.
        let base = with_match_id(partition_entry("abl_a", "abl_v1.elf"), "v1");
        let mut target = with_match_id(partition_entry("xbl_a", "xbl.elf"), "v2");
        target.backup_path = partition_path("UFS_LUN4", "abl_a");
        let result = run(vec![base, target]);
        assert!(matches!(
            result,
            Err(ValidationError::DuplicatePartitionPath {
                relation: PathRelation::UpdateVsBackup,
                ..
            })
        ));
    }

    #[test]
    fn test_identical_names_on_distinct_disks_accepted() -> Result<(), ValidationError> {
        let mut other = partition_entry("abl_a", "abl2.elf");
        other.update_path.disk_type = Some("UFS_LUN5".to_string());
        other.backup_path.disk_type = Some("UFS_LUN5".to_string());
        let accepted = run(vec![partition_entry("abl_a", "abl.elf"), other])?;
        assert_eq!(accepted.len(), 2);
        Ok(())
    }
}
