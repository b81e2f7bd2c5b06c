//! Schema rules: keyword tables, the disk-type/flash-type compatibility
//! table, fixed length limits, and the well-known provisioning file GUIDs.
//!
//! All of this is read-only configuration handed to the validator, so the
//! validation functions themselves stay pure.

use uuid::{Uuid, uuid};

use crate::types::{BackupType, DiskType, FlashType, Operation, UpdateType};

/// Maximum source characters in a partition name.
pub const PARTITION_NAME_MAX_CHARS: usize = 36;

/// Maximum source characters in a destination file name.
pub const FILE_NAME_MAX_CHARS: usize = 255;

/// Maximum source characters in a match identifier.
pub const MATCH_IDENTIFIER_MAX_CHARS: usize = 36;

/// Partition name reserved for the firmware version record. A foreign
/// update targeting it would collide with version storage.
pub const RESERVED_VERSION_PARTITION_NAME: &str = "SYSFW_VERSION";

/// File GUID of the metadata block itself, for the external volume builder.
pub const METADATA_FILE_GUID: Uuid = uuid!("C7340E65-0D5D-43D6-ABB7-39751D5EC8E7");

/// Well-known provisioning destination: OEM public key provision file.
pub const FILE_GUID_OPM_PUB_PROVISION: Uuid = uuid!("01620DA3-F273-4401-9821-1D0E5169D8DA");

/// Well-known provisioning destination: OEM private key provision file.
pub const FILE_GUID_OPM_PRIV_PROVISION: Uuid = uuid!("3998E865-A733-4812-97D7-4BC973EA3442");

/// Fixed table of well-known provisioning destination file names and their
/// assigned file GUIDs. Lookups are case-insensitive on the file name.
const PROVISIONING_FILE_GUIDS: &[(&str, Uuid)] = &[
    ("OPM_PUB.PROVISION", FILE_GUID_OPM_PUB_PROVISION),
    ("OPM_PRIV.PROVISION", FILE_GUID_OPM_PRIV_PROVISION),
];

/// Read-only rule set for entry validation.
#[derive(Debug, Clone)]
pub struct ValidationRules {
    /// Maximum source characters in a partition name.
    pub partition_name_max_chars: usize,
    /// Maximum source characters in a destination file name.
    pub file_name_max_chars: usize,
    /// Maximum source characters in a match identifier.
    pub match_identifier_max_chars: usize,
    /// Partition name reserved for the version record.
    pub reserved_partition_name: String,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            partition_name_max_chars: PARTITION_NAME_MAX_CHARS,
            file_name_max_chars: FILE_NAME_MAX_CHARS,
            match_identifier_max_chars: MATCH_IDENTIFIER_MAX_CHARS,
            reserved_partition_name: RESERVED_VERSION_PARTITION_NAME.to_string(),
        }
    }
}

impl ValidationRules {
    /// Translate an operation keyword. Case-insensitive.
    pub fn operation_from_keyword(&self, keyword: &str) -> Option<Operation> {
        match keyword.to_ascii_uppercase().as_str() {
            "IGNORE" => Some(Operation::Ignore),
            "UPDATE" => Some(Operation::Update),
            _ => None,
        }
    }

    /// Translate an update type keyword. Case-insensitive.
    pub fn update_type_from_keyword(&self, keyword: &str) -> Option<UpdateType> {
        match keyword.to_ascii_uppercase().as_str() {
            "UPDATE_PARTITION" => Some(UpdateType::Partition),
            "UPDATE_FAT_FILE" => Some(UpdateType::FatFile),
            "UPDATE_DPP_QCOM" => Some(UpdateType::DppQcom),
            "UPDATE_DPP_OEM" => Some(UpdateType::DppOem),
            "UPDATE_OPM_PRIV_KEY" => Some(UpdateType::OpmPrivKey),
            "UPDATE_FWCLASS_GUID" => Some(UpdateType::FwClassGuid),
            _ => None,
        }
    }

    /// Translate a backup type keyword. Case-insensitive.
    pub fn backup_type_from_keyword(&self, keyword: &str) -> Option<BackupType> {
        match keyword.to_ascii_uppercase().as_str() {
            "BACKUP_PARTITION" => Some(BackupType::Partition),
            "BACKUP_FAT_FILE" => Some(BackupType::FatFile),
            _ => None,
        }
    }

    /// Translate a disk type keyword. Case-insensitive.
    pub fn disk_type_from_keyword(&self, keyword: &str) -> Option<DiskType> {
        match keyword.to_ascii_uppercase().as_str() {
            "EMMC_PARTITION_USER_DATA" => Some(DiskType::UserData),
            "EMMC_PARTITION_BOOT1" => Some(DiskType::Boot1),
            "EMMC_PARTITION_BOOT2" => Some(DiskType::Boot2),
            "EMMC_PARTITION_RPMB" => Some(DiskType::Rpmb),
            "EMMC_PARTITION_GPP1" => Some(DiskType::Gpp1),
            "EMMC_PARTITION_GPP2" => Some(DiskType::Gpp2),
            "EMMC_PARTITION_GPP3" => Some(DiskType::Gpp3),
            "EMMC_PARTITION_GPP4" => Some(DiskType::Gpp4),
            "UFS_LUN0" => Some(DiskType::Lun0),
            "UFS_LUN1" => Some(DiskType::Lun1),
            "UFS_LUN2" => Some(DiskType::Lun2),
            "UFS_LUN3" => Some(DiskType::Lun3),
            "UFS_LUN4" => Some(DiskType::Lun4),
            "UFS_LUN5" => Some(DiskType::Lun5),
            "UFS_LUN6" => Some(DiskType::Lun6),
            "UFS_LUN7" => Some(DiskType::Lun7),
            "SPINOR" => Some(DiskType::Spinor),
            "NVME" => Some(DiskType::Nvme),
            _ => None,
        }
    }

    /// Translate a flash type keyword. Case-insensitive.
    pub fn flash_type_from_keyword(&self, keyword: &str) -> Option<FlashType> {
        match keyword.to_ascii_uppercase().as_str() {
            "EMMC" => Some(FlashType::Emmc),
            "UFS" => Some(FlashType::Ufs),
            "NORNVME" => Some(FlashType::NorNvme),
            "NORUFS" => Some(FlashType::NorUfs),
            _ => None,
        }
    }

    /// Flash types a disk type may appear on.
    pub fn compatible_flash_types(&self, disk_type: DiskType) -> &'static [FlashType] {
        match disk_type {
            DiskType::UserData
            | DiskType::Boot1
            | DiskType::Boot2
            | DiskType::Rpmb
            | DiskType::Gpp1
            | DiskType::Gpp2
            | DiskType::Gpp3
            | DiskType::Gpp4 => &[FlashType::Emmc],
            DiskType::Lun0 => &[FlashType::Ufs, FlashType::NorUfs],
            DiskType::Lun1
            | DiskType::Lun2
            | DiskType::Lun3
            | DiskType::Lun4
            | DiskType::Lun5
            | DiskType::Lun6
            | DiskType::Lun7 => &[FlashType::Ufs],
            DiskType::Spinor => &[FlashType::NorNvme, FlashType::NorUfs],
            DiskType::Nvme => &[FlashType::NorNvme],
        }
    }

    /// Whether a disk type is usable on a device with the given flash type.
    pub fn flash_supports(&self, disk_type: DiskType, flash_type: FlashType) -> bool {
        self.compatible_flash_types(disk_type).contains(&flash_type)
    }

    /// Fixed file GUID for a well-known provisioning destination file name,
    /// if there is one. Case-insensitive.
    pub fn provisioning_file_guid(&self, file_name: &str) -> Option<Uuid> {
        let upper = file_name.to_ascii_uppercase();
        PROVISIONING_FILE_GUIDS
            .iter()
            .find(|(name, _)| *name == upper)
            .map(|(_, guid)| *guid)
    }
}
