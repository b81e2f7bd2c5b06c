//! Data model for firmware update entries.
//!
//! [`RawFirmwareEntry`] is what the external configuration parser hands in:
//! free-form optional strings, any of which may be absent. The validator
//! turns it into a [`ValidatedFirmwareEntry`] with translated codes and
//! length-checked names, or rejects the whole batch.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One device location (update destination or backup) as parsed from the
/// source configuration. All fields are free-form and optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawDevicePath {
    /// Disk type keyword, e.g. `UFS_LUN4`.
    pub disk_type: Option<String>,
    /// GPT partition name.
    pub partition_name: Option<String>,
    /// Partition type GUID string, with or without braces.
    pub partition_type_guid: Option<String>,
    /// Destination file name (provisioning items).
    pub file_name: Option<String>,
}

impl RawDevicePath {
    /// True if no field of this path is populated.
    pub fn is_empty(&self) -> bool {
        self.disk_type.is_none()
            && self.partition_name.is_none()
            && self.partition_type_guid.is_none()
            && self.file_name.is_none()
    }
}

/// One firmware update item as parsed from the source configuration.
///
/// Created by the external parser, consumed once by the validator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFirmwareEntry {
    /// Pre-set file GUID, if the source configuration carries one.
    pub file_guid: Option<Uuid>,
    /// Source binary name.
    pub input_binary: Option<String>,
    /// Search directory for the source binary.
    pub input_path: Option<String>,
    /// Operation keyword (`IGNORE` / `UPDATE`).
    pub operation: Option<String>,
    /// Update type keyword, e.g. `UPDATE_PARTITION`.
    pub update_type: Option<String>,
    /// Backup type keyword, e.g. `BACKUP_PARTITION`.
    pub backup_type: Option<String>,
    /// Match identifier for conditional/variant updates (revision 4 only).
    pub match_identifier: Option<String>,
    /// Update destination.
    pub update_path: RawDevicePath,
    /// Backup destination.
    pub backup_path: RawDevicePath,
}

/// Entry operation code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum Operation {
    /// Entry is skipped entirely.
    Ignore = 0x0000_0000,
    /// Entry is applied by the update agent.
    Update = 0x0000_0001,
}

impl Operation {
    /// Wire code.
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Keyword used in the source configuration.
    pub const fn keyword(self) -> &'static str {
        match self {
            Operation::Ignore => "IGNORE",
            Operation::Update => "UPDATE",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Entry update type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum UpdateType {
    /// Whole-partition image update.
    Partition = 0x0000_0000,
    /// FAT file update. Parsed, but never valid in the current schema.
    FatFile = 0x0000_0001,
    /// Vendor provisioning item.
    DppQcom = 0x0000_0002,
    /// OEM provisioning item.
    DppOem = 0x0000_0003,
    /// OEM provisioning private key.
    OpmPrivKey = 0x0000_0004,
    /// Firmware class GUID marker entry; carries no device paths.
    FwClassGuid = 0x0000_0005,
}

impl UpdateType {
    /// Wire code.
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Keyword used in the source configuration.
    pub const fn keyword(self) -> &'static str {
        match self {
            UpdateType::Partition => "UPDATE_PARTITION",
            UpdateType::FatFile => "UPDATE_FAT_FILE",
            UpdateType::DppQcom => "UPDATE_DPP_QCOM",
            UpdateType::DppOem => "UPDATE_DPP_OEM",
            UpdateType::OpmPrivKey => "UPDATE_OPM_PRIV_KEY",
            UpdateType::FwClassGuid => "UPDATE_FWCLASS_GUID",
        }
    }

    /// True for the provisioning sub-types (DPP variants and the private
    /// key), which carry a payload file rather than a partition image.
    pub const fn is_provisioning(self) -> bool {
        matches!(
            self,
            UpdateType::DppQcom | UpdateType::DppOem | UpdateType::OpmPrivKey
        )
    }
}

impl std::fmt::Display for UpdateType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Entry backup type code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum BackupType {
    /// Backup to a partition. The default when no keyword is given.
    #[default]
    Partition = 0x0000_0000,
    /// Backup to a FAT file. Parsed, but never valid in the current schema.
    FatFile = 0x0000_0001,
}

impl BackupType {
    /// Wire code.
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Keyword used in the source configuration.
    pub const fn keyword(self) -> &'static str {
        match self {
            BackupType::Partition => "BACKUP_PARTITION",
            BackupType::FatFile => "BACKUP_FAT_FILE",
        }
    }
}

impl std::fmt::Display for BackupType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Enumerated physical/logical storage target for a device path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum DiskType {
    /// eMMC user data area. The default for an absent keyword.
    #[default]
    UserData = 0x0000_0000,
    /// eMMC boot partition 1.
    Boot1 = 0x0000_0001,
    /// eMMC boot partition 2.
    Boot2 = 0x0000_0002,
    /// eMMC RPMB partition.
    Rpmb = 0x0000_0003,
    /// eMMC general purpose partition 1.
    Gpp1 = 0x0000_0004,
    /// eMMC general purpose partition 2.
    Gpp2 = 0x0000_0005,
    /// eMMC general purpose partition 3.
    Gpp3 = 0x0000_0006,
    /// eMMC general purpose partition 4.
    Gpp4 = 0x0000_0007,
    /// UFS logical unit 0.
    Lun0 = 0x0000_0008,
    /// UFS logical unit 1.
    Lun1 = 0x0000_0009,
    /// UFS logical unit 2.
    Lun2 = 0x0000_000A,
    /// UFS logical unit 3.
    Lun3 = 0x0000_000B,
    /// UFS logical unit 4.
    Lun4 = 0x0000_000C,
    /// UFS logical unit 5.
    Lun5 = 0x0000_000D,
    /// UFS logical unit 6.
    Lun6 = 0x0000_000E,
    /// UFS logical unit 7.
    Lun7 = 0x0000_000F,
    /// SPI NOR flash region.
    Spinor = 0x0000_0010,
    /// NVMe namespace.
    Nvme = 0x0000_0011,
}

impl DiskType {
    /// Wire code.
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Keyword used in the source configuration.
    pub const fn keyword(self) -> &'static str {
        match self {
            DiskType::UserData => "EMMC_PARTITION_USER_DATA",
            DiskType::Boot1 => "EMMC_PARTITION_BOOT1",
            DiskType::Boot2 => "EMMC_PARTITION_BOOT2",
            DiskType::Rpmb => "EMMC_PARTITION_RPMB",
            DiskType::Gpp1 => "EMMC_PARTITION_GPP1",
            DiskType::Gpp2 => "EMMC_PARTITION_GPP2",
            DiskType::Gpp3 => "EMMC_PARTITION_GPP3",
            DiskType::Gpp4 => "EMMC_PARTITION_GPP4",
            DiskType::Lun0 => "UFS_LUN0",
            DiskType::Lun1 => "UFS_LUN1",
            DiskType::Lun2 => "UFS_LUN2",
            DiskType::Lun3 => "UFS_LUN3",
            DiskType::Lun4 => "UFS_LUN4",
            DiskType::Lun5 => "UFS_LUN5",
            DiskType::Lun6 => "UFS_LUN6",
            DiskType::Lun7 => "UFS_LUN7",
            DiskType::Spinor => "SPINOR",
            DiskType::Nvme => "NVME",
        }
    }
}

impl std::fmt::Display for DiskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Storage technology class of the target device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlashType {
    /// Embedded multi-media card.
    Emmc,
    /// Universal flash storage.
    Ufs,
    /// NOR flash alongside NVMe.
    NorNvme,
    /// NOR flash alongside UFS.
    NorUfs,
}

impl FlashType {
    /// Keyword used in the source configuration.
    pub const fn keyword(self) -> &'static str {
        match self {
            FlashType::Emmc => "EMMC",
            FlashType::Ufs => "UFS",
            FlashType::NorNvme => "NORNVME",
            FlashType::NorUfs => "NORUFS",
        }
    }
}

impl std::fmt::Display for FlashType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A validated device path with translated codes and length-checked names.
///
/// Absent fields keep their zero defaults, matching the all-zero path the
/// binary layout stores for them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidatedDevicePath {
    /// Translated disk type.
    pub disk_type: DiskType,
    /// Partition name, at most the configured maximum characters.
    pub partition_name: String,
    /// Partition type GUID; nil when absent.
    pub partition_type_guid: Uuid,
    /// Destination file name, at most the configured maximum characters.
    pub file_name: String,
}

impl ValidatedDevicePath {
    /// The (disk type, partition type GUID, partition name) triple used by
    /// the partition path exclusivity pass.
    pub fn partition_triple(&self) -> (DiskType, Uuid, &str) {
        (self.disk_type, self.partition_type_guid, &self.partition_name)
    }
}

/// A fully validated firmware entry, ready for encoding.
///
/// Immutable once constructed; the encoder derives the fixed-width binary
/// buffers from these already-checked values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedFirmwareEntry {
    /// Index of the originating raw entry in the input list. Used for error
    /// context and deterministic pass ordering; not encoded.
    pub source_index: usize,
    /// Assigned 16-byte file GUID.
    pub file_guid: Uuid,
    /// Operation code. Always [`Operation::Update`]; ignore entries are
    /// dropped before construction.
    pub operation: Operation,
    /// Update type code.
    pub update_type: UpdateType,
    /// Backup type code.
    pub backup_type: BackupType,
    /// Update destination.
    pub update_path: ValidatedDevicePath,
    /// Backup destination.
    pub backup_path: ValidatedDevicePath,
    /// Match identifier; only carried under the revision 4 layout.
    pub match_identifier: Option<String>,
    /// Source input binary name. Used by the duplicate-path pass; not
    /// encoded.
    pub input_binary: String,
}

impl ValidatedFirmwareEntry {
    /// Non-empty match identifier, if one is carried.
    pub fn effective_match_identifier(&self) -> Option<&str> {
        self.match_identifier.as_deref().filter(|id| !id.is_empty())
    }
}
