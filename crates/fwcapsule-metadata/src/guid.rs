//! File GUID assignment, the firmware-native GUID byte order, and
//! fixed-width UTF-16 text buffers.

use uuid::Uuid;

use crate::rules::ValidationRules;
use crate::types::UpdateType;

/// GUID bytes in the byte order the consuming firmware stores natively.
///
/// The transform is a fixed permutation of the canonical big-endian bytes:
/// the first four bytes are reversed, then the next two, then the following
/// two, and the trailing eight are unchanged. This is the mixed-endian GUID
/// layout (`Uuid::to_bytes_le`) and is applied to every GUID written into
/// the binary layout, including the metadata block's own file GUID.
pub fn to_efi_bytes(guid: Uuid) -> [u8; 16] {
    guid.to_bytes_le()
}

/// Source of freshly generated file GUIDs.
///
/// Identifier assignment is the one nondeterministic step in the pipeline;
/// injecting the source keeps validation deterministic under test.
pub trait FileGuidSource {
    /// Produce the next file GUID.
    fn next_guid(&mut self) -> Uuid;
}

/// Default source: random version-4 GUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomFileGuidSource;

impl FileGuidSource for RandomFileGuidSource {
    fn next_guid(&mut self) -> Uuid {
        Uuid::new_v4()
    }
}

/// Pick the file GUID for an entry.
///
/// Provisioning entries whose destination file name is in the well-known
/// table get the table's fixed GUID. Otherwise a pre-set GUID from the
/// source configuration wins, and failing that a fresh one is drawn from
/// `source`.
pub fn assign_file_guid(
    update_type: UpdateType,
    dest_file_name: &str,
    preset: Option<Uuid>,
    rules: &ValidationRules,
    source: &mut dyn FileGuidSource,
) -> Uuid {
    if update_type.is_provisioning() {
        if let Some(well_known) = rules.provisioning_file_guid(dest_file_name) {
            return well_known;
        }
    }
    match preset {
        Some(guid) => guid,
        None => source.next_guid(),
    }
}

/// A string did not fit its fixed-width buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextOverflow {
    /// UTF-16 code units the string encodes to.
    pub len: usize,
    /// Maximum the buffer holds.
    pub max: usize,
}

/// Encode `value` as UTF-16LE into a zero-padded buffer of
/// `2 * max_chars` bytes.
///
/// # Errors
///
/// [`TextOverflow`] if the string needs more than `max_chars` UTF-16 code
/// units.
pub fn encode_utf16_fixed(value: &str, max_chars: usize) -> Result<Vec<u8>, TextOverflow> {
    let len = utf16_len(value);
    if len > max_chars {
        return Err(TextOverflow {
            len,
            max: max_chars,
        });
    }

    let mut out = vec![0u8; max_chars.saturating_mul(2)];
    for (chunk, unit) in out.chunks_exact_mut(2).zip(value.encode_utf16()) {
        chunk.copy_from_slice(&unit.to_le_bytes());
    }
    Ok(out)
}

/// Number of UTF-16 code units `value` occupies in a fixed buffer.
pub fn utf16_len(value: &str) -> usize {
    value.encode_utf16().count()
}
