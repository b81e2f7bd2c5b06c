//! Property-based tests for the version record codec

use fwcapsule_version::{RECORD_SIZE, VersionRecord, VersionRecordError, crc32};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_encode_decode_round_trip(fw in any::<u32>(), lowest in any::<u32>()) {
        let record = VersionRecord::new(fw, lowest);
        let bytes = record.encode();
        prop_assert_eq!(bytes.len(), RECORD_SIZE);

        let decoded = VersionRecord::decode(&bytes)
            .map_err(|e| TestCaseError::fail(format!("decode failed: {e}")))?;
        prop_assert_eq!(decoded, record);
        prop_assert!(decoded.validate().is_ok());
        prop_assert_eq!(decoded.fw_version, fw);
        prop_assert_eq!(decoded.lowest_supported_fw_version, lowest);
    }

    #[test]
    fn prop_single_byte_tamper_is_detected(
        fw in any::<u32>(),
        lowest in any::<u32>(),
        offset in 0usize..RECORD_SIZE,
        flip in 1u8..=255,
    ) {
        let record = VersionRecord::new(fw, lowest);
        let mut bytes = record.encode();
        if let Some(byte) = bytes.get_mut(offset) {
            *byte ^= flip;
        }

        let tampered = VersionRecord::decode(&bytes)
            .map_err(|e| TestCaseError::fail(format!("decode failed: {e}")))?;
        let Err(err) = tampered.validate() else {
            return Err(TestCaseError::fail("tamper went undetected"));
        };

        // The failing check depends on which field the flipped byte landed in:
        // signature and revision fail their dedicated checks, everything else
        // (size, CRC field itself, versions) surfaces as a checksum mismatch.
        match offset {
            0..=7 => prop_assert!(
                matches!(err, VersionRecordError::BadSignature { .. }),
                "expected BadSignature, got {err:?}"
            ),
            8..=11 => prop_assert!(
                matches!(err, VersionRecordError::BadRevision { .. }),
                "expected BadRevision, got {err:?}"
            ),
            _ => prop_assert!(
                matches!(err, VersionRecordError::BadChecksum { .. }),
                "expected BadChecksum, got {err:?}"
            ),
        }
    }

    #[test]
    fn prop_crc_matches_recomputation(fw in any::<u32>(), lowest in any::<u32>()) {
        let record = VersionRecord::new(fw, lowest);
        let mut zeroed = record;
        zeroed.version_data_crc32 = 0;
        prop_assert_eq!(record.version_data_crc32, crc32(&zeroed.encode()));
    }
}
