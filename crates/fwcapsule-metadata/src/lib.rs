//! Firmware update metadata block validation and encoding
//!
//! This crate turns an ordered list of raw firmware update entries plus a
//! firmware version record into the packed binary metadata block a device's
//! firmware-update agent consumes:
//! - Per-entry schema validation (keywords, field presence, length limits)
//! - Global exclusivity checks (flash compatibility, duplicate paths,
//!   duplicate provisioning items)
//! - File GUID assignment with well-known provisioning identifiers
//! - Byte-exact little-endian encoding of the header and entry records
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`builder`]: Pipeline facade from raw entries to the packed block
//! - [`validate`]: Per-entry and cross-entry validation
//! - [`encode`]: Binary layout of the header and entry records
//! - [`rules`]: Keyword tables, compatibility table, limits
//! - [`guid`]: File GUID assignment and the firmware-native byte order
//! - [`types`]: Raw and validated entry models
//! - [`error`]: Error types
//!
//! # Example
//!
//! ```ignore
//! use fwcapsule_metadata::prelude::*;
//! use fwcapsule_version::VersionRecord;
//!
//! let record = VersionRecord::new(0x0002_0000, 0x0001_0000);
//! let entries = vec![/* parsed from the source configuration */];
//!
//! let block = MetadataBlockBuilder::new(FlashType::Ufs, MetadataRevision::V4)
//!     .with_breaking_change_number(1)
//!     .build(&record, entries)?;
//! # Ok::<(), ValidationError>(())
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod builder;
pub mod encode;
pub mod error;
pub mod guid;
pub mod prelude;
pub mod rules;
pub mod types;
pub mod validate;

pub use builder::MetadataBlockBuilder;
pub use encode::{MetadataHeader, MetadataRevision};
pub use error::{ValidationError, ValidationResult};
pub use rules::ValidationRules;
pub use types::{FlashType, RawFirmwareEntry, ValidatedFirmwareEntry};
