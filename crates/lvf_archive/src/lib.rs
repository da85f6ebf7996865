//! Store-only ZIP container writer.
//!
//! Patch bundles are distributed as plain ZIP archives whose entries use
//! compression method 0 (store). Skipping compression keeps the byte layout
//! trivially reproducible and removes any dependency on a deflate
//! implementation, so the archive can be assembled from scratch: local file
//! headers, central directory, end record, with CRC-32 checksums computed by
//! the [`crc32`] module.
//!
//! # Example
//!
//! ```
//! use lvf_archive::StoreZipBuilder;
//!
//! let bytes = StoreZipBuilder::default()
//!     .with_file("patch/Mod.ini", "filterByLLs=Base.esm|1234\n")
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(&bytes[0..4], &[0x50, 0x4B, 0x03, 0x04]);
//! ```

pub mod crc32;
mod writer;

pub use crc32::crc32;
pub use writer::{ArchiveError, DosDateTime, Result, StoreZipBuilder};
