//! Record import and patch directive building.
//!
//! The pipeline owned by this crate sits between the rule engine and the
//! archive writer: imported records plus a per-record token selection go in,
//! grouped directive files come out.
//!
//! - [`import`] parses the line-oriented record export format into
//!   [`Record`]s.
//! - [`PatchSetBuilder`] expands each record's selection through a compiled
//!   [`lvf_rules::RuleSet`] and renders one directive line per surviving
//!   entry, grouped into per-record or per-plugin output files.
//! - [`ExportBatch`] carries the resulting `(path, content)` pairs together
//!   with a count of entries that could not be expressed in the directive
//!   format.

pub mod builder;
pub mod import;
pub mod record;
pub mod sanitize;

pub use builder::{derive_source_name, ExportBatch, ExportEntry, GroupMode, PatchSetBuilder};
pub use import::parse_records;
pub use record::{Record, SelectionMap};
