//! Imported plugin records and per-record token selections.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single imported weapon record.
///
/// Records are owned by the import layer and read-only to the rest of the
/// pipeline. `key` is assigned at import and unique within a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Unique session key: `plugin|form_id|editor_id`.
    pub key: String,
    /// Plugin file the record comes from, e.g. `MyMod.esp`.
    pub plugin: String,
    /// Normalized form id within the plugin.
    pub form_id: String,
    pub editor_id: String,
    /// Display name; may be empty.
    #[serde(default)]
    pub name: String,
    /// Ammo form id, carried from the import format for display.
    #[serde(default)]
    pub ammo: String,
    /// Raw attribute codes used for classification.
    #[serde(default)]
    pub type_codes: Vec<String>,
}

impl Record {
    /// Name shown to users: the display name, or the editor id when unnamed.
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.editor_id
        } else {
            self.name.trim()
        }
    }
}

/// Per-record token selections, keyed by [`Record::key`].
///
/// A plain ordered map so the serialized form is stable across runs.
pub type SelectionMap = BTreeMap<String, Vec<String>>;
