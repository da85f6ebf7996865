//! Directive rendering and output-file grouping.

use std::collections::HashSet;

use itertools::Itertools;

use lvf_rules::{ListEntry, RuleSet};

use crate::record::{Record, SelectionMap};
use crate::sanitize::{plugin_stem, sanitize_file_token, sanitize_path_segment};

/// Default directory the patch loader scans for leveled-list directives.
pub const DEFAULT_BASE_DIR: &str = "data/F4SE/Plugins/RobCo_Patcher/LeveledList/LvliForge";

/// How directive lines are grouped into output files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupMode {
    /// One file per record, in its own subdirectory.
    #[default]
    PerRecord,
    /// One file per plugin, plugins in case-insensitive name order.
    PerPlugin,
}

/// One generated output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportEntry {
    pub path: String,
    pub content: String,
}

/// The result of one export action.
///
/// `skipped_entries` counts expanded entries that could not be rendered
/// because the directive format cannot express them (no master file, or
/// neither form id nor editor id). An empty batch is the "nothing to export"
/// condition; callers should report it instead of archiving nothing.
#[derive(Debug, Clone, Default)]
pub struct ExportBatch {
    pub entries: Vec<ExportEntry>,
    pub skipped_entries: usize,
}

impl ExportBatch {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Builds directive files from records and their token selections.
#[derive(Debug)]
pub struct PatchSetBuilder<'a> {
    rules: &'a RuleSet,
    base_dir: String,
    group_mode: GroupMode,
}

impl<'a> PatchSetBuilder<'a> {
    pub fn new(rules: &'a RuleSet) -> Self {
        Self {
            rules,
            base_dir: DEFAULT_BASE_DIR.to_string(),
            group_mode: GroupMode::default(),
        }
    }

    /// Override the directory prefix of every output path.
    pub fn with_base_dir(mut self, base_dir: impl Into<String>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    pub fn with_group_mode(mut self, group_mode: GroupMode) -> Self {
        self.group_mode = group_mode;
        self
    }

    /// Build the export batch for `records` under `selections`.
    ///
    /// Records without a selection, and records whose selection expands to no
    /// renderable directive, contribute no output file. Records keep their
    /// input order; in per-plugin mode files are emitted in case-insensitive
    /// plugin order.
    pub fn build(&self, records: &[Record], selections: &SelectionMap) -> ExportBatch {
        let mut skipped = 0usize;
        let rendered: Vec<(&Record, String)> = records
            .iter()
            .filter_map(|record| {
                let tokens = selections.get(&record.key)?;
                if tokens.is_empty() {
                    return None;
                }
                let content = self.render_record(record, tokens, &mut skipped);
                if content.is_empty() {
                    return None;
                }
                Some((record, content))
            })
            .collect();

        let entries = match self.group_mode {
            GroupMode::PerRecord => self.group_per_record(&rendered),
            GroupMode::PerPlugin => self.group_per_plugin(&rendered),
        };

        if skipped > 0 {
            tracing::debug!(skipped, "entries dropped for missing identity fields");
        }
        ExportBatch {
            entries,
            skipped_entries: skipped,
        }
    }

    /// Render every directive line for one record.
    fn render_record(&self, record: &Record, tokens: &[String], skipped: &mut usize) -> String {
        let plugin_file = sanitize_path_segment(&record.plugin);

        let mut out = String::new();
        for entry in self.rules.expand(tokens) {
            let Some((master, value)) = directive_target(&entry) else {
                *skipped += 1;
                continue;
            };
            out.push_str(&format!(
                "filterByLLs={master}|{value}:addToLLs={plugin_file}|{form_id}~1~1~0\n",
                form_id = record.form_id,
            ));
        }
        out
    }

    fn group_per_record(&self, rendered: &[(&Record, String)]) -> Vec<ExportEntry> {
        rendered
            .iter()
            .map(|(record, content)| {
                let plugin_file = sanitize_path_segment(&record.plugin);
                let dir_name =
                    sanitize_path_segment(&format!("{}+{}", record.plugin, record.editor_id));
                ExportEntry {
                    path: format!("{}/{}/{}.ini", self.base_dir, dir_name, plugin_file),
                    content: content.clone(),
                }
            })
            .collect()
    }

    fn group_per_plugin(&self, rendered: &[(&Record, String)]) -> Vec<ExportEntry> {
        let plugins: Vec<&str> = rendered
            .iter()
            .map(|(record, _)| record.plugin.as_str())
            .unique()
            .sorted_by_key(|plugin| plugin.to_lowercase())
            .collect();

        plugins
            .into_iter()
            .map(|plugin| {
                let content: String = rendered
                    .iter()
                    .filter(|(record, _)| record.plugin == plugin)
                    .map(|(_, content)| content.as_str())
                    .collect();
                let file_name = sanitize_file_token(plugin_stem(plugin), "output");
                ExportEntry {
                    path: format!("{}/{}.ini", self.base_dir, file_name),
                    content,
                }
            })
            .collect()
    }
}

/// The `(master, value)` pair a directive filters by.
///
/// The value side prefers the form id and falls back to the editor id,
/// uppercased either way. Entries without a master file or without a value
/// cannot be expressed and yield `None`.
fn directive_target(entry: &ListEntry) -> Option<(String, String)> {
    let master = entry.master.trim();
    if master.is_empty() {
        return None;
    }
    let value = if entry.form_id.is_empty() {
        entry.editor_id.to_uppercase()
    } else {
        entry.form_id.to_uppercase()
    };
    if value.is_empty() {
        return None;
    }
    Some((master.to_string(), value))
}

/// Derive the export source name: the records' single common plugin (with its
/// extension stripped) when there is one, else the fallback (typically the
/// records file stem), else `"output"`.
pub fn derive_source_name(records: &[Record], fallback: &str) -> String {
    let plugins: HashSet<&str> = records
        .iter()
        .map(|record| record.plugin.as_str())
        .filter(|plugin| !plugin.is_empty())
        .collect();

    if plugins.len() == 1 {
        let plugin = plugins.into_iter().next().unwrap();
        return plugin_stem(plugin).to_string();
    }

    let fallback = fallback.trim();
    if fallback.is_empty() {
        "output".to_string()
    } else {
        fallback.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use lvf_rules::RulesConfig;

    fn fixture() -> RuleSet {
        let config = RulesConfig::from_json_str(include_str!(
            "../../lvf_rules/test-data/rules.config.json"
        ))
        .unwrap();
        RuleSet::compile(config).unwrap()
    }

    fn record(plugin: &str, form_id: &str, editor_id: &str) -> Record {
        Record {
            key: format!("{plugin}|{form_id}|{editor_id}"),
            plugin: plugin.to_string(),
            form_id: form_id.to_string(),
            editor_id: editor_id.to_string(),
            name: String::new(),
            ammo: String::new(),
            type_codes: Vec::new(),
        }
    }

    fn select(entries: &[(&Record, &[&str])]) -> SelectionMap {
        entries
            .iter()
            .map(|(record, tokens)| {
                (
                    record.key.clone(),
                    tokens.iter().map(|t| t.to_string()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn renders_one_directive_per_surviving_entry() {
        let rules = fixture();
        let rec = record("Mod.esp", "0012AB", "ArmorFoo");
        let selections = select(&[(&rec, &["DIST_PISTOL"])]);

        let batch = PatchSetBuilder::new(&rules).build(&[rec.clone()], &selections);
        assert_eq!(batch.entries.len(), 1);
        assert_eq!(batch.skipped_entries, 0);
        assert_eq!(
            batch.entries[0].content,
            "filterByLLs=Base.esm|12B001:addToLLs=Mod.esp|0012AB~1~1~0\n"
        );
        assert_eq!(
            batch.entries[0].path,
            format!("{DEFAULT_BASE_DIR}/Mod.esp+ArmorFoo/Mod.esp.ini")
        );
    }

    #[test]
    fn directive_target_pairs() {
        let full = lvf_rules::ListEntry::new("LL_Example", "00001234", "Base.esm");
        assert_eq!(
            directive_target(&full),
            Some(("Base.esm".to_string(), "00001234".to_string()))
        );

        // Editor id stands in when the form id is missing, uppercased
        let by_edid = lvf_rules::ListEntry::new("LL_Example", "", "Base.esm");
        assert_eq!(
            directive_target(&by_edid),
            Some(("Base.esm".to_string(), "LL_EXAMPLE".to_string()))
        );

        // No master file: inexpressible
        let no_master = lvf_rules::ListEntry::new("LL_Example", "1234", "");
        assert_eq!(directive_target(&no_master), None);
    }

    #[test]
    fn literal_tokens_without_master_are_counted_not_rendered() {
        let rules = fixture();
        let rec = record("Mod.esp", "12AB", "WeaponFoo");
        let selections = select(&[(&rec, &["DIST_PISTOL", "LL_HandPlaced"])]);

        let batch = PatchSetBuilder::new(&rules).build(&[rec], &selections);
        assert_eq!(batch.entries.len(), 1);
        assert_eq!(batch.skipped_entries, 1);
        assert!(!batch.entries[0].content.contains("LL_HandPlaced"));
    }

    #[test]
    fn records_without_renderable_entries_contribute_nothing() {
        let rules = fixture();
        let rec = record("Mod.esp", "12AB", "WeaponFoo");
        // Only a literal entry, which has no master file
        let selections = select(&[(&rec, &["LL_HandPlaced"])]);

        let batch = PatchSetBuilder::new(&rules).build(&[rec], &selections);
        assert!(batch.is_empty());
        assert_eq!(batch.skipped_entries, 1);
    }

    #[test]
    fn unselected_records_contribute_nothing() {
        let rules = fixture();
        let rec = record("Mod.esp", "12AB", "WeaponFoo");

        let batch = PatchSetBuilder::new(&rules).build(&[rec], &SelectionMap::new());
        assert!(batch.is_empty());
        assert_eq!(batch.skipped_entries, 0);
    }

    #[test]
    fn faction_selection_renders_category_lists() {
        let rules = fixture();
        let rec = record("Mod.esp", "12AB", "ShotgunFoo");
        let selections = select(&[(&rec, &["DIST_SHOTGUN", "FAC_GUNNERS"])]);

        let batch = PatchSetBuilder::new(&rules).build(&[rec], &selections);
        assert_eq!(
            batch.entries[0].content,
            "filterByLLs=Factions.esm|90A001:addToLLs=Mod.esp|12AB~1~1~0\n"
        );
    }

    #[test]
    fn per_plugin_grouping_merges_records_and_sorts_plugins() {
        let rules = fixture();
        let rec_b1 = record("beta.esp", "1", "B_One");
        let rec_a = record("Alpha.esp", "2", "A_One");
        let rec_b2 = record("beta.esp", "3", "B_Two");
        let selections = select(&[
            (&rec_b1, &["DIST_PISTOL"]),
            (&rec_a, &["DIST_PISTOL"]),
            (&rec_b2, &["DIST_MELEE_1H"]),
        ]);

        let batch = PatchSetBuilder::new(&rules)
            .with_group_mode(GroupMode::PerPlugin)
            .with_base_dir("out")
            .build(
                &[rec_b1.clone(), rec_a.clone(), rec_b2.clone()],
                &selections,
            );

        assert_eq!(batch.entries.len(), 2);
        assert_eq!(batch.entries[0].path, "out/Alpha.ini");
        assert_eq!(batch.entries[1].path, "out/beta.ini");

        // Both beta records land in one file, in input order
        let beta = &batch.entries[1].content;
        let first = beta.find("beta.esp|1~").unwrap();
        let second = beta.find("beta.esp|3~").unwrap();
        assert!(first < second);
    }

    #[test]
    fn path_segments_are_sanitized() {
        let rules = fixture();
        let rec = record("My Mod: v2.esp", "12AB", "Weap<Foo>");
        let selections = select(&[(&rec, &["DIST_PISTOL"])]);

        let batch = PatchSetBuilder::new(&rules)
            .with_base_dir("base")
            .build(&[rec], &selections);

        assert_eq!(
            batch.entries[0].path,
            "base/My Mod_ v2.esp+Weap_Foo_/My Mod_ v2.esp.ini"
        );
    }

    #[test]
    fn source_name_prefers_single_common_plugin() {
        let single = vec![
            record("MyMod.esp", "1", "A"),
            record("MyMod.esp", "2", "B"),
        ];
        assert_eq!(derive_source_name(&single, "records"), "MyMod");

        let mixed = vec![record("MyMod.esp", "1", "A"), record("Other.esp", "2", "B")];
        assert_eq!(derive_source_name(&mixed, "records"), "records");
        assert_eq!(derive_source_name(&mixed, "  "), "output");
    }
}
