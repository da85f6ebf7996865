//! Serde model of the rule configuration file.
//!
//! The configuration is a single JSON (or TOML) document with camelCase keys.
//! The top-level tables `typeModules`, `specialModules`, `typeKeywordModules`,
//! `factionModules` and `autoDecisionConfig` are required together with
//! `version`; a document missing any of them is rejected as a whole. Unknown
//! keys are ignored.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::entry::{normalize_form_id, ListEntry};
use crate::error::Result;

/// Root of the rule configuration document.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RulesConfig {
    /// Schema version of the document.
    pub version: u32,

    /// Distribute modules: selectable type token -> leveled lists plus the
    /// type tags that auto-apply the token.
    pub type_modules: BTreeMap<String, TypeModule>,

    /// Special modules: tokens whose lists apply regardless of the
    /// type/faction context.
    pub special_modules: BTreeMap<String, SpecialModule>,

    /// Attribute-code lookup: type tag -> raw form ids that identify it.
    pub type_keyword_modules: BTreeMap<String, KeywordModule>,

    /// Faction modules: faction token -> ordered decision rules.
    pub faction_modules: BTreeMap<String, FactionModule>,

    /// Channel priority, gating and suppression tables for automatic
    /// classification.
    pub auto_decision_config: AutoDecisionConfig,
}

/// One distribute module.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeModule {
    #[serde(default)]
    pub lists: Vec<RawListEntry>,

    /// Type tags that auto-apply this module's token during classification.
    #[serde(default)]
    pub source_type_tags: Vec<String>,
}

/// One special module: a token with direct, context-independent lists.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecialModule {
    #[serde(default)]
    pub lists: Vec<RawListEntry>,
}

/// Raw form ids that resolve to one type tag.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordModule {
    #[serde(default)]
    pub form_ids: Vec<String>,
}

/// One faction module: decision rules evaluated in document order.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactionModule {
    #[serde(default)]
    pub rules: Vec<FactionRule>,
}

/// A faction decision rule.
///
/// Conditions match against the record's selected type-token set. Every
/// matching rule contributes its lists; `stop` ends the walk for this
/// faction. Rules without lists are dropped at compilation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactionRule {
    /// Stable identifier used to derive the internal category token.
    /// Defaults to `RULE_<position>` when absent.
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub when_any_type: Vec<String>,

    #[serde(default)]
    pub when_all_type: Vec<String>,

    #[serde(default)]
    pub when_none_type: Vec<String>,

    #[serde(default)]
    pub stop: bool,

    #[serde(default)]
    pub lists: Vec<RawListEntry>,
}

/// Automatic classification tables.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoDecisionConfig {
    /// Ordered channel tags. The dominant channel of a record is the *last*
    /// entry of this list present in its tag set, so authors put the
    /// strongest channel last.
    #[serde(default)]
    pub channel_priority: Vec<String>,

    /// Gates tying a tag's auto tokens to a dominant channel.
    #[serde(default)]
    pub channel_gates: Vec<ChannelGate>,

    /// Exclusivity suppressions between simultaneously present tags.
    #[serde(default)]
    pub suppressions: Vec<SuppressionRule>,

    /// Special tokens applied automatically, either always or when one of
    /// the listed tags is present.
    #[serde(default)]
    pub special_auto_rules: BTreeMap<String, SpecialAutoRule>,

    /// Vendor-side special token. Never auto-applied; preserved across
    /// automatic reclassification like a faction selection.
    #[serde(default)]
    pub vendor_token: Option<String>,
}

/// Suppresses a tag's auto tokens unless the dominant channel matches.
///
/// With `required_channel` absent the tag itself must be the dominant
/// channel.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelGate {
    pub type_tag: String,

    #[serde(default)]
    pub required_channel: Option<String>,
}

/// Suppresses a tag's auto tokens when any of `suppressed_by` is present.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuppressionRule {
    pub type_tag: String,

    #[serde(default)]
    pub suppressed_by: Vec<String>,
}

/// One automatic special-token rule.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecialAutoRule {
    #[serde(default)]
    pub always: bool,

    #[serde(default)]
    pub any_type_tags: Vec<String>,
}

/// A list entry as written in configuration: either a bare editor id or an
/// object with `edid` / `formId` / `master` fields.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawListEntry {
    EditorId(String),
    Full {
        #[serde(default)]
        edid: String,
        #[serde(default, rename = "formId")]
        form_id: String,
        #[serde(default)]
        master: String,
    },
}

impl RawListEntry {
    /// Normalize into a [`ListEntry`], rejecting entries that carry neither
    /// an editor id nor a form id.
    pub fn normalize(&self) -> Option<ListEntry> {
        match self {
            RawListEntry::EditorId(edid) => {
                let edid = edid.trim();
                if edid.is_empty() {
                    return None;
                }
                Some(ListEntry::from_editor_id(edid))
            }
            RawListEntry::Full {
                edid,
                form_id,
                master,
            } => {
                let edid = edid.trim();
                let form_id = normalize_form_id(form_id);
                if edid.is_empty() && form_id.is_empty() {
                    return None;
                }
                Some(ListEntry::new(edid, form_id, master.trim()))
            }
        }
    }
}

impl RulesConfig {
    /// Parse a JSON configuration document.
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Parse a TOML configuration document with the same structure.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fixture_config() {
        let config =
            RulesConfig::from_json_str(include_str!("../test-data/rules.config.json")).unwrap();

        assert_eq!(config.version, 1);
        assert!(config.type_modules.contains_key("DIST_SHOTGUN"));
        assert!(config.special_modules.contains_key("FAC_VENDORS"));
        assert!(config.faction_modules.contains_key("FAC_GUNNERS"));
        assert_eq!(
            config.auto_decision_config.channel_priority,
            vec![
                "WeaponTypeBallistic".to_string(),
                "WeaponTypeLaser".to_string(),
                "WeaponTypePlasma".to_string()
            ]
        );
    }

    #[test]
    fn missing_required_table_is_rejected() {
        let result = RulesConfig::from_json_str(
            r#"{
                "version": 1,
                "typeModules": {},
                "specialModules": {},
                "typeKeywordModules": {},
                "factionModules": {}
            }"#,
        );

        let err = result.unwrap_err().to_string();
        assert!(err.contains("autoDecisionConfig"), "got: {err}");
    }

    #[test]
    fn list_entry_forms() {
        // Bare string entry
        let entry: RawListEntry = serde_json::from_str(r#""LL_Legacy""#).unwrap();
        assert_eq!(
            entry.normalize(),
            Some(ListEntry::from_editor_id("LL_Legacy"))
        );

        // Object entry normalizes the form id
        let entry: RawListEntry = serde_json::from_str(
            r#"{ "edid": "LL_Example", "formId": "0012a001", "master": "Base.esm" }"#,
        )
        .unwrap();
        assert_eq!(
            entry.normalize(),
            Some(ListEntry::new("LL_Example", "12A001", "Base.esm"))
        );

        // Entries with neither id are rejected
        let entry: RawListEntry = serde_json::from_str(r#"{ "master": "Base.esm" }"#).unwrap();
        assert_eq!(entry.normalize(), None);

        let entry = RawListEntry::EditorId("   ".to_string());
        assert_eq!(entry.normalize(), None);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let config = RulesConfig::from_json_str(
            r#"{
                "version": 2,
                "typeModules": { "DIST_X": { "lists": [], "displayOrder": 5, "icon": "x.svg" } },
                "specialModules": {},
                "typeKeywordModules": {},
                "factionModules": {},
                "autoDecisionConfig": {},
                "uiHints": { "theme": "dark" }
            }"#,
        )
        .unwrap();

        assert_eq!(config.version, 2);
        assert!(config.type_modules.contains_key("DIST_X"));
    }
}
