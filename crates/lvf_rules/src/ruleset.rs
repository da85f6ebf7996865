//! Compilation of a raw configuration into an immutable rule set.

use std::collections::{HashMap, HashSet};

use crate::config::{RulesConfig, SpecialAutoRule};
use crate::entry::{to_type_code_key, ListEntry};
use crate::error::{ConfigError, Result};

/// The kind of a recognized token, assigned once at compilation.
///
/// Tokens absent from every table have no kind; expansion passes them
/// through as literal list identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Selectable distribute token backed by a leveled-list table.
    Type,
    /// Faction selector resolved through decision rules.
    Faction,
    /// Direct, context-independent list token.
    Special,
    /// Internal faction-category token produced by rule compilation; also
    /// accepted directly in legacy selections.
    Category,
}

/// A compiled faction decision rule.
///
/// Conditions match against the set of selected type tokens. Every matching
/// rule contributes its `add` tokens; a matching rule with `stop` ends the
/// walk for its faction.
#[derive(Debug, Clone)]
pub struct DecisionRule {
    pub when_any: Vec<String>,
    pub when_all: Vec<String>,
    pub when_none: Vec<String>,
    pub add: Vec<String>,
    pub stop: bool,
}

impl DecisionRule {
    pub fn matches(&self, type_tokens: &HashSet<&str>) -> bool {
        if !self.when_any.is_empty() && !self.when_any.iter().any(|t| type_tokens.contains(t.as_str()))
        {
            return false;
        }
        if !self.when_all.is_empty() && !self.when_all.iter().all(|t| type_tokens.contains(t.as_str()))
        {
            return false;
        }
        if !self.when_none.is_empty() && self.when_none.iter().any(|t| type_tokens.contains(t.as_str()))
        {
            return false;
        }
        true
    }
}

/// Compiled automatic-classification tables.
#[derive(Debug, Default)]
pub(crate) struct AutoRules {
    pub(crate) channel_priority: Vec<String>,
    /// Tag -> required dominant channel (`None` means the tag itself).
    pub(crate) channel_gates: HashMap<String, Option<String>>,
    /// Tag -> tags whose presence suppresses it.
    pub(crate) suppressed_by: HashMap<String, Vec<String>>,
    /// Ordered automatic special-token rules.
    pub(crate) special_auto: Vec<(String, SpecialAutoRule)>,
    pub(crate) vendor_token: Option<String>,
}

/// An immutable, fully compiled rule set.
///
/// Construction is the only place token kinds are assigned; afterwards every
/// lookup is a plain map access.
#[derive(Debug)]
pub struct RuleSet {
    pub(crate) kinds: HashMap<String, TokenKind>,
    pub(crate) type_lists: HashMap<String, Vec<ListEntry>>,
    pub(crate) special_lists: HashMap<String, Vec<ListEntry>>,
    pub(crate) category_lists: HashMap<String, Vec<ListEntry>>,
    pub(crate) faction_rules: HashMap<String, Vec<DecisionRule>>,
    pub(crate) type_tag_by_code: HashMap<String, String>,
    pub(crate) auto_tokens_by_tag: HashMap<String, Vec<String>>,
    pub(crate) auto: AutoRules,
    version: u32,
}

impl RuleSet {
    /// Compile a parsed configuration.
    ///
    /// Fails when the same token is declared by more than one module table or
    /// when a faction declares two rules with the same id; no partially
    /// compiled rule set is ever returned.
    pub fn compile(config: RulesConfig) -> Result<Self> {
        let mut kinds: HashMap<String, TokenKind> = HashMap::new();
        let mut claim = |token: &str, kind: TokenKind| -> Result<()> {
            if kinds.insert(token.to_string(), kind).is_some() {
                return Err(ConfigError::AmbiguousToken {
                    token: token.to_string(),
                });
            }
            Ok(())
        };

        let mut type_lists = HashMap::new();
        let mut auto_tokens_by_tag: HashMap<String, Vec<String>> = HashMap::new();
        for (token, module) in &config.type_modules {
            claim(token, TokenKind::Type)?;
            type_lists.insert(token.clone(), normalize_lists(&module.lists));
            for tag in &module.source_type_tags {
                let tag = tag.trim();
                if tag.is_empty() {
                    continue;
                }
                let tokens = auto_tokens_by_tag.entry(tag.to_string()).or_default();
                if !tokens.contains(token) {
                    tokens.push(token.clone());
                }
            }
        }

        let mut special_lists = HashMap::new();
        for (token, module) in &config.special_modules {
            claim(token, TokenKind::Special)?;
            special_lists.insert(token.clone(), normalize_lists(&module.lists));
        }

        let mut category_lists = HashMap::new();
        let mut faction_rules: HashMap<String, Vec<DecisionRule>> = HashMap::new();
        for (faction, module) in &config.faction_modules {
            claim(faction, TokenKind::Faction)?;
            let mut compiled = Vec::new();
            for (idx, rule) in module.rules.iter().enumerate() {
                let lists = normalize_lists(&rule.lists);
                if lists.is_empty() {
                    tracing::debug!(faction = %faction, rule = idx, "dropping faction rule without lists");
                    continue;
                }

                let rule_id = sanitize_rule_id(rule.id.as_deref(), idx);
                let category = format!("{faction}__{rule_id}");
                if category_lists.contains_key(&category) {
                    return Err(ConfigError::DuplicateRuleId {
                        faction: faction.clone(),
                        rule_id,
                    });
                }
                claim(&category, TokenKind::Category)?;
                category_lists.insert(category.clone(), dedup_entries(lists));

                compiled.push(DecisionRule {
                    when_any: rule.when_any_type.clone(),
                    when_all: rule.when_all_type.clone(),
                    when_none: rule.when_none_type.clone(),
                    add: vec![category],
                    stop: rule.stop,
                });
            }
            faction_rules.insert(faction.clone(), compiled);
        }

        let mut type_tag_by_code = HashMap::new();
        for (tag, module) in &config.type_keyword_modules {
            for raw in &module.form_ids {
                let key = to_type_code_key(raw);
                if key.is_empty() {
                    continue;
                }
                type_tag_by_code.insert(key, tag.clone());
            }
        }

        let auto_config = config.auto_decision_config;
        let mut channel_gates = HashMap::new();
        for gate in auto_config.channel_gates {
            channel_gates.insert(gate.type_tag, gate.required_channel);
        }
        let mut suppressed_by: HashMap<String, Vec<String>> = HashMap::new();
        for rule in auto_config.suppressions {
            suppressed_by
                .entry(rule.type_tag)
                .or_default()
                .extend(rule.suppressed_by);
        }

        let auto = AutoRules {
            channel_priority: auto_config.channel_priority,
            channel_gates,
            suppressed_by,
            special_auto: auto_config.special_auto_rules.into_iter().collect(),
            vendor_token: auto_config.vendor_token.filter(|t| !t.trim().is_empty()),
        };

        Ok(Self {
            kinds,
            type_lists,
            special_lists,
            category_lists,
            faction_rules,
            type_tag_by_code,
            auto_tokens_by_tag,
            auto,
            version: config.version,
        })
    }

    /// Schema version of the source configuration.
    pub fn version(&self) -> u32 {
        self.version
    }

    /// The compiled kind of `token`, if it is recognized at all.
    pub fn kind_of(&self, token: &str) -> Option<TokenKind> {
        self.kinds.get(token).copied()
    }

    /// The vendor-side special token, if the configuration declares one.
    pub fn vendor_token(&self) -> Option<&str> {
        self.auto.vendor_token.as_deref()
    }

    pub fn type_token_count(&self) -> usize {
        self.type_lists.len()
    }

    pub fn special_token_count(&self) -> usize {
        self.special_lists.len()
    }

    pub fn faction_count(&self) -> usize {
        self.faction_rules.len()
    }

    pub fn decision_rule_count(&self) -> usize {
        self.faction_rules.values().map(Vec::len).sum()
    }

    pub fn type_code_count(&self) -> usize {
        self.type_tag_by_code.len()
    }

    pub fn channel_priority(&self) -> &[String] {
        &self.auto.channel_priority
    }
}

fn normalize_lists(raw: &[crate::config::RawListEntry]) -> Vec<ListEntry> {
    raw.iter().filter_map(|entry| entry.normalize()).collect()
}

/// Drop entries whose identity key repeats within one list.
fn dedup_entries(entries: Vec<ListEntry>) -> Vec<ListEntry> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter(|entry| seen.insert(entry.identity_key()))
        .collect()
}

fn sanitize_rule_id(id: Option<&str>, idx: usize) -> String {
    let raw = match id.map(str::trim) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => format!("RULE_{}", idx + 1),
    };

    let mut out = String::with_capacity(raw.len());
    let mut last_was_sep = false;
    for c in raw.chars() {
        if c.is_alphanumeric() || c == '_' || c == '-' {
            out.push(c);
            last_was_sep = false;
        } else if !last_was_sep {
            out.push('_');
            last_was_sep = true;
        }
    }
    out
}
