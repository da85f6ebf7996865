//! Expansion of a token selection into a deduplicated entry list.

use std::collections::HashSet;

use crate::entry::ListEntry;
use crate::ruleset::{RuleSet, TokenKind};

impl RuleSet {
    /// Expand a record's selected tokens into leveled-list entries.
    ///
    /// With no faction context every type token contributes its distribute
    /// list directly. As soon as a faction selector (or a directly selected
    /// category token) is present, type tokens stop distributing and act only
    /// as classifiers for the faction decision rules; the resolved category
    /// lists distribute instead. Special tokens always contribute, and tokens
    /// recognized by no table pass through once as literal entries.
    ///
    /// Output order is the insertion order of each entry's first occurrence;
    /// entries are globally deduplicated by their case-insensitive identity
    /// key, so an entry reachable through two tokens is emitted once.
    pub fn expand(&self, selected: &[String]) -> Vec<ListEntry> {
        let mut out: Vec<ListEntry> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        let mut type_tokens: Vec<String> = Vec::new();
        let mut faction_tokens: Vec<String> = Vec::new();
        let mut special_tokens: Vec<String> = Vec::new();
        let mut legacy_categories: Vec<String> = Vec::new();
        let mut literals: Vec<&String> = Vec::new();

        for token in selected {
            match self.kind_of(token) {
                Some(TokenKind::Type) => type_tokens.push(token.clone()),
                Some(TokenKind::Faction) => faction_tokens.push(token.clone()),
                Some(TokenKind::Special) => special_tokens.push(token.clone()),
                Some(TokenKind::Category) => legacy_categories.push(token.clone()),
                None => literals.push(token),
            }
        }

        let push = |entry: &ListEntry, out: &mut Vec<ListEntry>, seen: &mut HashSet<String>| {
            let key = entry.identity_key();
            if key.trim_matches('|').is_empty() || !seen.insert(key) {
                return;
            }
            out.push(entry.clone());
        };

        let resolved = self.resolve_faction_categories(&type_tokens, &faction_tokens);

        // Faction context flips type tokens from distributors to classifiers.
        let has_faction_context = !faction_tokens.is_empty() || !legacy_categories.is_empty();
        if !has_faction_context {
            for token in &type_tokens {
                for entry in self.type_lists.get(token).into_iter().flatten() {
                    push(entry, &mut out, &mut seen);
                }
            }
        }

        for category in resolved.iter().chain(legacy_categories.iter()) {
            for entry in self.category_lists.get(category).into_iter().flatten() {
                push(entry, &mut out, &mut seen);
            }
        }

        for token in &special_tokens {
            for entry in self.special_lists.get(token).into_iter().flatten() {
                push(entry, &mut out, &mut seen);
            }
        }

        for token in literals {
            let entry = ListEntry::from_editor_id(token.trim());
            push(&entry, &mut out, &mut seen);
        }

        out
    }
}
