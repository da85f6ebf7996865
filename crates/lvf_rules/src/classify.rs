//! Automatic classification of records from their raw attribute codes.

use std::collections::HashSet;

use crate::entry::to_type_code_key;
use crate::ruleset::RuleSet;

/// Tokens a record earns automatically from its attribute codes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Classification {
    /// Distribute tokens, in the order their source tags appear on the record.
    pub type_tokens: Vec<String>,
    /// Special tokens applied by the automatic rules.
    pub special_tokens: Vec<String>,
}

impl RuleSet {
    /// Resolve raw attribute codes to type tags, preserving the record's
    /// code order and dropping duplicates and unrecognized codes.
    pub fn type_tags_for_codes(&self, codes: &[String]) -> Vec<String> {
        let mut tags = Vec::new();
        let mut seen = HashSet::new();
        for code in codes {
            let key = to_type_code_key(code);
            if key.is_empty() {
                continue;
            }
            let Some(tag) = self.type_tag_by_code.get(&key) else {
                tracing::debug!(code = %code, "ignoring unrecognized attribute code");
                continue;
            };
            if seen.insert(tag.as_str()) {
                tags.push(tag.clone());
            }
        }
        tags
    }

    /// The dominant channel of a tag set: the *last* entry of the configured
    /// channel priority list that is present. Later entries deliberately
    /// override earlier ones.
    pub fn dominant_channel<'a>(&'a self, tags: &HashSet<&str>) -> Option<&'a str> {
        let mut winner = None;
        for channel in &self.auto.channel_priority {
            if tags.contains(channel.as_str()) {
                winner = Some(channel.as_str());
            }
        }
        winner
    }

    /// Compute the auto-applicable tokens for a record's attribute codes.
    pub fn classify(&self, codes: &[String]) -> Classification {
        let tags = self.type_tags_for_codes(codes);
        let tag_set: HashSet<&str> = tags.iter().map(String::as_str).collect();
        let dominant = self.dominant_channel(&tag_set);

        let mut type_tokens = Vec::new();
        let mut seen = HashSet::new();
        for tag in &tags {
            if !self.channel_allows(tag, dominant) {
                continue;
            }
            if self.is_suppressed(tag, &tag_set) {
                continue;
            }
            for token in self.auto_tokens_by_tag.get(tag).into_iter().flatten() {
                if seen.insert(token.as_str()) {
                    type_tokens.push(token.clone());
                }
            }
        }

        let mut special_tokens = Vec::new();
        for (token, rule) in &self.auto.special_auto {
            if self.auto.vendor_token.as_deref() == Some(token.as_str()) {
                continue;
            }
            let applies = rule.always
                || rule
                    .any_type_tags
                    .iter()
                    .any(|tag| tag_set.contains(tag.as_str()));
            if applies && !special_tokens.contains(token) {
                special_tokens.push(token.clone());
            }
        }

        Classification {
            type_tokens,
            special_tokens,
        }
    }

    /// Resolve faction selectors against the selected type tokens.
    ///
    /// Each faction's decision rules run in configured order; every matching
    /// rule appends its category tokens (duplicates skipped) and a matching
    /// rule with `stop` ends that faction's walk. Factions are independent of
    /// each other. Without any type token or any faction there is nothing to
    /// resolve.
    pub fn resolve_faction_categories(
        &self,
        type_tokens: &[String],
        faction_tokens: &[String],
    ) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        let type_set: HashSet<&str> = type_tokens.iter().map(String::as_str).collect();
        if type_set.is_empty() || faction_tokens.is_empty() {
            return out;
        }

        let mut seen_factions = HashSet::new();
        for faction in faction_tokens {
            if !seen_factions.insert(faction.as_str()) {
                continue;
            }
            let Some(rules) = self.faction_rules.get(faction) else {
                continue;
            };
            for rule in rules {
                if !rule.matches(&type_set) {
                    continue;
                }
                for token in &rule.add {
                    if !out.contains(token) {
                        out.push(token.clone());
                    }
                }
                if rule.stop {
                    break;
                }
            }
        }

        out
    }

    fn channel_allows(&self, tag: &str, dominant: Option<&str>) -> bool {
        match self.auto.channel_gates.get(tag) {
            None => true,
            Some(required) => {
                let required = required.as_deref().unwrap_or(tag);
                dominant == Some(required)
            }
        }
    }

    fn is_suppressed(&self, tag: &str, tags: &HashSet<&str>) -> bool {
        self.auto
            .suppressed_by
            .get(tag)
            .is_some_and(|by| by.iter().any(|t| tags.contains(t.as_str())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RulesConfig;

    fn fixture() -> RuleSet {
        let config =
            RulesConfig::from_json_str(include_str!("../test-data/rules.config.json")).unwrap();
        RuleSet::compile(config).unwrap()
    }

    fn codes(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    const SHOTGUN: &str = "0004A0B1";
    const PISTOL: &str = "0004A0B2";
    const MELEE_1H: &str = "0004A0B3";
    const UNARMED: &str = "0004A0B4";
    const HEAVY: &str = "0004A0B5";
    const MISSILE: &str = "0004A0B6";
    const LASER: &str = "0004A0B7";
    const BALLISTIC: &str = "0004A0B8";
    const UNIQUE: &str = "0004A0B9";

    #[test]
    fn codes_resolve_to_tags_in_record_order() {
        let rules = fixture();
        let tags = rules.type_tags_for_codes(&codes(&[SHOTGUN, BALLISTIC, "garbage", SHOTGUN]));
        assert_eq!(tags, vec!["WeaponTypeShotgun", "WeaponTypeBallistic"]);
    }

    #[test]
    fn load_order_prefix_resolves_to_same_tag() {
        let rules = fixture();
        // Same low 6 digits as the configured shotgun code, different prefix
        let tags = rules.type_tags_for_codes(&codes(&["FF04A0B1"]));
        assert_eq!(tags, vec!["WeaponTypeShotgun"]);
    }

    #[test]
    fn dominant_channel_is_last_present_priority_entry() {
        let rules = fixture();
        let tags: HashSet<&str> = ["WeaponTypeBallistic", "WeaponTypeLaser"]
            .into_iter()
            .collect();
        // Laser is later in the priority list, so it wins over ballistic
        assert_eq!(rules.dominant_channel(&tags), Some("WeaponTypeLaser"));

        let tags: HashSet<&str> = ["WeaponTypeBallistic"].into_iter().collect();
        assert_eq!(rules.dominant_channel(&tags), Some("WeaponTypeBallistic"));

        let tags: HashSet<&str> = ["WeaponTypeShotgun"].into_iter().collect();
        assert_eq!(rules.dominant_channel(&tags), None);
    }

    #[test]
    fn classify_is_deterministic() {
        let rules = fixture();
        let input = codes(&[SHOTGUN, BALLISTIC, UNIQUE]);
        assert_eq!(rules.classify(&input), rules.classify(&input));
    }

    #[test]
    fn shotgun_on_ballistic_channel() {
        let rules = fixture();
        let result = rules.classify(&codes(&[SHOTGUN, BALLISTIC]));
        assert_eq!(result.type_tokens, vec!["DIST_SHOTGUN", "DIST_BALLISTIC"]);
        assert!(result.special_tokens.is_empty());
    }

    #[test]
    fn channel_gate_suppresses_non_dominant_channel() {
        let rules = fixture();
        // Laser dominates, so the ballistic-gated tokens drop out
        let result = rules.classify(&codes(&[SHOTGUN, BALLISTIC, LASER]));
        assert_eq!(result.type_tokens, vec!["DIST_LASER"]);
    }

    #[test]
    fn unarmed_suppresses_one_hand_melee() {
        let rules = fixture();
        let result = rules.classify(&codes(&[MELEE_1H, UNARMED]));
        assert!(
            !result.type_tokens.contains(&"DIST_MELEE_1H".to_string()),
            "one-hand melee must be suppressed by unarmed, got {:?}",
            result.type_tokens
        );

        // Without the unarmed tag the token applies
        let result = rules.classify(&codes(&[MELEE_1H]));
        assert_eq!(result.type_tokens, vec!["DIST_MELEE_1H"]);
    }

    #[test]
    fn missile_suppresses_heavy() {
        let rules = fixture();
        let result = rules.classify(&codes(&[HEAVY, MISSILE]));
        assert!(result.type_tokens.is_empty());

        let result = rules.classify(&codes(&[HEAVY]));
        assert_eq!(result.type_tokens, vec!["DIST_HEAVY"]);
    }

    #[test]
    fn special_auto_rule_applies_on_tag_presence() {
        let rules = fixture();
        let result = rules.classify(&codes(&[PISTOL, UNIQUE]));
        assert_eq!(result.special_tokens, vec!["SPEC_UNIQUE"]);

        let result = rules.classify(&codes(&[PISTOL]));
        assert!(result.special_tokens.is_empty());
    }

    #[test]
    fn faction_rules_walk_in_order_with_stop() {
        let rules = fixture();

        // Shotgun rule matches and stops: the default rule never runs
        let resolved = rules.resolve_faction_categories(
            &["DIST_SHOTGUN".to_string()],
            &["FAC_GUNNERS".to_string()],
        );
        assert_eq!(resolved, vec!["FAC_GUNNERS__SHOTGUN"]);

        // Without the shotgun token the walk falls through to the default
        let resolved = rules.resolve_faction_categories(
            &["DIST_PISTOL".to_string()],
            &["FAC_GUNNERS".to_string()],
        );
        assert_eq!(resolved, vec!["FAC_GUNNERS__DEFAULT"]);
    }

    #[test]
    fn every_matching_rule_contributes_without_stop() {
        let rules = fixture();
        let resolved = rules.resolve_faction_categories(
            &["DIST_SHOTGUN".to_string(), "DIST_PISTOL".to_string()],
            &["FAC_RAIDERS".to_string()],
        );
        assert_eq!(
            resolved,
            vec!["FAC_RAIDERS__NO_HEAVY", "FAC_RAIDERS__ELITE"]
        );
    }

    #[test]
    fn factions_resolve_independently() {
        let rules = fixture();
        let resolved = rules.resolve_faction_categories(
            &["DIST_SHOTGUN".to_string()],
            &["FAC_GUNNERS".to_string(), "FAC_RAIDERS".to_string()],
        );
        assert_eq!(
            resolved,
            vec!["FAC_GUNNERS__SHOTGUN", "FAC_RAIDERS__NO_HEAVY"]
        );
    }

    #[test]
    fn empty_type_or_faction_set_resolves_to_nothing() {
        let rules = fixture();
        assert!(rules
            .resolve_faction_categories(&[], &["FAC_GUNNERS".to_string()])
            .is_empty());
        assert!(rules
            .resolve_faction_categories(&["DIST_SHOTGUN".to_string()], &[])
            .is_empty());
    }
}
