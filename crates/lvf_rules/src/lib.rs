//! Rule configuration, tag classification and selection expansion.
//!
//! This crate owns the decision logic of the patch builder:
//!
//! - **Configuration**: a serde model of the rule tables (distribute lists,
//!   faction decision rules, special tokens, attribute-code lookups), loaded
//!   from JSON or TOML and rejected wholesale when a required table is
//!   missing.
//! - **Compilation**: [`RuleSet::compile`] turns the raw configuration into
//!   an immutable rule set where every token carries its kind (type, faction,
//!   special, category) exactly once.
//! - **Classification**: [`RuleSet::classify`] maps a record's raw attribute
//!   codes to auto-applicable tokens, applying dominant-channel gating and
//!   exclusivity suppression; [`RuleSet::resolve_faction_categories`] walks
//!   per-faction decision rules.
//! - **Expansion**: [`RuleSet::expand`] turns a mixed token selection into a
//!   deduplicated, insertion-ordered list of leveled-list entries, switching
//!   between "type distributes" and "type classifies, faction distributes"
//!   semantics depending on context.
//!
//! All operations are pure functions over the compiled rule set; nothing here
//! performs I/O.

pub mod classify;
pub mod config;
pub mod entry;
pub mod error;
pub mod expand;
pub mod ruleset;

pub use classify::Classification;
pub use config::{AutoDecisionConfig, ChannelGate, FactionRule, RulesConfig, SuppressionRule};
pub use entry::{normalize_form_id, to_type_code_key, ListEntry};
pub use error::{ConfigError, Result};
pub use ruleset::{DecisionRule, RuleSet, TokenKind};
