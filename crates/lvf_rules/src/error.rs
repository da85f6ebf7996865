//! Error types for configuration loading and compilation.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors raised while loading or compiling a rule configuration.
///
/// Any of these aborts initialization: a [`crate::RuleSet`] is never built
/// from a partially valid configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The JSON document failed to parse or is missing a required table.
    #[error("invalid JSON rule configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// The TOML document failed to parse or is missing a required table.
    #[error("invalid TOML rule configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// The same token is declared by more than one module table, so its kind
    /// would be ambiguous.
    #[error("token '{token}' is declared by more than one module table")]
    AmbiguousToken { token: String },

    /// Two rules of one faction compile to the same category token.
    #[error("faction '{faction}' declares duplicate rule id '{rule_id}'")]
    DuplicateRuleId { faction: String, rule_id: String },
}
