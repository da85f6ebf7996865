use camino::Utf8PathBuf;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    #[error("Failed to read rule configuration: {path}")]
    #[diagnostic(
        code(config::read_failed),
        help("Make sure the file exists and the path is correct")
    )]
    ConfigRead {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid rule configuration: {path}")]
    #[diagnostic(
        code(config::invalid),
        help("All module tables (typeModules, specialModules, typeKeywordModules, factionModules, autoDecisionConfig) and the version field must be present")
    )]
    ConfigInvalid {
        path: Utf8PathBuf,
        #[source]
        source: lvf_rules::ConfigError,
    },

    #[error("Unsupported configuration extension: {path}")]
    #[diagnostic(
        code(config::unsupported_extension),
        help("Rule configurations are read from .json or .toml files")
    )]
    ConfigExtension { path: Utf8PathBuf },

    #[error("Failed to read records file: {path}")]
    #[diagnostic(
        code(records::read_failed),
        help("Export the record list as text first, then pass its path with --records")
    )]
    RecordsRead {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read selections file: {path}")]
    #[diagnostic(code(selections::read_failed))]
    SelectionsRead {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid selections file: {path}")]
    #[diagnostic(
        code(selections::invalid),
        help("Selections are a JSON object mapping record keys to token arrays")
    )]
    SelectionsInvalid {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write selections file: {path}")]
    #[diagnostic(code(selections::write_failed))]
    SelectionsWrite {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write archive: {path}")]
    #[diagnostic(
        code(archive::write_failed),
        help("Check file permissions and available disk space")
    )]
    ArchiveWrite {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
}
