use camino::Utf8Path;
use miette::Result;

use lvf_patch::{parse_records, Record, SelectionMap};
use lvf_rules::{RuleSet, RulesConfig};

use crate::errors::CliError;

/// Load and compile a rule configuration, picking the parser by extension.
pub fn load_ruleset(path: &Utf8Path) -> Result<RuleSet> {
    let text = std::fs::read_to_string(path).map_err(|source| CliError::ConfigRead {
        path: path.to_owned(),
        source,
    })?;

    let config = match path.extension() {
        Some("json") | None => RulesConfig::from_json_str(&text),
        Some("toml") => RulesConfig::from_toml_str(&text),
        Some(_) => {
            return Err(CliError::ConfigExtension {
                path: path.to_owned(),
            }
            .into())
        }
    }
    .map_err(|source| CliError::ConfigInvalid {
        path: path.to_owned(),
        source,
    })?;

    Ok(RuleSet::compile(config).map_err(|source| CliError::ConfigInvalid {
        path: path.to_owned(),
        source,
    })?)
}

/// Load and parse the record export text.
pub fn load_records(path: &Utf8Path) -> Result<Vec<Record>> {
    let text = std::fs::read_to_string(path).map_err(|source| CliError::RecordsRead {
        path: path.to_owned(),
        source,
    })?;
    Ok(parse_records(&text))
}

/// Load a selection map. A missing file counts as an empty map when
/// `required` is false.
pub fn load_selections(path: &Utf8Path, required: bool) -> Result<SelectionMap> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(source) if source.kind() == std::io::ErrorKind::NotFound && !required => {
            return Ok(SelectionMap::new());
        }
        Err(source) => {
            return Err(CliError::SelectionsRead {
                path: path.to_owned(),
                source,
            }
            .into())
        }
    };

    Ok(
        serde_json::from_str(&text).map_err(|source| CliError::SelectionsInvalid {
            path: path.to_owned(),
            source,
        })?,
    )
}

/// Write a selection map as pretty JSON.
pub fn save_selections(path: &Utf8Path, selections: &SelectionMap) -> Result<()> {
    let json =
        serde_json::to_string_pretty(selections).expect("selection maps always serialize");
    std::fs::write(path, json).map_err(|source| CliError::SelectionsWrite {
        path: path.to_owned(),
        source,
    })?;
    Ok(())
}

/// The fallback export name for a records file: its stem, or `records`.
pub fn records_file_stem(path: &Utf8Path) -> &str {
    match path.file_stem() {
        Some(stem) if !stem.is_empty() => stem,
        _ => "records",
    }
}
