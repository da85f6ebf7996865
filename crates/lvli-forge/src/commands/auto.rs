use camino::Utf8PathBuf;
use colored::Colorize;
use miette::Result;

use lvf_rules::TokenKind;

use crate::utils;

#[derive(Debug)]
pub struct AutoAssignArgs {
    pub config_path: Utf8PathBuf,
    pub records_path: Utf8PathBuf,
    pub selections_path: Utf8PathBuf,
}

/// Classify every record and refresh its selection.
///
/// Type and special tokens are recomputed from the record's attribute codes;
/// faction selections (and the vendor token) are the user's call and survive
/// untouched.
pub fn auto_assign_tokens(args: AutoAssignArgs) -> Result<()> {
    let rules = utils::load_ruleset(&args.config_path)?;
    let records = utils::load_records(&args.records_path)?;
    let mut selections = utils::load_selections(&args.selections_path, false)?;

    println!(
        "{} {}",
        "🏷️  Auto-assigning tokens for".bright_blue().bold(),
        format!("{} records", records.len()).bright_cyan().bold()
    );

    let mut changed = 0usize;
    for record in &records {
        let classification = rules.classify(&record.type_codes);
        let current = selections.get(&record.key).cloned().unwrap_or_default();

        let mut merged: Vec<String> = Vec::new();
        for token in classification
            .type_tokens
            .iter()
            .chain(classification.special_tokens.iter())
        {
            if !merged.contains(token) {
                merged.push(token.clone());
            }
        }
        for token in &current {
            let keep = matches!(rules.kind_of(token), Some(TokenKind::Faction))
                || rules.vendor_token() == Some(token.as_str());
            if keep && !merged.contains(token) {
                merged.push(token.clone());
            }
        }

        if merged == current {
            continue;
        }
        changed += 1;
        if merged.is_empty() {
            selections.remove(&record.key);
        } else {
            selections.insert(record.key.clone(), merged);
        }
    }

    utils::save_selections(&args.selections_path, &selections)?;

    println!(
        "{}\n{} {}",
        format!("✅ Auto-assignment done: {changed} records updated")
            .bright_green()
            .bold(),
        "📍 Selections:".bright_green(),
        args.selections_path.to_string().bright_white().bold()
    );

    Ok(())
}
