use camino::Utf8PathBuf;
use colored::Colorize;
use miette::{IntoDiagnostic, Result};

use lvf_archive::StoreZipBuilder;
use lvf_patch::sanitize::sanitize_file_token;

use super::{build_batch, BuildArgs};
use crate::errors::CliError;
use crate::utils;

#[derive(Debug)]
pub struct ExportBundleArgs {
    pub build: BuildArgs,
    pub output_dir: Utf8PathBuf,
}

/// Build the patch bundle and write it as a store-only ZIP archive.
pub fn export_bundle(args: ExportBundleArgs) -> Result<()> {
    let (records, batch) = build_batch(&args.build)?;

    if batch.is_empty() {
        println!(
            "{}",
            "Nothing to export: no record resolves to any leveled list.".yellow()
        );
        return Ok(());
    }

    let source_name = lvf_patch::derive_source_name(
        &records,
        utils::records_file_stem(&args.build.records_path),
    );
    let zip_name = format!("{}_lvli.zip", sanitize_file_token(&source_name, "output"));

    println!(
        "{} {}",
        "📦 Packing patch bundle:".bright_blue().bold(),
        zip_name.bright_cyan().bold()
    );

    if !args.output_dir.as_std_path().exists() {
        println!("Creating output directory: {}", args.output_dir);
        std::fs::create_dir_all(&args.output_dir).into_diagnostic()?;
    }

    let mut zip = StoreZipBuilder::default();
    for entry in &batch.entries {
        zip = zip.with_file(entry.path.as_str(), entry.content.as_str());
    }
    let bytes = zip.build().into_diagnostic()?;

    let zip_path = args.output_dir.join(&zip_name);
    std::fs::write(&zip_path, bytes).map_err(|source| CliError::ArchiveWrite {
        path: zip_path.clone(),
        source,
    })?;

    println!(
        "{}\n{} {}",
        format!(
            "✅ Patch bundle created: {} files",
            batch.entries.len()
        )
        .bright_green()
        .bold(),
        "📍 Path:".bright_green(),
        zip_path.to_string().bright_white().bold()
    );

    if batch.skipped_entries > 0 {
        println!(
            "{}",
            format!(
                "({} entries skipped: not expressible as directives)",
                batch.skipped_entries
            )
            .dimmed()
        );
    }

    Ok(())
}
