use colored::Colorize;
use miette::Result;

use lvf_patch::ExportEntry;

use super::{build_batch, BuildArgs};

#[derive(Debug)]
pub struct PreviewExportArgs {
    pub build: BuildArgs,
}

/// Print the generated directive files without writing anything.
pub fn preview_export(args: PreviewExportArgs) -> Result<()> {
    let (_, batch) = build_batch(&args.build)?;

    if batch.is_empty() {
        println!("{}", "No record resolves to any leveled list yet.".yellow());
        return Ok(());
    }

    println!("{}", build_preview(&batch.entries));

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

/// Render entries in the preview format: a file-count header followed by one
/// `; ===== path =====` section per file.
fn build_preview(entries: &[ExportEntry]) -> String {
    let sections: Vec<String> = entries
        .iter()
        .map(|entry| format!("; ===== {} =====\n{}", entry.path, entry.content))
        .collect();

    format!(
        "; Files to export: {}\n\n{}",
        entries.len(),
        sections.join("\n").trim_end()
    )
}
