mod auto;
mod export;
mod info;
mod preview;

pub use auto::{auto_assign_tokens, AutoAssignArgs};
pub use export::{export_bundle, ExportBundleArgs};
pub use info::{show_config_info, ConfigInfoArgs};
pub use preview::{preview_export, PreviewExportArgs};

use camino::Utf8PathBuf;
use miette::Result;

use lvf_patch::{ExportBatch, GroupMode, PatchSetBuilder, Record};

use crate::utils;

/// Grouping of directive lines into output files.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum GroupArg {
    /// One file per record, in its own subdirectory
    #[default]
    PerRecord,
    /// One file per plugin
    PerPlugin,
}

impl From<GroupArg> for GroupMode {
    fn from(value: GroupArg) -> Self {
        match value {
            GroupArg::PerRecord => GroupMode::PerRecord,
            GroupArg::PerPlugin => GroupMode::PerPlugin,
        }
    }
}

/// Inputs shared by `preview` and `export`.
#[derive(Debug)]
pub struct BuildArgs {
    pub config_path: Utf8PathBuf,
    pub records_path: Utf8PathBuf,
    pub selections_path: Utf8PathBuf,
    pub group: GroupArg,
    pub base_dir: Option<String>,
}

/// Load everything and build the export batch.
fn build_batch(args: &BuildArgs) -> Result<(Vec<Record>, ExportBatch)> {
    let rules = utils::load_ruleset(&args.config_path)?;
    let records = utils::load_records(&args.records_path)?;
    let selections = utils::load_selections(&args.selections_path, true)?;

    let mut builder = PatchSetBuilder::new(&rules).with_group_mode(args.group.into());
    if let Some(base_dir) = &args.base_dir {
        builder = builder.with_base_dir(base_dir.clone());
    }
    let batch = builder.build(&records, &selections);

    Ok((records, batch))
}
