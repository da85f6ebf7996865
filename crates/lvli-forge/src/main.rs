use camino::Utf8PathBuf;
use clap::builder::{styling::AnsiColor, Styles};
use clap::ColorChoice;
use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use commands::{
    auto_assign_tokens, export_bundle, preview_export, show_config_info, AutoAssignArgs,
    BuildArgs, ConfigInfoArgs, ExportBundleArgs, GroupArg, PreviewExportArgs,
};
use miette::Result;
use tracing_subscriber::EnvFilter;

mod commands;
mod errors;
mod utils;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Assign type and special tokens automatically from record attributes
    Auto {
        /// The path to the rule configuration file
        #[arg(short, long)]
        config: Utf8PathBuf,

        /// The path to the record export text file
        #[arg(short, long)]
        records: Utf8PathBuf,

        /// The selections file to update
        #[arg(short, long, default_value = "selections.json")]
        selections: Utf8PathBuf,
    },
    /// Print the generated directive files without writing an archive
    Preview {
        /// The path to the rule configuration file
        #[arg(short, long)]
        config: Utf8PathBuf,

        /// The path to the record export text file
        #[arg(short, long)]
        records: Utf8PathBuf,

        /// The selections file to expand
        #[arg(short, long, default_value = "selections.json")]
        selections: Utf8PathBuf,

        /// How to group directive lines into files
        #[arg(long, value_enum, default_value = "per-record")]
        group: GroupArg,

        /// Override the directory prefix of the generated paths
        #[arg(long)]
        base_dir: Option<String>,
    },
    /// Build the patch bundle archive
    Export {
        /// The path to the rule configuration file
        #[arg(short, long)]
        config: Utf8PathBuf,

        /// The path to the record export text file
        #[arg(short, long)]
        records: Utf8PathBuf,

        /// The selections file to expand
        #[arg(short, long, default_value = "selections.json")]
        selections: Utf8PathBuf,

        /// The directory to write the archive to
        #[arg(short, long, default_value = "build")]
        output_dir: Utf8PathBuf,

        /// How to group directive lines into files
        #[arg(long, value_enum, default_value = "per-record")]
        group: GroupArg,

        /// Override the directory prefix of the generated paths
        #[arg(long)]
        base_dir: Option<String>,
    },
    /// Show a summary of a rule configuration
    Info {
        /// The path to the rule configuration file
        #[arg(short, long)]
        config: Utf8PathBuf,
    },
}

fn parse_args() -> Args {
    // Configure colored/styled help output
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default())
        .placeholder(AnsiColor::Blue.on_default());

    let matches = Args::command()
        .styles(styles)
        .color(ColorChoice::Auto)
        .get_matches();

    Args::from_arg_matches(&matches).expect("failed to parse arguments")
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args();

    match args.command {
        Commands::Auto {
            config,
            records,
            selections,
        } => auto_assign_tokens(AutoAssignArgs {
            config_path: config,
            records_path: records,
            selections_path: selections,
        }),
        Commands::Preview {
            config,
            records,
            selections,
            group,
            base_dir,
        } => preview_export(PreviewExportArgs {
            build: BuildArgs {
                config_path: config,
                records_path: records,
                selections_path: selections,
                group,
                base_dir,
            },
        }),
        Commands::Export {
            config,
            records,
            selections,
            output_dir,
            group,
            base_dir,
        } => export_bundle(ExportBundleArgs {
            build: BuildArgs {
                config_path: config,
                records_path: records,
                selections_path: selections,
                group,
                base_dir,
            },
            output_dir,
        }),
        Commands::Info { config } => show_config_info(ConfigInfoArgs {
            config_path: config,
        }),
    }
}
