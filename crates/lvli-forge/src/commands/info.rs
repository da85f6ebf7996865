use camino::Utf8PathBuf;
use colored::Colorize;
use miette::Result;

use crate::utils;

#[derive(Debug)]
pub struct ConfigInfoArgs {
    pub config_path: Utf8PathBuf,
}

/// Validate a rule configuration and print a summary.
pub fn show_config_info(args: ConfigInfoArgs) -> Result<()> {
    let rules = utils::load_ruleset(&args.config_path)?;

    println!(
        "{} {}",
        "📋 Rule configuration:".bright_blue().bold(),
        args.config_path.to_string().bright_cyan().bold()
    );
    println!("Schema version:   {}", rules.version());
    println!("Type tokens:      {}", rules.type_token_count());
    println!("Special tokens:   {}", rules.special_token_count());
    println!(
        "Factions:         {} ({} decision rules)",
        rules.faction_count(),
        rules.decision_rule_count()
    );
    println!("Attribute codes:  {}", rules.type_code_count());

    if rules.channel_priority().is_empty() {
        println!("Channel priority: {}", "(none)".dimmed());
    } else {
        println!(
            "Channel priority: {} {}",
            rules.channel_priority().join(" < "),
            "(last present wins)".dimmed()
        );
    }
    if let Some(vendor) = rules.vendor_token() {
        println!("Vendor token:     {vendor}");
    }

    Ok(())
}
