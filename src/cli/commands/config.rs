use anyhow::Result;
use clap::{Args, Subcommand};

use crate::cli::Output;
use crate::config::ShadeConfig;

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug, Clone, Copy)]
pub enum ConfigAction {
    /// Print the merged configuration as TOML
    Show,
    /// Load and validate the configuration
    Validate,
}

pub fn execute(args: ConfigArgs, config_path: Option<&str>, output: &Output) -> Result<()> {
    let config = ShadeConfig::load(config_path, None)?;

    match args.action {
        ConfigAction::Show => output.plain(&config.to_toml()?),
        ConfigAction::Validate => {
            match config_path {
                Some(path) => output.info(&format!("Using configuration file {path}")),
                None => output.info("Using default configuration layers"),
            }
            output.success("Configuration is valid");

            output.header("Effective settings");
            output.table_row("Batches", &config.ranking.batches.to_string());
            output.table_row(
                "Workers",
                &config.ranking.strategy().workers().to_string(),
            );
            output.table_row("On failure", &format!("{:?}", config.ranking.on_failure));
            output.table_row("Zero shade", &format!("{:?}", config.ranking.zero_shade));
            output.table_row("Report", &config.report.filename.display().to_string());
            output.table_row("Photo book", &config.library.directory_name);
        }
    }

    Ok(())
}
