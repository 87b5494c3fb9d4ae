//! Command-line interface for shaderank
//!
//! Ranking is the default command, so `shaderank --input_directory DIR`
//! works without naming a subcommand. `rank` is accepted as an explicit
//! spelling of the same thing.

use anyhow::Result;
use clap::error::ErrorKind;
use clap::{ArgAction, CommandFactory, Parser, Subcommand};

mod commands;
mod output;

pub use commands::config::{ConfigAction, ConfigArgs};
pub use commands::frame::FrameArgs;
pub use commands::rank::RankArgs;
pub use output::Output;

/// shaderank - rank photos by shade and file them into a photo book
#[derive(Parser)]
#[command(
    name = "shaderank",
    version = crate::VERSION,
    about = "Rank photos by shade, report the batches, and file them into a photo book",
    long_about = None
)]
pub struct Cli {
    /// Increase verbosity (can be repeated)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Use custom configuration file
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub rank: RankArgs,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rank photos by shade (the default command)
    Rank(RankArgs),
    /// Frame photos on a square white canvas for Instagram
    Frame(FrameArgs),
    /// Configuration management
    Config(ConfigArgs),
}

impl Cli {
    pub fn run(self) -> Result<()> {
        setup_logging(self.verbose, self.quiet);
        let output = Output::new(self.verbose > 0, self.quiet);
        let config_path = self.config.as_deref();

        match self.command {
            Some(Commands::Rank(args)) => Self::rank(args, config_path, &output),
            Some(Commands::Frame(args)) => commands::frame::execute(args, config_path, &output),
            Some(Commands::Config(args)) => commands::config::execute(args, config_path, &output),
            None => Self::rank(self.rank, config_path, &output),
        }
    }

    fn rank(args: RankArgs, config_path: Option<&str>, output: &Output) -> Result<()> {
        if args.input_directory.is_none() {
            Cli::command()
                .error(
                    ErrorKind::MissingRequiredArgument,
                    "the following required arguments were not provided:\n  --input_directory <DIR>",
                )
                .exit();
        }
        commands::rank::execute(args, config_path, output)
    }
}

fn setup_logging(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        match verbose {
            0 => tracing_subscriber::EnvFilter::new("warn"),
            1 => tracing_subscriber::EnvFilter::new("info"),
            2 => tracing_subscriber::EnvFilter::new("debug"),
            _ => tracing_subscriber::EnvFilter::new("trace"),
        }
    });

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
