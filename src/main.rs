use clap::Parser;

use shaderank::{Cli, Output};

fn main() {
    let cli = Cli::parse();
    let quiet = cli.quiet;

    if let Err(error) = cli.run() {
        Output::new(false, quiet).error(&format!("{error:#}"));
        std::process::exit(1);
    }
}
