use anyhow::{Result, bail};
use clap::Args;
use serde_json::json;
use std::path::PathBuf;
use std::time::Instant;

use super::progress_for;
use crate::cli::Output;
use crate::config::{ShadeConfig, expand_tilde};
use crate::frame::Framer;
use crate::scanner::ImageScanner;

#[derive(Args, Debug, Clone)]
pub struct FrameArgs {
    /// Existing directory receiving the framed photos
    #[arg(long, value_name = "DIR")]
    pub destination: PathBuf,

    #[command(flatten)]
    pub input: FrameInput,

    /// Frame photos on a worker pool
    #[arg(long)]
    pub parallel: bool,
}

#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct FrameInput {
    /// Frame every photo in this directory
    #[arg(long, value_name = "DIR")]
    pub source: Option<PathBuf>,

    /// Frame a single photo
    #[arg(long, value_name = "FILE")]
    pub filename: Option<PathBuf>,
}

pub fn execute(args: FrameArgs, config_path: Option<&str>, output: &Output) -> Result<()> {
    let start_time = Instant::now();
    let overrides = args.parallel.then(|| json!({ "ranking": { "parallel": true } }));
    let config = ShadeConfig::load(config_path, overrides)?;

    let destination = expand_tilde(&args.destination);
    if !destination.is_dir() {
        bail!("Destination directory '{}' does not exist", destination.display());
    }

    let scanner = ImageScanner::new(&config.ranking.extensions)?;
    let files = match (&args.input.source, &args.input.filename) {
        (Some(source), _) => scanner.scan(&expand_tilde(source))?,
        (None, Some(filename)) => {
            let filename = expand_tilde(filename);
            if !filename.is_file() {
                bail!("File '{}' does not exist", filename.display());
            }
            if !scanner.is_supported(&filename) {
                bail!("'{}' is not a supported image file", filename.display());
            }
            vec![filename]
        }
        (None, None) => bail!("Either --source or --filename is required"),
    };

    let total = files.len();
    let strategy = config.ranking.strategy();
    let framer = Framer::new(config.frame.clone());
    let progress = progress_for(output, total, "Framing", strategy);

    let target = destination.clone();
    let results = strategy.execute(
        files,
        move |path: &PathBuf, _worker_id| framer.frame_file(path, &target),
        Some(progress.callback()),
    );
    progress.finish();

    // Every file was attempted; report the first failure in input order
    let framed = results?.into_iter().collect::<Result<Vec<_>>>()?;

    for path in &framed {
        output.verbose(&format!("Wrote {}", path.display()));
    }
    output.success(&format!(
        "Framed {} images into {} in {:.2}s",
        framed.len(),
        destination.display(),
        start_time.elapsed().as_secs_f64()
    ));

    Ok(())
}
