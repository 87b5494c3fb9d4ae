use anyhow::{Result, bail};
use clap::Args;
use serde_json::{Map, Value, json};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

use super::progress_for;
use crate::cli::Output;
use crate::config::{ReportFormat, ShadeConfig, expand_tilde};
use crate::library::Librarian;
use crate::reports::write_report;
use crate::scanner::ImageScanner;
use crate::shade::ShadeRanker;

#[derive(Args, Debug, Clone, Default)]
pub struct RankArgs {
    /// Directory holding the photos to rank
    #[arg(long = "input_directory", alias = "input-directory", value_name = "DIR")]
    pub input_directory: Option<PathBuf>,

    /// Copy the ranked photos into a photo book under this directory
    #[arg(long = "output_directory", alias = "output-directory", value_name = "DIR")]
    pub output_directory: Option<PathBuf>,

    /// Where to write the report [default: /tmp/bw_jpg_shade_ranking.csv]
    #[arg(long = "report_filename", alias = "report-filename", value_name = "FILE")]
    pub report_filename: Option<PathBuf>,

    /// Number of shade batches [default: 10]
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub batches: Option<u32>,

    /// Evaluate photos on a worker pool
    #[arg(long)]
    pub parallel: bool,

    /// Skip photos that cannot be evaluated instead of failing the run
    #[arg(long = "skip_failures", alias = "skip-failures")]
    pub skip_failures: bool,

    /// Put photos with a shade of exactly 0 in batch 1 instead of dropping them
    #[arg(long = "include_zero", alias = "include-zero")]
    pub include_zero: bool,

    /// Report format
    #[arg(long = "report_format", alias = "report-format", value_enum, value_name = "FORMAT")]
    pub report_format: Option<ReportFormat>,
}

impl RankArgs {
    /// Configuration overrides for the flags actually given
    pub fn overrides(&self) -> Value {
        let mut ranking = Map::new();
        if let Some(batches) = self.batches {
            ranking.insert("batches".into(), json!(batches));
        }
        if self.parallel {
            ranking.insert("parallel".into(), json!(true));
        }
        if self.skip_failures {
            ranking.insert("on_failure".into(), json!("skip"));
        }
        if self.include_zero {
            ranking.insert("zero_shade".into(), json!("first-batch"));
        }

        let mut report = Map::new();
        if let Some(filename) = &self.report_filename {
            report.insert("filename".into(), json!(filename.to_string_lossy()));
        }
        if let Some(format) = self.report_format {
            let format = match format {
                ReportFormat::Csv => "csv",
                ReportFormat::Json => "json",
            };
            report.insert("format".into(), json!(format));
        }

        json!({ "ranking": ranking, "report": report })
    }
}

pub fn execute(args: RankArgs, config_path: Option<&str>, output: &Output) -> Result<()> {
    let start_time = Instant::now();
    let config = ShadeConfig::load(config_path, Some(args.overrides()))?;

    let Some(input_directory) = args.input_directory.as_deref() else {
        bail!("An input directory is required (--input_directory)");
    };
    let input_directory = expand_tilde(input_directory);
    if !input_directory.is_dir() {
        bail!("Input directory '{}' does not exist", input_directory.display());
    }

    let output_directory = args.output_directory.as_deref().map(expand_tilde);
    if let Some(directory) = &output_directory {
        if !directory.is_dir() {
            bail!("Output directory '{}' does not exist", directory.display());
        }
    }

    let report_path = expand_tilde(&config.report.filename);

    let files = ImageScanner::new(&config.ranking.extensions)?.scan(&input_directory)?;
    let total = files.len();
    if total == 0 {
        output.warning(&format!("No images found in {}", input_directory.display()));
    } else {
        output.verbose(&format!(
            "Found {} images in {}",
            total,
            input_directory.display()
        ));
    }

    let ranker = ShadeRanker::from_config(&config.ranking);
    let progress = progress_for(output, total, "Evaluating shades", ranker.strategy());
    let outcome = ranker.rank(files, Some(progress.callback()));
    progress.finish();
    let outcome = outcome?;

    write_report(&report_path, config.report.format, &outcome.batched)?;
    info!("Report written to {}", report_path.display());

    if let Some(directory) = &output_directory {
        let librarian = Librarian::new(directory, &config.library.directory_name);
        let copied = librarian.file_all(&outcome.batched)?;
        output.verbose(&format!(
            "Copied {} photos into {}",
            copied,
            librarian.root().display()
        ));
    }

    if !outcome.unclassified.is_empty() {
        output.warning(&format!(
            "{} images with a shade of 0 fall in no batch and were left out",
            outcome.unclassified.len()
        ));
    }
    if !outcome.failures.is_empty() {
        output.warning(&format!(
            "{} images could not be evaluated and were skipped",
            outcome.failures.len()
        ));
    }

    output.success(&format!(
        "Processed {} images in {:.2}s, report written to {}",
        total,
        start_time.elapsed().as_secs_f64(),
        report_path.display()
    ));

    if output.is_verbose() {
        output.header("Batches");
        for (index, count) in outcome
            .batch_counts(config.ranking.batches)
            .into_iter()
            .enumerate()
        {
            output.verbose_breakdown(&format!("in batch {:03}", index + 1), count);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Figment;
    use figment::providers::{Format, Serialized, Toml};

    #[test]
    fn test_no_flags_means_no_overrides() {
        let overrides = RankArgs::default().overrides();
        assert_eq!(overrides, json!({ "ranking": {}, "report": {} }));
    }

    #[test]
    fn test_overrides_reach_the_config() {
        let args = RankArgs {
            report_filename: Some(PathBuf::from("/tmp/ranked.json")),
            batches: Some(4),
            parallel: true,
            skip_failures: true,
            include_zero: true,
            report_format: Some(ReportFormat::Json),
            ..RankArgs::default()
        };

        let figment = Figment::new()
            .merge(Toml::string(crate::config::DEFAULT_CONFIG))
            .merge(Serialized::defaults(args.overrides()));
        let config: ShadeConfig = figment.extract().unwrap();

        assert_eq!(config.ranking.batches, 4);
        assert!(config.ranking.parallel);
        assert_eq!(config.ranking.on_failure, crate::config::FailurePolicy::Skip);
        assert_eq!(config.ranking.zero_shade, crate::config::ZeroShadePolicy::FirstBatch);
        assert_eq!(config.report.filename, PathBuf::from("/tmp/ranked.json"));
        assert_eq!(config.report.format, ReportFormat::Json);
        // Untouched values keep their defaults
        assert_eq!(config.ranking.thread_percentage, 80);
    }
}
