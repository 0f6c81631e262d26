//! Batch analysis command for multiple documents.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Local;
use clap::Args;
use console::style;
use futures_util::stream::{self, StreamExt};
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use earnscan_core::models::document::file_extension;
use earnscan_core::{AnalysisError, AnalysisPipeline, AnalysisReport, SourceFormat};

use super::output::{format_csv, format_report, OutputFormat};
use super::{build_gateway, display_name, load_config};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Directory for one report per file
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Write a summary CSV to this path
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Write all reports as one JSON array to this path
    #[arg(long)]
    export_json: Option<PathBuf>,

    /// Number of documents analyzed concurrently
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Stop at the first failed document
    #[arg(long)]
    fail_fast: bool,

    /// Use the contents of this file as the completion reply
    #[arg(long)]
    reply_file: Option<PathBuf>,

    /// Override the configured model
    #[arg(short, long)]
    model: Option<String>,
}

/// Report for a single file.
struct FileResult {
    path: PathBuf,
    report: AnalysisReport,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if let Some(model) = &args.model {
        config.completion.model = model.clone();
    }

    // Expand glob pattern
    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file())
        .filter(|p| {
            let supported = SourceFormat::from_tag(&file_extension(&p.to_string_lossy())).is_some();
            if !supported {
                debug!("Skipping {}", p.display());
            }
            supported
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    eprintln!(
        "{} Found {} files to analyze",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let gateway = build_gateway(&config, args.reply_file.as_deref())?;
    let pipeline = AnalysisPipeline::from_config(&config, gateway);

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let mut reports = stream::iter(files)
        .map(|path| analyze_file(&pipeline, path))
        .buffered(args.jobs.max(1));

    let mut results = Vec::new();
    while let Some(result) = reports.next().await {
        overall_pb.inc(1);

        if let Some(err) = result.report.error() {
            if args.fail_fast {
                overall_pb.abandon();
                error!("Failed to analyze {}: {}", result.path.display(), err.detail);
                anyhow::bail!("Analysis failed: {} ({})", err.detail, err.kind);
            }
            warn!("Failed to analyze {}: {}", result.path.display(), err.detail);
        }

        if let Some(ref output_dir) = args.output_dir {
            write_report(output_dir, &result, args.format)?;
        }

        results.push(result);
    }

    overall_pb.finish_with_message("Complete");

    let all_reports: Vec<AnalysisReport> = results.iter().map(|r| r.report.clone()).collect();

    if let Some(ref summary_path) = args.summary {
        fs::write(summary_path, format_csv(&all_reports)?)?;
        eprintln!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    if let Some(ref export_path) = args.export_json {
        fs::write(export_path, serde_json::to_string_pretty(&all_reports)?)?;
        eprintln!(
            "{} Reports exported to {}",
            style("✓").green(),
            export_path.display()
        );
    }

    let failed: Vec<&FileResult> = results.iter().filter(|r| r.report.error().is_some()).collect();
    let successful = results.len() - failed.len();

    println!();
    println!(
        "{} Analyzed {} files in {:?} (finished {})",
        style("✓").green(),
        results.len(),
        start.elapsed(),
        Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    println!(
        "   {} successful, {} failed",
        style(successful).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            if let Some(err) = result.report.error() {
                println!("  - {}: {} ({})", result.path.display(), err.detail, err.kind);
            }
        }
    }

    Ok(())
}

async fn analyze_file(pipeline: &AnalysisPipeline, path: PathBuf) -> FileResult {
    let file_start = Instant::now();
    let filename = display_name(&path);

    let result = match fs::read(&path) {
        Ok(data) => pipeline.analyze_upload(&filename, &data).await,
        Err(e) => Err(AnalysisError::Unreadable(e.to_string())),
    };
    let processing_time_ms = file_start.elapsed().as_millis() as u64;
    debug!("Analyzed {} in {}ms", path.display(), processing_time_ms);

    FileResult {
        report: AnalysisReport::new(filename, &result),
        path,
        processing_time_ms,
    }
}

/// Report file name keeping the source extension, so `q1.pdf` and `q1.txt`
/// do not collide.
fn report_file_name(path: &Path, format: OutputFormat) -> String {
    format!("{}.{}", display_name(path), format.extension())
}

fn write_report(output_dir: &Path, result: &FileResult, format: OutputFormat) -> anyhow::Result<()> {
    let output_path = output_dir.join(report_file_name(&result.path, format));
    fs::write(&output_path, format_report(&result.report, format)?)?;
    debug!(
        "Wrote report to {} ({}ms)",
        output_path.display(),
        result.processing_time_ms
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_names_keep_source_extension() {
        let pdf = report_file_name(Path::new("docs/q1.pdf"), OutputFormat::Json);
        let txt = report_file_name(Path::new("docs/q1.txt"), OutputFormat::Json);
        assert_eq!(pdf, "q1.pdf.json");
        assert_eq!(txt, "q1.txt.json");
        assert_eq!(report_file_name(Path::new("q1.docx"), OutputFormat::Csv), "q1.docx.csv");
    }
}
