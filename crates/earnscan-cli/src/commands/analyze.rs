//! Analyze command - run the analysis pipeline on a single document.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use earnscan_core::{AnalysisPipeline, AnalysisReport, StaticGateway};

use super::output::{format_report, OutputFormat};
use super::{build_gateway, display_name, load_config};

/// Arguments for the analyze command.
#[derive(Args)]
pub struct AnalyzeArgs {
    /// Input file (PDF, DOCX or TXT)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Use the contents of this file as the completion reply
    #[arg(long)]
    reply_file: Option<PathBuf>,

    /// Override the configured model
    #[arg(short, long)]
    model: Option<String>,

    /// Print the prompt instead of calling the completion service
    #[arg(long)]
    dry_run: bool,
}

pub async fn run(args: AnalyzeArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if let Some(model) = &args.model {
        config.completion.model = model.clone();
    }

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let data = fs::read(&args.input)?;
    let filename = display_name(&args.input);

    if args.dry_run {
        // The gateway is never called when only building the prompt.
        let pipeline = AnalysisPipeline::from_config(&config, Arc::new(StaticGateway::new("")));
        let prompt = pipeline.build_prompt(&filename, &data)?;
        eprintln!(
            "{} {} excerpt characters{}",
            style("ℹ").blue(),
            prompt.excerpt_chars(),
            if prompt.was_truncated() { " (truncated)" } else { "" }
        );
        println!("{}", prompt.as_str());
        return Ok(());
    }

    let gateway = build_gateway(&config, args.reply_file.as_deref())?;
    let pipeline = AnalysisPipeline::from_config(&config, gateway);

    info!(
        "Analyzing {} with {}",
        args.input.display(),
        pipeline.gateway_name()
    );

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.set_message(format!("Analyzing {}...", filename));
    pb.enable_steady_tick(Duration::from_millis(100));

    let result = pipeline.analyze_upload(&filename, &data).await;

    pb.finish_and_clear();

    let report = AnalysisReport::new(filename.as_str(), &result);
    let output = format_report(&report, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        eprintln!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    match result {
        Ok(_) => Ok(()),
        Err(e) => anyhow::bail!("{} ({})", e, e.kind()),
    }
}
