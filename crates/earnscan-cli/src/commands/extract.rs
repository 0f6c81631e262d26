//! Extract command - show the text the pipeline would analyze.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use console::style;

use earnscan_core::{AnalysisPipeline, StaticGateway};

use super::{display_name, load_config};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input file (PDF, DOCX or TXT)
    #[arg(required = true)]
    input: PathBuf,

    /// Number of characters to show (default: from config)
    #[arg(short = 'n', long)]
    chars: Option<usize>,

    /// Print the full text
    #[arg(long, conflicts_with = "chars")]
    full: bool,
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let data = fs::read(&args.input)?;
    let filename = display_name(&args.input);

    // Extraction only; no completion request is made.
    let pipeline = AnalysisPipeline::from_config(&config, Arc::new(StaticGateway::new("")));
    let document = pipeline
        .extract_upload(&filename, &data)
        .map_err(|e| anyhow::anyhow!("{} ({})", e, e.kind()))?;

    let text = if args.full {
        document.text.as_str()
    } else {
        document.preview(args.chars.unwrap_or(config.upload.preview_chars))
    };

    eprintln!(
        "{} {} ({}, {} characters)",
        style("ℹ").blue(),
        filename,
        document.source_format,
        document.text.chars().count()
    );
    println!("{}", text);

    Ok(())
}
