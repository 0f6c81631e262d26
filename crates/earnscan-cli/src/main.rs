//! CLI application for earnings document analysis.

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{analyze, batch, config, extract};

/// earnscan - Structured analysis of earnings call transcripts
#[derive(Parser)]
#[command(name = "earnscan")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a single document
    Analyze(analyze::AnalyzeArgs),

    /// Show the text extracted from a document
    Extract(extract::ExtractArgs),

    /// Analyze multiple documents
    Batch(batch::BatchArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Credentials may come from a .env file
    dotenvy::dotenv().ok();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    // Execute command
    match cli.command {
        Commands::Analyze(args) => analyze::run(args, cli.config.as_deref()).await,
        Commands::Extract(args) => extract::run(args, cli.config.as_deref()).await,
        Commands::Batch(args) => batch::run(args, cli.config.as_deref()).await,
        Commands::Config(args) => config::run(args, cli.config.as_deref()).await,
    }
}
