//! CLI application for Chinese tax-invoice field extraction and renaming.

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{batch, config, extract, lines, rename};

/// fapiao - Read date, code and amount from Chinese tax-invoice PDFs
#[derive(Parser)]
#[command(name = "fapiao")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract fields from a single invoice PDF
    Extract(extract::ExtractArgs),

    /// Print the reconstructed text lines of a PDF
    Lines(lines::LinesArgs),

    /// Extract fields from multiple invoice PDFs
    Batch(batch::BatchArgs),

    /// Copy invoices under names built from their fields
    Rename(rename::RenameArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

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

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Extract(args) => extract::run(args, config_path).await,
        Commands::Lines(args) => lines::run(args, config_path).await,
        Commands::Batch(args) => batch::run(args, config_path).await,
        Commands::Rename(args) => rename::run(args, config_path).await,
        Commands::Config(args) => config::run(args, config_path).await,
    }
}
