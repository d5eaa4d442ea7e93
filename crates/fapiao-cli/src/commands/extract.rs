//! Extract command - read date, code and amount from a single invoice PDF.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use fapiao_core::invoice::ExtractionResult;
use fapiao_core::models::invoice::InvoiceFields;
use fapiao_core::parse_invoice_pdf;

use super::{is_pdf, load_config};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input PDF file
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Reference year used to tell codes from dates (default: current year)
    #[arg(long)]
    year: Option<i32>,

    /// Show which strategy produced each field
    #[arg(long)]
    show_sources: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    /// File extension for per-file outputs.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if let Some(year) = args.year {
        config.extraction.reference_year = Some(year);
    }

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }
    if !is_pdf(&args.input) {
        anyhow::bail!("Unsupported file format: {}", args.input.display());
    }

    info!("Extracting from {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message("Reading PDF...");

    let data = fs::read(&args.input)?;
    let result = parse_invoice_pdf(&data, &config)?;

    pb.finish_and_clear();

    for warning in &result.warnings {
        eprintln!("{} {}", style("⚠").yellow(), warning);
    }

    let output = format_fields(&result.fields, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.show_sources {
        print_sources(&result);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn print_sources(result: &ExtractionResult) {
    println!();
    for source in &result.sources {
        println!(
            "{} {}: {} (confidence {:.0}%)",
            style("ℹ").blue(),
            source.field,
            source.strategy,
            source.confidence * 100.0
        );
    }
    println!(
        "{} Processing time: {}ms",
        style("ℹ").blue(),
        result.processing_time_ms
    );
}

/// Render extracted fields in the requested format.
pub fn format_fields(fields: &InvoiceFields, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(fields)?),
        OutputFormat::Csv => format_csv(fields),
        OutputFormat::Text => Ok(format_text(fields)),
    }
}

fn format_csv(fields: &InvoiceFields) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["date", "code", "money"])?;
    wtr.write_record([
        fields.date.as_deref().unwrap_or_default(),
        fields.code.as_deref().unwrap_or_default(),
        fields.money.as_deref().unwrap_or_default(),
    ])?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(fields: &InvoiceFields) -> String {
    let show = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());

    let mut output = String::new();
    output.push_str(&format!("Date:   {}\n", show(&fields.date)));
    output.push_str(&format!("Code:   {}\n", show(&fields.code)));
    output.push_str(&format!("Amount: {}\n", show(&fields.money)));
    output
}
