//! Lines command - print the reconstructed line sequence of a PDF.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;

use fapiao_core::layout::LineMerger;
use fapiao_core::pdf::{PageTextSource, PdfTokenSource};
use fapiao_core::pipeline::{document_lines, page_lines};

use super::load_config;

/// Arguments for the lines command.
#[derive(Args)]
pub struct LinesArgs {
    /// Input PDF file
    #[arg(required = true)]
    input: PathBuf,

    /// Largest horizontal gap that still merges two fragments
    #[arg(long)]
    x_tolerance: Option<f64>,

    /// Vertical bucket size used to group fragments into lines
    #[arg(long)]
    y_tolerance: Option<f64>,

    /// Only print this page (1-indexed)
    #[arg(short, long)]
    page: Option<u32>,
}

pub async fn run(args: LinesArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let mut merger = LineMerger::from_config(&config.layout);
    if let Some(x) = args.x_tolerance {
        merger = merger.with_x_tolerance(x);
    }
    if let Some(y) = args.y_tolerance {
        merger = merger.with_y_tolerance(y);
    }

    let data = fs::read(&args.input)?;
    let source = PdfTokenSource::load(&data, &config.pdf.password)?;

    let lines = match args.page {
        Some(page) => page_lines(&source, &merger, page)?,
        None => document_lines(&source, &merger, config.pdf.max_pages)?,
    };

    for line in &lines {
        println!("{}", line);
    }

    eprintln!(
        "{} {} lines from {} pages",
        style("ℹ").blue(),
        lines.len(),
        source.page_count()
    );

    Ok(())
}
