//! Rename command - copy invoices under names built from their fields.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use console::style;
use tracing::{debug, warn};

use fapiao_core::naming::{details_listing, numbered, InvoiceFilename};

use super::batch::{find_pdfs, process_files};
use super::load_config;

#[derive(Args)]
pub struct RenameArgs {
    /// Glob pattern matching the input PDFs
    #[arg(required = true)]
    input: String,

    /// Directory receiving the renamed copies
    #[arg(short, long, required = true)]
    output_dir: PathBuf,

    /// Claimant name used as the first name segment
    #[arg(long)]
    claimant: Option<String>,

    /// Skip files that fail instead of stopping
    #[arg(long)]
    continue_on_error: bool,
}

pub async fn run(args: RenameArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    let Some(claimant) = args.claimant.or_else(|| config.naming.claimant.clone()) else {
        anyhow::bail!("No claimant given. Pass --claimant or set naming.claimant in the config.");
    };

    let files = find_pdfs(&args.input)?;
    fs::create_dir_all(&args.output_dir)?;

    let results = process_files(&files, &config, args.continue_on_error)?;
    let namer = InvoiceFilename::new(claimant, config.naming.separator.clone());

    let mut taken = HashSet::new();
    let mut names = Vec::new();

    for result in &results {
        let Some(fields) = &result.fields else {
            warn!("Skipping {}", result.path.display());
            continue;
        };

        if !fields.is_complete() {
            warn!(
                "{} is missing {}",
                result.path.display(),
                fields.missing_fields().join(", ")
            );
        }

        let name = unique_name(&args.output_dir, &namer.render(fields), &mut taken);
        let target = args.output_dir.join(&name);
        fs::copy(&result.path, &target)?;
        debug!("Copied {} -> {}", result.path.display(), target.display());
        names.push(name);
    }

    let details_path = args.output_dir.join(&config.naming.details_file);
    fs::write(&details_path, details_listing(&names))?;

    println!(
        "{} Renamed {} of {} files into {}",
        style("✓").green(),
        names.len(),
        results.len(),
        args.output_dir.display()
    );
    println!(
        "{} Details written to {}",
        style("✓").green(),
        details_path.display()
    );

    Ok(())
}

/// Pick a name not used in this run nor present in `dir`.
fn unique_name(dir: &Path, name: &str, taken: &mut HashSet<String>) -> String {
    let free = |candidate: &str, taken: &HashSet<String>| {
        !taken.contains(candidate) && !dir.join(candidate).exists()
    };

    let mut candidate = name.to_string();
    let mut n = 1;
    while !free(&candidate, taken) {
        candidate = numbered(name, n);
        n += 1;
    }

    taken.insert(candidate.clone());
    candidate
}
