//! Batch command - process multiple document files.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, warn};

use navex_core::{DocumentRecord, ExtractionEngine, ExtractionResult, ExtractionStatus};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory for per-document JSON results
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Process at most N documents
    #[arg(short, long)]
    limit: Option<usize>,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = super::load_config(config_path)?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            ext.eq_ignore_ascii_case("txt")
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    // Unreadable files become empty documents so the engine reports them
    // as failed instead of aborting the batch.
    let documents: Vec<DocumentRecord> = files
        .iter()
        .map(|path| {
            let nom = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("document.txt");
            match fs::read_to_string(path) {
                Ok(texte) => DocumentRecord::from_text(nom, texte),
                Err(e) => {
                    warn!("Failed to read {}: {}", path.display(), e);
                    DocumentRecord::from_text(nom, "")
                }
            }
        })
        .collect();

    let engine = ExtractionEngine::new(config)?;

    let take = args.limit.unwrap_or(documents.len()).min(documents.len());
    let pb = ProgressBar::new(take as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
            .unwrap()
            .progress_chars("=>-"),
    );

    let mut results = Vec::with_capacity(take);
    for document in documents.iter().take(take) {
        results.push(engine.extract(document));
        pb.inc(1);
    }
    pb.finish_with_message("Complete");

    if let Some(ref output_dir) = args.output_dir {
        for result in &results {
            let stem = result
                .nom_fichier
                .strip_suffix(".txt")
                .unwrap_or(&result.nom_fichier);
            let output_path = output_dir.join(format!("{}.json", stem));
            fs::write(&output_path, serde_json::to_string_pretty(result)?)?;
            debug!("Wrote output to {}", output_path.display());
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    print_recap(&results, start.elapsed());

    Ok(())
}

fn print_recap(results: &[ExtractionResult], elapsed: std::time::Duration) {
    let count = |status: ExtractionStatus| results.iter().filter(|r| r.status == status).count();
    let failed: Vec<_> = results
        .iter()
        .filter(|r| r.status == ExtractionStatus::Failed)
        .collect();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        elapsed
    );
    println!(
        "   {} success, {} partial, {} skipped, {} failed",
        style(count(ExtractionStatus::Success)).green(),
        style(count(ExtractionStatus::Partial)).yellow(),
        style(count(ExtractionStatus::Skipped)).blue(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.nom_fichier,
                result
                    .raison_reference_originale
                    .as_deref()
                    .unwrap_or("unknown error")
            );
        }
    }
}

fn write_summary(path: &PathBuf, results: &[ExtractionResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "document_type",
        "strategy",
        "n_sysi",
        "nom_bapteme",
        "position",
        "nature_support",
        "confidence",
        "nombre_aides",
        "voir_document_original",
        "warnings",
    ])?;

    for result in results {
        wtr.write_record([
            result.nom_fichier.as_str(),
            result.status.as_str(),
            result.type_document.as_str(),
            result.strategy.as_str(),
            result.aide.n_sysi.as_deref().unwrap_or(""),
            result.aide.nom_bapteme.as_deref().unwrap_or(""),
            result.aide.position.as_deref().unwrap_or(""),
            result.aide.nature_support.as_deref().unwrap_or(""),
            &format!("{:.2}", result.confidence),
            &result.nombre_aides.to_string(),
            &result.voir_document_original.to_string(),
            &result.warnings.join("; "),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
