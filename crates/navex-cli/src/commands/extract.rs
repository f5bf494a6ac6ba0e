//! Extract command - process a single document file.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use navex_core::{DocumentRecord, ExtractionEngine, ExtractionResult};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input text file
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Show extraction confidence and warnings
    #[arg(long)]
    show_confidence: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Plain text summary
    Text,
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let texte = fs::read_to_string(&args.input)?;
    let nom_fichier = args
        .input
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("document.txt");

    let engine = ExtractionEngine::new(config)?;
    let result = engine.extract(&DocumentRecord::from_text(nom_fichier, texte));

    let output = format_result(&result, args.format)?;

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

    if args.show_confidence {
        println!();
        println!(
            "{} Confidence: {:.1}%",
            style("ℹ").blue(),
            result.confidence * 100.0
        );
        for warning in &result.warnings {
            println!("{} {}", style("!").yellow(), warning);
        }
    }

    Ok(())
}

pub fn format_result(result: &ExtractionResult, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
        OutputFormat::Text => Ok(format_result_text(result)),
    }
}

pub fn format_result_text(result: &ExtractionResult) -> String {
    let mut out = String::new();
    out.push_str(&format!("Fichier      : {}\n", result.nom_fichier));
    out.push_str(&format!("Type         : {}\n", result.type_document));
    out.push_str(&format!("Stratégie    : {}\n", result.strategy));
    out.push_str(&format!("Statut       : {}\n", result.status));
    out.push_str(&format!("Confiance    : {:.2}\n", result.confidence));
    out.push_str(&format!("Nb aides     : {}\n", result.nombre_aides));

    let aide = &result.aide;
    let mut field = |label: &str, value: Option<&str>| {
        if let Some(v) = value {
            out.push_str(&format!("{:<13}: {}\n", label, v));
        }
    };
    field("N° SYSI", aide.n_sysi.as_deref());
    field("Nom", aide.nom_bapteme.as_deref());
    field("Position", aide.position.as_deref());
    field("Support", aide.nature_support.as_deref());
    field("Marque", aide.marque.as_deref());
    field("Fonction", aide.fonction.as_deref());

    if result.voir_document_original {
        if let Some(raison) = &result.raison_reference_originale {
            out.push_str(&format!("Référence    : {}\n", raison));
        }
    }

    out
}
