//! Process command - extract fields from a single invoice file.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::info;

use nfsheet_core::{Extracted, decode_document, extract, parse_document};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input XML file
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: PrintFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum PrintFormat {
    /// JSON output
    Json,
    /// One `column: value` line per field
    Text,
}

pub fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<std::process::ExitCode> {
    let start = Instant::now();
    let config = super::load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let bytes = fs::read(&args.input)?;
    let doc = decode_document(&bytes)
        .and_then(|xml| parse_document(&xml))
        .map_err(|e| anyhow::anyhow!("{}: {}", args.input.display(), e))?;
    let extracted = extract(&doc).map_err(|e| anyhow::anyhow!("{}: {}", args.input.display(), e))?;

    info!(
        "Extracted {} in {}ms",
        extracted.kind(),
        start.elapsed().as_millis()
    );

    let output = match args.format {
        PrintFormat::Json => serde_json::to_string_pretty(&extracted)?,
        PrintFormat::Text => format_text(&extracted, &config.output.no_value_marker),
    };

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

    Ok(std::process::ExitCode::SUCCESS)
}

fn format_text(extracted: &Extracted, no_value: &str) -> String {
    let record = extracted.to_record();
    let mut output = format!("Schema: {}\n\n", extracted.kind());

    for (column, value) in record.iter() {
        output.push_str(&format!("{}: {}\n", column, value.render(no_value)));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERVICE: &str = include_str!("../../../nfsheet-core/tests/fixtures/nfse_cpf.xml");

    #[test]
    fn test_text_lists_every_column() {
        let doc = parse_document(SERVICE).unwrap();
        let extracted = extract(&doc).unwrap();
        let text = format_text(&extracted, "N/A");

        assert!(text.starts_with("Schema: NFS-e\n"));
        assert!(text.contains("numero: 2023000000000158\n"));
        assert!(text.contains("cpf_cnpj_tomador: 98765432100\n"));
        assert_eq!(text.lines().filter(|l| l.contains(": ")).count(), 20);
    }
}
