use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use ledgerbook_observability::{LogFormat, ObservabilityConfig};
use ledgerbook_reports::{BookInput, ReportConfig, StatementService};

/// Compute a statement or an account ledger from a book input file.
#[derive(Debug, Parser)]
#[command(name = "ledgerbook-report", version)]
struct Args {
    /// Book input (chart records, chart metadata, openings, vouchers) as JSON.
    #[arg(long)]
    input: PathBuf,

    /// Report configuration JSON; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the ledger of this account code instead of the statement.
    #[arg(long, value_name = "CODE")]
    ledger: Option<String>,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pretty: bool,

    /// Human-readable log lines on stderr instead of JSON.
    #[arg(long)]
    pretty_logs: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if args.pretty_logs {
        ledgerbook_observability::init_with(&ObservabilityConfig {
            format: LogFormat::Pretty,
            ..ObservabilityConfig::default()
        });
    } else {
        ledgerbook_observability::init();
    }

    let config = match &args.config {
        Some(path) => ReportConfig::from_json_file(path)?,
        None => ReportConfig::default(),
    }
    .apply_env()
    .context("invalid environment override")?;
    let service = StatementService::new(config)?;

    let raw = std::fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let input: BookInput = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse {}", args.input.display()))?;

    let output = match &args.ledger {
        Some(code) => serde_json::to_value(service.ledger(&input, code)?)?,
        None => serde_json::to_value(service.run(&input)?)?,
    };

    let text = if args.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{text}");
    Ok(())
}
