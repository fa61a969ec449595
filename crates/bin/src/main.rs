//! `sec-statements` CLI binary.
//!
//! Extracts multi-period financial statements for a ticker and writes them
//! as XLSX and/or CSV files.

use anyhow::{Context, Result};
use clap::Parser;
use statements::{
    DEFAULT_USER_AGENT, EdgarConfig, FilingCategory, OutputFormat, StatementReport,
    StatementRequest, StatementsPipeline,
};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "sec-statements")]
#[command(about = "Financial statements from SEC Financial Statement Data Sets", long_about = None)]
#[command(version)]
struct Cli {
    /// Ticker symbol, e.g. AAPL
    ticker: String,

    /// Filing frequency: annual (10-K) or quarterly (10-Q)
    #[arg(long, default_value = "annual")]
    frequency: FilingCategory,

    /// Years of history
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..=5))]
    years: u32,

    /// Output formats (xlsx, csv)
    #[arg(long = "format", value_delimiter = ',', default_values = ["xlsx", "csv"])]
    formats: Vec<OutputFormat>,

    /// Directory the files are written to
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// User agent sent to the SEC; must identify you with a contact address
    #[arg(long, env = "SEC_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    user_agent: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 120)]
    timeout: u64,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Cli::parse()).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config =
        EdgarConfig::new(cli.user_agent).with_timeout(Duration::from_secs(cli.timeout));
    let pipeline = StatementsPipeline::from_config(config)?;

    let request =
        StatementRequest::new(cli.ticker, cli.frequency, cli.years).with_formats(cli.formats);

    println!(
        "Fetching {} {} filings for the last {} year(s)...",
        request.ticker.trim().to_uppercase(),
        request.category,
        request.years
    );
    let report = pipeline.run(&request).await?;

    print_summary(&report);
    write_artifacts(&report, &request.formats, &cli.output_dir)?;
    Ok(())
}

fn print_summary(report: &StatementReport) {
    println!();
    println!(
        "{} ({}) CIK {}",
        report.company.name, report.company.symbol, report.company.cik
    );

    println!();
    println!("{:<22} {:<6} {:<12} {:<12}", "Accession", "Form", "Period", "Filed");
    for filing in &report.filings {
        println!(
            "{:<22} {:<6} {:<12} {:<12}",
            filing.accession,
            filing.category.form(),
            filing.period_label(),
            filing.filed.map(|d| d.to_string()).unwrap_or_default()
        );
    }

    println!();
    for (statement, rows) in report.row_counts() {
        println!("{statement}: {rows} records");
    }
}

fn write_artifacts(report: &StatementReport, formats: &[OutputFormat], dir: &Path) -> Result<()> {
    let artifacts = report.export(formats)?;
    if artifacts.is_empty() {
        println!("No statement data to export");
        return Ok(());
    }

    std::fs::create_dir_all(dir)
        .with_context(|| format!("creating output directory {}", dir.display()))?;

    println!();
    for artifact in artifacts {
        let path = dir.join(&artifact.file_name);
        std::fs::write(&path, &artifact.bytes)
            .with_context(|| format!("writing {}", path.display()))?;
        info!(
            path = %path.display(),
            mime = %artifact.mime_type,
            bytes = artifact.bytes.len(),
            "Wrote artifact"
        );
        println!("Wrote {}", path.display());
    }
    Ok(())
}
