//! CLI driver: feeds a decoded text file (or stdin) to the extraction
//! engine and prints the serialized record. Format decoding happens
//! upstream; this binary only reads plain text.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use engine::{Engine, EngineConfig, OutputFormat, ParseInput, SourceFormat};

#[derive(Parser, Debug)]
#[command(name = "engine", about = "Parse resume text into a structured record")]
struct Cli {
    /// Path to the decoded resume text, or '-' for stdin
    input: String,

    /// Output format
    #[arg(long, value_enum, default_value = "json")]
    format: Format,

    /// Include confidence scores, source spans, and warnings (JSON only)
    #[arg(long)]
    verbose: bool,

    /// Optional JSON config file (synonym tables, gazetteer, thresholds)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the extraction time budget in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Run extractor families sequentially instead of concurrently
    #[arg(long)]
    sequential: bool,

    /// Hint describing which decoder produced the text
    #[arg(long, value_enum, default_value = "unknown")]
    source: FormatHint,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Csv,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatHint {
    Pdf,
    Docx,
    Text,
    Unknown,
}

impl From<FormatHint> for SourceFormat {
    fn from(hint: FormatHint) -> Self {
        match hint {
            FormatHint::Pdf => SourceFormat::Pdf,
            FormatHint::Docx => SourceFormat::Docx,
            FormatHint::Text => SourceFormat::PlainText,
            FormatHint::Unknown => SourceFormat::Unknown,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("engine=warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config =
        EngineConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(timeout_ms) = cli.timeout_ms {
        config.timeout_ms = timeout_ms;
    }
    if cli.sequential {
        config.parallel = false;
    }

    let text = read_input(&cli.input)?;
    info!(bytes = text.len(), "input read");

    let engine = Engine::new(config);
    let report = engine
        .parse(ParseInput::with_format(text, cli.source.into()))
        .await?;

    let format = match cli.format {
        Format::Json => OutputFormat::Json,
        Format::Csv => OutputFormat::Csv,
    };
    let output = engine::render(&report, format, cli.verbose)?;
    println!("{output}");

    Ok(())
}

/// Reads the decoded text payload. An unreadable or non-UTF-8 file is the
/// upstream decoder's failure mode, reported before the engine runs.
fn read_input(path: &str) -> Result<String> {
    if path == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read stdin")?;
        Ok(buffer)
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to decode input file '{path}' as UTF-8 text"))
    }
}
