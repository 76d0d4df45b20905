use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{error, info, warn, Level};
use tracing_subscriber::EnvFilter;

use servicemap::common;
use servicemap::config::EditorConfig;
use servicemap::export::{self, ExportFormat};
use servicemap::graph;
use servicemap::parser::{self, ParseOutcome};

#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    #[clap(short, long, global = true)]
    log_level: Option<String>,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a service-architecture CSV and report diagnostics
    Parse {
        file: String,
        /// Print the parsed element collection as JSON
        #[clap(long)]
        json: bool,
    },
    /// Parse a CSV and re-render the collection in another format
    Export {
        file: String,
        #[clap(short, long)]
        output: String,
        #[clap(short, long, value_enum, default_value_t = OutputFormat::Csv)]
        format: OutputFormat,
    },
    /// Write a default editor configuration file
    Init {
        #[clap(short, long, default_value = "servicemap.yaml")]
        config: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OutputFormat {
    Csv,
    Json,
}

impl From<OutputFormat> for ExportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Csv => ExportFormat::Csv,
            OutputFormat::Json => ExportFormat::Json,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    setup_logging(&args.log_level);

    match args.command {
        Commands::Parse { file, json } => {
            let outcome = ingest(&file).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome.elements)?);
            }
        }
        Commands::Export {
            file,
            output,
            format,
        } => {
            let outcome = ingest(&file).await?;
            let rendered = export::render(&outcome.elements, format.into())?;
            common::write_string_to_file(&output, &rendered)?;
            info!("Exported {} element(s) to {}", outcome.elements.len(), output);
        }
        Commands::Init { config } => {
            let content = EditorConfig::default().to_yaml()?;
            common::write_string_to_file(&config, &content)?;
            info!("Wrote default configuration to {}", config);
        }
    }

    Ok(())
}

async fn ingest(file: &str) -> Result<ParseOutcome> {
    let content = std::fs::read_to_string(file)?;
    let outcome = parser::parse_async(content).await;

    if let Some(kind) = &outcome.error_kind {
        error!("Could not load diagram data: {}", kind);
        for hint in &outcome.hints {
            error!("  {}", hint);
        }
        anyhow::bail!("CSV validation failed: {}", kind);
    }

    if outcome.skipped_count > 0 {
        warn!(
            "Skipped {} row(s) missing 'id' or 'name' values",
            outcome.skipped_count
        );
    }
    for hint in &outcome.hints {
        warn!("{}", hint);
    }
    info!("{}", graph::stats(&outcome.elements));

    Ok(outcome)
}

fn setup_logging(log_level: &Option<String>) {
    let log_level = match log_level
        .as_ref()
        .unwrap_or(&"info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(log_level.to_string()))
        .without_time()
        .init();
}
