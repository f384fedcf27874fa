use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use stegtriage::logging::{init_tracing, init_tracing_json};
use stegtriage::strings::flags::search_custom_json;
use stegtriage::{run_full_analysis, PipelineConfig, Session};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "stegtriage", version, about = "Steganography triage for images")]
struct Cli {
    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze an image and print the unified report.
    Analyze {
        /// PNG, JPEG or BMP file.
        file: PathBuf,
        /// Directory holding session directories (default: system temp dir).
        #[arg(long)]
        workdir: Option<PathBuf>,
        /// JSON configuration overrides.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Pretty-print the report.
        #[arg(long)]
        pretty: bool,
    },
    /// Search a saved report for a custom flag pattern.
    Search {
        /// Report JSON produced by `analyze`.
        report: PathBuf,
        /// `PREFIX{}` template or a regular expression.
        pattern: String,
        /// Maximum distinct matches.
        #[arg(long, default_value_t = 50)]
        max: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if cli.json_logs {
        init_tracing_json();
    } else {
        init_tracing();
    }

    match cli.command {
        Command::Analyze {
            file,
            workdir,
            config,
            pretty,
        } => {
            let config = match config {
                Some(path) => PipelineConfig::from_json_file(&path)
                    .with_context(|| format!("loading config {}", path.display()))?,
                None => PipelineConfig::default(),
            };
            let root = workdir.unwrap_or_else(|| std::env::temp_dir().join("stegtriage"));
            let session = Session::create(&root).context("creating session")?;
            let stored = session
                .ingest_file(&file, &config.io)
                .with_context(|| format!("ingesting {}", file.display()))?;
            info!(session_id = session.id(), file = %file.display(), "starting analysis");

            let report = run_full_analysis(&stored, session, config).await?;
            let json = if pretty {
                report.to_json_pretty()?
            } else {
                report.to_json()?
            };
            println!("{}", json);
        }
        Command::Search {
            report,
            pattern,
            max,
        } => {
            let text = std::fs::read_to_string(&report)
                .with_context(|| format!("reading {}", report.display()))?;
            let matches = search_custom_json(&text, &pattern, max)?;
            println!("{}", serde_json::to_string_pretty(&matches)?);
        }
    }
    Ok(())
}
