//! Engagement letter CLI
//!
//! Logs go to stderr; `generate` prints a JSON summary and `inspect` the
//! document outline on stdout.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use letter_cli::config::Config;
use letter_cli::{render_outline, run_generate, run_inspect, GenerateRequest};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "letter")]
#[command(version, about = "Generate engagement letters from questionnaire answers")]
struct Args {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Select a template for a case and merge its keywords
    Generate {
        /// JSON catalog of questionnaires, templates and replacements
        #[arg(long)]
        catalog: PathBuf,

        /// JSON case file with the questionnaire id and answers
        #[arg(long)]
        case: PathBuf,

        /// Template root directory (overrides the config file)
        #[arg(long)]
        templates_dir: Option<PathBuf>,

        /// Output file (defaults to the template name in the output directory)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Print the paragraphs and tables of a .docx
    Inspect {
        document: PathBuf,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    match args.command {
        Command::Generate {
            catalog,
            case,
            templates_dir,
            out,
        } => {
            if let Some(dir) = templates_dir {
                config.templates.dir = dir;
            }
            let request = GenerateRequest { catalog, case, out };
            let (letter, path) = run_generate(&config, &request)?;

            let summary = serde_json::json!({
                "path": path.display().to_string(),
                "letter": letter,
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&summary).context("Failed to encode summary")?
            );
        }
        Command::Inspect { document, json } => {
            let blocks = run_inspect(&document)?;
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&blocks).context("Failed to encode outline")?
                );
            } else {
                print!("{}", render_outline(&blocks));
            }
        }
    }

    Ok(())
}
