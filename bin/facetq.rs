use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use facetq::{CompilerSettings, InMemoryExecutor, Query, QueryCompiler, Repository};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "facetq")]
#[command(about = "Faceted query compiler and result aggregator", long_about = None)]
struct Args {
    /// Compiler settings file (JSON); defaults apply when absent
    #[arg(long, global = true, env = "FACETQ_SETTINGS")]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the backend request a query compiles to
    Compile {
        /// Abstract query file (JSON)
        #[arg(long)]
        query: PathBuf,
    },
    /// Run a query against a document set held in memory
    Search {
        /// Abstract query file (JSON)
        #[arg(long)]
        query: PathBuf,

        /// Documents file: JSON array of { "id", "type", "source" }
        #[arg(long, env = "FACETQ_DOCUMENTS")]
        documents: PathBuf,
    },
}

fn load_query(path: &Path) -> Result<Query> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading query file {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing query file {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    let settings = match &args.settings {
        Some(path) => CompilerSettings::from_path(path)
            .with_context(|| format!("loading settings {}", path.display()))?,
        None => CompilerSettings::default(),
    };
    info!(
        primary_type = %settings.primary_type,
        ranking_field = %settings.ranking_field,
        "facetq v{}",
        facetq::VERSION
    );

    match args.command {
        Command::Compile { query } => {
            let query = load_query(&query)?;
            let compiled = QueryCompiler::new(settings).compile(&query)?;
            println!("{}", serde_json::to_string_pretty(&compiled.to_dsl())?);
        }
        Command::Search { query, documents } => {
            let query = load_query(&query)?;
            let executor = InMemoryExecutor::from_path(&documents)
                .with_context(|| format!("loading documents {}", documents.display()))?;
            info!(documents = executor.len(), "Documents loaded");

            let repository = Repository::new(executor, settings);
            let result = repository.search(&query).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}
