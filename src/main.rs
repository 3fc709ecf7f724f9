use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chunk_summarizer::{ensure_single_stdin, CliOverrides, Config, SummaryPipeline, TextSource};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "summarize")]
#[command(about = "Summarize long text in token-bounded, context-chained chunks", long_about = None)]
struct Cli {
    /// Text to summarize
    #[arg(long, conflicts_with = "content_file")]
    content: Option<String>,

    /// File to summarize, `-` for stdin (the default when no content is given)
    #[arg(short = 'f', long)]
    content_file: Option<String>,

    /// API key for the completion service
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// File holding the API key, `-` for stdin; takes precedence over --api-key
    #[arg(long)]
    api_key_file: Option<String>,

    /// Line delimiter; `\n` and `\t` escapes are understood
    #[arg(short, long)]
    delimiter: Option<String>,

    /// Token budget per chunk
    #[arg(short = 's', long)]
    chunk_size: Option<usize>,

    /// Model identifier
    #[arg(short, long)]
    model: Option<String>,

    /// Chat completions endpoint
    #[arg(long)]
    endpoint: Option<String>,

    /// Summarize chunks independently instead of chaining summaries
    #[arg(long, default_value_t = false)]
    independent: bool,

    /// Configuration file (defaults to ./summarize.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log progress to stderr
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "chunk_summarizer=debug,summarize=debug"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            model: self.model.clone(),
            delimiter: self.delimiter.clone(),
            chunk_size: self.chunk_size,
            endpoint: self.endpoint.clone(),
            independent: self.independent,
            api_key: self.api_key.clone(),
            api_key_source: self.api_key_file.as_deref().map(TextSource::from_reference),
        }
    }

    fn content_source(&self) -> TextSource {
        match (&self.content, &self.content_file) {
            (Some(text), _) => TextSource::Inline(text.clone()),
            (None, Some(reference)) => TextSource::from_reference(reference),
            (None, None) => TextSource::Stdin,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let source = cli.content_source();
    let overrides = cli.overrides();
    if let Some(key_source) = &overrides.api_key_source {
        ensure_single_stdin(&[&source, key_source])?;
    }

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let config = overrides.apply(config)?;

    let counter = Arc::new(config.token_counter());
    let pipeline = SummaryPipeline::from_config(&config, counter)?;

    let content = source.resolve()?;
    info!(
        "Summarizing {} bytes from {} with {}",
        content.len(),
        source.describe(),
        config.model
    );

    let summary = pipeline.run(&content).await.context("Summarization failed")?;
    println!("{}", summary);

    Ok(())
}
