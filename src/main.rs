use anyhow::{Context, Result, bail};
use chonkie_code::{ChunkInput, ChunkOutput, ChunkerConfig, CodeChunk, CodeChunker, collect_sources};
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

/// Chunk source files with the Chonkie code chunking API.
#[derive(Debug, Parser)]
#[command(name = "chonkie-code", version, about)]
struct Cli {
    /// Files or directories to chunk
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Tokenizer or token counter used to size chunks
    #[arg(long, default_value = ChunkerConfig::DEFAULT_TOKENIZER)]
    tokenizer: String,

    /// Maximum tokens per chunk
    #[arg(long, default_value_t = ChunkerConfig::DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// Language of the code, or "auto"
    #[arg(long, default_value = "auto")]
    language: String,

    /// API key (defaults to $CHONKIE_API_KEY)
    #[arg(long)]
    api_key: Option<String>,

    /// Service base URL
    #[arg(long, default_value = ChunkerConfig::DEFAULT_BASE_URL)]
    base_url: String,

    /// Request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Print chunks as JSON instead of a summary
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct FileChunks<'a> {
    path: String,
    language: Option<&'a str>,
    chunks: Vec<CodeChunk>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let start_time = Instant::now();

    let sources = collect_sources(&cli.paths).context("Failed to collect source files")?;
    if sources.is_empty() {
        bail!("No source files found");
    }

    let mut config = ChunkerConfig::new()
        .tokenizer_or_token_counter(cli.tokenizer)
        .chunk_size(cli.chunk_size)
        .language(cli.language)
        .base_url(cli.base_url);
    if let Some(key) = cli.api_key {
        config = config.api_key(key);
    }
    if let Some(secs) = cli.timeout_secs {
        config = config.timeout(Duration::from_secs(secs));
    }

    let chunker = CodeChunker::connect(config).context("Failed to connect to the chunking service")?;

    let input = if sources.len() == 1 {
        ChunkInput::Single(sources[0].content.clone())
    } else {
        ChunkInput::Batch(sources.iter().map(|s| s.content.clone()).collect())
    };

    let per_file = match chunker.chunk(input).context("Chunking request failed")? {
        ChunkOutput::Single(chunks) => vec![chunks],
        ChunkOutput::Batch(batches) => batches,
    };

    let results: Vec<FileChunks> = sources
        .iter()
        .zip(per_file)
        .map(|(source, chunks)| FileChunks {
            path: source.path.display().to_string(),
            language: source.language,
            chunks,
        })
        .collect();

    if cli.json {
        let out = serde_json::to_string_pretty(&results).context("Failed to serialize chunks")?;
        println!("{}", out);
        return Ok(());
    }

    let mut total_chunks = 0;
    let mut total_tokens = 0;
    for file in &results {
        let tokens: usize = file.chunks.iter().map(|c| c.token_count).sum();
        println!(
            "  {} [{}] - {} chunks, {} tokens",
            file.path,
            file.language.unwrap_or("unknown"),
            file.chunks.len(),
            tokens
        );
        total_chunks += file.chunks.len();
        total_tokens += tokens;
    }

    println!(
        "\n✓ {} files, {} chunks, {} tokens [{:.2}s]",
        results.len(),
        total_chunks,
        total_tokens,
        start_time.elapsed().as_secs_f64()
    );

    Ok(())
}
