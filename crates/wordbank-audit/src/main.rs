use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;
use wordbank_consensus::{EngineConfig, Pipeline};
use wordbank_pos::Lexicon;

use wordbank_audit::{AppState, read_manual_batches, read_sources, router, write_outputs};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_OUTDIR: &str = "wordbank_out";

#[derive(Parser)]
#[command(name = "wordbank")]
#[command(about = "Build POS-audited wordbanks from extracted vocabulary book rows")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate, triage and confirm source rows; write checkpoints and reviewer batches.
    Build {
        /// Source rows: a `.jsonl` file or a directory of them.
        #[arg(long, env = "WORDBANK_SOURCES")]
        sources: PathBuf,
        #[arg(long, env = "WORDBANK_OUTDIR", default_value = DEFAULT_OUTDIR)]
        out_dir: PathBuf,
        /// Directory of reviewed `POS_MANUAL_BATCH_*.jsonl` files to apply.
        #[arg(long, env = "WORDBANK_MANUAL_BATCHES_DIR")]
        manual_batches_dir: Option<PathBuf>,
        #[arg(long, env = "WORDBANK_LEXICON_DIR")]
        lexicon_dir: Option<PathBuf>,
        #[arg(long, env = "WORDBANK_BATCH_COUNT", default_value_t = 10)]
        batch_count: usize,
    },
    /// Classify a single headword.
    Classify {
        headword: String,
        gloss: Option<String>,
        #[arg(long, env = "WORDBANK_LEXICON_DIR")]
        lexicon_dir: Option<PathBuf>,
    },
    /// Serve the classification API.
    Serve {
        #[arg(long, env = "HOST", default_value = DEFAULT_HOST)]
        host: String,
        #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
        port: u16,
        #[arg(long, env = "WORDBANK_LEXICON_DIR")]
        lexicon_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    match Cli::parse().command {
        Commands::Build {
            sources,
            out_dir,
            manual_batches_dir,
            lexicon_dir,
            batch_count,
        } => build(
            &sources,
            &out_dir,
            manual_batches_dir.as_deref(),
            lexicon_dir.as_deref(),
            batch_count,
        ),
        Commands::Classify {
            headword,
            gloss,
            lexicon_dir,
        } => {
            let pipeline = load_pipeline(lexicon_dir.as_deref(), None)?;
            let gloss = gloss.unwrap_or_default();
            let result = pipeline.classifier().infer_pos(&headword, &gloss);
            println!(
                "{}\t{}\t{}\t{}",
                headword, result.pos, result.confidence, result.evidence
            );
            Ok(())
        }
        Commands::Serve {
            host,
            port,
            lexicon_dir,
        } => serve(&host, port, lexicon_dir.as_deref()).await,
    }
}

fn load_pipeline(lexicon_dir: Option<&Path>, batch_count: Option<usize>) -> Result<Pipeline> {
    let mut config = EngineConfig::default();
    if let Some(dir) = lexicon_dir {
        info!("using lexicon overrides from {}", dir.display());
        config.lexicon = Lexicon::load(dir)?;
    }
    if let Some(count) = batch_count {
        config.batch_count = count;
    }
    Ok(Pipeline::new(config))
}

fn build(
    sources: &Path,
    out_dir: &Path,
    manual_batches_dir: Option<&Path>,
    lexicon_dir: Option<&Path>,
    batch_count: usize,
) -> Result<()> {
    let pipeline = load_pipeline(lexicon_dir, Some(batch_count))?;

    let start = Instant::now();
    let records = read_sources(sources)
        .with_context(|| format!("read sources from {}", sources.display()))?;
    let decisions = match manual_batches_dir {
        Some(dir) => read_manual_batches(dir)?,
        None => Vec::new(),
    };

    let run = pipeline.run(&records, &decisions);
    write_outputs(out_dir, &run)?;
    info!(
        "built {} entries in {} ms",
        run.final_entries().len(),
        start.elapsed().as_millis()
    );
    if !run.integrity.passed() {
        anyhow::bail!("integrity check failed; see {}", out_dir.join("integrity.json").display());
    }
    Ok(())
}

async fn serve(host: &str, port: u16, lexicon_dir: Option<&Path>) -> Result<()> {
    info!("binding to {}:{}", host, port);
    let state = AppState {
        pipeline: Arc::new(load_pipeline(lexicon_dir, None)?),
    };
    let app = router(state).layer(TraceLayer::new_for_http());
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .with_context(|| format!("invalid listen address {host}:{port}"))?;
    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let max_level = env_filter
        .max_level_hint()
        .and_then(|hint| hint.into_level())
        .unwrap_or(Level::INFO);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_level(true)
        .with_max_level(max_level)
        .init();
}
