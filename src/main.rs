//! Deal Radar — Binary Entrypoint
//! One-shot pipeline run: fetch the configured trade feeds, extract deals,
//! grade broadcasters, write the snapshot, print the summary.
//!
//! See `README.md` for quickstart and `config/radar.toml` for the defaults.

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use deal_radar::cli::Cli;
use deal_radar::config::{GradingConfig, RadarConfig};
use deal_radar::extract::DealExtractor;
use deal_radar::ingest::providers::RssSource;
use deal_radar::ingest::types::DocumentSource;
use deal_radar::lexicon::Lexicon;
use deal_radar::pipeline;
use deal_radar::store::memory::MemoryStore;
use deal_radar::store::snapshot::JsonFileSink;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("deal_radar=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

async fn run(args: Cli) -> Result<()> {
    let config = RadarConfig::load(args.config.as_deref())?;
    let sources_cfg = config.select_sources(args.source_subset())?;

    let lexicon = Lexicon::load(config.lexicon_path.as_deref())?;
    let extractor = DealExtractor::with_default_tagger(lexicon);
    let grading_cfg = GradingConfig::load(config.grading_path.as_deref())?;

    let client = reqwest::Client::builder()
        .user_agent(concat!("deal-radar/", env!("CARGO_PKG_VERSION")))
        .timeout(std::time::Duration::from_secs(30))
        .build()?;
    let sources: Vec<Box<dyn DocumentSource>> = sources_cfg
        .iter()
        .map(|s| {
            Box::new(RssSource::new(&s.name, &s.feed_url, client.clone()))
                as Box<dyn DocumentSource>
        })
        .collect();

    let store_path = args.store.unwrap_or(config.store_path);
    let snapshot_path = args.snapshot.unwrap_or(config.snapshot_path);
    let store = MemoryStore::open(&store_path).await?;
    let sink = JsonFileSink::new(&snapshot_path);

    let limit = args.limited.then_some(config.limited_cap);
    if let Some(cap) = limit {
        info!(cap, "limited mode enabled");
    }

    let report = pipeline::run(&sources, &extractor, &grading_cfg, &store, &sink, limit).await?;

    info!(
        documents = report.documents,
        candidates = report.candidates,
        inserted = report.upserts.inserted,
        updated = report.upserts.updated,
        failed = report.upserts.failed,
        graded = report.graded,
        "run complete"
    );
    if !report.summary.is_empty() {
        println!("{}", report.summary);
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    init_tracing();

    let args = Cli::parse();
    if let Err(e) = run(args).await {
        error!(error = ?e, "run failed");
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
