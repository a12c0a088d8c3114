//! One generation cycle from the command line: fetch, score, rank, log, print.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use asset_insight::{
    analyze::join_tags,
    config::AppConfig,
    engine::{generate_batch, load_trend},
    history::{CsvHistoryStore, HistoryStore},
    ingest::providers::sources_from_urls,
    rank::{select_view, ViewMode},
    sentiment::LexiconScorer,
    telemetry,
    trend::default_window,
};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "insight-once", about = "Generate one batch of asset insight cards")]
struct Args {
    /// Config file (defaults to $INSIGHT_CONFIG_PATH, then config/insight.toml)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Items taken from each feed
    #[arg(long)]
    per_source: Option<usize>,
    /// Cards printed after ranking/filtering
    #[arg(long)]
    top_k: Option<usize>,
    /// Only print high-impact cards
    #[arg(long)]
    high_impact: bool,
    /// Do not append this batch to the history log
    #[arg(long)]
    no_history: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    telemetry::init_tracing();
    let args = Args::parse();

    let cfg = match &args.config {
        Some(p) => AppConfig::load_from_file(p)?,
        None => AppConfig::load_default()?,
    };
    let per_source = args.per_source.unwrap_or(cfg.defaults.per_source);
    let top_k = args.top_k.unwrap_or(cfg.defaults.top_k);
    let view = if args.high_impact {
        ViewMode::HighImpact
    } else {
        ViewMode::All
    };

    let sources = sources_from_urls(&cfg.feeds, cfg.fetch_timeout_secs.map(Duration::from_secs))?;
    let mut store = CsvHistoryStore::open(&cfg.history_path)
        .with_context(|| format!("opening history at {}", cfg.history_path.display()))?;

    let batch = generate_batch(&sources, &LexiconScorer::new(), per_source).await;
    if !args.no_history {
        store.append(&batch).context("appending batch to history")?;
    }

    let cards = select_view(&batch, view, top_k);
    println!(
        "{} cards generated, showing {} ({:?})",
        batch.len(),
        cards.len(),
        view
    );
    for c in &cards {
        println!();
        println!("## {}", c.headline());
        println!(
            "   {} | score {:+.2} | conviction {}",
            c.label().as_str().to_uppercase(),
            c.score(),
            c.conviction().as_str()
        );
        println!("   source: {}", c.source());
        if let Some(p) = c.published() {
            println!("   published: {p}");
        }
        if !c.link().is_empty() {
            println!("   link: {}", c.link());
        }
        if !c.triggers().is_empty() {
            println!("   triggers: {}", join_tags(c.triggers(), " • "));
        }
        if !c.summary().is_empty() {
            println!("   {}", c.summary());
        }
    }

    let trend = load_trend(&store, default_window())?;
    println!();
    if trend.is_empty() {
        println!("No history in the last 24h yet.");
    } else {
        println!("Sentiment trend, last 24h (UTC):");
        for (avg, n) in trend.avg_score.iter().zip(&trend.count) {
            println!(
                "   {}  avg {:+.3}  n={}",
                avg.hour.format("%Y-%m-%d %H:00"),
                avg.value,
                n.value
            );
        }
    }
    Ok(())
}
