use std::path::PathBuf;

use chrono::Utc;
use clap::Parser;
use tracing::{error, info, warn};

use podsift::episodes::RawRecord;
use podsift::output::{archive_digest, render_digest, send_digest};
use podsift::sources::{
    ApplePodcastsCollector, EpisodeCollector, ListenNotesCollector, PodcastIndexCollector,
    SpotifyCollector,
};
use podsift::{DigestConfig, Pipeline};

#[derive(Debug, Parser)]
#[command(name = "podsift", about = "Collect, deduplicate, and categorize podcast episodes")]
struct Cli {
    /// Collect and print the digest without archiving or sending it.
    #[arg(long)]
    collect_only: bool,

    /// Email the digest after archiving it (requires Resend credentials).
    #[arg(long)]
    send: bool,

    /// Print which sources are configured and exit.
    #[arg(long)]
    status: bool,

    /// Directory for archived digests.
    #[arg(long, default_value = "digests")]
    archive_dir: PathBuf,

    /// Enable debug logging.
    #[arg(long, short)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // ── Tracing ───────────────────────────────────────────────────────────────
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("podsift={default_level}").parse()?),
        )
        .init();

    // ── Config ────────────────────────────────────────────────────────────────
    let config = DigestConfig::from_env().map_err(|e| {
        error!("configuration error: {}", e);
        e
    })?;

    if cli.status {
        print_status(&config);
        return Ok(());
    }

    // ── Collect ───────────────────────────────────────────────────────────────
    let collectors: Vec<Box<dyn EpisodeCollector>> = vec![
        Box::new(PodcastIndexCollector::new(&config)),
        Box::new(ApplePodcastsCollector::new(&config)),
        Box::new(SpotifyCollector::new(&config)),
        Box::new(ListenNotesCollector::new(&config)),
    ];

    let fetch_time = Utc::now();
    let mut raw: Vec<RawRecord> = Vec::new();
    for collector in &collectors {
        raw.extend(collector.safe_collect(config.max_episodes_per_source).await);
    }
    info!(count = raw.len(), "collection finished");

    // ── Pipeline ──────────────────────────────────────────────────────────────
    let categories = config.load_categories()?;
    let pipeline = Pipeline::new(&categories, config.dedup_config())?;
    let run = pipeline.run(&raw, fetch_time);
    info!(
        raw = run.summary.raw_count,
        deduplicated = run.summary.deduplicated_count,
        merged = run.summary.merged_count,
        uncategorized = run.summary.uncategorized_count,
        "pipeline finished"
    );

    // ── Output ────────────────────────────────────────────────────────────────
    let markdown = render_digest(&run, fetch_time, config.max_episodes_per_category);

    if cli.collect_only {
        println!("{markdown}");
        return Ok(());
    }

    let path = archive_digest(&markdown, &cli.archive_dir, fetch_time)?;
    println!("digest written to {}", path.display());

    if cli.send {
        if config.has_resend() {
            let subject = format!("Podcast Digest — {}", fetch_time.format("%B %d, %Y"));
            send_digest(&subject, &markdown, &config).await?;
        } else {
            warn!("--send given but RESEND_API_KEY or DIGEST_EMAIL is unset, skipping email");
        }
    }

    Ok(())
}

fn print_status(config: &DigestConfig) {
    let mark = |configured: bool| if configured { "configured" } else { "missing credentials" };
    println!("podcast_index  {}", mark(config.has_podcast_index()));
    println!("apple_podcasts configured");
    println!("spotify        {}", mark(config.has_spotify()));
    println!("listen_notes   configured");
    println!("email          {}", mark(config.has_resend()));
    println!();
    println!("days_to_look_back         {}", config.days_to_look_back);
    println!("max_episodes_per_source   {}", config.max_episodes_per_source);
    println!("max_episodes_per_category {}", config.max_episodes_per_category);
    println!("similarity_threshold      {}", config.similarity_threshold);
    println!("dedup_window_hours        {}", config.dedup_window_hours);
}
