//! Standalone runner for the click pipeline.
//!
//! Starts the processor against the in-memory store, replays a synthetic
//! burst of redirects through the [`ClickTracker`], then shuts down within
//! the configured deadline and prints the final statistics.
//!
//! # Usage
//!
//! ```bash
//! # Replay 5000 clicks over 10 aliases, 200 at a time
//! cargo run -- --clicks 5000 --aliases 10 --burst 200
//!
//! # Keep running until Ctrl-C after the replay
//! cargo run -- --clicks 100 --wait
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use tracing::{info, warn};

use click_pipeline::config;
use click_pipeline::prelude::*;
use click_pipeline::telemetry::init_tracing;

const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_1 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Mobile/15E148 Safari/604.1",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (iPad; CPU OS 16_6 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.6 Mobile/15E148 Safari/604.1",
    "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)",
    "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Mobile Safari/537.36",
];

/// Click pipeline runner.
#[derive(Parser)]
#[command(name = "click-pipeline")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Number of synthetic clicks to replay
    #[arg(short, long, default_value_t = 1000)]
    clicks: usize,

    /// Number of distinct aliases registered in the in-memory store
    #[arg(short, long, default_value_t = 5)]
    aliases: usize,

    /// Clicks submitted back-to-back before yielding to the workers
    #[arg(short, long, default_value_t = 100)]
    burst: usize,

    /// Send every tenth click to an unregistered alias
    #[arg(long)]
    with_unknown: bool,

    /// Wait for Ctrl-C after the replay instead of shutting down immediately
    #[arg(short, long)]
    wait: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = config::load_from_env().context("Invalid click pipeline configuration")?;

    init_tracing(&config.log_level, &config.log_format);
    config.print_summary();

    let aliases: Vec<String> = (0..cli.aliases.max(1)).map(|i| format!("link{i}")).collect();
    let store = Arc::new(MemoryClickStore::with_aliases(aliases.iter().cloned()));

    let classifier = Arc::new(ClassifierSlot::empty());
    if config.is_classifier_enabled() {
        classifier
            .install_with(|| Ok(Arc::new(WootheeClassifier::new()) as Arc<dyn DeviceClassifier>))?;
    } else {
        info!("UA classifier disabled, using heuristic");
    }

    let processor = Arc::new(ClickProcessor::new(
        config.processor_config(),
        store.clone(),
        classifier,
    ));
    processor.start()?;

    let tracker = ClickTracker::new(
        processor.clone(),
        FallbackRecorder::new(store.clone(), config.fallback_timeout()),
    );

    let mut inline = 0usize;
    let mut lost = 0usize;
    for i in 0..cli.clicks {
        let alias = if cli.with_unknown && i % 10 == 9 {
            "missing".to_string()
        } else {
            aliases[i % aliases.len()].clone()
        };
        let event = ClickEvent::new(
            alias,
            Some(format!("10.0.{}.{}", (i / 256) % 256, i % 256)),
            Some(USER_AGENTS[i % USER_AGENTS.len()]),
            None,
        )
        .now();

        match tracker.track(event).await {
            TrackOutcome::Queued => {}
            TrackOutcome::RecordedInline => inline += 1,
            TrackOutcome::Lost => lost += 1,
        }

        if (i + 1) % cli.burst.max(1) == 0 {
            tokio::task::yield_now().await;
        }
    }
    info!(clicks = cli.clicks, inline, lost, "replay finished");

    if cli.wait {
        println!("{}", "Waiting for Ctrl-C...".bright_blue());
        tokio::signal::ctrl_c()
            .await
            .context("Failed to listen for Ctrl-C")?;
    }

    let shutdown = processor.shutdown().await;
    let stats = processor.stats();

    println!();
    println!("{}", "Click pipeline statistics".bright_blue().bold());
    println!("{}", serde_json::to_string_pretty(&stats)?);
    println!("  Stored clicks:   {}", store.total_clicks().to_string().green());
    println!("  Inline writes:   {}", inline.to_string().yellow());
    println!("  Lost on inline:  {}", lost.to_string().red());

    if let Err(err) = shutdown {
        warn!(error = %err, "click processor did not shut down cleanly");
        return Err(err.into());
    }

    Ok(())
}
