//! pari-bets
//!
//! Incremental scraper for a pari.ru betting-history page: logs in, expands
//! the virtualized bet list, and merges the parsed rows into a CSV snapshot
//! without duplicating previously captured bets.

mod config;
mod merge;
mod pipeline;
mod scraper;
mod storage;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pari_bets=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load()?;
    pipeline::run(&config).await
}
