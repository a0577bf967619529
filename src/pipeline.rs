//! One extraction-and-merge pass over the account's bet history.

use anyhow::{bail, Context, Result};
use chrono::{Datelike, Local};
use std::time::Duration;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::merge::{merge_records, BetRecord};
use crate::scraper::parsers::{parse_bet_rows, ScrapedBet};
use crate::scraper::{
    auth, browser, load_full_list, Browser, PageScroller, ScrollConfig, ACCOUNT_URL_MARKER,
    BETS_URL, SCROLL_CONTAINER,
};
use crate::storage::BetStore;

/// Run the full pass: load the prior snapshot, scrape, merge, persist.
/// The browser is released whether scraping succeeds or not.
pub async fn run(cfg: &AppConfig) -> Result<()> {
    let store = BetStore::new(&cfg.store.path);
    let existing = store.load();
    info!("Loaded {} previously stored bets", existing.len());

    let browser = Browser::launch(&cfg.browser).await?;
    let scraped = collect_bets(&browser, cfg).await;
    if let Err(e) = browser.close().await {
        warn!("Browser shutdown error: {e:#}");
    }
    let scraped = scraped?;

    if scraped.is_empty() {
        info!("No bets scraped, nothing to merge");
        return Ok(());
    }
    info!("Scraped {} bets", scraped.len());

    match merge_records(existing, scraped, Local::now().year())? {
        Some(records) => {
            let rows: Vec<_> = records.iter().map(BetRecord::to_row).collect();
            store
                .save(&rows)
                .with_context(|| format!("Saving {}", cfg.store.path))?;
            info!("Saved {} bets to {}", rows.len(), cfg.store.path);
        }
        None => info!("No new valid bets, snapshot left untouched"),
    }

    Ok(())
}

/// Log in (with a single manual-intervention fallback), expand the
/// virtualized list, and parse every visible row.
async fn collect_bets(browser: &Browser, cfg: &AppConfig) -> Result<Vec<ScrapedBet>> {
    let page = browser.open("about:blank").await?;

    if let Err(e) = auth::login(&page, cfg).await {
        warn!("Login failed: {e:#}");
        info!(
            "Waiting {}s for manual intervention (e.g. a captcha)...",
            cfg.scraper.manual_wait_secs
        );
        tokio::time::sleep(Duration::from_secs(cfg.scraper.manual_wait_secs)).await;
        if !browser::url_contains(&page, ACCOUNT_URL_MARKER).await {
            bail!("Authorization failed, aborting the scrape");
        }
    }

    info!("Collecting the bet history...");
    page.goto(BETS_URL)
        .await
        .context("Opening the bet history page")?;
    tokio::time::sleep(Duration::from_millis(cfg.scraper.page_load_ms)).await;

    let scroller = PageScroller::new(&page, SCROLL_CONTAINER);
    let scroll_cfg = ScrollConfig {
        max_rounds: cfg.scraper.scroll_rounds,
        settle: Duration::from_millis(cfg.scraper.scroll_pause_ms),
    };
    load_full_list(&scroller, &scroll_cfg).await?;

    let html = page.content().await.context("Reading the history page")?;
    let (bets, _) = parse_bet_rows(&html, None);
    Ok(bets)
}
