//! Browser automation using chromiumoxide.

use anyhow::{bail, Context, Result};
use chromiumoxide::browser::{Browser as ChromeBrowser, BrowserConfig as ChromeConfig};
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::time::Duration;
use tokio::time::Instant;

use crate::config::BrowserConfig;

/// Poll interval for bounded condition waits
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Browser wrapper scoped to one scraping run
pub struct Browser {
    browser: ChromeBrowser,
    handle: tokio::task::JoinHandle<()>,
}

impl Browser {
    /// Launch a browser instance. Headed by default so a human can step in
    /// for a login challenge; the binary path is configurable with a
    /// platform default.
    pub async fn launch(cfg: &BrowserConfig) -> Result<Self> {
        let chrome_path = cfg.binary.clone().unwrap_or_else(default_chrome_path);

        let mut builder = ChromeConfig::builder()
            .chrome_executable(&chrome_path)
            .no_sandbox()
            .arg("--start-maximized")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-background-networking")
            .arg("--disable-sync")
            .arg("--mute-audio")
            .window_size(1920, 1080);

        if !cfg.headless {
            builder = builder.with_head();
        }

        let config = builder
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build browser config: {}", e))?;

        let (browser, mut handler) = ChromeBrowser::launch(config)
            .await
            .with_context(|| format!("Failed to launch browser at {chrome_path}"))?;

        // Spawn handler task - must keep running for browser to work
        let handle = tokio::spawn(async move {
            loop {
                match handler.next().await {
                    Some(Ok(_)) => continue,
                    Some(Err(_)) => continue, // Don't break on errors
                    None => break,
                }
            }
        });

        // Wait for browser to be ready
        tokio::time::sleep(Duration::from_secs(1)).await;

        Ok(Self { browser, handle })
    }

    /// Open a new page at the given URL
    pub async fn open(&self, url: &str) -> Result<Page> {
        self.browser
            .new_page(url)
            .await
            .with_context(|| format!("Failed to open {url}"))
    }

    /// Close the browser
    pub async fn close(mut self) -> Result<()> {
        let _ = self.browser.close().await;
        self.handle.abort();
        Ok(())
    }
}

fn default_chrome_path() -> String {
    if cfg!(target_os = "macos") {
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome".to_string()
    } else if cfg!(target_os = "windows") {
        "C:\\Program Files\\Google\\Chrome\\Application\\chrome.exe".to_string()
    } else {
        "google-chrome".to_string()
    }
}

/// Bounded wait for an element to be present; recoverable at the call site.
pub async fn wait_for_element(page: &Page, css: &str, timeout: Duration) -> Result<Element> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Ok(el) = page.find_element(css).await {
            return Ok(el);
        }
        if Instant::now() >= deadline {
            bail!("Timed out waiting for element {css:?}");
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

/// Bounded wait for the page URL to contain a marker.
pub async fn wait_for_url(page: &Page, marker: &str, timeout: Duration) -> Result<()> {
    let deadline = Instant::now() + timeout;
    loop {
        if url_contains(page, marker).await {
            return Ok(());
        }
        if Instant::now() >= deadline {
            bail!("Timed out waiting for URL containing {marker:?}");
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

/// Whether the current page URL contains the marker.
pub async fn url_contains(page: &Page, marker: &str) -> bool {
    matches!(page.url().await, Ok(Some(url)) if url.contains(marker))
}
