//! Scroll driver for the virtualized history list.
//!
//! The list renders only a window of its content; scrolling the container to
//! the bottom makes it lazy-load the next chunk. The loop keeps scrolling
//! until the scroll offset stops moving, with a hard round ceiling against a
//! page that never settles. An unchanged offset is the normal termination
//! signal, not an error. A page that loads slower than the settle pause is
//! mistaken for the end of the list.

use anyhow::Result;
use async_trait::async_trait;
use chromiumoxide::page::Page;
use std::time::Duration;
use tracing::{debug, info};

/// A scrollable surface: the real CDP page in production, a fake in tests.
#[async_trait]
pub trait ScrollTarget {
    /// Scroll the container to its maximum extent.
    async fn scroll_to_bottom(&self) -> Result<()>;
    /// Current scroll offset of the container.
    async fn scroll_offset(&self) -> Result<f64>;
}

/// Pacing for the scroll loop. `settle` is injectable so tests run without
/// real delays.
#[derive(Debug, Clone)]
pub struct ScrollConfig {
    pub max_rounds: usize,
    pub settle: Duration,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            max_rounds: 100,
            settle: Duration::from_millis(1500),
        }
    }
}

/// Scroll until the offset stabilizes or the round ceiling is hit.
/// Returns the number of rounds performed.
pub async fn load_full_list<T: ScrollTarget + ?Sized>(
    target: &T,
    cfg: &ScrollConfig,
) -> Result<usize> {
    let mut last_offset = 0.0;

    for round in 0..cfg.max_rounds {
        target.scroll_to_bottom().await?;
        tokio::time::sleep(cfg.settle).await;

        let offset = target.scroll_offset().await?;
        if offset == last_offset {
            info!("Scrolling stopped after {} rounds: end of list", round + 1);
            return Ok(round + 1);
        }
        debug!("Scroll round {}: offset {}", round + 1, offset);
        last_offset = offset;
    }

    info!("Scroll round ceiling ({}) reached", cfg.max_rounds);
    Ok(cfg.max_rounds)
}

/// [`ScrollTarget`] over a CDP page and a container selector.
pub struct PageScroller<'a> {
    page: &'a Page,
    container: &'a str,
}

impl<'a> PageScroller<'a> {
    pub fn new(page: &'a Page, container: &'a str) -> Self {
        Self { page, container }
    }

    fn container_js(&self, body: &str) -> String {
        format!(
            "(() => {{ const el = document.querySelector({sel}); {body} }})()",
            sel = serde_json::to_string(self.container).unwrap_or_default(),
        )
    }
}

#[async_trait]
impl ScrollTarget for PageScroller<'_> {
    async fn scroll_to_bottom(&self) -> Result<()> {
        self.page
            .evaluate(self.container_js("if (el) el.scrollTop = el.scrollHeight;"))
            .await?;
        Ok(())
    }

    async fn scroll_offset(&self) -> Result<f64> {
        let offset: f64 = self
            .page
            .evaluate(self.container_js("return el ? el.scrollTop : 0;"))
            .await?
            .into_value()?;
        Ok(offset)
    }
}
