//! Configuration for the pari-bets scraper.

use serde::{Deserialize, Serialize};

/// Account credentials, supplied via config file or `PARI_AUTH_*` env vars
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub password: String,
}

/// Browser launch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Explicit browser binary path; platform default when unset
    #[serde(default)]
    pub binary: Option<String>,
    #[serde(default = "default_headless")]
    pub headless: bool,
}

fn default_headless() -> bool {
    false
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            binary: None,
            headless: default_headless(),
        }
    }
}

/// Store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: String,
}

fn default_store_path() -> String {
    "pari_bets_history.csv".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

/// Scraper pacing and bounds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// Bounded wait for explicit conditions (element present, URL marker)
    #[serde(default = "default_wait_timeout_secs")]
    pub wait_timeout_secs: u64,
    /// Pause for out-of-band human action (e.g. captcha) after a failed login
    #[serde(default = "default_manual_wait_secs")]
    pub manual_wait_secs: u64,
    /// Initial render pause after opening the history page
    #[serde(default = "default_page_load_ms")]
    pub page_load_ms: u64,
    /// Pause between scroll rounds, letting lazy content load
    #[serde(default = "default_scroll_pause_ms")]
    pub scroll_pause_ms: u64,
    /// Hard ceiling on scroll rounds
    #[serde(default = "default_scroll_rounds")]
    pub scroll_rounds: usize,
}

fn default_wait_timeout_secs() -> u64 {
    10
}

fn default_manual_wait_secs() -> u64 {
    30
}

fn default_page_load_ms() -> u64 {
    5000
}

fn default_scroll_pause_ms() -> u64 {
    1500
}

fn default_scroll_rounds() -> usize {
    100
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            wait_timeout_secs: default_wait_timeout_secs(),
            manual_wait_secs: default_manual_wait_secs(),
            page_load_ms: default_page_load_ms(),
            scroll_pause_ms: default_scroll_pause_ms(),
            scroll_rounds: default_scroll_rounds(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub scraper: ScraperConfig,
}

impl AppConfig {
    /// Load configuration from defaults, optional `config.toml`, and
    /// environment variables (`PARI_AUTH_LOGIN`, `PARI_STORE_PATH`, etc.)
    pub fn load() -> anyhow::Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Config::try_from(&AppConfig::default())?)
            .add_source(config::File::with_name("config").required(false))
            .add_source(
                config::Environment::with_prefix("PARI")
                    .separator("_")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.scraper.wait_timeout_secs, 10);
        assert_eq!(cfg.scraper.scroll_rounds, 100);
        assert_eq!(cfg.store.path, "pari_bets_history.csv");
        assert!(cfg.browser.binary.is_none());
    }
}
