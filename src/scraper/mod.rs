//! Web scraper module for pari.ru.
//!
//! Provides browser automation, the login flow, the scroll driver for the
//! virtualized bet list, and HTML parsing.

pub mod auth;
pub mod browser;
pub mod pagination;
pub mod parsers;

pub use browser::Browser;
pub use pagination::{load_full_list, PageScroller, ScrollConfig, ScrollTarget};

pub const LOGIN_URL: &str = "https://pari.ru/authProcess/login";
pub const BETS_URL: &str = "https://pari.ru/account/history/bets";

/// URL marker present once login has succeeded
pub const ACCOUNT_URL_MARKER: &str = "/account/";

/// Scroll container of the virtualized bet list
pub const SCROLL_CONTAINER: &str = "div.scroll-area__view-port__default--J1yYl";
