//! HTML parsers for the pari.ru account pages.

pub mod bets;

pub use bets::{parse_bet_rows, ScrapedBet};
