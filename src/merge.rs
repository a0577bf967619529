//! Timestamp normalization and the incremental merge/dedup pass.
//!
//! Freshly scraped rows carry a raw `"date time"` string, usually without a
//! year. This module repairs the year, parses everything onto one time axis,
//! folds the new rows into the prior snapshot without duplicating bets, and
//! establishes the canonical newest-first order.

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use regex::Regex;
use std::collections::HashSet;
use tracing::warn;

use crate::scraper::parsers::ScrapedBet;
use crate::storage::StoredBet;

/// Display/storage format for timestamps, day-first.
pub const TIME_FORMAT: &str = "%d.%m.%Y %H:%M";

/// A normalized bet, ready for dedup, sorting and persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct BetRecord {
    pub timestamp: NaiveDateTime,
    pub bet_type: String,
    pub event: String,
    pub description: String,
    pub odds: f64,
    pub stake: f64,
    pub result: String,
    pub profit: f64,
}

impl BetRecord {
    /// Render for persistence, fixing the timestamp to [`TIME_FORMAT`].
    pub fn to_row(&self) -> StoredBet {
        StoredBet {
            timestamp: self.timestamp.format(TIME_FORMAT).to_string(),
            bet_type: self.bet_type.clone(),
            event: self.event.clone(),
            description: self.description.clone(),
            odds: self.odds,
            stake: self.stake,
            result: self.result.clone(),
            profit: self.profit,
        }
    }
}

/// Append the current year to a `"dd.mm hh:mm"` string. Date strings that
/// already carry a year (two dots) pass through unchanged.
pub fn repair_year(raw: &str, current_year: i32) -> String {
    if raw.matches('.').count() != 1 {
        return raw.to_string();
    }
    let mut parts = raw.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some(date), Some(time)) => format!("{date}.{current_year} {time}"),
        _ => raw.to_string(),
    }
}

/// Parse a day-first `"dd.mm.yyyy hh:mm"` timestamp.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw.trim(), TIME_FORMAT)
        .with_context(|| format!("invalid timestamp {raw:?}"))
}

/// Composite identity of a bet. Two rows sharing this key are the same bet.
/// Float components go through `to_bits` so the tuple is hashable; the values
/// compared were parsed from the same fixed-precision text, so bit equality
/// is exact equality here.
fn identity_key(r: &BetRecord) -> (NaiveDateTime, String, String, String, u64, u64) {
    (
        r.timestamp,
        r.bet_type.clone(),
        r.event.clone(),
        r.description.clone(),
        r.odds.to_bits(),
        r.stake.to_bits(),
    )
}

/// Merge freshly scraped rows into the prior snapshot.
///
/// Returns `Ok(None)` when no scraped row survives the validity filter; the
/// caller must leave the prior file untouched. A scraped row whose timestamp
/// fails to parse is fatal, since a corrupt time axis would silently break
/// the sort and dedup guarantees for the whole dataset. Prior rows were
/// validated when first written, so an unparseable one is dropped with a
/// warning instead.
///
/// Dedup keeps the first occurrence of each identity key, and prior rows come
/// first, so records already on disk win over re-scraped copies and repeated
/// runs are idempotent.
pub fn merge_records(
    existing: Vec<StoredBet>,
    scraped: Vec<ScrapedBet>,
    current_year: i32,
) -> Result<Option<Vec<BetRecord>>> {
    let placeholder = Regex::new(r"None|ДАТА").unwrap();

    let candidates: Vec<ScrapedBet> = scraped
        .into_iter()
        .filter(|b| !b.timestamp.trim().is_empty() && !placeholder.is_match(&b.timestamp))
        .collect();

    if candidates.is_empty() {
        return Ok(None);
    }

    let mut combined = Vec::with_capacity(existing.len() + candidates.len());

    for row in existing {
        match parse_timestamp(&row.timestamp) {
            Ok(ts) => combined.push(BetRecord {
                timestamp: ts,
                bet_type: row.bet_type,
                event: row.event,
                description: row.description,
                odds: row.odds,
                stake: row.stake,
                result: row.result,
                profit: row.profit,
            }),
            Err(e) => warn!("Dropping stored row with bad timestamp: {e:#}"),
        }
    }

    for bet in candidates {
        let repaired = repair_year(&bet.timestamp, current_year);
        let ts = parse_timestamp(&repaired)
            .with_context(|| format!("normalizing scraped row {:?}", bet.timestamp))?;
        combined.push(BetRecord {
            timestamp: ts,
            bet_type: bet.bet_type,
            event: bet.event,
            description: bet.description,
            odds: bet.odds,
            stake: bet.stake,
            result: bet.result,
            profit: bet.profit,
        });
    }

    let mut seen = HashSet::new();
    combined.retain(|r| seen.insert(identity_key(r)));

    // Stable sort: equal timestamps keep prior-first order.
    combined.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    Ok(Some(combined))
}
