//! Bet-history list parser.
//!
//! The history page renders one bet per `row` div, with obfuscated class
//! names (`cellDate--…`, `cellFactor--…`). Date rows appear between groups
//! of bets and carry only the date; bet rows show only a time, so the last
//! seen date is carried forward. Header and spacer rows are interleaved and
//! must be skipped. Markup is frequently partial: a missing or garbled cell
//! degrades to an empty string or `0.0`, never to a failed batch.

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

/// One list entry per bet.
pub const ROW_SELECTOR: &str = "div[class^='row']";

// `cellDate` is a substring of `cellDateTime`, so the date lookup has to
// exclude the time cell explicitly.
const DATE_CELL: &str = "[class*='cellDate']:not([class*='cellDateTime'])";
const TIME_CELL: &str = "[class*='cellDateTime']";
const BET_TYPE_CELL: &str = "div[class*='cellPariType'] .text--Y2SFL";
const DESCRIPTION_CELL: &str = "div[class*='cellDescription'] .text--Y2SFL";
const ODDS_CELL: &str = "div[class*='cellFactor'] span";
const STAKE_CELL: &str = "div[class*='cellSum'] span";
const RESULT_CELL: &str = "div[class*='cellResult']";

/// Header rows repeat the column label in the time cell.
const HEADER_MARKER: &str = "время";
/// Result label of a settled winning bet.
const WIN_MARKER: &str = "выигрыш";

/// One bet as scraped, timestamp still the raw `"date time"` string.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrapedBet {
    pub timestamp: String,
    pub bet_type: String,
    /// Same source cell as `description`; kept as two fields for the store.
    pub event: String,
    pub description: String,
    pub odds: f64,
    pub stake: f64,
    pub result: String,
    pub profit: f64,
}

/// Parse every visible bet row out of the fully loaded page.
///
/// `carried_date` is the date last seen in a previous call (None on the
/// first); the updated value is returned alongside the parsed bets so the
/// caller can thread it through subsequent page loads.
pub fn parse_bet_rows(html: &str, carried_date: Option<String>) -> (Vec<ScrapedBet>, Option<String>) {
    let document = Html::parse_document(html);
    let row_selector = Selector::parse(ROW_SELECTOR).unwrap();

    let mut bets = Vec::new();
    let mut current_date = carried_date;

    for (i, row) in document.select(&row_selector).enumerate() {
        if let Some(date) = cell_text(&row, DATE_CELL) {
            if !date.is_empty() {
                current_date = Some(date);
            }
        }

        let Some(time_text) = cell_text(&row, TIME_CELL) else {
            warn!("Row #{}: no time cell, skipping", i + 1);
            continue;
        };
        let time_text = time_text.to_lowercase();
        if time_text.is_empty() || time_text.contains(HEADER_MARKER) {
            debug!("Row #{}: header or spacer, skipping", i + 1);
            continue;
        }

        let Some(date) = current_date.clone() else {
            warn!(
                "Row #{}: time without a preceding date, skipping: {}",
                i + 1,
                row.html()
            );
            continue;
        };

        let odds = cell_number(&row, ODDS_CELL);
        let stake = cell_number(&row, STAKE_CELL);
        let result = cell_text(&row, RESULT_CELL).unwrap_or_default();
        let event = cell_text(&row, DESCRIPTION_CELL).unwrap_or_default();

        let bet = ScrapedBet {
            timestamp: format!("{date} {time_text}"),
            bet_type: cell_text(&row, BET_TYPE_CELL).unwrap_or_default(),
            description: event.clone(),
            event,
            odds: odds.unwrap_or(0.0),
            stake: stake.unwrap_or(0.0),
            profit: calculate_profit(&result, odds, stake),
            result,
        };
        debug!("Row #{}: bet at {}", i + 1, bet.timestamp);
        bets.push(bet);
    }

    (bets, current_date)
}

/// Trimmed text of the first sub-element matching `css`, if any.
fn cell_text(row: &ElementRef, css: &str) -> Option<String> {
    let selector = Selector::parse(css).ok()?;
    row.select(&selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
}

/// Numeric cell value, `None` on a missing element or unparseable text.
/// Strips the ruble glyph, NBSP/space thousands separators, and normalizes
/// the comma decimal separator. Stored fields default to `0.0`; profit needs
/// to know the extraction failed.
fn cell_number(row: &ElementRef, css: &str) -> Option<f64> {
    cell_text(row, css).and_then(|t| {
        t.replace(['\u{a0}', ' '], "")
            .replace('₽', "")
            .replace(',', ".")
            .parse()
            .ok()
    })
}

/// Net profit of a settled bet. Only an explicit win with successfully
/// extracted odds and stake pays out; losses, pending and voided bets, and
/// rows with a garbled numeric cell all report zero.
pub fn calculate_profit(result: &str, odds: Option<f64>, stake: Option<f64>) -> f64 {
    match (odds, stake) {
        (Some(odds), Some(stake)) if result.to_lowercase().contains(WIN_MARKER) => {
            ((odds * stake - stake) * 100.0).round() / 100.0
        }
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bet_row(time: &str, odds: &str, stake: &str, result: &str) -> String {
        format!(
            r#"<div class="row--item">
                <div class="cellDateTime--q">{time}</div>
                <div class="cellPariType--z"><span class="text--Y2SFL">Одиночное пари</span></div>
                <div class="cellDescription--z"><span class="text--Y2SFL">Спартак — Зенит</span></div>
                <div class="cellFactor--z"><span>{odds}</span></div>
                <div class="cellSum--z"><span>{stake}</span></div>
                <div class="cellResult--z">{result}</div>
            </div>"#
        )
    }

    fn date_row(date: &str) -> String {
        format!(r#"<div class="row--group"><div class="cellDate--a">{date}</div></div>"#)
    }

    fn header_row() -> String {
        r#"<div class="row--header"><div class="cellDateTime--q">Время</div></div>"#.to_string()
    }

    #[test]
    fn parses_full_row_with_carried_date() {
        let html = format!(
            "{}{}",
            date_row("05.03"),
            bet_row("14:20", "2,50", "100\u{a0}₽", "Выигрыш")
        );
        let (bets, date) = parse_bet_rows(&html, None);

        assert_eq!(date.as_deref(), Some("05.03"));
        assert_eq!(bets.len(), 1);
        let bet = &bets[0];
        assert_eq!(bet.timestamp, "05.03 14:20");
        assert_eq!(bet.bet_type, "Одиночное пари");
        assert_eq!(bet.event, "Спартак — Зенит");
        assert_eq!(bet.description, bet.event);
        assert_eq!(bet.odds, 2.5);
        assert_eq!(bet.stake, 100.0);
        assert_eq!(bet.result, "Выигрыш");
        assert_eq!(bet.profit, 150.0);
    }

    #[test]
    fn header_row_is_skipped_and_keeps_carried_date() {
        let html = format!(
            "{}{}{}",
            date_row("05.03"),
            header_row(),
            bet_row("15:00", "1,80", "50 ₽", "Проигрыш")
        );
        let (bets, date) = parse_bet_rows(&html, None);

        assert_eq!(bets.len(), 1);
        assert_eq!(bets[0].timestamp, "05.03 15:00");
        assert_eq!(date.as_deref(), Some("05.03"));
    }

    #[test]
    fn row_before_any_date_is_skipped() {
        let html = bet_row("14:20", "2,50", "100 ₽", "Выигрыш");
        let (bets, date) = parse_bet_rows(&html, None);
        assert!(bets.is_empty());
        assert!(date.is_none());
    }

    #[test]
    fn carried_date_threads_across_calls() {
        let first = date_row("05.03");
        let (_, date) = parse_bet_rows(&first, None);

        let second = bet_row("16:45", "3,00", "10 ₽", "Проигрыш");
        let (bets, _) = parse_bet_rows(&second, date);
        assert_eq!(bets.len(), 1);
        assert_eq!(bets[0].timestamp, "05.03 16:45");
    }

    #[test]
    fn garbled_numbers_default_to_zero() {
        let html = format!(
            "{}{}",
            date_row("05.03"),
            bet_row("14:20", "—", "", "Проигрыш")
        );
        let (bets, _) = parse_bet_rows(&html, None);
        assert_eq!(bets.len(), 1);
        assert_eq!(bets[0].odds, 0.0);
        assert_eq!(bets[0].stake, 0.0);
    }

    #[test]
    fn missing_cells_degrade_to_defaults() {
        let html = format!(
            "{}<div class=\"row--bare\"><div class=\"cellDateTime--q\">14:20</div></div>",
            date_row("05.03")
        );
        let (bets, _) = parse_bet_rows(&html, None);
        assert_eq!(bets.len(), 1);
        assert_eq!(bets[0].bet_type, "");
        assert_eq!(bets[0].event, "");
        assert_eq!(bets[0].odds, 0.0);
        assert_eq!(bets[0].profit, 0.0);
    }

    #[test]
    fn thousands_separators_are_stripped() {
        let html = format!(
            "{}{}",
            date_row("05.03"),
            bet_row("14:20", "1,05", "1\u{a0}000,50\u{a0}₽", "Проигрыш")
        );
        let (bets, _) = parse_bet_rows(&html, None);
        assert_eq!(bets[0].stake, 1000.5);
    }

    #[test]
    fn profit_formula() {
        assert_eq!(calculate_profit("Выигрыш", Some(2.5), Some(100.0)), 150.0);
        // Marker match is a case-insensitive substring
        assert_eq!(
            calculate_profit("выигрыш 250 ₽", Some(2.5), Some(100.0)),
            150.0
        );
        assert_eq!(calculate_profit("Проигрыш", Some(2.5), Some(100.0)), 0.0);
        assert_eq!(calculate_profit("", Some(2.5), Some(100.0)), 0.0);
        // Rounded to two decimals
        assert_eq!(calculate_profit("Выигрыш", Some(1.333), Some(10.0)), 3.33);
        // A failed extraction never pays out, win marker or not
        assert_eq!(calculate_profit("Выигрыш", None, Some(100.0)), 0.0);
        assert_eq!(calculate_profit("Выигрыш", Some(2.5), None), 0.0);
    }

    #[test]
    fn win_with_garbled_odds_yields_zero_profit() {
        let html = format!(
            "{}{}",
            date_row("05.03"),
            bet_row("14:20", "N/A", "100 ₽", "Выигрыш")
        );
        let (bets, _) = parse_bet_rows(&html, None);
        assert_eq!(bets.len(), 1);
        assert_eq!(bets[0].odds, 0.0);
        assert_eq!(bets[0].stake, 100.0);
        // Not 0.0 × 100 − 100: the unreadable odds cell voids the payout.
        assert_eq!(bets[0].profit, 0.0);
    }
}
