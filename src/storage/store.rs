//! CSV-backed snapshot store.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// One stored row. `timestamp` is kept as the display string
/// (`%d.%m.%Y %H:%M`); parsing back to an instant happens in the merge step.
///
/// `event` and `description` are always equal: the account page populates
/// both from the same cell. Both columns are kept so the stored header set
/// stays compatible with previously written files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredBet {
    #[serde(rename = "время")]
    pub timestamp: String,
    #[serde(rename = "тип_пари")]
    pub bet_type: String,
    #[serde(rename = "событие")]
    pub event: String,
    #[serde(rename = "описание")]
    pub description: String,
    #[serde(rename = "коэффициент")]
    pub odds: f64,
    #[serde(rename = "сумма")]
    pub stake: f64,
    #[serde(rename = "результат")]
    pub result: String,
    #[serde(rename = "прибыль")]
    pub profit: f64,
}

/// Load/save of the full record collection.
pub struct BetStore {
    path: PathBuf,
}

impl BetStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Load the prior snapshot. A missing file is an empty snapshot; an
    /// unreadable file is logged and treated as empty rather than aborting
    /// the run.
    pub fn load(&self) -> Vec<StoredBet> {
        if !self.path.exists() {
            return Vec::new();
        }

        match self.read_rows() {
            Ok(rows) => rows,
            Err(e) => {
                warn!("Failed to load {}: {e:#}", self.path.display());
                Vec::new()
            }
        }
    }

    fn read_rows(&self) -> Result<Vec<StoredBet>> {
        let mut reader = csv::Reader::from_path(&self.path)
            .with_context(|| format!("opening {}", self.path.display()))?;

        let mut rows = Vec::new();
        for record in reader.deserialize() {
            let row: StoredBet = record.context("malformed snapshot row")?;
            rows.push(row);
        }
        Ok(rows)
    }

    /// Write the full collection, replacing the previous file.
    pub fn save(&self, rows: &[StoredBet]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
        }

        let mut writer = csv::Writer::from_path(&self.path)
            .with_context(|| format!("opening {} for write", self.path.display()))?;

        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row() -> StoredBet {
        StoredBet {
            timestamp: "05.03.2024 14:20".to_string(),
            bet_type: "Одиночное пари".to_string(),
            event: "Спартак — Зенит".to_string(),
            description: "Спартак — Зенит".to_string(),
            odds: 2.5,
            stake: 100.0,
            result: "Выигрыш".to_string(),
            profit: 150.0,
        }
    }

    #[test]
    fn missing_file_is_empty_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = BetStore::new(dir.path().join("absent.csv"));
        assert!(store.load().is_empty());
    }

    #[test]
    fn save_then_load_preserves_rows() {
        let dir = tempfile::tempdir().unwrap();
        let store = BetStore::new(dir.path().join("bets.csv"));

        let rows = vec![sample_row()];
        store.save(&rows).unwrap();

        let loaded = store.load();
        assert_eq!(loaded, rows);
    }

    #[test]
    fn header_uses_source_field_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bets.csv");
        let store = BetStore::new(&path);
        store.save(&[sample_row()]).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let header = contents.lines().next().unwrap();
        assert_eq!(
            header,
            "время,тип_пари,событие,описание,коэффициент,сумма,результат,прибыль"
        );
    }

    #[test]
    fn unreadable_file_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bets.csv");
        std::fs::write(&path, "время,тип_пари\nгарбидж").unwrap();

        let store = BetStore::new(&path);
        assert!(store.load().is_empty());
    }
}
