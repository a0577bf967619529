//! Persistent store for the bet-history snapshot.
//!
//! The snapshot is a flat tabular file whose columns mirror the bet record,
//! with the same (Russian) header names the account page uses.

pub mod store;

pub use store::{BetStore, StoredBet};
