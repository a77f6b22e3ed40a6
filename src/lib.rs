//! # Combo Meta
//!
//! Build-name parsing, combo statistics and tournament standings for
//! spinning-top battle records.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (parts, builds, matches, stats)
//! - **dictionary**: Canonical part names, indexed for longest-match lookup
//! - **parser**: Resolves a free-text build name into its parts
//! - **aggregate**: Folds match records into player, combo and part records
//! - **calculate**: Win-rate estimators and the combo score
//! - **ranking**: Swiss-style leaderboard with rank movement
//! - **engine**: One recomputation pass over all of the above
//! - **storage**: Read-only JSONL record store
//! - **config**: Configuration loading and validation

pub mod aggregate;
pub mod calculate;
pub mod config;
pub mod dictionary;
pub mod engine;
pub mod models;
pub mod parser;
pub mod ranking;
pub mod storage;

pub use models::*;
