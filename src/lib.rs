//! # Matchup Scout
//!
//! Opponent scouting for VALORANT: match records in, evidence-backed
//! coaching decisions out.
//!
//! ## Architecture
//!
//! - **models**: Records, snapshots, findings, recommendations, the report
//! - **analysis**: Validation, aggregation, pattern detection, ranking
//! - **calculate**: Statistics arithmetic shared by the stages
//! - **config**: Thresholds and catalog loading and validation
//! - **storage**: Local JSONL match store
//! - **source**: Data sources feeding the engine

pub mod analysis;
pub mod calculate;
pub mod config;
pub mod models;
pub mod source;
pub mod storage;

#[cfg(test)]
mod test_support;

pub use models::*;

/// Parse a human-friendly window length into days ("90d", "12w", "30").
pub fn parse_window(s: &str) -> Option<u32> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let (num_str, multiplier) = if let Some(n) = s.strip_suffix('w') {
        (n, 7)
    } else if let Some(n) = s.strip_suffix('d') {
        (n, 1)
    } else {
        // Default to days
        (s, 1)
    };

    let num: u32 = num_str.parse().ok()?;
    num.checked_mul(multiplier)
}
