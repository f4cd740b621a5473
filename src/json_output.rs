//! JSON output format for tallies
//!
//! `--format json` renders the whole tally regardless of the selector.

use crate::tally::{Mode, Tally};
use serde::{Deserialize, Serialize};

/// A single tallied key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonEntry {
    /// Token as it appeared in the input (newline stripped)
    pub key: String,
    /// Number of occurrences
    pub count: u64,
    /// Summed duration (paired mode only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
}

/// Summary statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonSummary {
    pub distinct_keys: usize,
    pub total_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_duration: Option<i64>,
}

/// Root JSON output structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonOutput {
    /// Format version identifier
    pub version: String,
    /// Format name
    pub format: String,
    pub mode: Mode,
    /// Entries in first-seen order
    pub entries: Vec<JsonEntry>,
    pub summary: JsonSummary,
}

impl JsonOutput {
    /// Build the JSON document for a finished tally
    pub fn from_tally(tally: &Tally) -> Self {
        let paired = tally.mode() == Mode::Paired;
        let entries = tally
            .entries()
            .map(|(key, stats)| JsonEntry {
                key: key.to_string(),
                count: stats.count,
                duration: paired.then_some(stats.total_duration),
            })
            .collect();
        let totals = tally.totals();

        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            format: "insttally-json-v1".to_string(),
            mode: tally.mode(),
            entries,
            summary: JsonSummary {
                distinct_keys: totals.distinct_keys,
                total_count: totals.total_count,
                total_duration: paired.then_some(totals.total_duration),
            },
        }
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
