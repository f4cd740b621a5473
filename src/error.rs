//! Error taxonomy for reading and tallying instruction traces

use std::num::ParseIntError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading input or building a tally
#[derive(Error, Debug)]
pub enum TallyError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Paired input has an odd number of lines ({lines}); expected key/duration pairs")]
    OddLineCount { lines: usize },

    #[error("Invalid duration on line {line}: {value:?}")]
    InvalidDuration {
        /// 1-based line number of the duration line
        line: usize,
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("Duration sum for {key:?} overflowed")]
    DurationOverflow { key: String },

    #[error("Invalid config: {0}")]
    Config(String),
}

/// Result type for tally operations
pub type Result<T> = std::result::Result<T, TallyError>;
