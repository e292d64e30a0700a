//! Error types for FASTQ quality-statistics runs.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for quality-statistics operations
pub type Result<T> = std::result::Result<T, QualStatsError>;

/// Error type for quality-statistics operations
#[derive(Error, Debug)]
pub enum QualStatsError {
    /// Input path is missing or cannot be opened
    #[error("Cannot open input file '{}': {source}", .path.display())]
    FileNotFound {
        /// The path that failed to open
        path: PathBuf,
        /// Underlying open error
        #[source]
        source: std::io::Error,
    },

    /// I/O failure while reading input or writing the report
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Structural FASTQ violation
    #[error("Malformed FASTQ record {record} (line {line}): {reason}")]
    MalformedRecord {
        /// 1-based record number
        record: u64,
        /// 1-based line number where the problem was detected
        line: u64,
        /// What was wrong with the record
        reason: String,
    },

    /// A single input line exceeds the configured maximum
    #[error("Line {line} of record {record} is {length} bytes long (maximum is {max})")]
    LineTooLong {
        /// 1-based record number
        record: u64,
        /// 1-based line number
        line: u64,
        /// Observed length in bytes
        length: usize,
        /// Configured maximum
        max: usize,
    },

    /// A decoded quality score falls outside the configured range
    #[error(
        "Quality {quality} at position {position} of record {record} is outside [{min}, {max}]"
    )]
    QualityOutOfRange {
        /// 1-based record number
        record: u64,
        /// 1-based position within the read
        position: usize,
        /// Decoded quality value
        quality: i32,
        /// Lowest accepted quality
        min: i32,
        /// Highest accepted quality
        max: i32,
    },

    /// Invalid parameter value provided
    #[error("Invalid parameter '{parameter}': {reason}")]
    InvalidParameter {
        /// The parameter name
        parameter: String,
        /// Explanation of why it's invalid
        reason: String,
    },

    /// Two tables with different quality encodings cannot be merged
    #[error("Cannot merge quality tables built with different quality encodings")]
    IncompatibleTables,

    /// A shard worker thread panicked
    #[error("Worker thread for shard {shard} panicked")]
    WorkerPanicked {
        /// Index of the shard whose worker panicked
        shard: usize,
    },

    /// Dispatch stopped because another shard failed
    #[error("Processing was cancelled")]
    Cancelled,
}

impl QualStatsError {
    pub fn invalid_parameter(parameter: &str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter { parameter: parameter.to_string(), reason: reason.into() }
    }

    /// Errors caused by the content of a single record. Lenient runs skip these.
    pub fn is_record_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedRecord { .. } | Self::LineTooLong { .. } | Self::QualityOutOfRange { .. }
        )
    }

    /// 1-based record number the error refers to, when it refers to one.
    pub fn record_number(&self) -> Option<u64> {
        match self {
            Self::MalformedRecord { record, .. }
            | Self::LineTooLong { record, .. }
            | Self::QualityOutOfRange { record, .. } => Some(*record),
            _ => None,
        }
    }
}
