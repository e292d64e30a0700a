use super::processor::SequenceProcessor;
use super::stats::ProcessingStats;
use crate::error::{QualStatsError, Result};
use crate::sequence_processor::threading::DispatchOptions;
use indicatif::ProgressBar;
use log::debug;

/// What to do with a record that fails to parse or validate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Abort the run on the first malformed record.
    #[default]
    Strict,
    /// Count the malformed record as skipped and continue.
    Lenient,
}

impl ErrorPolicy {
    /// Absorbs `error` into `stats` when the policy allows skipping it, otherwise returns it.
    pub fn handle(self, error: QualStatsError, stats: &mut ProcessingStats) -> Result<()> {
        if self == ErrorPolicy::Lenient && error.is_record_error() {
            debug!("Skipping record: {}", error);
            stats.skipped += 1;
            Ok(())
        } else {
            Err(error)
        }
    }
}

pub trait SequenceReader {
    fn read_records_single_thread<P: SequenceProcessor>(
        &mut self,
        processor: &mut P,
        progress: &ProgressBar,
    ) -> Result<ProcessingStats>;

    fn read_records_with_threads<P: SequenceProcessor>(
        &mut self,
        processor: &mut P,
        progress: &ProgressBar,
        options: &DispatchOptions,
    ) -> Result<ProcessingStats>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lenient_skips_record_errors_only() {
        let mut stats = ProcessingStats::default();
        let malformed = QualStatsError::MalformedRecord {
            record: 1,
            line: 2,
            reason: "bad".to_string(),
        };
        assert!(ErrorPolicy::Lenient.handle(malformed, &mut stats).is_ok());
        assert_eq!(stats.skipped, 1);

        let io = QualStatsError::Io(std::io::Error::from(std::io::ErrorKind::UnexpectedEof));
        assert!(ErrorPolicy::Lenient.handle(io, &mut stats).is_err());
        assert_eq!(stats.skipped, 1);
    }

    #[test]
    fn test_strict_returns_every_error() {
        let mut stats = ProcessingStats::default();
        let malformed = QualStatsError::MalformedRecord {
            record: 1,
            line: 2,
            reason: "bad".to_string(),
        };
        assert!(ErrorPolicy::Strict.handle(malformed, &mut stats).is_err());
        assert_eq!(stats.skipped, 0);
    }
}
