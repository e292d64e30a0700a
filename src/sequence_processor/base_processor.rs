use crate::error::{QualStatsError, Result};
use crate::sequence_processor::collectors::base::StatsCollector;
use crate::sequence_processor::collectors::quality::{FinalizedTable, QualityTable};
use crate::sequence_processor::core::{FastqRecord, SequenceFormat, SequenceProcessor};

/// The quality aggregator used by the engine.
pub type QualityAggregator = BaseProcessor<QualityTable>;

/// A processor that handles records base-by-base using a StatsCollector
pub struct BaseProcessor<C: StatsCollector> {
    collector: C,
}

impl<C: StatsCollector> BaseProcessor<C> {
    pub fn new(collector: C) -> Self {
        Self { collector }
    }

    /// Get a reference to the underlying collector
    pub fn collector(&self) -> &C {
        &self.collector
    }

    pub fn into_collector(self) -> C {
        self.collector
    }

    /// Feeds every base of `record` to the collector.
    ///
    /// The whole record is checked before the first base is recorded, so a rejected record
    /// leaves the collector untouched.
    ///
    /// FASTA records carry no qualities; their bases are counted `read_count` times.
    pub fn accumulate(&mut self, record: &FastqRecord) -> Result<()> {
        if record.format == SequenceFormat::Fasta {
            for (position, &base) in record.seq.iter().enumerate() {
                self.collector.process_unscored_base(position, base, record.read_count);
            }
            return Ok(());
        }

        if record.seq.len() != record.qual.len() {
            return Err(QualStatsError::MalformedRecord {
                record: record.number(),
                line: record.index * 4 + 4,
                reason: format!(
                    "sequence length {} does not match quality length {}",
                    record.seq.len(),
                    record.qual.len()
                ),
            });
        }

        let encoding = self.collector.encoding();
        if let Some((position, quality)) = record
            .qual
            .iter()
            .map(|&symbol| encoding.decode(symbol))
            .enumerate()
            .find(|&(_, quality)| !encoding.contains(quality))
        {
            return Err(QualStatsError::QualityOutOfRange {
                record: record.number(),
                position: position + 1,
                quality,
                min: encoding.min,
                max: encoding.max,
            });
        }

        for (position, (&base, &symbol)) in record.seq.iter().zip(&record.qual).enumerate() {
            self.collector.process_base(position, base, encoding.decode(symbol));
        }

        Ok(())
    }
}

impl BaseProcessor<QualityTable> {
    pub fn finalize(self) -> FinalizedTable {
        self.collector.finalize()
    }
}

impl<C: StatsCollector> SequenceProcessor for BaseProcessor<C> {
    fn process_record(&mut self, record: &FastqRecord) -> Result<()> {
        self.accumulate(record)
    }

    fn fork(&self) -> Self {
        Self::new(self.collector.empty_like())
    }

    fn supports_parallel(&self) -> bool {
        true
    }

    fn merge_processor(&mut self, other: Self) -> Result<()> {
        // Delegate merging to the collector
        self.collector.merge_with(other.collector)
    }
}
