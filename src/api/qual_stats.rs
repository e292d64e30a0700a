use crate::error::{QualStatsError, Result};
use crate::sequence_processor::collectors::quality::{FinalizedTable, QualityEncoding, QualityTable};
use crate::sequence_processor::{
    DispatchOptions, FastqReader, ProcessingStats, QualityAggregator, ReaderOptions,
    SequenceReader,
};
use indicatif::ProgressBar;
use log::{debug, info};
use std::io::Read;
use std::path::Path;
use std::time::Instant;

/// Everything that tunes a run. Only `encoding` affects the numbers; the other settings
/// trade speed for memory and never change the report.
#[derive(Debug, Clone, Default)]
pub struct EngineOptions {
    pub encoding: QualityEncoding,
    pub reader: ReaderOptions,
    pub dispatch: DispatchOptions,
}

impl EngineOptions {
    pub fn validate(&self) -> Result<()> {
        self.encoding.validate()?;
        if self.reader.block_size == 0 {
            return Err(QualStatsError::invalid_parameter("ibufs", "must be at least 1 byte"));
        }
        if self.reader.max_line_length == 0 {
            return Err(QualStatsError::invalid_parameter("mxsl", "must be at least 1"));
        }
        if self.dispatch.threads == 0 {
            return Err(QualStatsError::invalid_parameter("threads", "must be at least 1"));
        }
        if self.dispatch.batch_size == 0 {
            return Err(QualStatsError::invalid_parameter("batch-size", "must be at least 1"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct QualStatsOutput {
    pub table: FinalizedTable,
    pub stats: ProcessingStats,
}

/// Reads FASTQ input and produces finalized per-position quality statistics.
///
/// A single code path serves every configuration: `threads == 1` accumulates on the
/// calling thread, anything larger fans batches out to a [`crate::sequence_processor::ShardPool`]
/// and merges the shard tables afterwards.
pub struct QualStatsAnalyzer {
    options: EngineOptions,
    progress: ProgressBar,
}

impl QualStatsAnalyzer {
    pub fn new(options: EngineOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self { options, progress: ProgressBar::hidden() })
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn analyze_path(&self, path: &Path) -> Result<QualStatsOutput> {
        let reader = FastqReader::new(path, self.options.reader.clone())?;
        self.analyze(reader)
    }

    pub fn analyze_stdin(&self) -> Result<QualStatsOutput> {
        let reader = FastqReader::from_stdin(self.options.reader.clone())?;
        self.analyze(reader)
    }

    pub fn analyze_reader<R: Read + 'static>(&self, source: R) -> Result<QualStatsOutput> {
        let reader = FastqReader::from_reader(source, self.options.reader.clone())?;
        self.analyze(reader)
    }

    fn analyze(&self, mut reader: FastqReader) -> Result<QualStatsOutput> {
        let started = Instant::now();
        let mut aggregator = QualityAggregator::new(QualityTable::new(self.options.encoding));

        self.progress.set_message("Reading records");
        let stats = reader.read_records_with_threads(
            &mut aggregator,
            &self.progress,
            &self.options.dispatch,
        )?;

        debug!("Read {} bytes of decompressed input", reader.bytes_read());
        let table = aggregator.finalize();
        self.progress.finish_with_message(format!(
            "Processed {} records ({} skipped)",
            stats.processed, stats.skipped
        ));
        info!(
            "Processed {} records, {} bases, {} skipped, {} positions in {:.2?} using {} thread(s)",
            stats.processed,
            stats.bases,
            stats.skipped,
            table.len(),
            started.elapsed(),
            self.options.dispatch.threads
        );

        Ok(QualStatsOutput { table, stats })
    }
}
