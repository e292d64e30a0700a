pub mod core;
pub mod collectors;
pub mod readers;
pub mod threading;
mod base_processor;

// Re-export commonly used items
pub use base_processor::{BaseProcessor, QualityAggregator};
pub use collectors::base::StatsCollector;
pub use core::{
    ErrorPolicy, FastqRecord, ProcessingStats, SequenceFormat, SequenceProcessor, SequenceReader,
};
pub use readers::{FastqReader, ReaderOptions};
pub use threading::{DispatchOptions, ShardPool};
