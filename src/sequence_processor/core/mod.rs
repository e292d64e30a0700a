pub(crate) mod processor;
pub(crate) mod sequence;
pub(crate) mod stats;
mod reader;

pub use processor::SequenceProcessor;
pub use reader::{ErrorPolicy, SequenceReader};
pub use sequence::{FastqRecord, SequenceFormat};
pub use stats::ProcessingStats;
