mod block;
mod fastq;

pub use block::{BlockLineReader, DEFAULT_BLOCK_SIZE};
pub use fastq::{FastqReader, ReaderOptions, DEFAULT_MAX_LINE_LENGTH};
