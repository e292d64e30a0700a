use crate::error::Result;
use crate::sequence_processor::collectors::quality::QualityEncoding;

/// A trait for accumulating per-base statistics across the positions of a read
pub trait StatsCollector: Send + 'static {
    /// Encoding used to turn quality characters into scores
    fn encoding(&self) -> QualityEncoding;

    /// Record one base at the given 0-based read position. The quality is already decoded
    /// and inside the encoding's range.
    fn process_base(&mut self, position: usize, base: u8, quality: i32);

    /// Record `read_count` occurrences of a base that has no quality, as in FASTA input.
    fn process_unscored_base(&mut self, position: usize, base: u8, read_count: u64);

    /// An empty collector with the same configuration
    fn empty_like(&self) -> Self
    where
        Self: Sized;

    /// Merge statistics from another collector of the same type
    fn merge_with(&mut self, other: Self) -> Result<()>
    where
        Self: Sized;
}
