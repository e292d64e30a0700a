use super::sequence::FastqRecord;
use crate::error::Result;

/// Per-record consumer driven by a [`super::SequenceReader`].
///
/// Parallel readers call [`fork`](SequenceProcessor::fork) once per shard, feed each shard a
/// disjoint part of the input, and hand every finished shard back through
/// [`merge_processor`](SequenceProcessor::merge_processor). Merging must be commutative and
/// associative so the result does not depend on how records were partitioned.
pub trait SequenceProcessor: Sized + Send + 'static {
    fn process_record(&mut self, record: &FastqRecord) -> Result<()>;

    /// A fresh, empty processor with the same configuration.
    fn fork(&self) -> Self;

    fn supports_parallel(&self) -> bool {
        false
    }

    fn merge_processor(&mut self, other: Self) -> Result<()>;
}
