use super::encoding::QualityEncoding;
use super::nucleotide::{Nucleotide, NucleotideStats};
use super::summary::{FinalizedTable, PositionSummary};
use crate::error::{QualStatsError, Result};
use crate::sequence_processor::collectors::base::StatsCollector;

/// Accumulators for a single read position, one per [`Nucleotide`] class.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionBucket {
    classes: [NucleotideStats; Nucleotide::COUNT],
}

impl PositionBucket {
    pub fn stats(&self, nucleotide: Nucleotide) -> &NucleotideStats {
        &self.classes[nucleotide.index()]
    }

    #[inline]
    fn observe(&mut self, base: u8, quality: i32, encoding: &QualityEncoding) {
        self.classes[Nucleotide::All.index()].observe(quality, encoding);
        if let Some(nucleotide) = Nucleotide::from_base(base) {
            self.classes[nucleotide.index()].observe(quality, encoding);
        }
    }

    #[inline]
    fn observe_unscored(&mut self, base: u8, read_count: u64) {
        self.classes[Nucleotide::All.index()].observe_unscored(read_count);
        if let Some(nucleotide) = Nucleotide::from_base(base) {
            self.classes[nucleotide.index()].observe_unscored(read_count);
        }
    }

    fn merge(&mut self, other: &PositionBucket) {
        for (mine, theirs) in self.classes.iter_mut().zip(&other.classes) {
            mine.merge(theirs);
        }
    }

    fn summarize(&self, position: usize, encoding: &QualityEncoding) -> Option<PositionSummary> {
        let all = self.stats(Nucleotide::All).summarize(encoding)?;
        let bases = Nucleotide::BASES.map(|base| self.stats(base).summarize(encoding));
        Some(PositionSummary { position, all, bases })
    }
}

/// Per-position quality table, grown on demand as longer reads arrive.
///
/// Updates are purely additive, so tables built over disjoint parts of an input merge into
/// the same table a single pass would have produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualityTable {
    encoding: QualityEncoding,
    buckets: Vec<PositionBucket>,
}

impl Default for QualityTable {
    fn default() -> Self {
        Self::new(QualityEncoding::default())
    }
}

impl QualityTable {
    pub fn new(encoding: QualityEncoding) -> Self {
        Self { encoding, buckets: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn bucket(&self, position: usize) -> Option<&PositionBucket> {
        self.buckets.get(position)
    }

    /// Additive merge; `other` is consumed.
    pub fn merge(&mut self, other: QualityTable) -> Result<()> {
        if self.encoding != other.encoding {
            return Err(QualStatsError::IncompatibleTables);
        }
        if self.buckets.is_empty() {
            self.buckets = other.buckets;
            return Ok(());
        }
        if other.buckets.len() > self.buckets.len() {
            self.buckets.resize_with(other.buckets.len(), PositionBucket::default);
        }
        for (mine, theirs) in self.buckets.iter_mut().zip(&other.buckets) {
            mine.merge(theirs);
        }
        Ok(())
    }

    /// Derives the per-position statistics. Consumes the table, so nothing can be added
    /// afterwards.
    pub fn finalize(self) -> FinalizedTable {
        let encoding = self.encoding;
        let positions = self
            .buckets
            .iter()
            .enumerate()
            .map_while(|(position, bucket)| bucket.summarize(position, &encoding))
            .collect();
        FinalizedTable { positions }
    }
}

impl StatsCollector for QualityTable {
    fn encoding(&self) -> QualityEncoding {
        self.encoding
    }

    #[inline]
    fn process_base(&mut self, position: usize, base: u8, quality: i32) {
        if position >= self.buckets.len() {
            self.buckets.resize_with(position + 1, PositionBucket::default);
        }
        self.buckets[position].observe(base, quality, &self.encoding);
    }

    fn process_unscored_base(&mut self, position: usize, base: u8, read_count: u64) {
        if position >= self.buckets.len() {
            self.buckets.resize_with(position + 1, PositionBucket::default);
        }
        self.buckets[position].observe_unscored(base, read_count);
    }

    fn empty_like(&self) -> Self {
        Self::new(self.encoding)
    }

    fn merge_with(&mut self, other: Self) -> Result<()> {
        self.merge(other)
    }
}
