//! Per-position quality accumulation.
//!
//! A [`QualityTable`] keeps, for every read position, running counts, sums, sums of squares,
//! extremes and a score histogram for all bases and for each of A, C, G, T and N. Finalizing
//! turns those into [`PositionSummary`] rows (mean, standard deviation, quartiles, whiskers).

mod encoding;
mod nucleotide;
mod summary;
mod table;

pub use encoding::{
    QualityEncoding, DEFAULT_MAX_QUALITY, DEFAULT_MIN_QUALITY, DEFAULT_QUALITY_OFFSET,
};
pub use nucleotide::{Nucleotide, NucleotideStats};
pub use summary::{FinalizedTable, PositionSummary, QualitySummary};
pub use table::{PositionBucket, QualityTable};
