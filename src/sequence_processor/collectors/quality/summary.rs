use super::nucleotide::Nucleotide;

/// Derived statistics for one class at one position.
#[derive(Debug, Clone, PartialEq)]
pub struct QualitySummary {
    pub count: u64,
    pub min: i32,
    pub max: i32,
    pub sum: i64,
    pub mean: f64,
    pub std_dev: f64,
    pub q1: i32,
    pub median: i32,
    pub q3: i32,
    pub iqr: i32,
    pub left_whisker: i32,
    pub right_whisker: i32,
    /// False for count-only classes built from input without qualities; every field but
    /// `count` is then zero and meaningless.
    pub scored: bool,
}

impl QualitySummary {
    pub fn count_only(count: u64) -> Self {
        Self {
            count,
            min: 0,
            max: 0,
            sum: 0,
            mean: 0.0,
            std_dev: 0.0,
            q1: 0,
            median: 0,
            q3: 0,
            iqr: 0,
            left_whisker: 0,
            right_whisker: 0,
            scored: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PositionSummary {
    /// 0-based read position
    pub position: usize,
    pub all: QualitySummary,
    /// Per-symbol summaries in A, C, G, T, N order; `None` where the symbol never occurs.
    pub bases: [Option<QualitySummary>; 5],
}

impl PositionSummary {
    pub fn class(&self, nucleotide: Nucleotide) -> Option<&QualitySummary> {
        match nucleotide {
            Nucleotide::All => Some(&self.all),
            base => self.bases[base.index() - 1].as_ref(),
        }
    }

    pub fn base_count(&self, nucleotide: Nucleotide) -> u64 {
        self.class(nucleotide).map_or(0, |summary| summary.count)
    }
}

/// Read-only result of a run: one summary per covered read position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FinalizedTable {
    pub positions: Vec<PositionSummary>,
}

impl FinalizedTable {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PositionSummary> {
        self.positions.iter()
    }

    /// Number of bases at the first position, i.e. the number of non-empty reads.
    pub fn max_count(&self) -> u64 {
        self.positions.first().map_or(0, |p| p.all.count)
    }
}
