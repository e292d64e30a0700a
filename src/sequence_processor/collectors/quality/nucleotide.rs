use super::encoding::QualityEncoding;
use super::summary::QualitySummary;

/// Statistic classes kept for every read position. `All` covers every base regardless of
/// symbol; the others cover one base symbol each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Nucleotide {
    All,
    A,
    C,
    G,
    T,
    N,
}

impl Nucleotide {
    pub const COUNT: usize = 6;

    /// Classes in report order.
    pub const CLASSES: [Nucleotide; Self::COUNT] = [
        Nucleotide::All,
        Nucleotide::A,
        Nucleotide::C,
        Nucleotide::G,
        Nucleotide::T,
        Nucleotide::N,
    ];

    pub const BASES: [Nucleotide; 5] =
        [Nucleotide::A, Nucleotide::C, Nucleotide::G, Nucleotide::T, Nucleotide::N];

    /// Class of a sequence symbol, case-insensitive. Symbols outside ACGTN have none and
    /// only count towards [`Nucleotide::All`].
    #[inline]
    pub fn from_base(base: u8) -> Option<Nucleotide> {
        match base {
            b'A' | b'a' => Some(Nucleotide::A),
            b'C' | b'c' => Some(Nucleotide::C),
            b'G' | b'g' => Some(Nucleotide::G),
            b'T' | b't' => Some(Nucleotide::T),
            b'N' | b'n' => Some(Nucleotide::N),
            _ => None,
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Nucleotide::All => "ALL",
            Nucleotide::A => "A",
            Nucleotide::C => "C",
            Nucleotide::G => "G",
            Nucleotide::T => "T",
            Nucleotide::N => "N",
        }
    }
}

/// Quality accumulator for one class at one position.
///
/// The histogram stays unallocated until the first scored observation. Bases without a
/// quality (FASTA input) only raise `count`, so a class with `count > 0` and no histogram
/// is count-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NucleotideStats {
    pub count: u64,
    pub sum: i64,
    pub sum_of_squares: u64,
    pub min: i32,
    pub max: i32,
    histogram: Vec<u64>,
}

impl Default for NucleotideStats {
    fn default() -> Self {
        Self {
            count: 0,
            sum: 0,
            sum_of_squares: 0,
            min: i32::MAX,
            max: i32::MIN,
            histogram: Vec::new(),
        }
    }
}

impl NucleotideStats {
    #[inline]
    pub fn observe(&mut self, quality: i32, encoding: &QualityEncoding) {
        if self.histogram.is_empty() {
            self.histogram = vec![0; encoding.bins()];
        }
        self.count += 1;
        self.sum += i64::from(quality);
        self.sum_of_squares += u64::from(quality.unsigned_abs()).pow(2);
        self.min = self.min.min(quality);
        self.max = self.max.max(quality);
        self.histogram[encoding.bin(quality)] += 1;
    }

    #[inline]
    pub fn observe_unscored(&mut self, read_count: u64) {
        self.count += read_count;
    }

    /// True when at least one observation carried a quality.
    pub fn is_scored(&self) -> bool {
        !self.histogram.is_empty()
    }

    pub fn merge(&mut self, other: &NucleotideStats) {
        if other.count == 0 {
            return;
        }
        self.count += other.count;
        self.sum += other.sum;
        self.sum_of_squares += other.sum_of_squares;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
        if self.histogram.is_empty() {
            self.histogram = other.histogram.clone();
        } else {
            for (mine, theirs) in self.histogram.iter_mut().zip(&other.histogram) {
                *mine += theirs;
            }
        }
    }

    pub fn histogram(&self) -> &[u64] {
        &self.histogram
    }

    /// Score at 0-based rank `n` among all observed scores in ascending order.
    pub fn nth_value(&self, n: u64, encoding: &QualityEncoding) -> Option<i32> {
        let mut remaining = n;
        for (bin, &count) in self.histogram.iter().enumerate() {
            if count > remaining {
                return Some(encoding.score(bin));
            }
            remaining -= count;
        }
        None
    }

    /// Population standard deviation. The numerator is computed exactly in integers so
    /// uniform inputs give exactly zero.
    pub fn std_dev(&self) -> Option<f64> {
        if self.count == 0 {
            return None;
        }
        let n = i128::from(self.count);
        let numerator = n * i128::from(self.sum_of_squares) - i128::from(self.sum).pow(2);
        let variance = numerator.max(0) as f64 / (n * n) as f64;
        Some(variance.sqrt())
    }

    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum as f64 / self.count as f64)
    }

    pub fn summarize(&self, encoding: &QualityEncoding) -> Option<QualitySummary> {
        if self.count == 0 {
            return None;
        }
        if !self.is_scored() {
            return Some(QualitySummary::count_only(self.count));
        }
        let rank = |n: u64| self.nth_value(n, encoding).unwrap_or(self.max);
        let q1 = rank(self.count / 4);
        let median = rank(self.count / 2);
        let q3 = rank(self.count * 3 / 4);
        let iqr = q3 - q1;
        let reach = iqr * 3 / 2;

        Some(QualitySummary {
            count: self.count,
            min: self.min,
            max: self.max,
            sum: self.sum,
            mean: self.mean().unwrap_or_default(),
            std_dev: self.std_dev().unwrap_or_default(),
            q1,
            median,
            q3,
            iqr,
            left_whisker: (q1 - reach).max(self.min),
            right_whisker: (q3 + reach).min(self.max),
            scored: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats_from(qualities: &[i32]) -> NucleotideStats {
        let encoding = QualityEncoding::default();
        let mut stats = NucleotideStats::default();
        for &q in qualities {
            stats.observe(q, &encoding);
        }
        stats
    }

    #[test]
    fn test_classify_bases() {
        assert_eq!(Nucleotide::from_base(b'a'), Some(Nucleotide::A));
        assert_eq!(Nucleotide::from_base(b'N'), Some(Nucleotide::N));
        assert_eq!(Nucleotide::from_base(b'R'), None);
        assert_eq!(Nucleotide::CLASSES[Nucleotide::G.index()], Nucleotide::G);
    }

    #[test]
    fn test_nth_value_follows_sorted_order() {
        let encoding = QualityEncoding::default();
        let stats = stats_from(&[40, 10, 20, 20, 30]);
        let values: Vec<i32> = (0..5).map(|n| stats.nth_value(n, &encoding).unwrap()).collect();
        assert_eq!(values, vec![10, 20, 20, 30, 40]);
        assert_eq!(stats.nth_value(5, &encoding), None);
    }

    #[test]
    fn test_summary_quartiles_and_whiskers() {
        let encoding = QualityEncoding::default();
        let stats = stats_from(&[2, 30, 31, 32, 33, 34, 35, 36]);
        let summary = stats.summarize(&encoding).unwrap();
        // ranks 2, 4 and 6 of the sorted values
        assert_eq!(summary.q1, 31);
        assert_eq!(summary.median, 33);
        assert_eq!(summary.q3, 35);
        assert_eq!(summary.iqr, 4);
        assert_eq!(summary.left_whisker, 25);
        assert_eq!(summary.right_whisker, 36);
        assert_eq!(summary.min, 2);
        assert_eq!(summary.sum, 233);
    }

    #[test]
    fn test_uniform_std_dev_is_exactly_zero() {
        let stats = stats_from(&[37; 1000]);
        assert_eq!(stats.std_dev(), Some(0.0));
        assert_eq!(stats.mean(), Some(37.0));
    }

    #[test]
    fn test_std_dev_population() {
        let stats = stats_from(&[2, 4, 4, 4, 5, 5, 7, 9]);
        assert_eq!(stats.std_dev(), Some(2.0));
    }

    #[test]
    fn test_negative_qualities() {
        let encoding = QualityEncoding::default();
        let stats = stats_from(&[-5, 5]);
        assert_eq!(stats.sum, 0);
        assert_eq!(stats.sum_of_squares, 50);
        assert_eq!(stats.nth_value(0, &encoding), Some(-5));
        assert_eq!(stats.std_dev(), Some(5.0));
    }

    #[test]
    fn test_merge_matches_single_pass() {
        let combined = stats_from(&[10, 20, 30, 40, 11]);
        let mut left = stats_from(&[10, 20]);
        left.merge(&stats_from(&[30, 40, 11]));
        assert_eq!(left, combined);

        let mut empty = NucleotideStats::default();
        empty.merge(&combined);
        assert_eq!(empty, combined);

        let mut unchanged = combined.clone();
        unchanged.merge(&NucleotideStats::default());
        assert_eq!(unchanged, combined);
    }

    #[test]
    fn test_unscored_observations() {
        let mut stats = NucleotideStats::default();
        stats.observe_unscored(12);
        stats.observe_unscored(3);
        assert_eq!(stats.count, 15);
        assert!(!stats.is_scored());

        let summary = stats.summarize(&QualityEncoding::default()).unwrap();
        assert_eq!(summary, QualitySummary::count_only(15));

        let mut merged = NucleotideStats::default();
        merged.merge(&stats);
        merged.merge(&stats);
        assert_eq!(merged.count, 30);
        assert!(!merged.is_scored());
    }

    #[test]
    fn test_empty_has_no_summary() {
        let stats = NucleotideStats::default();
        assert!(stats.summarize(&QualityEncoding::default()).is_none());
        assert!(stats.mean().is_none());
    }
}
