use crate::error::{QualStatsError, Result};

/// Phred+33 offset used by Sanger and current Illumina FASTQ.
pub const DEFAULT_QUALITY_OFFSET: u8 = 33;
/// Lowest score accepted by default; low enough for Solexa+64 data.
pub const DEFAULT_MIN_QUALITY: i32 = -15;
/// Highest Phred score representable in printable ASCII.
pub const DEFAULT_MAX_QUALITY: i32 = 93;

/// How quality characters map to scores, and which scores are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualityEncoding {
    pub offset: u8,
    pub min: i32,
    pub max: i32,
}

impl Default for QualityEncoding {
    fn default() -> Self {
        Self {
            offset: DEFAULT_QUALITY_OFFSET,
            min: DEFAULT_MIN_QUALITY,
            max: DEFAULT_MAX_QUALITY,
        }
    }
}

impl QualityEncoding {
    pub fn new(offset: u8, min: i32, max: i32) -> Result<Self> {
        let encoding = Self { offset, min, max };
        encoding.validate()?;
        Ok(encoding)
    }

    pub fn validate(&self) -> Result<()> {
        if self.min >= self.max {
            return Err(QualStatsError::invalid_parameter(
                "min_quality",
                format!("minimum quality {} must be below maximum {}", self.min, self.max),
            ));
        }
        let (lowest, highest) = self.decodable_range();
        if self.min < lowest || self.max > highest {
            return Err(QualStatsError::invalid_parameter(
                "quality_range",
                format!(
                    "[{}, {}] must lie within [{}, {}], the scores a byte decodes to with offset {}",
                    self.min, self.max, lowest, highest, self.offset
                ),
            ));
        }
        Ok(())
    }

    /// Scores reachable by decoding any byte with this offset.
    pub fn decodable_range(&self) -> (i32, i32) {
        let offset = i32::from(self.offset);
        (-offset, i32::from(u8::MAX) - offset)
    }

    #[inline]
    pub fn decode(&self, symbol: u8) -> i32 {
        i32::from(symbol) - i32::from(self.offset)
    }

    #[inline]
    pub fn contains(&self, quality: i32) -> bool {
        (self.min..=self.max).contains(&quality)
    }

    /// Number of distinct scores in `[min, max]`.
    pub fn bins(&self) -> usize {
        (self.max - self.min + 1) as usize
    }

    /// Histogram slot of an in-range score.
    #[inline]
    pub fn bin(&self, quality: i32) -> usize {
        (quality - self.min) as usize
    }

    pub fn score(&self, bin: usize) -> i32 {
        self.min + bin as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_phred33() {
        let encoding = QualityEncoding::default();
        assert_eq!(encoding.decode(b'!'), 0);
        assert_eq!(encoding.decode(b'?'), 30);
        assert_eq!(encoding.decode(b'I'), 40);
        assert_eq!(encoding.decode(b' '), -1);
    }

    #[test]
    fn test_bins_cover_range() {
        let encoding = QualityEncoding::default();
        assert_eq!(encoding.bins(), 109);
        assert_eq!(encoding.bin(-15), 0);
        assert_eq!(encoding.bin(93), 108);
        assert_eq!(encoding.score(encoding.bin(30)), 30);
        assert!(encoding.contains(93));
        assert!(!encoding.contains(94));
        assert!(!encoding.contains(-16));
    }

    #[test]
    fn test_range_must_be_decodable() {
        assert!(QualityEncoding::new(33, i32::MIN, i32::MAX).is_err());
        assert!(QualityEncoding::new(33, -1_000_000_000, 1_000_000_000).is_err());
        assert!(QualityEncoding::new(33, -34, 93).is_err());
        assert!(QualityEncoding::new(33, 0, 223).is_err());

        let widest = QualityEncoding::new(33, -33, 222).unwrap();
        assert_eq!(widest.bins(), 256);
        assert_eq!(widest.decodable_range(), (-33, 222));
        assert!(QualityEncoding::new(0, 0, 255).is_ok());
    }

    #[test]
    fn test_inverted_range_rejected() {
        assert!(QualityEncoding::new(33, 40, 40).is_err());
        assert!(QualityEncoding::new(64, 0, 62).is_ok());
    }
}
