#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProcessingStats {
    pub processed: u64,
    pub skipped: u64,
    pub bases: u64,
}

impl ProcessingStats {
    pub fn absorb(&mut self, other: &ProcessingStats) {
        self.processed += other.processed;
        self.skipped += other.skipped;
        self.bases += other.bases;
    }
}
