pub mod qual_stats;

pub use qual_stats::{EngineOptions, QualStatsAnalyzer, QualStatsOutput};
