pub mod formats;

pub use formats::qual_stats::{OutputVersion, QualStatsReport};
