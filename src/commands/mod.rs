pub mod qual_stats;
