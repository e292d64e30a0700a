use crate::export::OutputVersion;
use crate::sequence_processor::collectors::quality::{
    DEFAULT_MAX_QUALITY, DEFAULT_MIN_QUALITY, DEFAULT_QUALITY_OFFSET,
};
use clap::Parser;
use std::path::PathBuf;

/// Per-position quality statistics for FASTQ files
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Input FASTQ file, optionally compressed (default: stdin)
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file for the report (default: stdout)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Report layout
    #[arg(long = "ov", value_enum, default_value_t = OutputVersion::V1)]
    pub output_version: OutputVersion,

    /// Base quality offset
    #[arg(long = "bq", default_value_t = DEFAULT_QUALITY_OFFSET, help_heading = "Quality")]
    pub quality_offset: u8,

    /// Lowest accepted quality score
    #[arg(
        long = "mnq",
        default_value_t = DEFAULT_MIN_QUALITY,
        allow_negative_numbers = true,
        help_heading = "Quality"
    )]
    pub min_quality: i32,

    /// Highest accepted quality score
    #[arg(long = "mxq", default_value_t = DEFAULT_MAX_QUALITY, help_heading = "Quality")]
    pub max_quality: i32,

    /// Input block size in bytes
    #[arg(long = "ibufs", help_heading = "I/O Tuning")]
    pub block_size: Option<usize>,

    /// Longest accepted line in bytes
    #[arg(long = "mxsl", help_heading = "I/O Tuning")]
    pub max_line_length: Option<usize>,

    /// Number of worker threads (default: available CPUs)
    #[arg(short = 't', long = "threads", help_heading = "Parallelism")]
    pub threads: Option<usize>,

    /// Records per batch handed to a worker
    #[arg(long = "batch-size", help_heading = "Parallelism")]
    pub batch_size: Option<usize>,

    /// Skip malformed records instead of failing, and report how many were skipped
    #[arg(long)]
    pub lenient: bool,

    /// Show a progress spinner on stderr
    #[arg(long)]
    pub progress: bool,
}
