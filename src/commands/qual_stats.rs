use crate::api::{EngineOptions, QualStatsAnalyzer};
use crate::cli::Args;
use crate::config::Config;
use crate::export::QualStatsReport;
use crate::sequence_processor::collectors::quality::QualityEncoding;
use crate::sequence_processor::{DispatchOptions, ErrorPolicy, ReaderOptions};
use crate::utils::progress_bar_builder::ProgressBarBuilder;
use anyhow::{Context, Result};
use log::info;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

pub fn run(args: Args) -> Result<()> {
    let config = Config::load();
    let options = build_options(&args, &config)?;
    let lenient = options.reader.error_policy == ErrorPolicy::Lenient;

    let progress = ProgressBarBuilder::new("Reading records")
        .with_template("{spinner:.green} [{elapsed_precise}] {msg} {pos} records ({per_sec})")
        .with_tick()
        .visible(args.progress)
        .build()?;

    let analyzer = QualStatsAnalyzer::new(options)?.with_progress(progress);
    let output = match args.input.as_deref() {
        Some(path) if path != Path::new("-") => {
            info!("Reading {}", path.display());
            analyzer
                .analyze_path(path)
                .with_context(|| format!("Failed to compute statistics for {}", path.display()))?
        }
        _ => analyzer.analyze_stdin().context("Failed to compute statistics for stdin")?,
    };

    let mut report = QualStatsReport::new(&output.table, args.output_version);
    if lenient {
        report = report.with_skipped(output.stats.skipped);
    }

    let mut writer: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path)
                .with_context(|| format!("Failed to create output file {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    report.write_to(&mut writer).context("Failed to write report")?;
    writer.flush().context("Failed to write report")?;

    Ok(())
}

/// Command-line flags win over the config file, which wins over built-in defaults.
pub fn build_options(args: &Args, config: &Config) -> Result<EngineOptions> {
    let encoding = QualityEncoding::new(args.quality_offset, args.min_quality, args.max_quality)?;
    let options = EngineOptions {
        encoding,
        reader: ReaderOptions {
            block_size: args.block_size.unwrap_or(config.block_size),
            max_line_length: args.max_line_length.unwrap_or(config.max_line_length),
            error_policy: if args.lenient { ErrorPolicy::Lenient } else { ErrorPolicy::Strict },
        },
        dispatch: DispatchOptions {
            threads: args.threads.unwrap_or_else(|| config.threads()),
            batch_size: args.batch_size.unwrap_or(config.batch_size),
        },
    };
    options.validate()?;
    Ok(options)
}
