use super::block::{BlockLineReader, DEFAULT_BLOCK_SIZE};
use crate::error::{QualStatsError, Result};
use crate::sequence_processor::{core::*, threading::*};
use indicatif::ProgressBar;
use log::debug;
use std::fs::File;
use std::io::{self, Cursor, Read};
use std::path::Path;

/// Longest accepted input line by default.
pub const DEFAULT_MAX_LINE_LENGTH: usize = 25_000;

const PROGRESS_INTERVAL: u64 = 100_000;

/// Bytes inspected to detect a compressed stream.
const MAGIC_LEN: usize = 5;

#[derive(Debug, Clone)]
pub struct ReaderOptions {
    pub block_size: usize,
    pub max_line_length: usize,
    pub error_policy: ErrorPolicy,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            error_policy: ErrorPolicy::Strict,
        }
    }
}

/// Streaming FASTQ parser that also accepts two-line FASTA input.
///
/// Every call to [`next_record`](FastqReader::next_record) consumes exactly one record
/// block of four (FASTQ) or two (FASTA) lines, skipping blank lines in front of a header,
/// so a malformed record never desynchronises the records after it.
pub struct FastqReader {
    lines: BlockLineReader<Box<dyn Read>>,
    options: ReaderOptions,
    next_index: u64,
    format: Option<SequenceFormat>,
    header: Vec<u8>,
    seq: Vec<u8>,
    separator: Vec<u8>,
    qual: Vec<u8>,
}

impl FastqReader {
    pub fn new(path: &Path, options: ReaderOptions) -> Result<Self> {
        let file = File::open(path).map_err(|source| QualStatsError::FileNotFound {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Opened {} with block size {}", path.display(), options.block_size);
        Self::from_reader(file, options)
    }

    pub fn from_stdin(options: ReaderOptions) -> Result<Self> {
        Self::from_reader(io::stdin(), options)
    }

    /// Wraps any byte source. Compressed input is detected from its magic bytes and
    /// decompressed transparently.
    pub fn from_reader<R: Read + 'static>(source: R, options: ReaderOptions) -> Result<Self> {
        let inner = sniff_compression(Box::new(source))?;
        Ok(Self {
            lines: BlockLineReader::with_block_size(inner, options.block_size)?,
            options,
            next_index: 0,
            format: None,
            header: Vec::new(),
            seq: Vec::new(),
            separator: Vec::new(),
            qual: Vec::new(),
        })
    }

    pub fn bytes_read(&self) -> u64 {
        self.lines.bytes_read()
    }

    /// Input format, known once the first header has been read.
    pub fn format(&self) -> Option<SequenceFormat> {
        self.format
    }

    /// Parses the next record. `Ok(None)` marks the end of input.
    ///
    /// The first header decides the format for the whole stream: `>` reads two-line FASTA
    /// records, anything else four-line FASTQ records.
    pub fn next_record(&mut self) -> Result<Option<FastqRecord>> {
        let mut too_long = None;
        loop {
            match self.read_checked_line(Member::Header, self.next_index + 1) {
                Ok(false) => return Ok(None),
                Ok(true) if self.header.is_empty() => continue,
                Ok(true) => break,
                Err(e @ QualStatsError::LineTooLong { .. }) => {
                    too_long = Some(e);
                    break;
                }
                Err(e) => return Err(e),
            }
        }

        let index = self.next_index;
        self.next_index += 1;
        let header_line = self.lines.lines_read();
        let marker = self.header[0];
        let format = *self.format.get_or_insert(SequenceFormat::from_marker(marker));

        let members: &[Member] = match format {
            SequenceFormat::Fasta => &[Member::Sequence],
            SequenceFormat::Fastq => &[Member::Sequence, Member::Separator, Member::Quality],
        };
        let mut found = 1;
        for &member in members {
            match self.read_checked_line(member, index + 1) {
                Ok(true) => found += 1,
                Ok(false) => break,
                Err(e @ QualStatsError::LineTooLong { .. }) => {
                    too_long.get_or_insert(e);
                    found += 1;
                }
                Err(e) => return Err(e),
            }
        }

        if found < format.lines_per_record() {
            return Err(QualStatsError::MalformedRecord {
                record: index + 1,
                line: header_line,
                reason: format!(
                    "truncated record: expected {} lines, found {}",
                    format.lines_per_record(),
                    found
                ),
            });
        }
        if let Some(e) = too_long {
            return Err(e);
        }

        let malformed = |line: u64, reason: String| QualStatsError::MalformedRecord {
            record: index + 1,
            line,
            reason,
        };

        if self.header[0] != format.marker() {
            return Err(malformed(
                header_line,
                format!(
                    "header line must start with '{}', found {:?}",
                    format.marker() as char,
                    String::from_utf8_lossy(&self.header[..1])
                ),
            ));
        }
        if format == SequenceFormat::Fasta {
            return Ok(Some(FastqRecord::fasta(index, &self.header[1..], &self.seq)));
        }
        if self.separator.first() != Some(&b'+') {
            return Err(malformed(
                header_line + 2,
                "separator line must start with '+'".to_string(),
            ));
        }
        if self.seq.len() != self.qual.len() {
            return Err(malformed(
                header_line + 3,
                format!(
                    "sequence length {} does not match quality length {}",
                    self.seq.len(),
                    self.qual.len()
                ),
            ));
        }

        let mut record = FastqRecord::new(index, &self.header[1..], &self.seq, &self.qual);
        record.comment = self.separator[1..].to_vec();
        Ok(Some(record))
    }

    fn read_checked_line(&mut self, member: Member, record: u64) -> Result<bool> {
        let buf = match member {
            Member::Header => &mut self.header,
            Member::Sequence => &mut self.seq,
            Member::Separator => &mut self.separator,
            Member::Quality => &mut self.qual,
        };
        let max = self.options.max_line_length;
        match self.lines.read_line(buf, max)? {
            None => Ok(false),
            Some(length) if length > max => Err(QualStatsError::LineTooLong {
                record,
                line: self.lines.lines_read(),
                length,
                max,
            }),
            Some(_) => Ok(true),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Member {
    Header,
    Sequence,
    Separator,
    Quality,
}

fn sniff_compression(mut source: Box<dyn Read>) -> Result<Box<dyn Read>> {
    let mut magic = Vec::with_capacity(MAGIC_LEN);
    (&mut source).take(MAGIC_LEN as u64).read_to_end(&mut magic)?;

    // Anything shorter than a compression header is plain text.
    if magic.len() < MAGIC_LEN {
        return Ok(Box::new(Cursor::new(magic)));
    }

    let rejoined: Box<dyn Read> = Box::new(Cursor::new(magic).chain(source));
    let (reader, format) = niffler::get_reader(rejoined)
        .map_err(|e| QualStatsError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))?;
    debug!("Detected input compression: {:?}", format);
    Ok(reader)
}

impl Iterator for FastqReader {
    type Item = Result<FastqRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

impl SequenceReader for FastqReader {
    fn read_records_single_thread<P: SequenceProcessor>(
        &mut self,
        processor: &mut P,
        progress: &ProgressBar,
    ) -> Result<ProcessingStats> {
        let policy = self.options.error_policy;
        let mut stats = ProcessingStats::default();

        loop {
            let record = match self.next_record() {
                Ok(Some(record)) => record,
                Ok(None) => break,
                Err(e) => {
                    policy.handle(e, &mut stats)?;
                    continue;
                }
            };

            match processor.process_record(&record) {
                Ok(()) => {
                    stats.processed += 1;
                    stats.bases += record.len() as u64;
                }
                Err(e) => policy.handle(e, &mut stats)?,
            }

            if stats.processed % PROGRESS_INTERVAL == 0 {
                progress.set_position(stats.processed);
            }
        }

        progress.set_position(stats.processed);
        Ok(stats)
    }

    fn read_records_with_threads<P: SequenceProcessor>(
        &mut self,
        processor: &mut P,
        progress: &ProgressBar,
        options: &DispatchOptions,
    ) -> Result<ProcessingStats> {
        if options.threads <= 1 || !processor.supports_parallel() {
            return self.read_records_single_thread(processor, progress);
        }

        let policy = self.options.error_policy;
        let batch_size = options.batch_size.max(1);
        let mut pool = ShardPool::with_batch_size(&*processor, options.threads, policy, batch_size)?;
        debug!("Dispatching batches of {} records to {} shards", batch_size, pool.num_shards());
        let mut stats = ProcessingStats::default();
        let mut batch = Vec::with_capacity(batch_size);
        let mut dispatched = 0u64;

        while !pool.is_cancelled() {
            match self.next_record() {
                Ok(Some(record)) => {
                    batch.push(record);
                    if batch.len() >= batch_size {
                        let full = std::mem::replace(&mut batch, Vec::with_capacity(batch_size));
                        dispatched += full.len() as u64;
                        if pool.send(full).is_err() {
                            // A worker stopped early; finish() reports why.
                            break;
                        }
                        if dispatched % PROGRESS_INTERVAL < batch_size as u64 {
                            progress.set_position(dispatched);
                        }
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    if let Err(e) = policy.handle(e, &mut stats) {
                        // Records ahead of the failure may hold an earlier error.
                        if !batch.is_empty() {
                            let _ = pool.send(std::mem::take(&mut batch));
                        }
                        return Err(pool.abort(e, self.next_index + 1));
                    }
                }
            }
        }

        if !batch.is_empty() && !pool.is_cancelled() {
            dispatched += batch.len() as u64;
            // A failed send surfaces as the worker's error in finish().
            let _ = pool.send(batch);
        }
        progress.set_position(dispatched);

        let (processors, shard_stats) = pool.finish()?;
        stats.absorb(&shard_stats);

        merge_processors(processors, processor, progress)?;

        Ok(stats)
    }
}
