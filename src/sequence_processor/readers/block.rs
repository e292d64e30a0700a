use crate::error::{QualStatsError, Result};
use memchr::memchr;
use std::io::{self, BufRead, BufReader, Read};

/// Default block size for input reads, in bytes.
pub const DEFAULT_BLOCK_SIZE: usize = 32 * 1024;

/// Line source that pulls input in fixed-size blocks and hands out one line at a time.
///
/// Each refill is a single `read` of up to `block_size` bytes; lines are located inside the
/// block with `memchr`, and a line that straddles two blocks is stitched together in the
/// caller's buffer. Content is passed through unchanged apart from the line terminator
/// (`\n` or `\r\n`), which is stripped.
pub struct BlockLineReader<R: Read> {
    inner: BufReader<R>,
    bytes_read: u64,
    lines_read: u64,
}

impl<R: Read> BlockLineReader<R> {
    pub fn with_block_size(source: R, block_size: usize) -> Result<Self> {
        if block_size == 0 {
            return Err(QualStatsError::invalid_parameter(
                "block_size",
                "input block size must be at least 1 byte",
            ));
        }
        Ok(Self {
            inner: BufReader::with_capacity(block_size, source),
            bytes_read: 0,
            lines_read: 0,
        })
    }

    pub fn block_size(&self) -> usize {
        self.inner.capacity()
    }

    /// Bytes consumed from the source so far, terminators included.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    pub fn lines_read(&self) -> u64 {
        self.lines_read
    }

    /// Reads the next line into `line`, replacing its contents, and returns the line's full
    /// length without its terminator. `Ok(None)` marks the end of input; a final line
    /// without a terminator is still returned as a line.
    ///
    /// At most `max_len + 1` bytes are kept in `line`. The rest of a longer line is consumed
    /// and counted but not stored, so the caller can detect the overflow while memory stays
    /// bounded and the next call starts on the following line.
    pub fn read_line(&mut self, line: &mut Vec<u8>, max_len: usize) -> io::Result<Option<usize>> {
        line.clear();
        let keep = max_len.saturating_add(1);
        let mut length = 0usize;
        let mut last = None;
        let mut consumed_any = false;

        loop {
            let (found_eol, used) = {
                let block = match self.inner.fill_buf() {
                    Ok(block) => block,
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e),
                };
                if block.is_empty() {
                    break;
                }
                let (content, found_eol, used) = match memchr(b'\n', block) {
                    Some(eol) => (&block[..eol], true, eol + 1),
                    None => (block, false, block.len()),
                };
                if let Some(&byte) = content.last() {
                    last = Some(byte);
                }
                let room = keep.saturating_sub(line.len());
                line.extend_from_slice(&content[..content.len().min(room)]);
                length += content.len();
                (found_eol, used)
            };
            self.inner.consume(used);
            self.bytes_read += used as u64;
            consumed_any = true;
            if found_eol {
                break;
            }
        }

        if !consumed_any {
            return Ok(None);
        }
        if last == Some(b'\r') {
            length -= 1;
            line.truncate(length);
        }
        self.lines_read += 1;
        Ok(Some(length))
    }
}
