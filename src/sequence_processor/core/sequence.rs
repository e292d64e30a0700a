use std::borrow::Cow;

/// Input flavour, decided by the first header marker of a stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SequenceFormat {
    /// Two-line `>` records without qualities.
    Fasta,
    /// Four-line `@` records.
    #[default]
    Fastq,
}

impl SequenceFormat {
    pub fn from_marker(marker: u8) -> Self {
        if marker == b'>' {
            SequenceFormat::Fasta
        } else {
            SequenceFormat::Fastq
        }
    }

    pub fn marker(self) -> u8 {
        match self {
            SequenceFormat::Fasta => b'>',
            SequenceFormat::Fastq => b'@',
        }
    }

    pub fn lines_per_record(self) -> usize {
        match self {
            SequenceFormat::Fasta => 2,
            SequenceFormat::Fastq => 4,
        }
    }
}

/// One FASTQ or FASTA entry. `index` is the 0-based ordinal of the record in its input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FastqRecord {
    pub index: u64,
    pub id: Vec<u8>,
    pub seq: Vec<u8>,
    pub comment: Vec<u8>,
    pub qual: Vec<u8>,
    pub format: SequenceFormat,
    /// Number of identical reads this entry stands for; always 1 for FASTQ.
    pub read_count: u64,
}

impl FastqRecord {
    pub fn new(index: u64, id: &[u8], seq: &[u8], qual: &[u8]) -> Self {
        Self {
            index,
            id: id.to_vec(),
            seq: seq.to_vec(),
            comment: Vec::new(),
            qual: qual.to_vec(),
            format: SequenceFormat::Fastq,
            read_count: 1,
        }
    }

    /// A quality-less record. Collapsed FASTA ids of the form `<name>-<count>` carry their
    /// read count after the first dash.
    pub fn fasta(index: u64, id: &[u8], seq: &[u8]) -> Self {
        Self {
            index,
            id: id.to_vec(),
            seq: seq.to_vec(),
            comment: Vec::new(),
            qual: Vec::new(),
            format: SequenceFormat::Fasta,
            read_count: collapsed_read_count(id),
        }
    }

    pub fn len(&self) -> usize {
        self.seq.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }

    /// 1-based record number, as used in error messages.
    pub fn number(&self) -> u64 {
        self.index + 1
    }

    pub fn id_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.id)
    }
}

/// Leading digits after the first `-` of `id`; 1 when absent, zero or unparsable.
fn collapsed_read_count(id: &[u8]) -> u64 {
    let Some(dash) = memchr::memchr(b'-', id) else {
        return 1;
    };
    let count = id[dash + 1..]
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .fold(0u64, |acc, &b| acc.saturating_mul(10).saturating_add(u64::from(b - b'0')));
    count.max(1)
}
