#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Renders records as four-line FASTQ text.
pub fn fastq(records: &[(&str, &str)]) -> String {
    records
        .iter()
        .enumerate()
        .map(|(i, (seq, qual))| format!("@read{}\n{}\n+\n{}\n", i + 1, seq, qual))
        .collect()
}

/// Deterministic pseudo-random reads with lengths in `[min_len, max_len]`.
pub fn synthetic_fastq(records: usize, min_len: usize, max_len: usize, seed: u64) -> String {
    let mut state = seed;
    let mut next = move || {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (state >> 33) as usize
    };

    let mut out = String::new();
    for i in 0..records {
        let len = min_len + next() % (max_len - min_len + 1);
        let seq: String = (0..len).map(|_| b"ACGTNacgt"[next() % 9] as char).collect();
        let qual: String = (0..len).map(|_| (b'!' + (next() % 42) as u8) as char).collect();
        out.push_str(&format!("@sample_{} len={}\n{}\n+\n{}\n", i, len, seq, qual));
    }
    out
}

pub fn write_fixture(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("Failed to write fixture");
    path
}

pub fn read_to_string(path: &Path) -> String {
    fs::read_to_string(path).expect("Failed to read output")
}
