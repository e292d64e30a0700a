use super::core::*;
use crate::error::{QualStatsError, Result};
use crossbeam_channel::{bounded, Sender};
use indicatif::ProgressBar;
use log::{debug, warn};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

/// Records per batch handed to a shard.
pub const DEFAULT_BATCH_SIZE: usize = 1024;

/// Batches that may wait in one shard's queue before the reader blocks.
const QUEUE_DEPTH: usize = 4;

/// A shard whose record count exceeds the mean by this factor is reported.
const IMBALANCE_FACTOR: f64 = 1.5;

#[derive(Debug, Clone)]
pub struct DispatchOptions {
    pub threads: usize,
    pub batch_size: usize,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self { threads: 1, batch_size: DEFAULT_BATCH_SIZE }
    }
}

type ShardOutcome<P> = Result<(P, ProcessingStats)>;

/// No failure recorded yet.
const NO_FAILURE: u64 = u64::MAX;

/// Fixed set of worker threads, one per shard.
///
/// Batches are assigned round-robin: batch `k` goes to shard `k % shards`. Every shard owns
/// its processor outright until [`finish`](ShardPool::finish) joins the workers and hands
/// the processors back, so accumulation takes no locks.
///
/// The only shared state is the number of the lowest record that failed so far. Once it is
/// set, shards drop every batch that starts after it but still work through batches that
/// start before it, so the failure finally reported is always the one with the lowest record
/// number regardless of thread timing.
pub struct ShardPool<P: SequenceProcessor> {
    handles: Vec<thread::JoinHandle<ShardOutcome<P>>>,
    senders: Vec<Sender<Vec<FastqRecord>>>,
    failed_at: Arc<AtomicU64>,
    next_shard: usize,
    dispatched: Vec<u64>,
    batch_size: usize,
}

impl<P: SequenceProcessor> ShardPool<P> {
    pub fn new(template: &P, num_shards: usize, policy: ErrorPolicy) -> Result<Self> {
        Self::with_batch_size(template, num_shards, policy, DEFAULT_BATCH_SIZE)
    }

    pub fn with_batch_size(
        template: &P,
        num_shards: usize,
        policy: ErrorPolicy,
        batch_size: usize,
    ) -> Result<Self> {
        if num_shards == 0 {
            return Err(QualStatsError::invalid_parameter("threads", "must be at least 1"));
        }

        let failed_at = Arc::new(AtomicU64::new(NO_FAILURE));
        let mut handles = Vec::with_capacity(num_shards);
        let mut senders = Vec::with_capacity(num_shards);

        for shard in 0..num_shards {
            let (tx, rx) = bounded::<Vec<FastqRecord>>(QUEUE_DEPTH);
            let mut worker_processor = template.fork();
            let failed_at = Arc::clone(&failed_at);

            let handle = thread::Builder::new()
                .name(format!("qual-stats-shard-{}", shard))
                .spawn(move || {
                    let mut local_stats = ProcessingStats::default();
                    for batch in rx.iter() {
                        let first = batch.first().map_or(NO_FAILURE, FastqRecord::number);
                        if first > failed_at.load(Ordering::Acquire) {
                            return Err(QualStatsError::Cancelled);
                        }
                        for record in &batch {
                            match worker_processor.process_record(record) {
                                Ok(()) => {
                                    local_stats.processed += 1;
                                    local_stats.bases += record.len() as u64;
                                }
                                Err(e) => {
                                    if let Err(e) = policy.handle(e, &mut local_stats) {
                                        record_failure(&failed_at, &e);
                                        return Err(e);
                                    }
                                }
                            }
                        }
                    }
                    debug!("Shard {} processed {} records", shard, local_stats.processed);
                    Ok((worker_processor, local_stats))
                })?;

            handles.push(handle);
            senders.push(tx);
        }

        Ok(ShardPool {
            handles,
            senders,
            failed_at,
            next_shard: 0,
            dispatched: vec![0; num_shards],
            batch_size: batch_size.max(1),
        })
    }

    pub fn num_shards(&self) -> usize {
        self.senders.len()
    }

    /// True once any shard has failed; records read after this point cannot change the
    /// outcome.
    pub fn is_cancelled(&self) -> bool {
        self.failed_at.load(Ordering::Acquire) != NO_FAILURE
    }

    /// Hands `batch` to the next shard in round-robin order. Fails if that shard has
    /// already stopped; the reason is reported by [`finish`](ShardPool::finish).
    pub fn send(&mut self, batch: Vec<FastqRecord>) -> Result<()> {
        let shard = self.next_shard;
        self.next_shard = (self.next_shard + 1) % self.senders.len();
        let len = batch.len() as u64;

        self.senders[shard].send(batch).map_err(|_| QualStatsError::Cancelled)?;
        self.dispatched[shard] += len;
        Ok(())
    }

    /// Stops the pool after a reader-side failure. Batches already queued ahead of the
    /// failing record are still checked, and whichever failure has the lowest record number
    /// is returned. All partial shard results are discarded.
    ///
    /// `at_record` bounds the failing record for errors that carry no record number.
    pub fn abort(mut self, error: QualStatsError, at_record: u64) -> QualStatsError {
        let failing = error.record_number().unwrap_or(at_record);
        self.failed_at.fetch_min(failing, Ordering::AcqRel);
        let (_, _, failure) = self.join();
        pick_failure(failure, error)
    }

    /// Closes the queues, waits for every shard and returns the shard processors in shard
    /// order together with their combined counters.
    ///
    /// If any shard failed, all results are discarded and the failure with the lowest record
    /// number is returned.
    pub fn finish(mut self) -> Result<(Vec<P>, ProcessingStats)> {
        let (processors, stats, failure) = self.join();
        if let Some(e) = failure {
            return Err(e);
        }

        report_imbalance(&self.dispatched, self.batch_size);
        Ok((processors, stats))
    }

    fn join(&mut self) -> (Vec<P>, ProcessingStats, Option<QualStatsError>) {
        self.senders.clear();

        let mut stats = ProcessingStats::default();
        let mut processors = Vec::with_capacity(self.handles.len());
        let mut failure: Option<QualStatsError> = None;

        for (shard, handle) in self.handles.drain(..).enumerate() {
            let outcome = handle
                .join()
                .unwrap_or(Err(QualStatsError::WorkerPanicked { shard }));
            match outcome {
                Ok((worker_processor, worker_stats)) => {
                    processors.push(worker_processor);
                    stats.absorb(&worker_stats);
                }
                Err(e) => failure = Some(pick_failure(failure, e)),
            }
        }

        (processors, stats, failure)
    }
}

fn record_failure(failed_at: &AtomicU64, error: &QualStatsError) {
    failed_at.fetch_min(error.record_number().unwrap_or(0), Ordering::AcqRel);
}

/// Prefers real failures over cancellations, then the lowest record number.
fn pick_failure(current: Option<QualStatsError>, candidate: QualStatsError) -> QualStatsError {
    let current = match current {
        None => return candidate,
        Some(current) => current,
    };
    match (&current, &candidate) {
        (QualStatsError::Cancelled, _) => candidate,
        (_, QualStatsError::Cancelled) => current,
        _ => match (current.record_number(), candidate.record_number()) {
            (Some(a), Some(b)) if b < a => candidate,
            (None, Some(_)) => candidate,
            _ => current,
        },
    }
}

/// The busiest shard with its record count and the mean, when it exceeds the mean by
/// [`IMBALANCE_FACTOR`]. Runs with fewer than one full batch per shard are never flagged.
fn imbalanced_shard(dispatched: &[u64], batch_size: usize) -> Option<(usize, u64, f64)> {
    let total: u64 = dispatched.iter().sum();
    if dispatched.len() < 2 || total < (batch_size * dispatched.len()) as u64 {
        return None;
    }
    let mean = total as f64 / dispatched.len() as f64;
    let (shard, &busiest) = dispatched.iter().enumerate().max_by_key(|&(_, &n)| n)?;
    (busiest as f64 > mean * IMBALANCE_FACTOR).then_some((shard, busiest, mean))
}

fn report_imbalance(dispatched: &[u64], batch_size: usize) {
    if let Some((shard, busiest, mean)) = imbalanced_shard(dispatched, batch_size) {
        warn!(
            "Partition imbalance: shard {} received {} records (mean {:.1} across {} shards)",
            shard,
            busiest,
            mean,
            dispatched.len()
        );
    }
}

/// Folds shard results into `main_processor` in shard order.
pub fn merge_processors<P: SequenceProcessor>(
    processors: Vec<P>,
    main_processor: &mut P,
    progress: &ProgressBar,
) -> Result<()> {
    let total = processors.len();
    for (idx, worker_processor) in processors.into_iter().enumerate() {
        progress.set_message(format!("Merging shard {} of {}", idx + 1, total));
        main_processor.merge_processor(worker_processor)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Counts records and fails on ids starting with "bad".
    struct Counter {
        seen: Vec<u64>,
    }

    impl SequenceProcessor for Counter {
        fn process_record(&mut self, record: &FastqRecord) -> Result<()> {
            if record.id.starts_with(b"bad") {
                return Err(QualStatsError::MalformedRecord {
                    record: record.number(),
                    line: record.index * 4 + 1,
                    reason: "bad record".to_string(),
                });
            }
            self.seen.push(record.index);
            Ok(())
        }

        fn fork(&self) -> Self {
            Counter { seen: Vec::new() }
        }

        fn supports_parallel(&self) -> bool {
            true
        }

        fn merge_processor(&mut self, other: Self) -> Result<()> {
            self.seen.extend(other.seen);
            Ok(())
        }
    }

    fn batch(range: std::ops::Range<u64>) -> Vec<FastqRecord> {
        range.map(|i| FastqRecord::new(i, b"ok", b"A", b"I")).collect()
    }

    #[test]
    fn test_round_robin_assignment() {
        let template = Counter { seen: Vec::new() };
        let mut pool = ShardPool::with_batch_size(&template, 3, ErrorPolicy::Strict, 2).unwrap();
        for start in (0..12).step_by(2) {
            pool.send(batch(start..start + 2)).unwrap();
        }
        let (processors, stats) = pool.finish().unwrap();

        assert_eq!(stats.processed, 12);
        assert_eq!(processors.len(), 3);
        assert_eq!(processors[0].seen, vec![0, 1, 6, 7]);
        assert_eq!(processors[1].seen, vec![2, 3, 8, 9]);
        assert_eq!(processors[2].seen, vec![4, 5, 10, 11]);

        let mut main = template.fork();
        merge_processors(processors, &mut main, &ProgressBar::hidden()).unwrap();
        let mut all = main.seen;
        all.sort_unstable();
        assert_eq!(all, (0..12).collect::<Vec<_>>());
    }

    #[test]
    fn test_strict_failure_discards_results() {
        let template = Counter { seen: Vec::new() };
        let mut pool = ShardPool::new(&template, 2, ErrorPolicy::Strict).unwrap();
        let mut records = batch(0..4);
        records[2].id = b"bad".to_vec();
        let _ = pool.send(records);
        let _ = pool.send(batch(4..8));

        match pool.finish() {
            Err(QualStatsError::MalformedRecord { record, .. }) => assert_eq!(record, 3),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("expected failure"),
        }
    }

    #[test]
    fn test_lowest_failure_wins() {
        for _ in 0..20 {
            let template = Counter { seen: Vec::new() };
            let mut pool = ShardPool::with_batch_size(&template, 2, ErrorPolicy::Strict, 2).unwrap();
            let mut records = batch(0..8);
            records[1].id = b"bad".to_vec();
            records[6].id = b"bad".to_vec();
            for chunk in records.chunks(2) {
                let _ = pool.send(chunk.to_vec());
            }
            let err = pool.finish().err().unwrap();
            assert_eq!(err.record_number(), Some(2));
        }
    }

    #[test]
    fn test_lenient_failure_is_counted() {
        let template = Counter { seen: Vec::new() };
        let mut pool = ShardPool::new(&template, 2, ErrorPolicy::Lenient).unwrap();
        let mut records = batch(0..4);
        records[1].id = b"bad".to_vec();
        pool.send(records).unwrap();
        pool.send(batch(4..8)).unwrap();

        let (processors, stats) = pool.finish().unwrap();
        assert_eq!(stats.processed, 7);
        assert_eq!(stats.skipped, 1);
        assert_eq!(processors.iter().map(|p| p.seen.len()).sum::<usize>(), 7);
    }

    #[test]
    fn test_abort_returns_reader_error() {
        let template = Counter { seen: Vec::new() };
        let mut pool = ShardPool::new(&template, 2, ErrorPolicy::Strict).unwrap();
        pool.send(batch(0..4)).unwrap();
        let err = pool.abort(
            QualStatsError::MalformedRecord { record: 5, line: 17, reason: "truncated".to_string() },
            6,
        );
        assert_eq!(err.record_number(), Some(5));
    }

    #[test]
    fn test_abort_keeps_earlier_worker_failure() {
        let template = Counter { seen: Vec::new() };
        let mut pool = ShardPool::with_batch_size(&template, 2, ErrorPolicy::Strict, 2).unwrap();
        let mut records = batch(0..4);
        records[0].id = b"bad".to_vec();
        for chunk in records.chunks(2) {
            let _ = pool.send(chunk.to_vec());
        }
        let io = QualStatsError::Io(std::io::Error::from(std::io::ErrorKind::UnexpectedEof));
        let err = pool.abort(io, 5);
        assert_eq!(err.record_number(), Some(1));
    }

    /// Panics on ids starting with "panic".
    struct Exploding;

    impl SequenceProcessor for Exploding {
        fn process_record(&mut self, record: &FastqRecord) -> Result<()> {
            if record.id.starts_with(b"panic") {
                panic!("record {} blew up", record.number());
            }
            Ok(())
        }

        fn fork(&self) -> Self {
            Exploding
        }

        fn merge_processor(&mut self, _other: Self) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_worker_panic_is_reported() {
        let mut pool = ShardPool::with_batch_size(&Exploding, 2, ErrorPolicy::Lenient, 2).unwrap();
        let mut records = batch(0..4);
        records[3].id = b"panic".to_vec();
        for chunk in records.chunks(2) {
            let _ = pool.send(chunk.to_vec());
        }
        assert!(matches!(pool.finish(), Err(QualStatsError::WorkerPanicked { shard: 1 })));
    }

    #[test]
    fn test_imbalance_detection() {
        // balanced
        assert_eq!(imbalanced_shard(&[100, 100, 100, 100], 10), None);
        // one shard far above the mean of 175
        assert_eq!(imbalanced_shard(&[400, 100, 100, 100], 10), Some((0, 400, 175.0)));
        // below one full batch per shard
        assert_eq!(imbalanced_shard(&[30, 0, 0, 0], 10), None);
        assert_eq!(imbalanced_shard(&[500], 10), None);
    }

    #[test]
    fn test_zero_shards_rejected() {
        let template = Counter { seen: Vec::new() };
        assert!(ShardPool::new(&template, 0, ErrorPolicy::Strict).is_err());
    }

    #[test]
    fn test_pick_failure_prefers_real_errors() {
        let real = QualStatsError::MalformedRecord { record: 9, line: 1, reason: String::new() };
        let picked = pick_failure(Some(QualStatsError::Cancelled), real);
        assert_eq!(picked.record_number(), Some(9));

        let earlier = QualStatsError::MalformedRecord { record: 2, line: 1, reason: String::new() };
        let picked = pick_failure(Some(picked), earlier);
        assert_eq!(picked.record_number(), Some(2));

        let picked = pick_failure(Some(picked), QualStatsError::Cancelled);
        assert_eq!(picked.record_number(), Some(2));
    }
}
