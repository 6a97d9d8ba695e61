use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread;

use crossbeam_channel::{Receiver, Sender, unbounded};
use log::{debug, error, warn};

use crate::core::actions::cancellation::{CancelToken, RunToken};
use crate::core::actions::schedule_rows::errors::ScheduleError;
use crate::core::actions::schedule_rows::policy::{DistributionPolicy, PolicyKind, ScheduleReport};
use crate::core::actions::schedule_rows::ports::row_sink::RowSink;
use crate::core::actions::schedule_rows::row_task::RowTask;

/// Persistent worker threads pulling row jobs from one shared unbounded
/// queue. Workers outlive runs; every job carries the token of the run that
/// queued it.
pub struct WorkerPool {
    sender: Option<Sender<QueuedRow>>,
    workers: Vec<thread::JoinHandle<()>>,
}

impl WorkerPool {
    pub fn new(size: usize) -> Result<Self, ScheduleError> {
        PolicyKind::DynamicQueue.check_parallelism(size)?;

        let (sender, receiver) = unbounded::<QueuedRow>();
        let mut workers = Vec::with_capacity(size);

        for id in 0..size {
            let receiver = receiver.clone();
            let handle = thread::Builder::new()
                .name(format!("julia-worker-{}", id))
                .spawn(move || worker_loop(id, receiver))?;

            workers.push(handle);
        }

        debug!("started worker pool with {} workers", size);

        Ok(Self {
            sender: Some(sender),
            workers,
        })
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Number of jobs queued but not yet claimed by a worker.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.sender.as_ref().map_or(0, Sender::len)
    }

    fn submit(&self, job: QueuedRow) -> Result<(), ScheduleError> {
        let sender = self.sender.as_ref().ok_or(ScheduleError::PoolClosed)?;

        // A job bounced back by a closed channel is dropped here, which
        // settles its receipt.
        sender.send(job).map_err(|_| ScheduleError::PoolClosed)
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // Closing the channel ends every worker's recv loop once the queue
        // is empty.
        drop(self.sender.take());

        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                error!("worker thread exited by panic");
            }
        }

        debug!("worker pool shut down");
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("size", &self.size())
            .field("pending", &self.pending())
            .finish()
    }
}

fn worker_loop(id: usize, receiver: Receiver<QueuedRow>) {
    while let Ok(job) = receiver.recv() {
        let row = job.task.row();

        if panic::catch_unwind(AssertUnwindSafe(|| job.run())).is_err() {
            error!("worker {} panicked while rendering row {}", id, row);
        }
    }

    debug!("worker {} exiting", id);
}

enum RowOutcome {
    Committed,
    Abandoned,
    Failed(ScheduleError),
}

#[derive(Default)]
struct BatchProgress {
    finished: usize,
    committed: usize,
    abandoned: usize,
    error: Option<ScheduleError>,
}

/// Completion accounting for the jobs of one `schedule` call. Every job
/// settles exactly once, so `finished` reaches `total` whether rows were
/// committed or abandoned.
struct Batch {
    total: usize,
    progress: Mutex<BatchProgress>,
    settled: Condvar,
    failed: AtomicBool,
}

impl Batch {
    fn new(total: usize) -> Self {
        Self {
            total,
            progress: Mutex::new(BatchProgress::default()),
            settled: Condvar::new(),
            failed: AtomicBool::new(false),
        }
    }

    fn has_failed(&self) -> bool {
        self.failed.load(Ordering::Acquire)
    }

    fn settle(&self, outcome: RowOutcome) {
        let mut progress = self.progress.lock().unwrap_or_else(PoisonError::into_inner);

        match outcome {
            RowOutcome::Committed => progress.committed += 1,
            RowOutcome::Abandoned => progress.abandoned += 1,
            RowOutcome::Failed(err) => {
                self.failed.store(true, Ordering::Release);
                progress.abandoned += 1;
                progress.error.get_or_insert(err);
            }
        }

        progress.finished += 1;
        let done = progress.finished == self.total;
        drop(progress);

        if done {
            self.settled.notify_all();
        }
    }

    fn wait(&self, cancelled: impl Fn() -> bool) -> Result<ScheduleReport, ScheduleError> {
        let guard = self.progress.lock().unwrap_or_else(PoisonError::into_inner);
        let mut progress = self
            .settled
            .wait_while(guard, |progress| progress.finished < self.total)
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(err) = progress.error.take() {
            return Err(err);
        }

        Ok(ScheduleReport {
            committed: progress.committed,
            abandoned: progress.abandoned,
            cancelled: progress.abandoned > 0 || cancelled(),
            units: 0,
        })
    }
}

/// Settles its job on the batch exactly once. A receipt dropped without
/// being settled means the job never finished: either the worker unwound
/// or the queue was torn down underneath it.
struct Receipt {
    batch: Arc<Batch>,
    settled: bool,
}

impl Receipt {
    fn settle(mut self, outcome: RowOutcome) {
        self.settled = true;
        self.batch.settle(outcome);
    }
}

impl Drop for Receipt {
    fn drop(&mut self) {
        if self.settled {
            return;
        }

        let err = if thread::panicking() {
            ScheduleError::WorkerPanicked
        } else {
            ScheduleError::PoolClosed
        };

        self.batch.settle(RowOutcome::Failed(err));
    }
}

struct QueuedRow {
    task: RowTask,
    sink: Arc<dyn RowSink>,
    token: RunToken,
    receipt: Receipt,
}

impl QueuedRow {
    fn run(self) {
        let Self {
            task,
            sink,
            token,
            receipt,
        } = self;

        let current = token.current_generation();

        if task.generation() != current {
            warn!(
                "discarding row {} of generation {}, current generation is {}",
                task.row(),
                task.generation(),
                current
            );
            receipt.settle(RowOutcome::Abandoned);
            return;
        }

        if token.is_cancelled() || receipt.batch.has_failed() {
            receipt.settle(RowOutcome::Abandoned);
            return;
        }

        let result = task.execute();

        if token.is_stale() {
            receipt.settle(RowOutcome::Failed(ScheduleError::StaleCommit {
                row: task.row(),
                generation: task.generation(),
            }));
            return;
        }

        let outcome = match sink.commit(result) {
            Ok(()) => RowOutcome::Committed,
            Err(err) => RowOutcome::Failed(err.into()),
        };

        receipt.settle(outcome);
    }
}

/// One task per row fed to a persistent pool. Cheap rows free their worker
/// early so it can claim another, which balances the uneven cost of escape
/// time rows. Cancelled jobs still queued are settled as abandoned without
/// being rendered.
#[derive(Debug, Clone)]
pub struct DynamicQueue {
    pool: Arc<WorkerPool>,
}

impl DynamicQueue {
    #[must_use]
    pub fn new(pool: Arc<WorkerPool>) -> Self {
        Self { pool }
    }

    pub fn with_workers(size: usize) -> Result<Self, ScheduleError> {
        Ok(Self::new(Arc::new(WorkerPool::new(size)?)))
    }

    #[must_use]
    pub fn pool(&self) -> &Arc<WorkerPool> {
        &self.pool
    }
}

impl DistributionPolicy for DynamicQueue {
    fn kind(&self) -> PolicyKind {
        PolicyKind::DynamicQueue
    }

    fn schedule(
        &self,
        tasks: Vec<RowTask>,
        parallelism: usize,
        sink: Arc<dyn RowSink>,
        token: &RunToken,
    ) -> Result<ScheduleReport, ScheduleError> {
        PolicyKind::DynamicQueue.check_parallelism(parallelism)?;

        if self.pool.size() != parallelism {
            return Err(ScheduleError::PoolSizeMismatch {
                pool: self.pool.size(),
                requested: parallelism,
            });
        }

        let batch = Arc::new(Batch::new(tasks.len()));
        let jobs: Vec<QueuedRow> = tasks
            .into_iter()
            .map(|task| QueuedRow {
                task,
                sink: Arc::clone(&sink),
                token: token.clone(),
                receipt: Receipt {
                    batch: Arc::clone(&batch),
                    settled: false,
                },
            })
            .collect();
        let mut jobs = jobs.into_iter();

        // On a closed pool the remaining jobs are dropped with the iterator,
        // and their receipts settle the batch.
        let submitted = jobs.try_for_each(|job| self.pool.submit(job));
        drop(jobs);

        let report = batch.wait(|| token.is_cancelled())?;
        submitted?;

        Ok(ScheduleReport {
            units: self.pool.size(),
            ..report
        })
    }
}
