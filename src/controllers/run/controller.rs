use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, error, info};

use crate::controllers::run::errors::RunError;
use crate::controllers::run::ports::observer::{ObserverRows, RunObserver};
use crate::controllers::run::ports::surface::Surface;
use crate::controllers::run::run_request::RunRequest;
use crate::controllers::run::state::RunState;
use crate::core::actions::cancellation::RunToken;
use crate::core::actions::schedule_rows::dynamic_queue::{DynamicQueue, WorkerPool};
use crate::core::actions::schedule_rows::errors::ScheduleError;
use crate::core::actions::schedule_rows::policy::{DistributionPolicy, PolicyKind, ScheduleReport};
use crate::core::actions::schedule_rows::ports::row_sink::RowSink;
use crate::core::actions::schedule_rows::row_task::build_row_tasks;
use crate::core::actions::schedule_rows::sequential::Sequential;
use crate::core::actions::schedule_rows::static_partition::StaticPartition;
use crate::core::data::frame_buffer::FrameBuffer;
use crate::core::data::run_config::RunConfig;
use crate::core::data::viewport::Viewport;

/// Identifies one started run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunHandle {
    generation: u64,
}

impl RunHandle {
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

struct RunStatus {
    generation: u64,
    state: RunState,
    abort: Arc<AtomicBool>,
    elapsed: Option<Duration>,
    failure: Option<Arc<ScheduleError>>,
}

impl RunStatus {
    fn idle() -> Self {
        Self {
            generation: 0,
            state: RunState::Idle,
            abort: Arc::new(AtomicBool::new(false)),
            elapsed: None,
            failure: None,
        }
    }
}

struct SharedState {
    generation: Arc<AtomicU64>,
    status: Mutex<RunStatus>,
    finished: Condvar,
    observer: Option<Arc<dyn RunObserver>>,
}

impl SharedState {
    fn status(&self) -> Result<MutexGuard<'_, RunStatus>, RunError> {
        self.status.lock().map_err(|_| RunError::Unavailable)
    }
}

/// Drives runs of the Julia renderer: one at a time, on a coordinator
/// thread, with a pluggable row distribution policy.
///
/// The frame buffer is allocated on the first start and reused afterwards.
/// The dynamic queue's worker pool is created on first use and kept until
/// a run asks for a different number of workers.
pub struct RunController {
    surface: Arc<dyn Surface>,
    shared: Arc<SharedState>,
    frame: Option<Arc<FrameBuffer>>,
    pool: Option<Arc<WorkerPool>>,
    coordinator: Option<JoinHandle<()>>,
}

impl RunController {
    pub fn new(surface: Arc<dyn Surface>) -> Self {
        Self::build(surface, None)
    }

    pub fn with_observer(surface: Arc<dyn Surface>, observer: Arc<dyn RunObserver>) -> Self {
        Self::build(surface, Some(observer))
    }

    fn build(surface: Arc<dyn Surface>, observer: Option<Arc<dyn RunObserver>>) -> Self {
        Self {
            surface,
            shared: Arc::new(SharedState {
                generation: Arc::new(AtomicU64::new(0)),
                status: Mutex::new(RunStatus::idle()),
                finished: Condvar::new(),
                observer,
            }),
            frame: None,
            pool: None,
            coordinator: None,
        }
    }

    /// Starts a run and returns without waiting for it.
    ///
    /// Everything that can fail synchronously (surface size, frame buffer,
    /// worker pool, coordinator thread) fails here, before the state
    /// changes.
    pub fn start(&mut self, request: RunRequest) -> Result<RunHandle, RunError> {
        {
            let status = self.shared.status()?;

            if !status.state.accepts_start() {
                return Err(RunError::AlreadyRunning {
                    generation: status.generation,
                });
            }
        }

        self.join_coordinator();

        let viewport = Viewport::new(self.surface.width(), self.surface.height())?;
        let frame = self.prepare_frame(viewport)?;
        let policy = self.select_policy(request)?;
        let config = Arc::new(RunConfig::new(viewport, request.params(), request.parallelism()));

        let generation = self.shared.generation.load(Ordering::Acquire) + 1;
        let abort = Arc::new(AtomicBool::new(false));
        let token = RunToken::new(generation, Arc::clone(&self.shared.generation), Arc::clone(&abort));
        let tasks = build_row_tasks(&config, generation);

        // The previous run's rows survive any failure above.
        frame.reset()?;

        let previous = {
            let mut status = self.shared.status()?;
            // Publishing the generation supersedes every token of the last run.
            self.shared.generation.store(generation, Ordering::Release);

            std::mem::replace(
                &mut *status,
                RunStatus {
                    generation,
                    state: RunState::Running,
                    abort,
                    elapsed: None,
                    failure: None,
                },
            )
        };

        debug!(
            "starting run {} on {} with {} x{} ({} rows)",
            generation,
            viewport,
            policy.kind(),
            request.parallelism(),
            tasks.len()
        );

        let shared = Arc::clone(&self.shared);
        let sink: Arc<dyn RowSink> = frame;
        let parallelism = request.parallelism();
        let total = tasks.len();

        let spawned = thread::Builder::new()
            .name(format!("julia-run-{}", generation))
            .spawn(move || {
                let started = Instant::now();
                let result = policy.schedule(tasks, parallelism, sink, &token);
                let elapsed = started.elapsed();

                finish_run(&shared, &token, total, result, elapsed);
            });

        match spawned {
            Ok(handle) => {
                self.coordinator = Some(handle);
                Ok(RunHandle { generation })
            }
            Err(err) => {
                let mut status = self.shared.status()?;
                self.shared.generation.store(previous.generation, Ordering::Release);
                *status = previous;
                Err(RunError::Spawn(err))
            }
        }
    }

    /// Raises the cancellation flag of a running run. Returns at once; the
    /// run reaches its terminal state once every compute unit has finished
    /// its current row.
    pub fn abort(&self, handle: &RunHandle) -> Result<(), RunError> {
        let status = self.shared.status()?;

        if status.generation != handle.generation {
            return Err(RunError::Superseded {
                generation: handle.generation,
                current: status.generation,
            });
        }

        if status.state != RunState::Running {
            return Err(RunError::NotRunning {
                generation: handle.generation,
                state: status.state,
            });
        }

        status.abort.store(true, Ordering::Release);
        debug!("abort requested for run {}", handle.generation);

        Ok(())
    }

    /// Blocks until the run is terminal and returns its wall-clock runtime.
    /// An aborted run still reports the time it took to stop.
    pub fn wait_for_completion(&self, handle: &RunHandle) -> Result<Duration, RunError> {
        let status = self.shared.status()?;
        let status = self
            .shared
            .finished
            .wait_while(status, |status| {
                status.generation == handle.generation && status.state == RunState::Running
            })
            .map_err(|_| RunError::Unavailable)?;

        if status.generation != handle.generation {
            return Err(RunError::Superseded {
                generation: handle.generation,
                current: status.generation,
            });
        }

        match (status.state, &status.failure, status.elapsed) {
            (RunState::Failed, Some(failure), _) => Err(RunError::RunFailed {
                generation: handle.generation,
                source: Arc::clone(failure),
            }),
            (RunState::Completed | RunState::Aborted, _, Some(elapsed)) => Ok(elapsed),
            (state, _, _) => Err(RunError::NotRunning {
                generation: handle.generation,
                state,
            }),
        }
    }

    #[must_use]
    pub fn state(&self) -> RunState {
        self.shared
            .status
            .lock()
            .map_or(RunState::Failed, |status| status.state)
    }

    #[must_use]
    pub fn current_generation(&self) -> u64 {
        self.shared.generation.load(Ordering::Acquire)
    }

    /// The frame of the latest run, once one has been started.
    #[must_use]
    pub fn frame(&self) -> Option<Arc<FrameBuffer>> {
        self.frame.clone()
    }

    fn prepare_frame(&mut self, viewport: Viewport) -> Result<Arc<FrameBuffer>, RunError> {
        if let Some(frame) = &self.frame {
            if frame.viewport() != viewport {
                return Err(RunError::ViewportChanged {
                    previous: frame.viewport(),
                    current: viewport,
                });
            }

            return Ok(Arc::clone(frame));
        }

        let frame = Arc::new(match &self.shared.observer {
            Some(observer) => FrameBuffer::with_listener(viewport, Arc::new(ObserverRows(Arc::clone(observer))))?,
            None => FrameBuffer::try_new(viewport)?,
        });

        self.frame = Some(Arc::clone(&frame));

        Ok(frame)
    }

    fn select_policy(&mut self, request: RunRequest) -> Result<Box<dyn DistributionPolicy>, RunError> {
        let policy: Box<dyn DistributionPolicy> = match request.policy() {
            PolicyKind::Sequential => Box::new(Sequential),
            PolicyKind::StaticPartition => Box::new(StaticPartition),
            PolicyKind::DynamicQueue => {
                let pool = match &self.pool {
                    Some(pool) if pool.size() == request.parallelism() => Arc::clone(pool),
                    _ => {
                        // Drop the old pool first so its workers are joined
                        // before new ones start.
                        self.pool = None;
                        let pool = Arc::new(WorkerPool::new(request.parallelism())?);
                        self.pool = Some(Arc::clone(&pool));
                        pool
                    }
                };

                Box::new(DynamicQueue::new(pool))
            }
        };

        Ok(policy)
    }

    fn join_coordinator(&mut self) {
        if let Some(handle) = self.coordinator.take() {
            if handle.join().is_err() {
                error!("run coordinator panicked");
            }
        }
    }
}

fn finish_run(
    shared: &SharedState,
    token: &RunToken,
    total: usize,
    result: Result<ScheduleReport, ScheduleError>,
    elapsed: Duration,
) {
    let generation = token.generation();

    let (state, failure) = match result {
        Ok(report) if token.abort_requested() || report.committed < total => {
            info!(
                "run {} aborted after {:?} with {} of {} rows",
                generation, elapsed, report.committed, total
            );
            (RunState::Aborted, None)
        }
        Ok(report) => {
            info!(
                "run {} completed {} rows on {} units in {:?}",
                generation, report.committed, report.units, elapsed
            );
            (RunState::Completed, None)
        }
        Err(err) => {
            error!("run {} failed after {:?}: {}", generation, elapsed, err);
            (RunState::Failed, Some(Arc::new(err)))
        }
    };

    if let Some(observer) = &shared.observer {
        observer.on_run_finished(generation, state, elapsed);
    }

    {
        let mut status = shared.status.lock().unwrap_or_else(PoisonError::into_inner);

        if status.generation == generation {
            status.state = state;
            status.elapsed = Some(elapsed);
            status.failure = failure;
        }
    }

    shared.finished.notify_all();
}

impl Drop for RunController {
    fn drop(&mut self) {
        if let Ok(status) = self.shared.status.lock() {
            status.abort.store(true, Ordering::Release);
        }

        self.join_coordinator();

        // Joins the pool's workers once the last policy holding it is gone.
        self.pool = None;
    }
}

impl std::fmt::Debug for RunController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunController")
            .field("state", &self.state())
            .field("generation", &self.current_generation())
            .field("frame", &self.frame)
            .field("pool", &self.pool)
            .finish()
    }
}
