use crate::core::actions::schedule_rows::policy::PolicyKind;
use crate::core::actions::schedule_rows::ports::row_sink::CommitError;
use std::error::Error;
use std::fmt;
use std::io;

/// Failures that end a run. Cancellation is never reported here.
#[derive(Debug)]
pub enum ScheduleError {
    /// The sink rejected a row; the run cannot produce a consistent frame.
    Commit(CommitError),
    /// A row finished after its run was superseded.
    StaleCommit { row: u32, generation: u64 },
    /// A task was handed to a policy it cannot place, e.g. outside the viewport.
    RowOutsideViewport { row: u32, height: u32 },
    InvalidParallelism {
        policy: PolicyKind,
        requested: usize,
    },
    /// The dynamic queue's pool was built for a different number of workers.
    PoolSizeMismatch { pool: usize, requested: usize },
    WorkerPanicked,
    Spawn(io::Error),
    PoolClosed,
}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Commit(err) => write!(f, "row commit failed: {}", err),
            Self::StaleCommit { row, generation } => write!(
                f,
                "row {} of superseded generation {} reached commit",
                row, generation
            ),
            Self::RowOutsideViewport { row, height } => {
                write!(f, "row {} is outside a viewport of height {}", row, height)
            }
            Self::InvalidParallelism { policy, requested } => write!(
                f,
                "{} cannot run with {} compute units",
                policy, requested
            ),
            Self::PoolSizeMismatch { pool, requested } => write!(
                f,
                "worker pool has {} workers but {} were requested",
                pool, requested
            ),
            Self::WorkerPanicked => write!(f, "a compute unit panicked"),
            Self::Spawn(err) => write!(f, "failed to spawn compute unit: {}", err),
            Self::PoolClosed => write!(f, "worker pool has shut down"),
        }
    }
}

impl Error for ScheduleError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Commit(err) => Some(err),
            Self::Spawn(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CommitError> for ScheduleError {
    fn from(err: CommitError) -> Self {
        Self::Commit(err)
    }
}

impl From<io::Error> for ScheduleError {
    fn from(err: io::Error) -> Self {
        Self::Spawn(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_error_is_wrapped_with_source() {
        let err: ScheduleError = CommitError::DuplicateRow { row: 3 }.into();

        assert_eq!(err.to_string(), "row commit failed: row 3 was already committed");
        assert!(err.source().is_some());
    }

    #[test]
    fn test_invalid_parallelism_names_policy() {
        let err = ScheduleError::InvalidParallelism {
            policy: PolicyKind::Sequential,
            requested: 3,
        };

        assert_eq!(err.to_string(), "Sequential cannot run with 3 compute units");
    }
}
