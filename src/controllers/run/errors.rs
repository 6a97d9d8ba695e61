use std::error::Error;
use std::fmt;
use std::io;
use std::sync::Arc;

use crate::controllers::run::run_request::RunRequestError;
use crate::controllers::run::state::RunState;
use crate::core::actions::schedule_rows::errors::ScheduleError;
use crate::core::data::frame_buffer::FrameBufferError;
use crate::core::data::viewport::{Viewport, ViewportError};

#[derive(Debug)]
pub enum RunError {
    Request(RunRequestError),
    Surface(ViewportError),
    /// The surface no longer matches the frame buffer kept from earlier runs.
    ViewportChanged { previous: Viewport, current: Viewport },
    Frame(FrameBufferError),
    /// The worker pool could not be built.
    Pool(ScheduleError),
    Spawn(io::Error),
    AlreadyRunning { generation: u64 },
    NotRunning { generation: u64, state: RunState },
    /// The handle belongs to a run that a later start replaced.
    Superseded { generation: u64, current: u64 },
    RunFailed { generation: u64, source: Arc<ScheduleError> },
    Unavailable,
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request(err) => write!(f, "invalid run request: {}", err),
            Self::Surface(err) => write!(f, "invalid surface: {}", err),
            Self::ViewportChanged { previous, current } => write!(
                f,
                "surface changed from {} to {} since the frame buffer was allocated",
                previous, current
            ),
            Self::Frame(err) => write!(f, "frame buffer error: {}", err),
            Self::Pool(err) => write!(f, "worker pool error: {}", err),
            Self::Spawn(err) => write!(f, "failed to spawn run coordinator: {}", err),
            Self::AlreadyRunning { generation } => {
                write!(f, "run {} is still running", generation)
            }
            Self::NotRunning { generation, state } => {
                write!(f, "run {} is {}, not running", generation, state)
            }
            Self::Superseded {
                generation,
                current,
            } => write!(
                f,
                "run {} was superseded by run {}",
                generation, current
            ),
            Self::RunFailed { generation, source } => {
                write!(f, "run {} failed: {}", generation, source)
            }
            Self::Unavailable => write!(f, "run controller state poisoned by a panic"),
        }
    }
}

impl Error for RunError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Request(err) => Some(err),
            Self::Surface(err) => Some(err),
            Self::Frame(err) => Some(err),
            Self::Pool(err) => Some(err),
            Self::Spawn(err) => Some(err),
            Self::RunFailed { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl From<RunRequestError> for RunError {
    fn from(err: RunRequestError) -> Self {
        Self::Request(err)
    }
}

impl From<ViewportError> for RunError {
    fn from(err: ViewportError) -> Self {
        Self::Surface(err)
    }
}

impl From<FrameBufferError> for RunError {
    fn from(err: FrameBufferError) -> Self {
        Self::Frame(err)
    }
}

impl From<ScheduleError> for RunError {
    fn from(err: ScheduleError) -> Self {
        Self::Pool(err)
    }
}

impl From<io::Error> for RunError {
    fn from(err: io::Error) -> Self {
        Self::Spawn(err)
    }
}
