use std::error::Error;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::core::actions::schedule_rows::ports::row_listener::RowListener;
use crate::core::actions::schedule_rows::ports::row_sink::{CommitError, RowSink};
use crate::core::actions::schedule_rows::row_task::RowResult;
use crate::core::data::colour::Colour;
use crate::core::data::pixel_buffer::{PixelBuffer, PixelBufferError};
use crate::core::data::viewport::Viewport;

/// Light gray painted over the whole frame before each run.
pub const BACKGROUND: Colour = Colour::new(192, 192, 192);

#[derive(Debug, Clone, PartialEq)]
pub enum FrameBufferError {
    Pixels(PixelBufferError),
    /// A thread panicked while holding the frame lock.
    Poisoned,
}

impl fmt::Display for FrameBufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pixels(err) => write!(f, "pixel buffer error: {}", err),
            Self::Poisoned => write!(f, "frame buffer lock poisoned by a panicked writer"),
        }
    }
}

impl Error for FrameBufferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Pixels(err) => Some(err),
            Self::Poisoned => None,
        }
    }
}

impl From<PixelBufferError> for FrameBufferError {
    fn from(err: PixelBufferError) -> Self {
        Self::Pixels(err)
    }
}

struct FrameState {
    pixels: PixelBuffer,
    committed: Vec<bool>,
}

/// Shared output surface for one run at a time.
///
/// Rows arrive from any number of compute units. The lock is held only for
/// the row copy; listener notification and the completion counter happen
/// after it is released.
pub struct FrameBuffer {
    viewport: Viewport,
    state: Mutex<FrameState>,
    completed_rows: AtomicUsize,
    listener: Option<Arc<dyn RowListener>>,
}

impl FrameBuffer {
    pub fn try_new(viewport: Viewport) -> Result<Self, FrameBufferError> {
        Self::build(viewport, None)
    }

    pub fn with_listener(viewport: Viewport, listener: Arc<dyn RowListener>) -> Result<Self, FrameBufferError> {
        Self::build(viewport, Some(listener))
    }

    fn build(viewport: Viewport, listener: Option<Arc<dyn RowListener>>) -> Result<Self, FrameBufferError> {
        let pixels = PixelBuffer::try_filled(viewport, BACKGROUND)?;
        let mut committed = Vec::new();
        committed
            .try_reserve_exact(viewport.height() as usize)
            .map_err(|_| PixelBufferError::AllocationFailed {
                bytes: viewport.height() as usize,
            })?;
        committed.resize(viewport.height() as usize, false);

        Ok(Self {
            viewport,
            state: Mutex::new(FrameState { pixels, committed }),
            completed_rows: AtomicUsize::new(0),
            listener,
        })
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn lock(&self) -> Result<MutexGuard<'_, FrameState>, FrameBufferError> {
        self.state.lock().map_err(|_| FrameBufferError::Poisoned)
    }

    /// Paints the background over every pixel and forgets which rows were
    /// committed.
    pub fn reset(&self) -> Result<(), FrameBufferError> {
        let mut state = self.lock()?;

        state.pixels.fill(BACKGROUND);
        state.committed.fill(false);
        self.completed_rows.store(0, Ordering::Release);

        Ok(())
    }

    pub fn snapshot(&self) -> Result<PixelBuffer, FrameBufferError> {
        Ok(self.lock()?.pixels.clone())
    }

    pub fn row_colours(&self, row: u32) -> Result<Vec<Colour>, FrameBufferError> {
        Ok(self.lock()?.pixels.row_colours(row)?)
    }

    #[must_use]
    pub fn completed_rows(&self) -> usize {
        self.completed_rows.load(Ordering::Acquire)
    }

    pub fn is_row_committed(&self, row: u32) -> Result<bool, FrameBufferError> {
        let state = self.lock()?;

        state
            .committed
            .get(row as usize)
            .copied()
            .ok_or(FrameBufferError::Pixels(PixelBufferError::RowOutsideBounds {
                row,
                height: self.viewport.height(),
            }))
    }
}

impl RowSink for FrameBuffer {
    fn commit(&self, result: RowResult) -> Result<(), CommitError> {
        let row = result.row();
        let height = self.viewport.height();
        let expected = self.viewport.width() as usize;

        if !self.viewport.contains_row(row) {
            return Err(CommitError::RowOutOfBounds { row, height });
        }

        if result.colours().len() != expected {
            return Err(CommitError::RowWidthMismatch {
                row,
                expected,
                actual: result.colours().len(),
            });
        }

        {
            let mut state = self.state.lock().map_err(|_| CommitError::Unavailable)?;

            if state.committed[row as usize] {
                return Err(CommitError::DuplicateRow { row });
            }

            state
                .pixels
                .set_row(row, result.colours())
                .map_err(|_| CommitError::RowOutOfBounds { row, height })?;
            state.committed[row as usize] = true;
        }

        if let Some(listener) = &self.listener {
            listener.row_ready(row, result.colours());
        }

        self.completed_rows.fetch_add(1, Ordering::AcqRel);

        Ok(())
    }
}

impl fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameBuffer")
            .field("viewport", &self.viewport)
            .field("completed_rows", &self.completed_rows())
            .finish()
    }
}
