use crate::core::actions::schedule_rows::row_task::RowResult;
use std::error::Error;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitError {
    DuplicateRow { row: u32 },
    RowOutOfBounds { row: u32, height: u32 },
    RowWidthMismatch { row: u32, expected: usize, actual: usize },
    Unavailable,
}

impl fmt::Display for CommitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateRow { row } => write!(f, "row {} was already committed", row),
            Self::RowOutOfBounds { row, height } => {
                write!(f, "row {} is outside a frame of height {}", row, height)
            }
            Self::RowWidthMismatch {
                row,
                expected,
                actual,
            } => write!(
                f,
                "row {} has {} pixels, frame width is {}",
                row, actual, expected
            ),
            Self::Unavailable => write!(f, "frame buffer is unavailable after a worker panic"),
        }
    }
}

impl Error for CommitError {}

/// Destination for finished rows. Implementations must accept concurrent
/// commits of distinct rows.
pub trait RowSink: Send + Sync {
    fn commit(&self, result: RowResult) -> Result<(), CommitError>;
}
