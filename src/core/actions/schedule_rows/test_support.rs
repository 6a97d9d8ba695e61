use crate::core::actions::schedule_rows::ports::row_sink::{CommitError, RowSink};
use crate::core::actions::schedule_rows::row_task::{RowResult, RowTask, build_row_tasks};
use crate::core::data::complex::Complex;
use crate::core::data::run_config::RunConfig;
use crate::core::data::viewport::Viewport;
use crate::core::fractals::julia::params::JuliaParams;
use std::sync::{Arc, Mutex};

pub(crate) fn test_config(width: u32, height: u32, max_iterations: u32) -> Arc<RunConfig> {
    Arc::new(RunConfig::new(
        Viewport::new(width, height).unwrap(),
        JuliaParams::new(Complex::new(-0.8, 0.156), 1.0, max_iterations).unwrap(),
        1,
    ))
}

pub(crate) fn test_tasks(width: u32, height: u32, max_iterations: u32, generation: u64) -> Vec<RowTask> {
    build_row_tasks(&test_config(width, height, max_iterations), generation)
}

type CommitHook = Box<dyn Fn(usize) + Send + Sync>;

/// Sink that keeps every committed row and rejects duplicates.
#[derive(Default)]
pub(crate) struct RecordingSink {
    rows: Mutex<Vec<RowResult>>,
    on_commit: Option<CommitHook>,
}

impl RecordingSink {
    /// Calls `hook` with the running commit count after each commit, while the
    /// row list is still locked.
    pub(crate) fn with_hook(hook: impl Fn(usize) + Send + Sync + 'static) -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            on_commit: Some(Box::new(hook)),
        }
    }

    pub(crate) fn rows(&self) -> Vec<RowResult> {
        let mut rows = self.rows.lock().unwrap().clone();
        rows.sort_by_key(RowResult::row);
        rows
    }

    pub(crate) fn committed_rows(&self) -> Vec<u32> {
        self.rows.lock().unwrap().iter().map(RowResult::row).collect()
    }
}

impl RowSink for RecordingSink {
    fn commit(&self, result: RowResult) -> Result<(), CommitError> {
        let mut rows = self.rows.lock().unwrap();

        if rows.iter().any(|existing| existing.row() == result.row()) {
            return Err(CommitError::DuplicateRow { row: result.row() });
        }

        rows.push(result);

        // Held under the lock so no other commit lands before the hook's effect.
        if let Some(hook) = &self.on_commit {
            hook(rows.len());
        }

        Ok(())
    }
}
