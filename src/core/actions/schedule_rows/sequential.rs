use crate::core::actions::cancellation::{CancelToken, RunToken};
use crate::core::actions::schedule_rows::errors::ScheduleError;
use crate::core::actions::schedule_rows::policy::{DistributionPolicy, PolicyKind, ScheduleReport};
use crate::core::actions::schedule_rows::ports::row_sink::RowSink;
use crate::core::actions::schedule_rows::row_task::RowTask;
use std::sync::Arc;

/// Renders every row in order on the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sequential;

impl DistributionPolicy for Sequential {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Sequential
    }

    fn schedule(
        &self,
        mut tasks: Vec<RowTask>,
        parallelism: usize,
        sink: Arc<dyn RowSink>,
        token: &RunToken,
    ) -> Result<ScheduleReport, ScheduleError> {
        PolicyKind::Sequential.check_parallelism(parallelism)?;

        tasks.sort_by_key(RowTask::row);

        let report = process_rows(tasks, sink.as_ref(), token)?;

        Ok(ScheduleReport { units: 1, ..report })
    }
}

/// Executes `tasks` in the given order, committing each row before starting
/// the next.
///
/// Cancellation is polled once per row boundary; the row in progress always
/// finishes and is committed. A token that went stale while a row was being
/// computed is a logic error and fails the run instead of committing.
pub(crate) fn process_rows<C: CancelToken + ?Sized>(
    tasks: Vec<RowTask>,
    sink: &dyn RowSink,
    cancel: &C,
) -> Result<ScheduleReport, ScheduleError> {
    let total = tasks.len();
    let mut report = ScheduleReport::default();

    for task in tasks {
        if cancel.is_cancelled() {
            report.cancelled = true;
            report.abandoned = total - report.committed;
            break;
        }

        let result = task.execute();

        if cancel.is_stale() {
            return Err(ScheduleError::StaleCommit {
                row: task.row(),
                generation: task.generation(),
            });
        }

        sink.commit(result)?;
        report.committed += 1;
    }

    Ok(report)
}
