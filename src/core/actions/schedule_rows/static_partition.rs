use std::num::NonZeroU32;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use log::debug;

use crate::core::actions::cancellation::RunToken;
use crate::core::actions::schedule_rows::errors::ScheduleError;
use crate::core::actions::schedule_rows::policy::{DistributionPolicy, PolicyKind, ScheduleReport};
use crate::core::actions::schedule_rows::ports::row_sink::RowSink;
use crate::core::actions::schedule_rows::row_task::RowTask;
use crate::core::actions::schedule_rows::sequential::process_rows;
use crate::core::util::calculate_row_bands::calculate_row_bands;

/// One scoped thread per contiguous band of rows. The last band absorbs the
/// remainder of `height / parallelism`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticPartition;

/// Bumps the exit counter however the unit leaves its loop, including by
/// unwinding.
struct UnitExit<'a>(&'a AtomicUsize);

impl Drop for UnitExit<'_> {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::AcqRel);
    }
}

fn assign_to_bands(tasks: Vec<RowTask>, parallelism: usize) -> Result<Vec<Vec<RowTask>>, ScheduleError> {
    let Some(height) = tasks.first().map(|task| task.config().viewport().height()) else {
        return Ok((0..parallelism).map(|_| Vec::new()).collect());
    };

    let bands = NonZeroU32::new(parallelism as u32).ok_or(ScheduleError::InvalidParallelism {
        policy: PolicyKind::StaticPartition,
        requested: parallelism,
    })?;
    let ranges = calculate_row_bands(height, bands);
    let mut assigned: Vec<Vec<RowTask>> = ranges.iter().map(|range| Vec::with_capacity(range.len())).collect();

    for task in tasks {
        let row = task.row();
        let band = ranges
            .iter()
            .position(|range| range.contains(&row))
            .ok_or(ScheduleError::RowOutsideViewport { row, height })?;

        assigned[band].push(task);
    }

    for band in &mut assigned {
        band.sort_by_key(RowTask::row);
    }

    Ok(assigned)
}

impl DistributionPolicy for StaticPartition {
    fn kind(&self) -> PolicyKind {
        PolicyKind::StaticPartition
    }

    fn schedule(
        &self,
        tasks: Vec<RowTask>,
        parallelism: usize,
        sink: Arc<dyn RowSink>,
        token: &RunToken,
    ) -> Result<ScheduleReport, ScheduleError> {
        PolicyKind::StaticPartition.check_parallelism(parallelism)?;

        let bands = assign_to_bands(tasks, parallelism)?;
        let exited = AtomicUsize::new(0);
        let sink = sink.as_ref();

        let outcomes = thread::scope(|scope| -> Result<Vec<_>, ScheduleError> {
            let handles = bands
                .into_iter()
                .enumerate()
                .map(|(unit, band)| {
                    let exited = &exited;

                    thread::Builder::new()
                        .name(format!("julia-static-{}", unit))
                        .spawn_scoped(scope, move || {
                            let _exit = UnitExit(exited);
                            debug!("static unit {} starting with {} rows", unit, band.len());

                            process_rows(band, sink, token)
                        })
                })
                .collect::<Vec<_>>();

            // Join every unit that did start before surfacing a spawn failure.
            let mut outcomes = Vec::with_capacity(handles.len());
            let mut spawn_error = None;

            for handle in handles {
                match handle {
                    Ok(handle) => outcomes.push(handle.join().map_err(|_| ScheduleError::WorkerPanicked)),
                    Err(err) => {
                        token.request_abort();
                        spawn_error.get_or_insert(err);
                    }
                }
            }

            match spawn_error {
                Some(err) => Err(ScheduleError::Spawn(err)),
                None => Ok(outcomes),
            }
        })?;

        let report = outcomes
            .into_iter()
            .try_fold(ScheduleReport::default(), |report, outcome| {
                outcome.and_then(|unit_report| unit_report).map(|unit_report| report.merge(unit_report))
            })?;

        Ok(ScheduleReport {
            units: exited.load(Ordering::Acquire),
            ..report
        })
    }
}
