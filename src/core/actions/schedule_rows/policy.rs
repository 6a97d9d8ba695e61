use crate::core::actions::cancellation::RunToken;
use crate::core::actions::schedule_rows::errors::ScheduleError;
use crate::core::actions::schedule_rows::ports::row_sink::RowSink;
use crate::core::actions::schedule_rows::row_task::RowTask;
use std::ops::RangeInclusive;
use std::sync::Arc;

pub const MAX_PARALLELISM: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum PolicyKind {
    Sequential,
    StaticPartition,
    #[default]
    DynamicQueue,
}

impl PolicyKind {
    pub const ALL: &'static [Self] = &[Self::DynamicQueue, Self::StaticPartition, Self::Sequential];

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Sequential => "Sequential",
            Self::StaticPartition => "Static partition",
            Self::DynamicQueue => "Dynamic queue",
        }
    }

    #[must_use]
    pub fn parallelism_range(self) -> RangeInclusive<usize> {
        match self {
            Self::Sequential => 1..=1,
            Self::StaticPartition | Self::DynamicQueue => 1..=MAX_PARALLELISM,
        }
    }

    #[must_use]
    pub fn supports_parallelism(self, parallelism: usize) -> bool {
        self.parallelism_range().contains(&parallelism)
    }

    pub(crate) fn check_parallelism(self, parallelism: usize) -> Result<(), ScheduleError> {
        if self.supports_parallelism(parallelism) {
            Ok(())
        } else {
            Err(ScheduleError::InvalidParallelism {
                policy: self,
                requested: parallelism,
            })
        }
    }
}

impl std::fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).display_name())
    }
}

/// Row accounting returned once every task of a run has been committed or
/// abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScheduleReport {
    pub committed: usize,
    pub abandoned: usize,
    /// Whether any compute unit stopped early because of cancellation.
    pub cancelled: bool,
    /// Compute units that took part in the run.
    pub units: usize,
}

impl ScheduleReport {
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            committed: self.committed + other.committed,
            abandoned: self.abandoned + other.abandoned,
            cancelled: self.cancelled || other.cancelled,
            units: self.units + other.units,
        }
    }
}

/// Strategy for spreading a run's row tasks over compute units.
///
/// `schedule` blocks until every task has been committed to `sink` or
/// abandoned because `token` was cancelled.
pub trait DistributionPolicy: Send + Sync {
    fn kind(&self) -> PolicyKind;

    fn schedule(
        &self,
        tasks: Vec<RowTask>,
        parallelism: usize,
        sink: Arc<dyn RowSink>,
        token: &RunToken,
    ) -> Result<ScheduleReport, ScheduleError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_array_has_default_first() {
        assert_eq!(PolicyKind::ALL.first(), Some(&PolicyKind::default()));
    }

    #[test]
    fn display_names_are_unique() {
        let names: Vec<&str> = PolicyKind::ALL.iter().map(|k| k.display_name()).collect();

        for (i, name) in names.iter().enumerate() {
            for (j, other) in names.iter().enumerate() {
                if i != j {
                    assert_ne!(name, other);
                }
            }
        }
    }

    #[test]
    fn sequential_only_supports_one_unit() {
        assert!(PolicyKind::Sequential.supports_parallelism(1));
        assert!(!PolicyKind::Sequential.supports_parallelism(2));
        assert!(!PolicyKind::Sequential.supports_parallelism(0));
    }

    #[test]
    fn parallel_policies_support_up_to_max() {
        for kind in [PolicyKind::StaticPartition, PolicyKind::DynamicQueue] {
            assert!(!kind.supports_parallelism(0));
            assert!(kind.supports_parallelism(1));
            assert!(kind.supports_parallelism(MAX_PARALLELISM));
            assert!(!kind.supports_parallelism(MAX_PARALLELISM + 1));
        }
    }

    #[test]
    fn merge_sums_counts_and_ors_cancellation() {
        let a = ScheduleReport {
            committed: 3,
            abandoned: 1,
            cancelled: false,
            units: 1,
        };
        let b = ScheduleReport {
            committed: 2,
            abandoned: 0,
            cancelled: true,
            units: 1,
        };

        assert_eq!(
            a.merge(b),
            ScheduleReport {
                committed: 5,
                abandoned: 1,
                cancelled: true,
                units: 2,
            }
        );
    }
}
