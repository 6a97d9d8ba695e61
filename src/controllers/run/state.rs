use std::fmt;

/// Lifecycle of the most recent run. A terminal state accepts a new start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Completed,
    Aborted,
    Failed,
}

impl RunState {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Aborted | Self::Failed)
    }

    #[must_use]
    pub fn accepts_start(self) -> bool {
        self != Self::Running
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Aborted => "aborted",
            Self::Failed => "failed",
        };

        f.write_str(name)
    }
}
