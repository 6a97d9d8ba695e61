use std::sync::Arc;
use std::time::Duration;

use crate::controllers::run::state::RunState;
use crate::core::actions::schedule_rows::ports::row_listener::RowListener;
use crate::core::data::colour::Colour;

/// Progress callbacks for whoever displays the frame. Both are called from
/// worker or coordinator threads, never with the frame lock held.
pub trait RunObserver: Send + Sync {
    fn on_row_ready(&self, _row: u32, _colours: &[Colour]) {}

    /// Called once per run with its terminal state, before waiters wake.
    fn on_run_finished(&self, generation: u64, state: RunState, elapsed: Duration);
}

/// Forwards frame buffer row notifications to a `RunObserver`.
pub(crate) struct ObserverRows(pub(crate) Arc<dyn RunObserver>);

impl RowListener for ObserverRows {
    fn row_ready(&self, row: u32, colours: &[Colour]) {
        self.0.on_row_ready(row, colours);
    }
}
