pub mod cancellation;
pub mod generate_iteration_grid;
pub mod schedule_rows;
