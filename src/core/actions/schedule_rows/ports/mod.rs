pub mod row_listener;
pub mod row_sink;
