pub mod dynamic_queue;
pub mod errors;
pub mod policy;
pub mod ports;
pub mod row_task;
pub mod sequential;
pub mod static_partition;

#[cfg(test)]
pub(crate) mod test_support;
