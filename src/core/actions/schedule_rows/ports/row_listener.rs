use crate::core::data::colour::Colour;

/// Notified after a row has been written, outside the frame lock.
pub trait RowListener: Send + Sync {
    fn row_ready(&self, row: u32, colours: &[Colour]);
}
