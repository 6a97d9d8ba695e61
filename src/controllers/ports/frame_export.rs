use std::io;
use std::path::Path;

use crate::core::data::pixel_buffer::PixelBuffer;

/// Writes a finished frame somewhere outside the process.
pub trait FrameExportPort {
    fn export(&self, frame: &PixelBuffer, path: &Path) -> io::Result<()>;
}
