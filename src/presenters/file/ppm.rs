use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::controllers::ports::frame_export::FrameExportPort;
use crate::core::data::pixel_buffer::PixelBuffer;

/// Binary PPM (P6) writer. Missing parent directories are created.
#[derive(Debug, Default, Clone, Copy)]
pub struct PpmFilePresenter;

impl PpmFilePresenter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    pub fn write_to(&self, frame: &PixelBuffer, mut writer: impl Write) -> io::Result<()> {
        let viewport = frame.viewport();

        // P6: binary RGB, then width, height and max channel value
        writeln!(writer, "P6")?;
        writeln!(writer, "{} {}", viewport.width(), viewport.height())?;
        writeln!(writer, "255")?;
        writer.write_all(frame.buffer())?;
        writer.flush()
    }
}

impl FrameExportPort for PpmFilePresenter {
    fn export(&self, frame: &PixelBuffer, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        self.write_to(frame, BufWriter::new(File::create(path)?))
    }
}
