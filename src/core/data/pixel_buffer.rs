use crate::core::data::colour::Colour;
use crate::core::data::viewport::Viewport;
use std::error::Error;
use std::fmt;

const BYTES_PER_PIXEL: usize = 3;

fn viewport_to_buffer_size(viewport: Viewport) -> Result<usize, PixelBufferError> {
    viewport
        .size()
        .and_then(|pixels| pixels.checked_mul(BYTES_PER_PIXEL))
        .ok_or(PixelBufferError::AllocationFailed { bytes: usize::MAX })
}

#[derive(Debug, Clone, PartialEq)]
pub enum PixelBufferError {
    AllocationFailed {
        bytes: usize,
    },
    BoundsMismatch {
        viewport_size: usize,
        buffer_size: usize,
    },
    RowOutsideBounds {
        row: u32,
        height: u32,
    },
    RowWidthMismatch {
        row: u32,
        expected: usize,
        actual: usize,
    },
}

impl fmt::Display for PixelBufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllocationFailed { bytes } => {
                write!(f, "failed to allocate {} bytes for pixel buffer", bytes)
            }
            Self::BoundsMismatch {
                viewport_size,
                buffer_size,
            } => {
                write!(
                    f,
                    "viewport size {} does not match buffer size {}",
                    viewport_size, buffer_size
                )
            }
            Self::RowOutsideBounds { row, height } => {
                write!(f, "row {} outside of viewport height {}", row, height)
            }
            Self::RowWidthMismatch {
                row,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "row {} has {} pixels, expected {}",
                    row, actual, expected
                )
            }
        }
    }
}

impl Error for PixelBufferError {}

pub type PixelBufferData = Vec<u8>;

/// Packed RGB pixels, row-major, three bytes per pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    viewport: Viewport,
    buffer: PixelBufferData,
}

impl PixelBuffer {
    /// Allocates a buffer filled with `colour`, reporting allocation failure
    /// instead of aborting the process.
    pub fn try_filled(viewport: Viewport, colour: Colour) -> Result<Self, PixelBufferError> {
        let total_bytes = viewport_to_buffer_size(viewport)?;
        let mut buffer = PixelBufferData::new();

        buffer
            .try_reserve_exact(total_bytes)
            .map_err(|_| PixelBufferError::AllocationFailed { bytes: total_bytes })?;

        for _ in 0..total_bytes / BYTES_PER_PIXEL {
            buffer.extend_from_slice(&[colour.r, colour.g, colour.b]);
        }

        Ok(Self { viewport, buffer })
    }

    pub fn from_data(viewport: Viewport, buffer: PixelBufferData) -> Result<Self, PixelBufferError> {
        let buffer_size = viewport_to_buffer_size(viewport)?;

        if buffer_size != buffer.len() {
            return Err(PixelBufferError::BoundsMismatch {
                viewport_size: buffer_size,
                buffer_size: buffer.len(),
            });
        }

        Ok(Self { viewport, buffer })
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[must_use]
    pub fn buffer(&self) -> &PixelBufferData {
        &self.buffer
    }

    #[must_use]
    pub fn buffer_size(&self) -> usize {
        self.buffer.len()
    }

    pub fn fill(&mut self, colour: Colour) {
        for pixel in self.buffer.chunks_exact_mut(BYTES_PER_PIXEL) {
            pixel.copy_from_slice(&[colour.r, colour.g, colour.b]);
        }
    }

    pub fn set_row(&mut self, row: u32, colours: &[Colour]) -> Result<(), PixelBufferError> {
        let range = self.row_range(row)?;
        let width = self.viewport.width() as usize;

        if colours.len() != width {
            return Err(PixelBufferError::RowWidthMismatch {
                row,
                expected: width,
                actual: colours.len(),
            });
        }

        for (pixel, colour) in self.buffer[range]
            .chunks_exact_mut(BYTES_PER_PIXEL)
            .zip(colours)
        {
            pixel.copy_from_slice(&[colour.r, colour.g, colour.b]);
        }

        Ok(())
    }

    pub fn row_colours(&self, row: u32) -> Result<Vec<Colour>, PixelBufferError> {
        let range = self.row_range(row)?;

        Ok(self.buffer[range]
            .chunks_exact(BYTES_PER_PIXEL)
            .map(|pixel| Colour::new(pixel[0], pixel[1], pixel[2]))
            .collect())
    }

    #[must_use]
    pub fn colours(&self) -> Vec<Colour> {
        self.buffer
            .chunks_exact(BYTES_PER_PIXEL)
            .map(|pixel| Colour::new(pixel[0], pixel[1], pixel[2]))
            .collect()
    }

    fn row_range(&self, row: u32) -> Result<std::ops::Range<usize>, PixelBufferError> {
        if !self.viewport.contains_row(row) {
            return Err(PixelBufferError::RowOutsideBounds {
                row,
                height: self.viewport.height(),
            });
        }

        let row_bytes = self.viewport.width() as usize * BYTES_PER_PIXEL;
        let start = row as usize * row_bytes;

        Ok(start..start + row_bytes)
    }
}
