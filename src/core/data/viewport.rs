use std::error::Error;
use std::fmt;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ViewportError {
    Empty { width: u32, height: u32 },
}

impl fmt::Display for ViewportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { width, height } => {
                write!(f, "viewport size must be positive: {}x{}", width, height)
            }
        }
    }
}

impl Error for ViewportError {}

/// Pixel dimensions of the surface being rendered, anchored at the origin.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Viewport {
    width: u32,
    height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Result<Self, ViewportError> {
        if width == 0 || height == 0 {
            return Err(ViewportError::Empty { width, height });
        }

        Ok(Self { width, height })
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel count, or `None` when it does not fit in `usize`.
    #[must_use]
    pub fn size(&self) -> Option<usize> {
        (self.width as usize).checked_mul(self.height as usize)
    }

    #[must_use]
    pub fn contains_row(&self, row: u32) -> bool {
        row < self.height
    }
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
