/// Whatever the frame is shown on. Queried once per run, at start.
pub trait Surface: Send + Sync {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
}

/// A surface whose size never changes, e.g. an output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedSurface {
    width: u32,
    height: u32,
}

impl FixedSurface {
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Surface for FixedSurface {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}
