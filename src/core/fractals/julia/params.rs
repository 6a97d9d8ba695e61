use crate::core::data::complex::Complex;
use crate::core::fractals::julia::errors::julia::JuliaError;

pub const DEFAULT_MAX_ITERATIONS: u32 = 300;
pub const DEFAULT_CONSTANT: Complex = Complex::new(-0.7, 0.27015);
pub const DEFAULT_ZOOM: f64 = 1.0;

/// Validated inputs to the escape-time iteration, shared by every row of a run.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct JuliaParams {
    constant: Complex,
    zoom: f64,
    max_iterations: u32,
}

impl JuliaParams {
    pub fn new(constant: Complex, zoom: f64, max_iterations: u32) -> Result<Self, JuliaError> {
        if max_iterations == 0 {
            return Err(JuliaError::ZeroMaxIterationsError);
        }

        if !zoom.is_finite() || zoom <= 0.0 {
            return Err(JuliaError::InvalidZoom { zoom });
        }

        if !constant.is_finite() {
            return Err(JuliaError::NonFiniteConstant {
                real: constant.real,
                imag: constant.imag,
            });
        }

        Ok(Self {
            constant,
            zoom,
            max_iterations,
        })
    }

    #[must_use]
    pub fn constant(&self) -> Complex {
        self.constant
    }

    #[must_use]
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    #[must_use]
    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }
}

impl Default for JuliaParams {
    fn default() -> Self {
        Self {
            constant: DEFAULT_CONSTANT,
            zoom: DEFAULT_ZOOM,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}
