use crate::core::data::complex::Complex;
use crate::core::data::viewport::Viewport;
use crate::core::fractals::julia::params::JuliaParams;
use std::ops::ControlFlow;

const ESCAPE_RADIUS_SQUARED: f64 = 4.0;

/// Escape-time kernel for a single Julia set view.
///
/// Holds no mutable state, so one instance can be shared by any number of
/// threads and always yields the same count for the same pixel.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct JuliaAlgorithm {
    viewport: Viewport,
    params: JuliaParams,
}

impl JuliaAlgorithm {
    #[must_use]
    pub fn new(viewport: Viewport, params: JuliaParams) -> Self {
        Self { viewport, params }
    }

    /// Maps a pixel to its starting point on the complex plane.
    ///
    /// The centre offset uses integer halving of the viewport dimensions, so
    /// odd widths and heights put the origin on the pixel left of (or above)
    /// the true centre.
    #[must_use]
    pub fn starting_point(&self, x: u32, y: u32) -> Complex {
        let width = self.viewport.width();
        let height = self.viewport.height();
        let zoom = self.params.zoom();

        let dx = i64::from(x) - i64::from(width / 2);
        let dy = i64::from(y) - i64::from(height / 2);

        Complex {
            real: 1.5 * dx as f64 / (0.5 * zoom * f64::from(width)),
            imag: dy as f64 / (0.5 * zoom * f64::from(height)),
        }
    }

    /// Number of iterations before the orbit of pixel `(x, y)` leaves the
    /// escape radius, capped at `max_iterations`.
    #[must_use]
    pub fn escape_iterations(&self, x: u32, y: u32) -> u32 {
        let c = self.params.constant();
        let max_iterations = self.params.max_iterations();
        let z = self.starting_point(x, y);

        let iterations = (0..max_iterations).try_fold(z, |z0, iteration| {
            if z0.magnitude_squared() >= ESCAPE_RADIUS_SQUARED {
                ControlFlow::Break(iteration)
            } else {
                ControlFlow::Continue(z0 * z0 + c)
            }
        });

        match iterations {
            ControlFlow::Break(iteration) => iteration,
            ControlFlow::Continue(_) => max_iterations,
        }
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[must_use]
    pub fn params(&self) -> JuliaParams {
        self.params
    }
}
