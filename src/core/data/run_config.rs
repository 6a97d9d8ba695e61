use crate::core::data::viewport::Viewport;
use crate::core::fractals::julia::algorithm::JuliaAlgorithm;
use crate::core::fractals::julia::params::JuliaParams;

/// Everything a compute unit needs to render any row of one run.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RunConfig {
    viewport: Viewport,
    params: JuliaParams,
    parallelism: usize,
}

impl RunConfig {
    #[must_use]
    pub fn new(viewport: Viewport, params: JuliaParams, parallelism: usize) -> Self {
        Self {
            viewport,
            params,
            parallelism,
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

    #[must_use]
    pub fn parallelism(&self) -> usize {
        self.parallelism
    }

    #[must_use]
    pub fn algorithm(&self) -> JuliaAlgorithm {
        JuliaAlgorithm::new(self.viewport, self.params)
    }
}
