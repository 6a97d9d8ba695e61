use std::error::Error;
use std::fmt;

use crate::core::actions::schedule_rows::policy::{MAX_PARALLELISM, PolicyKind};
use crate::core::data::complex::Complex;
use crate::core::fractals::julia::errors::julia::JuliaError;
use crate::core::fractals::julia::params::JuliaParams;

#[derive(Debug, Clone, PartialEq)]
pub enum RunRequestError {
    Parallelism { policy: PolicyKind, requested: usize },
    Julia(JuliaError),
}

impl fmt::Display for RunRequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parallelism { policy, requested } => {
                let range = policy.parallelism_range();
                write!(
                    f,
                    "{} needs between {} and {} compute units, got {}",
                    policy,
                    range.start(),
                    range.end(),
                    requested
                )
            }
            Self::Julia(err) => write!(f, "invalid julia parameters: {}", err),
        }
    }
}

impl Error for RunRequestError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Julia(err) => Some(err),
            Self::Parallelism { .. } => None,
        }
    }
}

impl From<JuliaError> for RunRequestError {
    fn from(err: JuliaError) -> Self {
        Self::Julia(err)
    }
}

/// A validated request for one run. The viewport is not part of it; the
/// controller asks the surface at start.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RunRequest {
    policy: PolicyKind,
    parallelism: usize,
    params: JuliaParams,
}

impl RunRequest {
    pub fn new(
        policy: PolicyKind,
        parallelism: usize,
        max_iterations: u32,
        constant: Complex,
        zoom: f64,
    ) -> Result<Self, RunRequestError> {
        Self::with_params(policy, parallelism, JuliaParams::new(constant, zoom, max_iterations)?)
    }

    pub fn with_params(policy: PolicyKind, parallelism: usize, params: JuliaParams) -> Result<Self, RunRequestError> {
        if !policy.supports_parallelism(parallelism) {
            return Err(RunRequestError::Parallelism {
                policy,
                requested: parallelism,
            });
        }

        Ok(Self {
            policy,
            parallelism,
            params,
        })
    }

    #[must_use]
    pub fn policy(&self) -> PolicyKind {
        self.policy
    }

    #[must_use]
    pub fn parallelism(&self) -> usize {
        self.parallelism
    }

    #[must_use]
    pub fn params(&self) -> JuliaParams {
        self.params
    }
}

impl Default for RunRequest {
    fn default() -> Self {
        Self {
            policy: PolicyKind::DynamicQueue,
            parallelism: MAX_PARALLELISM,
            params: JuliaParams::default(),
        }
    }
}
