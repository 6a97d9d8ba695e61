use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::controllers::run::run_request::{RunRequest, RunRequestError};
use crate::core::actions::schedule_rows::policy::{MAX_PARALLELISM, PolicyKind};
use crate::core::data::complex::Complex;
use crate::core::fractals::julia::params::{DEFAULT_CONSTANT, DEFAULT_MAX_ITERATIONS, DEFAULT_ZOOM};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    Sequential,
    Static,
    Dynamic,
}

impl From<PolicyArg> for PolicyKind {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Sequential => Self::Sequential,
            PolicyArg::Static => Self::StaticPartition,
            PolicyArg::Dynamic => Self::DynamicQueue,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "julia-render",
    version,
    about = "Render a Julia set, spreading rows over threads with a chosen scheduling policy"
)]
pub struct RenderArgs {
    /// Frame width in pixels
    #[arg(long, default_value_t = 1282)]
    pub width: u32,

    /// Frame height in pixels
    #[arg(long, default_value_t = 722)]
    pub height: u32,

    #[arg(long, value_enum, default_value_t = PolicyArg::Dynamic)]
    pub policy: PolicyArg,

    /// Compute units; defaults to 1 for sequential and 4 otherwise
    #[arg(long)]
    pub threads: Option<usize>,

    #[arg(long, default_value_t = DEFAULT_MAX_ITERATIONS)]
    pub max_iterations: u32,

    /// Real part of the Julia constant
    #[arg(long, default_value_t = DEFAULT_CONSTANT.real, allow_hyphen_values = true)]
    pub c_real: f64,

    /// Imaginary part of the Julia constant
    #[arg(long, default_value_t = DEFAULT_CONSTANT.imag, allow_hyphen_values = true)]
    pub c_imag: f64,

    #[arg(long, default_value_t = DEFAULT_ZOOM)]
    pub zoom: f64,

    /// Where to write the frame as binary PPM
    #[arg(long, default_value = "output/julia.ppm")]
    pub output: PathBuf,

    /// Abort the run after this many milliseconds
    #[arg(long)]
    pub abort_after_ms: Option<u64>,

    /// Render with every policy and report each runtime
    #[arg(long)]
    pub compare: bool,
}

impl RenderArgs {
    #[must_use]
    pub fn threads_for(&self, policy: PolicyKind) -> usize {
        match policy {
            PolicyKind::Sequential => 1,
            PolicyKind::StaticPartition | PolicyKind::DynamicQueue => self.threads.unwrap_or(MAX_PARALLELISM),
        }
    }

    pub fn request_for(&self, policy: PolicyKind) -> Result<RunRequest, RunRequestError> {
        let threads = match (policy, self.threads) {
            // An explicit thread count is validated even for sequential runs.
            (PolicyKind::Sequential, Some(threads)) if !self.compare => threads,
            _ => self.threads_for(policy),
        };

        RunRequest::new(
            policy,
            threads,
            self.max_iterations,
            Complex::new(self.c_real, self.c_imag),
            self.zoom,
        )
    }

    pub fn request(&self) -> Result<RunRequest, RunRequestError> {
        self.request_for(self.policy.into())
    }

    /// One request per policy, sequential first.
    pub fn compare_requests(&self) -> Result<Vec<RunRequest>, RunRequestError> {
        [PolicyKind::Sequential, PolicyKind::StaticPartition, PolicyKind::DynamicQueue]
            .into_iter()
            .map(|policy| self.request_for(policy))
            .collect()
    }

    #[must_use]
    pub fn abort_after(&self) -> Option<Duration> {
        self.abort_after_ms.map(Duration::from_millis)
    }
}
