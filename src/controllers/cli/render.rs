use std::error::Error;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::{info, warn};

use crate::controllers::ports::frame_export::FrameExportPort;
use crate::controllers::run::errors::RunError;
use crate::controllers::run::ports::surface::Surface;
use crate::controllers::run::run_request::RunRequest;
use crate::controllers::run::state::RunState;
use crate::controllers::run::RunController;
use crate::core::actions::generate_iteration_grid::{colourize_iteration_grid, generate_iteration_grid};
use crate::core::actions::schedule_rows::policy::PolicyKind;
use crate::core::data::pixel_buffer::PixelBuffer;
use crate::core::data::viewport::Viewport;
use crate::core::fractals::julia::algorithm::JuliaAlgorithm;
use crate::core::fractals::julia::palette::Palette;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliError {
    /// A policy's frame differs from the reference render.
    FrameMismatch { policy: PolicyKind },
    NothingRendered,
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FrameMismatch { policy } => {
                write!(f, "{} produced a frame that differs from the reference", policy)
            }
            Self::NothingRendered => write!(f, "no frame has been rendered yet"),
        }
    }
}

impl Error for CliError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    pub policy: PolicyKind,
    pub state: RunState,
    pub elapsed: Duration,
}

/// Command-line driver around a `RunController`: renders, reports the
/// runtime, and hands the last frame to a file exporter.
pub struct CliRenderController<P: FrameExportPort> {
    presenter: P,
    controller: RunController,
    buffer: Option<PixelBuffer>,
}

impl<P: FrameExportPort> CliRenderController<P> {
    pub fn new(presenter: P, surface: Arc<dyn Surface>) -> Self {
        Self {
            presenter,
            controller: RunController::new(surface),
            buffer: None,
        }
    }

    /// Runs `request` to a terminal state, aborting it after `abort_after`
    /// when given.
    pub fn render(&mut self, request: RunRequest, abort_after: Option<Duration>) -> Result<RunOutcome, Box<dyn Error>> {
        let handle = self.controller.start(request)?;

        if let Some(delay) = abort_after {
            thread::sleep(delay);

            match self.controller.abort(&handle) {
                Ok(()) => info!("aborting run {} after {:?}", handle.generation(), delay),
                // Finished before the deadline.
                Err(RunError::NotRunning { .. }) => {}
                Err(err) => return Err(err.into()),
            }
        }

        let elapsed = self.controller.wait_for_completion(&handle)?;
        let state = self.controller.state();

        if let Some(frame) = self.controller.frame() {
            self.buffer = Some(frame.snapshot()?);
        }

        println!("{} runs in: {} seconds", request.policy(), elapsed.as_secs_f64());

        if state == RunState::Aborted {
            println!("run was aborted; the frame is partial");
        }

        Ok(RunOutcome {
            policy: request.policy(),
            state,
            elapsed,
        })
    }

    /// Renders every request in turn and checks each frame against a
    /// reference render of the same parameters.
    pub fn compare(&mut self, requests: &[RunRequest]) -> Result<Vec<RunOutcome>, Box<dyn Error>> {
        let mut outcomes = Vec::with_capacity(requests.len());
        let mut reference: Option<PixelBuffer> = None;

        for request in requests {
            let outcome = self.render(*request, None)?;
            let frame = self.buffer.as_ref().ok_or(CliError::NothingRendered)?;

            if reference.is_none() {
                reference = Some(reference_frame(frame.viewport(), request)?);
            }

            if reference.as_ref() != Some(frame) {
                warn!("{} frame differs from the reference render", request.policy());
                return Err(CliError::FrameMismatch {
                    policy: request.policy(),
                }
                .into());
            }

            outcomes.push(outcome);
        }

        if let Some(fastest) = outcomes.iter().min_by_key(|outcome| outcome.elapsed) {
            println!("fastest: {}", fastest.policy);
        }

        Ok(outcomes)
    }

    pub fn write(&self, filepath: impl AsRef<Path>) -> Result<(), Box<dyn Error>> {
        let buffer = self.buffer.as_ref().ok_or(CliError::NothingRendered)?;
        self.presenter.export(buffer, filepath.as_ref())?;

        Ok(())
    }

    #[must_use]
    pub fn buffer(&self) -> Option<&PixelBuffer> {
        self.buffer.as_ref()
    }
}

fn reference_frame(viewport: Viewport, request: &RunRequest) -> Result<PixelBuffer, Box<dyn Error>> {
    let algorithm = JuliaAlgorithm::new(viewport, request.params());
    let colours = colourize_iteration_grid(&generate_iteration_grid(&algorithm), Palette::spectrum());
    let bytes = colours.iter().flat_map(|colour| [colour.r, colour.g, colour.b]).collect();

    Ok(PixelBuffer::from_data(viewport, bytes)?)
}
