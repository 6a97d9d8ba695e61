pub mod controllers;
pub mod core;
pub mod presenters;

pub use crate::controllers::cli::{CliRenderController, RenderArgs};
pub use crate::controllers::run::{
    FixedSurface, RunController, RunError, RunHandle, RunObserver, RunRequest, RunRequestError, RunState, Surface,
};
pub use crate::core::actions::schedule_rows::policy::{MAX_PARALLELISM, PolicyKind};
pub use crate::core::data::complex::Complex;
pub use crate::presenters::file::ppm::PpmFilePresenter;
