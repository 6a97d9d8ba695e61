//! Run lifecycle for the Julia renderer.
//!
//! `RunController` is the only thing a front end talks to. It queries a
//! `Surface` for the frame size, schedules rows with the requested policy on
//! a coordinator thread, and reports progress through a `RunObserver`.

mod controller;
pub mod errors;
pub mod ports;
pub mod run_request;
pub mod state;

pub use controller::{RunController, RunHandle};
pub use errors::RunError;
pub use ports::observer::RunObserver;
pub use ports::surface::{FixedSurface, Surface};
pub use run_request::{RunRequest, RunRequestError};
pub use state::RunState;
