pub mod args;
pub mod render;

pub use args::{PolicyArg, RenderArgs};
pub use render::{CliError, CliRenderController, RunOutcome};
