use std::sync::Arc;

use clap::Parser;
use julia_scheduler::{CliRenderController, FixedSurface, PpmFilePresenter, RenderArgs};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args = RenderArgs::parse();
    let surface = Arc::new(FixedSurface::new(args.width, args.height));
    let mut controller = CliRenderController::new(PpmFilePresenter::new(), surface);

    if args.compare {
        controller.compare(&args.compare_requests()?)?;
    } else {
        controller.render(args.request()?, args.abort_after())?;
    }

    controller.write(&args.output)?;

    Ok(())
}
