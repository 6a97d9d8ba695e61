use rayon::prelude::*;

use crate::core::data::colour::Colour;
use crate::core::fractals::julia::algorithm::JuliaAlgorithm;
use crate::core::fractals::julia::palette::Palette;

/// Escape counts for every pixel in row-major order, computed with rayon's
/// work-stealing scheduler. Independent of the row schedulers, so it serves
/// as a reference frame to check them against.
#[must_use]
pub fn generate_iteration_grid(algorithm: &JuliaAlgorithm) -> Vec<u32> {
    let viewport = algorithm.viewport();

    (0..viewport.height())
        .into_par_iter()
        .flat_map_iter(|y| (0..viewport.width()).map(move |x| algorithm.escape_iterations(x, y)))
        .collect()
}

/// Maps an iteration grid through the palette.
#[must_use]
pub fn colourize_iteration_grid(iterations: &[u32], palette: &Palette) -> Vec<Colour> {
    iterations
        .par_iter()
        .map(|&count| palette.colour_for(count))
        .collect()
}
