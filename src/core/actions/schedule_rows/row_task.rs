use crate::core::data::colour::Colour;
use crate::core::data::run_config::RunConfig;
use crate::core::fractals::julia::palette::Palette;
use std::sync::Arc;

/// One output row of one run. Consumed by exactly one compute unit.
#[derive(Debug)]
pub struct RowTask {
    row: u32,
    generation: u64,
    config: Arc<RunConfig>,
}

impl RowTask {
    #[must_use]
    pub fn new(row: u32, generation: u64, config: Arc<RunConfig>) -> Self {
        Self {
            row,
            generation,
            config,
        }
    }

    #[must_use]
    pub fn row(&self) -> u32 {
        self.row
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Runs the escape-time kernel across the row and maps each count
    /// through the spectrum palette.
    #[must_use]
    pub fn execute(&self) -> RowResult {
        let algorithm = self.config.algorithm();
        let palette = Palette::spectrum();

        let colours = (0..self.config.viewport().width())
            .map(|x| palette.colour_for(algorithm.escape_iterations(x, self.row)))
            .collect();

        RowResult::new(self.row, colours)
    }
}

/// One task per row of the config's viewport, top to bottom.
#[must_use]
pub fn build_row_tasks(config: &Arc<RunConfig>, generation: u64) -> Vec<RowTask> {
    (0..config.viewport().height())
        .map(|row| RowTask::new(row, generation, Arc::clone(config)))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowResult {
    row: u32,
    colours: Vec<Colour>,
}

impl RowResult {
    #[must_use]
    pub fn new(row: u32, colours: Vec<Colour>) -> Self {
        Self { row, colours }
    }

    #[must_use]
    pub fn row(&self) -> u32 {
        self.row
    }

    #[must_use]
    pub fn colours(&self) -> &[Colour] {
        &self.colours
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::data::complex::Complex;
    use crate::core::data::viewport::Viewport;
    use crate::core::fractals::julia::params::JuliaParams;

    fn config(width: u32, height: u32) -> Arc<RunConfig> {
        Arc::new(RunConfig::new(
            Viewport::new(width, height).unwrap(),
            JuliaParams::new(Complex::new(-0.8, 0.156), 1.0, 100).unwrap(),
            1,
        ))
    }

    #[test]
    fn test_build_row_tasks_covers_every_row_in_order() {
        let tasks = build_row_tasks(&config(5, 7), 9);

        assert_eq!(tasks.len(), 7);
        for (expected_row, task) in tasks.iter().enumerate() {
            assert_eq!(task.row(), expected_row as u32);
            assert_eq!(task.generation(), 9);
        }
    }

    #[test]
    fn test_execute_produces_full_width_row() {
        let config = config(13, 4);
        let result = RowTask::new(2, 1, Arc::clone(&config)).execute();

        assert_eq!(result.row(), 2);
        assert_eq!(result.colours().len(), 13);
    }

    #[test]
    fn test_execute_maps_kernel_output_through_palette() {
        let config = config(4, 4);
        let algorithm = config.algorithm();
        let palette = Palette::spectrum();

        for row in 0..4 {
            let result = RowTask::new(row, 1, Arc::clone(&config)).execute();
            let expected: Vec<Colour> = (0..4)
                .map(|x| palette.colour_for(algorithm.escape_iterations(x, row)))
                .collect();

            assert_eq!(result.colours(), expected.as_slice());
        }
    }

    #[test]
    fn test_non_escaping_pixel_wraps_palette() {
        let config = Arc::new(RunConfig::new(
            Viewport::new(4, 4).unwrap(),
            JuliaParams::new(Complex::new(0.0, 0.0), 1.0, 300).unwrap(),
            1,
        ));

        let result = RowTask::new(2, 1, config).execute();

        assert_eq!(result.colours()[2], Palette::spectrum().colours()[300 % 256]);
    }
}
