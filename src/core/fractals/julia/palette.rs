use crate::core::data::colour::Colour;
use std::sync::LazyLock;

pub const PALETTE_SIZE: usize = 256;

static SPECTRUM: LazyLock<Palette> = LazyLock::new(Palette::hsb_spectrum);

/// Fixed colour table indexed by iteration count modulo [`PALETTE_SIZE`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colours: [Colour; PALETTE_SIZE],
}

impl Palette {
    /// Entry `i` is the fully saturated, full brightness colour at hue `i / 255`.
    #[must_use]
    pub fn hsb_spectrum() -> Self {
        let mut colours = [Colour::default(); PALETTE_SIZE];

        for (i, colour) in colours.iter_mut().enumerate() {
            *colour = Colour::from_hsb(i as f32 / 255.0, 1.0, 1.0);
        }

        Self { colours }
    }

    /// Process-wide spectrum palette, built on first use.
    #[must_use]
    pub fn spectrum() -> &'static Palette {
        &SPECTRUM
    }

    #[must_use]
    pub fn colour_for(&self, iterations: u32) -> Colour {
        self.colours[iterations as usize % PALETTE_SIZE]
    }

    #[must_use]
    pub fn colours(&self) -> &[Colour] {
        &self.colours
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_spectrum_starts_and_ends_on_red() {
        let palette = Palette::hsb_spectrum();

        assert_eq!(palette.colours().len(), PALETTE_SIZE);
        assert_eq!(palette.colours()[0], Colour::new(255, 0, 0));
        assert_eq!(palette.colours()[255], Colour::new(255, 0, 0));
    }

    #[test]
    fn test_lookup_wraps_modulo_palette_size() {
        let palette = Palette::hsb_spectrum();

        assert_eq!(palette.colour_for(300), palette.colours()[44]);
        assert_eq!(palette.colour_for(256), palette.colour_for(0));
        assert_eq!(palette.colour_for(511), palette.colour_for(255));
    }

    #[test]
    fn test_low_iteration_counts_have_distinct_colours() {
        let palette = Palette::hsb_spectrum();
        let distinct: HashSet<Colour> = (0..=100).map(|i| palette.colour_for(i)).collect();

        assert_eq!(distinct.len(), 101);
    }

    #[test]
    fn test_every_entry_is_fully_saturated() {
        for colour in Palette::hsb_spectrum().colours() {
            let channels = [colour.r, colour.g, colour.b];

            assert!(channels.contains(&255), "{:?} lacks a full channel", colour);
            assert!(channels.contains(&0), "{:?} lacks an empty channel", colour);
        }
    }

    #[test]
    fn test_shared_spectrum_matches_fresh_build() {
        assert_eq!(Palette::spectrum(), &Palette::hsb_spectrum());
    }
}
