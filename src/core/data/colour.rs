#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Hash)]
pub struct Colour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Colour {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Converts a hue/saturation/brightness triple (each in `0.0..=1.0`) to RGB.
    ///
    /// The hue wheel is split into six sextants and each channel is quantized
    /// with round-half-up, so `from_hsb(0.0, 1.0, 1.0)` and
    /// `from_hsb(1.0, 1.0, 1.0)` are both pure red.
    #[must_use]
    pub fn from_hsb(hue: f32, saturation: f32, brightness: f32) -> Self {
        let quantize = |channel: f32| (channel * 255.0 + 0.5) as u8;

        if saturation == 0.0 {
            let grey = quantize(brightness);
            return Self::new(grey, grey, grey);
        }

        let h = (hue - hue.floor()) * 6.0;
        let f = h - h.floor();
        let p = brightness * (1.0 - saturation);
        let q = brightness * (1.0 - saturation * f);
        let t = brightness * (1.0 - saturation * (1.0 - f));

        let (r, g, b) = match h as u32 {
            0 => (brightness, t, p),
            1 => (q, brightness, p),
            2 => (p, brightness, t),
            3 => (p, q, brightness),
            4 => (t, p, brightness),
            _ => (brightness, p, q),
        };

        Self::new(quantize(r), quantize(g), quantize(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_hue_is_red() {
        assert_eq!(Colour::from_hsb(0.0, 1.0, 1.0), Colour::new(255, 0, 0));
    }

    #[test]
    fn test_full_turn_wraps_back_to_red() {
        assert_eq!(Colour::from_hsb(1.0, 1.0, 1.0), Colour::new(255, 0, 0));
    }

    #[test]
    fn test_half_turn_is_cyan() {
        assert_eq!(Colour::from_hsb(0.5, 1.0, 1.0), Colour::new(0, 255, 255));
    }

    #[test]
    fn test_zero_saturation_is_grey() {
        assert_eq!(Colour::from_hsb(0.3, 0.0, 0.5), Colour::new(128, 128, 128));
    }

    #[test]
    fn test_zero_brightness_is_black() {
        assert_eq!(Colour::from_hsb(0.7, 1.0, 0.0), Colour::new(0, 0, 0));
    }
}
