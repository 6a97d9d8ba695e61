use std::num::NonZeroU32;
use std::ops::Range;

/// Splits `0..height` into `bands` contiguous row ranges.
///
/// Every band gets `height / bands` rows and the last band also takes the
/// remainder, so when there are more bands than rows all but the last are empty.
#[must_use]
pub fn calculate_row_bands(height: u32, bands: NonZeroU32) -> Vec<Range<u32>> {
    let total_bands = bands.get();
    let band_height = height / total_bands;

    (0..total_bands)
        .map(|band_num| {
            let band_top = band_num * band_height;

            let band_end = if band_num == total_bands - 1 {
                height
            } else {
                (band_num + 1) * band_height
            };

            band_top..band_end
        })
        .collect()
}
