pub mod algorithm;
pub mod errors;
pub mod palette;
pub mod params;
