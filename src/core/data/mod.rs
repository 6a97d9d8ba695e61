pub mod colour;
pub mod complex;
pub mod frame_buffer;
pub mod pixel_buffer;
pub mod run_config;
pub mod viewport;
