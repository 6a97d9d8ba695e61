pub mod observer;
pub mod surface;
