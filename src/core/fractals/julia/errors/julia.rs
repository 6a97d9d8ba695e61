use std::{error::Error, fmt};

#[derive(Debug, Clone, PartialEq)]
pub enum JuliaError {
    ZeroMaxIterationsError,
    InvalidZoom { zoom: f64 },
    NonFiniteConstant { real: f64, imag: f64 },
}

impl fmt::Display for JuliaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroMaxIterationsError => {
                write!(f, "Maximum iterations must be greater than zero")
            }
            Self::InvalidZoom { zoom } => {
                write!(f, "Zoom must be positive and finite, got {}", zoom)
            }
            Self::NonFiniteConstant { real, imag } => {
                write!(f, "Julia constant must be finite, got ({}, {})", real, imag)
            }
        }
    }
}

impl Error for JuliaError {}
