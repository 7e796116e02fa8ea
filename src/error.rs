//! Caller contract violations raised by the map core

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MapError {
    #[error("Sampling radius must be positive and finite, got {0}")]
    InvalidRadius(f64),
    #[error("Invalid gradient: {0}")]
    InvalidGradient(String),
    #[error("Unknown color: {0}")]
    UnknownColor(String),
    #[error("Invalid style: {0}")]
    InvalidStyle(String),
}
