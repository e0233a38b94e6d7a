//! Error types for majorant construction and delta tracking

use thiserror::Error;

use crate::plf::CursorError;

#[derive(Error, Debug)]
pub enum DeltaError {
    #[error("Value {value} outside domain [{min}, {max}]")]
    Domain { value: f64, min: f64, max: f64 },

    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error(
        "Total cross section {local} at energy {energy} eV exceeds the majorant value {majorant}"
    )]
    EnvelopeConsistencyViolation { energy: f64, local: f64, majorant: f64 },

    #[error("Envelope has no data")]
    EmptyEnvelope,

    #[error("Geometry contains no cells")]
    EmptyGeometry,

    #[error("Unknown region {0}")]
    UnknownRegion(usize),

    #[error("No cross-section data for nuclide {0}")]
    UnknownNuclide(String),

    #[error("Cursor error: {0}")]
    Cursor(#[from] CursorError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Configuration parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DeltaError>;
