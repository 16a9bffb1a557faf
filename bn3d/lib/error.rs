//! Error types shared across the crate.

use std::fmt;
use thiserror::Error;
use crate::{
    decoder::DecoderError,
    lattice::{ Coord, ObjectClass, Size },
};

/// The kind of model named in an [`Error::UnregisteredModel`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ModelKind {
    /// A stabilizer code family.
    Code,
    /// A noise (error) model.
    ErrorModel,
    /// A decoder.
    Decoder,
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Code => write!(f, "code"),
            Self::ErrorModel => write!(f, "error"),
            Self::Decoder => write!(f, "decoder"),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("noise direction ({0}, {1}, {2}) does not sum to 1.0")]
    InvalidDirection(f64, f64, f64),

    #[error("probability {0} is not in [0, 1]")]
    InvalidProbability(f64),

    #[error("invalid lattice size {size}: {reason}")]
    InvalidSize { size: Size, reason: &'static str },

    #[error("unregistered {kind} model '{name}'")]
    UnregisteredModel { kind: ModelKind, name: String },

    #[error("invalid parameters for '{model}': {reason}")]
    InvalidParameters { model: String, reason: String },

    #[error("location {location} does not correspond to a {class}")]
    InvalidLocation { location: Coord, class: ObjectClass },

    #[error("{0} is not implemented")]
    Unimplemented(String),

    #[error("operator acts on {found} qubits, expected {expected}")]
    LengthMismatch { expected: usize, found: usize },

    #[error("decoder failed: {0}")]
    Decoder(#[from] DecoderError),

    #[error("missing column '{0}'")]
    MissingColumn(String),

    #[error("column '{0}' holds a non-numeric value")]
    NonNumericColumn(String),

    #[error("duplicate column '{0}'")]
    DuplicateColumn(String),

    #[error("analysis stage '{required}' must run first")]
    StageOrder { required: &'static str },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
