//! Interface to syndrome decoders.
//!
//! Decoders are black boxes: given a code and a measured syndrome they return
//! a correction, or report that they failed to produce one.

use std::fmt;
use thiserror::Error;
use crate::{
    bsf::{ BitVec, Bsf },
    code::StabilizerCode,
    error::{ Error as CrateError, ModelKind },
};

#[derive(Debug, Error)]
pub enum DecoderError {
    #[error("no convergence after {iterations} iterations")]
    NotConverged { iterations: usize },

    #[error("{0}")]
    Failed(String),
}

/// Common interface to all decoders.
pub trait Decoder: fmt::Debug + Send + Sync {
    /// Return a human-readable label.
    fn label(&self) -> String;

    /// Find a correction for `syndrome` on `code`.
    fn decode(&self, code: &dyn StabilizerCode, syndrome: &BitVec)
        -> Result<Bsf, DecoderError>;
}

/// Always returns the identity; a reference point for failure rates.
#[derive(Copy, Clone, Debug, Default)]
pub struct NullDecoder;

impl Decoder for NullDecoder {
    fn label(&self) -> String { "Null decoder".into() }

    fn decode(&self, code: &dyn StabilizerCode, _syndrome: &BitVec)
        -> Result<Bsf, DecoderError>
    {
        Ok(Bsf::identity(code.qubit_count()))
    }
}

/// Build a decoder by registered name.
pub fn build_decoder(name: &str) -> Result<Box<dyn Decoder>, CrateError> {
    match name {
        "NullDecoder" => Ok(Box::new(NullDecoder)),
        _ => Err(CrateError::UnregisteredModel {
            kind: ModelKind::Decoder, name: name.to_string() }),
    }
}
