//! Tools for simulating quantum error-correcting codes on 3D lattices under
//! biased Pauli noise, and for analyzing the Monte Carlo data they produce.
//!
//! Pauli operators are handled throughout in the binary symplectic form (see
//! [`bsf`]). Codes ([`code`]) are built on deterministic coordinate indices
//! ([`lattice`]) and expose their stabilizers and logical operators as BSF
//! matrices; noise models ([`noise`]) sample errors on them; decoders are
//! external ([`decoder`]) and only appear through a trait. [`simulation`]
//! strings these together into trials, and [`analysis`] turns raw run
//! records into disorder-averaged estimates.

pub mod error;
pub mod bsf;
pub mod lattice;
pub mod code;
pub mod noise;
pub mod decoder;
pub mod simulation;
pub mod analysis;

pub use error::{ Error, Result };
