//! Stabilizer codes on 3D lattices.
//!
//! Every code family implements [`StabilizerCode`]. A family only has to say
//! how to build a single stabilizer generator around a coordinate and how to
//! lay out its logical operators; the full generator matrix, the logical
//! operator matrices, and the check matrices are derived from those on first
//! access and then kept in the code's [`CodeCore`] for its lifetime.
//!
//! Codes are immutable after construction and `Send + Sync`, so a single code
//! can be shared between parallel trials.
//!
//! # Example
//! ```
//! use bn3d::code::{ StabilizerCode, Toric3DCode };
//!
//! let code = Toric3DCode::new(2, 2, 2).unwrap();
//! assert_eq!(code.n_k_d(), (24, 3, 2));
//! assert_eq!(code.logical_xs().unwrap().num_rows(), 3);
//! ```

use std::{ fmt, str::FromStr };
use once_cell::sync::OnceCell;
use serde::{ Deserialize, Serialize };
use tracing::debug;
use crate::{
    bsf::{ bcommute, BitMatrix, BitVec, Bsf, BsfMatrix, Pauli },
    error::{ Error, ModelKind, Result },
    lattice::{ Coord, Lattice, LatticeIndexer, ObjectClass, Size },
};

pub mod toric;
pub mod planar;
pub mod rotated;
pub mod rhombic;

pub use toric::Toric3DCode;
pub use planar::Planar3DCode;
pub use rotated::{ RotatedPlanar3DCode, RotatedToric3DCode };
pub use rhombic::RhombicCode;

/// Orientation label of a qubit.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Pauli type of a stabilizer generator.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum StabilizerType {
    X,
    Z,
}

impl StabilizerType {
    /// Return the Pauli placed on each qubit of the support.
    pub fn pauli(self) -> Pauli {
        match self {
            Self::X => Pauli::X,
            Self::Z => Pauli::Z,
        }
    }
}

impl fmt::Display for StabilizerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Classify an edge qubit by the single axis along which it is odd.
pub(crate) fn edge_axis(location: &Coord) -> Result<Axis> {
    match location.parity() {
        (true, false, false) => Ok(Axis::X),
        (false, true, false) => Ok(Axis::Y),
        (false, false, true) => Ok(Axis::Z),
        _ => Err(Error::InvalidLocation {
            location: *location, class: ObjectClass::Qubit }),
    }
}

/// Accumulates single-qubit Paulis placed by coordinate into a [`Bsf`].
pub struct OperatorBuilder<'a> {
    indexer: &'a LatticeIndexer,
    op: Bsf,
}

impl<'a> OperatorBuilder<'a> {
    pub fn new(indexer: &'a LatticeIndexer) -> Self {
        Self { indexer, op: Bsf::identity(indexer.num_qubits()) }
    }

    /// Multiply the qubit at `location` by `pauli`.
    ///
    /// Fails if `location` is not a qubit.
    pub fn site(&mut self, pauli: Pauli, location: Coord) -> Result<&mut Self> {
        let k = self.indexer.qubit_index(location)?;
        self.op.mul_pauli(k, pauli);
        Ok(self)
    }

    /// Like [`Self::site`], but silently skip locations with no qubit, as at
    /// an open boundary.
    pub fn try_site(&mut self, pauli: Pauli, location: Coord) -> &mut Self {
        if let Ok(k) = self.indexer.qubit_index(location) {
            self.op.mul_pauli(k, pauli);
        }
        self
    }

    pub fn finish(self) -> Bsf { self.op }
}

/// Lattice indices plus the lazily built operator tables of a code.
#[derive(Debug)]
pub struct CodeCore {
    indexer: LatticeIndexer,
    stabilizers: OnceCell<BsfMatrix>,
    logical_xs: OnceCell<BsfMatrix>,
    logical_zs: OnceCell<BsfMatrix>,
}

impl CodeCore {
    pub fn new(lattice: Lattice, size: Size) -> Result<Self> {
        let indexer = LatticeIndexer::new(lattice, size)?;
        debug!(
            "indexed {} lattice {}: {} qubits, {} stabilizers",
            lattice, size, indexer.num_qubits(), indexer.num_stabilizers(),
        );
        Ok(Self {
            indexer,
            stabilizers: OnceCell::new(),
            logical_xs: OnceCell::new(),
            logical_zs: OnceCell::new(),
        })
    }

    pub fn indexer(&self) -> &LatticeIndexer { &self.indexer }

    /// Start building an operator on this lattice.
    pub fn operator(&self) -> OperatorBuilder<'_> {
        OperatorBuilder::new(&self.indexer)
    }

    /// Collect logical operators from per-operator builders.
    pub(crate) fn collect_ops<F>(&self, count: usize, mut build: F)
        -> Result<BsfMatrix>
    where F: FnMut(usize, &mut OperatorBuilder<'_>) -> Result<()>
    {
        let mut ops = BsfMatrix::new(self.indexer.num_qubits());
        for i in 0..count {
            let mut op = self.operator();
            build(i, &mut op)?;
            ops.push(op.finish())?;
        }
        Ok(ops)
    }
}

/// Common interface to all stabilizer code families.
pub trait StabilizerCode: fmt::Debug + Send + Sync {
    /// Return the shared lattice and operator storage.
    fn core(&self) -> &CodeCore;

    /// Return the registered name of the family.
    fn name(&self) -> &'static str;

    /// Return a human-readable label, e.g. `"Toric 3x3x3"`.
    fn label(&self) -> String;

    /// Return the number of physical qubits, logical qubits, and the code
    /// distance.
    fn n_k_d(&self) -> (usize, usize, usize);

    /// Classify a qubit coordinate.
    fn axis(&self, location: &Coord) -> Result<Axis>;

    /// Return the Pauli type of the stabilizer at `location`.
    fn stabilizer_type(&self, location: &Coord) -> Result<StabilizerType>;

    /// Build the single stabilizer generator at `location`.
    fn stabilizer(&self, location: &Coord) -> Result<Bsf>;

    /// Lay out the logical *X* operators.
    fn build_logical_xs(&self) -> Result<BsfMatrix>;

    /// Lay out the logical *Z* operators, with the `i`-th anticommuting only
    /// with the `i`-th logical *X*.
    fn build_logical_zs(&self) -> Result<BsfMatrix>;

    /// Return the axis whose qubits have their *X* and *Z* noise rates
    /// exchanged under a deformed noise model.
    fn deformed_axis(&self) -> Result<Axis> {
        Err(Error::Unimplemented(format!("deformation of {}", self.name())))
    }

    /// Return the lattice size.
    fn size(&self) -> Size { self.core().indexer().size() }

    /// Return the number of physical qubits.
    fn qubit_count(&self) -> usize { self.core().indexer().num_qubits() }

    /// Return all qubit coordinates in index order.
    fn qubit_coords(&self) -> &[Coord] { self.core().indexer().qubits().coords() }

    /// Look up the index of a qubit.
    fn qubit_index(&self, location: &Coord) -> Result<usize> {
        self.core().indexer().qubit_index(*location)
    }

    /// Return all stabilizer coordinates in generation order.
    fn stabilizer_coords(&self) -> Vec<Coord> {
        self.core().indexer().stabilizers().iter()
            .flat_map(|idx| idx.coords().iter().copied())
            .collect()
    }

    /// Return the full stabilizer generator matrix, building it on first
    /// access.
    fn stabilizers(&self) -> Result<&BsfMatrix> {
        self.core().stabilizers.get_or_try_init(|| {
            let stabs = BsfMatrix::from_rows(
                self.qubit_count(),
                self.stabilizer_coords().iter()
                    .map(|c| self.stabilizer(c))
                    .collect::<Result<Vec<Bsf>>>()?,
            )?;
            debug!("built {} stabilizers for {}", stabs.num_rows(), self.label());
            Ok(stabs)
        })
    }

    /// Return the logical *X* operators, building them on first access.
    fn logical_xs(&self) -> Result<&BsfMatrix> {
        self.core().logical_xs.get_or_try_init(|| {
            debug!("building logical X operators for {}", self.label());
            self.build_logical_xs()
        })
    }

    /// Return the logical *Z* operators, building them on first access.
    fn logical_zs(&self) -> Result<&BsfMatrix> {
        self.core().logical_zs.get_or_try_init(|| {
            debug!("building logical Z operators for {}", self.label());
            self.build_logical_zs()
        })
    }

    /// Return the check matrix for *X* errors: the *Z* blocks of all
    /// *Z*-type generators.
    fn hx(&self) -> Result<BitMatrix> {
        let mut hx = BitMatrix::new(self.qubit_count());
        for row in self.stabilizers()?.iter() {
            if row.x().is_zero() && !row.z().is_zero() {
                hx.push(row.z().clone())?;
            }
        }
        Ok(hx)
    }

    /// Return the check matrix for *Z* errors: the *X* blocks of all
    /// *X*-type generators.
    fn hz(&self) -> Result<BitMatrix> {
        let mut hz = BitMatrix::new(self.qubit_count());
        for row in self.stabilizers()?.iter() {
            if row.z().is_zero() && !row.x().is_zero() {
                hz.push(row.x().clone())?;
            }
        }
        Ok(hz)
    }

    /// Measure the syndrome of `error`: one bit per generator, set if the
    /// generator anticommutes with the error.
    fn measure_syndrome(&self, error: &Bsf) -> Result<BitVec> {
        bcommute(self.stabilizers()?, error)
    }
}

/// Lattice dimensions as they appear in experiment files.
///
/// Missing `L_y` and `L_z` default to `L_x`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeParams {
    #[serde(rename = "L_x")]
    pub lx: usize,
    #[serde(rename = "L_y", default, skip_serializing_if = "Option::is_none")]
    pub ly: Option<usize>,
    #[serde(rename = "L_z", default, skip_serializing_if = "Option::is_none")]
    pub lz: Option<usize>,
}

impl CodeParams {
    pub fn size(&self) -> Size {
        Size::new(self.lx, self.ly.unwrap_or(self.lx), self.lz.unwrap_or(self.lx))
    }
}

impl From<Size> for CodeParams {
    fn from(size: Size) -> Self {
        Self { lx: size.lx, ly: Some(size.ly), lz: Some(size.lz) }
    }
}

/// A named model with free-form parameters, `{"model": ..., "parameters":
/// {...}}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    pub model: String,
    #[serde(default)]
    pub parameters: serde_json::Value,
}

impl ModelSpec {
    pub(crate) fn params<T>(&self) -> Result<T>
    where T: serde::de::DeserializeOwned
    {
        serde_json::from_value(self.parameters.clone())
            .map_err(|e| Error::InvalidParameters {
                model: self.model.clone(), reason: e.to_string() })
    }

    /// Build the stabilizer code this spec names.
    pub fn build_code(&self) -> Result<Box<dyn StabilizerCode>> {
        build_code(&self.model, &self.params()?)
    }
}

/// The registered stabilizer code families.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CodeFamily {
    Toric3D,
    Planar3D,
    RotatedPlanar3D,
    RotatedToric3D,
    Rhombic,
}

impl CodeFamily {
    pub const ALL: [Self; 5] = [
        Self::Toric3D,
        Self::Planar3D,
        Self::RotatedPlanar3D,
        Self::RotatedToric3D,
        Self::Rhombic,
    ];

    /// Return the registered name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Toric3D => "Toric3DCode",
            Self::Planar3D => "Planar3DCode",
            Self::RotatedPlanar3D => "RotatedPlanar3DCode",
            Self::RotatedToric3D => "RotatedToric3DCode",
            Self::Rhombic => "RhombicCode",
        }
    }

    /// Select a family from a lattice (`kitaev` or `rotated`) and boundary
    /// (`toric` or `planar`) choice.
    pub fn from_layout(lattice: &str, boundary: &str) -> Result<Self> {
        match (lattice, boundary) {
            ("kitaev", "toric") => Ok(Self::Toric3D),
            ("kitaev", "planar") => Ok(Self::Planar3D),
            ("rotated", "planar") => Ok(Self::RotatedPlanar3D),
            ("rotated", "toric") => Ok(Self::RotatedToric3D),
            _ => Err(Error::UnregisteredModel {
                kind: ModelKind::Code,
                name: format!("{} {}", lattice, boundary),
            }),
        }
    }

    /// Build a code of this family.
    pub fn build(&self, size: Size) -> Result<Box<dyn StabilizerCode>> {
        let code: Box<dyn StabilizerCode> = match self {
            Self::Toric3D => Box::new(Toric3DCode::from_size(size)?),
            Self::Planar3D => Box::new(Planar3DCode::from_size(size)?),
            Self::RotatedPlanar3D
                => Box::new(RotatedPlanar3DCode::from_size(size)?),
            Self::RotatedToric3D
                => Box::new(RotatedToric3DCode::from_size(size)?),
            Self::Rhombic => Box::new(RhombicCode::from_size(size)?),
        };
        Ok(code)
    }
}

impl FromStr for CodeFamily {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL.into_iter()
            .find(|family| family.name() == s)
            .ok_or_else(|| Error::UnregisteredModel {
                kind: ModelKind::Code, name: s.to_string() })
    }
}

impl fmt::Display for CodeFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Build a code by registered name.
pub fn build_code(name: &str, params: &CodeParams)
    -> Result<Box<dyn StabilizerCode>>
{
    name.parse::<CodeFamily>()?.build(params.size())
}

/// Check the commutation relations every code must satisfy, returning a
/// description of the first violation.
#[cfg(test)]
pub(crate) fn check_commutation(code: &dyn StabilizerCode)
    -> std::result::Result<(), String>
{
    use crate::bsf::bcommute_matrix;
    let stabs = code.stabilizers().map_err(|e| e.to_string())?;
    let lx = code.logical_xs().map_err(|e| e.to_string())?;
    let lz = code.logical_zs().map_err(|e| e.to_string())?;
    let label = code.label();
    let k = code.n_k_d().1;
    if lx.num_rows() != k || lz.num_rows() != k {
        return Err(format!("{}: expected {} logicals", label, k));
    }
    let ss = bcommute_matrix(stabs, stabs).map_err(|e| e.to_string())?;
    if let Some(i) = ss.rows().iter().position(|r| !r.is_zero()) {
        return Err(format!("{}: stabilizer {} anticommutes", label, i));
    }
    for (name, logicals) in [("X", lx), ("Z", lz)] {
        let sl = bcommute_matrix(logicals, stabs).map_err(|e| e.to_string())?;
        if let Some(i) = sl.rows().iter().position(|r| !r.is_zero()) {
            return Err(format!(
                "{}: logical {} {} anticommutes with a stabilizer", label, name, i));
        }
        let ll = bcommute_matrix(logicals, logicals).map_err(|e| e.to_string())?;
        if ll.rows().iter().any(|r| !r.is_zero()) {
            return Err(format!("{}: logical {}s do not commute", label, name));
        }
    }
    let xz = bcommute_matrix(lx, lz).map_err(|e| e.to_string())?;
    for (i, row) in xz.rows().iter().enumerate() {
        let expected: Vec<usize> = vec![i];
        if row.ones().collect::<Vec<usize>>() != expected {
            return Err(format!("{}: logical X {} pairs with {}", label, i, row));
        }
    }
    Ok(())
}
