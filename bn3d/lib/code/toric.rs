//! The 3D toric code on a periodic cubic lattice.
//!
//! Qubits sit on edges. Each vertex carries a *Z*-type check on its six
//! incident edges and each face an *X*-type check on its four boundary edges.
//! The three logical *X* operators are non-contractible lines of *X* along
//! the *x*, *y*, and *z* edges; the logical *Z* operators are the dual sheets
//! of *Z* cutting them.

use crate::{
    bsf::{ Bsf, BsfMatrix, Pauli },
    code::{ edge_axis, Axis, CodeCore, StabilizerCode, StabilizerType },
    error::{ Error, Result },
    lattice::{ Coord, Lattice, ObjectClass, Size },
};

pub(crate) const NEIGHBORS: [(i64, i64, i64); 6] = [
    (1, 0, 0), (-1, 0, 0),
    (0, 1, 0), (0, -1, 0),
    (0, 0, 1), (0, 0, -1),
];

/// Return the four edges bounding the face at `location`: one step either
/// way along each of its two odd axes.
pub(crate) fn face_edges(location: &Coord) -> Vec<Coord> {
    let (px, py, pz) = location.parity();
    NEIGHBORS.iter()
        .filter(|(dx, dy, dz)| {
            (*dx != 0 && px) || (*dy != 0 && py) || (*dz != 0 && pz)
        })
        .map(|(dx, dy, dz)| location.offset(*dx, *dy, *dz))
        .collect()
}

#[derive(Debug)]
pub struct Toric3DCode {
    core: CodeCore,
}

impl Toric3DCode {
    pub fn new(lx: usize, ly: usize, lz: usize) -> Result<Self> {
        Self::from_size(Size::new(lx, ly, lz))
    }

    pub fn from_size(size: Size) -> Result<Self> {
        Ok(Self { core: CodeCore::new(Lattice::Toric, size)? })
    }
}

impl StabilizerCode for Toric3DCode {
    fn core(&self) -> &CodeCore { &self.core }

    fn name(&self) -> &'static str { "Toric3DCode" }

    fn label(&self) -> String { format!("Toric {}", self.size()) }

    fn n_k_d(&self) -> (usize, usize, usize) {
        (self.qubit_count(), 3, self.size().min())
    }

    fn axis(&self, location: &Coord) -> Result<Axis> { edge_axis(location) }

    fn deformed_axis(&self) -> Result<Axis> { Ok(Axis::Z) }

    fn stabilizer_type(&self, location: &Coord) -> Result<StabilizerType> {
        match self.core.indexer().stabilizer_class(*location)? {
            ObjectClass::Vertex => Ok(StabilizerType::Z),
            _ => Ok(StabilizerType::X),
        }
    }

    fn stabilizer(&self, location: &Coord) -> Result<Bsf> {
        let mut op = self.core.operator();
        match self.core.indexer().stabilizer_class(*location)? {
            ObjectClass::Vertex => {
                for (dx, dy, dz) in NEIGHBORS {
                    op.site(Pauli::Z, location.offset(dx, dy, dz))?;
                }
            },
            ObjectClass::Face => {
                for edge in face_edges(location) {
                    op.site(Pauli::X, edge)?;
                }
            },
            class => {
                return Err(Error::InvalidLocation { location: *location, class });
            },
        }
        Ok(op.finish())
    }

    fn build_logical_xs(&self) -> Result<BsfMatrix> {
        let Size { lx, ly, lz } = self.size();
        let (x2, y2, z2) = (2 * lx as i64, 2 * ly as i64, 2 * lz as i64);
        self.core.collect_ops(3, |i, op| {
            match i {
                0 => for x in (1..x2).step_by(2) {
                    op.site(Pauli::X, Coord::new(x, 0, 0))?;
                },
                1 => for y in (1..y2).step_by(2) {
                    op.site(Pauli::X, Coord::new(0, y, 0))?;
                },
                _ => for z in (1..z2).step_by(2) {
                    op.site(Pauli::X, Coord::new(0, 0, z))?;
                },
            }
            Ok(())
        })
    }

    fn build_logical_zs(&self) -> Result<BsfMatrix> {
        let Size { lx, ly, lz } = self.size();
        let (x2, y2, z2) = (2 * lx as i64, 2 * ly as i64, 2 * lz as i64);
        self.core.collect_ops(3, |i, op| {
            match i {
                // x edges in the sheet normal to x
                0 => for y in (0..y2).step_by(2) {
                    for z in (0..z2).step_by(2) {
                        op.site(Pauli::Z, Coord::new(1, y, z))?;
                    }
                },
                1 => for z in (0..z2).step_by(2) {
                    for x in (0..x2).step_by(2) {
                        op.site(Pauli::Z, Coord::new(x, 1, z))?;
                    }
                },
                _ => for x in (0..x2).step_by(2) {
                    for y in (0..y2).step_by(2) {
                        op.site(Pauli::Z, Coord::new(x, y, 1))?;
                    }
                },
            }
            Ok(())
        })
    }
}
