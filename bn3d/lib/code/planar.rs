//! The 3D surface code on a cubic lattice with open boundaries.
//!
//! The lattice is cut open along all three directions. The two faces normal
//! to *x* are rough (only *x* edges poke through them) and the other four are
//! smooth, so the code holds a single logical qubit: logical *X* is a line of
//! *x* edges joining the rough faces and logical *Z* is the sheet of *x*
//! edges just inside one of them. Checks at the boundary drop whichever of
//! their qubits lie outside the lattice.

use crate::{
    bsf::{ Bsf, BsfMatrix, Pauli },
    code::{
        edge_axis,
        toric::{ face_edges, NEIGHBORS },
        Axis, CodeCore, StabilizerCode, StabilizerType,
    },
    error::{ Error, Result },
    lattice::{ Coord, Lattice, ObjectClass, Size },
};

#[derive(Debug)]
pub struct Planar3DCode {
    core: CodeCore,
}

impl Planar3DCode {
    pub fn new(lx: usize, ly: usize, lz: usize) -> Result<Self> {
        Self::from_size(Size::new(lx, ly, lz))
    }

    pub fn from_size(size: Size) -> Result<Self> {
        Ok(Self { core: CodeCore::new(Lattice::Planar, size)? })
    }
}

impl StabilizerCode for Planar3DCode {
    fn core(&self) -> &CodeCore { &self.core }

    fn name(&self) -> &'static str { "Planar3DCode" }

    fn label(&self) -> String { format!("Planar {}", self.size()) }

    fn n_k_d(&self) -> (usize, usize, usize) {
        let Size { lx, ly, lz } = self.size();
        (self.qubit_count(), 1, lx.min(ly * lz))
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
                    op.try_site(Pauli::Z, location.offset(dx, dy, dz));
                }
            },
            ObjectClass::Face => {
                for edge in face_edges(location) {
                    op.try_site(Pauli::X, edge);
                }
            },
            class => {
                return Err(Error::InvalidLocation { location: *location, class });
            },
        }
        Ok(op.finish())
    }

    fn build_logical_xs(&self) -> Result<BsfMatrix> {
        let x2 = 2 * self.size().lx as i64;
        self.core.collect_ops(1, |_, op| {
            for x in (1..x2).step_by(2) {
                op.site(Pauli::X, Coord::new(x, 0, 0))?;
            }
            Ok(())
        })
    }

    fn build_logical_zs(&self) -> Result<BsfMatrix> {
        let Size { ly, lz, .. } = self.size();
        let (y2, z2) = (2 * ly as i64, 2 * lz as i64);
        self.core.collect_ops(1, |_, op| {
            for y in (0..y2).step_by(2) {
                for z in (0..z2).step_by(2) {
                    op.site(Pauli::Z, Coord::new(1, y, z))?;
                }
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::code::check_commutation;

    #[test]
    fn counts() {
        let code = Planar3DCode::new(3, 2, 2).unwrap();
        let (n, k, d) = code.n_k_d();
        assert_eq!(n, 12 + 2 * 2 + 2 * 2);
        assert_eq!(k, 1);
        assert_eq!(d, 3);
        check_commutation(&code).unwrap();
    }

    #[test]
    fn encodes_one_qubit() {
        let code = Planar3DCode::new(2, 2, 2).unwrap();
        let (n, k, _) = code.n_k_d();
        assert_eq!(n, 12);
        assert_eq!(n - code.stabilizers().unwrap().rank(), k);
    }

    #[test]
    fn boundary_checks_are_truncated() {
        let code = Planar3DCode::new(2, 2, 2).unwrap();
        // corner vertex: one x edge on each side, plus one y and one z edge
        let v = code.stabilizer(&Coord::new(2, 0, 0)).unwrap();
        assert_eq!(v.weight(), 4);
        // xy face on the rough boundary is missing its x = 0 edge
        let f = code.stabilizer(&Coord::new(1, 1, 0)).unwrap();
        assert_eq!(f.weight(), 3);
    }

    #[test]
    fn open_lattice_does_not_wrap() {
        let code = Planar3DCode::new(2, 2, 2).unwrap();
        assert!(code.qubit_index(&Coord::new(-1, 0, 0)).is_err());
        assert!(code.qubit_index(&Coord::new(0, 1, 0)).is_err());
        assert!(code.qubit_index(&Coord::new(3, 2, 2)).is_ok());
    }
}
