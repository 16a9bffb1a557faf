//! Layers of the rotated planar surface code stacked along *z*.
//!
//! Within each layer, horizontal qubits sit at `(odd, odd, even)` and the
//! checkerboard of plaquettes alternates between *Z*-type vertices
//! (`(x + y) % 4 == 0`) and *X*-type horizontal faces (`(x + y) % 4 == 2`).
//! Vertical qubits join each vertex to the one above it, and every horizontal
//! edge between two layers carries a vertical *X*-type face.
//!
//! Horizontal qubits fall on two diagonal sublattices, which are given the
//! *X* and *Y* axis labels; vertical qubits are the *Z* axis.
//!
//! [`RotatedToric3DCode`] closes the same layers into a 3-torus. Its
//! checkerboard only closes when `Lx` and `Ly` are even.

use crate::{
    bsf::{ Bsf, BsfMatrix, Pauli },
    code::{ Axis, CodeCore, OperatorBuilder, StabilizerCode, StabilizerType },
    error::{ Error, Result },
    lattice::{ Coord, Lattice, ObjectClass, Size },
};

const DIAGONALS: [(i64, i64); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

// the two vertex columns joined by the horizontal edge at (x, y)
fn edge_endpoints(x: i64, y: i64) -> [(i64, i64); 2] {
    if (x + y).rem_euclid(4) == 2 {
        [(x - 1, y - 1), (x + 1, y + 1)]
    } else {
        [(x - 1, y + 1), (x + 1, y - 1)]
    }
}

fn layered_axis(location: &Coord) -> Result<Axis> {
    let Coord { x, y, .. } = *location;
    match location.parity() {
        (true, true, false) if (x + y).rem_euclid(4) == 2 => Ok(Axis::X),
        (true, true, false) => Ok(Axis::Y),
        (false, false, true) => Ok(Axis::Z),
        _ => Err(Error::InvalidLocation {
            location: *location, class: ObjectClass::Qubit }),
    }
}

fn layered_stabilizer_type(core: &CodeCore, location: &Coord)
    -> Result<StabilizerType>
{
    match core.indexer().stabilizer_class(*location)? {
        ObjectClass::Vertex => Ok(StabilizerType::Z),
        _ => Ok(StabilizerType::X),
    }
}

// with `open` set, qubits beyond the boundary are dropped from the support
fn layered_stabilizer(core: &CodeCore, location: &Coord, open: bool)
    -> Result<Bsf>
{
    let place = |op: &mut OperatorBuilder<'_>, pauli: Pauli, at: Coord| {
        if open {
            op.try_site(pauli, at);
            Ok(())
        } else {
            op.site(pauli, at).map(|_| ())
        }
    };
    let Coord { x, y, z, .. } = *location;
    let mut op = core.operator();
    match core.indexer().stabilizer_class(*location)? {
        ObjectClass::Vertex => {
            for (dx, dy) in DIAGONALS {
                place(&mut op, Pauli::Z, location.offset(dx, dy, 0))?;
            }
            place(&mut op, Pauli::Z, location.offset(0, 0, 1))?;
            place(&mut op, Pauli::Z, location.offset(0, 0, -1))?;
        },
        ObjectClass::Face if z.rem_euclid(2) == 0 => {
            for (dx, dy) in DIAGONALS {
                place(&mut op, Pauli::X, location.offset(dx, dy, 0))?;
            }
        },
        ObjectClass::Face => {
            place(&mut op, Pauli::X, location.offset(0, 0, 1))?;
            place(&mut op, Pauli::X, location.offset(0, 0, -1))?;
            for (vx, vy) in edge_endpoints(x, y) {
                place(&mut op, Pauli::X, Coord::new(vx, vy, z))?;
            }
        },
        class => {
            return Err(Error::InvalidLocation { location: *location, class });
        },
    }
    Ok(op.finish())
}

#[derive(Debug)]
pub struct RotatedPlanar3DCode {
    core: CodeCore,
}

impl RotatedPlanar3DCode {
    pub fn new(lx: usize, ly: usize, lz: usize) -> Result<Self> {
        Self::from_size(Size::new(lx, ly, lz))
    }

    pub fn from_size(size: Size) -> Result<Self> {
        Ok(Self { core: CodeCore::new(Lattice::RotatedPlanar, size)? })
    }
}

impl StabilizerCode for RotatedPlanar3DCode {
    fn core(&self) -> &CodeCore { &self.core }

    fn name(&self) -> &'static str { "RotatedPlanar3DCode" }

    fn label(&self) -> String { format!("Rotated Planar {}", self.size()) }

    fn n_k_d(&self) -> (usize, usize, usize) {
        let Size { lx, ly, lz } = self.size();
        (self.qubit_count(), 1, lx.min(ly * lz))
    }

    fn axis(&self, location: &Coord) -> Result<Axis> { layered_axis(location) }

    fn deformed_axis(&self) -> Result<Axis> { Ok(Axis::Z) }

    fn stabilizer_type(&self, location: &Coord) -> Result<StabilizerType> {
        layered_stabilizer_type(&self.core, location)
    }

    fn stabilizer(&self, location: &Coord) -> Result<Bsf> {
        layered_stabilizer(&self.core, location, true)
    }

    fn build_logical_xs(&self) -> Result<BsfMatrix> {
        let x2 = 2 * self.size().lx as i64;
        self.core.collect_ops(1, |_, op| {
            for x in (1..x2).step_by(2) {
                op.site(Pauli::X, Coord::new(x, 1, 0))?;
            }
            Ok(())
        })
    }

    fn build_logical_zs(&self) -> Result<BsfMatrix> {
        let Size { ly, lz, .. } = self.size();
        let (y2, z2) = (2 * ly as i64, 2 * lz as i64);
        self.core.collect_ops(1, |_, op| {
            for y in (1..y2).step_by(2) {
                for z in (0..z2).step_by(2) {
                    op.site(Pauli::Z, Coord::new(1, y, z))?;
                }
            }
            Ok(())
        })
    }
}

/// Rotated layers with periodic boundaries in all three directions.
///
/// Encodes three logical qubits. The logical *X* operators are a zigzag of
/// horizontal qubits winding along *x*, another winding along *y*, and a
/// column of vertical qubits along *z*; the logical *Z* operators are the
/// sheets cutting each of them once.
#[derive(Debug)]
pub struct RotatedToric3DCode {
    core: CodeCore,
}

impl RotatedToric3DCode {
    pub fn new(lx: usize, ly: usize, lz: usize) -> Result<Self> {
        Self::from_size(Size::new(lx, ly, lz))
    }

    pub fn from_size(size: Size) -> Result<Self> {
        Ok(Self { core: CodeCore::new(Lattice::RotatedToric, size)? })
    }
}

impl StabilizerCode for RotatedToric3DCode {
    fn core(&self) -> &CodeCore { &self.core }

    fn name(&self) -> &'static str { "RotatedToric3DCode" }

    fn label(&self) -> String { format!("Rotated Toric {}", self.size()) }

    fn n_k_d(&self) -> (usize, usize, usize) {
        (self.qubit_count(), 3, self.size().min())
    }

    fn axis(&self, location: &Coord) -> Result<Axis> { layered_axis(location) }

    fn deformed_axis(&self) -> Result<Axis> { Ok(Axis::X) }

    fn stabilizer_type(&self, location: &Coord) -> Result<StabilizerType> {
        layered_stabilizer_type(&self.core, location)
    }

    fn stabilizer(&self, location: &Coord) -> Result<Bsf> {
        layered_stabilizer(&self.core, location, false)
    }

    fn build_logical_xs(&self) -> Result<BsfMatrix> {
        let Size { lx, ly, lz } = self.size();
        let (x2, y2, z2) = (2 * lx as i64, 2 * ly as i64, 2 * lz as i64);
        self.core.collect_ops(3, |i, op| {
            match i {
                0 => for x in (1..x2).step_by(2) {
                    op.site(Pauli::X, Coord::new(x, 1, 0))?;
                },
                1 => for y in (1..y2).step_by(2) {
                    op.site(Pauli::X, Coord::new(1, y, 0))?;
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
                0 => for y in (1..y2).step_by(2) {
                    for z in (0..z2).step_by(2) {
                        op.site(Pauli::Z, Coord::new(1, y, z))?;
                    }
                },
                1 => for x in (1..x2).step_by(2) {
                    for z in (0..z2).step_by(2) {
                        op.site(Pauli::Z, Coord::new(x, 1, z))?;
                    }
                },
                // every vertical qubit between the first two layers
                _ => for x in (0..x2).step_by(2) {
                    for y in (0..y2).step_by(2) {
                        if (x + y) % 4 == 0 {
                            op.site(Pauli::Z, Coord::new(x, y, 1))?;
                        }
                    }
                },
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
        let code = RotatedPlanar3DCode::new(3, 3, 2).unwrap();
        let (n, k, d) = code.n_k_d();
        let horizontal = 3 * 3 * 2;
        let columns = code.core().indexer()
            .coords(ObjectClass::Vertex).unwrap()
            .iter()
            .filter(|c| c.z == 0)
            .count();
        assert_eq!(n, horizontal + columns);
        assert_eq!(k, 1);
        assert_eq!(d, 3);
        check_commutation(&code).unwrap();
    }

    #[test]
    fn axes() {
        let code = RotatedPlanar3DCode::new(2, 2, 2).unwrap();
        assert_eq!(code.axis(&Coord::new(1, 1, 0)).unwrap(), Axis::X);
        assert_eq!(code.axis(&Coord::new(1, 3, 0)).unwrap(), Axis::Y);
        assert_eq!(code.axis(&Coord::new(2, 2, 1)).unwrap(), Axis::Z);
        assert!(code.axis(&Coord::new(1, 0, 0)).is_err());
    }

    #[test]
    fn vertical_face_support() {
        let code = RotatedPlanar3DCode::new(2, 2, 2).unwrap();
        // the edge (1, 1) runs from the absent column (0, 0) to (2, 2)
        let f = code.stabilizer(&Coord::new(1, 1, 1)).unwrap();
        assert_eq!(f.weight(), 3);
        let q = code.qubit_index(&Coord::new(2, 2, 1)).unwrap();
        assert_eq!(f.pauli(q), Pauli::X);
    }

    #[test]
    fn toric_counts() {
        let code = RotatedToric3DCode::new(4, 2, 3).unwrap();
        let (n, k, d) = code.n_k_d();
        assert_eq!(n, 4 * 2 * 3 * 3 / 2);
        assert_eq!(k, 3);
        assert_eq!(d, 2);
        assert_eq!(n - code.stabilizers().unwrap().rank(), k);
        check_commutation(&code).unwrap();
    }

    #[test]
    fn toric_stabilizer_weights() {
        let code = RotatedToric3DCode::new(2, 2, 2).unwrap();
        for c in code.stabilizer_coords() {
            let s = code.stabilizer(&c).unwrap();
            match code.stabilizer_type(&c).unwrap() {
                StabilizerType::Z => assert_eq!(s.weight(), 6),
                StabilizerType::X => assert_eq!(s.weight(), 4),
            }
        }
    }

    #[test]
    fn toric_logical_weights() {
        let code = RotatedToric3DCode::new(4, 2, 2).unwrap();
        let xw: Vec<usize> = code.logical_xs().unwrap().iter().map(Bsf::weight).collect();
        let zw: Vec<usize> = code.logical_zs().unwrap().iter().map(Bsf::weight).collect();
        assert_eq!(xw, vec![4, 2, 2]);
        assert_eq!(zw, vec![4, 8, 4]);
    }

    #[test]
    fn toric_deforms_x_axis() {
        let code = RotatedToric3DCode::new(2, 2, 2).unwrap();
        assert_eq!(code.deformed_axis().unwrap(), Axis::X);
        assert_eq!(RotatedPlanar3DCode::new(2, 2, 2).unwrap().deformed_axis().unwrap(), Axis::Z);
    }
}
