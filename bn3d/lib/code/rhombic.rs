//! The rhombic dodecahedral code on a periodic cubic lattice.
//!
//! Qubits sit on edges, exactly as in the toric code. Half of the unit cubes,
//! those whose centre satisfies `(x + y + z) % 4 == 1`, carry a 12-body
//! *X*-type check. Every vertex carries four 3-body *Z*-type "triangle"
//! checks, one per surrounding cube that is *not* an *X* check; each acts on
//! the three edges of that cube meeting at the vertex.
//!
//! The alternating cube pattern only closes up on a torus with even side
//! lengths.

use crate::{
    bsf::{ Bsf, BsfMatrix, Pauli },
    code::{ edge_axis, Axis, CodeCore, StabilizerCode, StabilizerType },
    error::{ Error, Result },
    lattice::{ Coord, Lattice, ObjectClass, Size },
};

const CUBE_EDGES: [(i64, i64, i64); 12] = [
    (1, 1, 0), (1, -1, 0), (-1, 1, 0), (-1, -1, 0),
    (1, 0, 1), (1, 0, -1), (-1, 0, 1), (-1, 0, -1),
    (0, 1, 1), (0, 1, -1), (0, -1, 1), (0, -1, -1),
];

// octants around a vertex whose coordinates sum to 0 mod 4 that hold no cube
// check; negate for vertices summing to 2 mod 4
const TRIANGLE_OCTANTS: [(i64, i64, i64); 4] = [
    (1, 1, 1), (1, -1, -1), (-1, 1, -1), (-1, -1, 1),
];

#[derive(Debug)]
pub struct RhombicCode {
    core: CodeCore,
}

impl RhombicCode {
    pub fn new(lx: usize, ly: usize, lz: usize) -> Result<Self> {
        Self::from_size(Size::new(lx, ly, lz))
    }

    /// Fails with [`Error::Unimplemented`] unless every side length is even.
    pub fn from_size(size: Size) -> Result<Self> {
        Ok(Self { core: CodeCore::new(Lattice::Rhombic, size)? })
    }

    /// Return the octant `(sx, sy, sz)` of the triangle labeled `axis` at the
    /// vertex `(x, y, z)`.
    pub fn triangle_octant(axis: u8, x: i64, y: i64, z: i64)
        -> Option<(i64, i64, i64)>
    {
        let (sx, sy, sz) = *TRIANGLE_OCTANTS.get(axis as usize)?;
        if (x + y + z).rem_euclid(4) == 0 {
            Some((sx, sy, sz))
        } else {
            Some((-sx, -sy, -sz))
        }
    }
}

impl StabilizerCode for RhombicCode {
    fn core(&self) -> &CodeCore { &self.core }

    fn name(&self) -> &'static str { "RhombicCode" }

    fn label(&self) -> String { format!("Rhombic {}", self.size()) }

    fn n_k_d(&self) -> (usize, usize, usize) {
        (self.qubit_count(), 3, self.size().min())
    }

    fn axis(&self, location: &Coord) -> Result<Axis> { edge_axis(location) }

    fn deformed_axis(&self) -> Result<Axis> { Ok(Axis::Z) }

    fn stabilizer_type(&self, location: &Coord) -> Result<StabilizerType> {
        match self.core.indexer().stabilizer_class(*location)? {
            ObjectClass::Cube => Ok(StabilizerType::X),
            _ => Ok(StabilizerType::Z),
        }
    }

    fn stabilizer(&self, location: &Coord) -> Result<Bsf> {
        let mut op = self.core.operator();
        match self.core.indexer().stabilizer_class(*location)? {
            ObjectClass::Cube => {
                for (dx, dy, dz) in CUBE_EDGES {
                    op.site(Pauli::X, location.offset(dx, dy, dz))?;
                }
            },
            ObjectClass::Triangle => {
                let Coord { x, y, z, .. } = *location;
                let (sx, sy, sz) = location.axis
                    .and_then(|a| Self::triangle_octant(a, x, y, z))
                    .ok_or(Error::InvalidLocation {
                        location: *location, class: ObjectClass::Triangle })?;
                let vertex = Coord::new(x, y, z);
                op.site(Pauli::Z, vertex.offset(sx, 0, 0))?;
                op.site(Pauli::Z, vertex.offset(0, sy, 0))?;
                op.site(Pauli::Z, vertex.offset(0, 0, sz))?;
            },
            class => {
                return Err(Error::InvalidLocation { location: *location, class });
            },
        }
        Ok(op.finish())
    }

    /// Sheets of *X* normal to *x*, *y*, and *z*, in that order.
    fn build_logical_xs(&self) -> Result<BsfMatrix> {
        let Size { lx, ly, lz } = self.size();
        let (x2, y2, z2) = (2 * lx as i64, 2 * ly as i64, 2 * lz as i64);
        self.core.collect_ops(3, |i, op| {
            let sheet: Vec<Coord> = match i {
                0 => itertools::iproduct!(0..y2, 0..z2)
                    .filter(|(y, z)| (y + z) % 2 == 1)
                    .map(|(y, z)| Coord::new(0, y, z))
                    .collect(),
                1 => itertools::iproduct!(0..x2, 0..z2)
                    .filter(|(x, z)| (x + z) % 2 == 1)
                    .map(|(x, z)| Coord::new(x, 0, z))
                    .collect(),
                _ => itertools::iproduct!(0..x2, 0..y2)
                    .filter(|(x, y)| (x + y) % 2 == 1)
                    .map(|(x, y)| Coord::new(x, y, 0))
                    .collect(),
            };
            for c in sheet { op.site(Pauli::X, c)?; }
            Ok(())
        })
    }

    /// Lines of *Z* along *x*, *y*, and *z*, in that order.
    fn build_logical_zs(&self) -> Result<BsfMatrix> {
        let Size { lx, ly, lz } = self.size();
        let (x2, y2, z2) = (2 * lx as i64, 2 * ly as i64, 2 * lz as i64);
        self.core.collect_ops(3, |i, op| {
            match i {
                0 => for x in (0..x2).step_by(2) {
                    op.site(Pauli::Z, Coord::new(x, 1, 0))?;
                },
                1 => for y in (0..y2).step_by(2) {
                    op.site(Pauli::Z, Coord::new(1, y, 0))?;
                },
                _ => for z in (0..z2).step_by(2) {
                    op.site(Pauli::Z, Coord::new(0, 1, z))?;
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
        let code = RhombicCode::new(4, 4, 4).unwrap();
        assert_eq!(code.n_k_d(), (192, 3, 4));
        let coords = code.stabilizer_coords();
        let cubes = coords.iter().filter(|c| c.axis.is_none()).count();
        assert_eq!(cubes, 32);
        assert_eq!(coords.len() - cubes, 256);
    }

    #[test]
    fn odd_size_unimplemented() {
        assert!(matches!(RhombicCode::new(3, 4, 4), Err(Error::Unimplemented(_))));
    }

    #[test]
    fn stabilizer_shapes() {
        let code = RhombicCode::new(2, 2, 2).unwrap();
        for c in code.stabilizer_coords() {
            let s = code.stabilizer(&c).unwrap();
            match code.stabilizer_type(&c).unwrap() {
                StabilizerType::X => assert_eq!(s.weight(), 12),
                StabilizerType::Z => assert_eq!(s.weight(), 3),
            }
        }
    }

    #[test]
    fn triangles_avoid_cube_checks() {
        for (x, y, z) in [(0, 0, 0), (2, 0, 0), (2, 2, 2), (4, 2, 0)] {
            for a in 0..4 {
                let (sx, sy, sz) = RhombicCode::triangle_octant(a, x, y, z).unwrap();
                assert_ne!((x + sx + y + sy + z + sz).rem_euclid(4), 1);
            }
        }
        assert!(RhombicCode::triangle_octant(4, 0, 0, 0).is_none());
    }

    #[test]
    fn commutation() {
        for l in [2, 4] {
            check_commutation(&RhombicCode::new(l, l, l).unwrap()).unwrap();
        }
        check_commutation(&RhombicCode::new(2, 4, 6).unwrap()).unwrap();
    }
}
