//! Coordinate enumeration for 3D lattices.
//!
//! All lattices live in a doubled coordinate system: a site with all-even
//! coordinates is a vertex, a site odd along exactly one axis is an edge, two
//! odd axes make a face, and three a cube. Objects of different classes can
//! share a geometric point (the four triangles at each vertex of the rhombic
//! lattice), so a [`Coord`] optionally carries an extra `axis` label to tell
//! them apart.
//!
//! A [`LatticeIndexer`] enumerates every object class of a given lattice once,
//! by nested range iteration over the scaled coordinates, and keeps the
//! resulting coordinate → index bijections for its lifetime. Enumeration order
//! is fixed, so indices are reproducible across runs.

use std::fmt;
use itertools::iproduct;
use rustc_hash::FxHashMap as HashMap;
use serde::{ Deserialize, Serialize };
use crate::error::{ Error, Result };

/// A lattice site in doubled coordinates, optionally with a sublattice label.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    pub axis: Option<u8>,
    pub x: i64,
    pub y: i64,
    pub z: i64,
}

impl Coord {
    /// Create a new unlabeled coordinate.
    pub const fn new(x: i64, y: i64, z: i64) -> Self {
        Self { axis: None, x, y, z }
    }

    /// Create a new coordinate with a sublattice label.
    pub const fn with_axis(axis: u8, x: i64, y: i64, z: i64) -> Self {
        Self { axis: Some(axis), x, y, z }
    }

    /// Shift by `(dx, dy, dz)`, keeping the label.
    pub fn offset(self, dx: i64, dy: i64, dz: i64) -> Self {
        Self { x: self.x + dx, y: self.y + dy, z: self.z + dz, ..self }
    }

    /// Return the parity of each component as `(x odd, y odd, z odd)`.
    pub fn parity(&self) -> (bool, bool, bool) {
        (self.x.rem_euclid(2) == 1, self.y.rem_euclid(2) == 1,
            self.z.rem_euclid(2) == 1)
    }
}

impl From<(i64, i64, i64)> for Coord {
    fn from(xyz: (i64, i64, i64)) -> Self { Self::new(xyz.0, xyz.1, xyz.2) }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.axis {
            Some(a) => write!(f, "({}; {}, {}, {})", a, self.x, self.y, self.z),
            None => write!(f, "({}, {}, {})", self.x, self.y, self.z),
        }
    }
}

/// Linear dimensions of a lattice, in unit cells.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub lx: usize,
    pub ly: usize,
    pub lz: usize,
}

impl Size {
    pub const fn new(lx: usize, ly: usize, lz: usize) -> Self {
        Self { lx, ly, lz }
    }

    /// Create a cubic `L × L × L` size.
    pub const fn cubic(l: usize) -> Self { Self::new(l, l, l) }

    /// Return the number of unit cells.
    pub fn volume(&self) -> usize { self.lx * self.ly * self.lz }

    /// Return the smallest dimension.
    pub fn min(&self) -> usize { self.lx.min(self.ly).min(self.lz) }

    // doubled extents
    fn doubled(&self) -> (i64, i64, i64) {
        (2 * self.lx as i64, 2 * self.ly as i64, 2 * self.lz as i64)
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.lx, self.ly, self.lz)
    }
}

/// The kind of object a coordinate refers to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ObjectClass {
    Qubit,
    Vertex,
    Face,
    Cube,
    Triangle,
    /// Any of the stabilizer classes; only used when reporting failed lookups.
    Stabilizer,
}

impl fmt::Display for ObjectClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Qubit => write!(f, "qubit"),
            Self::Vertex => write!(f, "vertex"),
            Self::Face => write!(f, "face"),
            Self::Cube => write!(f, "cube"),
            Self::Triangle => write!(f, "triangle"),
            Self::Stabilizer => write!(f, "stabilizer"),
        }
    }
}

/// The supported lattice geometries.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Lattice {
    /// Cubic lattice with periodic boundaries in all directions.
    Toric,
    /// Cubic lattice with open boundaries.
    Planar,
    /// Rotated square layers stacked along *z*, open boundaries.
    RotatedPlanar,
    /// Rotated square layers stacked along *z*, periodic in every direction.
    RotatedToric,
    /// Cubic lattice with periodic boundaries, checks on alternating cubes
    /// and on cube corners.
    Rhombic,
}

impl Lattice {
    /// Return `true` if coordinates wrap around.
    pub fn is_periodic(&self) -> bool {
        matches!(self, Self::Toric | Self::RotatedToric | Self::Rhombic)
    }

    /// Return the stabilizer classes, in generation order.
    pub fn stabilizer_classes(&self) -> &'static [ObjectClass] {
        match self {
            Self::Toric | Self::Planar | Self::RotatedPlanar | Self::RotatedToric
                => &[ObjectClass::Vertex, ObjectClass::Face],
            Self::Rhombic => &[ObjectClass::Cube, ObjectClass::Triangle],
        }
    }
}

impl fmt::Display for Lattice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Toric => write!(f, "toric"),
            Self::Planar => write!(f, "planar"),
            Self::RotatedPlanar => write!(f, "rotated planar"),
            Self::RotatedToric => write!(f, "rotated toric"),
            Self::Rhombic => write!(f, "rhombic"),
        }
    }
}

/// A bijection between the coordinates of one object class and `[0, len)`.
#[derive(Clone, Debug)]
pub struct CoordIndex {
    class: ObjectClass,
    coords: Vec<Coord>,
    index: HashMap<Coord, usize>,
}

impl CoordIndex {
    fn from_coords(class: ObjectClass, coords: Vec<Coord>) -> Self {
        let index: HashMap<Coord, usize>
            = coords.iter().enumerate().map(|(k, c)| (*c, k)).collect();
        debug_assert_eq!(index.len(), coords.len());
        Self { class, coords, index }
    }

    /// Return the object class.
    pub fn class(&self) -> ObjectClass { self.class }

    /// Return the number of objects.
    pub fn len(&self) -> usize { self.coords.len() }

    /// Return `true` if there are no objects.
    pub fn is_empty(&self) -> bool { self.coords.is_empty() }

    /// Return `true` if `coord` names an object of this class.
    pub fn contains(&self, coord: &Coord) -> bool {
        self.index.contains_key(coord)
    }

    /// Look up the index of `coord`.
    pub fn get(&self, coord: &Coord) -> Result<usize> {
        self.index.get(coord).copied()
            .ok_or(Error::InvalidLocation { location: *coord, class: self.class })
    }

    /// Look up the coordinate at index `k`.
    pub fn coord(&self, k: usize) -> Option<&Coord> { self.coords.get(k) }

    /// Return all coordinates in index order.
    pub fn coords(&self) -> &[Coord] { &self.coords }
}

fn evens(lo: i64, hi: i64) -> impl Iterator<Item = i64> + Clone {
    (lo..=hi).filter(|k| k.rem_euclid(2) == 0)
}

fn odds(lo: i64, hi: i64) -> impl Iterator<Item = i64> + Clone {
    (lo..=hi).filter(|k| k.rem_euclid(2) == 1)
}

fn collect3<I>(iter: I) -> Vec<Coord>
where I: Iterator<Item = (i64, i64, i64)>
{
    iter.map(Coord::from).collect()
}

/// Enumerates and indexes every object class of a lattice.
#[derive(Clone, Debug)]
pub struct LatticeIndexer {
    lattice: Lattice,
    size: Size,
    qubits: CoordIndex,
    stabilizers: Vec<CoordIndex>,
}

impl LatticeIndexer {
    /// Enumerate all objects of `lattice` at `size`.
    ///
    /// Every dimension must be at least 2. The rhombic lattice additionally
    /// requires even dimensions, since its cube checks alternate, and the
    /// rotated toric lattice requires even `Lx` and `Ly` so that its
    /// checkerboard closes around the torus.
    pub fn new(lattice: Lattice, size: Size) -> Result<Self> {
        if size.min() < 2 {
            return Err(Error::InvalidSize {
                size, reason: "every dimension must be at least 2" });
        }
        let odd = match lattice {
            Lattice::Rhombic
                => [size.lx, size.ly, size.lz].iter().any(|l| l % 2 == 1),
            Lattice::RotatedToric => size.lx % 2 == 1 || size.ly % 2 == 1,
            _ => false,
        };
        if odd {
            return Err(Error::Unimplemented(
                format!("{} lattice of odd size {}", lattice, size)));
        }
        let qubits = CoordIndex::from_coords(
            ObjectClass::Qubit, Self::qubit_coords(lattice, size));
        let stabilizers: Vec<CoordIndex>
            = lattice.stabilizer_classes().iter()
            .map(|class| {
                CoordIndex::from_coords(
                    *class, Self::stabilizer_coords(lattice, size, *class))
            })
            .collect();
        Ok(Self { lattice, size, qubits, stabilizers })
    }

    fn qubit_coords(lattice: Lattice, size: Size) -> Vec<Coord> {
        let (x2, y2, z2) = size.doubled();
        match lattice {
            Lattice::Toric | Lattice::Rhombic => {
                let mut coords
                    = collect3(iproduct!(odds(1, x2), evens(0, y2 - 1), evens(0, z2 - 1)));
                coords.extend(
                    iproduct!(evens(0, x2 - 1), odds(1, y2), evens(0, z2 - 1))
                    .map(Coord::from));
                coords.extend(
                    iproduct!(evens(0, x2 - 1), evens(0, y2 - 1), odds(1, z2))
                    .map(Coord::from));
                coords
            },
            Lattice::Planar => {
                let mut coords
                    = collect3(iproduct!(odds(1, x2 - 1), evens(0, y2 - 2), evens(0, z2 - 2)));
                coords.extend(
                    iproduct!(evens(2, x2 - 2), odds(1, y2 - 3), evens(0, z2 - 2))
                    .map(Coord::from));
                coords.extend(
                    iproduct!(evens(2, x2 - 2), evens(0, y2 - 2), odds(1, z2 - 3))
                    .map(Coord::from));
                coords
            },
            Lattice::RotatedPlanar => {
                let mut coords
                    = collect3(iproduct!(odds(1, x2 - 1), odds(1, y2 - 1), evens(0, z2 - 2)));
                coords.extend(
                    iproduct!(evens(2, x2 - 2), evens(0, y2), odds(1, z2 - 3))
                    .filter(|(x, y, _)| (x + y) % 4 == 0)
                    .map(Coord::from));
                coords
            },
            Lattice::RotatedToric => {
                let mut coords
                    = collect3(iproduct!(odds(1, x2), odds(1, y2), evens(0, z2 - 1)));
                coords.extend(
                    iproduct!(evens(0, x2 - 1), evens(0, y2 - 1), odds(1, z2))
                    .filter(|(x, y, _)| (x + y) % 4 == 0)
                    .map(Coord::from));
                coords
            },
        }
    }

    fn stabilizer_coords(lattice: Lattice, size: Size, class: ObjectClass)
        -> Vec<Coord>
    {
        let (x2, y2, z2) = size.doubled();
        match (lattice, class) {
            (Lattice::Toric, ObjectClass::Vertex) => {
                collect3(iproduct!(evens(0, x2 - 1), evens(0, y2 - 1), evens(0, z2 - 1)))
            },
            (Lattice::Toric, ObjectClass::Face) => {
                // xy, then yz, then xz
                let mut coords
                    = collect3(iproduct!(odds(1, x2), odds(1, y2), evens(0, z2 - 1)));
                coords.extend(
                    iproduct!(evens(0, x2 - 1), odds(1, y2), odds(1, z2))
                    .map(Coord::from));
                coords.extend(
                    iproduct!(odds(1, x2), evens(0, y2 - 1), odds(1, z2))
                    .map(Coord::from));
                coords
            },
            (Lattice::Planar, ObjectClass::Vertex) => {
                collect3(iproduct!(evens(2, x2 - 2), evens(0, y2 - 2), evens(0, z2 - 2)))
            },
            (Lattice::Planar, ObjectClass::Face) => {
                let mut coords
                    = collect3(iproduct!(odds(1, x2 - 1), odds(1, y2 - 3), evens(0, z2 - 2)));
                coords.extend(
                    iproduct!(evens(2, x2 - 2), odds(1, y2 - 3), odds(1, z2 - 3))
                    .map(Coord::from));
                coords.extend(
                    iproduct!(odds(1, x2 - 1), evens(0, y2 - 2), odds(1, z2 - 3))
                    .map(Coord::from));
                coords
            },
            (Lattice::RotatedPlanar, ObjectClass::Vertex) => {
                iproduct!(evens(2, x2 - 2), evens(0, y2), evens(0, z2 - 2))
                    .filter(|(x, y, _)| (x + y) % 4 == 0)
                    .map(Coord::from)
                    .collect()
            },
            (Lattice::RotatedPlanar, ObjectClass::Face) => {
                // horizontal, then vertical
                let mut coords: Vec<Coord>
                    = iproduct!(evens(0, x2), evens(2, y2 - 2), evens(0, z2 - 2))
                    .filter(|(x, y, _)| (x + y) % 4 == 2)
                    .map(Coord::from)
                    .collect();
                coords.extend(
                    iproduct!(odds(1, x2 - 1), odds(1, y2 - 1), odds(1, z2 - 3))
                    .map(Coord::from));
                coords
            },
            (Lattice::RotatedToric, ObjectClass::Vertex) => {
                iproduct!(evens(0, x2 - 1), evens(0, y2 - 1), evens(0, z2 - 1))
                    .filter(|(x, y, _)| (x + y) % 4 == 0)
                    .map(Coord::from)
                    .collect()
            },
            (Lattice::RotatedToric, ObjectClass::Face) => {
                let mut coords: Vec<Coord>
                    = iproduct!(evens(0, x2 - 1), evens(0, y2 - 1), evens(0, z2 - 1))
                    .filter(|(x, y, _)| (x + y) % 4 == 2)
                    .map(Coord::from)
                    .collect();
                coords.extend(
                    iproduct!(odds(1, x2), odds(1, y2), odds(1, z2))
                    .map(Coord::from));
                coords
            },
            (Lattice::Rhombic, ObjectClass::Cube) => {
                iproduct!(odds(1, x2), odds(1, y2), odds(1, z2))
                    .filter(|(x, y, z)| (x + y + z) % 4 == 1)
                    .map(Coord::from)
                    .collect()
            },
            (Lattice::Rhombic, ObjectClass::Triangle) => {
                iproduct!(evens(0, x2 - 1), evens(0, y2 - 1), evens(0, z2 - 1), 0..4_u8)
                    .map(|(x, y, z, a)| Coord::with_axis(a, x, y, z))
                    .collect()
            },
            _ => Vec::new(),
        }
    }

    /// Return the lattice geometry.
    pub fn lattice(&self) -> Lattice { self.lattice }

    /// Return the lattice size.
    pub fn size(&self) -> Size { self.size }

    /// Return the qubit index.
    pub fn qubits(&self) -> &CoordIndex { &self.qubits }

    /// Return all stabilizer indices in generation order.
    pub fn stabilizers(&self) -> &[CoordIndex] { &self.stabilizers }

    /// Return every object class present, qubits first.
    pub fn classes(&self) -> Vec<ObjectClass> {
        std::iter::once(ObjectClass::Qubit)
            .chain(self.stabilizers.iter().map(CoordIndex::class))
            .collect()
    }

    /// Return the index for one object class.
    pub fn index(&self, class: ObjectClass) -> Result<&CoordIndex> {
        if class == ObjectClass::Qubit { return Ok(&self.qubits); }
        self.stabilizers.iter()
            .find(|idx| idx.class() == class)
            .ok_or_else(|| {
                Error::Unimplemented(
                    format!("{} objects on a {} lattice", class, self.lattice))
            })
    }

    /// Return all coordinates of one object class in index order.
    pub fn coords(&self, class: ObjectClass) -> Result<&[Coord]> {
        self.index(class).map(CoordIndex::coords)
    }

    /// Reduce a coordinate into the fundamental domain if the lattice is
    /// periodic; otherwise return it unchanged.
    pub fn wrap(&self, coord: Coord) -> Coord {
        if !self.lattice.is_periodic() { return coord; }
        let (x2, y2, z2) = self.size.doubled();
        Coord {
            x: coord.x.rem_euclid(x2),
            y: coord.y.rem_euclid(y2),
            z: coord.z.rem_euclid(z2),
            ..coord
        }
    }

    /// Look up the index of a qubit, wrapping periodic coordinates.
    pub fn qubit_index(&self, coord: Coord) -> Result<usize> {
        self.qubits.get(&self.wrap(coord))
    }

    /// Find the stabilizer class of a coordinate, wrapping periodic
    /// coordinates.
    pub fn stabilizer_class(&self, coord: Coord) -> Result<ObjectClass> {
        let wrapped = self.wrap(coord);
        self.stabilizers.iter()
            .find(|idx| idx.contains(&wrapped))
            .map(CoordIndex::class)
            .ok_or(Error::InvalidLocation {
                location: coord, class: ObjectClass::Stabilizer })
    }

    /// Return the number of qubits.
    pub fn num_qubits(&self) -> usize { self.qubits.len() }

    /// Return the total number of stabilizer generators.
    pub fn num_stabilizers(&self) -> usize {
        self.stabilizers.iter().map(CoordIndex::len).sum()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rustc_hash::FxHashSet as HashSet;

    const ALL: [Lattice; 5] = [
        Lattice::Toric,
        Lattice::Planar,
        Lattice::RotatedPlanar,
        Lattice::RotatedToric,
        Lattice::Rhombic,
    ];

    #[test]
    fn toric_counts() {
        let idx = LatticeIndexer::new(Lattice::Toric, Size::new(2, 3, 4)).unwrap();
        assert_eq!(idx.num_qubits(), 3 * 24);
        assert_eq!(idx.index(ObjectClass::Vertex).unwrap().len(), 24);
        assert_eq!(idx.index(ObjectClass::Face).unwrap().len(), 3 * 24);
        assert_eq!(idx.qubits().coord(0), Some(&Coord::new(1, 0, 0)));
    }

    #[test]
    fn planar_counts() {
        let size = Size::new(3, 2, 4);
        let idx = LatticeIndexer::new(Lattice::Planar, size).unwrap();
        let (lx, ly, lz) = (3, 2, 4);
        assert_eq!(
            idx.num_qubits(),
            lx * ly * lz + (lx - 1) * (ly - 1) * lz + (lx - 1) * ly * (lz - 1),
        );
        assert_eq!(idx.index(ObjectClass::Vertex).unwrap().len(), (lx - 1) * ly * lz);
    }

    #[test]
    fn rhombic_counts() {
        let idx = LatticeIndexer::new(Lattice::Rhombic, Size::cubic(4)).unwrap();
        assert_eq!(idx.num_qubits(), 3 * 64);
        assert_eq!(idx.index(ObjectClass::Cube).unwrap().len(), 32);
        assert_eq!(idx.index(ObjectClass::Triangle).unwrap().len(), 4 * 64);
        assert!(idx.index(ObjectClass::Vertex).is_err());
    }

    #[test]
    fn rhombic_odd_size_unimplemented() {
        let res = LatticeIndexer::new(Lattice::Rhombic, Size::cubic(3));
        assert!(matches!(res, Err(Error::Unimplemented(_))));
    }

    #[test]
    fn rotated_toric_counts() {
        let idx = LatticeIndexer::new(Lattice::RotatedToric, Size::new(4, 2, 3)).unwrap();
        let (lx, ly, lz) = (4, 2, 3);
        assert_eq!(idx.num_qubits(), lx * ly * lz + lx * ly * lz / 2);
        assert_eq!(idx.index(ObjectClass::Vertex).unwrap().len(), lx * ly * lz / 2);
        assert_eq!(
            idx.index(ObjectClass::Face).unwrap().len(),
            lx * ly * lz / 2 + lx * ly * lz,
        );
        // wraps in the plane and along the stacking direction
        assert_eq!(idx.qubit_index(Coord::new(-1, -1, 0)).unwrap(),
            idx.qubit_index(Coord::new(7, 3, 0)).unwrap());
        assert_eq!(idx.qubit_index(Coord::new(0, 0, -1)).unwrap(),
            idx.qubit_index(Coord::new(0, 0, 5)).unwrap());
    }

    #[test]
    fn rotated_toric_odd_size_unimplemented() {
        let res = LatticeIndexer::new(Lattice::RotatedToric, Size::new(3, 2, 2));
        assert!(matches!(res, Err(Error::Unimplemented(_))));
        assert!(LatticeIndexer::new(Lattice::RotatedToric, Size::new(2, 2, 3)).is_ok());
    }

    #[test]
    fn size_too_small() {
        let res = LatticeIndexer::new(Lattice::Toric, Size::new(1, 2, 2));
        assert!(matches!(res, Err(Error::InvalidSize { .. })));
    }

    #[test]
    fn classes_disjoint() {
        for lattice in ALL {
            let idx = LatticeIndexer::new(lattice, Size::cubic(2)).unwrap();
            let mut seen: HashSet<Coord> = HashSet::default();
            for class in idx.classes() {
                for c in idx.coords(class).unwrap() {
                    assert!(seen.insert(*c), "{} repeated on {}", c, lattice);
                }
            }
        }
    }

    #[test]
    fn index_bijective() {
        for (lattice, l) in iproduct!(ALL, [2, 4]) {
            let idx = LatticeIndexer::new(lattice, Size::cubic(l)).unwrap();
            for class in idx.classes() {
                let ci = idx.index(class).unwrap();
                for (k, c) in ci.coords().iter().enumerate() {
                    assert_eq!(ci.get(c).unwrap(), k);
                }
            }
        }
    }

    #[test]
    fn invalid_location() {
        let idx = LatticeIndexer::new(Lattice::Toric, Size::cubic(2)).unwrap();
        let res = idx.qubit_index(Coord::new(1, 1, 0));
        assert!(matches!(
            res, Err(Error::InvalidLocation { class: ObjectClass::Qubit, .. })));
        assert_eq!(idx.qubit_index(Coord::new(-1, 4, 0)).unwrap(),
            idx.qubit_index(Coord::new(3, 0, 0)).unwrap());
    }

    #[test]
    fn rotated_no_wrap() {
        let idx = LatticeIndexer::new(Lattice::RotatedPlanar, Size::cubic(2)).unwrap();
        assert!(idx.qubit_index(Coord::new(-1, 1, 0)).is_err());
        assert!(idx.qubit_index(Coord::new(1, 1, 0)).is_ok());
        assert!(idx.qubit_index(Coord::new(2, 2, 1)).is_ok());
    }
}
