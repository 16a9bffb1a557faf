//! Pauli operators in the binary symplectic form (BSF).
//!
//! An *n*-qubit Pauli operator (up to phase) is identified by two length-*n*
//! bit strings, one for its *X*-support and one for its *Z*-support. Writing
//! them end to end gives a vector of length 2*n* over GF(2): a 1 at position
//! *j* places an *X* on the *j*-th qubit, a 1 at position *n* + *j* places a
//! *Z*, and both together place a *Y*. Multiplication of Pauli operators is
//! then bitwise addition mod 2, and two operators commute exactly when their
//! symplectic product
//!
//! ```text
//! ⟨a, b⟩ = a_x · b_z + a_z · b_x  (mod 2)
//! ```
//!
//! vanishes. Stabilizer generators, logical operators, errors, and
//! corrections are all stored this way.
//!
//! Bits are packed into `u32`s;
//! a row of *n* bits takes `floor(n / 32) + 1` words.
//!
//! # Example
//! ```
//! use bn3d::bsf::{ Bsf, Pauli };
//!
//! let a = Bsf::from_paulis(&[Pauli::X, Pauli::X, Pauli::I]);
//! let b = Bsf::from_paulis(&[Pauli::Z, Pauli::I, Pauli::Z]);
//! assert!(!a.commutes_with(&b));
//! println!("{}", a.clone() + &b); // YXZ
//! ```

use std::{
    fmt,
    ops::{ Add, AddAssign },
};
use crate::error::{ Error, Result };

pub(crate) const PW: [u32; 32] = [ // PW[i] = 2^i
    1, 2, 4, 8, 16, 32, 64, 128, 256, 512, 1024, 2048, 4096, 8192, 16384, 32768,
    65536, 131072, 262144, 524288, 1048576, 2097152, 4194304, 8388608, 16777216,
    33554432, 67108864, 134217728, 268435456, 536870912, 1073741824, 2147483648
];

/// A single-qubit Pauli operator.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Pauli {
    /// Identity
    I,
    /// σ<sub>*x*</sub>
    X,
    /// σ<sub>*y*</sub>
    Y,
    /// σ<sub>*z*</sub>
    Z,
}

impl fmt::Display for Pauli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::I => write!(f, "{}", if f.alternate() { "." } else { "I" }),
            _ => write!(f, "{:?}", self),
        }
    }
}

impl Pauli {
    /// Build from *X*- and *Z*-support bits.
    pub fn from_xz(x: bool, z: bool) -> Self {
        match (x, z) {
            (false, false) => Self::I,
            (true, false) => Self::X,
            (true, true) => Self::Y,
            (false, true) => Self::Z,
        }
    }

    /// Return the *X*- and *Z*-support bits.
    pub fn xz(self) -> (bool, bool) {
        match self {
            Self::I => (false, false),
            Self::X => (true, false),
            Self::Y => (true, true),
            Self::Z => (false, true),
        }
    }

    /// Return `true` if `self` and `other` commute.
    pub fn commutes_with(self, other: Self) -> bool {
        match (self, other) {
            (_, Self::I) => true,
            (Self::I, _) => true,
            (a, b) if a == b => true,
            _ => false,
        }
    }
}

/// A fixed-length string of bits, packed into `u32`s.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BitVec {
    len: usize,
    bits: Vec<u32>, // size floor(len / 32) + 1
}

impl BitVec {
    /// Create a new all-zero string of `len` bits.
    pub fn zeros(len: usize) -> Self {
        Self { len, bits: vec![0; (len >> 5) + 1] }
    }

    /// Collect a string of bits.
    pub fn from_bools<I>(bools: I) -> Self
    where I: IntoIterator<Item = bool>
    {
        let mut bits: Vec<u32> = vec![0];
        let mut len: usize = 0;
        for b in bools {
            if len >> 5 == bits.len() { bits.push(0); }
            if b { bits[len >> 5] |= PW[len & 31]; }
            len += 1;
        }
        if len >> 5 == bits.len() { bits.push(0); }
        Self { len, bits }
    }

    /// Return the number of bits.
    pub fn len(&self) -> usize { self.len }

    /// Return `true` if `self` holds no bits at all.
    pub fn is_empty(&self) -> bool { self.len == 0 }

    /// Return the `k`-th bit; out-of-bounds bits read as `false`.
    pub fn get(&self, k: usize) -> bool {
        k < self.len && self.bits[k >> 5] & PW[k & 31] != 0
    }

    /// Set the `k`-th bit. Does nothing if `k` is out of bounds.
    pub fn set(&mut self, k: usize, b: bool) -> &mut Self {
        if k < self.len {
            if b {
                self.bits[k >> 5] |= PW[k & 31];
            } else {
                self.bits[k >> 5] &= !PW[k & 31];
            }
        }
        self
    }

    /// Flip the `k`-th bit. Does nothing if `k` is out of bounds.
    pub fn flip(&mut self, k: usize) -> &mut Self {
        if k < self.len { self.bits[k >> 5] ^= PW[k & 31]; }
        self
    }

    /// Return the number of set bits.
    pub fn weight(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Return `true` if no bit is set.
    pub fn is_zero(&self) -> bool { self.bits.iter().all(|w| *w == 0) }

    /// Iterate over all bits in order.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).map(move |k| self.bits[k >> 5] & PW[k & 31] != 0)
    }

    /// Iterate over the positions of set bits in increasing order.
    pub fn ones(&self) -> impl Iterator<Item = usize> + '_ {
        self.iter().enumerate().filter_map(|(k, b)| b.then_some(k))
    }

    /// Return the parity of the bitwise AND of `self` and `other`.
    pub fn dot(&self, other: &Self) -> bool {
        self.bits.iter().zip(other.bits.iter())
            .fold(0_u32, |acc, (a, b)| acc ^ (a & b).count_ones())
            & 1 == 1
    }

    /// XOR `other` into `self`.
    ///
    /// Both strings must have the same length.
    pub fn xor_assign(&mut self, other: &Self) {
        debug_assert_eq!(self.len, other.len);
        self.bits.iter_mut().zip(other.bits.iter())
            .for_each(|(a, b)| { *a ^= *b; });
    }

    /// Unpack into one `u8` (0 or 1) per bit.
    pub fn to_u8s(&self) -> Vec<u8> {
        self.iter().map(u8::from).collect()
    }

    fn concat(&self, other: &Self) -> Self {
        Self::from_bools(self.iter().chain(other.iter()))
    }
}

impl fmt::Display for BitVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.iter() {
            write!(f, "{}", if b { '1' } else { '0' })?;
        }
        Ok(())
    }
}

/// A binary matrix over GF(2), stored as a list of packed rows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitMatrix {
    cols: usize,
    rows: Vec<BitVec>,
}

impl BitMatrix {
    /// Create a new matrix with no rows.
    pub fn new(cols: usize) -> Self { Self { cols, rows: Vec::new() } }

    /// Append a row.
    pub fn push(&mut self, row: BitVec) -> Result<&mut Self> {
        if row.len() != self.cols {
            return Err(Error::LengthMismatch {
                expected: self.cols, found: row.len() });
        }
        self.rows.push(row);
        Ok(self)
    }

    /// Return the number of rows.
    pub fn num_rows(&self) -> usize { self.rows.len() }

    /// Return the number of columns.
    pub fn num_cols(&self) -> usize { self.cols }

    /// Return all rows.
    pub fn rows(&self) -> &[BitVec] { &self.rows }

    /// Return the `i`-th row, if it exists.
    pub fn row(&self, i: usize) -> Option<&BitVec> { self.rows.get(i) }

    // return the row index of the first non-zero entry in a column
    fn find_first_col(&self, col_idx: usize, skiprows: usize) -> Option<usize>
    {
        self.rows.iter().enumerate()
            .skip(skiprows)
            .find_map(|(i, row)| row.get(col_idx).then_some(i))
    }

    // XOR row `a` into row `b`
    fn row_xor(&mut self, a: usize, b: usize) {
        assert_ne!(a, b);
        if a < b {
            let (head, tail) = self.rows.split_at_mut(b);
            tail[0].xor_assign(&head[a]);
        } else {
            let (head, tail) = self.rows.split_at_mut(a);
            head[b].xor_assign(&tail[0]);
        }
    }

    /// Bring `self` to reduced row echelon form in place, returning its rank.
    pub fn rref(&mut self) -> usize {
        let n = self.cols;
        let m = self.rows.len();
        let mut col_min: usize = 0;
        let mut row_min: usize = 0;
        while col_min < n && row_min < m {
            if let Some(k) = self.find_first_col(col_min, row_min) {
                if k != row_min { self.rows.swap(k, row_min); }
                for i in 0..m {
                    if i == row_min { continue; }
                    if self.rows[i].get(col_min) { self.row_xor(row_min, i); }
                }
                row_min += 1;
            }
            col_min += 1;
        }
        row_min
    }

    /// Return the rank of `self` over GF(2).
    pub fn rank(&self) -> usize { self.clone().rref() }
}

/// An *n*-qubit Pauli operator (up to phase) in binary symplectic form.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Bsf {
    x: BitVec,
    z: BitVec,
}

impl Bsf {
    /// Create the *n*-qubit identity.
    pub fn identity(n: usize) -> Self {
        Self { x: BitVec::zeros(n), z: BitVec::zeros(n) }
    }

    /// Assemble from *X*- and *Z*-supports of equal length.
    pub fn from_parts(x: BitVec, z: BitVec) -> Result<Self> {
        if x.len() != z.len() {
            return Err(Error::LengthMismatch {
                expected: x.len(), found: z.len() });
        }
        Ok(Self { x, z })
    }

    /// Build from a list of single-qubit Paulis.
    pub fn from_paulis(paulis: &[Pauli]) -> Self {
        let x = BitVec::from_bools(paulis.iter().map(|p| p.xz().0));
        let z = BitVec::from_bools(paulis.iter().map(|p| p.xz().1));
        Self { x, z }
    }

    /// Return the number of qubits.
    pub fn num_qubits(&self) -> usize { self.x.len() }

    /// Return the *X*-support.
    pub fn x(&self) -> &BitVec { &self.x }

    /// Return the *Z*-support.
    pub fn z(&self) -> &BitVec { &self.z }

    /// Return the Pauli acting on the `k`-th qubit.
    pub fn pauli(&self, k: usize) -> Pauli {
        Pauli::from_xz(self.x.get(k), self.z.get(k))
    }

    /// Overwrite the Pauli on the `k`-th qubit.
    pub fn set_pauli(&mut self, k: usize, pauli: Pauli) -> &mut Self {
        let (x, z) = pauli.xz();
        self.x.set(k, x);
        self.z.set(k, z);
        self
    }

    /// Multiply the `k`-th qubit by `pauli`, ignoring phase.
    pub fn mul_pauli(&mut self, k: usize, pauli: Pauli) -> &mut Self {
        let (x, z) = pauli.xz();
        if x { self.x.flip(k); }
        if z { self.z.flip(k); }
        self
    }

    /// Return the number of qubits acted on non-trivially.
    pub fn weight(&self) -> usize {
        self.x.bits.iter().zip(self.z.bits.iter())
            .map(|(x, z)| (x | z).count_ones() as usize)
            .sum()
    }

    /// Return `true` if `self` is the identity.
    pub fn is_identity(&self) -> bool { self.x.is_zero() && self.z.is_zero() }

    /// Return the symplectic product of `self` and `other`: `true` if they
    /// anticommute.
    pub fn symplectic(&self, other: &Self) -> bool {
        self.x.dot(&other.z) ^ self.z.dot(&other.x)
    }

    /// Return `true` if `self` and `other` commute.
    pub fn commutes_with(&self, other: &Self) -> bool {
        !self.symplectic(other)
    }

    /// Flatten into a single length-2*n* bit string (*X* block first).
    pub fn to_bits(&self) -> BitVec { self.x.concat(&self.z) }
}

impl AddAssign<&Bsf> for Bsf {
    fn add_assign(&mut self, rhs: &Bsf) {
        self.x.xor_assign(&rhs.x);
        self.z.xor_assign(&rhs.z);
    }
}

impl Add<&Bsf> for Bsf {
    type Output = Bsf;

    fn add(mut self, rhs: &Bsf) -> Self::Output {
        self += rhs;
        self
    }
}

impl fmt::Display for Bsf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for k in 0..self.num_qubits() {
            fmt::Display::fmt(&self.pauli(k), f)?;
        }
        Ok(())
    }
}

/// A list of BSF rows acting on a common number of qubits.
///
/// Used for stabilizer generators and logical operators alike; row order is
/// the fixed generation order of whatever produced the matrix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BsfMatrix {
    n: usize,
    rows: Vec<Bsf>,
}

impl BsfMatrix {
    /// Create a new matrix with no rows on `n` qubits.
    pub fn new(n: usize) -> Self { Self { n, rows: Vec::new() } }

    /// Collect rows, all of which must act on `n` qubits.
    pub fn from_rows<I>(n: usize, rows: I) -> Result<Self>
    where I: IntoIterator<Item = Bsf>
    {
        let mut mat = Self::new(n);
        for row in rows { mat.push(row)?; }
        Ok(mat)
    }

    /// Append a row.
    pub fn push(&mut self, row: Bsf) -> Result<&mut Self> {
        if row.num_qubits() != self.n {
            return Err(Error::LengthMismatch {
                expected: self.n, found: row.num_qubits() });
        }
        self.rows.push(row);
        Ok(self)
    }

    /// Return the number of qubits.
    pub fn num_qubits(&self) -> usize { self.n }

    /// Return the number of rows.
    pub fn num_rows(&self) -> usize { self.rows.len() }

    /// Return `true` if there are no rows.
    pub fn is_empty(&self) -> bool { self.rows.is_empty() }

    /// Return all rows.
    pub fn rows(&self) -> &[Bsf] { &self.rows }

    /// Return the `i`-th row, if it exists.
    pub fn row(&self, i: usize) -> Option<&Bsf> { self.rows.get(i) }

    /// Iterate over rows.
    pub fn iter(&self) -> std::slice::Iter<'_, Bsf> { self.rows.iter() }

    /// Return the *X* block (rows × *n*).
    pub fn x_block(&self) -> BitMatrix {
        BitMatrix {
            cols: self.n,
            rows: self.rows.iter().map(|r| r.x.clone()).collect(),
        }
    }

    /// Return the *Z* block (rows × *n*).
    pub fn z_block(&self) -> BitMatrix {
        BitMatrix {
            cols: self.n,
            rows: self.rows.iter().map(|r| r.z.clone()).collect(),
        }
    }

    /// Flatten into a rows × 2*n* binary matrix.
    pub fn to_bit_matrix(&self) -> BitMatrix {
        BitMatrix {
            cols: 2 * self.n,
            rows: self.rows.iter().map(Bsf::to_bits).collect(),
        }
    }

    /// Return the number of independent rows.
    pub fn rank(&self) -> usize { self.to_bit_matrix().rref() }
}

impl<'a> IntoIterator for &'a BsfMatrix {
    type Item = &'a Bsf;
    type IntoIter = std::slice::Iter<'a, Bsf>;

    fn into_iter(self) -> Self::IntoIter { self.rows.iter() }
}

/// Compute the symplectic product of every row of `a` with `b`.
///
/// The `i`-th output bit is set if the `i`-th row of `a` anticommutes with
/// `b`; with `a` a stabilizer matrix and `b` an error, this is the syndrome.
pub fn bcommute(a: &BsfMatrix, b: &Bsf) -> Result<BitVec> {
    if b.num_qubits() != a.num_qubits() {
        return Err(Error::LengthMismatch {
            expected: a.num_qubits(), found: b.num_qubits() });
    }
    Ok(BitVec::from_bools(a.iter().map(|row| row.symplectic(b))))
}

/// Compute the full commutation matrix between the rows of `a` and `b`.
///
/// Entry (*i*, *j*) is set if the *i*-th row of `a` anticommutes with the
/// *j*-th row of `b`.
pub fn bcommute_matrix(a: &BsfMatrix, b: &BsfMatrix) -> Result<BitMatrix> {
    let mut out = BitMatrix::new(b.num_rows());
    for row in a.iter() {
        out.push(bcommute(b, row)?)?;
    }
    Ok(out)
}
