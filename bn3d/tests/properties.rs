//! Property-based tests for lattice indexing, the symplectic algebra, and
//! noise sampling.

use proptest::prelude::*;
use rand::{ rngs::StdRng, SeedableRng };
use bn3d::{
    bsf::{ bcommute, Bsf, Pauli },
    code::{ CodeFamily, StabilizerCode },
    lattice::{ Lattice, LatticeIndexer, Size },
    noise::{ DeformedErrorModel, ErrorModel, PauliErrorModel },
};

fn lattice() -> impl Strategy<Value = Lattice> {
    prop_oneof![
        Just(Lattice::Toric),
        Just(Lattice::Planar),
        Just(Lattice::RotatedPlanar),
        Just(Lattice::RotatedToric),
        Just(Lattice::Rhombic),
    ]
}

fn family() -> impl Strategy<Value = CodeFamily> {
    prop_oneof![
        Just(CodeFamily::Toric3D),
        Just(CodeFamily::Planar3D),
        Just(CodeFamily::RotatedPlanar3D),
        Just(CodeFamily::RotatedToric3D),
        Just(CodeFamily::Rhombic),
    ]
}

fn pauli() -> impl Strategy<Value = Pauli> {
    prop_oneof![Just(Pauli::I), Just(Pauli::X), Just(Pauli::Y), Just(Pauli::Z)]
}

// even sizes are valid for every lattice
fn size() -> impl Strategy<Value = Size> {
    (1usize..=3, 1usize..=3, 1usize..=3)
        .prop_map(|(a, b, c)| Size::new(2 * a, 2 * b, 2 * c))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Every object class maps onto [0, count) with no collisions or gaps.
    #[test]
    fn prop_index_bijective(lattice in lattice(), size in size()) {
        let idx = LatticeIndexer::new(lattice, size).unwrap();
        for class in idx.classes() {
            let ci = idx.index(class).unwrap();
            let mut seen = vec![false; ci.len()];
            for c in ci.coords() {
                let k = ci.get(c).unwrap();
                prop_assert!(k < ci.len());
                prop_assert!(!seen[k], "{} index {} repeated", class, k);
                seen[k] = true;
            }
            prop_assert!(seen.iter().all(|b| *b));
        }
    }

    /// Enumeration order is a pure function of lattice and size.
    #[test]
    fn prop_index_deterministic(lattice in lattice(), size in size()) {
        let a = LatticeIndexer::new(lattice, size).unwrap();
        let b = LatticeIndexer::new(lattice, size).unwrap();
        for class in a.classes() {
            prop_assert_eq!(a.coords(class).unwrap(), b.coords(class).unwrap());
        }
    }

    /// The syndrome of a product of errors is the sum of their syndromes.
    #[test]
    fn prop_syndrome_linear(
        family in family(),
        ops in prop::collection::vec((0usize..1000, pauli(), 0usize..1000, pauli()), 1..8),
    ) {
        let code = family.build(Size::cubic(2)).unwrap();
        let n = code.qubit_count();
        let mut a = Bsf::identity(n);
        let mut b = Bsf::identity(n);
        for (i, p, j, q) in ops {
            a.mul_pauli(i % n, p);
            b.mul_pauli(j % n, q);
        }
        let stabs = code.stabilizers().unwrap();
        let mut sum = bcommute(stabs, &a).unwrap();
        sum.xor_assign(&bcommute(stabs, &b).unwrap());
        let ab = a.clone() + &b;
        prop_assert_eq!(code.measure_syndrome(&ab).unwrap(), sum);
    }

    /// Every qubit's distribution sums to one.
    #[test]
    fn prop_probability_normalized(
        family in family(),
        p in 0.0f64..=1.0,
        (r_x, r_y) in (0.0f64..=1.0, 0.0f64..=1.0),
        deformed in any::<bool>(),
    ) {
        let code = family.build(Size::cubic(2)).unwrap();
        let (r_x, r_y) = (r_x / 2.0, r_y / 2.0);
        let r_z = 1.0 - r_x - r_y;
        let model: Box<dyn ErrorModel> = if deformed {
            Box::new(DeformedErrorModel::xzzx(r_x, r_y, r_z).unwrap())
        } else {
            Box::new(PauliErrorModel::new(r_x, r_y, r_z).unwrap())
        };
        let dist = model.probability_distribution(code.as_ref(), p).unwrap();
        for k in 0..dist.len() {
            let total: f64 = dist.get(k).unwrap().iter().sum();
            prop_assert!((total - 1.0).abs() < 1e-9);
        }
    }

    /// Identically seeded generators give identical errors.
    #[test]
    fn prop_generate_deterministic(family in family(), seed in any::<u64>(), p in 0.0f64..=1.0) {
        let code = family.build(Size::cubic(2)).unwrap();
        let model = DeformedErrorModel::xzzx(0.1, 0.2, 0.7).unwrap();
        let a = model.generate(code.as_ref(), p, &mut StdRng::seed_from_u64(seed)).unwrap();
        let b = model.generate(code.as_ref(), p, &mut StdRng::seed_from_u64(seed)).unwrap();
        prop_assert_eq!(a, b);
    }
}
