//! Mean fraction of triggered stabilizers under Z-biased noise, swept over
//! code family, lattice size, and physical error rate. Also records the
//! logical failure rate with no correction applied as a baseline.

use std::path::PathBuf;
use bn3d::{
    bsf::Pauli,
    code::{ CodeFamily, StabilizerCode },
    decoder::NullDecoder,
    lattice::Size,
    noise::{ direction_from_bias_ratio, BiasRatio, DeformedErrorModel, ErrorModel },
    simulation::run_trial,
};
use itertools::iproduct;
use lib::{ init_logging, mkdir, trial_rng, write_json, BoxResult };
use ndarray as nd;
use rayon::iter::{ IntoParallelIterator, ParallelIterator };
use tracing::info;

const SEED: u64 = 10546;

// (mean syndrome density, failure rate without correction)
fn eval_point(
    code: &dyn StabilizerCode,
    model: &dyn ErrorModel,
    p: f64,
    trials: usize,
) -> bn3d::Result<(f64, f64)>
{
    let n_stab = code.stabilizers()?.num_rows() as f64;
    let outcomes: Vec<(f64, bool)>
        = (0..trials).into_par_iter()
        .map(|t| {
            let mut rng = trial_rng(SEED, t);
            let outcome = run_trial(code, model, &NullDecoder, p, &mut rng)?;
            Ok((outcome.syndrome_weight as f64 / n_stab, outcome.success))
        })
        .collect::<bn3d::Result<Vec<(f64, bool)>>>()?;
    let density = outcomes.iter().map(|(d, _)| d).sum::<f64>() / trials as f64;
    let fail = outcomes.iter().filter(|(_, s)| !s).count() as f64 / trials as f64;
    Ok((density, fail))
}

fn main() -> BoxResult<()> {
    const TRIALS: usize = 500;
    init_logging();

    let outdir = PathBuf::from("output");
    mkdir(&outdir)?;

    let p_err: nd::Array1<f64> = nd::Array1::linspace(0.0, 0.3, 16);
    let sizes: Vec<usize> = vec![2, 4, 6];
    let families = CodeFamily::ALL;
    let direction = direction_from_bias_ratio(Pauli::Z, BiasRatio::Finite(10.0))?;
    let model = DeformedErrorModel::xzzx(direction.r_x, direction.r_y, direction.r_z)?;

    let mut density: nd::Array3<f64>
        = nd::Array3::zeros((families.len(), sizes.len(), p_err.len()));
    let mut failure: nd::Array3<f64> = density.clone();
    for ((i, family), (j, l)) in iproduct!(
        families.iter().enumerate(),
        sizes.iter().enumerate()
    ) {
        let code = family.build(Size::cubic(*l))?;
        info!("{} with {}", code.label(), model.label());
        for (k, p) in p_err.iter().enumerate() {
            let (d, f) = eval_point(code.as_ref(), &model, *p, TRIALS)?;
            density[[i, j, k]] = d;
            failure[[i, j, k]] = f;
        }
    }

    let to_nested = |arr: &nd::Array3<f64>| -> Vec<Vec<Vec<f64>>> {
        arr.outer_iter()
            .map(|plane| plane.outer_iter().map(|row| row.to_vec()).collect())
            .collect()
    };
    let output = serde_json::json!({
        "families": families.iter().map(|f| f.name()).collect::<Vec<_>>(),
        "sizes": sizes,
        "p_err": p_err.to_vec(),
        "noise": model.label(),
        "trials": TRIALS,
        "syndrome_density": to_nested(&density),
        "failure_rate": to_nested(&failure),
    });
    write_json(outdir.join("syndrome_density.json"), &output)?;
    Ok(())
}
