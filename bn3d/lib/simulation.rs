//! Monte Carlo estimation of logical failure rates.
//!
//! A trial samples an error, measures its syndrome, asks a decoder for a
//! correction, and checks whether the residual `error + correction` is a
//! stabilizer: it must have a trivial syndrome (return to the codespace) and
//! commute with every logical operator (no logical error).

use rand::{ rngs::StdRng, RngCore, SeedableRng };
use serde::Serialize;
use tracing::{ debug, warn };
use crate::{
    bsf::{ bcommute, BitVec, Bsf },
    code::{ ModelSpec, StabilizerCode },
    decoder::{ build_decoder, Decoder },
    error::{ Error, Result },
    noise::{ check_probability, ErrorModel },
};

/// What happened in a single trial.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrialOutcome {
    /// Number of qubits hit by the sampled error.
    pub error_weight: usize,
    /// Number of triggered stabilizers.
    pub syndrome_weight: usize,
    /// Commutation of the residual with the logical *Z*s, then the logical
    /// *X*s.
    pub effective_error: BitVec,
    /// Whether the residual has a trivial syndrome.
    pub codespace: bool,
    /// Whether the residual is a stabilizer.
    pub success: bool,
}

/// Classify the residual left by `correction` on `error`.
pub fn evaluate(code: &dyn StabilizerCode, error: &Bsf, correction: &Bsf)
    -> Result<(BitVec, bool)>
{
    let residual = error.clone() + correction;
    let codespace = code.measure_syndrome(&residual)?.is_zero();
    let effective_error = BitVec::from_bools(
        bcommute(code.logical_zs()?, &residual)?.iter()
            .chain(bcommute(code.logical_xs()?, &residual)?.iter())
    );
    Ok((effective_error, codespace))
}

/// Run a single trial.
pub fn run_trial(
    code: &dyn StabilizerCode,
    error_model: &dyn ErrorModel,
    decoder: &dyn Decoder,
    probability: f64,
    rng: &mut dyn RngCore,
) -> Result<TrialOutcome>
{
    let error = error_model.generate(code, probability, rng)?;
    let syndrome = code.measure_syndrome(&error)?;
    let correction = decoder.decode(code, &syndrome)?;
    let (effective_error, codespace) = evaluate(code, &error, &correction)?;
    let success = codespace && effective_error.is_zero();
    Ok(TrialOutcome {
        error_weight: error.weight(),
        syndrome_weight: syndrome.weight(),
        effective_error,
        codespace,
        success,
    })
}

/// Aggregate results of a batch of trials.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SimulationSummary {
    pub label: String,
    pub probability: f64,
    pub n_trials: usize,
    pub n_fail: usize,
    /// Logical failure rate.
    pub p_est: f64,
    /// Binomial standard error of `p_est`.
    pub p_se: f64,
    /// Mean number of triggered stabilizers per trial.
    pub mean_syndrome_weight: f64,
}

/// Compute a failure rate and its binomial standard error.
pub fn failure_rate(n_fail: usize, n_trials: usize) -> (f64, f64) {
    if n_trials == 0 { return (f64::NAN, f64::NAN); }
    let p = n_fail as f64 / n_trials as f64;
    (p, (p * (1.0 - p) / n_trials as f64).sqrt())
}

/// A fixed code, noise model, decoder, and physical error rate.
#[derive(Debug)]
pub struct Simulation {
    code: Box<dyn StabilizerCode>,
    error_model: Box<dyn ErrorModel>,
    decoder: Box<dyn Decoder>,
    probability: f64,
}

impl Simulation {
    pub fn new(
        code: Box<dyn StabilizerCode>,
        error_model: Box<dyn ErrorModel>,
        decoder: Box<dyn Decoder>,
        probability: f64,
    ) -> Result<Self>
    {
        check_probability(probability)?;
        Ok(Self { code, error_model, decoder, probability })
    }

    /// Build from `{"model": ..., "parameters": ...}` descriptions.
    pub fn from_specs(
        code: &ModelSpec,
        noise: &ModelSpec,
        decoder: &ModelSpec,
        probability: f64,
    ) -> Result<Self>
    {
        Self::new(
            code.build_code()?,
            noise.build_error_model()?,
            build_decoder(&decoder.model)?,
            probability,
        )
    }

    pub fn code(&self) -> &dyn StabilizerCode { self.code.as_ref() }

    pub fn error_model(&self) -> &dyn ErrorModel { self.error_model.as_ref() }

    pub fn label(&self) -> String {
        format!(
            "{} / {} / {} / p = {}",
            self.code.label(), self.error_model.label(), self.decoder.label(),
            self.probability,
        )
    }

    /// Run one trial with a generator seeded from `seed`.
    pub fn trial(&self, seed: u64) -> Result<TrialOutcome> {
        let mut rng = StdRng::seed_from_u64(seed);
        run_trial(
            self.code.as_ref(), self.error_model.as_ref(), self.decoder.as_ref(),
            self.probability, &mut rng,
        )
    }

    /// Run `n_trials` trials, the `i`-th seeded with `seed + i`.
    ///
    /// A decoder that fails to produce a correction counts as a logical
    /// failure; any other error aborts the run.
    pub fn run(&self, n_trials: usize, seed: u64) -> Result<SimulationSummary> {
        debug!("running {} trials of {}", n_trials, self.label());
        let mut n_fail: usize = 0;
        let mut syndrome_total: usize = 0;
        for i in 0..n_trials {
            match self.trial(seed.wrapping_add(i as u64)) {
                Ok(outcome) => {
                    if !outcome.success { n_fail += 1; }
                    syndrome_total += outcome.syndrome_weight;
                },
                Err(Error::Decoder(err)) => {
                    warn!("trial {} counted as failure: {}", i, err);
                    n_fail += 1;
                },
                Err(err) => { return Err(err); },
            }
        }
        let (p_est, p_se) = failure_rate(n_fail, n_trials);
        Ok(SimulationSummary {
            label: self.label(),
            probability: self.probability,
            n_trials,
            n_fail,
            p_est,
            p_se,
            mean_syndrome_weight: syndrome_total as f64 / n_trials as f64,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        bsf::Pauli,
        code::Toric3DCode,
        decoder::{ DecoderError, NullDecoder },
        noise::PauliErrorModel,
    };

    #[derive(Debug)]
    struct StuckDecoder;

    impl Decoder for StuckDecoder {
        fn label(&self) -> String { "stuck".into() }

        fn decode(&self, _code: &dyn StabilizerCode, _syndrome: &BitVec)
            -> std::result::Result<Bsf, DecoderError>
        {
            Err(DecoderError::NotConverged { iterations: 10 })
        }
    }

    fn toric_sim(decoder: Box<dyn Decoder>, p: f64) -> Simulation {
        Simulation::new(
            Box::new(Toric3DCode::new(3, 3, 3).unwrap()),
            Box::new(PauliErrorModel::new(0.2, 0.3, 0.5).unwrap()),
            decoder,
            p,
        ).unwrap()
    }

    #[test]
    fn noiseless_trials_succeed() {
        let sim = toric_sim(Box::new(NullDecoder), 0.0);
        let summary = sim.run(10, 0).unwrap();
        assert_eq!(summary.n_fail, 0);
        assert_eq!(summary.p_est, 0.0);
        assert_eq!(summary.mean_syndrome_weight, 0.0);
    }

    #[test]
    fn logical_residual_is_failure() {
        let code = Toric3DCode::new(3, 3, 3).unwrap();
        let logical = code.logical_xs().unwrap().row(1).unwrap().clone();
        let identity = Bsf::identity(code.qubit_count());
        let (effective, codespace) = evaluate(&code, &logical, &identity).unwrap();
        assert!(codespace);
        assert_eq!(effective.to_u8s(), vec![0, 1, 0, 0, 0, 0]);
    }

    #[test]
    fn stabilizer_residual_is_success() {
        let code = Toric3DCode::new(3, 3, 3).unwrap();
        let stab = code.stabilizers().unwrap().row(40).unwrap().clone();
        let (effective, codespace) = evaluate(&code, &stab, &stab).unwrap();
        assert!(codespace && effective.is_zero());
        let identity = Bsf::identity(code.qubit_count());
        let (effective, codespace) = evaluate(&code, &stab, &identity).unwrap();
        assert!(codespace && effective.is_zero());
    }

    #[test]
    fn single_flip_leaves_codespace() {
        let code = Toric3DCode::new(3, 3, 3).unwrap();
        let mut error = Bsf::identity(code.qubit_count());
        error.set_pauli(5, Pauli::Y);
        let (_, codespace)
            = evaluate(&code, &error, &Bsf::identity(code.qubit_count())).unwrap();
        assert!(!codespace);
    }

    #[test]
    fn seeded_runs_repeat() {
        let sim = toric_sim(Box::new(NullDecoder), 0.05);
        let a = sim.run(20, 1234).unwrap();
        let b = sim.run(20, 1234).unwrap();
        assert_eq!(a, b);
        assert_eq!(sim.trial(7).unwrap(), sim.trial(7).unwrap());
    }

    #[test]
    fn decoder_failure_counts() {
        let sim = toric_sim(Box::new(StuckDecoder), 0.1);
        let summary = sim.run(4, 0).unwrap();
        assert_eq!(summary.n_fail, 4);
        assert_eq!(summary.p_est, 1.0);
        assert_eq!(summary.p_se, 0.0);
    }

    #[test]
    fn binomial_error() {
        let (p, se) = failure_rate(25, 100);
        assert_eq!(p, 0.25);
        approx::assert_relative_eq!(se, (0.25 * 0.75 / 100.0_f64).sqrt());
        assert!(failure_rate(0, 0).0.is_nan());
    }
}
