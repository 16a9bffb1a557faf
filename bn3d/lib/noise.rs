//! Biased Pauli noise.
//!
//! An error model assigns each qubit of a code a distribution over
//! {*I*, *X*, *Y*, *Z*} for a given physical error rate, then samples one
//! Pauli per qubit independently. The plain [`PauliErrorModel`] uses the same
//! rates everywhere, `p_u = r_u * p`; a [`DeformedErrorModel`] exchanges two
//! of those rates on every qubit lying along the code's deformed axis.
//!
//! Distributions are cached per error model, keyed by code family, lattice
//! size and probability. Entries are never evicted; a run touches only a
//! handful of keys.

use std::{
    fmt,
    str::FromStr,
    sync::{ Arc, Mutex },
};
use rand::{ rngs::StdRng, Rng, RngCore, SeedableRng };
use rustc_hash::FxHashMap as HashMap;
use serde::{ Deserialize, Serialize };
use tracing::trace;
use crate::{
    bsf::{ Bsf, Pauli },
    code::{ ModelSpec, StabilizerCode },
    error::{ Error, ModelKind, Result },
    lattice::Size,
};

/// Tolerance on the sum of a noise direction.
pub const DIRECTION_TOL: f64 = 1e-9;

/// Per-qubit probabilities of each single-qubit Pauli.
#[derive(Clone, Debug, PartialEq)]
pub struct ProbabilityDistribution {
    pub p_i: Vec<f64>,
    pub p_x: Vec<f64>,
    pub p_y: Vec<f64>,
    pub p_z: Vec<f64>,
}

impl ProbabilityDistribution {
    /// Create a distribution with the same rates on all `n` qubits.
    pub fn uniform(n: usize, probs: [f64; 4]) -> Self {
        Self {
            p_i: vec![probs[0]; n],
            p_x: vec![probs[1]; n],
            p_y: vec![probs[2]; n],
            p_z: vec![probs[3]; n],
        }
    }

    /// Return the number of qubits.
    pub fn len(&self) -> usize { self.p_i.len() }

    /// Return `true` if there are no qubits.
    pub fn is_empty(&self) -> bool { self.p_i.is_empty() }

    /// Return the `[p_I, p_X, p_Y, p_Z]` of the `k`-th qubit.
    pub fn get(&self, k: usize) -> Option<[f64; 4]> {
        Some([
            *self.p_i.get(k)?, *self.p_x.get(k)?,
            *self.p_y.get(k)?, *self.p_z.get(k)?,
        ])
    }

    fn set(&mut self, k: usize, probs: [f64; 4]) {
        self.p_i[k] = probs[0];
        self.p_x[k] = probs[1];
        self.p_y[k] = probs[2];
        self.p_z[k] = probs[3];
    }

    /// Draw a Pauli for the `k`-th qubit.
    ///
    /// The unit interval is split in *I*, *X*, *Y*, *Z* order. If rounding
    /// leaves the draw past the last boundary, the last Pauli with positive
    /// weight is returned.
    pub fn sample<R>(&self, k: usize, rng: &mut R) -> Pauli
    where R: Rng + ?Sized
    {
        const PAULIS: [Pauli; 4] = [Pauli::I, Pauli::X, Pauli::Y, Pauli::Z];
        let Some(probs) = self.get(k) else { return Pauli::I; };
        let u: f64 = rng.gen();
        let mut acc: f64 = 0.0;
        for (p, pauli) in probs.iter().zip(PAULIS) {
            acc += p;
            if u < acc { return pauli; }
        }
        probs.iter().zip(PAULIS)
            .filter(|(p, _)| **p > 0.0)
            .last()
            .map(|(_, pauli)| pauli)
            .unwrap_or(Pauli::I)
    }
}

/// Fail if `probability` is outside `[0, 1]`.
pub fn check_probability(probability: f64) -> Result<()> {
    if (0.0..=1.0).contains(&probability) {
        Ok(())
    } else {
        Err(Error::InvalidProbability(probability))
    }
}

type CacheKey = (&'static str, Size, u64);

/// Memo of distributions owned by an error model.
#[derive(Debug, Default)]
struct DistributionCache {
    entries: Mutex<HashMap<CacheKey, Arc<ProbabilityDistribution>>>,
}

impl DistributionCache {
    fn get_or_try_insert<F>(
        &self,
        code: &dyn StabilizerCode,
        probability: f64,
        compute: F,
    ) -> Result<Arc<ProbabilityDistribution>>
    where F: FnOnce() -> Result<ProbabilityDistribution>
    {
        let key: CacheKey = (code.name(), code.size(), probability.to_bits());
        let mut entries
            = self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(dist) = entries.get(&key) {
            return Ok(Arc::clone(dist));
        }
        trace!("computing noise distribution for {} at p = {}", code.label(), probability);
        let dist = Arc::new(compute()?);
        entries.insert(key, Arc::clone(&dist));
        Ok(dist)
    }

    fn len(&self) -> usize {
        self.entries.lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

/// Common interface to all noise models.
pub trait ErrorModel: fmt::Debug + Send + Sync {
    /// Return the registered name of the model.
    fn name(&self) -> &'static str;

    /// Return a human-readable label.
    fn label(&self) -> String;

    /// Return the noise direction `(r_x, r_y, r_z)`.
    fn direction(&self) -> (f64, f64, f64);

    /// Compute (or fetch from cache) the per-qubit distribution for `code` at
    /// physical error rate `probability`.
    fn probability_distribution(&self, code: &dyn StabilizerCode, probability: f64)
        -> Result<Arc<ProbabilityDistribution>>;

    /// Sample an error on `code`.
    ///
    /// Output is reproducible given the generator state.
    fn generate(
        &self,
        code: &dyn StabilizerCode,
        probability: f64,
        rng: &mut dyn RngCore,
    ) -> Result<Bsf>
    {
        let dist = self.probability_distribution(code, probability)?;
        let mut error = Bsf::identity(code.qubit_count());
        for k in 0..code.qubit_count() {
            error.mul_pauli(k, dist.sample(k, &mut *rng));
        }
        Ok(error)
    }
}

/// Sample an error with a generator seeded from `seed`, or from system
/// entropy if `None`.
pub fn generate_seeded(
    model: &dyn ErrorModel,
    code: &dyn StabilizerCode,
    probability: f64,
    seed: Option<u64>,
) -> Result<Bsf>
{
    let mut rng: StdRng
        = seed.map(StdRng::seed_from_u64).unwrap_or_else(StdRng::from_entropy);
    model.generate(code, probability, &mut rng)
}

/// Noise direction as it appears in experiment files.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoiseParams {
    pub r_x: f64,
    pub r_y: f64,
    pub r_z: f64,
}

/// Pauli noise with the same rates on every qubit.
#[derive(Debug)]
pub struct PauliErrorModel {
    r_x: f64,
    r_y: f64,
    r_z: f64,
    cache: DistributionCache,
}

impl PauliErrorModel {
    /// Create a new model.
    ///
    /// Fails if any rate is negative or if the rates do not sum to 1.
    pub fn new(r_x: f64, r_y: f64, r_z: f64) -> Result<Self> {
        let total = r_x + r_y + r_z;
        if r_x < 0.0 || r_y < 0.0 || r_z < 0.0
            || !((total - 1.0).abs() < DIRECTION_TOL)
        {
            return Err(Error::InvalidDirection(r_x, r_y, r_z));
        }
        Ok(Self { r_x, r_y, r_z, cache: DistributionCache::default() })
    }

    /// Return `[p_I, p_X, p_Y, p_Z]` for a single qubit.
    pub fn base_probabilities(&self, probability: f64) -> [f64; 4] {
        [
            1.0 - probability,
            self.r_x * probability,
            self.r_y * probability,
            self.r_z * probability,
        ]
    }

    fn direction_label(&self) -> String {
        format!("X{:.4}Y{:.4}Z{:.4}", self.r_x, self.r_y, self.r_z)
    }

    /// Return the number of cached distributions.
    pub fn cached(&self) -> usize { self.cache.len() }
}

impl ErrorModel for PauliErrorModel {
    fn name(&self) -> &'static str { "PauliErrorModel" }

    fn label(&self) -> String { format!("Pauli {}", self.direction_label()) }

    fn direction(&self) -> (f64, f64, f64) { (self.r_x, self.r_y, self.r_z) }

    fn probability_distribution(&self, code: &dyn StabilizerCode, probability: f64)
        -> Result<Arc<ProbabilityDistribution>>
    {
        check_probability(probability)?;
        self.cache.get_or_try_insert(code, probability, || {
            Ok(ProbabilityDistribution::uniform(
                code.qubit_count(), self.base_probabilities(probability)))
        })
    }
}

/// Which pair of rates a deformation exchanges.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Deformation {
    /// Exchange the *X* and *Z* rates.
    Xzzx,
    /// Exchange the *X* and *Y* rates.
    Xy,
}

impl Deformation {
    /// Apply to `[p_I, p_X, p_Y, p_Z]`.
    pub fn apply(self, probs: [f64; 4]) -> [f64; 4] {
        let [p_i, p_x, p_y, p_z] = probs;
        match self {
            Self::Xzzx => [p_i, p_z, p_y, p_x],
            Self::Xy => [p_i, p_y, p_x, p_z],
        }
    }
}

impl fmt::Display for Deformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Xzzx => write!(f, "XZZX"),
            Self::Xy => write!(f, "XY"),
        }
    }
}

/// Pauli noise with two rates exchanged on qubits along the code's deformed
/// axis.
#[derive(Debug)]
pub struct DeformedErrorModel {
    base: PauliErrorModel,
    deformation: Deformation,
}

impl DeformedErrorModel {
    pub fn new(deformation: Deformation, r_x: f64, r_y: f64, r_z: f64)
        -> Result<Self>
    {
        Ok(Self { base: PauliErrorModel::new(r_x, r_y, r_z)?, deformation })
    }

    pub fn xzzx(r_x: f64, r_y: f64, r_z: f64) -> Result<Self> {
        Self::new(Deformation::Xzzx, r_x, r_y, r_z)
    }

    pub fn xy(r_x: f64, r_y: f64, r_z: f64) -> Result<Self> {
        Self::new(Deformation::Xy, r_x, r_y, r_z)
    }

    pub fn deformation(&self) -> Deformation { self.deformation }
}

impl ErrorModel for DeformedErrorModel {
    fn name(&self) -> &'static str {
        match self.deformation {
            Deformation::Xzzx => "DeformedXZZXErrorModel",
            Deformation::Xy => "DeformedXYErrorModel",
        }
    }

    fn label(&self) -> String {
        format!("Deformed {} Pauli {}", self.deformation, self.base.direction_label())
    }

    fn direction(&self) -> (f64, f64, f64) { self.base.direction() }

    fn probability_distribution(&self, code: &dyn StabilizerCode, probability: f64)
        -> Result<Arc<ProbabilityDistribution>>
    {
        check_probability(probability)?;
        let deformed_axis = code.deformed_axis()?;
        self.base.cache.get_or_try_insert(code, probability, || {
            let base = self.base.base_probabilities(probability);
            let deformed = self.deformation.apply(base);
            let mut dist = ProbabilityDistribution::uniform(code.qubit_count(), base);
            for (k, location) in code.qubit_coords().iter().enumerate() {
                if code.axis(location)? == deformed_axis {
                    dist.set(k, deformed);
                }
            }
            Ok(dist)
        })
    }
}

/// Builds a registered error model from its parameters.
pub type ErrorModelConstructor = fn(&NoiseParams) -> Result<Box<dyn ErrorModel>>;

fn pauli_model(params: &NoiseParams) -> Result<Box<dyn ErrorModel>> {
    Ok(Box::new(PauliErrorModel::new(params.r_x, params.r_y, params.r_z)?))
}

fn xzzx_model(params: &NoiseParams) -> Result<Box<dyn ErrorModel>> {
    Ok(Box::new(DeformedErrorModel::xzzx(params.r_x, params.r_y, params.r_z)?))
}

fn xy_model(params: &NoiseParams) -> Result<Box<dyn ErrorModel>> {
    Ok(Box::new(DeformedErrorModel::xy(params.r_x, params.r_y, params.r_z)?))
}

/// The registered error models, by name.
pub const ERROR_MODELS: [(&str, ErrorModelConstructor); 3] = [
    ("PauliErrorModel", pauli_model),
    ("DeformedXZZXErrorModel", xzzx_model),
    ("DeformedXYErrorModel", xy_model),
];

/// Build an error model by registered name.
pub fn build_error_model(name: &str, params: &NoiseParams)
    -> Result<Box<dyn ErrorModel>>
{
    let (_, build) = ERROR_MODELS.iter()
        .find(|(registered, _)| *registered == name)
        .ok_or_else(|| Error::UnregisteredModel {
            kind: ModelKind::ErrorModel, name: name.to_string() })?;
    build(params)
}

impl ModelSpec {
    /// Build the error model this spec names.
    pub fn build_error_model(&self) -> Result<Box<dyn ErrorModel>> {
        build_error_model(&self.model, &self.params()?)
    }
}

/// Ratio of the biased Pauli's rate to the sum of the other two.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum BiasRatio {
    Finite(f64),
    Infinite,
}

impl FromStr for BiasRatio {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        match s.to_lowercase().as_str() {
            "inf" | "infinite" | "infinity" => Ok(Self::Infinite),
            _ => {
                let eta: f64 = s.parse()
                    .map_err(|_| Error::InvalidParameters {
                        model: "bias ratio".into(),
                        reason: format!("cannot parse '{}'", s),
                    })?;
                if eta.is_infinite() && eta > 0.0 {
                    Ok(Self::Infinite)
                } else if eta.is_finite() && eta >= 0.0 {
                    Ok(Self::Finite(eta))
                } else {
                    Err(Error::InvalidParameters {
                        model: "bias ratio".into(),
                        reason: format!("{} is not a non-negative ratio", s),
                    })
                }
            },
        }
    }
}

impl fmt::Display for BiasRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Finite(eta) => write!(f, "{}", eta),
            Self::Infinite => write!(f, "inf"),
        }
    }
}

/// Parse a comma-separated list of bias ratios, e.g. `"0.5,1,inf"`.
pub fn read_bias_ratios(s: &str) -> Result<Vec<BiasRatio>> {
    s.split(',')
        .filter(|item| !item.trim().is_empty())
        .map(BiasRatio::from_str)
        .collect()
}

/// Convert a bias toward `pauli` into a normalized noise direction.
///
/// An infinite ratio puts all weight on `pauli`. A finite ratio η gives
/// `η / (1 + η)` to `pauli` and `1 / (2 (1 + η))` to each of the others.
pub fn direction_from_bias_ratio(pauli: Pauli, eta: BiasRatio)
    -> Result<NoiseParams>
{
    let (biased, other) = match eta {
        BiasRatio::Infinite => (1.0, 0.0),
        BiasRatio::Finite(eta) => (eta / (1.0 + eta), 1.0 / (2.0 * (1.0 + eta))),
    };
    match pauli {
        Pauli::X => Ok(NoiseParams { r_x: biased, r_y: other, r_z: other }),
        Pauli::Y => Ok(NoiseParams { r_x: other, r_y: biased, r_z: other }),
        Pauli::Z => Ok(NoiseParams { r_x: other, r_y: other, r_z: biased }),
        Pauli::I => Err(Error::InvalidParameters {
            model: "bias ratio".into(),
            reason: "noise cannot be biased toward the identity".into(),
        }),
    }
}
