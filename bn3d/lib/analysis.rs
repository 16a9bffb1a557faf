//! Disorder-averaged estimates from Monte Carlo run records.
//!
//! A [`ResamplingAnalysis`] walks through four stages, each consuming the
//! tables left by the previous one:
//!
//! 1. [`combine_inputs`](ResamplingAnalysis::combine_inputs) flattens input
//!    records (one per disorder realization) into a table and works out which
//!    columns are swept parameters.
//! 2. [`combine_results`](ResamplingAnalysis::combine_results) flattens run
//!    records, turning each observable accumulator into its running average
//!    `total / count`.
//! 3. [`estimate_observables`](ResamplingAnalysis::estimate_observables)
//!    joins the two on `hash` and reduces every observable to a mean,
//!    standard deviation and count over the disorder realizations sharing a
//!    parameter tuple.
//! 4. [`estimate_correlation_length`](ResamplingAnalysis::estimate_correlation_length)
//!    derives the second-moment correlation length from the two
//!    susceptibilities and bootstraps its uncertainty over disorder
//!    realizations.
//!
//! Degenerate groups (fewer than two values) give `NaN` spreads rather than
//! errors.

use std::{
    cmp::Ordering,
    collections::{ BTreeMap, BTreeSet },
    f64::consts::PI,
    hash::{ Hash, Hasher },
    io::Read,
};
use rand::{ Rng, SeedableRng };
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHasher;
use serde::{ de::DeserializeOwned, Deserialize, Serialize };
use serde_json::{ Map, Value };
use tracing::{ debug, warn };
use crate::error::{ Error, Result };

/// Default number of bootstrap resamples.
pub const DEFAULT_RESAMPLES: usize = 100;

/// Default bootstrap seed.
pub const DEFAULT_SEED: u64 = 0;

const SUSCEPTIBILITY_0: &str = "Susceptibility0";
const SUSCEPTIBILITY_KMIN: &str = "Susceptibilitykmin";

// columns identifying a model rather than a swept parameter
const MODEL_COLUMNS: [&str; 3] = ["disorder_model", "hash", "spin_model"];

/// A single table cell.
///
/// Cells are totally ordered so that parameter tuples can key a grouping;
/// integers and floats compare numerically with each other and a missing
/// value (`Null`) sorts first.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Param {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Param {
    /// Convert a JSON value; arrays and objects are kept as their JSON text.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => n.as_f64().map(Self::Float).unwrap_or(Self::Null),
            },
            Value::String(s) => Self::Str(s.clone()),
            other => Self::Str(other.to_string()),
        }
    }

    /// Return the numeric value, if any.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Bool(_) => 1,
            Self::Int(_) | Self::Float(_) => 2,
            Self::Str(_) => 3,
        }
    }
}

impl From<f64> for Param {
    fn from(f: f64) -> Self { Self::Float(f) }
}

impl From<&str> for Param {
    fn from(s: &str) -> Self { Self::Str(s.to_string()) }
}

// signed zeros and NaN payloads compare equal
fn canonical(x: f64) -> f64 {
    if x == 0.0 { 0.0 } else if x.is_nan() { f64::NAN } else { x }
}

impl Ord for Param {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Int(a), Self::Int(b)) => a.cmp(b),
            (Self::Str(a), Self::Str(b)) => a.cmp(b),
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => canonical(x).total_cmp(&canonical(y)),
                _ => a.rank().cmp(&b.rank()),
            },
        }
    }
}

impl PartialOrd for Param {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl PartialEq for Param {
    fn eq(&self, other: &Self) -> bool { self.cmp(other) == Ordering::Equal }
}

impl Eq for Param { }

/// A flattened table row.
pub type Row = BTreeMap<String, Param>;

/// One input record: a disorder realization of a spin model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InputRecord {
    pub hash: String,
    pub disorder_model: String,
    #[serde(default)]
    pub disorder_params: Map<String, Value>,
    /// The disorder configuration itself; not carried into the table.
    #[serde(default)]
    pub disorder: Value,
    pub spin_model: String,
    #[serde(default)]
    pub spin_model_params: Map<String, Value>,
    /// Any other top-level keys, kept as extra columns.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A running sum of an observable over Monte Carlo sweeps.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Accumulator {
    pub total: f64,
    pub count: f64,
}

impl Accumulator {
    /// Return `total / count`, or `NaN` if nothing was accumulated.
    pub fn mean(&self) -> f64 {
        if self.count == 0.0 { f64::NAN } else { self.total / self.count }
    }
}

/// One run record: observables measured on one disorder realization at one
/// temperature.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub hash: String,
    pub seed: u64,
    pub tau: f64,
    pub observables: BTreeMap<String, Accumulator>,
    #[serde(default)]
    pub sweep_stats: Map<String, Value>,
}

/// Disorder-averaged estimate of one observable.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct Estimate {
    pub estimate: f64,
    pub uncertainty: f64,
    pub n_disorders: usize,
}

/// Correlation length with its bootstrap uncertainty.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct CorrelationLength {
    pub k_min: f64,
    pub estimate: f64,
    pub uncertainty: f64,
}

/// All estimates for one tuple of independent variables.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EstimateRow {
    pub parameters: Row,
    pub observables: BTreeMap<String, Estimate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_length: Option<CorrelationLength>,
}

/// Read a JSON array of input or run records.
pub fn read_records<T, R>(reader: R) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    R: Read,
{
    Ok(serde_json::from_reader(reader)?)
}

/// Mean of the non-`NaN` values, or `NaN` if there are none.
pub fn nan_mean(values: &[f64]) -> f64 {
    let (sum, n) = values.iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0_usize), |(s, n), v| (s + v, n + 1));
    if n == 0 { f64::NAN } else { sum / n as f64 }
}

/// Standard deviation of the non-`NaN` values with `ddof` degrees of freedom
/// removed, or `NaN` if too few remain.
pub fn nan_std(values: &[f64], ddof: usize) -> f64 {
    let vals: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if vals.len() <= ddof { return f64::NAN; }
    let mean = vals.iter().sum::<f64>() / vals.len() as f64;
    let ss: f64 = vals.iter().map(|v| (v - mean).powi(2)).sum();
    (ss / (vals.len() - ddof) as f64).sqrt()
}

/// Second-moment correlation length from the susceptibilities at zero and
/// minimal wavevector.
pub fn correlation_length(k_min: f64, chi_0: f64, chi_kmin: f64) -> f64 {
    1.0 / (2.0 * (k_min / 2.0).sin()) * (chi_0 / chi_kmin - 1.0).abs().sqrt()
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Stage {
    Empty,
    Inputs,
    Results,
    Observables,
    CorrelationLength,
}

fn insert_unique(row: &mut Row, key: &str, value: Param) -> Result<()> {
    if row.insert(key.to_string(), value).is_some() {
        return Err(Error::DuplicateColumn(key.to_string()));
    }
    Ok(())
}

/// Staged analysis of one data set.
#[derive(Clone, Debug)]
pub struct ResamplingAnalysis {
    stage: Stage,
    inputs: Vec<Row>,
    results: Vec<Row>,
    independent_variables: Vec<String>,
    observable_names: Vec<String>,
    estimates: Vec<EstimateRow>,
}

impl Default for ResamplingAnalysis {
    fn default() -> Self { Self::new() }
}

impl ResamplingAnalysis {
    pub fn new() -> Self {
        Self {
            stage: Stage::Empty,
            inputs: Vec::new(),
            results: Vec::new(),
            independent_variables: Vec::new(),
            observable_names: Vec::new(),
            estimates: Vec::new(),
        }
    }

    /// Run all four stages with the default bootstrap settings.
    pub fn analyse(inputs: &[InputRecord], results: &[ResultRecord])
        -> Result<Self>
    {
        let mut analysis = Self::new();
        analysis.combine_inputs(inputs)?;
        analysis.combine_results(results)?;
        analysis.estimate_observables()?;
        analysis.estimate_correlation_length(DEFAULT_RESAMPLES, DEFAULT_SEED)?;
        Ok(analysis)
    }

    fn require(&self, stage: Stage, required: &'static str) -> Result<()> {
        if self.stage < stage {
            Err(Error::StageOrder { required })
        } else {
            Ok(())
        }
    }

    /// Flattened input table.
    pub fn inputs(&self) -> &[Row] { &self.inputs }

    /// Flattened results table.
    pub fn results(&self) -> &[Row] { &self.results }

    /// Names of the swept parameters, with `tau` last.
    pub fn independent_variables(&self) -> &[String] { &self.independent_variables }

    /// Names of all observables, sorted.
    pub fn observable_names(&self) -> &[String] { &self.observable_names }

    /// Estimates, one row per parameter tuple in sorted order.
    pub fn estimates(&self) -> &[EstimateRow] { &self.estimates }

    /// Flatten input records.
    ///
    /// Parameter sub-records become top-level columns and the raw `disorder`
    /// configuration is dropped. Running this again discards every later
    /// stage.
    pub fn combine_inputs(&mut self, records: &[InputRecord]) -> Result<()> {
        let mut rows: Vec<Row> = Vec::with_capacity(records.len());
        for rec in records.iter() {
            let mut row = Row::new();
            row.insert("hash".into(), Param::Str(rec.hash.clone()));
            row.insert("disorder_model".into(), Param::Str(rec.disorder_model.clone()));
            row.insert("spin_model".into(), Param::Str(rec.spin_model.clone()));
            let flattened = rec.disorder_params.iter()
                .chain(rec.spin_model_params.iter())
                .chain(rec.extra.iter());
            for (key, value) in flattened {
                insert_unique(&mut row, key, Param::from_json(value))?;
            }
            rows.push(row);
        }
        let columns: BTreeSet<&String> = rows.iter().flat_map(|r| r.keys()).collect();
        self.independent_variables = columns.into_iter()
            .filter(|c| !MODEL_COLUMNS.contains(&c.as_str()))
            .cloned()
            .chain(std::iter::once("tau".to_string()))
            .collect();
        debug!(
            "combined {} inputs; independent variables {:?}",
            rows.len(), self.independent_variables,
        );
        self.inputs = rows;
        self.results.clear();
        self.observable_names.clear();
        self.estimates.clear();
        self.stage = Stage::Inputs;
        Ok(())
    }

    /// Flatten run records, averaging each observable accumulator.
    pub fn combine_results(&mut self, records: &[ResultRecord]) -> Result<()> {
        self.require(Stage::Inputs, "combine_inputs")?;
        let mut rows: Vec<Row> = Vec::with_capacity(records.len());
        let mut names: BTreeSet<String> = BTreeSet::new();
        for rec in records.iter() {
            let mut row = Row::new();
            row.insert("hash".into(), Param::Str(rec.hash.clone()));
            row.insert("seed".into(), Param::Int(rec.seed as i64));
            row.insert("tau".into(), Param::Float(rec.tau));
            for (name, acc) in rec.observables.iter() {
                insert_unique(&mut row, name, Param::Float(acc.mean()))?;
                names.insert(name.clone());
            }
            for (key, value) in rec.sweep_stats.iter() {
                insert_unique(&mut row, key, Param::from_json(value))?;
            }
            rows.push(row);
        }
        debug!("combined {} results over {} observables", rows.len(), names.len());
        self.results = rows;
        self.observable_names = names.into_iter().collect();
        self.estimates.clear();
        self.stage = Stage::Results;
        Ok(())
    }

    fn key_of(&self, row: &Row, names: &[String]) -> Vec<Param> {
        names.iter()
            .map(|name| row.get(name).cloned().unwrap_or(Param::Null))
            .collect()
    }

    /// Join inputs and results on `hash` and reduce each observable over the
    /// disorder realizations sharing a parameter tuple.
    ///
    /// Uncertainties are sample standard deviations (one degree of freedom
    /// removed).
    pub fn estimate_observables(&mut self) -> Result<()> {
        self.require(Stage::Results, "combine_results")?;
        let mut by_hash: BTreeMap<&Param, Vec<&Row>> = BTreeMap::new();
        for row in self.inputs.iter() {
            if let Some(hash) = row.get("hash") {
                by_hash.entry(hash).or_default().push(row);
            }
        }

        let mut groups: BTreeMap<Vec<Param>, Vec<Row>> = BTreeMap::new();
        let mut unmatched: usize = 0;
        for result in self.results.iter() {
            let matches = result.get("hash").and_then(|h| by_hash.get(h));
            let Some(inputs) = matches else { unmatched += 1; continue; };
            for input in inputs {
                let mut merged: Row = (*input).clone();
                merged.extend(result.iter().map(|(k, v)| (k.clone(), v.clone())));
                let key = self.key_of(&merged, &self.independent_variables);
                groups.entry(key).or_default().push(merged);
            }
        }
        if unmatched > 0 {
            warn!("{} results have no matching input and were dropped", unmatched);
        }

        self.estimates = groups.into_iter()
            .map(|(key, rows)| {
                let parameters: Row = self.independent_variables.iter()
                    .cloned()
                    .zip(key)
                    .collect();
                let observables: BTreeMap<String, Estimate>
                    = self.observable_names.iter()
                    .map(|name| {
                        let values: Vec<f64> = rows.iter()
                            .map(|r| {
                                r.get(name).and_then(Param::as_f64).unwrap_or(f64::NAN)
                            })
                            .collect();
                        let estimate = Estimate {
                            estimate: nan_mean(&values),
                            uncertainty: nan_std(&values, 1),
                            n_disorders: values.iter().filter(|v| !v.is_nan()).count(),
                        };
                        (name.clone(), estimate)
                    })
                    .collect();
                EstimateRow { parameters, observables, correlation_length: None }
            })
            .collect();
        debug!("estimated observables for {} parameter groups", self.estimates.len());
        self.stage = Stage::Observables;
        Ok(())
    }

    fn numeric_parameter(row: &EstimateRow, name: &str) -> Result<f64> {
        row.parameters.get(name)
            .ok_or_else(|| Error::MissingColumn(name.to_string()))?
            .as_f64()
            .ok_or_else(|| Error::NonNumericColumn(name.to_string()))
    }

    fn observable_estimate(row: &EstimateRow, name: &str) -> Result<f64> {
        row.observables.get(name)
            .map(|e| e.estimate)
            .ok_or_else(|| Error::MissingColumn(name.to_string()))
    }

    /// Disorder hashes whose inputs match `row` on every independent variable
    /// except `tau`, sorted and deduplicated.
    fn matching_hashes(&self, row: &EstimateRow) -> Vec<String> {
        let params: Vec<(&String, &Param)> = row.parameters.iter()
            .filter(|(name, _)| name.as_str() != "tau")
            .collect();
        let hashes: BTreeSet<String> = self.inputs.iter()
            .filter(|input| {
                params.iter().all(|(name, value)| {
                    input.get(*name).map_or(**value == Param::Null, |v| v == *value)
                })
            })
            .filter_map(|input| match input.get("hash") {
                Some(Param::Str(h)) => Some(h.clone()),
                _ => None,
            })
            .collect();
        hashes.into_iter().collect()
    }

    /// Derive the correlation length for every parameter row and bootstrap
    /// its uncertainty over disorder realizations.
    ///
    /// Each row resamples its disorder hashes with replacement `n_resamp`
    /// times; the uncertainty is the (population) standard deviation of the
    /// resampled correlation lengths. The generator for a row is seeded from
    /// `seed` and the row's hash set, so identical inputs always give
    /// identical output.
    pub fn estimate_correlation_length(&mut self, n_resamp: usize, seed: u64)
        -> Result<()>
    {
        self.require(Stage::Observables, "estimate_observables")?;
        let mut lengths: Vec<CorrelationLength> = Vec::with_capacity(self.estimates.len());
        for row in self.estimates.iter() {
            let l_x = Self::numeric_parameter(row, "L_x")?;
            let l_y = Self::numeric_parameter(row, "L_y")?;
            let chi_0 = Self::observable_estimate(row, SUSCEPTIBILITY_0)?;
            let chi_kmin = Self::observable_estimate(row, SUSCEPTIBILITY_KMIN)?;
            let k_min = 2.0 * PI / l_x.max(l_y);
            let estimate = correlation_length(k_min, chi_0, chi_kmin);
            let tau = row.parameters.get("tau").cloned().unwrap_or(Param::Null);
            let (hashes, samples) = self.disorder_samples(row, &tau);
            let uncertainty = if hashes.len() < 2 {
                debug!(
                    "{} disorder realization(s) at {:?}; no bootstrap",
                    hashes.len(), row.parameters,
                );
                f64::NAN
            } else {
                Self::bootstrap(&hashes, &samples, k_min, n_resamp, seed)
            };
            lengths.push(CorrelationLength { k_min, estimate, uncertainty });
        }
        for (row, cl) in self.estimates.iter_mut().zip(lengths) {
            row.correlation_length = Some(cl);
        }
        self.stage = Stage::CorrelationLength;
        Ok(())
    }

    /// Collect the susceptibility samples of every matching disorder hash
    /// with at least one result at `tau`.
    fn disorder_samples(&self, row: &EstimateRow, tau: &Param)
        -> (Vec<String>, Vec<(Vec<f64>, Vec<f64>)>)
    {
        self.matching_hashes(row).into_iter()
            .filter_map(|h| {
                let hash = Param::Str(h.clone());
                let rows: Vec<&Row> = self.results.iter()
                    .filter(|r| r.get("hash") == Some(&hash) && r.get("tau") == Some(tau))
                    .collect();
                if rows.is_empty() { return None; }
                let get = |name: &str| -> Vec<f64> {
                    rows.iter()
                        .map(|r| r.get(name).and_then(Param::as_f64).unwrap_or(f64::NAN))
                        .collect()
                };
                Some((h, (get(SUSCEPTIBILITY_0), get(SUSCEPTIBILITY_KMIN))))
            })
            .unzip()
    }

    fn bootstrap(
        hashes: &[String],
        samples: &[(Vec<f64>, Vec<f64>)],
        k_min: f64,
        n_resamp: usize,
        seed: u64,
    ) -> f64
    {
        let mut hasher = FxHasher::default();
        hashes.hash(&mut hasher);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        rng.set_stream(hasher.finish());

        let m = hashes.len();
        let resampled: Vec<f64> = (0..n_resamp)
            .map(|_| {
                let mut chi_0: Vec<f64> = Vec::new();
                let mut chi_kmin: Vec<f64> = Vec::new();
                for _ in 0..m {
                    let (s0, sk) = &samples[rng.gen_range(0..m)];
                    chi_0.extend(s0);
                    chi_kmin.extend(sk);
                }
                correlation_length(k_min, nan_mean(&chi_0), nan_mean(&chi_kmin))
            })
            .collect();
        if resampled.iter().any(|v| v.is_nan()) { return f64::NAN; }
        nan_std(&resampled, 0)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::json;

    fn input(hash: &str, l: i64, disorder_p: f64) -> InputRecord {
        serde_json::from_value(json!({
            "hash": hash,
            "disorder_model": "Rbim2DIidDisorder",
            "disorder_params": { "p": disorder_p },
            "disorder": [1, -1, 1, 1],
            "spin_model": "RandomBondIsingModel2D",
            "spin_model_params": { "L_x": l, "L_y": l },
        }))
        .unwrap()
    }

    fn result(hash: &str, tau: f64, chi_0: f64, chi_kmin: f64) -> ResultRecord {
        serde_json::from_value(json!({
            "hash": hash,
            "seed": 0,
            "tau": tau,
            "observables": {
                "Susceptibility0": { "total": chi_0 * 10.0, "count": 10 },
                "Susceptibilitykmin": { "total": chi_kmin * 10.0, "count": 10 },
            },
            "sweep_stats": { "acceptance": 0.5 },
        }))
        .unwrap()
    }

    fn data() -> (Vec<InputRecord>, Vec<ResultRecord>) {
        let inputs = vec![
            input("a", 4, 0.1), input("b", 4, 0.1), input("c", 4, 0.1),
            input("d", 6, 0.1),
        ];
        let results = vec![
            result("a", 1.0, 5.0, 2.0), result("b", 1.0, 6.0, 2.5),
            result("c", 1.0, 4.0, 1.5), result("d", 1.0, 8.0, 2.0),
            result("a", 2.0, 3.0, 2.0), result("b", 2.0, 3.5, 2.5),
        ];
        (inputs, results)
    }

    #[test]
    fn stage_order() {
        let mut analysis = ResamplingAnalysis::new();
        assert!(matches!(
            analysis.estimate_observables(),
            Err(Error::StageOrder { required: "combine_results" }),
        ));
        assert!(matches!(
            analysis.combine_results(&[]),
            Err(Error::StageOrder { required: "combine_inputs" }),
        ));
    }

    #[test]
    fn flattened_inputs() {
        let (inputs, _) = data();
        let mut analysis = ResamplingAnalysis::new();
        analysis.combine_inputs(&inputs).unwrap();
        let row = &analysis.inputs()[0];
        assert!(!row.contains_key("disorder"));
        assert_eq!(row.get("L_x"), Some(&Param::Int(4)));
        assert_eq!(row.get("p"), Some(&Param::Float(0.1)));
        assert_eq!(analysis.independent_variables(), &["L_x", "L_y", "p", "tau"]);
    }

    #[test]
    fn duplicate_column() {
        let mut rec = input("a", 4, 0.1);
        rec.spin_model_params.insert("p".into(), json!(0.2));
        let mut analysis = ResamplingAnalysis::new();
        assert!(matches!(
            analysis.combine_inputs(&[rec]),
            Err(Error::DuplicateColumn(c)) if c == "p",
        ));
    }

    #[test]
    fn two_realizations() {
        let inputs = vec![input("a", 4, 0.1), input("b", 4, 0.1)];
        let results = vec![result("a", 1.0, 0.4, 1.0), result("b", 1.0, 0.6, 1.0)];
        let mut analysis = ResamplingAnalysis::new();
        analysis.combine_inputs(&inputs).unwrap();
        analysis.combine_results(&results).unwrap();
        analysis.estimate_observables().unwrap();
        assert_eq!(analysis.estimates().len(), 1);
        let est = analysis.estimates()[0].observables[SUSCEPTIBILITY_0];
        assert_relative_eq!(est.estimate, 0.5, epsilon = 1e-12);
        assert_relative_eq!(est.uncertainty, 0.1414213562373095, epsilon = 1e-9);
        assert_eq!(est.n_disorders, 2);
    }

    #[test]
    fn single_realization_is_nan() {
        let (inputs, results) = data();
        let analysis = ResamplingAnalysis::analyse(&inputs, &results).unwrap();
        let row = analysis.estimates().iter()
            .find(|r| r.parameters["L_x"] == Param::Int(6))
            .unwrap();
        assert_eq!(row.observables[SUSCEPTIBILITY_0].n_disorders, 1);
        assert!(row.observables[SUSCEPTIBILITY_0].uncertainty.is_nan());
        let cl = row.correlation_length.unwrap();
        assert!(cl.estimate.is_finite());
        assert!(cl.uncertainty.is_nan());
    }

    #[test]
    fn correlation_length_estimate() {
        let (inputs, results) = data();
        let analysis = ResamplingAnalysis::analyse(&inputs, &results).unwrap();
        assert_eq!(analysis.estimates().len(), 3);
        let row = &analysis.estimates()[0];
        assert_eq!(row.parameters["L_x"], Param::Int(4));
        assert_eq!(row.parameters["tau"], Param::Float(1.0));
        let cl = row.correlation_length.unwrap();
        let k_min = 2.0 * PI / 4.0;
        assert_relative_eq!(cl.k_min, k_min);
        let expected = 1.0 / (2.0 * (k_min / 2.0).sin()) * (5.0_f64 / 2.0 - 1.0).sqrt();
        assert_relative_eq!(cl.estimate, expected, epsilon = 1e-12);
        // three realizations with different ratios must spread the resamples
        assert!(cl.uncertainty.is_finite() && cl.uncertainty > 0.0);
    }

    #[test]
    fn bootstrap_ignores_record_order() {
        let (mut inputs, mut results) = data();
        let forward = ResamplingAnalysis::analyse(&inputs, &results).unwrap();
        inputs.reverse();
        results.reverse();
        let backward = ResamplingAnalysis::analyse(&inputs, &results).unwrap();
        let a = forward.estimates()[0].correlation_length.unwrap();
        let b = backward.estimates()[0].correlation_length.unwrap();
        assert_eq!(forward.estimates()[0].parameters, backward.estimates()[0].parameters);
        assert_relative_eq!(a.estimate, b.estimate, epsilon = 1e-12);
        assert_relative_eq!(a.uncertainty, b.uncertainty, epsilon = 1e-12);
    }

    #[test]
    fn bootstrap_is_reproducible() {
        let (inputs, results) = data();
        let a = ResamplingAnalysis::analyse(&inputs, &results).unwrap();
        let b = ResamplingAnalysis::analyse(&inputs, &results).unwrap();
        // NaN spreads serialize as null, so compare serialized tables
        assert_eq!(
            serde_json::to_value(a.estimates()).unwrap(),
            serde_json::to_value(b.estimates()).unwrap(),
        );
        let ua = a.estimates()[0].correlation_length.unwrap().uncertainty;
        let ub = b.estimates()[0].correlation_length.unwrap().uncertainty;
        assert_eq!(ua, ub);

        let mut c = ResamplingAnalysis::new();
        c.combine_inputs(&inputs).unwrap();
        c.combine_results(&results).unwrap();
        c.estimate_observables().unwrap();
        c.estimate_correlation_length(100, 7).unwrap();
        // the point estimate does not depend on the bootstrap seed
        assert_eq!(
            a.estimates()[0].correlation_length.unwrap().estimate,
            c.estimates()[0].correlation_length.unwrap().estimate,
        );
    }

    #[test]
    fn missing_susceptibility() {
        let inputs = vec![input("a", 4, 0.1)];
        let mut res = result("a", 1.0, 1.0, 1.0);
        res.observables.remove(SUSCEPTIBILITY_KMIN);
        let mut analysis = ResamplingAnalysis::new();
        analysis.combine_inputs(&inputs).unwrap();
        analysis.combine_results(&[res]).unwrap();
        analysis.estimate_observables().unwrap();
        assert!(matches!(
            analysis.estimate_correlation_length(10, 0),
            Err(Error::MissingColumn(c)) if c == SUSCEPTIBILITY_KMIN,
        ));
    }

    #[test]
    fn param_order() {
        assert_eq!(Param::Int(2), Param::Float(2.0));
        assert!(Param::Null < Param::Int(0));
        assert!(Param::Float(1.5) < Param::Int(2));
        assert!(Param::Int(3) < Param::from("abc"));
        assert_eq!(Param::Float(-0.0), Param::Float(0.0));
        assert_eq!(Param::Float(-0.0), Param::Int(0));
    }

    #[test]
    fn signed_zero_shares_a_group() {
        let mut a = input("a", 4, 0.0);
        a.disorder_params.insert("p".into(), json!(-0.0));
        let b = input("b", 4, 0.0);
        let results = vec![result("a", 1.0, 0.4, 1.0), result("b", 1.0, 0.6, 1.0)];
        let mut analysis = ResamplingAnalysis::new();
        analysis.combine_inputs(&[a, b]).unwrap();
        analysis.combine_results(&results).unwrap();
        analysis.estimate_observables().unwrap();
        assert_eq!(analysis.estimates().len(), 1);
        assert_eq!(analysis.estimates()[0].observables[SUSCEPTIBILITY_0].n_disorders, 2);
    }

    #[test]
    fn records_from_json() {
        let text = r#"[{"hash": "a", "seed": 3, "tau": 0.5,
            "observables": {"Susceptibility0": {"total": 2.0, "count": 4}}}]"#;
        let records: Vec<ResultRecord> = read_records(text.as_bytes()).unwrap();
        assert_eq!(records[0].seed, 3);
        assert_relative_eq!(records[0].observables[SUSCEPTIBILITY_0].mean(), 0.5);
        let res: Result<Vec<ResultRecord>> = read_records("[{\"hash\": 1}]".as_bytes());
        assert!(matches!(res, Err(Error::Json(_))));
    }

    #[test]
    fn std_conventions() {
        assert_relative_eq!(nan_std(&[1.0, 3.0], 0), 1.0);
        assert_relative_eq!(nan_std(&[1.0, 3.0, f64::NAN], 1), 2.0_f64.sqrt());
        assert!(nan_std(&[1.0], 1).is_nan());
        assert!(nan_mean(&[f64::NAN]).is_nan());
    }
}
