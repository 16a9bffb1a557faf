//! Shared plumbing for the experiment binaries.

use std::{
    fs,
    io,
    path::Path,
};
use rand::{ rngs::StdRng, SeedableRng };
use tracing_subscriber::EnvFilter;

pub type BoxResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Install a `fmt` subscriber filtered by `RUST_LOG`, defaulting to `info`.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Create a directory and all its parents if it doesn't already exist.
pub fn mkdir<P>(path: P) -> io::Result<()>
where P: AsRef<Path>
{
    let path = path.as_ref();
    if !path.is_dir() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Pretty-print `value` as JSON to `path`.
pub fn write_json<P, T>(path: P, value: &T) -> BoxResult<()>
where
    P: AsRef<Path>,
    T: serde::Serialize + ?Sized,
{
    let file = fs::File::create(path.as_ref())?;
    serde_json::to_writer_pretty(io::BufWriter::new(file), value)?;
    tracing::info!("wrote {}", path.as_ref().display());
    Ok(())
}

/// Generator for the `trial`-th trial of a batch seeded with `seed`.
///
/// Every trial owns its generator so that parallel trials stay independent
/// and reproducible.
pub fn trial_rng(seed: u64, trial: usize) -> StdRng {
    StdRng::seed_from_u64(seed.wrapping_add(trial as u64))
}

/// Parse a list of values given as `min:max[:step]` (step defaults to
/// 0.005, both ends included), `a,b,c`, or a single value.
pub fn read_range_input(spec: &str) -> BoxResult<Vec<f64>> {
    const DEFAULT_STEP: f64 = 0.005;
    if spec.contains(':') {
        let parts: Vec<f64> = spec.split(':')
            .map(|s| s.trim().parse::<f64>())
            .collect::<Result<_, _>>()?;
        let (min, max, step) = match parts.as_slice() {
            [min, max] => (*min, *max, DEFAULT_STEP),
            [min, max, step] => (*min, *max, *step),
            _ => return Err(format!("malformed range '{}'", spec).into()),
        };
        if step <= 0.0 || max < min {
            return Err(format!("empty range '{}'", spec).into());
        }
        let n = ((max - min) / step + 1e-9).floor() as usize + 1;
        Ok((0..n).map(|i| min + i as f64 * step).collect())
    } else {
        Ok(
            spec.split(',')
                .map(|s| s.trim().parse::<f64>())
                .collect::<Result<_, _>>()?
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn ranges() {
        let vals = read_range_input("0:0.02:0.005").unwrap();
        assert_eq!(vals.len(), 5);
        assert!((vals[4] - 0.02).abs() < 1e-12);
        assert_eq!(read_range_input("0.1,0.2").unwrap(), vec![0.1, 0.2]);
        assert_eq!(read_range_input("0.3").unwrap(), vec![0.3]);
        assert!(read_range_input("0:1:2:3").is_err());
        assert!(read_range_input("a,b").is_err());
    }

    #[test]
    fn independent_trials() {
        use rand::Rng;
        let a: u64 = trial_rng(5, 0).gen();
        let b: u64 = trial_rng(5, 1).gen();
        let c: u64 = trial_rng(5, 0).gen();
        assert_ne!(a, b);
        assert_eq!(a, c);
    }
}
