//! Disorder-averaged observables and bootstrapped correlation lengths for a
//! directory of Monte Carlo run records.
//!
//! Usage: `correlation_length DATA_DIR [N_RESAMP] [SEED]`
//!
//! Reads `DATA_DIR/inputs.json` and `DATA_DIR/results.json` (arrays of input
//! and run records) and writes `DATA_DIR/estimates.json`.

use std::{
    fs::File,
    io::BufReader,
    path::{ Path, PathBuf },
};
use bn3d::analysis::{
    read_records,
    InputRecord,
    ResamplingAnalysis,
    ResultRecord,
    DEFAULT_RESAMPLES,
    DEFAULT_SEED,
};
use lib::{ init_logging, write_json, BoxResult };
use tracing::{ info, warn };

fn load<T>(path: &Path) -> BoxResult<Vec<T>>
where T: serde::de::DeserializeOwned
{
    let file = File::open(path)
        .map_err(|e| format!("cannot open {}: {}", path.display(), e))?;
    Ok(read_records(BufReader::new(file))?)
}

fn main() -> BoxResult<()> {
    init_logging();
    let mut args = std::env::args().skip(1);
    let data_dir: PathBuf = args.next()
        .map(PathBuf::from)
        .ok_or("missing data directory")?;
    let n_resamp: usize = args.next()
        .map(|s| s.parse()).transpose()?
        .unwrap_or(DEFAULT_RESAMPLES);
    let seed: u64 = args.next()
        .map(|s| s.parse()).transpose()?
        .unwrap_or(DEFAULT_SEED);

    let inputs: Vec<InputRecord> = load(&data_dir.join("inputs.json"))?;
    let results: Vec<ResultRecord> = load(&data_dir.join("results.json"))?;
    info!("loaded {} inputs and {} results", inputs.len(), results.len());

    let mut analysis = ResamplingAnalysis::new();
    analysis.combine_inputs(&inputs)?;
    analysis.combine_results(&results)?;
    analysis.estimate_observables()?;
    analysis.estimate_correlation_length(n_resamp, seed)?;

    let degenerate = analysis.estimates().iter()
        .filter(|row| {
            row.correlation_length.map_or(true, |cl| cl.uncertainty.is_nan())
        })
        .count();
    if degenerate > 0 {
        warn!("{} parameter groups have no correlation length uncertainty", degenerate);
    }
    info!(
        "{} parameter groups over {:?}",
        analysis.estimates().len(), analysis.independent_variables(),
    );

    write_json(data_dir.join("estimates.json"), analysis.estimates())?;
    Ok(())
}
