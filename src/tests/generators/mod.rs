mod profiles;

use crate::common::types::{Sample, Timestamp};
use rand::prelude::*;

pub use profiles::*;

pub fn create_rng(seed: Option<u64>) -> Result<StdRng, String> {
    if let Some(seed) = seed {
        Ok(StdRng::seed_from_u64(seed))
    } else {
        match StdRng::from_rng(thread_rng()) {
            Err(e) => Err(format!("Error constructing rng {:?}", e)),
            Ok(rng) => Ok(rng),
        }
    }
}

/// Attach evenly spaced timestamps to generated values.
pub fn generate_series(
    values: impl Iterator<Item = f64>,
    start: Timestamp,
    interval: Timestamp,
    count: usize,
) -> Vec<Sample> {
    values
        .take(count)
        .enumerate()
        .map(|(i, value)| Sample::new(start + i as Timestamp * interval, value))
        .collect()
}
