use crate::tests::generators::create_rng;
use rand::prelude::*;
use rand_distr::{Distribution, StandardNormal};
use std::f64::consts::PI;

/// Random walk with uniform steps in [-step, step).
pub struct RandomWalkGenerator {
    rng: StdRng,
    last_value: f64,
    step: f64,
}

impl RandomWalkGenerator {
    pub fn new(seed: Option<u64>, start: f64, step: f64) -> Result<Self, String> {
        let rng = create_rng(seed)?;
        Ok(Self {
            rng,
            last_value: start,
            step,
        })
    }
}

impl Iterator for RandomWalkGenerator {
    type Item = f64;

    fn next(&mut self) -> Option<Self::Item> {
        self.last_value += (self.rng.gen::<f64>() * 2.0 - 1.0) * self.step;
        Some(self.last_value)
    }
}

/// Gaussian random walk; steps drawn from N(0, sigma).
pub struct NormalWalkGenerator {
    rng: StdRng,
    last_value: f64,
    sigma: f64,
}

impl NormalWalkGenerator {
    pub fn new(seed: Option<u64>, start: f64, sigma: f64) -> Result<Self, String> {
        let rng = create_rng(seed)?;
        Ok(Self {
            rng,
            last_value: start,
            sigma,
        })
    }
}

impl Iterator for NormalWalkGenerator {
    type Item = f64;

    fn next(&mut self) -> Option<Self::Item> {
        let m: f64 = StandardNormal.sample(&mut self.rng);
        self.last_value += m * self.sigma;
        Some(self.last_value)
    }
}

/// Solar-irradiance style profile: a half sine wave over the day with its
/// edges smoothed by a moving average, then cloud attenuation driven by a
/// two-state Markov process.
pub struct CloudProfileGenerator {
    rng: StdRng,
    profile: Vec<f64>,
    index: usize,
    scaling: f64,
    p_cloud: f64,
    p_no_cloud: f64,
    min_att: f64,
    max_att: f64,
}

impl CloudProfileGenerator {
    pub fn new(seed: Option<u64>, n: usize) -> Result<Self, String> {
        let rng = create_rng(seed)?;
        let base: Vec<f64> = (0..n).map(|i| irradiance(i, n)).collect();
        Ok(Self {
            rng,
            profile: moving_average(&base, n / 10),
            index: 0,
            scaling: 1.0,
            p_cloud: 0.025,
            p_no_cloud: 0.026,
            min_att: 0.3,
            max_att: 0.6,
        })
    }
}

fn irradiance(index: usize, n: usize) -> f64 {
    let n = n as f64;
    let x = index as f64;
    // Daylight spans the middle 90% of the window.
    if x > 0.05 * n && x < 0.95 * n {
        (PI * (x - n * 0.05) / (n * 0.9)).sin()
    } else {
        0.0
    }
}

/// Centred moving average, zero-padded past both ends.
fn moving_average(values: &[f64], window: usize) -> Vec<f64> {
    if window <= 1 {
        return values.to_vec();
    }
    let half = (window - 1) / 2;
    (0..values.len())
        .map(|i| {
            let lo = i.saturating_sub(half);
            let hi = (i + window - half).min(values.len());
            values[lo..hi].iter().sum::<f64>() / window as f64
        })
        .collect()
}

impl Iterator for CloudProfileGenerator {
    type Item = f64;

    fn next(&mut self) -> Option<Self::Item> {
        let base = *self.profile.get(self.index)?;
        self.index += 1;

        let roll: f64 = self.rng.gen();
        let clear = self.scaling == 1.0;
        if (clear && roll <= self.p_cloud) || (!clear && roll > self.p_no_cloud) {
            self.scaling = self.min_att + self.rng.gen::<f64>() * (self.max_att - self.min_att);
        } else {
            self.scaling = 1.0;
        }

        Some(base * self.scaling)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_walk_is_continuous() {
        let values: Vec<f64> = RandomWalkGenerator::new(Some(1), 0.0, 1.0)
            .unwrap()
            .take(1000)
            .collect();
        for pair in values.windows(2) {
            assert!((pair[1] - pair[0]).abs() <= 1.0 + 1e-9);
        }
    }

    #[test]
    fn test_moving_average_softens_steps() {
        let values = vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];
        let smoothed = moving_average(&values, 3);
        assert_eq!(smoothed.len(), values.len());
        assert_eq!(smoothed[1], 0.0);
        // The boundary spreads across the window instead of jumping.
        assert!((smoothed[2] - 1.0 / 3.0).abs() < 1e-12);
        assert!((smoothed[3] - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(smoothed[4], 1.0);
        // Ends are zero-padded.
        assert!((smoothed[5] - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_cloud_profile_bounds() {
        let values: Vec<f64> = CloudProfileGenerator::new(Some(2), 500).unwrap().collect();
        assert_eq!(values.len(), 500);
        for v in &values {
            assert!((0.0..=1.0).contains(v), "value {v} outside profile bounds");
        }
        // Night at both ends of the window.
        assert_eq!(values[0], 0.0);
        assert_eq!(values[499], 0.0);
    }
}
