use crate::types::LightCurve;

use rand::prelude::*;
use rand_distr::{StandardNormal, Uniform};
use std::f64::consts::PI;

/// Generator of noisy multiharmonic light curves with random time sampling
///
/// The model is $m(t) = \sum_k A_k \sin(2\pi k f_0 t)$. Every draw samples new observation times
/// uniformly over the baseline. Noise standard deviation is the model standard deviation
/// divided by the signal-to-noise ratio, individual uncertainties are scattered by a factor of
/// 0.5 to 1.5 around it.
#[derive(Clone, Debug)]
pub struct SyntheticLightCurveGenerator {
    rng: StdRng,
    baseline: f64,
    n_obs: usize,
    freq: f64,
    amplitudes: Vec<f64>,
}

impl SyntheticLightCurveGenerator {
    pub fn new(baseline: f64, n_obs: usize, seed: u64) -> Self {
        assert!(baseline > 0.0, "baseline must be positive");
        assert!(n_obs > 1, "at least two observations are required");
        Self {
            rng: StdRng::seed_from_u64(seed),
            baseline,
            n_obs,
            freq: 1.0,
            amplitudes: vec![1.0],
        }
    }

    /// Set fundamental frequency and amplitudes of the harmonics
    pub fn set_model(&mut self, freq: f64, amplitudes: &[f64]) -> &mut Self {
        assert!(!amplitudes.is_empty(), "at least one harmonic is required");
        self.freq = freq;
        self.amplitudes = amplitudes.to_vec();
        self
    }

    pub fn model(&self, t: f64) -> f64 {
        self.amplitudes
            .iter()
            .enumerate()
            .map(|(k, &a)| a * f64::sin(2.0 * PI * (k + 1) as f64 * self.freq * t))
            .sum()
    }

    fn draw_times(&mut self) -> Vec<f64> {
        let mut t: Vec<f64> = (0..self.n_obs)
            .map(|_| self.rng.random_range(0.0..self.baseline))
            .collect();
        t.sort_by(|a, b| a.partial_cmp(b).unwrap());
        t
    }

    /// Noiseless light curve with unity uncertainties
    pub fn draw_clean_time_series(&mut self) -> LightCurve {
        let t = self.draw_times();
        let m = t.iter().map(|&t| self.model(t)).collect();
        let err = vec![1.0; t.len()];
        LightCurve { t, m, err }
    }

    pub fn draw_noisy_time_series(&mut self, snr: f64) -> LightCurve {
        assert!(snr > 0.0, "signal-to-noise ratio must be positive");
        let LightCurve { t, m: clean, .. } = self.draw_clean_time_series();
        let mean = clean.iter().sum::<f64>() / clean.len() as f64;
        let std = f64::sqrt(
            clean.iter().map(|&x| (x - mean).powi(2)).sum::<f64>() / (clean.len() - 1) as f64,
        );
        let sigma = std / snr;
        let scatter = Uniform::new(0.5, 1.5).unwrap();
        let err: Vec<f64> = (0..t.len())
            .map(|_| sigma * self.rng.sample(scatter))
            .collect();
        let m = clean
            .iter()
            .zip(err.iter())
            .map(|(&clean, &err)| {
                let noise: f64 = self.rng.sample(StandardNormal);
                clean + err * noise
            })
            .collect();
        LightCurve { t, m, err }
    }
}
