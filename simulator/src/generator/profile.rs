use crate::generator::template::reflector_envelope;
use anyhow::ensure;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

fn default_width() -> f64 {
    0.015
}

/// A point reflector placed in front of the sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reflector {
    pub distance_m: f64,
    pub amplitude: f64,
    #[serde(default = "default_width")]
    pub width_m: f64,
}

/// Configuration for generating synthetic envelope sweeps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub reflectors: Vec<Reflector>,
    /// Upper bound of the uniform noise added to every sample.
    pub noise: f64,
    pub seed: u64,
    /// Reflector motion, applied to every reflector.
    pub drift_m_per_s: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            reflectors: vec![Reflector {
                distance_m: 0.6,
                amplitude: 2000.0,
                width_m: default_width(),
            }],
            noise: 100.0,
            seed: 0,
            drift_m_per_s: 0.0,
        }
    }
}

/// Produces successive non-negative sweeps over fixed range depths.
pub struct SweepGenerator {
    config: GeneratorConfig,
    depths: Vec<f64>,
    update_rate: f64,
    rng: StdRng,
    produced: u64,
}

impl SweepGenerator {
    pub fn new(config: &GeneratorConfig, depths: Vec<f64>, update_rate: f64) -> anyhow::Result<Self> {
        ensure!(
            config.noise.is_finite() && config.noise >= 0.0,
            "generator noise must be non-negative, got {}",
            config.noise
        );
        ensure!(update_rate > 0.0, "update rate must be positive");
        for reflector in &config.reflectors {
            ensure!(
                reflector.width_m > 0.0 && reflector.amplitude >= 0.0,
                "reflector at {} m needs a positive width and non-negative amplitude",
                reflector.distance_m
            );
        }

        Ok(Self {
            config: config.clone(),
            depths,
            update_rate,
            rng: StdRng::seed_from_u64(config.seed),
            produced: 0,
        })
    }

    pub fn next_sweep(&mut self) -> Vec<f64> {
        let elapsed_s = self.produced as f64 / self.update_rate;
        let shift = self.config.drift_m_per_s * elapsed_s;
        let noise = self.config.noise;

        let sweep = self
            .depths
            .iter()
            .map(|&range| {
                let echo: f64 = self
                    .config
                    .reflectors
                    .iter()
                    .map(|r| reflector_envelope(range, r.distance_m + shift, r.width_m, r.amplitude))
                    .sum();
                let jitter = if noise > 0.0 {
                    self.rng.gen_range(0.0..noise)
                } else {
                    0.0
                };
                echo + jitter
            })
            .collect();

        self.produced += 1;
        sweep
    }

    pub fn produced(&self) -> u64 {
        self.produced
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn depths(n: usize) -> Vec<f64> {
        (0..n).map(|i| i as f64 / (n - 1) as f64).collect()
    }

    #[test]
    fn generator_builds_sweeps_of_session_length() {
        let mut generator =
            SweepGenerator::new(&GeneratorConfig::default(), depths(128), 20.0).unwrap();
        let sweep = generator.next_sweep();
        assert_eq!(sweep.len(), 128);
        assert!(sweep.iter().all(|&v| v >= 0.0));
        assert_eq!(generator.produced(), 1);
    }

    #[test]
    fn seeded_generators_repeat() {
        let config = GeneratorConfig {
            seed: 13,
            ..Default::default()
        };
        let mut a = SweepGenerator::new(&config, depths(64), 20.0).unwrap();
        let mut b = SweepGenerator::new(&config, depths(64), 20.0).unwrap();
        assert_eq!(a.next_sweep(), b.next_sweep());
    }

    #[test]
    fn noiseless_echo_is_strongest_at_the_reflector() {
        let config = GeneratorConfig {
            noise: 0.0,
            reflectors: vec![Reflector {
                distance_m: 0.5,
                amplitude: 1000.0,
                width_m: 0.02,
            }],
            ..Default::default()
        };
        let mut generator = SweepGenerator::new(&config, depths(101), 20.0).unwrap();
        let sweep = generator.next_sweep();
        let strongest = sweep
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(idx, _)| idx);
        assert_eq!(strongest, Some(50));
    }

    #[test]
    fn drift_moves_the_echo() {
        let config = GeneratorConfig {
            noise: 0.0,
            drift_m_per_s: 1.0,
            ..Default::default()
        };
        let mut generator = SweepGenerator::new(&config, depths(101), 10.0).unwrap();
        let first = generator.next_sweep();
        let second = generator.next_sweep();
        assert_ne!(first, second);
    }

    #[test]
    fn negative_noise_is_rejected() {
        let config = GeneratorConfig {
            noise: -1.0,
            ..Default::default()
        };
        assert!(SweepGenerator::new(&config, depths(8), 20.0).is_err());
    }
}
