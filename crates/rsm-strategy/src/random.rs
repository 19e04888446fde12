//! Random sampling scenario policy
//!
//! Draws Gaussian shift and range errors. One sample set is drawn per
//! enumeration and evaluated on every modeled CT phase; sample `i` occupies
//! shift and range subscript `i`.

use crate::strategy::{
    expand_over_phases, Enumeration, EnumerationContext, PolicyKind, ScenarioStrategy,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use rsm_core::{ScenarioEntry, ScenarioError, UncertaintyParameters};

/// Default number of samples per CT phase
pub const DEFAULT_SAMPLES: usize = 10;

/// Largest accepted sample count
///
/// Samples share the shift and range axes, so the mask holds
/// `ct × samples × samples` cells.
pub const MAX_SAMPLES: usize = 4096;

/// Gaussian sampling policy
///
/// The seed is fixed at construction, so re-enumerating with unchanged
/// parameters reproduces the same samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomScenarios {
    samples: usize,
    seed: u64,
    include_nominal: bool,
}

impl Default for RandomScenarios {
    fn default() -> Self {
        Self {
            samples: DEFAULT_SAMPLES,
            seed: rand::random(),
            include_nominal: true,
        }
    }
}

impl RandomScenarios {
    /// Create policy with a freshly drawn seed
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set number of samples per CT phase
    ///
    /// Mask memory grows with the square of `samples`; enumeration rejects
    /// more than [`MAX_SAMPLES`].
    #[inline]
    #[must_use]
    pub fn with_samples(mut self, samples: usize) -> Self {
        self.samples = samples;
        self
    }

    /// Set seed for reproducible sampling
    #[inline]
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set whether the first sample is forced to the nominal scenario
    #[inline]
    #[must_use]
    pub fn with_include_nominal(mut self, include_nominal: bool) -> Self {
        self.include_nominal = include_nominal;
        self
    }

    /// Number of samples per CT phase
    #[inline]
    #[must_use]
    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Sampling seed
    #[inline]
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Whether sample 1 is the nominal scenario
    #[inline]
    #[must_use]
    pub fn include_nominal(&self) -> bool {
        self.include_nominal
    }

    /// Draw `[x, y, z, absRange, relRange]` samples
    fn draw(&self, params: &UncertaintyParameters) -> Result<Vec<[f64; 5]>, ScenarioError> {
        let [sx, sy, sz] = params.shift_sd();
        let dists = [sx, sy, sz, params.range_abs_sd(), params.range_rel_sd()]
            .map(|sd| Normal::new(0.0, sd));
        let mut normals = Vec::with_capacity(dists.len());
        for dist in dists {
            normals.push(dist.map_err(|e| ScenarioError::enumeration(e.to_string()))?);
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let drawn = if self.include_nominal { 1 } else { 0 };

        let mut samples = vec![[0.0; 5]; drawn];
        samples.extend((drawn..self.samples).map(|_| {
            let mut s = [0.0; 5];
            for (value, normal) in s.iter_mut().zip(&normals) {
                *value = normal.sample(&mut rng);
            }
            s
        }));
        Ok(samples)
    }
}

impl ScenarioStrategy for RandomScenarios {
    fn enumerate(&self, ctx: &EnumerationContext<'_>) -> Result<Enumeration, ScenarioError> {
        if self.samples == 0 {
            return Err(ScenarioError::enumeration("random sampling needs at least one sample"));
        }
        if self.samples > MAX_SAMPLES {
            return Err(ScenarioError::enumeration(format!(
                "random sampling supports at most {MAX_SAMPLES} samples, got {}",
                self.samples
            )));
        }

        let phases = ctx.phases()?;
        let phase_probs = ctx.normalized_phase_probabilities()?;
        let samples = self.draw(ctx.params)?;
        let pairs: Vec<(usize, usize)> = (0..samples.len()).map(|i| (i, i)).collect();
        let per_sample = 1.0 / self.samples as f64;

        Ok(expand_over_phases(
            phases,
            samples.len(),
            samples.len(),
            &pairs,
            |phase, i, _, (s, _)| {
                let [x, y, z, abs, rel] = samples[s];
                let probability = phase_probs[i] * per_sample;
                ScenarioEntry {
                    ct_phase: phase.phase,
                    iso_shift: [x, y, z],
                    abs_range_shift: abs,
                    rel_range_shift: rel,
                    probability,
                    weight: probability,
                }
            },
        ))
    }

    fn name(&self) -> &'static str {
        "random"
    }

    fn kind(&self) -> PolicyKind {
        PolicyKind::RandomSampling
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn enumerate(policy: RandomScenarios, phases: usize) -> Enumeration {
        let params = UncertaintyParameters::for_phases(phases);
        policy
            .enumerate(&EnumerationContext::new(&params, phases))
            .unwrap()
    }

    #[test]
    fn sample_count_per_phase() {
        let e = enumerate(RandomScenarios::new().with_samples(25).with_seed(7), 2);
        assert_eq!(e.len(), 50);
        assert_eq!(e.num_shift, 25);
        assert_eq!(e.num_range, 25);
    }

    #[test]
    fn seeded_sampling_is_reproducible() {
        let policy = RandomScenarios::new().with_samples(12).with_seed(42);
        assert_eq!(enumerate(policy, 1), enumerate(policy, 1));
    }

    #[test]
    fn different_seeds_differ() {
        let a = enumerate(RandomScenarios::new().with_seed(1), 1);
        let b = enumerate(RandomScenarios::new().with_seed(2), 1);
        assert_ne!(a.points[1].entry.iso_shift, b.points[1].entry.iso_shift);
    }

    #[test]
    fn unseeded_policy_is_stable_across_enumerations() {
        let policy = RandomScenarios::new();
        assert_eq!(enumerate(policy, 1), enumerate(policy, 1));
    }

    #[test]
    fn nominal_first_when_included() {
        let e = enumerate(RandomScenarios::new().with_seed(3), 1);
        assert!(e.points[0].entry.is_nominal());
        assert!(!e.points[1].entry.is_nominal());

        let e = enumerate(RandomScenarios::new().with_seed(3).with_include_nominal(false), 1);
        assert!(!e.points[0].entry.is_nominal());
    }

    #[test]
    fn uniform_probability_weight_equals_probability() {
        let e = enumerate(RandomScenarios::new().with_samples(8).with_seed(5), 2);
        for p in &e.points {
            assert!((p.entry.probability - 0.5 / 8.0).abs() < 1e-15);
            assert_eq!(p.entry.weight, p.entry.probability);
        }
        let total: f64 = e.points.iter().map(|p| p.entry.probability).sum();
        assert!(total <= 1.0 + 1e-12);
    }

    #[test]
    fn same_samples_on_every_phase() {
        let e = enumerate(RandomScenarios::new().with_samples(4).with_seed(9), 2);
        for i in 0..4 {
            assert_eq!(e.points[i].entry.iso_shift, e.points[i + 4].entry.iso_shift);
            assert_eq!(e.points[i].subscript.shift, e.points[i + 4].subscript.shift);
        }
    }

    #[test]
    fn zero_samples_rejected() {
        let params = UncertaintyParameters::new();
        let err = RandomScenarios::new()
            .with_samples(0)
            .enumerate(&EnumerationContext::new(&params, 1))
            .unwrap_err();
        assert!(matches!(err, ScenarioError::Enumeration(_)));
    }

    #[test]
    fn too_many_samples_rejected() {
        let params = UncertaintyParameters::new();
        let err = RandomScenarios::new()
            .with_samples(MAX_SAMPLES + 1)
            .enumerate(&EnumerationContext::new(&params, 1))
            .unwrap_err();
        assert!(err.to_string().contains("at most 4096 samples"));
    }

    #[test]
    fn zero_range_sd_gives_zero_range_errors() {
        let mut params = UncertaintyParameters::new();
        params.set_range_abs_sd(0.0).unwrap();
        params.set_range_rel_sd(0.0).unwrap();
        let e = RandomScenarios::new()
            .with_seed(11)
            .enumerate(&EnumerationContext::new(&params, 1))
            .unwrap();
        assert!(e.points.iter().all(|p| p.entry.abs_range_shift == 0.0));
        assert!(e.points.iter().all(|p| p.entry.rel_range_shift == 0.0));
    }
}
