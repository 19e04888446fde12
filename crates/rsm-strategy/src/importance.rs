//! Importance sampling scenario policy
//!
//! Structured grid over fixed sigma multiples per axis. Each grid point is
//! weighted by the multivariate Gaussian density (independent axes) evaluated
//! at that point, then probabilities are renormalized to sum to one over the
//! whole enumerated set.

use crate::grid::{Combinations, ScenarioGrid};
use crate::strategy::{
    expand_over_phases, Enumeration, EnumerationContext, PolicyKind, ScenarioStrategy,
};
use rsm_core::{ScenarioEntry, ScenarioError};
use serde::{Deserialize, Serialize};
use statrs::distribution::{Continuous, Normal};

/// Default sigma multiples visited on every axis
pub const DEFAULT_MULTIPLES: [f64; 5] = [-2.0, -1.0, 0.0, 1.0, 2.0];

/// Density-weighted grid policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportanceScenarios {
    /// Sigma multiples visited on every axis
    pub multiples: Vec<f64>,

    /// How axes are combined
    pub combinations: Combinations,

    /// Move absolute and relative range error together
    pub combine_range: bool,
}

impl Default for ImportanceScenarios {
    fn default() -> Self {
        Self {
            multiples: DEFAULT_MULTIPLES.to_vec(),
            combinations: Combinations::All,
            combine_range: true,
        }
    }
}

impl ImportanceScenarios {
    /// Create full-grid policy over `{-2, -1, 0, 1, 2}` sigma
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set sigma multiples
    #[inline]
    #[must_use]
    pub fn with_multiples(mut self, multiples: Vec<f64>) -> Self {
        self.multiples = multiples;
        self
    }

    /// Set combination mode
    #[inline]
    #[must_use]
    pub fn with_combinations(mut self, combinations: Combinations) -> Self {
        self.combinations = combinations;
        self
    }

    /// Set whether range errors move together
    #[inline]
    #[must_use]
    pub fn with_combine_range(mut self, combine_range: bool) -> Self {
        self.combine_range = combine_range;
        self
    }
}

impl ScenarioStrategy for ImportanceScenarios {
    fn enumerate(&self, ctx: &EnumerationContext<'_>) -> Result<Enumeration, ScenarioError> {
        if self.multiples.is_empty() || self.multiples.iter().any(|k| !k.is_finite()) {
            return Err(ScenarioError::enumeration(
                "importance grid multiples must be a non-empty list of finite values",
            ));
        }

        let phases = ctx.phases()?;
        let phase_probs = ctx.normalized_phase_probabilities()?;
        let params = ctx.params;
        let grid = ScenarioGrid::build(params, &self.multiples, self.combinations, self.combine_range);

        // Density in standardized coordinates; the 1/sigma factors are shared
        // by every point and cancel in the renormalization.
        let std_normal =
            Normal::new(0.0, 1.0).map_err(|e| ScenarioError::enumeration(e.to_string()))?;
        let combine_range = self.combine_range;
        let densities: Vec<f64> = grid
            .pairs
            .iter()
            .map(|(s, r)| {
                let shift: f64 = grid.shifts[*s].iter().map(|k| std_normal.pdf(*k)).product();
                let [ka, kr] = grid.ranges[*r];
                let range = if combine_range {
                    std_normal.pdf(ka)
                } else {
                    std_normal.pdf(ka) * std_normal.pdf(kr)
                };
                shift * range
            })
            .collect();
        let total: f64 = densities.iter().sum();

        Ok(expand_over_phases(
            phases,
            grid.shifts.len(),
            grid.ranges.len(),
            &grid.pairs,
            |phase, i, j, (shift, range)| {
                let (abs, rel) = grid.range_values(range, params);
                let probability = phase_probs[i] * densities[j] / total;
                ScenarioEntry {
                    ct_phase: phase.phase,
                    iso_shift: grid.shift_mm(shift, params),
                    abs_range_shift: abs,
                    rel_range_shift: rel,
                    probability,
                    weight: probability,
                }
            },
        ))
    }

    fn name(&self) -> &'static str {
        "importance"
    }

    fn kind(&self) -> PolicyKind {
        PolicyKind::ImportanceSampling
    }
}
