//! Worst-case scenario policy
//!
//! Visits the ± `wcSigma` extremes of every uncertain quantity. The default star
//! pattern perturbs one axis at a time so the scenario count grows linearly
//! with the number of axes.
//!
//! Probabilities are placeholders (the phase probability of every scenario)
//! and are not normalized: worst-case scenarios feed min-max objectives, not
//! expectations.

use crate::grid::{Combinations, ScenarioGrid};
use crate::strategy::{
    expand_over_phases, Enumeration, EnumerationContext, PolicyKind, ScenarioStrategy,
};
use rsm_core::{ScenarioEntry, ScenarioError};
use serde::{Deserialize, Serialize};

/// Worst-case policy over ± `wcSigma` extremes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorstCaseScenarios {
    /// How extremes of different axes are combined
    pub combinations: Combinations,

    /// Move absolute and relative range error together
    pub combine_range: bool,
}

impl Default for WorstCaseScenarios {
    fn default() -> Self {
        Self {
            combinations: Combinations::None,
            combine_range: true,
        }
    }
}

impl WorstCaseScenarios {
    /// Create star-pattern worst-case policy
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
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

impl ScenarioStrategy for WorstCaseScenarios {
    fn enumerate(&self, ctx: &EnumerationContext<'_>) -> Result<Enumeration, ScenarioError> {
        let phases = ctx.phases()?;
        let params = ctx.params;
        let wc = params.wc_sigma();

        let grid = ScenarioGrid::build(params, &[-wc, wc], self.combinations, self.combine_range);

        Ok(expand_over_phases(
            phases,
            grid.shifts.len(),
            grid.ranges.len(),
            &grid.pairs,
            |phase, _, _, (shift, range)| {
                let (abs, rel) = grid.range_values(range, params);
                ScenarioEntry {
                    ct_phase: phase.phase,
                    iso_shift: grid.shift_mm(shift, params),
                    abs_range_shift: abs,
                    rel_range_shift: rel,
                    probability: phase.probability,
                    weight: 1.0,
                }
            },
        ))
    }

    fn name(&self) -> &'static str {
        "worst_case"
    }

    fn kind(&self) -> PolicyKind {
        PolicyKind::WorstCase
    }
}
