//! Nominal scenario policy
//!
//! One unperturbed scenario per modeled CT phase.

use crate::strategy::{
    expand_over_phases, Enumeration, EnumerationContext, PolicyKind, ScenarioStrategy,
};
use rsm_core::{ScenarioEntry, ScenarioError};

/// Nominal policy: zero shift, zero range error
///
/// Probability is the phase probability, weight is 1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NominalScenario;

impl NominalScenario {
    /// Create new nominal policy
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ScenarioStrategy for NominalScenario {
    fn enumerate(&self, ctx: &EnumerationContext<'_>) -> Result<Enumeration, ScenarioError> {
        let phases = ctx.phases()?;
        Ok(expand_over_phases(phases, 1, 1, &[(0, 0)], |phase, _, _, _| {
            ScenarioEntry::nominal(phase.phase, phase.probability)
        }))
    }

    fn name(&self) -> &'static str {
        "nominal"
    }

    fn kind(&self) -> PolicyKind {
        PolicyKind::Nominal
    }
}
