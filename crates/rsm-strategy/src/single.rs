//! Single-scenario policy
//!
//! Degenerate nominal-like policy holding one frozen row. Used for models
//! extracted from a larger model: re-enumeration reproduces the copied row
//! verbatim instead of recomputing it from parameters. The phase table must
//! keep modeling exactly the row's phase.

use crate::strategy::{Enumeration, EnumerationContext, PolicyKind, ScenarioPoint, ScenarioStrategy};
use rsm_core::{ScenarioEntry, ScenarioError, Subscript};

/// One frozen scenario on its original CT phase
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SingleScenario {
    entry: ScenarioEntry,
}

impl SingleScenario {
    /// Create policy from a copied table row
    #[inline]
    #[must_use]
    pub fn new(entry: ScenarioEntry) -> Self {
        Self { entry }
    }

    /// The frozen row
    #[inline]
    #[must_use]
    pub fn entry(&self) -> &ScenarioEntry {
        &self.entry
    }
}

impl ScenarioStrategy for SingleScenario {
    fn enumerate(&self, ctx: &EnumerationContext<'_>) -> Result<Enumeration, ScenarioError> {
        let phase = self.entry.ct_phase as usize;
        if phase == 0 || phase > ctx.available_ct_phases {
            return Err(ScenarioError::enumeration(format!(
                "CT phase {phase} exceeds the {} available phases",
                ctx.available_ct_phases
            )));
        }

        let modeled = ctx.phases()?;
        if !matches!(modeled, [only] if only.phase == self.entry.ct_phase) {
            let listed: Vec<u32> = modeled.iter().map(|p| p.phase).collect();
            return Err(ScenarioError::enumeration(format!(
                "single scenario on CT phase {phase} requires exactly that phase modeled, got {listed:?}"
            )));
        }

        Ok(Enumeration {
            num_shift: 1,
            num_range: 1,
            points: vec![ScenarioPoint {
                subscript: Subscript::new(phase - 1, 0, 0),
                entry: self.entry,
            }],
        })
    }

    fn name(&self) -> &'static str {
        "single"
    }

    fn kind(&self) -> PolicyKind {
        PolicyKind::Single
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsm_core::{CtPhaseProbability, UncertaintyParameters};

    fn phase_three() -> UncertaintyParameters {
        let mut params = UncertaintyParameters::new();
        params
            .set_ct_phase_probabilities(&[CtPhaseProbability::new(3, 0.25)])
            .unwrap();
        params
    }

    fn shifted_entry() -> ScenarioEntry {
        ScenarioEntry {
            ct_phase: 3,
            iso_shift: [1.0, -2.0, 0.5],
            abs_range_shift: 1.0,
            rel_range_shift: 3.5,
            probability: 0.04,
            weight: 0.2,
        }
    }

    #[test]
    fn reproduces_row_verbatim() {
        let params = phase_three();
        let e = SingleScenario::new(shifted_entry())
            .enumerate(&EnumerationContext::new(&params, 4))
            .unwrap();
        assert_eq!(e.len(), 1);
        assert_eq!(e.points[0].entry, shifted_entry());
        assert_eq!(e.points[0].subscript, Subscript::new(2, 0, 0));
    }

    #[test]
    fn phase_must_exist_in_anatomy() {
        let params = phase_three();
        assert!(SingleScenario::new(shifted_entry())
            .enumerate(&EnumerationContext::new(&params, 2))
            .is_err());
    }

    #[test]
    fn row_phase_must_stay_modeled() {
        let single = SingleScenario::new(shifted_entry());

        let other = UncertaintyParameters::for_phases(1);
        let err = single
            .enumerate(&EnumerationContext::new(&other, 4))
            .unwrap_err();
        assert!(matches!(err, ScenarioError::Enumeration(_)));

        let extra = UncertaintyParameters::for_phases(3);
        assert!(single.enumerate(&EnumerationContext::new(&extra, 4)).is_err());
    }
}
