//! Tagged policy dispatch
//!
//! [`ScenarioPolicy`] is the closed set of built-in policies plus an escape
//! hatch for user strategies, behind the single [`ScenarioStrategy`] interface.

use crate::importance::ImportanceScenarios;
use crate::nominal::NominalScenario;
use crate::random::RandomScenarios;
use crate::single::SingleScenario;
use crate::strategy::{Enumeration, EnumerationContext, PolicyKind, ScenarioStrategy};
use crate::worst_case::WorstCaseScenarios;
use rsm_core::ScenarioError;
use std::sync::Arc;

/// Scenario enumeration policy selected by configuration
#[derive(Debug, Clone)]
pub enum ScenarioPolicy {
    /// One unperturbed scenario per phase
    Nominal(NominalScenario),

    /// ± sigma extremes
    WorstCase(WorstCaseScenarios),

    /// Gaussian samples
    RandomSampling(RandomScenarios),

    /// Density-weighted grid
    ImportanceSampling(ImportanceScenarios),

    /// Frozen row of an extracted model
    Single(SingleScenario),

    /// User-provided strategy
    Custom(Arc<dyn ScenarioStrategy>),
}

impl Default for ScenarioPolicy {
    fn default() -> Self {
        Self::Nominal(NominalScenario)
    }
}

impl ScenarioPolicy {
    /// Wrap a user strategy
    #[inline]
    #[must_use]
    pub fn custom(strategy: impl ScenarioStrategy + 'static) -> Self {
        Self::Custom(Arc::new(strategy))
    }

    fn as_strategy(&self) -> &dyn ScenarioStrategy {
        match self {
            Self::Nominal(s) => s,
            Self::WorstCase(s) => s,
            Self::RandomSampling(s) => s,
            Self::ImportanceSampling(s) => s,
            Self::Single(s) => s,
            Self::Custom(s) => s.as_ref(),
        }
    }
}

impl ScenarioStrategy for ScenarioPolicy {
    fn enumerate(&self, ctx: &EnumerationContext<'_>) -> Result<Enumeration, ScenarioError> {
        let enumeration = self.as_strategy().enumerate(ctx)?;
        tracing::debug!(
            policy = self.name(),
            phases = ctx.params.num_ct_phases(),
            scenarios = enumeration.len(),
            "enumerated scenarios"
        );
        Ok(enumeration)
    }

    fn name(&self) -> &'static str {
        self.as_strategy().name()
    }

    fn kind(&self) -> PolicyKind {
        self.as_strategy().kind()
    }
}

impl From<NominalScenario> for ScenarioPolicy {
    fn from(s: NominalScenario) -> Self {
        Self::Nominal(s)
    }
}

impl From<WorstCaseScenarios> for ScenarioPolicy {
    fn from(s: WorstCaseScenarios) -> Self {
        Self::WorstCase(s)
    }
}

impl From<RandomScenarios> for ScenarioPolicy {
    fn from(s: RandomScenarios) -> Self {
        Self::RandomSampling(s)
    }
}

impl From<ImportanceScenarios> for ScenarioPolicy {
    fn from(s: ImportanceScenarios) -> Self {
        Self::ImportanceSampling(s)
    }
}

impl From<SingleScenario> for ScenarioPolicy {
    fn from(s: SingleScenario) -> Self {
        Self::Single(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsm_core::{ScenarioEntry, UncertaintyParameters};

    #[derive(Debug)]
    struct EveryOtherPhase;

    impl ScenarioStrategy for EveryOtherPhase {
        fn enumerate(&self, ctx: &EnumerationContext<'_>) -> Result<Enumeration, ScenarioError> {
            let points = ctx
                .phases()?
                .iter()
                .step_by(2)
                .map(|p| crate::ScenarioPoint {
                    subscript: rsm_core::Subscript::new(p.ct_index(), 0, 0),
                    entry: ScenarioEntry::nominal(p.phase, p.probability),
                })
                .collect();
            Ok(Enumeration {
                num_shift: 1,
                num_range: 1,
                points,
            })
        }

        fn name(&self) -> &'static str {
            "every_other"
        }
    }

    #[test]
    fn dispatch_reports_inner_name_and_kind() {
        let policy = ScenarioPolicy::from(WorstCaseScenarios::new());
        assert_eq!(policy.name(), "worst_case");
        assert_eq!(policy.kind(), PolicyKind::WorstCase);
        assert_eq!(ScenarioPolicy::default().kind(), PolicyKind::Nominal);
    }

    #[test]
    fn custom_strategy() {
        let policy = ScenarioPolicy::custom(EveryOtherPhase);
        let params = UncertaintyParameters::for_phases(4);
        let e = policy.enumerate(&EnumerationContext::new(&params, 4)).unwrap();
        assert_eq!(e.len(), 2);
        assert_eq!(policy.kind(), PolicyKind::Custom);
        assert_eq!(policy.name(), "every_other");
    }

    #[test]
    fn dispatch_matches_direct_call() {
        let params = UncertaintyParameters::for_phases(2);
        let ctx = EnumerationContext::new(&params, 2);
        let direct = WorstCaseScenarios::new().enumerate(&ctx).unwrap();
        let dispatched = ScenarioPolicy::from(WorstCaseScenarios::new())
            .enumerate(&ctx)
            .unwrap();
        assert_eq!(direct, dispatched);
    }
}
