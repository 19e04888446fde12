//! RSM Strategy
//!
//! Pluggable scenario enumeration policies.
//!
//! # Core Concepts
//!
//! - [`ScenarioStrategy`]: Core trait turning parameters into realized scenarios
//! - [`NominalScenario`]: One unperturbed scenario per CT phase
//! - [`WorstCaseScenarios`]: ± sigma extremes, star or full grid
//! - [`RandomScenarios`]: Gaussian samples with a fixed seed
//! - [`ImportanceScenarios`]: Density-weighted sigma grid
//! - [`SingleScenario`]: One frozen row, used by extracted models
//! - [`ScenarioPolicy`]: Tagged dispatch over the above plus custom strategies
//! - [`PolicyRegistry`]: Name-based policy selection
//!
//! # Example
//!
//! ```rust
//! use rsm_core::UncertaintyParameters;
//! use rsm_strategy::{EnumerationContext, PolicyRegistry, ScenarioStrategy};
//!
//! let registry = PolicyRegistry::with_defaults();
//! let policy = registry.create("wcScen").unwrap();
//!
//! let params = UncertaintyParameters::for_phases(2);
//! let enumeration = policy.enumerate(&EnumerationContext::new(&params, 2)).unwrap();
//! assert_eq!(enumeration.len(), 18);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

// Policy implementations
mod grid;
mod importance;
mod nominal;
mod policy;
mod random;
mod registry;
mod single;
mod strategy;
mod worst_case;

// Re-exports
pub use grid::Combinations;
pub use importance::{ImportanceScenarios, DEFAULT_MULTIPLES};
pub use nominal::NominalScenario;
pub use policy::ScenarioPolicy;
pub use random::{RandomScenarios, DEFAULT_SAMPLES, MAX_SAMPLES};
pub use registry::PolicyRegistry;
pub use single::SingleScenario;
pub use strategy::{Enumeration, EnumerationContext, PolicyKind, ScenarioPoint, ScenarioStrategy};
pub use worst_case::WorstCaseScenarios;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for scenario policies
    pub use crate::{
        Combinations, EnumerationContext, ImportanceScenarios, NominalScenario, PolicyKind,
        PolicyRegistry, RandomScenarios, ScenarioPolicy, ScenarioStrategy, WorstCaseScenarios,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;
    use proptest::prelude::*;
    use rsm_core::UncertaintyParameters;
    use std::collections::HashSet;

    fn all_policies() -> Vec<ScenarioPolicy> {
        vec![
            NominalScenario::new().into(),
            WorstCaseScenarios::new().into(),
            WorstCaseScenarios::new()
                .with_combinations(Combinations::Shift)
                .into(),
            RandomScenarios::new().with_samples(6).with_seed(17).into(),
            ImportanceScenarios::new()
                .with_combinations(Combinations::None)
                .into(),
        ]
    }

    #[test]
    fn registry_integration() {
        let registry = PolicyRegistry::with_defaults();
        let params = UncertaintyParameters::for_phases(3);
        let ctx = EnumerationContext::new(&params, 3);

        for name in registry.names() {
            let policy = registry.create(name).unwrap();
            assert_eq!(policy.name(), name);
            assert!(!policy.enumerate(&ctx).unwrap().is_empty());
        }
    }

    #[test]
    fn subscripts_are_unique_and_in_bounds() {
        let params = UncertaintyParameters::for_phases(3);
        let ctx = EnumerationContext::new(&params, 4);

        for policy in all_policies() {
            let e = policy.enumerate(&ctx).unwrap();
            let mut seen = HashSet::new();
            for p in &e.points {
                assert!(p.subscript.ct < 4);
                assert!(p.subscript.shift < e.num_shift);
                assert!(p.subscript.range < e.num_range);
                assert!(seen.insert(p.subscript), "{} repeats {}", policy.name(), p.subscript);
                assert_eq!(p.subscript.ct + 1, p.entry.ct_phase as usize);
            }
        }
    }

    #[test]
    fn enumeration_is_deterministic() {
        let params = UncertaintyParameters::for_phases(2);
        let ctx = EnumerationContext::new(&params, 2);
        for policy in all_policies() {
            assert_eq!(policy.enumerate(&ctx).unwrap(), policy.enumerate(&ctx).unwrap());
        }
    }

    #[test]
    fn nominal_vs_worst_case_first_row() {
        let params = UncertaintyParameters::for_phases(2);
        let ctx = EnumerationContext::new(&params, 2);
        let nominal = NominalScenario::new().enumerate(&ctx).unwrap();
        let wc = WorstCaseScenarios::new().enumerate(&ctx).unwrap();
        assert_eq!(nominal.points[0].entry.iso_shift, wc.points[0].entry.iso_shift);
        assert_eq!(nominal.points[0].subscript, wc.points[0].subscript);
    }

    proptest! {
        #[test]
        fn prop_worst_case_star_cardinality(k in 1usize..6, extra in 0usize..3) {
            let params = UncertaintyParameters::for_phases(k);
            let e = WorstCaseScenarios::new()
                .enumerate(&EnumerationContext::new(&params, k + extra))
                .unwrap();
            prop_assert_eq!(e.len(), k * 9);
        }

        #[test]
        fn prop_importance_sums_to_one(k in 1usize..4, combine in any::<bool>()) {
            let params = UncertaintyParameters::for_phases(k);
            let e = ImportanceScenarios::new()
                .with_combine_range(combine)
                .with_multiples(vec![-1.0, 0.0, 1.0])
                .enumerate(&EnumerationContext::new(&params, k))
                .unwrap();
            let total: f64 = e.points.iter().map(|p| p.entry.probability).sum();
            prop_assert!((total - 1.0).abs() < 1e-9);
        }

        #[test]
        fn prop_random_probabilities_bounded(n in 1usize..30, seed in any::<u64>()) {
            let params = UncertaintyParameters::for_phases(2);
            let e = RandomScenarios::new()
                .with_samples(n)
                .with_seed(seed)
                .enumerate(&EnumerationContext::new(&params, 2))
                .unwrap();
            prop_assert_eq!(e.len(), 2 * n);
            for p in &e.points {
                prop_assert!(p.entry.probability >= 0.0 && p.entry.probability <= 1.0);
            }
        }
    }
}
