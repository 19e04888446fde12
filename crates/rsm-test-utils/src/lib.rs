//! Testing utilities for RSM workspace
//!
//! Shared test helpers, fixtures, and assertions.

#![allow(missing_docs)]

use rsm_core::{CtPhaseProbability, UncertaintyParameters};
use rsm_model::ScenarioModel;
use rsm_strategy::{ImportanceScenarios, NominalScenario, RandomScenarios, WorstCaseScenarios};
use std::io::Write;
use tempfile::NamedTempFile;

pub const TOLERANCE: f64 = 1e-9;

pub fn phase_probabilities(pairs: &[(u32, f64)]) -> Vec<CtPhaseProbability> {
    pairs
        .iter()
        .map(|(phase, p)| CtPhaseProbability::new(*phase, *p))
        .collect()
}

pub fn parameters_with_phases(pairs: &[(u32, f64)]) -> UncertaintyParameters {
    let mut params = UncertaintyParameters::new();
    params
        .set_ct_phase_probabilities(&phase_probabilities(pairs))
        .unwrap();
    params
}

/// Phases {1, 2} at 0.5 each, nominal policy
pub fn two_phase_nominal() -> ScenarioModel {
    ScenarioModel::with_parameters(
        NominalScenario::new(),
        parameters_with_phases(&[(1, 0.5), (2, 0.5)]),
        2,
    )
    .unwrap()
}

pub fn worst_case_model(phases: usize) -> ScenarioModel {
    ScenarioModel::new(WorstCaseScenarios::new(), phases).unwrap()
}

pub fn seeded_random_model(phases: usize, samples: usize, seed: u64) -> ScenarioModel {
    let policy = RandomScenarios::new().with_samples(samples).with_seed(seed);
    ScenarioModel::new(policy, phases).unwrap()
}

pub fn importance_model(phases: usize) -> ScenarioModel {
    ScenarioModel::new(ImportanceScenarios::new(), phases).unwrap()
}

/// One model per built-in policy on `phases` phases
pub fn all_policy_models(phases: usize) -> Vec<ScenarioModel> {
    vec![
        ScenarioModel::new(NominalScenario::new(), phases).unwrap(),
        worst_case_model(phases),
        seeded_random_model(phases, 7, 1234),
        importance_model(phases),
    ]
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() <= TOLERANCE,
        "expected {expected}, got {actual}"
    );
}

/// Mask, linear mask and table describe the same scenarios
pub fn assert_consistent(model: &ScenarioModel) {
    let realized = model.scenario_mask().iter().filter(|m| **m).count();
    assert_eq!(realized, model.total_scenarios());
    assert_eq!(model.linear_mask().len(), model.total_scenarios());
    for (entry, s) in model.table().iter().zip(model.linear_mask()) {
        assert_eq!(entry.ct_phase as usize, s.ct + 1);
    }
}

pub fn assert_probability_domain(model: &ScenarioModel) {
    for (n, entry) in model.table().iter().enumerate() {
        assert!(
            (0.0..=1.0).contains(&entry.probability),
            "scenario {} has probability {}",
            n + 1,
            entry.probability
        );
        assert!(entry.weight.abs() >= 0.0);
    }
}

/// Write `contents` to a temporary file ending in `.{extension}`
pub fn temp_config(contents: &str, extension: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(&format!(".{extension}"))
        .tempfile()
        .unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}
