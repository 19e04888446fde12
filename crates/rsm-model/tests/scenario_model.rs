//! Functional tests for the scenario model.
//!
//! Core guarantees exercised here:
//! - The scenario mask, the linear mask and the table always describe the same
//!   realized scenarios, in the same order.
//! - Each policy realizes the documented number of scenarios.
//! - Rejected mutations leave parameters and table untouched.
//! - Extraction copies a row verbatim into an independent model whose mask
//!   still spans every available CT phase.

use pretty_assertions::assert_eq;
use rsm_core::{ScenarioEntry, ScenarioError};
use rsm_model::ScenarioModel;
use rsm_strategy::{NominalScenario, PolicyKind, WorstCaseScenarios};
use rsm_test_utils::{
    all_policy_models, assert_close, assert_consistent, assert_probability_domain,
    importance_model, phase_probabilities, seeded_random_model, two_phase_nominal,
    worst_case_model,
};

/// Two phases at 0.5 each under the nominal policy give exactly two
/// unperturbed rows, one per phase.
#[test]
fn two_phase_nominal_table() {
    let model = two_phase_nominal();

    assert_eq!(
        model.table().entries(),
        &[ScenarioEntry::nominal(1, 0.5), ScenarioEntry::nominal(2, 0.5)]
    );
    assert_eq!(model.scenario_mask(), &[true, true]);
    assert_consistent(&model);
}

/// Nominal cardinality equals the number of modeled phases.
#[test]
fn nominal_cardinality() {
    for k in 1..=5 {
        let model = ScenarioModel::new(NominalScenario::new(), k).unwrap();
        assert_eq!(model.total_scenarios(), k);
        assert!(model.iso_shifts().iter().all(|s| *s == [0.0; 3]));
        assert_close(model.max_abs_range_shift(), 0.0);
        assert_close(model.max_rel_range_shift(), 0.0);
    }
}

/// Worst-case uses the star pattern: nominal, ± per shift axis, ± range.
#[test]
fn worst_case_cardinality() {
    for k in 1..=4 {
        let model = worst_case_model(k);
        assert_eq!(model.total_scenarios(), k * (1 + 2 * 3 + 2));
        assert_consistent(&model);
    }
}

/// Worst-case probabilities are unnormalized placeholders.
#[test]
fn worst_case_probabilities_are_placeholders() {
    let model = worst_case_model(2);
    assert_close(model.table().total_probability(), 9.0);
    assert!(model.scen_weight().iter().all(|w| *w == 1.0));
}

/// Every policy keeps probabilities in `[0, 1]` and masks consistent.
#[test]
fn probability_domain_all_policies() {
    for model in all_policy_models(3) {
        assert_probability_domain(&model);
        assert_consistent(&model);
    }
}

/// Sampling policies never exceed a total probability of one.
#[test]
fn sampling_totals_bounded() {
    assert!(seeded_random_model(3, 20, 5).table().total_probability() <= 1.0 + 1e-9);
    assert_close(importance_model(2).table().total_probability(), 1.0);
}

/// Re-enumeration with unchanged parameters reproduces the table exactly.
#[test]
fn enumerate_is_idempotent() {
    for mut model in all_policy_models(2) {
        let before = model.table().clone();
        let mask = model.scenario_mask().to_vec();
        model.enumerate().unwrap();
        assert_eq!(model.table(), &before);
        assert_eq!(model.scenario_mask(), mask.as_slice());
    }
}

/// A 2-element shiftSD is rejected and changes nothing.
#[test]
fn rejected_shift_sd_preserves_state() {
    let mut model = worst_case_model(2);
    model.set_shift_sd(&[1.0, 1.5, 2.0]).unwrap();
    let table = model.table().clone();

    let err = model.set_shift_sd(&[3.0, 3.0]).unwrap_err();

    assert!(matches!(
        err,
        ScenarioError::InvalidParameter { field: "shiftSD", .. }
    ));
    assert_eq!(model.parameters().shift_sd(), [1.0, 1.5, 2.0]);
    assert_eq!(model.table(), &table);
}

/// Negative scalars are rejected with the offending field named.
#[test]
fn rejected_scalars_name_field() {
    let mut model = worst_case_model(1);
    let err = model.set_range_rel_sd(-1.0).unwrap_err();
    assert!(err.to_string().contains("rangeRelSD"));
    let err = model.set_wc_sigma(f64::NAN).unwrap_err();
    assert!(err.to_string().contains("wcSigma"));
    assert_eq!(model.parameters().range_rel_sd(), 3.5);
}

/// Non-integral phase ids and wrong row widths are rejected.
#[test]
fn rejected_phase_tables() {
    let mut model = two_phase_nominal();
    assert!(model.set_ct_phase_table(&[vec![1.0, 0.5, 0.1]]).is_err());
    assert!(model.set_ct_phase_table(&[vec![1.2, 0.5]]).is_err());
    assert!(model
        .set_ct_phase_table(&[vec![1.0, 0.5], vec![1.0, 0.5]])
        .is_err());
    assert!(model.set_ct_phase_table(&[vec![2.0, -0.1]]).is_err());
    assert_eq!(model.total_scenarios(), 2);
}

/// Phase probabilities above one are rejected before any policy copies them
/// into the table.
#[test]
fn phase_probability_above_one_rejected() {
    let mut nominal = ScenarioModel::new(NominalScenario::new(), 2).unwrap();
    let err = nominal
        .set_ct_phase_probabilities(&phase_probabilities(&[(1, 2.0), (2, 6.0)]))
        .unwrap_err();
    assert!(matches!(
        err,
        ScenarioError::InvalidParameter { field: "ctPhaseProbabilities", .. }
    ));
    assert_eq!(nominal.scen_prob(), vec![0.5, 0.5]);

    let mut worst = worst_case_model(1);
    assert!(worst
        .set_ct_phase_probabilities(&phase_probabilities(&[(1, 3.0)]))
        .is_err());
    assert_probability_domain(&worst);

    worst
        .set_ct_phase_probabilities(&phase_probabilities(&[(1, 1.0)]))
        .unwrap();
    assert_probability_domain(&worst);
}

/// Modeling a phase the anatomy lacks fails enumeration and rolls back.
#[test]
fn phase_beyond_anatomy_rolls_back() {
    let mut model = two_phase_nominal();
    let err = model
        .set_ct_phase_probabilities(&phase_probabilities(&[(3, 1.0)]))
        .unwrap_err();

    assert!(matches!(err, ScenarioError::Enumeration(_)));
    assert_eq!(model.parameters().num_ct_phases(), 2);
    assert_eq!(model.total_scenarios(), 2);
}

/// Modeling a subset of phases leaves the others unrealized in the mask.
#[test]
fn subset_of_phases() {
    let mut model = worst_case_model(4);
    model.set_ct_phase_table(&[vec![2.0, 0.3], vec![4.0, 0.7]]).unwrap();

    assert_eq!(model.num_ct_scenarios(), 2);
    assert_eq!(model.num_available_ct_scenarios(), 4);
    assert_eq!(model.total_scenarios(), 18);
    assert_eq!(model.scenario_mask().len(), 4 * 7 * 3);
    assert_eq!(model.scenario(1).unwrap().ct_phase, 2);
    assert_eq!(model.linear_mask()[0].ct, 1);
    assert_consistent(&model);
}

/// Scenario numbers, linear indices and subscripts agree.
#[test]
fn lookup_roundtrip() {
    let model = worst_case_model(3);
    for (i, s) in model.linear_mask().iter().enumerate() {
        let linear = model
            .subscript_to_scenario_index(s.ct, s.shift, s.range)
            .unwrap();
        assert_eq!(model.scenario_number(linear).unwrap(), i + 1);
    }
    assert!(matches!(
        model.subscript_to_scenario_index(3, 0, 0),
        Err(ScenarioError::SubscriptOutOfBounds { .. })
    ));
    assert!(matches!(
        model.scenario_number(usize::MAX),
        Err(ScenarioError::NotFound { .. })
    ));
}

/// Extraction round-trip over every scenario of a worst-case model.
#[test]
fn extraction_roundtrip() {
    let parent = worst_case_model(3);
    let rows = parent.scen_for_prob();

    for n in 1..=parent.total_scenarios() {
        let single = parent.extract_single_scenario(n).unwrap();
        assert_eq!(single.scen_for_prob(), vec![rows[n - 1]]);
        assert_eq!(single.scenario_mask().iter().filter(|m| **m).count(), 1);
        assert_eq!(single.num_available_ct_scenarios(), 3);
        assert_eq!(single.kind(), PolicyKind::Single);
        assert_consistent(&single);
    }
}

/// The extracted mask marks the phase of the extracted scenario.
#[test]
fn extraction_marks_source_phase() {
    let parent = worst_case_model(3);
    // scenarios 10..=18 sit on phase 2
    let single = parent.extract_single_scenario(12).unwrap();
    assert_eq!(single.scenario_mask(), &[false, true, false]);
    assert_eq!(single.scenario(1).unwrap().ct_phase, 2);
}

/// Mutating the parent after extraction does not affect the extracted model.
#[test]
fn extraction_independent_of_parent() {
    let mut parent = worst_case_model(2);
    let single = parent.extract_single_scenario(3).unwrap();
    let row = *single.scenario(1).unwrap();

    parent.set_wc_sigma(2.5).unwrap();
    assert_eq!(single.scenario(1).unwrap(), &row);
    assert_ne!(parent.scenario(3).unwrap(), &row);
}

/// An extracted model keeps parameters and table in agreement after every
/// attempted change.
#[test]
fn extracted_model_never_goes_stale() {
    let parent = worst_case_model(3);
    let mut single = parent.extract_single_scenario(12).unwrap();

    assert!(single
        .set_ct_phase_probabilities(&phase_probabilities(&[(1, 1.0)]))
        .is_err());
    assert!(single.set_shift_sd(&[9.0, 9.0, 9.0]).is_err());

    let row = single.scenario(1).unwrap();
    assert_eq!(row.ct_phase, 2);
    assert!(single.parameters().phase_probability(row.ct_phase).is_some());
    assert_eq!(single.parameters().shift_sd(), parent.parameters().shift_sd());
    assert_eq!(single.scenario_mask(), &[false, true, false]);
}

/// Switching policy keeps parameters and re-enumerates.
#[test]
fn policy_switch() {
    let mut model = two_phase_nominal();
    model.set_policy(WorstCaseScenarios::new()).unwrap();
    assert_eq!(model.total_scenarios(), 18);
    assert_eq!(model.parameters().phase_probability(2), Some(0.5));
}
