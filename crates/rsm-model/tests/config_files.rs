//! Functional tests for loading model configurations from disk.

use pretty_assertions::assert_eq;
use rsm_core::ScenarioError;
use rsm_model::ModelConfig;
use rsm_strategy::PolicyKind;
use rsm_test_utils::{assert_consistent, temp_config};

#[test]
fn load_toml_file() {
    let file = temp_config(
        r#"
        model = "impScen"
        available_ct_phases = 2

        [parameters]
        range_abs_sd = 0.0

        [importance]
        multiples = [-1.0, 0.0, 1.0]
        combinations = "none"
        "#,
        "toml",
    );

    let model = ModelConfig::from_path(file.path()).unwrap().build().unwrap();
    assert_eq!(model.kind(), PolicyKind::ImportanceSampling);
    // nominal + 2 per shift axis + 2 range points, per phase
    assert_eq!(model.total_scenarios(), 2 * 9);
    assert_consistent(&model);
}

#[test]
fn load_json_file() {
    let file = temp_config(
        r#"{
            "model": "random",
            "available_ct_phases": 3,
            "random": { "samples": 5, "seed": 77, "include_nominal": false }
        }"#,
        "json",
    );

    let config = ModelConfig::from_path(file.path()).unwrap();
    assert_eq!(config.random.seed, Some(77));
    let model = config.build().unwrap();
    assert_eq!(model.total_scenarios(), 15);
    assert!(!model.scenario(1).unwrap().is_nominal());
}

#[test]
fn missing_file_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = ModelConfig::from_path(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ScenarioError::Config(_)));
}

#[test]
fn invalid_shift_sd_in_file() {
    let file = temp_config(
        r#"
        [parameters]
        shift_sd = [1.0, 2.0]
        "#,
        "toml",
    );
    let err = ModelConfig::from_path(file.path())
        .unwrap()
        .build()
        .unwrap_err();
    assert!(matches!(err, ScenarioError::InvalidParameter { field: "shiftSD", .. }));
}

#[test]
fn saved_config_reloads() {
    let config = ModelConfig {
        model: "wcScen".into(),
        available_ct_phases: 2,
        ..ModelConfig::default()
    };
    let file = temp_config(&config.to_toml_string().unwrap(), "toml");
    let reloaded = ModelConfig::from_path(file.path()).unwrap();

    assert_eq!(reloaded, config);
    assert_eq!(
        reloaded.build().unwrap().table(),
        config.build().unwrap().table()
    );
}
