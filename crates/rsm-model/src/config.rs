//! Model configuration
//!
//! [`ModelConfig`] is the serializable description of a scenario model, read
//! from TOML or JSON. Converting it into a [`ScenarioModel`] validates every
//! parameter and runs the first enumeration.
//!
//! ```toml
//! model = "wcScen"
//! available_ct_phases = 2
//!
//! [parameters]
//! shift_sd = [2.0, 2.0, 3.0]
//! ct_phase_probabilities = [[1, 0.5], [2, 0.5]]
//!
//! [worst_case]
//! combinations = "shift"
//! ```

use crate::model::ScenarioModel;
use rsm_core::{
    ScenarioError, UncertaintyParameters, DEFAULT_RANGE_ABS_SD, DEFAULT_RANGE_REL_SD,
    DEFAULT_SHIFT_SD, DEFAULT_WC_SIGMA,
};
use rsm_strategy::{
    ImportanceScenarios, NominalScenario, PolicyRegistry, RandomScenarios, ScenarioPolicy,
    WorstCaseScenarios, DEFAULT_SAMPLES,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Serializable scenario model description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Policy name or alias
    pub model: String,

    /// CT phases in the anatomy
    pub available_ct_phases: usize,

    /// Uncertainty parameters
    pub parameters: ParameterConfig,

    /// Worst-case policy options
    pub worst_case: WorstCaseScenarios,

    /// Random sampling options
    pub random: RandomConfig,

    /// Importance sampling options
    pub importance: ImportanceScenarios,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model: "nominal".to_string(),
            available_ct_phases: 1,
            parameters: ParameterConfig::default(),
            worst_case: WorstCaseScenarios::default(),
            random: RandomConfig::default(),
            importance: ImportanceScenarios::default(),
        }
    }
}

/// Uncertainty parameter section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterConfig {
    /// Relative range standard deviation (%)
    pub range_rel_sd: f64,

    /// Absolute range standard deviation (mm)
    pub range_abs_sd: f64,

    /// Setup shift standard deviation per axis (mm)
    pub shift_sd: Vec<f64>,

    /// Worst-case sigma multiplier
    pub wc_sigma: f64,

    /// Raw `[phase, probability]` rows; uniform over available phases if absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ct_phase_probabilities: Option<Vec<Vec<f64>>>,
}

impl Default for ParameterConfig {
    fn default() -> Self {
        Self {
            range_rel_sd: DEFAULT_RANGE_REL_SD,
            range_abs_sd: DEFAULT_RANGE_ABS_SD,
            shift_sd: DEFAULT_SHIFT_SD.to_vec(),
            wc_sigma: DEFAULT_WC_SIGMA,
            ct_phase_probabilities: None,
        }
    }
}

/// Random sampling section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomConfig {
    /// Samples per CT phase
    pub samples: usize,

    /// Fixed seed; drawn once at model construction if absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Force the first sample to the nominal scenario
    pub include_nominal: bool,
}

impl Default for RandomConfig {
    fn default() -> Self {
        Self {
            samples: DEFAULT_SAMPLES,
            seed: None,
            include_nominal: true,
        }
    }
}

impl RandomConfig {
    /// Build the sampling policy
    #[must_use]
    pub fn policy(&self) -> RandomScenarios {
        let policy = RandomScenarios::new()
            .with_samples(self.samples)
            .with_include_nominal(self.include_nominal);
        match self.seed {
            Some(seed) => policy.with_seed(seed),
            None => policy,
        }
    }
}

impl ModelConfig {
    /// Load configuration from a `.toml` or `.json` file
    ///
    /// # Errors
    /// `Config` if the file cannot be read or parsed
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ScenarioError::Config(format!("{}: {e}", path.display())))?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&text)
        } else {
            Self::from_toml_str(&text)
        }
    }

    /// Parse TOML configuration
    ///
    /// # Errors
    /// `Config` on malformed TOML or unknown field types
    pub fn from_toml_str(text: &str) -> Result<Self, ScenarioError> {
        toml::from_str(text).map_err(|e| ScenarioError::Config(e.to_string()))
    }

    /// Parse JSON configuration
    ///
    /// # Errors
    /// `Config` on malformed JSON
    pub fn from_json_str(text: &str) -> Result<Self, ScenarioError> {
        serde_json::from_str(text).map_err(|e| ScenarioError::Config(e.to_string()))
    }

    /// Serialize as TOML
    ///
    /// # Errors
    /// `Config` if the configuration cannot be represented in TOML
    pub fn to_toml_string(&self) -> Result<String, ScenarioError> {
        toml::to_string_pretty(self).map_err(|e| ScenarioError::Config(e.to_string()))
    }

    /// Validated uncertainty parameters
    ///
    /// # Errors
    /// `InvalidParameter` for the first rejected value
    pub fn uncertainty_parameters(&self) -> Result<UncertaintyParameters, ScenarioError> {
        let p = &self.parameters;
        let mut params = UncertaintyParameters::for_phases(self.available_ct_phases);
        params.set_range_rel_sd(p.range_rel_sd)?;
        params.set_range_abs_sd(p.range_abs_sd)?;
        params.set_shift_sd(&p.shift_sd)?;
        params.set_wc_sigma(p.wc_sigma)?;
        if let Some(rows) = &p.ct_phase_probabilities {
            params.set_ct_phase_table(rows)?;
        }
        Ok(params)
    }

    /// Resolve the configured policy
    ///
    /// Built-in names pick up their option sections. Any other name, and any
    /// built-in name whose factory was replaced in `registry`, is created from
    /// `registry`.
    ///
    /// # Errors
    /// `UnknownPolicy` if the name is not registered
    pub fn policy(&self, registry: &PolicyRegistry) -> Result<ScenarioPolicy, ScenarioError> {
        let name = registry
            .resolve(&self.model)
            .ok_or_else(|| ScenarioError::UnknownPolicy(self.model.clone()))?;

        if !registry.is_builtin(name) {
            return registry.create(name);
        }
        Ok(match name {
            "nominal" => NominalScenario::new().into(),
            "worst_case" => self.worst_case.into(),
            "random" => self.random.policy().into(),
            "importance" => self.importance.clone().into(),
            other => registry.create(other)?,
        })
    }

    /// Build and enumerate the model with the built-in policies
    ///
    /// # Errors
    /// Any parameter, policy or enumeration error
    pub fn build(&self) -> Result<ScenarioModel, ScenarioError> {
        self.build_with(&PolicyRegistry::with_defaults())
    }

    /// Build and enumerate the model resolving names in `registry`
    ///
    /// # Errors
    /// Any parameter, policy or enumeration error
    pub fn build_with(&self, registry: &PolicyRegistry) -> Result<ScenarioModel, ScenarioError> {
        let parameters = self.uncertainty_parameters()?;
        let policy = self.policy(registry)?;
        ScenarioModel::with_parameters(policy, parameters, self.available_ct_phases)
    }
}
