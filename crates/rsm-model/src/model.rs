//! Scenario model
//!
//! [`ScenarioModel`] owns the uncertainty parameters, the policy, the index
//! space and the scenario table. Every mutation runs a full re-enumeration
//! before returning; a mutation that fails leaves the previous state intact.

use rsm_core::{
    CtPhaseProbability, IndexDims, ScenarioEntry, ScenarioError, ScenarioIndexSpace,
    ScenarioTable, Subscript, UncertaintyParameters,
};
use rsm_strategy::{EnumerationContext, PolicyKind, ScenarioPolicy, ScenarioStrategy};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

/// Enumerated scenario set with its parameters and policy
#[derive(Debug, Clone)]
pub struct ScenarioModel {
    parameters: UncertaintyParameters,
    available_ct_phases: usize,
    policy: ScenarioPolicy,
    index_space: ScenarioIndexSpace,
    table: ScenarioTable,
}

/// Index space and table of one successful enumeration
struct Enumerated {
    index_space: ScenarioIndexSpace,
    table: ScenarioTable,
}

impl ScenarioModel {
    /// Create model with default parameters, uniform over `available_ct_phases`
    ///
    /// # Errors
    /// `Enumeration` if the policy cannot enumerate (e.g. no available phase)
    pub fn new(
        policy: impl Into<ScenarioPolicy>,
        available_ct_phases: usize,
    ) -> Result<Self, ScenarioError> {
        Self::with_parameters(
            policy,
            UncertaintyParameters::for_phases(available_ct_phases),
            available_ct_phases,
        )
    }

    /// Create model from explicit parameters
    ///
    /// # Errors
    /// `Enumeration` if the policy cannot enumerate the parameters
    pub fn with_parameters(
        policy: impl Into<ScenarioPolicy>,
        parameters: UncertaintyParameters,
        available_ct_phases: usize,
    ) -> Result<Self, ScenarioError> {
        let policy = policy.into();
        let Enumerated { index_space, table } =
            enumerate_with(&policy, &parameters, available_ct_phases)?;

        tracing::info!(
            policy = policy.name(),
            available_ct_phases,
            scenarios = table.len(),
            "created scenario model"
        );

        Ok(Self {
            parameters,
            available_ct_phases,
            policy,
            index_space,
            table,
        })
    }

    /// Start building a model
    #[inline]
    #[must_use]
    pub fn builder() -> ScenarioModelBuilder {
        ScenarioModelBuilder::new()
    }

    /// Re-run the policy on the current parameters
    ///
    /// Idempotent: with unchanged parameters the table is reproduced exactly.
    ///
    /// # Errors
    /// `Enumeration` if the policy fails; the previous table is retained
    pub fn enumerate(&mut self) -> Result<&ScenarioTable, ScenarioError> {
        self.commit(
            self.parameters.clone(),
            self.available_ct_phases,
            self.policy.clone(),
        )?;
        Ok(&self.table)
    }

    /// Rebuild this model with another policy, keeping the parameters
    ///
    /// # Errors
    /// `Enumeration` if the new policy cannot enumerate the parameters
    pub fn with_policy(self, policy: impl Into<ScenarioPolicy>) -> Result<Self, ScenarioError> {
        Self::with_parameters(policy, self.parameters, self.available_ct_phases)
    }

    /// Switch policy in place
    ///
    /// # Errors
    /// `Enumeration` if the new policy fails; the model keeps the old policy
    pub fn set_policy(&mut self, policy: impl Into<ScenarioPolicy>) -> Result<(), ScenarioError> {
        self.commit(self.parameters.clone(), self.available_ct_phases, policy.into())
    }

    /// Replace the whole parameter set with one re-enumeration
    ///
    /// # Errors
    /// `InvalidParameter` if a single-scenario model would change a frozen
    /// statistic, `Enumeration` if the policy rejects the parameters; nothing
    /// changes on error
    pub fn update_parameters(
        &mut self,
        parameters: UncertaintyParameters,
    ) -> Result<(), ScenarioError> {
        let current = &self.parameters;
        let changed = [
            ("rangeRelSD", parameters.range_rel_sd() != current.range_rel_sd()),
            ("rangeAbsSD", parameters.range_abs_sd() != current.range_abs_sd()),
            ("shiftSD", parameters.shift_sd() != current.shift_sd()),
            ("wcSigma", parameters.wc_sigma() != current.wc_sigma()),
        ];
        for (field, differs) in changed {
            if differs {
                self.ensure_recomputable(field)?;
            }
        }
        self.commit(parameters, self.available_ct_phases, self.policy.clone())
    }

    /// Set the number of CT phases available in the anatomy
    ///
    /// Modeled phase probabilities are left as they are.
    ///
    /// # Errors
    /// `Enumeration` if a modeled phase no longer exists; nothing changes
    pub fn set_available_ct_phases(&mut self, available: usize) -> Result<(), ScenarioError> {
        self.commit(self.parameters.clone(), available, self.policy.clone())
    }

    /// Set relative range standard deviation (%)
    ///
    /// # Errors
    /// `InvalidParameter` on a negative value or on a single-scenario model,
    /// `Enumeration` if re-enumeration fails; the model is unchanged on error
    pub fn set_range_rel_sd(&mut self, value: f64) -> Result<(), ScenarioError> {
        self.ensure_recomputable("rangeRelSD")?;
        self.modify(|p| p.set_range_rel_sd(value))
    }

    /// Set absolute range standard deviation (mm)
    ///
    /// # Errors
    /// Same as [`set_range_rel_sd`](Self::set_range_rel_sd)
    pub fn set_range_abs_sd(&mut self, value: f64) -> Result<(), ScenarioError> {
        self.ensure_recomputable("rangeAbsSD")?;
        self.modify(|p| p.set_range_abs_sd(value))
    }

    /// Set setup shift standard deviation per axis (mm)
    ///
    /// # Errors
    /// `InvalidParameter` unless exactly three positive values are given, or on
    /// a single-scenario model
    pub fn set_shift_sd(&mut self, values: &[f64]) -> Result<(), ScenarioError> {
        self.ensure_recomputable("shiftSD")?;
        self.modify(|p| p.set_shift_sd(values))
    }

    /// Set worst-case sigma multiplier
    ///
    /// # Errors
    /// `InvalidParameter` on a negative value or on a single-scenario model
    pub fn set_wc_sigma(&mut self, value: f64) -> Result<(), ScenarioError> {
        self.ensure_recomputable("wcSigma")?;
        self.modify(|p| p.set_wc_sigma(value))
    }

    /// Set CT phase probabilities
    ///
    /// # Errors
    /// `InvalidParameter` on an invalid table, `Enumeration` if a phase does
    /// not exist in the anatomy
    pub fn set_ct_phase_probabilities(
        &mut self,
        entries: &[CtPhaseProbability],
    ) -> Result<(), ScenarioError> {
        self.modify(|p| p.set_ct_phase_probabilities(entries))
    }

    /// Set CT phase probabilities from raw `[phase, probability]` rows
    ///
    /// # Errors
    /// Same as [`set_ct_phase_probabilities`](Self::set_ct_phase_probabilities)
    pub fn set_ct_phase_table(&mut self, rows: &[Vec<f64>]) -> Result<(), ScenarioError> {
        self.modify(|p| p.set_ct_phase_table(rows))
    }

    /// Single-scenario models replay a frozen row, so the statistics it was
    /// drawn from cannot change
    fn ensure_recomputable(&self, field: &'static str) -> Result<(), ScenarioError> {
        if self.kind() == PolicyKind::Single {
            return Err(ScenarioError::invalid_parameter(
                field,
                "frozen in a single-scenario model; switch policy to recompute",
            ));
        }
        Ok(())
    }

    fn modify<F>(&mut self, f: F) -> Result<(), ScenarioError>
    where
        F: FnOnce(&mut UncertaintyParameters) -> Result<(), ScenarioError>,
    {
        let mut candidate = self.parameters.clone();
        f(&mut candidate)?;
        self.commit(candidate, self.available_ct_phases, self.policy.clone())
    }

    /// Enumerate a candidate state and swap it in only on success
    fn commit(
        &mut self,
        parameters: UncertaintyParameters,
        available_ct_phases: usize,
        policy: ScenarioPolicy,
    ) -> Result<(), ScenarioError> {
        match enumerate_with(&policy, &parameters, available_ct_phases) {
            Ok(Enumerated { index_space, table }) => {
                self.parameters = parameters;
                self.available_ct_phases = available_ct_phases;
                self.policy = policy;
                self.index_space = index_space;
                self.table = table;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(
                    policy = policy.name(),
                    error = %e,
                    "re-enumeration failed, keeping last valid scenarios"
                );
                Err(e)
            }
        }
    }

    /// Current parameters
    #[inline]
    #[must_use]
    pub fn parameters(&self) -> &UncertaintyParameters {
        &self.parameters
    }

    /// Current policy
    #[inline]
    #[must_use]
    pub fn policy(&self) -> &ScenarioPolicy {
        &self.policy
    }

    /// Classification of the current policy
    #[inline]
    #[must_use]
    pub fn kind(&self) -> PolicyKind {
        self.policy.kind()
    }

    /// Scenario table
    #[inline]
    #[must_use]
    pub fn table(&self) -> &ScenarioTable {
        &self.table
    }

    /// Index space
    #[inline]
    #[must_use]
    pub fn index_space(&self) -> &ScenarioIndexSpace {
        &self.index_space
    }

    /// Number of realized scenarios
    #[inline]
    #[must_use]
    pub fn total_scenarios(&self) -> usize {
        self.table.len()
    }

    /// Number of CT phases carrying scenarios
    #[inline]
    #[must_use]
    pub fn num_ct_scenarios(&self) -> usize {
        self.index_space.num_used_ct()
    }

    /// Number of CT phases in the anatomy
    #[inline]
    #[must_use]
    pub fn num_available_ct_scenarios(&self) -> usize {
        self.available_ct_phases
    }

    /// Extent of the shift axis
    #[inline]
    #[must_use]
    pub fn total_shift_scenarios(&self) -> usize {
        self.index_space.num_shift()
    }

    /// Extent of the range axis
    #[inline]
    #[must_use]
    pub fn total_range_scenarios(&self) -> usize {
        self.index_space.num_range()
    }

    /// Largest absolute range error magnitude (mm)
    #[inline]
    #[must_use]
    pub fn max_abs_range_shift(&self) -> f64 {
        self.table.max_abs_range_shift()
    }

    /// Largest relative range error magnitude (%)
    #[inline]
    #[must_use]
    pub fn max_rel_range_shift(&self) -> f64 {
        self.table.max_rel_range_shift()
    }

    /// Isocenter shift of every scenario
    #[inline]
    #[must_use]
    pub fn iso_shifts(&self) -> Vec<[f64; 3]> {
        self.table.iso_shifts()
    }

    /// Rows `[x, y, z, absRange, relRange]`
    #[inline]
    #[must_use]
    pub fn scen_for_prob(&self) -> Vec<[f64; 5]> {
        self.table.scen_for_prob()
    }

    /// Probability vector
    #[inline]
    #[must_use]
    pub fn scen_prob(&self) -> Vec<f64> {
        self.table.probabilities()
    }

    /// Weight vector
    #[inline]
    #[must_use]
    pub fn scen_weight(&self) -> Vec<f64> {
        self.table.weights()
    }

    /// Realized-scenario mask
    #[inline]
    #[must_use]
    pub fn scenario_mask(&self) -> &[bool] {
        self.index_space.mask()
    }

    /// Realized subscripts, one per table row
    #[inline]
    #[must_use]
    pub fn linear_mask(&self) -> &[Subscript] {
        self.index_space.linear_mask()
    }

    /// Scenario by 1-based number
    ///
    /// # Errors
    /// `OutOfRange` outside `[1, total]`
    pub fn scenario(&self, number: usize) -> Result<&ScenarioEntry, ScenarioError> {
        self.table.get(number)
    }

    /// 1-based scenario number of a realized linear index
    ///
    /// # Errors
    /// `NotFound` if the index is not realized
    pub fn scenario_number(&self, linear_index: usize) -> Result<usize, ScenarioError> {
        self.index_space.scenario_number(linear_index)
    }

    /// Linear index of a 0-based `(ct, shift, range)` subscript
    ///
    /// # Errors
    /// `SubscriptOutOfBounds` outside the index space
    pub fn subscript_to_scenario_index(
        &self,
        ct: usize,
        shift: usize,
        range: usize,
    ) -> Result<usize, ScenarioError> {
        self.index_space
            .subscript_to_linear(Subscript::new(ct, shift, range))
    }

    /// Scenario at a 0-based `(ct, shift, range)` subscript
    ///
    /// # Errors
    /// `SubscriptOutOfBounds` outside the index space, `NotFound` if nothing
    /// is realized there
    pub fn scenario_at(
        &self,
        ct: usize,
        shift: usize,
        range: usize,
    ) -> Result<&ScenarioEntry, ScenarioError> {
        let linear = self.subscript_to_scenario_index(ct, shift, range)?;
        let number = self.scenario_number(linear)?;
        self.table.get(number)
    }
}

/// Run a policy and order its points by scan order of the mask
fn enumerate_with(
    policy: &ScenarioPolicy,
    parameters: &UncertaintyParameters,
    available_ct_phases: usize,
) -> Result<Enumerated, ScenarioError> {
    let mut enumeration =
        policy.enumerate(&EnumerationContext::new(parameters, available_ct_phases))?;

    if enumeration.is_empty() {
        return Err(ScenarioError::enumeration(format!(
            "policy `{}` realized no scenarios",
            policy.name()
        )));
    }

    let dims = IndexDims::new(
        available_ct_phases,
        enumeration.num_shift,
        enumeration.num_range,
    );
    let index_space =
        ScenarioIndexSpace::from_realized(dims, enumeration.points.iter().map(|p| p.subscript))?;

    // Table rows follow the linear mask
    enumeration
        .points
        .sort_by_key(|p| dims.linear(p.subscript));
    let table = ScenarioTable::new(enumeration.points.into_iter().map(|p| p.entry).collect());

    Ok(Enumerated { index_space, table })
}

impl Serialize for ScenarioModel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ScenarioModel", 5)?;
        state.serialize_field("policy", self.policy.name())?;
        state.serialize_field("available_ct_phases", &self.available_ct_phases)?;
        state.serialize_field("parameters", &self.parameters)?;
        state.serialize_field("index_space", &self.index_space)?;
        state.serialize_field("scenarios", &self.table)?;
        state.end()
    }
}

/// Builder for [`ScenarioModel`]
#[derive(Debug, Default)]
pub struct ScenarioModelBuilder {
    policy: Option<ScenarioPolicy>,
    parameters: Option<UncertaintyParameters>,
    available_ct_phases: Option<usize>,
}

impl ScenarioModelBuilder {
    /// Create new builder
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set policy (default: nominal)
    #[inline]
    #[must_use]
    pub fn policy(mut self, policy: impl Into<ScenarioPolicy>) -> Self {
        self.policy = Some(policy.into());
        self
    }

    /// Set parameters (default: uniform over the available phases)
    #[inline]
    #[must_use]
    pub fn parameters(mut self, parameters: UncertaintyParameters) -> Self {
        self.parameters = Some(parameters);
        self
    }

    /// Set number of CT phases in the anatomy (default: 1)
    #[inline]
    #[must_use]
    pub fn available_ct_phases(mut self, available: usize) -> Self {
        self.available_ct_phases = Some(available);
        self
    }

    /// Build and enumerate the model
    ///
    /// # Errors
    /// `Enumeration` if the policy cannot enumerate the parameters
    pub fn build(self) -> Result<ScenarioModel, ScenarioError> {
        let available = self.available_ct_phases.unwrap_or(1);
        let parameters = self
            .parameters
            .unwrap_or_else(|| UncertaintyParameters::for_phases(available));
        ScenarioModel::with_parameters(self.policy.unwrap_or_default(), parameters, available)
    }
}
