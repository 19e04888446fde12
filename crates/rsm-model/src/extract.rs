//! Single-scenario extraction
//!
//! Dose is often computed one scenario at a time. Extraction turns one row of
//! a model into an independent model whose index space still spans every
//! available CT phase, so results map back onto the original anatomy.

use crate::model::ScenarioModel;
use rsm_core::{CtPhaseProbability, ScenarioEntry, ScenarioError};
use rsm_strategy::SingleScenario;

impl ScenarioModel {
    /// Extract scenario `number` (1-based) as a standalone model
    ///
    /// The extracted model models one CT phase, copies the row verbatim and
    /// realizes exactly one entry of a mask sized to the parent's available
    /// phases. It shares no state with `self`.
    ///
    /// Shift, range and `wcSigma` statistics are frozen: their setters fail
    /// with `InvalidParameter`. A phase table that drops the row's phase fails
    /// re-enumeration and is rolled back. Switching policy recomputes from
    /// the copied parameters.
    ///
    /// # Errors
    /// `OutOfRange` if `number` is outside `[1, total_scenarios]`
    pub fn extract_single_scenario(&self, number: usize) -> Result<ScenarioModel, ScenarioError> {
        let total = self.total_scenarios();
        if number == 0 || number > total {
            return Err(ScenarioError::OutOfRange { number, total });
        }

        let subscript = self.index_space().subscript_of(number)?;
        let phase = u32::try_from(subscript.ct + 1).map_err(|_| {
            ScenarioError::enumeration(format!("CT index {} does not fit a phase id", subscript.ct))
        })?;
        let row = ScenarioEntry {
            ct_phase: phase,
            ..*self.scenario(number)?
        };

        let phase_probability = self
            .parameters()
            .phase_probability(phase)
            .unwrap_or(row.probability);
        let mut parameters = self.parameters().clone();
        parameters
            .set_ct_phase_probabilities(&[CtPhaseProbability::new(phase, phase_probability)])?;

        let extracted = ScenarioModel::with_parameters(
            SingleScenario::new(row),
            parameters,
            self.num_available_ct_scenarios(),
        )?;

        tracing::info!(
            scenario = number,
            ct_phase = phase,
            parent_scenarios = total,
            "extracted single scenario"
        );
        Ok(extracted)
    }
}
