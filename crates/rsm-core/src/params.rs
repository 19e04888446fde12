//! Statistical uncertainty parameters
//!
//! Provides [`UncertaintyParameters`], the validated leaf data holder every
//! scenario policy reads from. Setters are atomic: a rejected value leaves the
//! previous one in effect.

use crate::error::ScenarioError;
use serde::Serialize;

/// Default relative range standard deviation (%)
pub const DEFAULT_RANGE_REL_SD: f64 = 3.5;

/// Default absolute range standard deviation (mm)
pub const DEFAULT_RANGE_ABS_SD: f64 = 1.0;

/// Default setup shift standard deviation per axis (mm)
pub const DEFAULT_SHIFT_SD: [f64; 3] = [2.25, 2.25, 2.25];

/// Default worst-case sigma multiplier
pub const DEFAULT_WC_SIGMA: f64 = 1.0;

/// Probability assigned to one CT phase
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CtPhaseProbability {
    /// 1-based phase identifier
    pub phase: u32,
    /// Phase probability in `[0, 1]`
    pub probability: f64,
}

impl CtPhaseProbability {
    /// Create new phase probability entry
    #[inline]
    #[must_use]
    pub fn new(phase: u32, probability: f64) -> Self {
        Self { phase, probability }
    }

    /// 0-based CT subscript of this phase
    #[inline]
    #[must_use]
    pub fn ct_index(&self) -> usize {
        self.phase as usize - 1
    }
}

/// Validated statistical parameters of the uncertainty model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UncertaintyParameters {
    range_rel_sd: f64,
    range_abs_sd: f64,
    shift_sd: [f64; 3],
    wc_sigma: f64,
    /// Sorted by phase, unique phases
    ct_phase_probabilities: Vec<CtPhaseProbability>,
}

impl Default for UncertaintyParameters {
    fn default() -> Self {
        Self::for_phases(1)
    }
}

impl UncertaintyParameters {
    /// Default parameters with a single CT phase
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Default parameters with uniform probability over phases `1..=num_phases`
    ///
    /// `num_phases == 0` yields an empty phase table, which no policy can
    /// enumerate.
    #[must_use]
    pub fn for_phases(num_phases: usize) -> Self {
        let p = if num_phases == 0 {
            0.0
        } else {
            1.0 / num_phases as f64
        };
        let ct_phase_probabilities = (1..=last_phase_id(num_phases))
            .map(|phase| CtPhaseProbability::new(phase, p))
            .collect();

        Self {
            range_rel_sd: DEFAULT_RANGE_REL_SD,
            range_abs_sd: DEFAULT_RANGE_ABS_SD,
            shift_sd: DEFAULT_SHIFT_SD,
            wc_sigma: DEFAULT_WC_SIGMA,
            ct_phase_probabilities,
        }
    }

    /// Relative range standard deviation (%)
    #[inline]
    #[must_use]
    pub fn range_rel_sd(&self) -> f64 {
        self.range_rel_sd
    }

    /// Absolute range standard deviation (mm)
    #[inline]
    #[must_use]
    pub fn range_abs_sd(&self) -> f64 {
        self.range_abs_sd
    }

    /// Setup shift standard deviation per axis (mm)
    #[inline]
    #[must_use]
    pub fn shift_sd(&self) -> [f64; 3] {
        self.shift_sd
    }

    /// Worst-case sigma multiplier
    #[inline]
    #[must_use]
    pub fn wc_sigma(&self) -> f64 {
        self.wc_sigma
    }

    /// Phase probabilities, sorted by phase
    #[inline]
    #[must_use]
    pub fn ct_phase_probabilities(&self) -> &[CtPhaseProbability] {
        &self.ct_phase_probabilities
    }

    /// Number of CT phases used by the model
    #[inline]
    #[must_use]
    pub fn num_ct_phases(&self) -> usize {
        self.ct_phase_probabilities.len()
    }

    /// Probability of `phase`, if the phase is modeled
    #[must_use]
    pub fn phase_probability(&self, phase: u32) -> Option<f64> {
        self.ct_phase_probabilities
            .binary_search_by_key(&phase, |p| p.phase)
            .ok()
            .map(|i| self.ct_phase_probabilities[i].probability)
    }

    /// Sum of all phase probabilities
    #[inline]
    #[must_use]
    pub fn total_phase_probability(&self) -> f64 {
        self.ct_phase_probabilities.iter().map(|p| p.probability).sum()
    }

    /// Set relative range standard deviation (%)
    ///
    /// # Errors
    /// `InvalidParameter` unless `value` is finite and non-negative
    pub fn set_range_rel_sd(&mut self, value: f64) -> Result<(), ScenarioError> {
        self.range_rel_sd = non_negative("rangeRelSD", value)?;
        Ok(())
    }

    /// Set absolute range standard deviation (mm)
    ///
    /// # Errors
    /// `InvalidParameter` unless `value` is finite and non-negative
    pub fn set_range_abs_sd(&mut self, value: f64) -> Result<(), ScenarioError> {
        self.range_abs_sd = non_negative("rangeAbsSD", value)?;
        Ok(())
    }

    /// Set worst-case sigma multiplier
    ///
    /// # Errors
    /// `InvalidParameter` unless `value` is finite and non-negative
    pub fn set_wc_sigma(&mut self, value: f64) -> Result<(), ScenarioError> {
        self.wc_sigma = non_negative("wcSigma", value)?;
        Ok(())
    }

    /// Set setup shift standard deviation, one value per axis (mm)
    ///
    /// # Errors
    /// `InvalidParameter` unless `values` has exactly three finite, positive entries
    pub fn set_shift_sd(&mut self, values: &[f64]) -> Result<(), ScenarioError> {
        let sd: [f64; 3] = values.try_into().map_err(|_| {
            ScenarioError::invalid_parameter(
                "shiftSD",
                format!("must be a 3-element vector, got {} elements", values.len()),
            )
        })?;

        if let Some(bad) = sd.iter().find(|v| !v.is_finite() || **v <= 0.0) {
            return Err(ScenarioError::invalid_parameter(
                "shiftSD",
                format!("entries must be finite and positive, got {bad}"),
            ));
        }

        self.shift_sd = sd;
        Ok(())
    }

    /// Set CT phase probabilities
    ///
    /// Entries are stored sorted by phase; insertion order is irrelevant.
    ///
    /// # Errors
    /// `InvalidParameter` if the table is empty, a phase is zero or repeated,
    /// or a probability lies outside `[0, 1]`. The probabilities need not sum
    /// to one.
    pub fn set_ct_phase_probabilities(
        &mut self,
        entries: &[CtPhaseProbability],
    ) -> Result<(), ScenarioError> {
        const FIELD: &str = "ctPhaseProbabilities";

        if entries.is_empty() {
            return Err(ScenarioError::invalid_parameter(
                FIELD,
                "must list at least one phase",
            ));
        }

        let mut sorted = entries.to_vec();
        sorted.sort_by_key(|p| p.phase);

        for (i, entry) in sorted.iter().enumerate() {
            if entry.phase == 0 {
                return Err(ScenarioError::invalid_parameter(
                    FIELD,
                    "phase indices must be positive integers",
                ));
            }
            if i > 0 && sorted[i - 1].phase == entry.phase {
                return Err(ScenarioError::invalid_parameter(
                    FIELD,
                    format!("phase {} listed more than once", entry.phase),
                ));
            }
            if !(0.0..=1.0).contains(&entry.probability) {
                return Err(ScenarioError::invalid_parameter(
                    FIELD,
                    format!(
                        "probability of phase {} must lie in [0, 1], got {}",
                        entry.phase, entry.probability
                    ),
                ));
            }
        }

        self.ct_phase_probabilities = sorted;
        Ok(())
    }

    /// Set CT phase probabilities from raw `[phase, probability]` rows
    ///
    /// # Errors
    /// `InvalidParameter` if a row does not have two columns or a phase index
    /// is not a positive integer, plus everything
    /// [`set_ct_phase_probabilities`](Self::set_ct_phase_probabilities) rejects
    pub fn set_ct_phase_table(&mut self, rows: &[Vec<f64>]) -> Result<(), ScenarioError> {
        let entries = parse_phase_rows(rows)?;
        self.set_ct_phase_probabilities(&entries)
    }
}

/// Convert raw two-column rows into phase probability entries
///
/// # Errors
/// `InvalidParameter` on a wrong row width or non-integral phase index
pub fn parse_phase_rows(rows: &[Vec<f64>]) -> Result<Vec<CtPhaseProbability>, ScenarioError> {
    rows.iter()
        .map(|row| {
            let [phase, probability] = row.as_slice() else {
                return Err(ScenarioError::invalid_parameter(
                    "ctPhaseProbabilities",
                    format!("rows must have two columns, got {}", row.len()),
                ));
            };
            if phase.fract() != 0.0 || *phase < 1.0 || *phase > f64::from(u32::MAX) {
                return Err(ScenarioError::invalid_parameter(
                    "ctPhaseProbabilities",
                    format!("phase index {phase} is not a positive integer"),
                ));
            }
            Ok(CtPhaseProbability::new(*phase as u32, *probability))
        })
        .collect()
}

/// Highest phase id representable for `num_phases` phases
///
/// Phase ids are `u32`; larger counts keep the first `u32::MAX` phases.
fn last_phase_id(num_phases: usize) -> u32 {
    u32::try_from(num_phases).unwrap_or(u32::MAX)
}

fn non_negative(field: &'static str, value: f64) -> Result<f64, ScenarioError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ScenarioError::invalid_parameter(
            field,
            format!("must be a non-negative scalar, got {value}"),
        ))
    }
}
