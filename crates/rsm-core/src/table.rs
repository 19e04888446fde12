//! Scenario table
//!
//! A [`ScenarioTable`] is the ordered list of realized scenarios produced by
//! one enumeration. Rows are identified by their 1-based scenario number.

use crate::error::ScenarioError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One realized scenario
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioEntry {
    /// 1-based CT phase identifier
    pub ct_phase: u32,

    /// Isocenter shift (mm)
    pub iso_shift: [f64; 3],

    /// Absolute range error (mm)
    pub abs_range_shift: f64,

    /// Relative range error (%)
    pub rel_range_shift: f64,

    /// Scenario probability in `[0, 1]`
    pub probability: f64,

    /// Policy-defined relative weight
    pub weight: f64,
}

impl ScenarioEntry {
    /// Nominal scenario (no shift, no range error) on `ct_phase`
    #[inline]
    #[must_use]
    pub fn nominal(ct_phase: u32, probability: f64) -> Self {
        Self {
            ct_phase,
            iso_shift: [0.0; 3],
            abs_range_shift: 0.0,
            rel_range_shift: 0.0,
            probability,
            weight: 1.0,
        }
    }

    /// Row `[x, y, z, absRange, relRange]`
    #[inline]
    #[must_use]
    pub fn scen_for_prob(&self) -> [f64; 5] {
        let [x, y, z] = self.iso_shift;
        [x, y, z, self.abs_range_shift, self.rel_range_shift]
    }

    /// Check if this row carries no perturbation
    #[inline]
    #[must_use]
    pub fn is_nominal(&self) -> bool {
        self.scen_for_prob().iter().all(|v| *v == 0.0)
    }
}

/// Ordered table of realized scenarios
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioTable {
    entries: Vec<ScenarioEntry>,
}

impl ScenarioTable {
    /// Create table from rows in scenario-number order
    #[inline]
    #[must_use]
    pub fn new(entries: Vec<ScenarioEntry>) -> Self {
        Self { entries }
    }

    /// Number of scenarios
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if table is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All rows
    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[ScenarioEntry] {
        &self.entries
    }

    /// Iterate over rows
    pub fn iter(&self) -> impl Iterator<Item = &ScenarioEntry> {
        self.entries.iter()
    }

    /// Row by 1-based scenario number
    ///
    /// # Errors
    /// `NotEnumerated` on an empty table, `OutOfRange` outside `[1, len]`
    pub fn get(&self, number: usize) -> Result<&ScenarioEntry, ScenarioError> {
        if self.entries.is_empty() {
            return Err(ScenarioError::NotEnumerated);
        }
        number
            .checked_sub(1)
            .and_then(|i| self.entries.get(i))
            .ok_or(ScenarioError::OutOfRange {
                number,
                total: self.entries.len(),
            })
    }

    /// Probability vector
    #[must_use]
    pub fn probabilities(&self) -> Vec<f64> {
        self.entries.iter().map(|e| e.probability).collect()
    }

    /// Weight vector
    #[must_use]
    pub fn weights(&self) -> Vec<f64> {
        self.entries.iter().map(|e| e.weight).collect()
    }

    /// Rows `[x, y, z, absRange, relRange]`
    #[must_use]
    pub fn scen_for_prob(&self) -> Vec<[f64; 5]> {
        self.entries.iter().map(ScenarioEntry::scen_for_prob).collect()
    }

    /// Isocenter shifts
    #[must_use]
    pub fn iso_shifts(&self) -> Vec<[f64; 3]> {
        self.entries.iter().map(|e| e.iso_shift).collect()
    }

    /// Sum of all probabilities
    #[must_use]
    pub fn total_probability(&self) -> f64 {
        self.entries.iter().map(|e| e.probability).sum()
    }

    /// Largest absolute range error magnitude (mm)
    #[must_use]
    pub fn max_abs_range_shift(&self) -> f64 {
        self.entries
            .iter()
            .map(|e| e.abs_range_shift.abs())
            .fold(0.0, f64::max)
    }

    /// Largest relative range error magnitude (%)
    #[must_use]
    pub fn max_rel_range_shift(&self) -> f64 {
        self.entries
            .iter()
            .map(|e| e.rel_range_shift.abs())
            .fold(0.0, f64::max)
    }
}

impl<'a> IntoIterator for &'a ScenarioTable {
    type Item = &'a ScenarioEntry;
    type IntoIter = std::slice::Iter<'a, ScenarioEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl fmt::Display for ScenarioTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>6} {:>5} {:>9} {:>9} {:>9} {:>10} {:>10} {:>10}",
            "#", "CT", "shift x", "shift y", "shift z", "range abs", "range rel", "prob"
        )?;
        writeln!(f, "{}", "-".repeat(75))?;
        for (i, e) in self.entries.iter().enumerate() {
            let [x, y, z] = e.iso_shift;
            writeln!(
                f,
                "{:>6} {:>5} {:>9.3} {:>9.3} {:>9.3} {:>10.3} {:>10.3} {:>10.6}",
                i + 1,
                e.ct_phase,
                x,
                y,
                z,
                e.abs_range_shift,
                e.rel_range_shift,
                e.probability
            )?;
        }
        Ok(())
    }
}
