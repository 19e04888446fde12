//! Scenario strategy trait and core types
//!
//! Provides the [`ScenarioStrategy`] trait every enumeration policy implements,
//! the [`EnumerationContext`] it reads from and the [`Enumeration`] it returns.

use rsm_core::{CtPhaseProbability, ScenarioEntry, ScenarioError, Subscript, UncertaintyParameters};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Scenario enumeration policy
///
/// # Contract
/// `enumerate()` must be deterministic for a given context: calling it twice
/// with the same parameters yields the same points in the same order. It either
/// returns a complete enumeration or an error, never a partial one.
pub trait ScenarioStrategy: Send + Sync + fmt::Debug {
    /// Enumerate all realized scenarios for the given parameters
    ///
    /// # Errors
    /// `Enumeration` if the parameters cannot produce a consistent table
    fn enumerate(&self, ctx: &EnumerationContext<'_>) -> Result<Enumeration, ScenarioError>;

    /// Policy name (for logging/listing)
    fn name(&self) -> &'static str;

    /// Policy classification
    fn kind(&self) -> PolicyKind {
        PolicyKind::Custom
    }
}

/// Built-in policy classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    /// One unperturbed scenario per phase
    Nominal,

    /// Star or grid over ± sigma extremes
    WorstCase,

    /// Gaussian samples
    RandomSampling,

    /// Density-weighted sigma grid
    ImportanceSampling,

    /// Single scenario copied from another model
    Single,

    /// User-provided strategy
    Custom,
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nominal => write!(f, "nominal"),
            Self::WorstCase => write!(f, "worst_case"),
            Self::RandomSampling => write!(f, "random"),
            Self::ImportanceSampling => write!(f, "importance"),
            Self::Single => write!(f, "single"),
            Self::Custom => write!(f, "custom"),
        }
    }
}

/// Inputs of one enumeration
#[derive(Debug, Clone, Copy)]
pub struct EnumerationContext<'a> {
    /// Current uncertainty parameters
    pub params: &'a UncertaintyParameters,

    /// CT phases available in the source anatomy
    pub available_ct_phases: usize,
}

impl<'a> EnumerationContext<'a> {
    /// Create new context
    #[inline]
    #[must_use]
    pub fn new(params: &'a UncertaintyParameters, available_ct_phases: usize) -> Self {
        Self {
            params,
            available_ct_phases,
        }
    }

    /// Modeled phases, checked against the available anatomy
    ///
    /// # Errors
    /// `Enumeration` when no phase is available or a modeled phase does not
    /// exist in the anatomy
    pub fn phases(&self) -> Result<&'a [CtPhaseProbability], ScenarioError> {
        let phases = self.params.ct_phase_probabilities();

        if self.available_ct_phases == 0 {
            return Err(ScenarioError::enumeration(format!(
                "{} CT phases modeled but none available",
                phases.len()
            )));
        }
        if phases.is_empty() {
            return Err(ScenarioError::enumeration("no CT phases modeled"));
        }
        if let Some(p) = phases
            .iter()
            .find(|p| p.phase as usize > self.available_ct_phases)
        {
            return Err(ScenarioError::enumeration(format!(
                "CT phase {} exceeds the {} available phases",
                p.phase, self.available_ct_phases
            )));
        }

        Ok(phases)
    }

    /// Phase probabilities scaled to sum to one
    ///
    /// All zeros if every phase has probability zero.
    ///
    /// # Errors
    /// Same as [`phases`](Self::phases)
    pub fn normalized_phase_probabilities(&self) -> Result<Vec<f64>, ScenarioError> {
        let phases = self.phases()?;
        let total: f64 = phases.iter().map(|p| p.probability).sum();
        Ok(phases
            .iter()
            .map(|p| if total > 0.0 { p.probability / total } else { 0.0 })
            .collect())
    }
}

/// One realized scenario with its index-space position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScenarioPoint {
    /// Position in the index space
    pub subscript: Subscript,

    /// Table row
    pub entry: ScenarioEntry,
}

/// Complete result of one enumeration
#[derive(Debug, Clone, PartialEq)]
pub struct Enumeration {
    /// Extent of the shift axis
    pub num_shift: usize,

    /// Extent of the range axis
    pub num_range: usize,

    /// Realized scenarios
    pub points: Vec<ScenarioPoint>,
}

impl Enumeration {
    /// Number of realized scenarios
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if nothing was realized
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Repeat a per-phase scenario pattern over every modeled phase
///
/// `make` receives the phase, its position among the modeled phases, the
/// position of the pair in `pairs` and the `(shift, range)` pair itself.
pub(crate) fn expand_over_phases(
    phases: &[CtPhaseProbability],
    num_shift: usize,
    num_range: usize,
    pairs: &[(usize, usize)],
    mut make: impl FnMut(&CtPhaseProbability, usize, usize, (usize, usize)) -> ScenarioEntry,
) -> Enumeration {
    let points = phases
        .iter()
        .enumerate()
        .flat_map(|(i, phase)| {
            pairs
                .iter()
                .enumerate()
                .map(move |(j, pair)| (i, phase, j, *pair))
        })
        .map(|(i, phase, j, (shift, range))| ScenarioPoint {
            subscript: Subscript::new(phase.ct_index(), shift, range),
            entry: make(phase, i, j, (shift, range)),
        })
        .collect();

    Enumeration {
        num_shift,
        num_range,
        points,
    }
}
