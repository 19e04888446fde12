//! Multi-dimensional scenario index space
//!
//! Provides [`ScenarioIndexSpace`] over `{CT phase × shift scenario × range scenario}`.
//!
//! The mask is stored ct-major: the range subscript varies fastest, the CT
//! subscript slowest. Scenario numbers follow this scan order, so the table row
//! of a scenario is its position among the `true` mask entries.
//!
//! Subscripts and linear indices are 0-based; scenario numbers are 1-based.

use crate::error::ScenarioError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a scenario in the index space
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Subscript {
    /// CT subscript (phase identifier minus one)
    pub ct: usize,
    /// Shift scenario subscript
    pub shift: usize,
    /// Range scenario subscript
    pub range: usize,
}

impl Subscript {
    /// Create new subscript
    #[inline]
    #[must_use]
    pub fn new(ct: usize, shift: usize, range: usize) -> Self {
        Self { ct, shift, range }
    }
}

impl fmt::Display for Subscript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.ct, self.shift, self.range)
    }
}

/// Extent of each index axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IndexDims {
    /// Available CT phases in the source anatomy
    pub ct: usize,
    /// Shift scenarios
    pub shift: usize,
    /// Range scenarios
    pub range: usize,
}

impl IndexDims {
    /// Create new dimensions
    #[inline]
    #[must_use]
    pub fn new(ct: usize, shift: usize, range: usize) -> Self {
        Self { ct, shift, range }
    }

    /// Number of cells in the full cartesian product
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.ct * self.shift * self.range
    }

    /// Check if any axis is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dimensions as `[ct, shift, range]`
    #[inline]
    #[must_use]
    pub fn as_array(&self) -> [usize; 3] {
        [self.ct, self.shift, self.range]
    }

    /// Check if subscript lies inside these dimensions
    #[inline]
    #[must_use]
    pub fn contains(&self, s: Subscript) -> bool {
        s.ct < self.ct && s.shift < self.shift && s.range < self.range
    }

    /// Ct-major linear index of an in-bounds subscript
    #[inline]
    #[must_use]
    pub fn linear(&self, s: Subscript) -> usize {
        (s.ct * self.shift + s.shift) * self.range + s.range
    }

    /// Inverse of [`linear`](Self::linear)
    #[inline]
    #[must_use]
    pub fn subscript(&self, linear: usize) -> Subscript {
        Subscript {
            ct: linear / (self.shift * self.range),
            shift: (linear / self.range) % self.shift,
            range: linear % self.range,
        }
    }
}

/// Realized-scenario mask over the full index space
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioIndexSpace {
    dims: IndexDims,
    num_used_ct: usize,
    mask: Vec<bool>,
    /// Realized subscripts in scan order
    linear_mask: Vec<Subscript>,
}

impl ScenarioIndexSpace {
    /// Create empty (not yet enumerated) index space
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build index space from the realized subscripts
    ///
    /// Subscripts may arrive in any order; they are stored in scan order.
    ///
    /// # Errors
    /// `SubscriptOutOfBounds` for a subscript outside `dims`, `Enumeration`
    /// for a subscript realized twice
    pub fn from_realized(
        dims: IndexDims,
        subscripts: impl IntoIterator<Item = Subscript>,
    ) -> Result<Self, ScenarioError> {
        let mut mask = vec![false; dims.len()];
        let mut linear_mask = Vec::new();

        for s in subscripts {
            if !dims.contains(s) {
                return Err(ScenarioError::SubscriptOutOfBounds {
                    subscript: s,
                    dims: dims.as_array(),
                });
            }
            let linear = dims.linear(s);
            if mask[linear] {
                return Err(ScenarioError::enumeration(format!(
                    "scenario {s} realized more than once"
                )));
            }
            mask[linear] = true;
            linear_mask.push(s);
        }

        linear_mask.sort_by_key(|s| dims.linear(*s));

        let mut used: Vec<usize> = linear_mask.iter().map(|s| s.ct).collect();
        used.dedup();

        Ok(Self {
            dims,
            num_used_ct: used.len(),
            mask,
            linear_mask,
        })
    }

    /// Axis extents
    #[inline]
    #[must_use]
    pub fn dims(&self) -> IndexDims {
        self.dims
    }

    /// CT phases available in the source anatomy
    #[inline]
    #[must_use]
    pub fn num_available_ct(&self) -> usize {
        self.dims.ct
    }

    /// CT phases holding at least one realized scenario
    #[inline]
    #[must_use]
    pub fn num_used_ct(&self) -> usize {
        self.num_used_ct
    }

    /// Number of shift scenarios
    #[inline]
    #[must_use]
    pub fn num_shift(&self) -> usize {
        self.dims.shift
    }

    /// Number of range scenarios
    #[inline]
    #[must_use]
    pub fn num_range(&self) -> usize {
        self.dims.range
    }

    /// Boolean mask in ct-major order
    #[inline]
    #[must_use]
    pub fn mask(&self) -> &[bool] {
        &self.mask
    }

    /// Realized subscripts, one per table row
    #[inline]
    #[must_use]
    pub fn linear_mask(&self) -> &[Subscript] {
        &self.linear_mask
    }

    /// Number of realized scenarios
    #[inline]
    #[must_use]
    pub fn total_realized(&self) -> usize {
        self.linear_mask.len()
    }

    /// Check if any scenario has been enumerated
    #[inline]
    #[must_use]
    pub fn is_enumerated(&self) -> bool {
        !self.linear_mask.is_empty()
    }

    /// Check if the subscript addresses a realized scenario
    #[must_use]
    pub fn is_realized(&self, s: Subscript) -> bool {
        self.dims.contains(s) && self.mask[self.dims.linear(s)]
    }

    /// Convert subscript to linear index
    ///
    /// When the space only varies over CT phases, the index collapses to
    /// `s.ct`.
    ///
    /// # Errors
    /// `NotEnumerated` before enumeration, `SubscriptOutOfBounds` outside the
    /// dimensions
    pub fn subscript_to_linear(&self, s: Subscript) -> Result<usize, ScenarioError> {
        self.ensure_enumerated()?;
        if !self.dims.contains(s) {
            return Err(ScenarioError::SubscriptOutOfBounds {
                subscript: s,
                dims: self.dims.as_array(),
            });
        }
        if self.dims.shift == 1 && self.dims.range == 1 {
            return Ok(s.ct);
        }
        Ok(self.dims.linear(s))
    }

    /// Convert linear index to subscript
    ///
    /// # Errors
    /// `NotEnumerated` before enumeration, `NotFound` past the end of the mask
    pub fn linear_to_subscript(&self, linear: usize) -> Result<Subscript, ScenarioError> {
        self.ensure_enumerated()?;
        if linear >= self.mask.len() {
            return Err(ScenarioError::NotFound {
                linear_index: linear,
            });
        }
        Ok(self.dims.subscript(linear))
    }

    /// 1-based scenario number of a realized linear index
    ///
    /// # Errors
    /// `NotEnumerated` before enumeration, `NotFound` if the index is not
    /// marked realized
    pub fn scenario_number(&self, linear: usize) -> Result<usize, ScenarioError> {
        self.ensure_enumerated()?;
        if !self.mask.get(linear).copied().unwrap_or(false) {
            return Err(ScenarioError::NotFound {
                linear_index: linear,
            });
        }
        // linear_mask is sorted by linear index
        self.linear_mask
            .binary_search_by_key(&linear, |s| self.dims.linear(*s))
            .map(|pos| pos + 1)
            .map_err(|_| ScenarioError::NotFound {
                linear_index: linear,
            })
    }

    /// Subscript of a 1-based scenario number
    ///
    /// # Errors
    /// `NotEnumerated` before enumeration, `OutOfRange` outside `[1, total]`
    pub fn subscript_of(&self, number: usize) -> Result<Subscript, ScenarioError> {
        self.ensure_enumerated()?;
        number
            .checked_sub(1)
            .and_then(|i| self.linear_mask.get(i))
            .copied()
            .ok_or(ScenarioError::OutOfRange {
                number,
                total: self.linear_mask.len(),
            })
    }

    fn ensure_enumerated(&self) -> Result<(), ScenarioError> {
        if self.is_enumerated() {
            Ok(())
        } else {
            Err(ScenarioError::NotEnumerated)
        }
    }
}
